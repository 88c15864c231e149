//! Target framework moniker classification.
//!
//! Best-effort: the rules below cover the monikers in use today
//! (`net45`, `net472`, `netstandard2.0`, `netcoreapp3.1`, `net6.0`,
//! `net8.0-windows10.0.19041`) and classify anything else as
//! [`FrameworkFamily::Other`].

/// The runtime family a target framework moniker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkFamily {
    /// .NET Framework (`net20` … `net481`).
    NetFramework,
    /// .NET Core and .NET 5+ (`netcoreapp*`, `net5.0`, `net6.0-ios14.0`).
    NetCore,
    /// .NET Standard (`netstandard*`).
    NetStandard,
    /// Anything else (`uap10.0`, `portable-net45+win8`, `monoandroid90`).
    Other,
}

/// Classify a single moniker.
pub fn classify(moniker: &str) -> FrameworkFamily {
    let tfm = moniker.trim().to_ascii_lowercase();

    if tfm.starts_with("netstandard") {
        return FrameworkFamily::NetStandard;
    }
    if tfm.starts_with("netcoreapp") {
        return FrameworkFamily::NetCore;
    }

    let Some(version) = tfm.strip_prefix("net") else {
        return FrameworkFamily::Other;
    };
    if !version.starts_with(|c: char| c.is_ascii_digit()) {
        return FrameworkFamily::Other;
    }

    // Drop a platform suffix: net6.0-ios14.0 → 6.0
    let version = version.split('-').next().unwrap_or(version);
    match version.split_once('.') {
        Some((major, _)) => match major.parse::<u32>() {
            Ok(major) if major >= 5 => FrameworkFamily::NetCore,
            Ok(_) => FrameworkFamily::NetFramework,
            Err(_) => FrameworkFamily::Other,
        },
        None if version.chars().all(|c| c.is_ascii_digit()) => FrameworkFamily::NetFramework,
        None => FrameworkFamily::Other,
    }
}

/// Whether any of `monikers` is in `family`.
pub fn any_in<S: AsRef<str>>(monikers: &[S], family: FrameworkFamily) -> bool {
    monikers.iter().any(|m| classify(m.as_ref()) == family)
}
