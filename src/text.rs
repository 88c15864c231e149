//! String and path helpers shared by both project dialects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::condition;

/// Expand `$(Var)` references in a raw property value using the given
/// variable map.
///
/// Lookups ignore ASCII case. Unknown variables are left verbatim so that
/// references to properties defined outside the project file (imports,
/// `Directory.Build.props`) remain visible to the caller.
pub fn expand_msbuild_vars(s: &str, vars: &HashMap<String, String>) -> String {
    if !s.contains("$(") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("$(") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find(')') else {
            result.push_str(&rest[start..]);
            return result;
        };
        let name = after[..end].trim();
        match condition::lookup(vars, name) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

/// Split a `;`-delimited MSBuild list, trimming entries and dropping empty
/// ones.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Like [`split_list`], but drops a self-reference such as `$(NoWarn)` used
/// to append to an inherited value.
pub fn split_list_without(s: &str, self_reference: &str) -> Vec<String> {
    let token = format!("$({self_reference})");
    split_list(s)
        .into_iter()
        .filter(|part| !part.eq_ignore_ascii_case(&token))
        .collect()
}

/// Interpret an MSBuild boolean (`true`/`false`, any case).
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Turn a project-relative path as written in the XML (`bin\Debug\`,
/// `./out/`) into a [`PathBuf`] using the host separator.
///
/// `.` segments and empty segments (doubled or trailing separators) are
/// dropped; `..` is kept.
pub fn normalize_path(s: &str) -> PathBuf {
    let trimmed = s.trim();
    let mut path = if trimmed.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    };
    for segment in trimmed.split(['/', '\\']) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        path.push(segment);
    }
    path
}

/// The simple assembly name from a fusion-style include string, e.g.
/// `Newtonsoft.Json` from `Newtonsoft.Json, Version=9.0.0.0, Culture=neutral`.
pub fn assembly_simple_name(include: &str) -> &str {
    include.split(',').next().unwrap_or(include).trim()
}

/// File name without extension, as a `String`.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Non-empty trimmed text, or `None`.
pub fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
