//! Classic (pre-SDK) project files.
//!
//! Legacy projects declare their identity in one unconditioned
//! `<PropertyGroup>` and their per-configuration settings in groups
//! conditioned on `'$(Configuration)|$(Platform)'`:
//!
//! ```xml
//! <PropertyGroup>
//!   <Configuration Condition=" '$(Configuration)' == '' ">Debug</Configuration>
//!   <OutputType>Exe</OutputType>
//!   <AssemblyName>App</AssemblyName>
//! </PropertyGroup>
//! <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">
//!   <OutputPath>bin\Debug\</OutputPath>
//! </PropertyGroup>
//! ```
//!
//! Only the first unconditioned group is read for identity scalars; later
//! unconditioned groups are not merged into it.

use std::path::PathBuf;

use crate::error::{ParseError, ParseResult};
use crate::items::Items;
use crate::model::ParsedProject;
use crate::parser::ProjectDocument;
use crate::text::{self, expand_msbuild_vars};

/// Output type when the project does not declare one.
pub(crate) const DEFAULT_OUTPUT_TYPE: &str = "Library";

pub(crate) fn parse(doc: &ProjectDocument) -> ParseResult<ParsedProject> {
    let table = &doc.table;
    let base = table.first_unconditioned_group();
    let scalar = |name: &str| base.and_then(|g| table.group_value(g, name)).map(str::to_string);

    if !has_configuration(doc) {
        return Err(ParseError::PropertyExtractionFailed {
            path: doc.path.to_path_buf(),
            message: "Failed to parse project properties".to_string(),
        });
    }

    let output_path = output_path(doc);
    let target_framework_version = scalar("TargetFrameworkVersion");
    let items = Items::collect(doc.root, doc.scope, &doc.directory, &doc.variables);

    Ok(ParsedProject {
        project_file: doc.path.to_path_buf(),
        configuration: doc.configuration.to_string(),
        platform: doc.platform.to_string(),
        project_guid: scalar("ProjectGuid"),
        project_type_guids: scalar("ProjectTypeGuids").map(|g| text::split_list(&g)),
        output_type: scalar("OutputType").unwrap_or_else(|| DEFAULT_OUTPUT_TYPE.to_string()),
        output_paths: vec![output_path.clone()],
        output_path,
        root_namespace: scalar("RootNamespace").unwrap_or_else(|| doc.stem.clone()),
        assembly_name: scalar("AssemblyName").unwrap_or_else(|| doc.stem.clone()),
        target_framework_versions: target_framework_version.iter().cloned().collect(),
        target_framework_version,
        target_framework_profile: scalar("TargetFrameworkProfile"),
        is_net_framework: true,
        is_net_core: false,
        is_net_standard: false,
        files: items.files,
        references: items.references,
        project_references: items.project_references,
        package_references: items.package_references,
        net_core: None,
        properties: doc.table.clone(),
        variables: doc.variables.clone(),
    })
}

/// The project knows about the requested configuration: either a group
/// conditioned on `$(Configuration)` matches it, or an unconditioned group
/// declares a default `<Configuration>`.
fn has_configuration(doc: &ProjectDocument) -> bool {
    let table = &doc.table;
    table.any_group_matches("Configuration", &doc.variables)
        || table.groups.iter().enumerate().any(|(index, group)| {
            group.guard.is_unconditioned() && table.group_value(index, "Configuration").is_some()
        })
}

/// `OutputPath` from the best matching conditioned group, else the
/// unconditioned one, else `bin/{configuration}`.
fn output_path(doc: &ProjectDocument) -> PathBuf {
    let table = &doc.table;
    let declared = table
        .conditioned("OutputPath", &doc.variables)
        .or_else(|| table.unconditioned("OutputPath"))
        .map(|p| p.value.as_str())
        .filter(|v| !v.is_empty());

    match declared {
        Some(value) => text::normalize_path(&expand_msbuild_vars(value, &doc.variables)),
        None => PathBuf::from("bin").join(doc.configuration),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
