//! `<ItemGroup>` and `<Target>` extraction shared by both dialects.
//!
//! Items are read from every `<ItemGroup>` directly under `<Project>`.
//! Item conditions are not evaluated; a `PackageReference` conditioned on
//! `$(TargetFramework)` keeps that framework as its discriminator instead.

use std::collections::HashMap;
use std::path::Path;

use roxmltree::Node;

use crate::condition;
use crate::model::{
    AssemblyReference, BuildTarget, DotNetCliToolReference, PackageReference, ProjectFileEntry,
    ProjectReference,
};
use crate::text::{self, expand_msbuild_vars};
use crate::xml::{self, Scope};

/// Item element names that never describe a source or content file.
const NON_FILE_ITEMS: &[&str] = &[
    "Reference",
    "Import",
    "BootstrapperPackage",
    "ProjectReference",
    "Service",
    "PackageReference",
    "DotNetCliToolReference",
];

/// Everything collected from a project's item groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Items {
    pub files: Vec<ProjectFileEntry>,
    pub references: Vec<AssemblyReference>,
    pub project_references: Vec<ProjectReference>,
    pub package_references: Vec<PackageReference>,
    pub dotnet_cli_tool_references: Vec<DotNetCliToolReference>,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Collection
// ═══════════════════════════════════════════════════════════════════════════════

impl Items {
    /// Walk all item groups under `root`. Paths are resolved against
    /// `project_dir` after `$(Var)` substitution with `vars`.
    pub fn collect(
        root: Node,
        scope: Scope,
        project_dir: &Path,
        vars: &HashMap<String, String>,
    ) -> Self {
        let mut items = Self::default();

        for group in scope.children(root, "ItemGroup") {
            for item in group.children().filter(|n| scope.is_element(n)) {
                match item.tag_name().name() {
                    "Reference" => items.push_reference(item, scope, project_dir, vars),
                    "ProjectReference" => {
                        items.project_references.extend(project_reference(item, scope, project_dir, vars))
                    }
                    "PackageReference" => {
                        items.package_references.extend(package_reference(item, group, scope))
                    }
                    "DotNetCliToolReference" => {
                        items.dotnet_cli_tool_references.extend(cli_tool_reference(item, scope))
                    }
                    name if NON_FILE_ITEMS.contains(&name) => {}
                    name => items.files.extend(file_entry(item, name, project_dir, vars)),
                }
            }
        }

        items
    }

    /// Add a `<Reference>` unless one with the same name was already seen.
    fn push_reference(
        &mut self,
        item: Node,
        scope: Scope,
        project_dir: &Path,
        vars: &HashMap<String, String>,
    ) {
        let Some(include) = item.attribute("Include").and_then(text::non_empty) else {
            return;
        };
        let name = scope
            .child_text(item, "Name")
            .unwrap_or_else(|| text::assembly_simple_name(&include).to_string());
        if name.is_empty() {
            return;
        }
        if self.references.iter().any(|r| r.name.eq_ignore_ascii_case(&name)) {
            log::trace!("skipping duplicate reference {name}");
            return;
        }

        let hint_path = scope
            .child_text(item, "HintPath")
            .map(|p| project_dir.join(text::normalize_path(&expand_msbuild_vars(&p, vars))));

        self.references.push(AssemblyReference {
            name,
            hint_path,
            fusion_name: Some(include),
            specific_version: scope
                .child_text(item, "SpecificVersion")
                .and_then(|v| text::parse_bool(&v)),
            aliases: scope.child_text(item, "Aliases"),
            private: scope.child_text(item, "Private").and_then(|v| text::parse_bool(&v)),
        });
    }
}

fn file_entry(
    item: Node,
    name: &str,
    project_dir: &Path,
    vars: &HashMap<String, String>,
) -> Option<ProjectFileEntry> {
    let include = item.attribute("Include").and_then(text::non_empty)?;
    let relative_path = text::normalize_path(&expand_msbuild_vars(&include, vars));
    Some(ProjectFileEntry {
        file_path: project_dir.join(&relative_path),
        relative_path,
        is_compile_item: name == "Compile",
    })
}

fn project_reference(
    item: Node,
    scope: Scope,
    project_dir: &Path,
    vars: &HashMap<String, String>,
) -> Option<ProjectReference> {
    let include = item.attribute("Include").and_then(text::non_empty)?;
    let relative_path = text::normalize_path(&expand_msbuild_vars(&include, vars));
    Some(ProjectReference {
        file_path: project_dir.join(&relative_path),
        relative_path,
        name: scope.child_text(item, "Name"),
        project: scope.child_text(item, "Project"),
        package: scope.child_text(item, "Package"),
    })
}

fn package_reference(item: Node, group: Node, scope: Scope) -> Option<PackageReference> {
    let name = scope.metadata(item, "Include")?;
    Some(PackageReference {
        version: scope.metadata(item, "Version"),
        target_framework: framework_discriminator(&item)
            .or_else(|| framework_discriminator(&group)),
        include_assets: scope.metadata(item, "IncludeAssets"),
        exclude_assets: scope.metadata(item, "ExcludeAssets"),
        private_assets: scope.metadata(item, "PrivateAssets"),
        name,
    })
}

fn cli_tool_reference(item: Node, scope: Scope) -> Option<DotNetCliToolReference> {
    Some(DotNetCliToolReference {
        name: scope.metadata(item, "Include")?,
        version: scope.metadata(item, "Version"),
    })
}

/// The framework a `Condition` pins `$(TargetFramework)` to, if any.
fn framework_discriminator(node: &Node) -> Option<String> {
    let raw = xml::condition(node)?;
    match condition::parse_condition(&raw) {
        Ok(expr) => expr.bound_value("TargetFramework"),
        Err(err) => {
            log::debug!("ignoring unparseable item condition: {err}");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Targets
// ═══════════════════════════════════════════════════════════════════════════════

/// Every named `<Target>` directly under `root`, in document order.
pub fn targets(root: Node, scope: Scope) -> Vec<BuildTarget> {
    scope
        .children(root, "Target")
        .filter_map(|target| {
            let name = target.attribute("Name").and_then(text::non_empty)?;
            Some(BuildTarget {
                name,
                before_targets: list_attribute(&target, "BeforeTargets"),
                after_targets: list_attribute(&target, "AfterTargets"),
                depends_on: list_attribute(&target, "DependsOnTargets"),
                executables: scope
                    .children(target, "Exec")
                    .filter_map(|exec| exec.attribute("Command").and_then(text::non_empty))
                    .collect(),
            })
        })
        .collect()
}

fn list_attribute(node: &Node, name: &str) -> Vec<String> {
    node.attribute(name).map(text::split_list).unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
