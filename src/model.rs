//! Owned result types produced by the project parser.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::properties::PropertyTable;

// ─── ParsedProject ───────────────────────────────────────────────────────────

/// A parsed `.csproj` / `.fsproj` for one configuration and platform.
///
/// Legacy-only fields (`project_guid`, `project_type_guids`,
/// `target_framework_profile`) are `None` for SDK-style projects, and
/// `net_core` is `None` for legacy projects.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProject {
    /// The project file this result was parsed from.
    pub project_file: PathBuf,
    /// The requested configuration, case preserved.
    pub configuration: String,
    /// The requested platform (`AnyCPU` by default).
    pub platform: String,
    pub project_guid: Option<String>,
    pub project_type_guids: Option<Vec<String>>,
    /// `Library`, `Exe`, `WinExe`, …
    pub output_type: String,
    /// First entry of `output_paths`.
    pub output_path: PathBuf,
    /// One output directory per target framework, relative to the project
    /// directory. Never empty.
    pub output_paths: Vec<PathBuf>,
    pub root_namespace: String,
    pub assembly_name: String,
    /// Legacy `v4.5` style value, or the first SDK-style moniker.
    pub target_framework_version: Option<String>,
    /// All target frameworks in declaration order.
    pub target_framework_versions: Vec<String>,
    pub target_framework_profile: Option<String>,
    pub is_net_framework: bool,
    pub is_net_core: bool,
    pub is_net_standard: bool,
    pub files: Vec<ProjectFileEntry>,
    pub references: Vec<AssemblyReference>,
    pub project_references: Vec<ProjectReference>,
    pub package_references: Vec<PackageReference>,
    pub net_core: Option<NetCoreProperties>,
    /// Raw property elements, kept for [`ParsedProject::get_project_property`].
    pub(crate) properties: PropertyTable,
    /// Variables used to evaluate conditions and expand `$(Var)` references.
    pub(crate) variables: HashMap<String, String>,
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// A `Compile`, `Content`, `None`, `EmbeddedResource`, … item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFileEntry {
    /// The item resolved against the project directory.
    pub file_path: PathBuf,
    /// The `Include` value, separators normalised.
    pub relative_path: PathBuf,
    pub is_compile_item: bool,
}

/// A `<Reference>` item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssemblyReference {
    pub name: String,
    /// `HintPath` resolved against the project directory.
    pub hint_path: Option<PathBuf>,
    /// The full `Include` value, e.g. `Foo, Version=1.0.0.0, Culture=neutral`.
    pub fusion_name: Option<String>,
    pub specific_version: Option<bool>,
    pub aliases: Option<String>,
    pub private: Option<bool>,
}

/// A `<ProjectReference>` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    pub file_path: PathBuf,
    pub relative_path: PathBuf,
    pub name: Option<String>,
    /// The referenced project's GUID.
    pub project: Option<String>,
    pub package: Option<String>,
}

/// A `<PackageReference>` item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageReference {
    pub name: String,
    pub version: Option<String>,
    /// Set when the reference is conditioned on `$(TargetFramework)`.
    pub target_framework: Option<String>,
    pub include_assets: Option<String>,
    pub exclude_assets: Option<String>,
    pub private_assets: Option<String>,
}

/// A `<DotNetCliToolReference>` item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DotNetCliToolReference {
    pub name: String,
    pub version: Option<String>,
}

/// A `<Target>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildTarget {
    pub name: String,
    pub before_targets: Vec<String>,
    pub after_targets: Vec<String>,
    pub depends_on: Vec<String>,
    /// `Command` attributes of the target's `<Exec>` tasks, in order.
    pub executables: Vec<String>,
}

// ─── SDK-style properties ────────────────────────────────────────────────────

/// Runtime configuration knobs written to `runtimeconfig.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub server_garbage_collection: bool,
    pub concurrent_garbage_collection: bool,
    pub retain_vm_garbage_collection: bool,
    pub thread_pool_min_threads: Option<u32>,
    pub thread_pool_max_threads: Option<u32>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            server_garbage_collection: false,
            concurrent_garbage_collection: true,
            retain_vm_garbage_collection: false,
            thread_pool_min_threads: None,
            thread_pool_max_threads: None,
        }
    }
}

/// Properties only meaningful for SDK-style projects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetCoreProperties {
    /// The root `Sdk` attribute, e.g. `Microsoft.NET.Sdk.Web`.
    pub sdk: String,
    pub target_frameworks: Vec<String>,

    // ── Assembly / package identity ──
    pub assembly_title: String,
    pub package_id: String,
    pub title: Option<String>,
    pub version: String,
    pub package_version: String,
    pub authors: Vec<String>,
    pub company: Option<String>,
    pub product: Option<String>,
    pub copyright: Option<String>,
    pub description: Option<String>,
    pub neutral_language: Option<String>,

    // ── Package metadata ──
    pub package_tags: Vec<String>,
    pub package_release_notes: Option<String>,
    pub package_icon_url: Option<String>,
    pub package_icon: Option<String>,
    pub package_license_url: Option<String>,
    pub package_license_expression: Option<String>,
    pub package_license_file: Option<String>,
    pub package_project_url: Option<String>,
    pub package_require_license_acceptance: bool,
    pub repository_url: Option<String>,
    pub repository_type: String,
    pub package_output_path: Option<PathBuf>,
    pub package_type: Vec<String>,
    pub package_target_fallbacks: Vec<String>,
    pub netstandard_implicit_package_version: Option<String>,
    pub min_client_version: Option<String>,

    // ── Packing ──
    pub is_packable: bool,
    pub is_tool: bool,
    pub include_build_output: bool,
    pub include_content_in_pack: bool,
    pub include_symbols: bool,
    pub include_source: bool,
    pub generate_package_on_build: bool,
    pub build_output_target_folder: Option<String>,
    pub content_target_folders: Vec<String>,
    pub no_package_analysis: bool,
    pub serviceable: bool,

    // ── Signing ──
    pub sign_assembly: bool,
    pub delay_sign: bool,
    pub public_sign: bool,
    pub assembly_originator_key_file: Option<PathBuf>,

    // ── Compilation ──
    pub allow_unsafe_blocks: bool,
    pub debug_symbols: bool,
    pub debug_type: Option<String>,
    pub optimize: bool,
    pub define_constants: Vec<String>,
    pub language_version: Option<String>,
    pub nullable: Option<String>,
    pub warning_level: Option<String>,
    pub treat_warnings_as_errors: bool,
    pub treat_specific_warnings_as_errors: Vec<String>,
    pub no_warn: Vec<String>,
    pub generate_documentation_file: bool,
    pub documentation_file: Option<PathBuf>,
    pub preserve_compilation_context: bool,

    // ── Runtime ──
    pub runtime_framework_version: Option<String>,
    pub runtime_identifiers: Vec<String>,
    pub runtime_options: RuntimeOptions,

    // ── Items ──
    pub dotnet_cli_tool_references: Vec<DotNetCliToolReference>,
    pub targets: Vec<BuildTarget>,
}
