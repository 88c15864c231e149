//! SDK-style project files (`<Project Sdk="Microsoft.NET.Sdk">`).
//!
//! SDK-style projects may target several frameworks at once. Scalar
//! properties are resolved with `$(TargetFramework)` bound to the first
//! declared framework; output paths are resolved once per framework.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::condition::bind;
use crate::items::{self, Items};
use crate::legacy::DEFAULT_OUTPUT_TYPE;
use crate::model::{NetCoreProperties, ParsedProject, RuntimeOptions};
use crate::moniker::{self, FrameworkFamily};
use crate::parser::{DEFAULT_PLATFORM, ProjectDocument};
use crate::properties::PropertyTable;
use crate::text::{self, expand_msbuild_vars};

/// Version used when no `Version` is declared.
const DEFAULT_VERSION: &str = "1.0.0";

const DEFAULT_REPOSITORY_TYPE: &str = "git";

// ═══════════════════════════════════════════════════════════════════════════════
//  Property reader
// ═══════════════════════════════════════════════════════════════════════════════

/// Typed access to resolved property values for one set of variables.
struct Reader<'t> {
    table: &'t PropertyTable,
    vars: &'t HashMap<String, String>,
}

impl Reader<'_> {
    /// Resolved, non-empty value.
    fn text(&self, name: &str) -> Option<String> {
        self.table.resolve(name, self.vars).and_then(text::non_empty)
    }

    fn flag(&self, name: &str, default: bool) -> bool {
        self.text(name)
            .and_then(|v| text::parse_bool(&v))
            .unwrap_or(default)
    }

    fn list(&self, name: &str) -> Vec<String> {
        self.text(name)
            .map(|v| text::split_list_without(&v, name))
            .unwrap_or_default()
    }

    /// `list`, falling back to a single-valued property when empty.
    fn list_or(&self, name: &str, single: &str) -> Vec<String> {
        let values = self.list(name);
        if !values.is_empty() {
            return values;
        }
        self.list(single)
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        self.text(name)
            .map(|v| text::normalize_path(&expand_msbuild_vars(&v, self.vars)))
    }

    fn number(&self, name: &str) -> Option<u32> {
        let value = self.text(name)?;
        match value.parse() {
            Ok(n) => Some(n),
            Err(_) => {
                log::debug!("ignoring non-numeric {name}: {value}");
                None
            }
        }
    }
}

/// Assign `Option<String>` fields from same-shaped properties.
macro_rules! read_text {
    ($props:expr, $reader:expr, $($tag:literal => $field:ident),* $(,)?) => {
        $( $props.$field = $reader.text($tag); )*
    };
}

/// Assign `bool` fields defaulting to `false`.
macro_rules! read_flags {
    ($props:expr, $reader:expr, $($tag:literal => $field:ident),* $(,)?) => {
        $( $props.$field = $reader.flag($tag, false); )*
    };
}

/// Assign `Vec<String>` fields from `;`-separated properties.
macro_rules! read_lists {
    ($props:expr, $reader:expr, $($tag:literal => $field:ident),* $(,)?) => {
        $( $props.$field = $reader.list($tag); )*
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Parsing
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn parse(doc: &ProjectDocument, sdk: String) -> ParsedProject {
    let target_frameworks = Reader {
        table: &doc.table,
        vars: &doc.variables,
    }
    .list_or("TargetFrameworks", "TargetFramework");

    // Scalars see the first framework, as an inner build for it would.
    let mut variables = doc.variables.clone();
    if let Some(primary) = target_frameworks.first() {
        bind(&mut variables, "TargetFramework", primary.as_str());
    }
    let reader = Reader {
        table: &doc.table,
        vars: &variables,
    };

    let assembly_name = reader.text("AssemblyName").unwrap_or_else(|| doc.stem.clone());
    let output_paths: Vec<PathBuf> = if target_frameworks.is_empty() {
        vec![output_path(doc, None)]
    } else {
        target_frameworks
            .iter()
            .map(|tfm| output_path(doc, Some(tfm.as_str())))
            .collect()
    };

    let items = Items::collect(doc.root, doc.scope, &doc.directory, &variables);
    let mut net_core = net_core_properties(&reader, &assembly_name);
    net_core.sdk = sdk;
    net_core.target_frameworks = target_frameworks.clone();
    net_core.dotnet_cli_tool_references = items.dotnet_cli_tool_references;
    net_core.targets = items::targets(doc.root, doc.scope);

    ParsedProject {
        project_file: doc.path.to_path_buf(),
        configuration: doc.configuration.to_string(),
        platform: doc.platform.to_string(),
        project_guid: None,
        project_type_guids: None,
        output_type: reader
            .text("OutputType")
            .unwrap_or_else(|| DEFAULT_OUTPUT_TYPE.to_string()),
        output_path: output_paths[0].clone(),
        output_paths,
        root_namespace: reader.text("RootNamespace").unwrap_or_else(|| doc.stem.clone()),
        assembly_name,
        target_framework_version: target_frameworks.first().cloned(),
        is_net_framework: moniker::any_in(&target_frameworks, FrameworkFamily::NetFramework),
        is_net_core: moniker::any_in(&target_frameworks, FrameworkFamily::NetCore),
        is_net_standard: moniker::any_in(&target_frameworks, FrameworkFamily::NetStandard),
        target_framework_versions: target_frameworks,
        target_framework_profile: None,
        files: items.files,
        references: items.references,
        project_references: items.project_references,
        package_references: items.package_references,
        net_core: Some(net_core),
        properties: doc.table.clone(),
        variables,
    }
}

/// Output directory for one target framework (or none).
fn output_path(doc: &ProjectDocument, tfm: Option<&str>) -> PathBuf {
    let mut vars = doc.variables.clone();
    if let Some(tfm) = tfm {
        bind(&mut vars, "TargetFramework", tfm);
    }

    let table = &doc.table;
    let declared = table
        .conditioned("OutputPath", &vars)
        .or_else(|| table.unconditioned("OutputPath"))
        .map(|p| p.value.as_str())
        .filter(|v| !v.is_empty());
    if let Some(value) = declared {
        return text::normalize_path(&expand_msbuild_vars(value, &vars));
    }

    let mut path = PathBuf::from("bin");
    if !doc.platform.eq_ignore_ascii_case(DEFAULT_PLATFORM) {
        path.push(doc.platform);
    }
    path.push(doc.configuration);
    if let Some(tfm) = tfm {
        path.push(tfm);
    }
    path
}

/// `VersionPrefix-VersionSuffix` when both are declared, else `Version`.
fn version(reader: &Reader) -> String {
    if let (Some(prefix), Some(suffix)) = (reader.text("VersionPrefix"), reader.text("VersionSuffix")) {
        return format!("{prefix}-{suffix}");
    }
    reader
        .text("Version")
        .unwrap_or_else(|| DEFAULT_VERSION.to_string())
}

fn net_core_properties(reader: &Reader, assembly_name: &str) -> NetCoreProperties {
    let mut props = NetCoreProperties::default();

    props.assembly_title = reader
        .text("AssemblyTitle")
        .unwrap_or_else(|| assembly_name.to_string());
    props.package_id = reader
        .text("PackageId")
        .unwrap_or_else(|| assembly_name.to_string());
    props.version = version(reader);
    props.package_version = reader
        .text("PackageVersion")
        .unwrap_or_else(|| props.version.clone());
    props.repository_type = reader
        .text("RepositoryType")
        .unwrap_or_else(|| DEFAULT_REPOSITORY_TYPE.to_string());

    read_text!(props, reader,
        "Title" => title,
        "Company" => company,
        "Product" => product,
        "Copyright" => copyright,
        "Description" => description,
        "NeutralLanguage" => neutral_language,
        "PackageReleaseNotes" => package_release_notes,
        "PackageIconUrl" => package_icon_url,
        "PackageIcon" => package_icon,
        "PackageLicenseUrl" => package_license_url,
        "PackageLicenseExpression" => package_license_expression,
        "PackageLicenseFile" => package_license_file,
        "PackageProjectUrl" => package_project_url,
        "RepositoryUrl" => repository_url,
        "NetStandardImplicitPackageVersion" => netstandard_implicit_package_version,
        "MinClientVersion" => min_client_version,
        "BuildOutputTargetFolder" => build_output_target_folder,
        "DebugType" => debug_type,
        "LangVersion" => language_version,
        "Nullable" => nullable,
        "WarningLevel" => warning_level,
        "RuntimeFrameworkVersion" => runtime_framework_version,
    );

    read_flags!(props, reader,
        "PackageRequireLicenseAcceptance" => package_require_license_acceptance,
        "IsTool" => is_tool,
        "IncludeSymbols" => include_symbols,
        "IncludeSource" => include_source,
        "GeneratePackageOnBuild" => generate_package_on_build,
        "NoPackageAnalysis" => no_package_analysis,
        "Serviceable" => serviceable,
        "SignAssembly" => sign_assembly,
        "DelaySign" => delay_sign,
        "PublicSign" => public_sign,
        "AllowUnsafeBlocks" => allow_unsafe_blocks,
        "DebugSymbols" => debug_symbols,
        "Optimize" => optimize,
        "TreatWarningsAsErrors" => treat_warnings_as_errors,
        "GenerateDocumentationFile" => generate_documentation_file,
        "PreserveCompilationContext" => preserve_compilation_context,
    );
    props.is_packable = reader.flag("IsPackable", true);
    props.include_build_output = reader.flag("IncludeBuildOutput", true);
    props.include_content_in_pack = reader.flag("IncludeContentInPack", true);

    read_lists!(props, reader,
        "Authors" => authors,
        "PackageTags" => package_tags,
        "PackageType" => package_type,
        "ContentTargetFolders" => content_target_folders,
        "DefineConstants" => define_constants,
        "NoWarn" => no_warn,
        "WarningsAsErrors" => treat_specific_warnings_as_errors,
    );
    props.runtime_identifiers = reader.list_or("RuntimeIdentifiers", "RuntimeIdentifier");
    props.package_target_fallbacks = reader.list_or("PackageTargetFallback", "AssetTargetFallback");

    props.package_output_path = reader.path("PackageOutputPath");
    props.documentation_file = reader.path("DocumentationFile");
    props.assembly_originator_key_file = reader.path("AssemblyOriginatorKeyFile");

    props.runtime_options = RuntimeOptions {
        server_garbage_collection: reader.flag("ServerGarbageCollection", false),
        concurrent_garbage_collection: reader.flag("ConcurrentGarbageCollection", true),
        retain_vm_garbage_collection: reader.flag("RetainVMGarbageCollection", false),
        thread_pool_min_threads: reader.number("ThreadPoolMinThreads"),
        thread_pool_max_threads: reader.number("ThreadPoolMaxThreads"),
    };

    props
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::model::ParsedProject;
    use crate::parser::{MemoryFile, ProjectParser, parse_project};
    use std::path::PathBuf;

    fn parse(xml: &str, configuration: &str, platform: Option<&str>) -> ParsedProject {
        let file = MemoryFile::new("/work/Cake.Sample/Cake.Sample.csproj", xml);
        parse_project(&file, configuration, platform).unwrap()
    }

    const MINIMAL: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net45</TargetFramework>
  </PropertyGroup>
</Project>"#;

    const MULTI_TARGET: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFrameworks>net45;netstandard1.6</TargetFrameworks>
    <AssemblyName>Cake.Sample.Lib</AssemblyName>
  </PropertyGroup>
  <ItemGroup Condition=" '$(TargetFramework)' == 'net45' ">
    <Reference Include="System.Configuration" />
  </ItemGroup>
  <ItemGroup Condition=" '$(TargetFramework)' == 'netstandard1.6' ">
    <PackageReference Include="System.Runtime" Version="4.3.0" />
  </ItemGroup>
</Project>"#;

    // ── output paths ──

    #[test]
    fn minimal_project_defaults() {
        let p = parse(MINIMAL, "test", None);
        assert_eq!(p.output_path, PathBuf::from("bin/test/net45"));
        assert_eq!(p.output_path.to_string_lossy(), "bin/test/net45");
        assert_eq!(p.assembly_name, "Cake.Sample");
        assert_eq!(p.root_namespace, "Cake.Sample");
        assert_eq!(p.output_type, "Library");
        assert!(p.is_net_framework);
        assert!(!p.is_net_core);
    }

    #[test]
    fn output_path_defaulting() {
        let bare = r#"<Project Sdk="Microsoft.NET.Sdk" />"#;
        assert_eq!(parse(bare, "Debug", None).output_paths, vec![PathBuf::from("bin/Debug")]);
        assert_eq!(parse(MINIMAL, "Debug", None).output_path, PathBuf::from("bin/Debug/net45"));
        assert_eq!(
            parse(MINIMAL, "Debug", Some("x64")).output_path,
            PathBuf::from("bin/x64/Debug/net45")
        );
        assert_eq!(
            parse(MINIMAL, "Debug", Some("anycpu")).output_path,
            PathBuf::from("bin/Debug/net45")
        );
    }

    #[test]
    fn conditioned_output_paths_most_specific_wins() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFrameworks>net462;net6.0</TargetFrameworks>
    <OutputPath>out\</OutputPath>
  </PropertyGroup>
  <PropertyGroup Condition="'$(Configuration)'=='Release'">
    <OutputPath>release\</OutputPath>
  </PropertyGroup>
  <PropertyGroup Condition="'$(Configuration)|$(TargetFramework)|$(Platform)'=='Release|net6.0|AnyCPU'">
    <OutputPath>release\modern\</OutputPath>
  </PropertyGroup>
</Project>"#;
        assert_eq!(
            parse(xml, "Release", None).output_paths,
            vec![PathBuf::from("release"), PathBuf::from("release/modern")]
        );
        assert_eq!(
            parse(xml, "Debug", None).output_paths,
            vec![PathBuf::from("out"), PathBuf::from("out")]
        );
    }

    #[test]
    fn multi_target_fan_out() {
        let p = parse(MULTI_TARGET, "Release", None);
        assert_eq!(
            p.output_paths,
            vec![PathBuf::from("bin/Release/net45"), PathBuf::from("bin/Release/netstandard1.6")]
        );
        assert_eq!(p.output_path, p.output_paths[0]);
        assert_eq!(p.target_framework_version.as_deref(), Some("net45"));
        assert_eq!(p.target_framework_versions, vec!["net45", "netstandard1.6"]);
        assert!(p.is_net_framework);
        assert!(p.is_net_standard);
        assert!(!p.is_net_core);

        let net_core = p.net_core.as_ref().unwrap();
        assert_eq!(net_core.target_frameworks, p.target_framework_versions);
        assert_eq!(net_core.sdk, "Microsoft.NET.Sdk");
        assert_eq!(p.package_references[0].target_framework.as_deref(), Some("netstandard1.6"));
        assert_eq!(p.references[0].name, "System.Configuration");
    }

    #[test]
    fn modern_monikers_are_core() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFrameworks>net6.0-ios14.0;netcoreapp3.1</TargetFrameworks>
  </PropertyGroup>
</Project>"#;
        let p = parse(xml, "Debug", None);
        assert!(p.is_net_core);
        assert!(!p.is_net_framework);
        assert!(!p.is_net_standard);
    }

    // ── scalars ──

    #[test]
    fn identity_falls_back_to_file_stem() {
        let file = MemoryFile::new("projName.csproj", MINIMAL);
        let p = parse_project(&file, "Debug", None).unwrap();
        assert_eq!(p.assembly_name, "projName");
        let net_core = p.net_core.unwrap();
        assert_eq!(net_core.package_id, "projName");
        assert_eq!(net_core.assembly_title, "projName");
        assert_eq!(net_core.version, "1.0.0");
        assert_eq!(net_core.package_version, "1.0.0");
        assert_eq!(net_core.repository_type, "git");
        assert!(net_core.is_packable);
        assert!(net_core.include_build_output);
        assert!(net_core.include_content_in_pack);
        assert!(!net_core.sign_assembly);
        assert!(net_core.runtime_options.concurrent_garbage_collection);
        assert!(!net_core.runtime_options.server_garbage_collection);
    }

    #[test]
    fn package_metadata() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>netstandard2.0</TargetFramework>
    <AssemblyName>Cake.Common</AssemblyName>
    <AssemblyTitle>Cake Common</AssemblyTitle>
    <VersionPrefix>0.26.0</VersionPrefix>
    <VersionSuffix>beta1</VersionSuffix>
    <Authors>Patrik Svensson;Mattias Karlsson</Authors>
    <PackageTags>Cake;Build;Script</PackageTags>
    <PackageProjectUrl>https://cakebuild.net</PackageProjectUrl>
    <PackageLicenseExpression>MIT</PackageLicenseExpression>
    <RepositoryType>GIT</RepositoryType>
    <IsPackable>false</IsPackable>
    <PackageOutputPath>..\..\artifacts\$(Configuration)</PackageOutputPath>
    <SignAssembly>True</SignAssembly>
    <AssemblyOriginatorKeyFile>..\Cake.snk</AssemblyOriginatorKeyFile>
    <NoWarn>$(NoWarn);CS1591;NU5104</NoWarn>
    <WarningsAsErrors>$(WarningsAsErrors);NU1605</WarningsAsErrors>
    <LangVersion>latest</LangVersion>
    <Nullable>enable</Nullable>
    <RuntimeIdentifier>win-x64</RuntimeIdentifier>
    <AssetTargetFallback>net461</AssetTargetFallback>
    <ServerGarbageCollection>true</ServerGarbageCollection>
    <ConcurrentGarbageCollection>false</ConcurrentGarbageCollection>
    <ThreadPoolMinThreads>4</ThreadPoolMinThreads>
    <ThreadPoolMaxThreads>many</ThreadPoolMaxThreads>
  </PropertyGroup>
  <ItemGroup>
    <DotNetCliToolReference Include="dotnet-xunit" Version="2.3.1" />
  </ItemGroup>
  <Target Name="Sign" AfterTargets="Build">
    <Exec Command="sign.cmd" />
  </Target>
</Project>"#;
        let p = parse(xml, "Release", None);
        let nc = p.net_core.unwrap();
        assert_eq!(nc.assembly_title, "Cake Common");
        assert_eq!(nc.package_id, "Cake.Common");
        assert_eq!(nc.version, "0.26.0-beta1");
        assert_eq!(nc.package_version, "0.26.0-beta1");
        assert_eq!(nc.authors, vec!["Patrik Svensson", "Mattias Karlsson"]);
        assert_eq!(nc.package_tags, vec!["Cake", "Build", "Script"]);
        assert_eq!(nc.package_project_url.as_deref(), Some("https://cakebuild.net"));
        assert_eq!(nc.package_license_expression.as_deref(), Some("MIT"));
        assert_eq!(nc.repository_type, "GIT");
        assert!(!nc.is_packable);
        assert_eq!(nc.package_output_path, Some(PathBuf::from("../../artifacts/Release")));
        assert!(nc.sign_assembly);
        assert_eq!(nc.assembly_originator_key_file, Some(PathBuf::from("../Cake.snk")));
        assert_eq!(nc.no_warn, vec!["CS1591", "NU5104"]);
        assert_eq!(nc.treat_specific_warnings_as_errors, vec!["NU1605"]);
        assert_eq!(nc.language_version.as_deref(), Some("latest"));
        assert_eq!(nc.nullable.as_deref(), Some("enable"));
        assert_eq!(nc.runtime_identifiers, vec!["win-x64"]);
        assert_eq!(nc.package_target_fallbacks, vec!["net461"]);
        assert!(nc.runtime_options.server_garbage_collection);
        assert!(!nc.runtime_options.concurrent_garbage_collection);
        assert_eq!(nc.runtime_options.thread_pool_min_threads, Some(4));
        assert_eq!(nc.runtime_options.thread_pool_max_threads, None);
        assert_eq!(nc.dotnet_cli_tool_references[0].name, "dotnet-xunit");
        assert_eq!(nc.targets[0].name, "Sign");
        assert_eq!(nc.targets[0].executables, vec!["sign.cmd"]);
        assert_eq!(nc.title, None);
    }

    #[test]
    fn version_fallbacks() {
        let with = |body: &str| {
            let xml = format!(r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup>{body}</PropertyGroup></Project>"#);
            parse(&xml, "Debug", None).net_core.unwrap()
        };
        assert_eq!(with("<Version>2.1.0</Version>").version, "2.1.0");
        assert_eq!(with("<VersionPrefix>3.0.0</VersionPrefix><Version>2.1.0</Version>").version, "2.1.0");
        assert_eq!(with("<VersionPrefix>3.0.0</VersionPrefix>").version, "1.0.0");
        assert_eq!(with("<VersionSuffix>rc1</VersionSuffix>").version, "1.0.0");
        assert_eq!(
            with("<VersionPrefix>3.0.0</VersionPrefix><VersionSuffix>rc1</VersionSuffix><Version>2.1.0</Version>").version,
            "3.0.0-rc1"
        );
        let nc = with("<Version>2.1.0</Version><PackageVersion>2.1.0-preview</PackageVersion>");
        assert_eq!(nc.package_version, "2.1.0-preview");
    }

    #[test]
    fn conditional_scalars_follow_configuration_and_primary_framework() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFrameworks>netstandard2.0;net6.0</TargetFrameworks>
    <DefineConstants>$(DefineConstants);SHARED</DefineConstants>
    <DebugType>portable</DebugType>
  </PropertyGroup>
  <PropertyGroup Condition="'$(Configuration)|$(Platform)'=='Release|AnyCPU'">
    <Optimize>true</Optimize>
    <DebugType>none</DebugType>
    <TreatWarningsAsErrors>true</TreatWarningsAsErrors>
  </PropertyGroup>
  <PropertyGroup Condition="'$(TargetFramework)'=='netstandard2.0'">
    <DefineConstants>NETSTANDARD</DefineConstants>
  </PropertyGroup>
  <PropertyGroup Condition="'$(TargetFramework)'=='net6.0'">
    <AllowUnsafeBlocks>true</AllowUnsafeBlocks>
  </PropertyGroup>
</Project>"#;
        let release = parse(xml, "release", None).net_core.unwrap();
        assert!(release.optimize);
        assert!(release.treat_warnings_as_errors);
        assert_eq!(release.debug_type.as_deref(), Some("none"));
        assert_eq!(release.define_constants, vec!["NETSTANDARD"]);
        assert!(!release.allow_unsafe_blocks);

        let debug = parse(xml, "Debug", None).net_core.unwrap();
        assert!(!debug.optimize);
        assert_eq!(debug.debug_type.as_deref(), Some("portable"));
    }

    #[test]
    fn unconditioned_define_constants_drop_self_reference() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup><DefineConstants>$(DefineConstants);TRACE;CAKE</DefineConstants></PropertyGroup></Project>"#;
        let nc = parse(xml, "Debug", None).net_core.unwrap();
        assert_eq!(nc.define_constants, vec!["TRACE", "CAKE"]);
    }

    // ── variables ──

    #[test]
    fn project_name_and_globals_substitute_into_paths() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <OutputPath>$(ArtifactsRoot)\$(MSBuildProjectName)\$(TargetFramework)\$(Unknown)</OutputPath>
  </PropertyGroup>
</Project>"#;
        let file = MemoryFile::new("/repo/src/Web/Web.csproj", xml);
        let p = ProjectParser::new()
            .property("ArtifactsRoot", "..\\..\\artifacts")
            .parse(&file, "Debug")
            .unwrap();
        assert_eq!(p.output_path, PathBuf::from("../../artifacts/Web/net8.0/$(Unknown)"));
    }
}
