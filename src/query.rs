//! Convenience queries over a [`ParsedProject`].
//!
//! None of these fail; absent data answers `false` / `None`.

use std::path::PathBuf;

use crate::model::{AssemblyReference, DotNetCliToolReference, PackageReference, ParsedProject};
use crate::project_type::ProjectType;
use crate::text::expand_msbuild_vars;

const TEST_SDK_PACKAGE: &str = "Microsoft.NET.Test.Sdk";
const MSTEST_PACKAGE: &str = "MSTest.TestFramework";
const MSTEST_REFERENCE: &str = "Microsoft.VisualStudio.QualityTools.UnitTestFramework";
const WEB_SDK: &str = "Microsoft.NET.Sdk.Web";
const CLI_TEST_TOOLS: &[&str] = &["dotnet-test", "dotnet-xunit"];
const TEST_FRAMEWORKS: &[&str] = &["xunit", "nunit", "fixie", "expecto"];

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

impl ParsedProject {
    // ── output ──

    /// `OutputType` is `Library`.
    pub fn is_library(&self) -> bool {
        self.output_type.eq_ignore_ascii_case("Library")
    }

    /// `.dll` for libraries, `.exe` otherwise.
    pub fn extension(&self) -> &'static str {
        if self.is_library() { ".dll" } else { ".exe" }
    }

    /// The built assembly for the first target framework.
    pub fn assembly_file_path(&self) -> PathBuf {
        self.assembly_in(&self.output_path)
    }

    /// The built assembly for every target framework, in declaration order.
    pub fn assembly_file_paths(&self) -> Vec<PathBuf> {
        self.output_paths.iter().map(|dir| self.assembly_in(dir)).collect()
    }

    fn assembly_in(&self, output_dir: &std::path::Path) -> PathBuf {
        let directory = self.project_file.parent().unwrap_or(std::path::Path::new(""));
        directory
            .join(output_dir)
            .join(format!("{}{}", self.assembly_name, self.extension()))
    }

    // ── project kinds ──

    /// The project declares `kind` in `ProjectTypeGuids`.
    pub fn is_type(&self, kind: ProjectType) -> bool {
        ProjectType::matches(self.project_type_guids.as_deref(), kind)
    }

    pub fn is_web_application(&self) -> bool {
        match &self.net_core {
            Some(net_core) => net_core.sdk.eq_ignore_ascii_case(WEB_SDK),
            None => self.is_type(ProjectType::WebApplication),
        }
    }

    // ── test projects ──

    /// Either a classic or an SDK-style test project.
    pub fn is_test_project(&self) -> bool {
        self.is_framework_test_project() || self.is_dotnet_cli_test_project()
    }

    /// A legacy project that is a test project by kind or by a referenced
    /// test framework assembly. Package references are not consulted.
    pub fn is_framework_test_project(&self) -> bool {
        self.net_core.is_none()
            && (self.is_type(ProjectType::Test)
                || self.has_reference(MSTEST_REFERENCE)
                || TEST_FRAMEWORKS
                    .iter()
                    .any(|framework| self.references_mention(framework)))
    }

    /// An SDK-style project wired for `dotnet test`.
    pub fn is_dotnet_cli_test_project(&self) -> bool {
        self.net_core.is_some()
            && (self.has_package(TEST_SDK_PACKAGE, None)
                || CLI_TEST_TOOLS
                    .iter()
                    .any(|tool| self.has_dotnet_cli_tool_reference(tool)))
    }

    pub fn is_xunit_test_project(&self) -> bool {
        self.mentions("xunit")
    }

    pub fn is_nunit_test_project(&self) -> bool {
        self.mentions("nunit")
    }

    pub fn is_mstest_test_project(&self) -> bool {
        self.has_package(MSTEST_PACKAGE, None)
            || self.has_reference(MSTEST_REFERENCE)
            || self.is_type(ProjectType::Test)
    }

    pub fn is_fixie_test_project(&self) -> bool {
        self.mentions("fixie")
    }

    pub fn is_expecto_test_project(&self) -> bool {
        self.mentions("expecto")
    }

    /// Some package or assembly reference name contains `needle`.
    fn mentions(&self, needle: &str) -> bool {
        self.package_references
            .iter()
            .any(|p| contains_ignore_case(&p.name, needle))
            || self.references_mention(needle)
    }

    fn references_mention(&self, needle: &str) -> bool {
        self.references.iter().any(|r| contains_ignore_case(&r.name, needle))
    }

    // ── packages and references ──

    /// See [`ParsedProject::get_package`].
    pub fn has_package(&self, name: &str, target_framework: Option<&str>) -> bool {
        self.get_package(name, target_framework).is_some()
    }

    /// The `PackageReference` called `name`.
    ///
    /// With a `target_framework`, a reference discriminated for exactly that
    /// framework is preferred; references without a discriminator apply to
    /// every framework and are returned otherwise.
    pub fn get_package(&self, name: &str, target_framework: Option<&str>) -> Option<&PackageReference> {
        let mut named = self
            .package_references
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(name));

        let Some(tfm) = target_framework else {
            return named.next();
        };
        let mut fallback = None;
        for package in named {
            match package.target_framework.as_deref() {
                Some(t) if t.eq_ignore_ascii_case(tfm) => return Some(package),
                None if fallback.is_none() => fallback = Some(package),
                _ => {}
            }
        }
        fallback
    }

    pub fn has_reference(&self, name: &str) -> bool {
        self.get_reference(name).is_some()
    }

    pub fn get_reference(&self, name: &str) -> Option<&AssemblyReference> {
        self.references.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn has_dotnet_cli_tool_reference(&self, name: &str) -> bool {
        self.get_dotnet_cli_tool_reference(name).is_some()
    }

    /// Always `None` for legacy projects.
    pub fn get_dotnet_cli_tool_reference(&self, name: &str) -> Option<&DotNetCliToolReference> {
        self.net_core
            .as_ref()?
            .dotnet_cli_tool_references
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    // ── raw properties ──

    /// Any property by name, resolved for this result's configuration,
    /// platform and primary target framework, with `$(Var)` references
    /// substituted. Declared-but-empty properties are `None`.
    pub fn get_project_property(&self, name: &str) -> Option<String> {
        self.properties
            .resolve(name, &self.variables)
            .filter(|value| !value.trim().is_empty())
            .map(|value| expand_msbuild_vars(value, &self.variables))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
