//! Entry points: file access, dialect detection and the parser builder.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use crate::condition::bind;
use crate::error::{ParseError, ParseResult};
use crate::model::ParsedProject;
use crate::properties::PropertyTable;
use crate::text;
use crate::xml::Scope;
use crate::{legacy, sdk};

/// Platform used when none is requested.
pub const DEFAULT_PLATFORM: &str = "AnyCPU";

// ═══════════════════════════════════════════════════════════════════════════════
//  File access
// ═══════════════════════════════════════════════════════════════════════════════

/// Something that can be parsed as a project file.
pub trait ProjectFile {
    /// Path used for error messages, the default assembly name and
    /// resolving relative item paths.
    fn path(&self) -> &Path;
    fn exists(&self) -> bool;
    fn read_to_string(&self) -> io::Result<String>;
}

impl ProjectFile for Path {
    fn path(&self) -> &Path {
        self
    }

    fn exists(&self) -> bool {
        Path::exists(self)
    }

    fn read_to_string(&self) -> io::Result<String> {
        std::fs::read_to_string(self)
    }
}

impl ProjectFile for PathBuf {
    fn path(&self) -> &Path {
        self.as_path()
    }

    fn exists(&self) -> bool {
        self.as_path().exists()
    }

    fn read_to_string(&self) -> io::Result<String> {
        std::fs::read_to_string(self)
    }
}

/// An in-memory project file. Always exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    path: PathBuf,
    contents: String,
}

impl MemoryFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

impl ProjectFile for MemoryFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self) -> bool {
        true
    }

    fn read_to_string(&self) -> io::Result<String> {
        Ok(self.contents.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Loaded document
// ═══════════════════════════════════════════════════════════════════════════════

/// A loaded project document plus everything both dialect parsers need.
pub(crate) struct ProjectDocument<'a, 'input> {
    pub path: &'a Path,
    /// Directory holding the project file; item paths resolve against it.
    pub directory: PathBuf,
    /// Project file name without extension.
    pub stem: String,
    pub root: Node<'a, 'input>,
    pub scope: Scope<'a>,
    pub table: PropertyTable,
    pub configuration: &'a str,
    pub platform: &'a str,
    /// Global properties with the build variables bound on top.
    pub variables: HashMap<String, String>,
}

impl<'a, 'input> ProjectDocument<'a, 'input> {
    fn new(
        path: &'a Path,
        root: Node<'a, 'input>,
        configuration: &'a str,
        platform: &'a str,
        globals: &HashMap<String, String>,
    ) -> Self {
        let scope = Scope::of(root);
        let stem = text::file_stem(path);

        // Build variables win over global properties of the same name.
        let mut variables = globals.clone();
        bind(&mut variables, "Configuration", configuration);
        bind(&mut variables, "Platform", platform);
        bind(&mut variables, "MSBuildProjectName", stem.as_str());

        Self {
            path,
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            stem,
            root,
            scope,
            table: PropertyTable::from_root(root, scope),
            configuration,
            platform,
            variables,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  ProjectParser – configuration and global properties
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for parsing projects with a platform and global properties.
///
/// Global properties are seeded into the `$(Var)` map before conditions are
/// evaluated. `Configuration`, `Platform` and `MSBuildProjectName` are always
/// bound on top of them.
///
/// # Example
/// ```no_run
/// use csproj_rs::ProjectParser;
///
/// let project = ProjectParser::new()
///     .platform("x64")
///     .property("SolutionDir", "/src/")
///     .parse(std::path::Path::new("App/App.csproj"), "Release")
///     .unwrap();
/// println!("{}", project.assembly_file_path().display());
/// ```
#[derive(Debug, Clone)]
pub struct ProjectParser {
    platform: String,
    properties: HashMap<String, String>,
}

impl Default for ProjectParser {
    fn default() -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_string(),
            properties: HashMap::new(),
        }
    }
}

impl ProjectParser {
    /// A parser for platform `AnyCPU` with no global properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the platform. Blank values select `AnyCPU`.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        let platform = platform.into();
        self.platform = match platform.trim() {
            "" => DEFAULT_PLATFORM.to_string(),
            p => p.to_string(),
        };
        self
    }

    /// Set a single global property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Merge a map of global properties. Later calls override earlier values
    /// for the same key.
    pub fn properties(mut self, vars: HashMap<String, String>) -> Self {
        self.properties.extend(vars);
        self
    }

    /// Pull all current process environment variables in as global
    /// properties, as MSBuild does.
    pub fn system_env(mut self) -> Self {
        self.properties.extend(std::env::vars());
        self
    }

    /// Parse `file` for `configuration`.
    pub fn parse<F: ProjectFile + ?Sized>(
        &self,
        file: &F,
        configuration: &str,
    ) -> ParseResult<ParsedProject> {
        let path = file.path();
        if !file.exists() {
            return Err(ParseError::FileNotFound { path: path.to_path_buf() });
        }
        if path.extension().is_none() {
            return Err(ParseError::UnknownFileType { path: path.to_path_buf() });
        }
        let source = file.read_to_string().map_err(|e| ParseError::MalformedXml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.parse_str(path, &source, configuration)
    }

    /// Parse project XML that was already loaded; `path` names the project
    /// for defaults and relative item paths.
    pub fn parse_str(
        &self,
        path: impl AsRef<Path>,
        source: &str,
        configuration: &str,
    ) -> ParseResult<ParsedProject> {
        let path = path.as_ref();
        let doc = roxmltree::Document::parse(source).map_err(|e| ParseError::MalformedXml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "Project" {
            return Err(ParseError::MalformedXml {
                path: path.to_path_buf(),
                message: format!("expected <Project> root element, found <{}>", root.tag_name().name()),
            });
        }

        if configuration.trim().is_empty() {
            return Err(ParseError::PropertyExtractionFailed {
                path: path.to_path_buf(),
                message: "Configuration must not be empty".to_string(),
            });
        }

        let project = ProjectDocument::new(path, root, configuration, &self.platform, &self.properties);
        let result = match root.attribute("Sdk").and_then(text::non_empty) {
            Some(sdk) => sdk::parse(&project, sdk),
            None => legacy::parse(&project)?,
        };

        log::debug!("parsed {}:\n{result:#?}", path.display());
        Ok(result)
    }
}

/// Parse `file` for `configuration` and `platform` (`AnyCPU` when `None`).
pub fn parse_project<F: ProjectFile + ?Sized>(
    file: &F,
    configuration: &str,
    platform: Option<&str>,
) -> ParseResult<ParsedProject> {
    let mut parser = ProjectParser::new();
    if let Some(platform) = platform {
        parser = parser.platform(platform);
    }
    parser.parse(file, configuration)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
