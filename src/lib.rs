//! Parse MSBuild `.csproj` / `.fsproj` project files.
//!
//! Both the classic layout (explicit `Configuration|Platform` property
//! groups, `ProjectTypeGuids`) and SDK-style projects
//! (`<Project Sdk="Microsoft.NET.Sdk">`, multi-targeting) are read into one
//! [`ParsedProject`] for a requested configuration and platform.
//!
//! ```no_run
//! use csproj_rs::parse_project;
//! use std::path::Path;
//!
//! let project = parse_project(Path::new("src/App/App.csproj"), "Release", None).unwrap();
//! for path in project.assembly_file_paths() {
//!     println!("{}", path.display());
//! }
//! ```

pub mod condition;
pub mod error;
pub mod model;
pub mod moniker;
pub mod parser;
pub mod project_type;
pub mod properties;
pub mod text;
pub mod xml;

mod items;
mod legacy;
mod query;
mod sdk;

pub use error::{ParseError, ParseResult};
pub use model::{
    AssemblyReference, BuildTarget, DotNetCliToolReference, NetCoreProperties, PackageReference,
    ParsedProject, ProjectFileEntry, ProjectReference, RuntimeOptions,
};
pub use parser::{MemoryFile, ProjectFile, ProjectParser, parse_project};
pub use project_type::ProjectType;
