//! Syntax lookup
//!
//! Finds syntax definitions by id or by file extension.
//!
//! Lookup priority:
//! 1. User config: `~/.config/parsehl/syntaxes/{id}.yaml`
//! 2. Embedded: built-in syntaxes compiled into the binary

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::definition::ParseDefinition;
use super::file::SyntaxFile;
use crate::error::{Error, Result};

pub const RUST_YAML: &str = include_str!("../../syntaxes/rust.yaml");
pub const PYTHON_YAML: &str = include_str!("../../syntaxes/python.yaml");
pub const JAVASCRIPT_YAML: &str = include_str!("../../syntaxes/javascript.yaml");
pub const SHELL_YAML: &str = include_str!("../../syntaxes/shell.yaml");

/// A built-in syntax entry
pub struct BuiltinSyntax {
    /// Stable identifier (e.g. "rust")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

pub const BUILTIN_SYNTAXES: &[BuiltinSyntax] = &[
    BuiltinSyntax {
        id: "rust",
        yaml: RUST_YAML,
    },
    BuiltinSyntax {
        id: "python",
        yaml: PYTHON_YAML,
    },
    BuiltinSyntax {
        id: "javascript",
        yaml: JAVASCRIPT_YAML,
    },
    BuiltinSyntax {
        id: "shell",
        yaml: SHELL_YAML,
    },
];

/// Where a syntax came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxSource {
    User,
    Builtin,
}

#[derive(Debug, Clone)]
pub struct SyntaxInfo {
    pub id: String,
    /// Display name from YAML (e.g. "Rust")
    pub name: String,
    pub extensions: Vec<String>,
    pub source: SyntaxSource,
}

/// A loaded syntax: its file model and compiled definition
#[derive(Debug, Clone)]
pub struct Syntax {
    pub id: String,
    pub file: SyntaxFile,
    pub definition: ParseDefinition,
}

impl Syntax {
    fn from_file(id: impl Into<String>, file: SyntaxFile) -> Result<Self> {
        let definition = file.to_definition()?;
        Ok(Self {
            id: id.into(),
            file,
            definition,
        })
    }

    pub fn from_yaml(id: impl Into<String>, yaml: &str) -> Result<Self> {
        Self::from_file(id, SyntaxFile::from_yaml(yaml)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom")
            .to_string();
        Self::from_file(id, SyntaxFile::from_path(path)?)
    }

    /// Load a built-in syntax by id
    pub fn builtin(id: &str) -> Result<Self> {
        let entry = BUILTIN_SYNTAXES
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::invalid_definition(format!("Unknown syntax id: {}", id)))?;
        Self::from_yaml(entry.id, entry.yaml)
    }
}

/// Resolves syntaxes from a user directory, falling back to built-ins
#[derive(Debug, Clone, Default)]
pub struct SyntaxRegistry {
    user_dir: Option<PathBuf>,
}

impl SyntaxRegistry {
    pub fn new(user_dir: Option<PathBuf>) -> Self {
        Self { user_dir }
    }

    /// Registry over `~/.config/parsehl/syntaxes/`
    pub fn from_config_dir() -> Self {
        Self::new(crate::config_paths::syntaxes_dir())
    }

    pub fn user_dir(&self) -> Option<&Path> {
        self.user_dir.as_deref()
    }

    /// Load syntax by id with priority: user → builtin
    pub fn load(&self, id: &str) -> Result<Syntax> {
        if let Some(path) = self.user_path(id) {
            tracing::info!("Loading user syntax from {}", path.display());
            return Syntax::from_path(&path);
        }

        tracing::debug!("Loading builtin syntax: {}", id);
        Syntax::builtin(id)
    }

    /// Find a syntax whose extensions include `path`'s extension
    pub fn for_path(&self, path: &Path) -> Option<Syntax> {
        let ext = path.extension().and_then(|e| e.to_str())?;

        for (path, file) in self.user_files() {
            if file.matches_extension(ext) {
                match Syntax::from_path(&path) {
                    Ok(syntax) => return Some(syntax),
                    Err(e) => tracing::warn!("Skipping syntax {}: {}", path.display(), e),
                }
            }
        }

        BUILTIN_SYNTAXES.iter().find_map(|builtin| {
            let file = SyntaxFile::from_yaml(builtin.yaml).ok()?;
            if !file.matches_extension(ext) {
                return None;
            }
            Syntax::from_file(builtin.id, file)
                .map_err(|e| tracing::warn!("Builtin syntax {} is invalid: {}", builtin.id, e))
                .ok()
        })
    }

    /// List every available syntax; user syntaxes shadow builtins with the same id
    pub fn list(&self) -> Vec<SyntaxInfo> {
        let mut syntaxes = Vec::new();
        let mut seen_ids = HashSet::new();

        for (path, file) in self.user_files() {
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                if seen_ids.insert(id.to_string()) {
                    syntaxes.push(SyntaxInfo {
                        id: id.to_string(),
                        name: file.name,
                        extensions: file.extensions,
                        source: SyntaxSource::User,
                    });
                }
            }
        }

        for builtin in BUILTIN_SYNTAXES {
            if !seen_ids.insert(builtin.id.to_string()) {
                continue;
            }
            let (name, extensions) = match SyntaxFile::from_yaml(builtin.yaml) {
                Ok(file) => (file.name, file.extensions),
                Err(_) => (builtin.id.to_string(), Vec::new()),
            };
            syntaxes.push(SyntaxInfo {
                id: builtin.id.to_string(),
                name,
                extensions,
                source: SyntaxSource::Builtin,
            });
        }

        syntaxes
    }

    fn user_path(&self, id: &str) -> Option<PathBuf> {
        let dir = self.user_dir.as_ref()?;
        ["yaml", "yml"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", id, ext)))
            .find(|p| p.exists())
    }

    /// Parsed user syntax files, sorted by path; unreadable files are skipped
    fn user_files(&self) -> Vec<(PathBuf, SyntaxFile)> {
        let Some(dir) = &self.user_dir else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "yaml" || ext == "yml"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .filter_map(|path| match SyntaxFile::from_path(&path) {
                Ok(file) => Some((path, file)),
                Err(e) => {
                    tracing::warn!("Failed to parse syntax {}: {}", path.display(), e);
                    None
                }
            })
            .collect()
    }
}
