//! Package snapshots and the content they resolve to

use log::warn;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::BTreeMap, fmt, path::Path};
use thiserror::Error;

/// Registry used when a package identity does not name one
pub const DEFAULT_SOURCE: &str = "https://api.nuget.org/v3/index.json";

/// Name, version and registry of a package
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
    pub source: String,
}

impl PackageIdentity {
    /// Identify a package on the default registry
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source: DEFAULT_SOURCE.to_owned(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// The files of one package version.
///
/// `raw_files` holds the bytes of every file in the package. `derived_text` holds text produced
/// from some of those files by a [`Decompiler`] and takes precedence over the raw bytes when
/// both exist for a path. The two maps may cover different paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageSnapshot {
    identity: PackageIdentity,
    raw_files: BTreeMap<String, Vec<u8>>,
    derived_text: BTreeMap<String, String>,
}

impl PackageSnapshot {
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            raw_files: BTreeMap::new(),
            derived_text: BTreeMap::new(),
        }
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    pub fn raw_files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.raw_files
    }

    pub fn derived_text(&self) -> &BTreeMap<String, String> {
        &self.derived_text
    }

    pub fn insert_raw(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.raw_files.insert(path.into(), bytes.into());
        self
    }

    pub fn insert_derived(
        &mut self,
        path: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Self {
        self.derived_text.insert(path.into(), text.into());
        self
    }

    /// Every path known to this snapshot. A path present in both maps is yielded twice.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.raw_files
            .keys()
            .chain(self.derived_text.keys())
            .map(String::as_str)
    }

    /// The text a path is compared by, or `None` when the snapshot does not contain it.
    ///
    /// Derived text wins over raw bytes. Raw bytes which are not valid UTF-8 resolve to a
    /// placeholder describing their size.
    pub fn resolve_content(&self, path: &str) -> Option<Cow<'_, str>> {
        if let Some(text) = self.derived_text.get(path) {
            return Some(Cow::Borrowed(text));
        }

        let bytes = self.raw_files.get(path)?;
        Some(match std::str::from_utf8(bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => Cow::Owned(binary_placeholder(bytes.len())),
        })
    }

    /// Run `decompiler` over every raw file it accepts, recording its output as derived text.
    ///
    /// Empty output is ignored. A failure is recorded as a placeholder comment in place of the
    /// output so the file still takes part in comparison. Returns the number of failures.
    pub fn decompile_with<D>(&mut self, decompiler: &D) -> usize
    where
        D: Decompiler + ?Sized,
    {
        let mut failures = 0;

        for (path, bytes) in &self.raw_files {
            if !decompiler.accepts(path) {
                continue;
            }

            match decompiler.decompile(path, bytes) {
                Ok(text) if text.is_empty() => {}
                Ok(text) => {
                    self.derived_text.insert(path.clone(), text);
                }
                Err(err) => {
                    warn!("{}: decompiling {path} failed: {err}", self.identity);
                    failures += 1;
                    self.derived_text.insert(path.clone(), err.placeholder(path));
                }
            }
        }

        failures
    }
}

/// Text standing in for a file which could not be decoded as UTF-8
pub fn binary_placeholder(len: usize) -> String {
    format!("[Binary file - {len} bytes]")
}

/// Whether `path` names an executable module (`.dll` or `.exe`)
pub fn is_executable_module(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dll") || ext.eq_ignore_ascii_case("exe"))
}

/// An error returned by a [`Decompiler`]
#[derive(Debug, Error)]
pub enum DecompileError {
    #[error("not a valid executable module")]
    InvalidModule,
    #[error("{0}")]
    Failed(String),
}

impl DecompileError {
    /// The text recorded for `path` in place of its decompiled output
    pub fn placeholder(&self, path: &str) -> String {
        match self {
            DecompileError::InvalidModule => format!("// {path} is not a valid executable module"),
            DecompileError::Failed(reason) => format!("// Error decompiling {path}: {reason}"),
        }
    }
}

/// Turns binary modules into comparable text
pub trait Decompiler {
    /// Whether this decompiler should be run on `path`
    fn accepts(&self, path: &str) -> bool {
        is_executable_module(path)
    }

    fn decompile(&self, path: &str, bytes: &[u8]) -> Result<String, DecompileError>;
}

impl<F> Decompiler for F
where
    F: Fn(&str, &[u8]) -> Result<String, DecompileError>,
{
    fn decompile(&self, path: &str, bytes: &[u8]) -> Result<String, DecompileError> {
        self(path, bytes)
    }
}
