use crate::{
    align::{AlignOptions, Alignment, DiffLine},
    snapshot::{PackageIdentity, PackageSnapshot},
};
use log::{debug, trace};
use serde::Serialize;
use std::{collections::BTreeSet, fmt};


/// How a file differs between two snapshots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
            ChangeKind::Unchanged => "unchanged",
        })
    }
}

/// The content of a file on each side, by classification
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FileChange {
    /// Only present in the new snapshot
    Added { new_text: String },
    /// Only present in the old snapshot
    Removed { old_text: String },
    /// Present in both with different content
    Modified {
        old_text: String,
        new_text: String,
        lines: Vec<DiffLine>,
    },
    /// Identical on both sides. `text` is `None` when neither side has the file.
    Unchanged { text: Option<String> },
}

impl FileChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            FileChange::Added { .. } => ChangeKind::Added,
            FileChange::Removed { .. } => ChangeKind::Removed,
            FileChange::Modified { .. } => ChangeKind::Modified,
            FileChange::Unchanged { .. } => ChangeKind::Unchanged,
        }
    }
}

/// The comparison of a single path
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    path: String,
    #[serde(flatten)]
    change: FileChange,
}

impl FileDiff {
    pub fn new(path: impl Into<String>, change: FileChange) -> Self {
        Self {
            path: path.into(),
            change,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn change(&self) -> &FileChange {
        &self.change
    }

    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }

    pub fn old_text(&self) -> Option<&str> {
        match &self.change {
            FileChange::Removed { old_text } | FileChange::Modified { old_text, .. } => {
                Some(old_text.as_str())
            }
            FileChange::Unchanged { text } => text.as_deref(),
            FileChange::Added { .. } => None,
        }
    }

    pub fn new_text(&self) -> Option<&str> {
        match &self.change {
            FileChange::Added { new_text } | FileChange::Modified { new_text, .. } => {
                Some(new_text.as_str())
            }
            FileChange::Unchanged { text } => text.as_deref(),
            FileChange::Removed { .. } => None,
        }
    }

    /// The aligned lines of a modified file; empty for every other kind
    pub fn lines(&self) -> &[DiffLine] {
        match &self.change {
            FileChange::Modified { lines, .. } => lines.as_slice(),
            _ => &[],
        }
    }
}

/// Number of files of each kind in a [`ComparisonResult`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

/// The comparison of two package snapshots.
///
/// Holds one [`FileDiff`] per distinct path found in either snapshot, sorted by path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    old_package: PackageIdentity,
    new_package: PackageIdentity,
    files: Vec<FileDiff>,
    anomalies: usize,
}

impl ComparisonResult {
    pub fn old_package(&self) -> &PackageIdentity {
        &self.old_package
    }

    pub fn new_package(&self) -> &PackageIdentity {
        &self.new_package
    }

    pub fn files(&self) -> &[FileDiff] {
        &self.files
    }

    /// Look up the comparison of a single path
    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files
            .binary_search_by(|file| file.path().cmp(path))
            .ok()
            .map(|idx| &self.files[idx])
    }

    /// Total alignment anomalies across all modified files, see [`Alignment::anomalies`]
    ///
    /// [`Alignment::anomalies`]: crate::Alignment::anomalies
    pub fn anomalies(&self) -> usize {
        self.anomalies
    }

    pub fn summary(&self) -> Summary {
        self.files
            .iter()
            .fold(Summary::default(), |mut summary, file| {
                match file.kind() {
                    ChangeKind::Added => summary.added += 1,
                    ChangeKind::Removed => summary.removed += 1,
                    ChangeKind::Modified => summary.modified += 1,
                    ChangeKind::Unchanged => summary.unchanged += 1,
                }
                summary
            })
    }
}

/// Collection of options for modifying the way snapshots are compared
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompareOptions {
    align: AlignOptions,
}

impl CompareOptions {
    /// Construct a new `CompareOptions` with default settings
    ///
    /// ## Defaults
    /// * align_options = `AlignOptions::default()`
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the options used to align the lines of modified files
    pub fn set_align_options(&mut self, align: AlignOptions) -> &mut Self {
        self.align = align;
        self
    }

    /// Compare two package snapshots
    pub fn compare(&self, old: &PackageSnapshot, new: &PackageSnapshot) -> ComparisonResult {
        let paths: BTreeSet<&str> = old.paths().chain(new.paths()).collect();

        let entries = paths.into_iter().map(|path| {
            let old_text = old.resolve_content(path);
            let new_text = new.resolve_content(path);
            let (change, anomalies) =
                self.compare_text(old_text.as_deref(), new_text.as_deref());
            trace!("{path}: {}", change.kind());
            (FileDiff::new(path, change), anomalies)
        });
        let result = assemble(old.identity().clone(), new.identity().clone(), entries);

        let summary = result.summary();
        debug!(
            "compared {} with {}: {} added, {} removed, {} modified, {} unchanged",
            result.old_package,
            result.new_package,
            summary.added,
            summary.removed,
            summary.modified,
            summary.unchanged,
        );

        result
    }

    /// Classify a single file from its content on each side, `None` meaning absent.
    ///
    /// Returns the change along with the number of alignment anomalies it produced.
    pub fn compare_text(&self, old: Option<&str>, new: Option<&str>) -> (FileChange, usize) {
        let change = match (old, new) {
            (None, None) => FileChange::Unchanged { text: None },
            (None, Some(new)) => FileChange::Added {
                new_text: new.to_owned(),
            },
            (Some(old), None) => FileChange::Removed {
                old_text: old.to_owned(),
            },
            (Some(old), Some(new)) if old == new => FileChange::Unchanged {
                text: Some(old.to_owned()),
            },
            (Some(old), Some(new)) => return modified(old, new, self.align.align(old, new)),
        };

        (change, 0)
    }
}

// Collects per-file entries, already sorted by path, into a result carrying their summed
// anomaly count.
fn assemble(
    old_package: PackageIdentity,
    new_package: PackageIdentity,
    entries: impl IntoIterator<Item = (FileDiff, usize)>,
) -> ComparisonResult {
    let mut anomalies = 0;
    let files: Vec<FileDiff> = entries
        .into_iter()
        .map(|(file, file_anomalies)| {
            anomalies += file_anomalies;
            file
        })
        .collect();

    debug_assert!(files.windows(2).all(|w| w[0].path < w[1].path));

    ComparisonResult {
        old_package,
        new_package,
        files,
        anomalies,
    }
}

fn modified(old: &str, new: &str, alignment: Alignment) -> (FileChange, usize) {
    debug_assert!(
        !alignment.lines().is_empty(),
        "differing texts produced an empty alignment"
    );
    let anomalies = alignment.anomalies();
    let change = FileChange::Modified {
        old_text: old.to_owned(),
        new_text: new.to_owned(),
        lines: alignment.into_lines(),
    };
    (change, anomalies)
}

/// Compare two package snapshots using the default [`CompareOptions`]
///
/// ```
/// use pkgdiff::{ChangeKind, PackageIdentity, PackageSnapshot};
///
/// let mut old = PackageSnapshot::new(PackageIdentity::new("Example", "1.0.0"));
/// old.insert_raw("readme.txt", "a\nb\nc");
/// let mut new = PackageSnapshot::new(PackageIdentity::new("Example", "1.1.0"));
/// new.insert_raw("readme.txt", "a\nx\nc").insert_raw("notes.txt", "hello");
///
/// let result = pkgdiff::compare(&old, &new);
/// let kinds: Vec<_> = result.files().iter().map(|f| (f.path(), f.kind())).collect();
/// assert_eq!(
///     kinds,
///     [("notes.txt", ChangeKind::Added), ("readme.txt", ChangeKind::Modified)]
/// );
/// ```
pub fn compare(old: &PackageSnapshot, new: &PackageSnapshot) -> ComparisonResult {
    CompareOptions::default().compare(old, new)
}
