//! Tools for comparing two versions of a package file by file and line by line
//!
//! A [`PackageSnapshot`] maps file paths to raw bytes and, optionally, to derived text such as
//! the decompiled listing of an executable module. [`compare`] reconciles two snapshots into a
//! [`ComparisonResult`] holding one [`FileDiff`] per path, sorted by path. Modified files carry a
//! side-by-side alignment of their lines, see [`align`].

mod align;
mod compare;
mod format;
mod request;
mod snapshot;
mod utils;

pub use align::{AlignOptions, Alignment, DiffLine, LineOrder, LineTag, align};
pub use compare::{
    ChangeKind, CompareOptions, ComparisonResult, FileChange, FileDiff, Summary, compare,
};
pub use format::ComparisonFormatter;
pub use request::{ComparisonRequest, RequestError};
pub use snapshot::{
    DEFAULT_SOURCE, DecompileError, Decompiler, PackageIdentity, PackageSnapshot,
    binary_placeholder, is_executable_module,
};
