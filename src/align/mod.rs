use crate::utils::{Classifier, LineKey};
use log::warn;
use serde::Serialize;
use std::{collections::VecDeque, fmt};

mod myers;


/// The role a line plays in an alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTag {
    /// Present on both sides
    Unchanged,
    /// Only present in the new text
    Inserted,
    /// Only present in the old text
    Deleted,
}

impl fmt::Display for LineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineTag::Unchanged => "unchanged",
            LineTag::Inserted => "inserted",
            LineTag::Deleted => "deleted",
        })
    }
}

/// A single row of a side-by-side alignment.
///
/// Line numbers are 1-based. A `Deleted` line only has an old number, an `Inserted` line only
/// has a new number and an `Unchanged` line has both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    old_line_number: Option<usize>,
    new_line_number: Option<usize>,
    text: String,
    tag: LineTag,
}

impl DiffLine {
    /// Construct an `Unchanged` line present at `old` in the old text and `new` in the new text
    pub fn unchanged(old: usize, new: usize, text: impl Into<String>) -> Self {
        Self::checked(Some(old), Some(new), text.into(), LineTag::Unchanged)
    }

    /// Construct a line removed from position `old` of the old text
    pub fn deleted(old: usize, text: impl Into<String>) -> Self {
        Self::checked(Some(old), None, text.into(), LineTag::Deleted)
    }

    /// Construct a line added at position `new` of the new text
    pub fn inserted(new: usize, text: impl Into<String>) -> Self {
        Self::checked(None, Some(new), text.into(), LineTag::Inserted)
    }

    // Phase one of the alignment: the new number is filled in once its partner is found.
    fn anchor(old: usize, text: &str) -> Self {
        Self {
            old_line_number: Some(old),
            new_line_number: None,
            text: text.to_owned(),
            tag: LineTag::Unchanged,
        }
    }

    fn checked(old: Option<usize>, new: Option<usize>, text: String, tag: LineTag) -> Self {
        debug_assert!(old.is_none_or(|n| n > 0) && new.is_none_or(|n| n > 0));
        Self {
            old_line_number: old,
            new_line_number: new,
            text,
            tag,
        }
    }

    pub fn old_line_number(&self) -> Option<usize> {
        self.old_line_number
    }

    pub fn new_line_number(&self) -> Option<usize> {
        self.new_line_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tag(&self) -> LineTag {
        self.tag
    }
}

/// Final ordering of the lines in an [`Alignment`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineOrder {
    /// Keyed on old line numbers. Inserted lines borrow the old number of the next unchanged line
    /// in the new text and sit directly before it, so that reading the lines top to bottom yields
    /// both texts in order.
    #[default]
    Anchored,
    /// Sorted by old line number then new line number, with absent numbers sorting last. All
    /// inserted lines end up after every line of the old text.
    Numeric,
}

/// The aligned lines of two texts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    lines: Vec<DiffLine>,
    anomalies: usize,
}

impl Alignment {
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<DiffLine> {
        self.lines
    }

    /// Number of unchanged lines which could not be paired with their counterpart on the other
    /// side and were emitted as a deletion or insertion instead.
    ///
    /// This is always zero unless the underlying line diff produced inconsistent output.
    pub fn anomalies(&self) -> usize {
        self.anomalies
    }

    fn sort(&mut self, order: LineOrder) {
        match order {
            LineOrder::Numeric => self.lines.sort_by_key(|line| {
                (
                    line.old_line_number.unwrap_or(usize::MAX),
                    line.new_line_number.unwrap_or(usize::MAX),
                )
            }),
            LineOrder::Anchored => {
                // (new, old) of every paired line, ascending on both sides.
                let anchors: Vec<(usize, usize)> = self
                    .lines
                    .iter()
                    .filter_map(|line| line.new_line_number.zip(line.old_line_number))
                    .collect();

                self.lines.sort_by_key(|line| match line.old_line_number {
                    Some(old) => (old, 1, 0),
                    None => {
                        let new = line.new_line_number.unwrap_or(usize::MAX);
                        let next = anchors.partition_point(|&(anchor, _)| anchor < new);
                        let old = anchors.get(next).map_or(usize::MAX, |&(_, old)| old);
                        (old, 0, new)
                    }
                });
            }
        }
    }
}

/// Collection of options for modifying the way an alignment is computed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlignOptions {
    key: LineKey,
    order: LineOrder,
}

impl AlignOptions {
    /// Construct a new `AlignOptions` with default settings
    ///
    /// ## Defaults
    /// * ignore_whitespace = false
    /// * ignore_case = false
    /// * line_order = `LineOrder::Anchored`
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare lines with leading and trailing whitespace trimmed.
    ///
    /// Lines which only match once trimmed still anchor the alignment, but are emitted as a
    /// deletion of the old text followed by an insertion of the new text, so both sides keep
    /// their original, untrimmed lines.
    pub fn set_ignore_whitespace(&mut self, ignore_whitespace: bool) -> &mut Self {
        self.key.ignore_whitespace = ignore_whitespace;
        self
    }

    /// Compare lines case-insensitively.
    ///
    /// As with [`set_ignore_whitespace`](Self::set_ignore_whitespace), lines whose text differs
    /// only in case are emitted as a deletion and an insertion.
    pub fn set_ignore_case(&mut self, ignore_case: bool) -> &mut Self {
        self.key.ignore_case = ignore_case;
        self
    }

    /// Set how the final lines are ordered
    pub fn set_line_order(&mut self, order: LineOrder) -> &mut Self {
        self.order = order;
        self
    }

    /// Align the lines of `old` and `new`
    pub fn align(&self, old: &str, new: &str) -> Alignment {
        let mut classifier = Classifier::new(self.key);
        let (old_lines, old_ids) = classifier.classify_lines(old);
        let (new_lines, new_ids) = classifier.classify_lines(new);

        let (old_changed, new_changed) = myers::diff(&old_ids, &new_ids);

        let mut alignment = fuse(&old_lines, &old_changed, &new_lines, &new_changed);
        alignment.sort(self.order);
        alignment
    }
}

/// Align the lines of two texts using the default [`AlignOptions`]
///
/// ```
/// use pkgdiff::{align, DiffLine};
///
/// let lines = align("a\nb\nc", "a\nx\nc");
/// assert_eq!(
///     lines,
///     vec![
///         DiffLine::unchanged(1, 1, "a"),
///         DiffLine::deleted(2, "b"),
///         DiffLine::inserted(2, "x"),
///         DiffLine::unchanged(3, 3, "c"),
///     ]
/// );
/// ```
pub fn align(old: &str, new: &str) -> Vec<DiffLine> {
    AlignOptions::default().align(old, new).into_lines()
}

// Merges the two independently numbered sides of a line diff into dual numbered lines.
//
// Phase one emits every old line, leaving unchanged lines as anchors with no new number. Phase
// two walks the new lines and fills the first anchor still waiting for a partner, by slot index.
pub(crate) fn fuse(
    old_lines: &[&str],
    old_changed: &[bool],
    new_lines: &[&str],
    new_changed: &[bool],
) -> Alignment {
    let mut lines = Vec::with_capacity(old_lines.len() + new_lines.len());
    let mut anchors = VecDeque::new();
    let mut anomalies = 0;

    for (idx, (text, &changed)) in old_lines.iter().zip(old_changed).enumerate() {
        if changed {
            lines.push(DiffLine::deleted(idx + 1, *text));
        } else {
            anchors.push_back(lines.len());
            lines.push(DiffLine::anchor(idx + 1, text));
        }
    }

    for (idx, (text, &changed)) in new_lines.iter().zip(new_changed).enumerate() {
        if changed {
            lines.push(DiffLine::inserted(idx + 1, *text));
            continue;
        }

        match anchors.pop_front() {
            Some(slot) if lines[slot].text == *text => {
                lines[slot].new_line_number = Some(idx + 1);
            }
            // Equal only under the line key, so each side keeps its own text.
            Some(slot) => {
                lines[slot].tag = LineTag::Deleted;
                lines.push(DiffLine::inserted(idx + 1, *text));
            }
            None => {
                warn!("unchanged new line {} has no anchor left to pair with", idx + 1);
                anomalies += 1;
                lines.push(DiffLine::inserted(idx + 1, *text));
            }
        }
    }

    for slot in anchors {
        let line = &mut lines[slot];
        warn!(
            "unchanged old line {:?} never paired with a new line",
            line.old_line_number
        );
        anomalies += 1;
        line.tag = LineTag::Deleted;
    }

    Alignment { lines, anomalies }
}
