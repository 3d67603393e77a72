//! Common utilities

use hashbrown::{HashMap, hash_map::Entry};
use std::borrow::Cow;

/// How two lines are judged equal when interning them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineKey {
    pub ignore_whitespace: bool,
    pub ignore_case: bool,
}

impl LineKey {
    fn normalize<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let line = if self.ignore_whitespace {
            line.trim()
        } else {
            line
        };

        if self.ignore_case {
            Cow::Owned(line.to_lowercase())
        } else {
            Cow::Borrowed(line)
        }
    }
}

/// Classifies lines, converting lines into unique `u64`s for quicker comparison
#[derive(Default)]
pub struct Classifier<'a> {
    key: LineKey,
    next_id: u64,
    unique_ids: HashMap<Cow<'a, str>, u64>,
}

impl<'a> Classifier<'a> {
    pub fn new(key: LineKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    fn classify(&mut self, record: &'a str) -> u64 {
        match self.unique_ids.entry(self.key.normalize(record)) {
            Entry::Occupied(o) => *o.get(),
            Entry::Vacant(v) => {
                let id = self.next_id;
                self.next_id += 1;
                *v.insert(id)
            }
        }
    }

    pub fn classify_lines(&mut self, text: &'a str) -> (Vec<&'a str>, Vec<u64>) {
        LineIter::new(text)
            .map(|line| (line, self.classify(line)))
            .unzip()
    }
}

/// Iterator over the lines of a string, split on `\n` with the terminator removed.
///
/// A trailing `\n` produces a final empty line so that joining the yielded lines with `\n`
/// gives back the original text. The empty string has no lines.
pub struct LineIter<'a>(Option<&'a str>);

impl<'a> LineIter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self((!text.is_empty()).then_some(text))
    }
}

impl<'a> Iterator for LineIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.0?;

        match remaining.find('\n') {
            Some(idx) => {
                self.0 = Some(&remaining[idx + 1..]);
                Some(&remaining[..idx])
            }
            None => {
                self.0 = None;
                Some(remaining)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_iter_keeps_trailing_empty_line() {
        let lines: Vec<_> = LineIter::new("a\nb\n").collect();
        assert_eq!(lines, ["a", "b", ""]);
        assert_eq!(lines.join("\n"), "a\nb\n");
    }

    #[test]
    fn line_iter_empty_text() {
        assert_eq!(LineIter::new("").count(), 0);
        assert_eq!(LineIter::new("\n").collect::<Vec<_>>(), ["", ""]);
    }

    #[test]
    fn line_iter_preserves_carriage_returns() {
        let lines: Vec<_> = LineIter::new("a\r\nb").collect();
        assert_eq!(lines, ["a\r", "b"]);
    }

    #[test]
    fn classifier_shares_ids_between_texts() {
        let mut classifier = Classifier::default();
        let (_, old_ids) = classifier.classify_lines("a\nb\na");
        let (_, new_ids) = classifier.classify_lines("b\nc");
        assert_eq!(old_ids, [0, 1, 0]);
        assert_eq!(new_ids, [1, 2]);
    }

    #[test]
    fn classifier_normalizes_with_key() {
        let mut classifier = Classifier::new(LineKey {
            ignore_whitespace: true,
            ignore_case: true,
        });
        let (lines, ids) = classifier.classify_lines("  Foo\nfoo  \nbar");
        assert_eq!(lines, ["  Foo", "foo  ", "bar"]);
        assert_eq!(ids, [0, 0, 1]);
    }
}
