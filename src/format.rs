use crate::{
    align::{DiffLine, LineTag},
    compare::{ChangeKind, ComparisonResult, FileDiff},
};
use std::fmt::{Display, Formatter, Result};

#[derive(Clone, Copy, Debug)]
enum Role {
    Header,
    Added,
    Removed,
    Modified,
    Context,
    Insert,
    Delete,
}

/// Struct used to adjust the formatting of a `ComparisonResult`
#[derive(Debug, Default)]
pub struct ComparisonFormatter {
    #[cfg(feature = "color")]
    with_color: bool,
}

impl ComparisonFormatter {
    /// Construct a new formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable formatting a comparison with color
    #[cfg(feature = "color")]
    pub fn with_color(mut self) -> Self {
        self.with_color = true;
        self
    }

    /// Returns a `Display` impl which can be used to print a `ComparisonResult`
    pub fn fmt_result<'a>(&'a self, result: &'a ComparisonResult) -> impl Display + 'a {
        ResultDisplay { f: self, result }
    }

    fn fmt_file<'a>(&'a self, file: &'a FileDiff) -> impl Display + 'a {
        FileDisplay { f: self, file }
    }

    fn fmt_line<'a>(&'a self, line: &'a DiffLine) -> impl Display + 'a {
        LineDisplay { f: self, line }
    }

    #[cfg(feature = "color")]
    fn style(role: Role) -> anstyle::Style {
        use anstyle::{AnsiColor, Style};

        let color = |color: AnsiColor| Style::new().fg_color(Some(color.into()));
        match role {
            Role::Header => Style::new().bold(),
            Role::Added | Role::Insert => color(AnsiColor::Green),
            Role::Removed | Role::Delete => color(AnsiColor::Red),
            Role::Modified => color(AnsiColor::Cyan),
            Role::Context => Style::new(),
        }
    }

    #[cfg_attr(not(feature = "color"), allow(unused_variables))]
    fn prefix(&self, f: &mut Formatter<'_>, role: Role) -> Result {
        #[cfg(feature = "color")]
        if self.with_color {
            write!(f, "{}", Self::style(role).render())?;
        }
        Ok(())
    }

    #[cfg_attr(not(feature = "color"), allow(unused_variables))]
    fn suffix(&self, f: &mut Formatter<'_>, role: Role) -> Result {
        #[cfg(feature = "color")]
        if self.with_color {
            write!(f, "{}", Self::style(role).render_reset())?;
        }
        Ok(())
    }
}

struct ResultDisplay<'a> {
    f: &'a ComparisonFormatter,
    result: &'a ComparisonResult,
}

impl Display for ResultDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.f.prefix(f, Role::Header)?;
        writeln!(f, "--- {}", self.result.old_package())?;
        writeln!(f, "+++ {}", self.result.new_package())?;
        self.f.suffix(f, Role::Header)?;

        for file in self.result.files() {
            write!(f, "{}", self.f.fmt_file(file))?;
        }

        Ok(())
    }
}

struct FileDisplay<'a> {
    f: &'a ComparisonFormatter,
    file: &'a FileDiff,
}

impl Display for FileDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let role = match self.file.kind() {
            ChangeKind::Added => Role::Added,
            ChangeKind::Removed => Role::Removed,
            ChangeKind::Modified => Role::Modified,
            ChangeKind::Unchanged => Role::Context,
        };

        self.f.prefix(f, role)?;
        write!(f, "{} {}", self.file.kind(), self.file.path())?;
        self.f.suffix(f, role)?;
        writeln!(f)?;

        for line in self.file.lines() {
            write!(f, "{}", self.f.fmt_line(line))?;
        }

        Ok(())
    }
}

struct LineDisplay<'a> {
    f: &'a ComparisonFormatter,
    line: &'a DiffLine,
}

impl Display for LineDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let old = self.line.old_line_number().unwrap_or_default();
        let new = self.line.new_line_number().unwrap_or_default();
        let text = self.line.text();

        let role = match self.line.tag() {
            LineTag::Unchanged => Role::Context,
            LineTag::Inserted => Role::Insert,
            LineTag::Deleted => Role::Delete,
        };

        self.f.prefix(f, role)?;
        match self.line.tag() {
            LineTag::Unchanged => write!(f, "  {old: <4} {new: <4} {text}")?,
            LineTag::Deleted => write!(f, "- {old: <4}      {text}")?,
            LineTag::Inserted => write!(f, "+      {new: <4} {text}")?,
        }
        self.f.suffix(f, role)?;
        writeln!(f)
    }
}

impl Display for ComparisonResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", ComparisonFormatter::new().fmt_result(self))
    }
}
