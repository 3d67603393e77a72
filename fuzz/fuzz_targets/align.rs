#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgdiff::{AlignOptions, DiffLine, LineOrder, LineTag};

fn side(lines: &[DiffLine], number: fn(&DiffLine) -> Option<usize>) -> String {
    lines
        .iter()
        .filter(|line| number(line).is_some())
        .map(DiffLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

fuzz_target!(|input: (&str, &str, bool, bool)| {
    let (old, new, ignore_whitespace, ignore_case) = input;
    let mut options = AlignOptions::new();
    options
        .set_ignore_whitespace(ignore_whitespace)
        .set_ignore_case(ignore_case);

    let alignment = options.align(old, new);
    assert_eq!(alignment.anomalies(), 0);

    let lines = alignment.lines();
    for line in lines {
        match line.tag() {
            LineTag::Unchanged => {
                assert!(line.old_line_number().is_some() && line.new_line_number().is_some())
            }
            LineTag::Deleted => assert!(line.new_line_number().is_none()),
            LineTag::Inserted => assert!(line.old_line_number().is_none()),
        }
    }

    assert_eq!(side(lines, DiffLine::old_line_number), old);
    assert_eq!(side(lines, DiffLine::new_line_number), new);

    let numeric = options.set_line_order(LineOrder::Numeric).align(old, new);
    assert_eq!(numeric.lines().len(), lines.len());
});
