use pkgdiff::{
    ChangeKind, ComparisonResult, DecompileError, DiffLine, LineTag, PackageIdentity,
    PackageSnapshot, compare,
};
use rayon::prelude::*;
use std::collections::BTreeSet;

fn package(version: &str, files: &[(&str, &str)]) -> PackageSnapshot {
    let mut snapshot = PackageSnapshot::new(PackageIdentity::new("Contoso.Widgets", version));
    for (path, contents) in files {
        snapshot.insert_raw(*path, *contents);
    }
    snapshot
}

fn old_package() -> PackageSnapshot {
    let mut snapshot = package(
        "1.0.0",
        &[
            ("Contoso.Widgets.nuspec", "<version>1.0.0</version>\n<authors>Contoso</authors>\n"),
            ("README.md", "# Widgets\n\nMakes widgets.\n"),
            ("lib/net8.0/Contoso.Widgets.xml", "<doc>\n  <member name=\"Widget\" />\n</doc>\n"),
            ("lib/netstandard2.0/Legacy.txt", "legacy\n"),
        ],
    );
    snapshot
        .insert_raw("lib/net8.0/Contoso.Widgets.dll", b"MZ\x90\x00v1".to_vec())
        .insert_raw("icon.png", vec![0x89_u8, b'P', b'N', b'G', 0xff]);
    snapshot
}

fn new_package() -> PackageSnapshot {
    let mut snapshot = package(
        "1.1.0",
        &[
            ("Contoso.Widgets.nuspec", "<version>1.1.0</version>\n<authors>Contoso</authors>\n"),
            ("README.md", "# Widgets\n\nMakes widgets.\n"),
            (
                "lib/net8.0/Contoso.Widgets.xml",
                "<doc>\n  <member name=\"Widget\" />\n  <member name=\"Gadget\" />\n</doc>\n",
            ),
            ("CHANGELOG.md", "## 1.1.0\n- Gadgets\n"),
        ],
    );
    snapshot
        .insert_raw("lib/net8.0/Contoso.Widgets.dll", b"MZ\x90\x00v2".to_vec())
        .insert_raw("icon.png", vec![0x89_u8, b'P', b'N', b'G', 0xff]);
    snapshot
}

fn decompile(snapshot: &mut PackageSnapshot) {
    let failures = snapshot.decompile_with(&|_path: &str, bytes: &[u8]| -> Result<String, DecompileError> {
        let version = bytes
            .strip_prefix(b"MZ\x90\x00")
            .ok_or(DecompileError::InvalidModule)?;
        let version = String::from_utf8_lossy(version);
        Ok(format!(
            "namespace Contoso.Widgets\n{{\n    public class Widget {{ }} // {version}\n}}"
        ))
    });
    assert_eq!(failures, 0);
}

fn side(lines: &[DiffLine], number: fn(&DiffLine) -> Option<usize>) -> String {
    lines
        .iter()
        .filter(|line| number(line).is_some())
        .map(DiffLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_invariants(old: &PackageSnapshot, new: &PackageSnapshot, result: &ComparisonResult) {
    let universe: BTreeSet<&str> = old.paths().chain(new.paths()).collect();
    assert_eq!(result.files().len(), universe.len());
    assert!(result.files().windows(2).all(|w| w[0].path() < w[1].path()));
    assert_eq!(result.anomalies(), 0);

    for file in result.files() {
        if file.kind() != ChangeKind::Modified {
            assert!(file.lines().is_empty());
            continue;
        }

        let lines = file.lines();
        for line in lines {
            match line.tag() {
                LineTag::Unchanged => assert!(
                    line.old_line_number().is_some() && line.new_line_number().is_some()
                ),
                LineTag::Deleted => assert!(
                    line.old_line_number().is_some() && line.new_line_number().is_none()
                ),
                LineTag::Inserted => assert!(
                    line.old_line_number().is_none() && line.new_line_number().is_some()
                ),
            }
        }
        assert_eq!(side(lines, DiffLine::old_line_number), file.old_text().unwrap());
        assert_eq!(side(lines, DiffLine::new_line_number), file.new_text().unwrap());
    }
}

#[test]
fn package_upgrade() {
    let mut old = old_package();
    let mut new = new_package();
    decompile(&mut old);
    decompile(&mut new);

    let result = compare(&old, &new);
    check_invariants(&old, &new, &result);

    let kinds: Vec<_> = result
        .files()
        .iter()
        .map(|file| (file.path(), file.kind()))
        .collect();
    assert_eq!(
        kinds,
        [
            ("CHANGELOG.md", ChangeKind::Added),
            ("Contoso.Widgets.nuspec", ChangeKind::Modified),
            ("README.md", ChangeKind::Unchanged),
            ("icon.png", ChangeKind::Unchanged),
            ("lib/net8.0/Contoso.Widgets.dll", ChangeKind::Modified),
            ("lib/net8.0/Contoso.Widgets.xml", ChangeKind::Modified),
            ("lib/netstandard2.0/Legacy.txt", ChangeKind::Removed),
        ]
    );

    let dll = result.file("lib/net8.0/Contoso.Widgets.dll").unwrap();
    assert_eq!(
        dll.lines(),
        [
            DiffLine::unchanged(1, 1, "namespace Contoso.Widgets"),
            DiffLine::unchanged(2, 2, "{"),
            DiffLine::deleted(3, "    public class Widget { } // v1"),
            DiffLine::inserted(3, "    public class Widget { } // v2"),
            DiffLine::unchanged(4, 4, "}"),
        ]
    );

    let xml = result.file("lib/net8.0/Contoso.Widgets.xml").unwrap();
    assert_eq!(
        xml.lines(),
        [
            DiffLine::unchanged(1, 1, "<doc>"),
            DiffLine::unchanged(2, 2, "  <member name=\"Widget\" />"),
            DiffLine::inserted(3, "  <member name=\"Gadget\" />"),
            DiffLine::unchanged(3, 4, "</doc>"),
            DiffLine::unchanged(4, 5, ""),
        ]
    );
}

#[test]
fn undecompiled_modules_fall_back_to_bytes() {
    let old = old_package();
    let new = new_package();

    let result = compare(&old, &new);
    check_invariants(&old, &new, &result);

    // Both builds are six bytes of non-UTF-8 data, so they resolve to the same placeholder.
    let dll = result.file("lib/net8.0/Contoso.Widgets.dll").unwrap();
    assert_eq!(dll.kind(), ChangeKind::Unchanged);
    assert_eq!(dll.old_text(), Some("[Binary file - 6 bytes]"));
}

#[test]
fn self_comparison_is_unchanged() {
    let mut old = old_package();
    decompile(&mut old);

    let result = compare(&old, &old.clone());
    check_invariants(&old, &old, &result);
    assert!(
        result
            .files()
            .iter()
            .all(|file| file.kind() == ChangeKind::Unchanged)
    );
    assert_eq!(result.summary().unchanged, result.files().len());
}

#[test]
fn parallel_callers_get_identical_results() {
    let old = old_package();
    let new = new_package();
    let expected = compare(&old, &new);

    let results: Vec<ComparisonResult> = (0..16)
        .into_par_iter()
        .map(|_| compare(&old, &new))
        .collect();
    assert!(results.iter().all(|result| *result == expected));

    // Files are independent, so comparing them one at a time across threads yields the same
    // entries as a whole-package comparison.
    let paths: BTreeSet<&str> = old.paths().chain(new.paths()).collect();
    let per_file: Vec<_> = paths
        .into_par_iter()
        .map(|path| {
            let mut old_one = PackageSnapshot::new(old.identity().clone());
            let mut new_one = PackageSnapshot::new(new.identity().clone());
            if let Some(bytes) = old.raw_files().get(path) {
                old_one.insert_raw(path, bytes.clone());
            }
            if let Some(bytes) = new.raw_files().get(path) {
                new_one.insert_raw(path, bytes.clone());
            }
            compare(&old_one, &new_one).files()[0].clone()
        })
        .collect();
    assert_eq!(per_file, expected.files());
}
