use pkgdiff::{ComparisonFormatter, PackageIdentity, PackageSnapshot, compare};

#[test]
fn colored_rows() {
    let mut old = PackageSnapshot::new(PackageIdentity::new("Pkg", "1.0.0"));
    old.insert_raw("lib.txt", "a\nb\nc");
    let mut new = PackageSnapshot::new(PackageIdentity::new("Pkg", "2.0.0"));
    new.insert_raw("lib.txt", "a\nx\nc").insert_raw("notes.txt", "hello");

    let result = compare(&old, &new);
    let colored = ComparisonFormatter::new()
        .with_color()
        .fmt_result(&result)
        .to_string();

    assert!(colored.contains("\x1b[1m--- Pkg 1.0.0\n+++ Pkg 2.0.0\n\x1b[0m"));
    assert!(colored.contains("\x1b[31m- 2         b\x1b[0m\n"));
    assert!(colored.contains("\x1b[32m+      2    x\x1b[0m\n"));
    assert!(colored.contains("\x1b[32madded notes.txt\x1b[0m\n"));
    assert!(colored.contains("\x1b[36mmodified lib.txt\x1b[0m\n"));

    // Without color the escapes disappear.
    let plain = ComparisonFormatter::new().fmt_result(&result).to_string();
    assert!(!plain.contains('\x1b'));
    assert_eq!(plain, result.to_string());
}
