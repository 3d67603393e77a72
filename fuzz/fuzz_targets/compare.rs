#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgdiff::{PackageIdentity, PackageSnapshot};
use std::collections::BTreeSet;

type Files<'a> = Vec<(&'a str, &'a [u8])>;

fuzz_target!(|input: (Files<'_>, Files<'_>, Vec<(&str, &str)>)| {
    let (old_raw, new_raw, derived) = input;

    let mut old = PackageSnapshot::new(PackageIdentity::new("Fuzz", "1.0.0"));
    for (path, bytes) in &old_raw {
        old.insert_raw(*path, *bytes);
    }
    let mut new = PackageSnapshot::new(PackageIdentity::new("Fuzz", "2.0.0"));
    for (path, bytes) in &new_raw {
        new.insert_raw(*path, *bytes);
    }
    for (path, text) in &derived {
        new.insert_derived(*path, *text);
    }

    let universe: BTreeSet<&str> = old.paths().chain(new.paths()).collect();
    let result = pkgdiff::compare(&old, &new);
    assert_eq!(result.files().len(), universe.len());
    assert!(result.files().windows(2).all(|w| w[0].path() < w[1].path()));
});
