//! Conflict detection across database copies on disk.

mod support;

use std::fs;

use strongbox::core::conflict::{self, Outcome};
use strongbox::core::config::StoreConfig;
use strongbox::core::crypto::CompositeSecret;
use strongbox::Session;
use tempfile::TempDir;

use support::{cheap_params, seeded_db, PASSWORD};

#[test]
fn test_compare_all_reports_three_way_divergence() {
    let dir = TempDir::new().unwrap();
    let main_path = dir.path().join("passwords.sbx");
    let copy_path = dir.path().join("passwords (conflicted copy).sbx");

    let main = seeded_db(
        &main_path,
        &[
            ("red", "test1", "userA"),
            ("blue", "test3", "userX"),
            ("blue", "test4", "user4"),
        ],
    );
    seeded_db(
        &copy_path,
        &[("red", "test1", "userB"), ("blue", "test3", "userY")],
    );

    let secret = CompositeSecret::new(PASSWORD, None).unwrap();
    let outcomes = conflict::compare_all(main.store(), main.path(), &secret).unwrap();

    assert_eq!(outcomes.len(), 1);
    let Outcome::Compared(report) = &outcomes["passwords (conflicted copy).sbx"] else {
        panic!("copy should be comparable");
    };

    assert!(report.missing_in_comparison().is_empty());
    assert_eq!(
        report.missing_in_main().iter().collect::<Vec<_>>(),
        vec!["blue/test4"]
    );
    assert_eq!(report.conflicts().len(), 2);
    assert!(report.conflicts()["red/test1"].contains("username"));
    assert!(report.conflicts()["blue/test3"].contains("username"));
}

#[test]
fn test_inaccessible_copy_does_not_abort_the_run() {
    let dir = TempDir::new().unwrap();
    let main_path = dir.path().join("vault.sbx");
    let good_path = dir.path().join("vault-synced.sbx");
    let bad_path = dir.path().join("vault-other-password.sbx");
    let garbage_path = dir.path().join("vault-garbage.sbx");

    let main = seeded_db(&main_path, &[("red", "test1", "userA")]);
    seeded_db(&good_path, &[("red", "test1", "userA")]);

    // A copy under different credentials
    let other = StoreConfig::new(&bad_path, "a-different-password", None);
    Session::create_with_params(&other, cheap_params()).unwrap();

    // And one that is not a container at all
    fs::write(&garbage_path, b"not a strongbox database").unwrap();

    let secret = CompositeSecret::new(PASSWORD, None).unwrap();
    let outcomes = conflict::compare_all(main.store(), main.path(), &secret).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcomes["vault-other-password.sbx"],
        Outcome::Inaccessible
    ));
    assert!(matches!(
        outcomes["vault-garbage.sbx"],
        Outcome::Inaccessible
    ));
    let Outcome::Compared(report) = &outcomes["vault-synced.sbx"] else {
        panic!("synced copy should be comparable");
    };
    assert!(report.is_clean());
}

#[test]
fn test_no_copies_means_empty_report() {
    let dir = TempDir::new().unwrap();
    let main_path = dir.path().join("solo.sbx");
    let main = seeded_db(&main_path, &[("red", "test1", "userA")]);

    // A same-directory file with a different stem is not a candidate
    seeded_db(&dir.path().join("unrelated.sbx"), &[]);

    let secret = CompositeSecret::new(PASSWORD, None).unwrap();
    let outcomes = conflict::compare_all(main.store(), main.path(), &secret).unwrap();
    assert!(outcomes.is_empty());
}
