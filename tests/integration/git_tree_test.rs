// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::TestTree;
use portscout::domain::models::{PortChange, PortName};
use portscout::domain::services::port_diff::{find_all_ports, find_updated, PortDiffError};
use portscout::infrastructure::git::GixTreeStore;
use portscout::utils::errors::RepositoryError;

fn base_tree() -> Option<(TestTree, String)> {
    let tree = TestTree::init()?;
    tree.write("Mk/bsd.port.mk", "# framework\n");
    tree.write("mail/mutt/Makefile", "PORTNAME=mutt\n");
    tree.write("mail/mutt/files/patch-a", "a\n");
    tree.write("net/curl/Makefile", "PORTNAME=curl\n");
    tree.write("net/wget/Makefile", "PORTNAME=wget\n");
    let base = tree.commit("base");
    Some((tree, base))
}

#[test]
fn test_find_all_ports_in_real_repository() {
    let Some((tree, base)) = base_tree() else {
        return;
    };

    let store = GixTreeStore::open(tree.path()).unwrap();
    let changes = find_all_ports(&store).unwrap();

    assert_eq!(changes.head, base);
    assert_eq!(
        changes.with_change(PortChange::Added),
        vec![
            PortName::new("mail", "mutt"),
            PortName::new("net", "curl"),
            PortName::new("net", "wget"),
        ]
    );
}

#[test]
fn test_find_updated_in_real_repository() {
    let Some((tree, base)) = base_tree() else {
        return;
    };

    tree.write("mail/mutt/files/patch-a", "b\n");
    tree.write("mail/neomutt/Makefile", "PORTNAME=neomutt\n");
    tree.remove("net/wget");
    tree.write("Mk/bsd.port.mk", "# framework v2\n");
    let head = tree.commit("update");

    let store = GixTreeStore::open(tree.path()).unwrap();
    let changes = find_updated(&store, &base).unwrap();

    assert_eq!(changes.head, head);
    assert_eq!(changes.ports.len(), 3);
    assert_eq!(
        changes.with_change(PortChange::Changed),
        vec![PortName::new("mail", "mutt")]
    );
    assert_eq!(
        changes.with_change(PortChange::Added),
        vec![PortName::new("mail", "neomutt")]
    );
    assert_eq!(
        changes.with_change(PortChange::Removed),
        vec![PortName::new("net", "wget")]
    );
}

#[test]
fn test_find_updated_at_head_is_empty() {
    let Some((tree, base)) = base_tree() else {
        return;
    };

    let store = GixTreeStore::open(tree.path()).unwrap();
    let changes = find_updated(&store, &base).unwrap();

    assert_eq!(changes.head, base);
    assert!(changes.ports.is_empty());
}

#[test]
fn test_unknown_baseline_is_rejected() {
    let Some((tree, _)) = base_tree() else {
        return;
    };

    let store = GixTreeStore::open(tree.path()).unwrap();
    let err = find_updated(&store, "0123456789abcdef0123456789abcdef01234567").unwrap_err();

    assert!(matches!(
        err,
        PortDiffError::Repository(RepositoryError::CommitNotFound { .. })
    ));
}

#[test]
fn test_revspec_baseline_is_rejected() {
    let Some((tree, _)) = base_tree() else {
        return;
    };
    tree.write("net/curl/Makefile", "PORTNAME=curl\nPORTVERSION=8\n");
    tree.commit("bump");

    let store = GixTreeStore::open(tree.path()).unwrap();
    for revspec in ["HEAD", "HEAD~1", "master", "abc123"] {
        let err = find_updated(&store, revspec).unwrap_err();
        assert!(
            matches!(
                err,
                PortDiffError::Repository(RepositoryError::InvalidHash { ref hash, .. }) if hash == revspec
            ),
            "{} was accepted as a baseline",
            revspec
        );
    }
}

#[test]
fn test_open_rejects_plain_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = GixTreeStore::open(dir.path()).err().unwrap();

    assert!(matches!(err, RepositoryError::Open { .. }));
}
