use super::*;
use crate::domain::repositories::tree_store::EntryMode;
use crate::domain::services::test_support::MemoryTreeStore;

fn port(category: &str, name: &str) -> PortName {
    PortName::new(category, name)
}

fn insert_dir(path: &str) -> TreeChange {
    TreeChange::Insert {
        path: path.to_string(),
        mode: EntryMode::Tree,
    }
}

fn insert_file(path: &str) -> TreeChange {
    TreeChange::Insert {
        path: path.to_string(),
        mode: EntryMode::Blob,
    }
}

fn delete_dir(path: &str) -> TreeChange {
    TreeChange::Delete {
        path: path.to_string(),
        mode: EntryMode::Tree,
    }
}

fn delete_file(path: &str) -> TreeChange {
    TreeChange::Delete {
        path: path.to_string(),
        mode: EntryMode::Blob,
    }
}

fn modify_file(path: &str) -> TreeChange {
    TreeChange::Modify {
        path: path.to_string(),
        old_mode: EntryMode::Blob,
        new_mode: EntryMode::Blob,
    }
}

// --- Path classification ---

#[test]
fn test_port_from_path() {
    assert_eq!(port_from_path("mail/foo"), Some((port("mail", "foo"), true)));
    assert_eq!(port_from_path("mail/foo/"), Some((port("mail", "foo"), true)));
    assert_eq!(
        port_from_path("mail/foo/Makefile"),
        Some((port("mail", "foo"), false))
    );
    assert_eq!(
        port_from_path("mail/foo/files/patch-x"),
        Some((port("mail", "foo"), false))
    );
}

#[test]
fn test_port_from_path_rejects_non_ports() {
    assert_eq!(port_from_path("Mk/bsd.port.mk"), None);
    assert_eq!(port_from_path("mail"), None);
    assert_eq!(port_from_path("mail/"), None);
    assert_eq!(port_from_path("/foo"), None);
    assert_eq!(port_from_path(".github/workflows"), None);
    assert_eq!(port_from_path(""), None);
}

#[test]
fn test_port_from_path_rejects_category_level_entries() {
    assert_eq!(port_from_path("mail/Makefile"), None);
    assert_eq!(port_from_path("mail/README.html"), None);
    assert_eq!(port_from_path("mail/.hidden"), None);
    assert_eq!(port_from_path("mail/.hidden/Makefile"), None);
    assert_eq!(port_from_path("mail/mutt"), Some((port("mail", "mutt"), true)));
    // Lowercase leading letter only, later capitals are fine
    assert_eq!(
        port_from_path("java/eclipse-SWT/Makefile"),
        Some((port("java", "eclipse-SWT"), false))
    );

    let changes = vec![
        modify_file("mail/Makefile"),
        insert_file("mail/.hidden/x"),
        modify_file("mail/mutt/Makefile"),
    ];
    let result = classify_changes(&changes);
    assert_eq!(result.len(), 1);
    assert_eq!(result[&port("mail", "mutt")], PortChange::Changed);
}

// --- Classification policy ---

#[test]
fn test_root_insert_is_added() {
    let changes = vec![insert_dir("mail/newport")];
    let result = classify_changes(&changes);

    assert_eq!(result.len(), 1);
    assert_eq!(result[&port("mail", "newport")], PortChange::Added);
}

#[test]
fn test_file_insert_does_not_downgrade_root_insert() {
    let changes = vec![
        insert_dir("mail/newport"),
        insert_file("mail/newport/Makefile"),
    ];
    let result = classify_changes(&changes);

    assert_eq!(result.len(), 1);
    assert_eq!(result[&port("mail", "newport")], PortChange::Added);
}

#[test]
fn test_root_insert_wins_regardless_of_order() {
    let changes = vec![
        insert_file("mail/newport/Makefile"),
        modify_file("mail/newport/distinfo"),
        insert_dir("mail/newport"),
    ];
    let result = classify_changes(&changes);

    assert_eq!(result[&port("mail", "newport")], PortChange::Added);
}

#[test]
fn test_root_delete_is_removed() {
    let changes = vec![delete_dir("mail/oldport")];
    let result = classify_changes(&changes);

    assert_eq!(result.len(), 1);
    assert_eq!(result[&port("mail", "oldport")], PortChange::Removed);
}

#[test]
fn test_root_delete_wins_over_file_deletes() {
    let changes = vec![
        delete_file("mail/oldport/Makefile"),
        delete_dir("mail/oldport"),
        delete_file("mail/oldport/pkg-descr"),
    ];
    let result = classify_changes(&changes);

    assert_eq!(result[&port("mail", "oldport")], PortChange::Removed);
}

#[test]
fn test_modify_is_changed() {
    let changes = vec![modify_file("mail/existing/Makefile")];
    let result = classify_changes(&changes);

    assert_eq!(result.len(), 1);
    assert_eq!(result[&port("mail", "existing")], PortChange::Changed);
}

#[test]
fn test_modify_never_overrides() {
    let changes = vec![insert_dir("mail/a"), modify_file("mail/a/Makefile")];
    assert_eq!(classify_changes(&changes)[&port("mail", "a")], PortChange::Added);

    let changes = vec![delete_dir("mail/b"), modify_file("mail/b/Makefile")];
    assert_eq!(classify_changes(&changes)[&port("mail", "b")], PortChange::Removed);
}

#[test]
fn test_nested_insert_and_delete_are_changed() {
    let changes = vec![
        insert_file("mail/a/files/patch-new"),
        delete_file("mail/b/files/patch-old"),
    ];
    let result = classify_changes(&changes);

    assert_eq!(result[&port("mail", "a")], PortChange::Changed);
    assert_eq!(result[&port("mail", "b")], PortChange::Changed);
}

#[test]
fn test_infrastructure_paths_ignored() {
    let changes = vec![
        modify_file("Mk/bsd.port.mk"),
        modify_file("UPDATING"),
        modify_file("mail/Makefile"),
        insert_dir("mail"),
    ];
    let result = classify_changes(&changes);

    assert!(result.is_empty());
}

// --- Against a tree store ---

#[test]
fn test_find_updated() {
    let mut store = MemoryTreeStore::new();
    store.commit(
        "base",
        &[
            ("Mk/bsd.port.mk", "1"),
            ("mail/existing/Makefile", "1"),
            ("mail/oldport/Makefile", "1"),
            ("net/quiet/Makefile", "1"),
        ],
    );
    store.commit(
        "head",
        &[
            ("Mk/bsd.port.mk", "2"),
            ("mail/existing/Makefile", "2"),
            ("mail/newport/Makefile", "1"),
            ("mail/newport/pkg-descr", "d"),
            ("net/quiet/Makefile", "1"),
        ],
    );

    let result = find_updated(&store, "base").unwrap();

    assert_eq!(result.head, "head");
    assert_eq!(result.ports.len(), 3);
    assert_eq!(result.ports[&port("mail", "existing")], PortChange::Changed);
    assert_eq!(result.ports[&port("mail", "newport")], PortChange::Added);
    assert_eq!(result.ports[&port("mail", "oldport")], PortChange::Removed);
    assert_eq!(result.with_change(PortChange::Added), vec![port("mail", "newport")]);
}

#[test]
fn test_find_updated_unknown_baseline() {
    let mut store = MemoryTreeStore::new();
    store.commit("head", &[("mail/foo/Makefile", "1")]);

    let err = find_updated(&store, "missing").unwrap_err();

    assert!(matches!(
        err,
        PortDiffError::Repository(RepositoryError::CommitNotFound { .. })
    ));
}

#[test]
fn test_find_updated_diff_failure_is_fatal() {
    let mut store = MemoryTreeStore::new();
    store.commit("base", &[("mail/foo/Makefile", "1")]);
    let head_tree = store.commit("head", &[("mail/foo/Makefile", "2")]);
    store.broken_trees.push(head_tree);

    let err = find_updated(&store, "base").unwrap_err();

    assert!(matches!(err, PortDiffError::Diff(_)));
}

#[test]
fn test_find_all_ports() {
    let mut store = MemoryTreeStore::new();
    store.commit(
        "head",
        &[
            ("Mk/bsd.port.mk", "1"),
            ("Makefile", "1"),
            (".github/workflows/ci.yml", "1"),
            ("mail/Makefile", "1"),
            ("mail/foo/Makefile", "1"),
            ("mail/.hidden/Makefile", "1"),
            ("net/bar/Makefile", "1"),
            ("net/Templates/x", "1"),
        ],
    );

    let result = find_all_ports(&store).unwrap();

    assert_eq!(result.head, "head");
    assert_eq!(result.ports.len(), 2);
    assert_eq!(result.ports[&port("mail", "foo")], PortChange::Added);
    assert_eq!(result.ports[&port("net", "bar")], PortChange::Added);
}
