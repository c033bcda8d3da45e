// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::tree_store::{TreeChange, TreeEntry, TreeStore};
use crate::utils::errors::DiffError;
use std::cmp::Ordering;

/// 计算两个树快照之间的结构化差异
///
/// 子树标识相同即跳过，不会展开。新增或删除的目录先产出目录本身的
/// `Insert`/`Delete`，再按前序产出其下所有条目；两侧都是目录但内容不同时
/// 产出目录的 `Modify` 后递归比较。类型在目录与文件之间变化时视为
/// 删除加新增。
///
/// # 参数
///
/// * `store` - 树存储
/// * `old` - 旧树
/// * `new` - 新树
///
/// # 返回值
///
/// * `Ok(Vec<TreeChange>)` - 全部变化
/// * `Err(DiffError)` - 读取任一子树失败，不返回部分结果
pub fn diff_trees<S: TreeStore>(
    store: &S,
    old: &S::Id,
    new: &S::Id,
) -> Result<Vec<TreeChange>, DiffError> {
    let mut changes = Vec::new();
    diff_subtree(store, old, new, "", &mut changes)?;
    Ok(changes)
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

fn read_tree<S: TreeStore>(
    store: &S,
    id: &S::Id,
    path: &str,
) -> Result<Vec<TreeEntry<S::Id>>, DiffError> {
    let mut entries = store
        .tree_entries(id)
        .map_err(|source| DiffError::TreeRead {
            path: path.to_string(),
            source,
        })?;
    // Both sides must be merged in the same order
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn diff_subtree<S: TreeStore>(
    store: &S,
    old: &S::Id,
    new: &S::Id,
    prefix: &str,
    out: &mut Vec<TreeChange>,
) -> Result<(), DiffError> {
    if old == new {
        return Ok(());
    }

    let old_entries = read_tree(store, old, prefix)?;
    let new_entries = read_tree(store, new, prefix)?;

    let mut old_iter = old_entries.iter().peekable();
    let mut new_iter = new_entries.iter().peekable();

    loop {
        match (old_iter.peek(), new_iter.peek()) {
            (Some(o), Some(n)) => match o.name.cmp(&n.name) {
                Ordering::Less => {
                    emit_deleted(store, o, prefix, out)?;
                    old_iter.next();
                }
                Ordering::Greater => {
                    emit_inserted(store, n, prefix, out)?;
                    new_iter.next();
                }
                Ordering::Equal => {
                    compare_entries(store, o, n, prefix, out)?;
                    old_iter.next();
                    new_iter.next();
                }
            },
            (Some(o), None) => {
                emit_deleted(store, o, prefix, out)?;
                old_iter.next();
            }
            (None, Some(n)) => {
                emit_inserted(store, n, prefix, out)?;
                new_iter.next();
            }
            (None, None) => break,
        }
    }

    Ok(())
}

fn compare_entries<S: TreeStore>(
    store: &S,
    old: &TreeEntry<S::Id>,
    new: &TreeEntry<S::Id>,
    prefix: &str,
    out: &mut Vec<TreeChange>,
) -> Result<(), DiffError> {
    if old.id == new.id && old.mode == new.mode {
        return Ok(());
    }

    let path = join_path(prefix, &new.name);
    match (old.mode.is_tree(), new.mode.is_tree()) {
        (true, true) => {
            out.push(TreeChange::Modify {
                path: path.clone(),
                old_mode: old.mode,
                new_mode: new.mode,
            });
            diff_subtree(store, &old.id, &new.id, &path, out)
        }
        (false, false) => {
            out.push(TreeChange::Modify {
                path,
                old_mode: old.mode,
                new_mode: new.mode,
            });
            Ok(())
        }
        _ => {
            emit_deleted(store, old, prefix, out)?;
            emit_inserted(store, new, prefix, out)
        }
    }
}

fn emit_inserted<S: TreeStore>(
    store: &S,
    entry: &TreeEntry<S::Id>,
    prefix: &str,
    out: &mut Vec<TreeChange>,
) -> Result<(), DiffError> {
    let path = join_path(prefix, &entry.name);
    out.push(TreeChange::Insert {
        path: path.clone(),
        mode: entry.mode,
    });

    if entry.mode.is_tree() {
        for child in read_tree(store, &entry.id, &path)? {
            emit_inserted(store, &child, &path, out)?;
        }
    }
    Ok(())
}

fn emit_deleted<S: TreeStore>(
    store: &S,
    entry: &TreeEntry<S::Id>,
    prefix: &str,
    out: &mut Vec<TreeChange>,
) -> Result<(), DiffError> {
    let path = join_path(prefix, &entry.name);
    out.push(TreeChange::Delete {
        path: path.clone(),
        mode: entry.mode,
    });

    if entry.mode.is_tree() {
        for child in read_tree(store, &entry.id, &path)? {
            emit_deleted(store, &child, &path, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tree_diff_test.rs"]
mod tests;
