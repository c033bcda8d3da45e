// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{PortChange, PortName};
use crate::domain::repositories::tree_store::{TreeChange, TreeStore};
use crate::utils::errors::{DiffError, RepositoryError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Port 差异运行错误
///
/// 两种错误都属于整轮致命错误。
#[derive(Error, Debug)]
pub enum PortDiffError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// 一次差异运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortChanges {
    /// HEAD 提交哈希
    pub head: String,
    /// 每个受影响 port 的分类，每个 port 最多出现一次
    pub ports: HashMap<PortName, PortChange>,
}

impl PortChanges {
    /// 指定分类的 port，按名称排序
    pub fn with_change(&self, change: PortChange) -> Vec<PortName> {
        let mut ports: Vec<PortName> = self
            .ports
            .iter()
            .filter(|(_, c)| **c == change)
            .map(|(p, _)| p.clone())
            .collect();
        ports.sort();
        ports
    }
}

/// 名称以大写字母开头（构建系统基础设施，如 `Mk`）或以点开头（隐藏目录）
fn is_infrastructure(segment: &str) -> bool {
    segment
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c == '.')
}

/// 把变更路径归类到 port
///
/// # 返回值
///
/// * `Some((port, is_root))` - 路径位于某个 port 之下；`is_root` 表示路径正是
///   `category/port`（或带结尾 `/`）
/// * `None` - 路径不属于任何 port
pub fn port_from_path(path: &str) -> Option<(PortName, bool)> {
    let frags: Vec<&str> = path.split('/').collect();

    if frags.len() < 2 {
        return None;
    }

    let (category, name) = (frags[0], frags[1]);
    if category.is_empty()
        || name.is_empty()
        || is_infrastructure(category)
        || is_infrastructure(name)
    {
        return None;
    }

    let is_root = frags.len() == 2 || (frags.len() == 3 && frags[2].is_empty());

    Some((PortName::new(category, name), is_root))
}

/// 按固定策略把结构变化归类为 port 变更
///
/// 根级目录的新增/删除总是覆盖已有分类，与处理顺序无关；
/// 其他变化只在 port 尚未分类时记为 `Changed`，`Modify` 从不改变已有分类。
pub fn classify_changes<'a, I>(changes: I) -> HashMap<PortName, PortChange>
where
    I: IntoIterator<Item = &'a TreeChange>,
{
    let mut ports = HashMap::new();

    for change in changes {
        let Some((port, is_root)) = port_from_path(change.path()) else {
            continue;
        };

        match change {
            TreeChange::Insert { mode, .. } if is_root && mode.is_tree() => {
                ports.insert(port, PortChange::Added);
            }
            TreeChange::Delete { mode, .. } if is_root && mode.is_tree() => {
                ports.insert(port, PortChange::Removed);
            }
            TreeChange::Insert { .. } | TreeChange::Delete { .. } | TreeChange::Modify { .. } => {
                ports.entry(port).or_insert(PortChange::Changed);
            }
        }
    }

    ports
}

/// 找出自 `baseline` 提交以来发生变化的 port
///
/// # 参数
///
/// * `store` - 已打开的 ports 树
/// * `baseline` - 上次处理完成的提交哈希
///
/// # 返回值
///
/// * `Ok(PortChanges)` - HEAD 哈希与分类结果
/// * `Err(PortDiffError)` - 无法解析提交/树或差异计算失败
pub fn find_updated<S: TreeStore>(store: &S, baseline: &str) -> Result<PortChanges, PortDiffError> {
    let head = store.head_commit()?;
    let head_tree = store.commit_tree(&head)?;

    let base = store.find_commit(baseline)?;
    let base_tree = store.commit_tree(&base)?;

    debug!("Diffing tree {} against {}", base_tree, head_tree);
    let changes = store.diff_trees(&base_tree, &head_tree)?;
    let ports = classify_changes(&changes);

    info!(
        "Found {} changed ports between {} and {} ({} tree changes)",
        ports.len(),
        baseline,
        head,
        changes.len()
    );

    Ok(PortChanges {
        head: head.to_string(),
        ports,
    })
}

/// 枚举 HEAD 中的全部 port，全部分类为 `Added`
pub fn find_all_ports<S: TreeStore>(store: &S) -> Result<PortChanges, PortDiffError> {
    let head = store.head_commit()?;
    let root = store.commit_tree(&head)?;

    let mut ports = HashMap::new();

    for category in store.tree_entries(&root)? {
        if !category.mode.is_tree() || is_infrastructure(&category.name) {
            continue;
        }

        for entry in store.tree_entries(&category.id)? {
            if !entry.mode.is_tree() || is_infrastructure(&entry.name) {
                continue;
            }
            ports.insert(
                PortName::new(category.name.clone(), entry.name),
                PortChange::Added,
            );
        }
    }

    info!("Found {} ports at {}", ports.len(), head);

    Ok(PortChanges {
        head: head.to_string(),
        ports,
    })
}

#[cfg(test)]
#[path = "port_diff_test.rs"]
mod tests;
