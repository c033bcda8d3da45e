// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::tree_diff;
use crate::utils::errors::{DiffError, RepositoryError};
use std::fmt;

/// 树条目模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// 目录
    Tree,
    /// 普通文件
    Blob,
    /// 可执行文件
    BlobExecutable,
    /// 符号链接
    Link,
    /// 子模块
    Commit,
}

impl EntryMode {
    pub fn is_tree(self) -> bool {
        self == EntryMode::Tree
    }
}

/// 树快照中的一个条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry<Id> {
    pub name: String,
    pub mode: EntryMode,
    pub id: Id,
}

/// 两个树快照之间的一处结构变化
///
/// 路径以 `/` 分隔，相对于树根。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// 新增条目
    Insert { path: String, mode: EntryMode },
    /// 删除条目
    Delete { path: String, mode: EntryMode },
    /// 内容或模式变化
    Modify {
        path: String,
        old_mode: EntryMode,
        new_mode: EntryMode,
    },
}

impl TreeChange {
    pub fn path(&self) -> &str {
        match self {
            TreeChange::Insert { path, .. }
            | TreeChange::Delete { path, .. }
            | TreeChange::Modify { path, .. } => path,
        }
    }
}

/// 树/提交存储特质
///
/// 抽象版本控制系统：解析 HEAD、按哈希查找提交、取得提交对应的树，
/// 以及列出树条目。差异计算默认基于条目列表完成。
pub trait TreeStore: Send + Sync {
    /// 对象标识
    type Id: Clone + Eq + fmt::Display + Send + Sync;

    /// 解析 HEAD 指向的提交
    fn head_commit(&self) -> Result<Self::Id, RepositoryError>;

    /// 按十六进制哈希查找提交
    fn find_commit(&self, hash: &str) -> Result<Self::Id, RepositoryError>;

    /// 获取提交的根树
    fn commit_tree(&self, commit: &Self::Id) -> Result<Self::Id, RepositoryError>;

    /// 列出树的直接子条目
    fn tree_entries(&self, tree: &Self::Id) -> Result<Vec<TreeEntry<Self::Id>>, RepositoryError>;

    /// 计算两个树快照之间的结构化差异
    fn diff_trees(&self, old: &Self::Id, new: &Self::Id) -> Result<Vec<TreeChange>, DiffError>
    where
        Self: Sized,
    {
        tree_diff::diff_trees(self, old, new)
    }
}
