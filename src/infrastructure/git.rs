// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::tree_store::{EntryMode, TreeEntry, TreeStore};
use crate::utils::errors::RepositoryError;
use gix::objs::tree::EntryKind;
use gix::ObjectId;
use std::path::{Path, PathBuf};
use tracing::info;

/// 基于 gix 的 ports 树存储
///
/// 持有线程安全的仓库句柄，每次调用时取得线程本地的仓库视图。
pub struct GixTreeStore {
    path: PathBuf,
    repo: gix::ThreadSafeRepository,
}

impl GixTreeStore {
    /// 打开 ports 树
    ///
    /// # 参数
    ///
    /// * `path` - 工作目录或裸仓库路径
    ///
    /// # 返回值
    ///
    /// * `Ok(GixTreeStore)` - 打开成功
    /// * `Err(RepositoryError::Open)` - 不是 git 仓库或无法读取
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let repo = gix::ThreadSafeRepository::open(&path).map_err(|e| RepositoryError::Open {
            path: path.clone(),
            message: e.to_string(),
        })?;

        info!("Opened ports tree at {}", path.display());
        Ok(Self { path, repo })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn entry_mode(kind: EntryKind) -> EntryMode {
    match kind {
        EntryKind::Tree => EntryMode::Tree,
        EntryKind::Blob => EntryMode::Blob,
        EntryKind::BlobExecutable => EntryMode::BlobExecutable,
        EntryKind::Link => EntryMode::Link,
        EntryKind::Commit => EntryMode::Commit,
    }
}

impl TreeStore for GixTreeStore {
    type Id = ObjectId;

    fn head_commit(&self) -> Result<ObjectId, RepositoryError> {
        let repo = self.repo.to_thread_local();
        let id = repo
            .head_id()
            .map_err(|e| RepositoryError::Head(e.to_string()))?;
        Ok(id.detach())
    }

    fn find_commit(&self, hash: &str) -> Result<ObjectId, RepositoryError> {
        let repo = self.repo.to_thread_local();
        // Full object ids only, revspecs such as `HEAD~1` are rejected
        let id = ObjectId::from_hex(hash.as_bytes()).map_err(|e| RepositoryError::InvalidHash {
            hash: hash.to_string(),
            message: e.to_string(),
        })?;
        let commit = repo
            .find_commit(id)
            .map_err(|e| RepositoryError::CommitNotFound {
                hash: hash.to_string(),
                message: e.to_string(),
            })?;
        Ok(commit.id)
    }

    fn commit_tree(&self, commit: &ObjectId) -> Result<ObjectId, RepositoryError> {
        let repo = self.repo.to_thread_local();
        let tree_error = |message: String| RepositoryError::Tree {
            commit: commit.to_string(),
            message,
        };

        let commit = repo
            .find_commit(*commit)
            .map_err(|e| tree_error(e.to_string()))?;
        let tree = commit.tree_id().map_err(|e| tree_error(e.to_string()))?;
        Ok(tree.detach())
    }

    fn tree_entries(&self, tree: &ObjectId) -> Result<Vec<TreeEntry<ObjectId>>, RepositoryError> {
        let repo = self.repo.to_thread_local();
        let entries_error = |message: String| RepositoryError::TreeEntries {
            id: tree.to_string(),
            message,
        };

        let object = repo
            .find_tree(*tree)
            .map_err(|e| entries_error(e.to_string()))?;
        let decoded = object.decode().map_err(|e| entries_error(e.to_string()))?;

        Ok(decoded
            .entries
            .iter()
            .map(|entry| TreeEntry {
                name: entry.filename.to_string(),
                mode: entry_mode(entry.mode.kind()),
                id: entry.oid.to_owned(),
            })
            .collect())
    }
}
