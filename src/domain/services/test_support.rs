// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试用的内存树存储

use crate::domain::repositories::tree_store::{EntryMode, TreeEntry, TreeStore};
use crate::utils::errors::RepositoryError;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// 内存树存储
///
/// 文件内容以 `@link:` 开头时按符号链接处理，以 `@exec:` 开头时按可执行文件处理。
#[derive(Default)]
pub struct MemoryTreeStore {
    trees: HashMap<String, Vec<TreeEntry<String>>>,
    commits: HashMap<String, String>,
    head: Option<String>,
    pub broken_trees: Vec<String>,
}

enum Node<'a> {
    File(&'a str),
    Dir(BTreeMap<&'a str, Node<'a>>),
}

fn digest(parts: &[String]) -> String {
    let mut hasher = DefaultHasher::new();
    parts.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个提交并把 HEAD 指向它，返回提交的根树标识
    pub fn commit(&mut self, commit: &str, files: &[(&str, &str)]) -> String {
        let mut root: BTreeMap<&str, Node> = BTreeMap::new();
        for (path, content) in files {
            insert_node(&mut root, path.split('/').collect(), *content);
        }
        let tree = self.store_dir(&root);
        self.commits.insert(commit.to_string(), tree.clone());
        self.head = Some(commit.to_string());
        tree
    }

    pub fn tree_of(&self, commit: &str) -> Option<String> {
        self.commits.get(commit).cloned()
    }

    fn store_dir(&mut self, dir: &BTreeMap<&str, Node>) -> String {
        let mut entries = Vec::new();
        for (name, node) in dir {
            let entry = match node {
                Node::File(content) => {
                    let (mode, body) = if let Some(rest) = content.strip_prefix("@link:") {
                        (EntryMode::Link, rest)
                    } else if let Some(rest) = content.strip_prefix("@exec:") {
                        (EntryMode::BlobExecutable, rest)
                    } else {
                        (EntryMode::Blob, *content)
                    };
                    TreeEntry {
                        name: name.to_string(),
                        mode,
                        id: format!("blob-{}", digest(&[body.to_string()])),
                    }
                }
                Node::Dir(children) => TreeEntry {
                    name: name.to_string(),
                    mode: EntryMode::Tree,
                    id: self.store_dir(children),
                },
            };
            entries.push(entry);
        }

        let id = format!(
            "tree-{}",
            digest(
                &entries
                    .iter()
                    .map(|e| format!("{}:{:?}:{}", e.name, e.mode, e.id))
                    .collect::<Vec<_>>()
            )
        );
        self.trees.insert(id.clone(), entries);
        id
    }
}

fn insert_node<'a>(dir: &mut BTreeMap<&'a str, Node<'a>>, segments: Vec<&'a str>, content: &'a str) {
    match segments.split_first() {
        Some((name, [])) => {
            dir.insert(*name, Node::File(content));
        }
        Some((name, rest)) => {
            let child = dir
                .entry(*name)
                .or_insert_with(|| Node::Dir(BTreeMap::new()));
            if let Node::Dir(children) = child {
                insert_node(children, rest.to_vec(), content);
            }
        }
        None => {}
    }
}

impl TreeStore for MemoryTreeStore {
    type Id = String;

    fn head_commit(&self) -> Result<String, RepositoryError> {
        self.head
            .clone()
            .ok_or_else(|| RepositoryError::Head("empty repository".to_string()))
    }

    fn find_commit(&self, hash: &str) -> Result<String, RepositoryError> {
        if self.commits.contains_key(hash) {
            Ok(hash.to_string())
        } else {
            Err(RepositoryError::CommitNotFound {
                hash: hash.to_string(),
                message: "no such commit".to_string(),
            })
        }
    }

    fn commit_tree(&self, commit: &String) -> Result<String, RepositoryError> {
        self.commits
            .get(commit)
            .cloned()
            .ok_or_else(|| RepositoryError::Tree {
                commit: commit.clone(),
                message: "no such commit".to_string(),
            })
    }

    fn tree_entries(&self, tree: &String) -> Result<Vec<TreeEntry<String>>, RepositoryError> {
        if self.broken_trees.contains(tree) {
            return Err(RepositoryError::TreeEntries {
                id: tree.clone(),
                message: "corrupt object".to_string(),
            });
        }
        self.trees
            .get(tree)
            .cloned()
            .ok_or_else(|| RepositoryError::TreeEntries {
                id: tree.clone(),
                message: "no such tree".to_string(),
            })
    }
}
