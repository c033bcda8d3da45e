// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::{debug, info};

use crate::domain::models::{PortInfo, PortName};
use crate::domain::repositories::port_store::{PersistenceError, PortStore};

/// 存储中的一条 port 记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPort {
    /// 最近一次提取的元数据
    pub info: PortInfo,
    /// 最近发现的新版本
    pub new_version: Option<String>,
    /// 最近更新时间
    pub updated_at: DateTime<Utc>,
}

/// 存储文件的内容
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    last_commit: Option<String>,
    ports: Vec<StoredPort>,
}

/// 内存 port 存储
///
/// `index` 按名称保存全部 port，分页与快照直接按它的顺序读取。
/// 增删 port 时先取 `index` 的写锁再改 `ports`，两者始终一致。
#[derive(Debug, Default)]
pub struct MemoryPortStore {
    ports: DashMap<PortName, StoredPort>,
    index: RwLock<BTreeSet<PortName>>,
    last_commit: RwLock<Option<String>>,
}

impl MemoryPortStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, port: &PortName) -> Option<StoredPort> {
        self.ports.get(port).map(|p| p.value().clone())
    }

    /// 最近为 port 记录的新版本
    pub fn new_version(&self, port: &PortName) -> Option<String> {
        self.ports.get(port).and_then(|p| p.new_version.clone())
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    fn snapshot(&self) -> StoreSnapshot {
        let index = self.index.read();
        StoreSnapshot {
            last_commit: self.last_commit.read().clone(),
            ports: index
                .iter()
                .filter_map(|name| self.ports.get(name).map(|p| p.value().clone()))
                .collect(),
        }
    }

    fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        *store.last_commit.write() = snapshot.last_commit;
        let mut index = store.index.write();
        for port in snapshot.ports {
            index.insert(port.info.name.clone());
            store.ports.insert(port.info.name.clone(), port);
        }
        drop(index);
        store
    }
}

#[async_trait]
impl PortStore for MemoryPortStore {
    async fn upsert_port(&self, port: &PortInfo) -> Result<(), PersistenceError> {
        let now = Utc::now();
        let mut index = self.index.write();
        self.ports
            .entry(port.name.clone())
            .and_modify(|stored| {
                stored.info = port.clone();
                stored.updated_at = now;
            })
            .or_insert_with(|| StoredPort {
                info: port.clone(),
                new_version: None,
                updated_at: now,
            });
        index.insert(port.name.clone());
        Ok(())
    }

    async fn remove_port(&self, port: &PortName) -> Result<(), PersistenceError> {
        let mut index = self.index.write();
        self.ports.remove(port);
        index.remove(port);
        Ok(())
    }

    async fn get_last_commit(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.last_commit.read().clone())
    }

    async fn set_last_commit(&self, commit: &str) -> Result<(), PersistenceError> {
        *self.last_commit.write() = Some(commit.to_string());
        Ok(())
    }

    async fn list_ports(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PortInfo>, PersistenceError> {
        let index = self.index.read();
        Ok(index
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|name| self.ports.get(name).map(|p| p.info.clone()))
            .collect())
    }

    async fn record_new_version(
        &self,
        port: &PortName,
        version: &str,
    ) -> Result<(), PersistenceError> {
        let mut stored = self
            .ports
            .get_mut(port)
            .ok_or_else(|| PersistenceError::NotFound(port.to_string()))?;
        stored.new_version = Some(version.to_string());
        stored.updated_at = Utc::now();
        Ok(())
    }
}

/// 基于 JSON 文件的 port 存储
///
/// 数据保存在 `<state_dir>/ports.json`，先写临时文件再重命名。
/// port 的增删只标记为脏数据，记录提交、记录新版本以及显式 `flush` 时写盘。
pub struct FilePortStore {
    path: PathBuf,
    inner: MemoryPortStore,
    dirty: AtomicBool,
    write_lock: tokio::sync::Mutex<()>,
}

impl FilePortStore {
    const FILE_NAME: &'static str = "ports.json";

    /// 打开状态目录中的存储，文件不存在时从空存储开始
    ///
    /// # 参数
    ///
    /// * `state_dir` - 状态目录，不存在时会被创建
    pub async fn open(state_dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let state_dir = state_dir.as_ref();
        fs::create_dir_all(state_dir).await?;
        let path = state_dir.join(Self::FILE_NAME);

        let inner = match fs::read(&path).await {
            Ok(data) => {
                let snapshot: StoreSnapshot = serde_json::from_slice(&data)?;
                info!(
                    "Loaded {} ports from {}",
                    snapshot.ports.len(),
                    path.display()
                );
                MemoryPortStore::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state at {}, starting empty", path.display());
                MemoryPortStore::new()
            }
            Err(e) => return Err(PersistenceError::Io(e)),
        };

        Ok(Self {
            path,
            inner,
            dirty: AtomicBool::new(false),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, port: &PortName) -> Option<StoredPort> {
        self.inner.get(port)
    }

    /// 把内存中的数据写入文件
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        self.dirty.store(false, Ordering::SeqCst);

        let data = serde_json::to_vec_pretty(&self.inner.snapshot())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Wrote {} bytes to {}", data.len(), self.path.display());
        Ok(())
    }

    /// 有未写盘的修改时写盘
    pub async fn flush_if_dirty(&self) -> Result<(), PersistenceError> {
        if self.dirty.load(Ordering::SeqCst) {
            self.flush().await
        } else {
            Ok(())
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PortStore for FilePortStore {
    async fn upsert_port(&self, port: &PortInfo) -> Result<(), PersistenceError> {
        self.inner.upsert_port(port).await?;
        self.mark_dirty();
        Ok(())
    }

    async fn remove_port(&self, port: &PortName) -> Result<(), PersistenceError> {
        self.inner.remove_port(port).await?;
        self.mark_dirty();
        Ok(())
    }

    async fn get_last_commit(&self) -> Result<Option<String>, PersistenceError> {
        self.inner.get_last_commit().await
    }

    async fn set_last_commit(&self, commit: &str) -> Result<(), PersistenceError> {
        self.inner.set_last_commit(commit).await?;
        self.flush().await
    }

    async fn list_ports(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PortInfo>, PersistenceError> {
        self.inner.list_ports(limit, offset).await
    }

    async fn record_new_version(
        &self,
        port: &PortName,
        version: &str,
    ) -> Result<(), PersistenceError> {
        self.inner.record_new_version(port, version).await?;
        self.flush().await
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
