// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    domain::{
        models::{PortChange, PortName},
        repositories::{
            port_store::{PersistenceError, PortStore},
            tree_store::TreeStore,
        },
        services::port_diff::{find_all_ports, find_updated, PortDiffError},
    },
    utils::errors::CancellationError,
    workers::extractor::{MetadataExtractor, QueryJob},
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Diff(#[from] PortDiffError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Cancelled(#[from] CancellationError),
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// 一轮同步的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// 本轮处理到的 HEAD
    pub head: String,
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
    /// 成功提取并写入的 port 数
    pub updated: usize,
    /// 提取失败的 port 数
    pub failed: usize,
    /// 是否因取消而提前停止提交
    pub cancelled: bool,
    /// 是否已把 HEAD 记为处理完成
    pub bookmarked: bool,
}

/// 同步 ports 树与存储
///
/// 计算自上次处理提交以来的变化，删除已移除的 port，重新提取新增和修改的
/// port。只有全部提取成功且没有被取消时才记录新的处理提交。
pub struct SyncPortsUseCase<T, P> {
    tree: Arc<T>,
    store: Arc<P>,
    extractor: Arc<MetadataExtractor>,
    queue_capacity: usize,
}

impl<T, P> SyncPortsUseCase<T, P>
where
    T: TreeStore + 'static,
    P: PortStore + 'static,
{
    pub fn new(
        tree: Arc<T>,
        store: Arc<P>,
        extractor: Arc<MetadataExtractor>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            tree,
            store,
            extractor,
            queue_capacity,
        }
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<SyncReport, SyncError> {
        if cancel.is_cancelled() {
            return Err(CancellationError.into());
        }

        // 1. Work out what changed since the bookmark
        let baseline = self.store.get_last_commit().await?;
        let tree = self.tree.clone();
        let changes = tokio::task::spawn_blocking(move || match baseline {
            Some(baseline) => {
                info!("Looking for ports changed since {}", baseline);
                find_updated(tree.as_ref(), &baseline)
            }
            None => {
                info!("No previous commit recorded, processing every port");
                find_all_ports(tree.as_ref())
            }
        })
        .await
        .map_err(|e| SyncError::TaskFailed(e.to_string()))??;

        let added = changes.with_change(PortChange::Added);
        let changed = changes.with_change(PortChange::Changed);
        let removed = changes.with_change(PortChange::Removed);

        let mut report = SyncReport {
            head: changes.head.clone(),
            added: added.len(),
            changed: changed.len(),
            removed: removed.len(),
            ..Default::default()
        };

        // 2. Drop removed ports in one batch
        if !removed.is_empty() {
            self.store.remove_ports(&removed).await?;
            info!("Removed {} ports", removed.len());
        }

        // 3. Re-extract added and changed ports
        let pending: Vec<PortName> = added.into_iter().chain(changed).collect();
        let total = pending.len();
        let (job_tx, mut result_rx, dispatcher) =
            self.extractor.clone().spawn(self.queue_capacity);

        let producer_cancel = cancel.clone();
        let producer = tokio::spawn(async move {
            let mut submitted = 0usize;
            for port in pending {
                tokio::select! {
                    biased;
                    _ = producer_cancel.cancelled() => {
                        warn!("Cancelled after submitting {} extraction jobs", submitted);
                        break;
                    }
                    sent = job_tx.send(QueryJob { port }) => {
                        if sent.is_err() {
                            break;
                        }
                        submitted += 1;
                    }
                }
            }
            submitted
        });

        // 4. Persist results as they arrive
        let mut persist_error = None;
        while let Some(result) = result_rx.recv().await {
            match result.result {
                Ok(info) => match self.store.upsert_port(&info).await {
                    Ok(()) => report.updated += 1,
                    Err(e) => {
                        error!("Failed to store {}: {}", result.port, e);
                        persist_error.get_or_insert(e);
                    }
                },
                Err(e) => {
                    report.failed += 1;
                    warn!("Failed to extract {}: {}", result.port, e);
                }
            }
        }

        let submitted = producer
            .await
            .map_err(|e| SyncError::TaskFailed(e.to_string()))?;
        dispatcher
            .await
            .map_err(|e| SyncError::TaskFailed(e.to_string()))?;

        report.cancelled = submitted < total || cancel.is_cancelled();

        if let Some(e) = persist_error {
            return Err(e.into());
        }

        // 5. Only advance the bookmark when nothing is left behind
        if report.failed == 0 && !report.cancelled {
            self.store.set_last_commit(&report.head).await?;
            report.bookmarked = true;
        } else {
            warn!(
                "Not recording {} as processed ({} failed, cancelled: {})",
                report.head, report.failed, report.cancelled
            );
        }

        info!(
            "Sync finished at {}: {} added, {} changed, {} removed, {} updated, {} failed",
            report.head, report.added, report.changed, report.removed, report.updated, report.failed
        );

        Ok(report)
    }
}

#[cfg(test)]
#[path = "sync_ports_test.rs"]
mod tests;
