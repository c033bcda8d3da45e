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
        models::{PortInfo, PortName},
        repositories::port_store::{PersistenceError, PortStore},
        services::version_guesser::guess_versions,
    },
    workers::crawler::{CrawlJob, SiteCrawler},
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

const SUBDIR_PLACEHOLDER: &str = "%SUBDIR%";

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// 一轮版本检查的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// 参与检查的 port 数
    pub checked: usize,
    /// 被 `PORTSCOUT` 排除或没有可猜测版本的 port 数
    pub skipped: usize,
    /// 提交的站点数
    pub sites: usize,
    /// 爬取失败的站点数
    pub crawl_failed: usize,
    /// 发现的新版本，按 port 名称排序
    pub updates: Vec<(PortName, String)>,
    pub cancelled: bool,
}

/// port 的候选版本，按猜测顺序排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub version: String,
    pub file_names: HashSet<String>,
}

/// 展开 port 的主站点列表
///
/// 所有可见标签组中的站点，`%SUBDIR%` 替换为 `MASTER_SITE_SUBDIR` 的第一项，去重后保持首次出现的顺序。
pub fn master_site_urls(info: &PortInfo) -> Vec<Url> {
    let subdir = info
        .master_site_subdir
        .split_whitespace()
        .next()
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for site in info.master_sites.all_items() {
        let expanded = site.replace(SUBDIR_PLACEHOLDER, subdir);
        match Url::parse(&expanded) {
            Ok(url) => {
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
            Err(e) => debug!("Skipping master site {:?} of {}: {}", expanded, info.name, e),
        }
    }

    urls
}

/// 根据版本猜测生成每个候选版本对应的发行文件名
///
/// 包含当前版本号的 distfile 把版本号替换为候选版本；
/// 另外总是包含 `DISTNAME` 替换版本号后加上 `EXTRACT_SUFX` 的文件名。
pub fn version_candidates(info: &PortInfo, special_index: Option<usize>) -> Vec<VersionCandidate> {
    let current = info.dist_version.as_str();
    if current.is_empty() || !info.dist_name.contains(current) {
        return Vec::new();
    }

    guess_versions(current, special_index)
        .into_iter()
        .map(|version| {
            let mut file_names: HashSet<String> = info
                .dist_files
                .all_items()
                .into_iter()
                .filter(|f| f.contains(current))
                .map(|f| f.replace(current, &version))
                .collect();
            file_names.insert(format!(
                "{}{}",
                info.dist_name.replace(current, &version),
                info.extract_suffix
            ));
            VersionCandidate {
                version,
                file_names,
            }
        })
        .collect()
}

/// URL 最后一段路径（已解码）
fn file_name(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    urlencoding::decode(last).ok().map(|s| s.into_owned())
}

/// 检查 port 是否有新版本
///
/// 爬取每个 port 的主站点，把站点上的文件名与猜测版本对应的文件名比较。
/// 每个 port 取猜测顺序中最靠前的命中版本并记录到存储。
pub struct CheckUpdatesUseCase<P> {
    store: Arc<P>,
    crawler: Arc<SiteCrawler>,
    special_index: Option<usize>,
    queue_capacity: usize,
}

impl<P> CheckUpdatesUseCase<P>
where
    P: PortStore + 'static,
{
    pub fn new(
        store: Arc<P>,
        crawler: Arc<SiteCrawler>,
        special_index: Option<usize>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            store,
            crawler,
            special_index,
            queue_capacity,
        }
    }

    /// 检查输入流中的全部 port
    ///
    /// # 参数
    ///
    /// * `ports` - 待检查的 port，发送端关闭表示结束
    /// * `cancel` - 取消信号，触发后不再提交新的站点
    pub async fn run(
        &self,
        mut ports: mpsc::Receiver<PortInfo>,
        cancel: &CancellationToken,
    ) -> Result<CheckReport, CheckError> {
        let mut report = CheckReport::default();
        let mut candidates: HashMap<PortName, Vec<VersionCandidate>> = HashMap::new();
        let mut jobs = Vec::new();

        while let Some(info) = ports.recv().await {
            if info.is_scout_excluded() {
                debug!("Skipping {}: PORTSCOUT={}", info.name, info.portscout);
                report.skipped += 1;
                continue;
            }

            let guesses = version_candidates(&info, self.special_index);
            let sites = master_site_urls(&info);
            if guesses.is_empty() || sites.is_empty() {
                report.skipped += 1;
                continue;
            }

            report.checked += 1;
            for site in sites {
                jobs.push(CrawlJob {
                    port: info.name.clone(),
                    site,
                });
            }
            candidates.insert(info.name, guesses);
        }

        report.sites = jobs.len();
        let total = jobs.len();
        info!("Checking {} sites for {} ports", total, report.checked);

        let (job_tx, mut result_rx, dispatcher) = self.crawler.clone().spawn(self.queue_capacity);

        let producer_cancel = cancel.clone();
        let producer = tokio::spawn(async move {
            let mut submitted = 0usize;
            for job in jobs {
                tokio::select! {
                    biased;
                    _ = producer_cancel.cancelled() => {
                        warn!("Cancelled after submitting {} crawl jobs", submitted);
                        break;
                    }
                    sent = job_tx.send(job) => {
                        if sent.is_err() {
                            break;
                        }
                        submitted += 1;
                    }
                }
            }
            submitted
        });

        // Index of the best matching guess per port
        let mut best: HashMap<PortName, usize> = HashMap::new();

        while let Some(result) = result_rx.recv().await {
            let files = match result.result {
                Ok(files) => files,
                Err(e) => {
                    report.crawl_failed += 1;
                    debug!("Crawl of {} for {} failed: {}", result.site, result.port, e);
                    continue;
                }
            };

            let Some(guesses) = candidates.get(&result.port) else {
                continue;
            };

            let names: HashSet<String> = files.iter().filter_map(file_name).collect();
            if let Some(index) = guesses
                .iter()
                .position(|c| c.file_names.iter().any(|f| names.contains(f)))
            {
                best.entry(result.port)
                    .and_modify(|i| *i = (*i).min(index))
                    .or_insert(index);
            }
        }

        let submitted = producer
            .await
            .map_err(|e| CheckError::TaskFailed(e.to_string()))?;
        dispatcher
            .await
            .map_err(|e| CheckError::TaskFailed(e.to_string()))?;
        report.cancelled = submitted < total;

        let mut updates: Vec<(PortName, String)> = best
            .into_iter()
            .filter_map(|(port, index)| {
                let version = candidates.get(&port)?.get(index)?.version.clone();
                Some((port, version))
            })
            .collect();
        updates.sort();

        for (port, version) in &updates {
            info!("New version of {}: {}", port, version);
            self.store.record_new_version(port, version).await?;
        }

        report.updates = updates;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "check_updates_test.rs"]
mod tests;
