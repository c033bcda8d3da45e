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

use crate::domain::models::PortName;
use crate::engines::router::HandlerRegistry;
use crate::engines::traits::CrawlError;
use crate::utils::crawl_limiter::SiteLimiter;
use metrics::counter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// 爬取任务：一个 port 的一个站点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub port: PortName,
    pub site: Url,
}

/// 爬取结果，每个任务恰好产生一个
#[derive(Debug)]
pub struct CrawlResult {
    pub port: PortName,
    pub site: Url,
    pub result: Result<Vec<Url>, CrawlError>,
}

/// 站点爬虫
///
/// 按 scheme 选择协议处理器，在任何网络操作之前等待目标主机的限流配额。
pub struct SiteCrawler {
    handlers: HandlerRegistry,
    limiter: Arc<dyn SiteLimiter>,
    cancel: CancellationToken,
}

impl SiteCrawler {
    pub fn new(
        handlers: HandlerRegistry,
        limiter: Arc<dyn SiteLimiter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            handlers,
            limiter,
            cancel,
        }
    }

    /// 爬取单个站点
    #[instrument(skip(self, job), fields(port = %job.port, site = %job.site))]
    pub async fn crawl(&self, job: CrawlJob) -> CrawlResult {
        let result = self.list(&job.site).await;

        match &result {
            Ok(files) => {
                counter!("portscout_crawls_total", "outcome" => "ok").increment(1);
                debug!("Found {} files", files.len());
            }
            Err(e) => {
                counter!("portscout_crawls_total", "outcome" => "error").increment(1);
                warn!("Crawl failed: {}", e);
            }
        }

        CrawlResult {
            port: job.port,
            site: job.site,
            result,
        }
    }

    async fn list(&self, site: &Url) -> Result<Vec<Url>, CrawlError> {
        // An unknown scheme never touches the limiter or the network
        let handler = self.handlers.resolve(site)?;
        self.limiter.wait(site, &self.cancel).await?;
        handler.list_files(site).await
    }

    /// 启动爬取流水线
    ///
    /// 每个任务独立调度；任务发送端关闭且全部任务产生结果后，结果通道关闭。
    ///
    /// # 参数
    ///
    /// * `capacity` - 任务与结果通道的容量
    pub fn spawn(
        self: Arc<Self>,
        capacity: usize,
    ) -> (
        mpsc::Sender<CrawlJob>,
        mpsc::Receiver<CrawlResult>,
        JoinHandle<()>,
    ) {
        let (job_tx, mut job_rx) = mpsc::channel::<CrawlJob>(capacity.max(1));
        let (result_tx, result_rx) = mpsc::channel::<CrawlResult>(capacity.max(1));

        let dispatcher = tokio::spawn(async move {
            let mut workers = Vec::new();

            while let Some(job) = job_rx.recv().await {
                let crawler = self.clone();
                let result_tx = result_tx.clone();

                workers.push(tokio::spawn(async move {
                    let (port, site) = (job.port.clone(), job.site.clone());
                    let inner = tokio::spawn(async move { crawler.crawl(job).await });

                    let result = match inner.await {
                        Ok(result) => result,
                        Err(e) => CrawlResult {
                            port,
                            site,
                            result: Err(CrawlError::TaskFailed(e.to_string())),
                        },
                    };

                    if result_tx.send(result).await.is_err() {
                        debug!("Result receiver dropped");
                    }
                }));
            }

            let total = workers.len();
            for worker in workers {
                if let Err(e) = worker.await {
                    warn!("Crawl worker ended abnormally: {}", e);
                }
            }

            info!("Site crawler finished {} jobs", total);
        });

        (job_tx, result_rx, dispatcher)
    }
}

#[cfg(test)]
#[path = "crawler_test.rs"]
mod tests;
