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

use crate::domain::models::{GitHubInfo, PortInfo, PortName, TaggedList};
use crate::infrastructure::build_tool::BuildTool;
use crate::utils::errors::ExtractionError;
use metrics::counter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// 按顺序查询的变量，构建工具每行输出一个值
pub const QUERY_VARS: [&str; 16] = [
    "DISTNAME",
    "DISTVERSION",
    "DISTFILES",
    "EXTRACT_SUFX",
    "MASTER_SITES",
    "MASTER_SITE_SUBDIR",
    "SLAVE_PORT",
    "MASTER_PORT",
    "PORTSCOUT",
    "MAINTAINER",
    "COMMENT",
    "USE_GITHUB",
    "GH_ACCOUNT",
    "GH_PROJECT",
    "GH_TAGNAME",
    "GH_SUBDIR",
];

/// 提取任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryJob {
    pub port: PortName,
}

/// 提取结果，每个任务恰好产生一个
#[derive(Debug)]
pub struct QueryResult {
    pub port: PortName,
    pub result: Result<PortInfo, ExtractionError>,
}

/// 把构建工具的输出解析为 port 元数据
///
/// 按 `\n` 切分后必须恰好有 `QUERY_VARS` 对应的字段数；多出的唯一一个空字段
/// 视为结尾换行。最后一个变量为空且没有结尾换行时同样合法。
pub fn parse_query_output(port: PortName, stdout: &str) -> Result<PortInfo, ExtractionError> {
    let mut lines: Vec<&str> = stdout.split('\n').map(str::trim).collect();
    if lines.len() == QUERY_VARS.len() + 1 && lines.last() == Some(&"") {
        lines.pop();
    }

    if lines.len() != QUERY_VARS.len() {
        return Err(ExtractionError::MalformedOutput {
            expected: QUERY_VARS.len(),
            actual: lines.len(),
        });
    }

    let github = if lines[11].is_empty() {
        None
    } else {
        Some(GitHubInfo {
            account: lines[12].to_string(),
            project: lines[13].to_string(),
            tag_name: lines[14].to_string(),
            sub_dir: lines[15].to_string(),
        })
    };

    Ok(PortInfo {
        name: port,
        dist_name: lines[0].to_string(),
        dist_version: lines[1].to_string(),
        dist_files: TaggedList::unmarshal(lines[2]),
        extract_suffix: lines[3].to_string(),
        master_sites: TaggedList::unmarshal(lines[4]),
        master_site_subdir: lines[5].to_string(),
        slave_port: lines[6].to_string(),
        master_port: lines[7].to_string(),
        portscout: lines[8].to_string(),
        maintainer: lines[9].to_string(),
        comment: lines[10].to_string(),
        github,
    })
}

/// 元数据提取器
///
/// 用计数信号量限制同时运行的构建工具进程数。任务与结果走两条独立的
/// 有界通道，提交方和消费方可以位于不同的任务中。
pub struct MetadataExtractor {
    tool: Arc<dyn BuildTool>,
    ports_dir: PathBuf,
    gate: Arc<Semaphore>,
}

impl MetadataExtractor {
    /// 创建提取器
    ///
    /// # 参数
    ///
    /// * `tool` - 构建工具
    /// * `ports_dir` - ports 树根目录
    /// * `max_proc` - 最大并发进程数（至少为 1）
    pub fn new(tool: Arc<dyn BuildTool>, ports_dir: impl Into<PathBuf>, max_proc: usize) -> Self {
        Self {
            tool,
            ports_dir: ports_dir.into(),
            gate: Arc::new(Semaphore::new(max_proc.max(1))),
        }
    }

    /// 提取单个 port 的元数据
    ///
    /// 占用一个并发名额直到构建工具返回，无论成功与否都会释放。
    #[instrument(skip(self), fields(port = %port))]
    pub async fn extract(&self, port: PortName) -> QueryResult {
        let result = self.query(&port).await;

        match &result {
            Ok(_) => {
                counter!("portscout_extractions_total", "outcome" => "ok").increment(1);
                debug!("Extracted metadata");
            }
            Err(e) => {
                counter!("portscout_extractions_total", "outcome" => "error").increment(1);
                warn!("Extraction failed: {}", e);
            }
        }

        QueryResult { port, result }
    }

    async fn query(&self, port: &PortName) -> Result<PortInfo, ExtractionError> {
        let _permit = self
            .gate
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ExtractionError::GateClosed)?;

        let stdout = self
            .tool
            .query(&port.dir_in(&self.ports_dir), &QUERY_VARS)
            .await?;

        parse_query_output(port.clone(), &stdout)
    }

    /// 启动提取流水线
    ///
    /// 每个接收到的任务在独立的 tokio 任务中执行。任务发送端全部关闭且
    /// 所有任务都产生结果之后，结果通道才会关闭。
    ///
    /// # 参数
    ///
    /// * `capacity` - 任务与结果通道的容量
    ///
    /// # 返回值
    ///
    /// 任务发送端、结果接收端以及调度任务的句柄
    pub fn spawn(
        self: Arc<Self>,
        capacity: usize,
    ) -> (
        mpsc::Sender<QueryJob>,
        mpsc::Receiver<QueryResult>,
        JoinHandle<()>,
    ) {
        let (job_tx, mut job_rx) = mpsc::channel::<QueryJob>(capacity.max(1));
        let (result_tx, result_rx) = mpsc::channel::<QueryResult>(capacity.max(1));

        let dispatcher = tokio::spawn(async move {
            let mut workers = Vec::new();

            while let Some(job) = job_rx.recv().await {
                let extractor = self.clone();
                let result_tx = result_tx.clone();

                workers.push(tokio::spawn(async move {
                    let port = job.port.clone();
                    let inner = tokio::spawn(async move { extractor.extract(job.port).await });

                    let result = match inner.await {
                        Ok(result) => result,
                        Err(e) => QueryResult {
                            port,
                            result: Err(ExtractionError::TaskFailed(e.to_string())),
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
                    warn!("Extraction worker ended abnormally: {}", e);
                }
            }

            info!("Metadata extractor finished {} jobs", total);
        });

        (job_tx, result_rx, dispatcher)
    }
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
