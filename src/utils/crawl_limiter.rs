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

use crate::utils::errors::CancellationError;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics::counter;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// 限流器配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlLimiterError {
    #[error("每个窗口的最大请求数必须大于 0")]
    ZeroRequests,

    #[error("限流窗口必须大于 0 (当前: {0:?})")]
    ZeroWindow(Duration),
}

/// 站点限流接口
///
/// 爬取任务在发起任何网络操作之前调用 `wait`。
#[async_trait]
pub trait SiteLimiter: Send + Sync {
    /// 等待目标主机的请求配额
    ///
    /// # 参数
    ///
    /// * `site` - 即将访问的站点
    /// * `cancel` - 取消信号，触发后等待立即以错误结束
    async fn wait(&self, site: &Url, cancel: &CancellationToken) -> Result<(), CancellationError>;
}

/// 按主机名划分的令牌桶限流器注册表
///
/// 每个主机名在首次访问时创建一个限流器，此后在进程生命周期内不再替换。
/// 锁只保护查找或创建这一步，等待发生在锁外。
#[derive(Clone)]
pub struct CrawlLimiter {
    limiters: Arc<Mutex<HashMap<String, Arc<DefaultDirectRateLimiter>>>>,
    quota: Quota,
}

impl CrawlLimiter {
    /// 创建限流器注册表
    ///
    /// # 参数
    ///
    /// * `max_requests` - 每个窗口内单个主机允许的请求数
    /// * `window` - 窗口长度
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlLimiter)` - 创建成功
    /// * `Err(CrawlLimiterError)` - 配额无效
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, CrawlLimiterError> {
        let burst = NonZeroU32::new(max_requests).ok_or(CrawlLimiterError::ZeroRequests)?;
        let period = window / max_requests;
        let quota = Quota::with_period(period)
            .ok_or(CrawlLimiterError::ZeroWindow(window))?
            .allow_burst(burst);

        Ok(Self {
            limiters: Arc::new(Mutex::new(HashMap::new())),
            quota,
        })
    }

    /// 获取或创建主机对应的限流器
    pub fn limiter_for(&self, host: &str) -> Arc<DefaultDirectRateLimiter> {
        let mut limiters = self.limiters.lock();
        limiters
            .entry(host.to_string())
            .or_insert_with(|| {
                debug!("Creating rate limiter for host {}", host);
                Arc::new(RateLimiter::direct(self.quota))
            })
            .clone()
    }

    /// 已创建限流器的主机数量
    pub fn hosts_tracked(&self) -> usize {
        self.limiters.lock().len()
    }
}

#[async_trait]
impl SiteLimiter for CrawlLimiter {
    async fn wait(&self, site: &Url, cancel: &CancellationToken) -> Result<(), CancellationError> {
        if cancel.is_cancelled() {
            return Err(CancellationError);
        }

        let host = site.host_str().unwrap_or_default();
        let limiter = self.limiter_for(host);

        if limiter.check().is_ok() {
            return Ok(());
        }

        counter!("portscout_rate_limit_waits_total").increment(1);
        debug!("Waiting for rate limit on host {}", host);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CancellationError),
            _ = limiter.until_ready() => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "crawl_limiter_test.rs"]
mod tests;
