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
use suppaftp::FtpError;
use thiserror::Error;
use url::Url;

/// 站点爬取错误类型
///
/// 每个阶段的失败都是独立可识别的变体，附带出错的站点信息。
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 没有注册处理该协议的处理器
    #[error("unhandled scheme '{0}'")]
    UnhandledScheme(String),

    /// 站点 URL 无法用于该协议
    #[error("invalid site {site}: {reason}")]
    InvalidSite { site: String, reason: String },

    /// 连接失败
    #[error("dial {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: FtpError,
    },

    /// 登录失败
    #[error("login to {host}: {source}")]
    Login {
        host: String,
        #[source]
        source: FtpError,
    },

    /// 切换目录失败
    #[error("change directory to {path} on {host}: {source}")]
    ChangeDir {
        host: String,
        path: String,
        #[source]
        source: FtpError,
    },

    /// 列目录失败
    #[error("list {path} on {host}: {source}")]
    List {
        host: String,
        path: String,
        #[source]
        source: FtpError,
    },

    /// 等待限流时被取消
    #[error(transparent)]
    Cancelled(#[from] CancellationError),

    /// 爬取任务异常结束
    #[error("crawl task failed: {0}")]
    TaskFailed(String),
}

/// 协议处理器特质
///
/// 每种传输协议实现一个处理器，按 URL 的 scheme 注册。
#[async_trait]
pub trait SiteHandler: Send + Sync {
    /// 处理的 URL scheme（小写）
    fn scheme(&self) -> &'static str;

    /// 列出站点目录下的全部普通文件
    ///
    /// # 参数
    ///
    /// * `site` - 站点目录 URL
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<Url>)` - 每个文件的绝对 URL
    /// * `Err(CrawlError)` - 失败的阶段及原因
    async fn list_files(&self, site: &Url) -> Result<Vec<Url>, CrawlError>;
}
