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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const ENV_PREFIX: &str = "PORTSCOUT";

/// 应用程序配置设置
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// ports 树配置
    pub tree: TreeSettings,
    /// 站点爬取配置
    pub crawler: CrawlerSettings,
    /// 存储配置
    pub storage: StorageSettings,
    /// 版本猜测配置
    pub version: VersionSettings,
}

/// ports 树配置设置
#[derive(Debug, Deserialize)]
pub struct TreeSettings {
    /// ports 树所在目录，同时也是 git 仓库
    pub ports_dir: PathBuf,
    /// 构建工具命令
    pub make_cmd: String,
    /// 同时运行的构建工具进程数
    pub make_threads: usize,
}

/// 站点爬取配置设置
#[derive(Debug, Deserialize)]
pub struct CrawlerSettings {
    /// 每个主机在一个窗口内允许的请求数
    pub max_requests: u32,
    /// 限流窗口（秒）
    pub window_secs: u64,
    /// FTP 连接超时（秒）
    pub ftp_timeout_secs: u64,
    /// 任务队列容量
    pub queue_capacity: usize,
}

/// 存储配置设置
#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// 状态文件目录
    pub state_dir: PathBuf,
}

/// 版本猜测配置设置
#[derive(Debug, Deserialize)]
pub struct VersionSettings {
    /// 增加 2 而不是 1 的数字段序号，负数表示不使用
    pub special_index: i64,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `PORTSCOUT__` 前缀的环境变量，后者优先
    ///
    /// # 返回值
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::load(&env, None)
    }

    /// 按给定环境名加载配置
    ///
    /// `vars` 为 `Some` 时代替进程环境变量
    pub(crate) fn load(
        env: &str,
        vars: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("tree.ports_dir", "/usr/ports")?
            .set_default("tree.make_cmd", "make")?
            .set_default("tree.make_threads", 4)?
            .set_default("crawler.max_requests", 2)?
            .set_default("crawler.window_secs", 1)?
            .set_default("crawler.ftp_timeout_secs", 30)?
            .set_default("crawler.queue_capacity", 64)?
            .set_default("storage.state_dir", "./state")?
            .set_default("version.special_index", -1)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            );

        builder.build()?.try_deserialize()
    }

    pub fn crawl_window(&self) -> Duration {
        Duration::from_secs(self.crawler.window_secs)
    }

    pub fn ftp_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.ftp_timeout_secs)
    }

    /// 版本猜测的特殊序号，负数时为 `None`
    pub fn special_index(&self) -> Option<usize> {
        usize::try_from(self.version.special_index).ok()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
