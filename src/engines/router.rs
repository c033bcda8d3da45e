// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::ftp_engine::FtpHandler;
use crate::engines::traits::{CrawlError, SiteHandler};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// 协议处理器注册表
///
/// 按 URL scheme 选择处理器。新增协议只需注册新的处理器，爬取主循环无需改动。
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn SiteHandler>>,
}

impl HandlerRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含内置 FTP 处理器的注册表
    ///
    /// # 参数
    ///
    /// * `ftp_timeout` - FTP 连接超时
    pub fn with_defaults(ftp_timeout: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FtpHandler::new(ftp_timeout)));
        registry
    }

    /// 注册处理器，同一 scheme 的旧处理器会被替换
    pub fn register(&mut self, handler: Arc<dyn SiteHandler>) {
        info!("Registering site handler for scheme '{}'", handler.scheme());
        self.handlers
            .insert(handler.scheme().to_ascii_lowercase(), handler);
    }

    /// 按站点 URL 的 scheme 查找处理器
    ///
    /// # 返回值
    ///
    /// * `Ok(Arc<dyn SiteHandler>)` - 对应的处理器
    /// * `Err(CrawlError::UnhandledScheme)` - 没有注册该 scheme
    pub fn resolve(&self, site: &Url) -> Result<Arc<dyn SiteHandler>, CrawlError> {
        self.handlers
            .get(site.scheme())
            .cloned()
            .ok_or_else(|| CrawlError::UnhandledScheme(site.scheme().to_string()))
    }

    /// 已注册的 scheme，按字母排序
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}
