// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{PortInfo, PortName};
use async_trait::async_trait;
use thiserror::Error;

/// 持久化错误类型
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 未找到
    #[error("Port not found: {0}")]
    NotFound(String),
    /// 其他存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// Port 存储特质
///
/// 核心流程只依赖这个窄接口，不依赖任何存储结构。
#[async_trait]
pub trait PortStore: Send + Sync {
    /// 插入或更新 port 元数据
    async fn upsert_port(&self, port: &PortInfo) -> Result<(), PersistenceError>;

    /// 删除 port
    async fn remove_port(&self, port: &PortName) -> Result<(), PersistenceError>;

    /// 批量删除 port，遇到第一个错误即停止
    async fn remove_ports(&self, ports: &[PortName]) -> Result<(), PersistenceError> {
        for port in ports {
            self.remove_port(port).await?;
        }
        Ok(())
    }

    /// 获取上次处理完成的提交，从未扫描过时返回 `None`
    async fn get_last_commit(&self) -> Result<Option<String>, PersistenceError>;

    /// 记录处理完成的提交
    async fn set_last_commit(&self, commit: &str) -> Result<(), PersistenceError>;

    /// 分页列出已存储的 port，按名称排序
    async fn list_ports(&self, limit: usize, offset: usize)
        -> Result<Vec<PortInfo>, PersistenceError>;

    /// 记录发现的新版本
    async fn record_new_version(
        &self,
        port: &PortName,
        version: &str,
    ) -> Result<(), PersistenceError>;
}
