// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use thiserror::Error;

/// 版本库错误类型
///
/// 打开 ports 树、解析 HEAD 或提交、读取树对象失败时返回。
/// 属于整轮致命错误：出现时不会返回任何部分结果。
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("无法打开 ports 树 {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("无法解析 HEAD: {0}")]
    Head(String),

    #[error("无效的提交哈希 {hash}: {message}")]
    InvalidHash { hash: String, message: String },

    #[error("未找到提交 {hash}: {message}")]
    CommitNotFound { hash: String, message: String },

    #[error("无法获取提交 {commit} 的树: {message}")]
    Tree { commit: String, message: String },

    #[error("无法读取树对象 {id}: {message}")]
    TreeEntries { id: String, message: String },
}

/// 结构化差异计算错误
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("读取 '{path}' 处的树失败: {source}")]
    TreeRead {
        path: String,
        #[source]
        source: RepositoryError,
    },
}

/// 元数据提取错误类型
///
/// 单个 port 的提取失败只附着在该 port 的结果上，不影响其他任务。
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("无法启动构建工具 '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("构建工具退出码 {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("构建工具输出格式错误: 期望 {expected} 行, 实际 {actual} 行")]
    MalformedOutput { expected: usize, actual: usize },

    #[error("并发闸门已关闭")]
    GateClosed,

    #[error("提取任务异常结束: {0}")]
    TaskFailed(String),
}

/// 操作被取消信号中止
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("操作已取消")]
pub struct CancellationError;
