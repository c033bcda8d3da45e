// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含同步和版本检查用例以及存储分页
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含 port 模型、存储接口以及树差异和版本猜测服务
pub mod domain;

/// 引擎模块
///
/// 按 URL scheme 分派的站点列举处理器
pub mod engines;

/// 基础设施模块
///
/// 提供 git 仓库、构建工具、状态存储和指标的实现
pub mod infrastructure;

/// 工具模块
///
/// 提供错误类型、限流器和日志初始化
pub mod utils;

/// 工作器模块
///
/// 实现元数据提取和站点爬取的并行工作池
pub mod workers;
