// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供错误类型、按主机限流与遥测初始化
pub mod crawl_limiter;
pub mod errors;
pub mod telemetry;
