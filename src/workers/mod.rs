// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 元数据提取与站点爬取两条并行流水线
pub mod crawler;
pub mod extractor;
