// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理 ports 树、爬虫、存储和版本猜测的配置
pub mod settings;
