// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 编排 ports 树同步和版本检查两个阶段
pub mod pager;
pub mod use_cases;
