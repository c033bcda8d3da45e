// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：port 名称、元数据与标签列表
/// - 仓库接口（repositories）：port 存储与版本库树的抽象接口
/// - 服务（services）：差异计算与版本猜测
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod services;
