// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 包含 port 名称、元数据以及标签列表等核心实体
pub mod port;
pub mod tagged_list;

pub use port::{GitHubInfo, PortChange, PortInfo, PortName};
pub use tagged_list::TaggedList;
