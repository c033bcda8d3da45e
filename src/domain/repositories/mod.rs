// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层依赖的外部协作者接口：port 存储与版本库树存储
pub mod port_store;
pub mod tree_store;

pub use port_store::{PersistenceError, PortStore};
pub use tree_store::{EntryMode, TreeChange, TreeEntry, TreeStore};
