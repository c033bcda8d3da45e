// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 树差异（tree_diff）：两棵版本库树之间的结构化差异
/// - port 差异（port_diff）：把结构化差异归类为 port 级变更
/// - 版本猜测（version_guesser）：根据当前版本推测下一个版本
pub mod port_diff;
pub mod tree_diff;
pub mod version_guesser;

#[cfg(test)]
pub mod test_support;
