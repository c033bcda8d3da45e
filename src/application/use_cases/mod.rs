// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 每个用例对应一次完整的处理阶段
pub mod check_updates;
pub mod sync_ports;
