// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 构建工具（build_tool）：调用 `make` 查询 port 变量
/// - 版本库（git）：基于 gix 的 ports 树存储
/// - 指标（metrics）：指标说明注册
/// - 存储（storage）：port 存储的内存与文件实现
///
/// 基础设施层依赖于领域层的抽象接口。
pub mod build_tool;
pub mod git;
pub mod metrics;
pub mod storage;
