// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use super::tagged_list::TaggedList;

/// Port 名称
///
/// 由 `(category, name)` 组成，规范字符串形式为 `category/name`。
/// 在整个系统中作为映射键使用，相等性按结构比较。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortName {
    /// 分类目录，例如 `mail`
    pub category: String,
    /// port 目录名
    pub name: String,
}

impl PortName {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }

    /// port 在 ports 树中的目录
    pub fn dir_in(&self, ports_dir: &Path) -> PathBuf {
        ports_dir.join(&self.category).join(&self.name)
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Port 名称解析错误
#[derive(Error, Debug, PartialEq, Eq)]
#[error("无效的 port 名称: {0}")]
pub struct InvalidPortName(pub String);

impl FromStr for PortName {
    type Err = InvalidPortName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((category, name))
                if !category.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(category, name))
            }
            _ => Err(InvalidPortName(s.to_string())),
        }
    }
}

/// 单次差异运行中 port 的变更分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortChange {
    /// 新增
    Added,
    /// 已删除
    Removed,
    /// 已修改
    Changed,
}

impl fmt::Display for PortChange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PortChange::Added => write!(f, "added"),
            PortChange::Removed => write!(f, "removed"),
            PortChange::Changed => write!(f, "changed"),
        }
    }
}

/// GitHub 发布信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubInfo {
    pub account: String,
    pub project: String,
    pub tag_name: String,
    pub sub_dir: String,
}

/// Port 元数据
///
/// 每次成功提取时创建一次，之后不再原地修改，只会被复制到下一阶段
/// （提取器 → 爬虫 → 持久化）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    /// port 名称
    pub name: PortName,
    /// `DISTNAME`
    pub dist_name: String,
    /// `DISTVERSION`
    pub dist_version: String,
    /// `DISTFILES`
    pub dist_files: TaggedList,
    /// `EXTRACT_SUFX`
    pub extract_suffix: String,
    /// `MASTER_SITES`
    pub master_sites: TaggedList,
    /// `MASTER_SITE_SUBDIR`
    pub master_site_subdir: String,
    /// `SLAVE_PORT`
    pub slave_port: String,
    /// `MASTER_PORT`
    pub master_port: String,
    /// `PORTSCOUT`，排除/限制扫描的标记
    pub portscout: String,
    /// `MAINTAINER`
    pub maintainer: String,
    /// `COMMENT`
    pub comment: String,
    /// 使用 GitHub 发布时的描述信息
    pub github: Option<GitHubInfo>,
}

impl PortInfo {
    /// 创建只有名称的空记录
    pub fn new(name: PortName) -> Self {
        Self {
            name,
            dist_name: String::new(),
            dist_version: String::new(),
            dist_files: TaggedList::new(),
            extract_suffix: String::new(),
            master_sites: TaggedList::new(),
            master_site_subdir: String::new(),
            slave_port: String::new(),
            master_port: String::new(),
            portscout: String::new(),
            maintainer: String::new(),
            comment: String::new(),
            github: None,
        }
    }

    /// 是否被 `PORTSCOUT` 标记排除在扫描之外
    pub fn is_scout_excluded(&self) -> bool {
        self.portscout
            .split_whitespace()
            .any(|directive| directive.starts_with("ignore"))
    }
}
