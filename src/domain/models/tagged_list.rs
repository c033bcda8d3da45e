// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// 匹配条目末尾的 `:tag1,tag2` 标签后缀
static TAG_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([A-Za-z0-9_][A-Za-z0-9_,]*)$").expect("tag suffix pattern is valid")
});

/// 未加标签条目所在分组的键
pub const UNTAGGED: &str = "";

/// 按标签分组的 URL 列表
///
/// 用于 `DISTFILES` 与 `MASTER_SITES` 这类以空格分隔、可带 `:tag` 后缀的列表。
/// 同一标签内的条目保持首次出现的顺序；标签之间没有顺序，
/// 仅在序列化时按字典序输出以保证结果确定。
///
/// 以 `_` 开头的标签（例如 `_cargo`）属于私有标签，永远不会出现在分组中。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaggedList {
    groups: HashMap<String, Vec<String>>,
}

fn is_private_tag(tag: &str) -> bool {
    tag.starts_with('_')
}

impl TaggedList {
    /// 创建空列表
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析以空格分隔的标签列表
    ///
    /// # 示例
    ///
    /// `"http://x/:t1,t2 http://y/:t1 http://z"` 解析为
    /// `{"": [z], "t1": [x, y], "t2": [x]}`
    pub fn unmarshal(s: &str) -> Self {
        let mut list = Self::new();

        for token in s.split_whitespace() {
            match TAG_SUFFIX.captures(token) {
                Some(caps) => {
                    let suffix = caps.get(0).map_or(0, |m| m.start());
                    let url = &token[..suffix];
                    let tags = caps.get(1).map_or("", |m| m.as_str());

                    for tag in tags.split(',').filter(|t| !t.is_empty()) {
                        list.push(tag, url);
                    }
                }
                None => list.push(UNTAGGED, token),
            }
        }

        list
    }

    /// 序列化为以空格分隔的字符串
    ///
    /// 多标签条目会拆成多条（`x:t1,t2` 输出为 `x:t1 x:t2`）。
    pub fn marshal(&self) -> String {
        let mut tags: Vec<&String> = self.groups.keys().collect();
        tags.sort();

        let mut tokens = Vec::new();
        for tag in tags {
            if is_private_tag(tag) {
                continue;
            }
            for item in &self.groups[tag] {
                if tag.is_empty() {
                    tokens.push(item.clone());
                } else {
                    tokens.push(format!("{}:{}", item, tag));
                }
            }
        }

        tokens.join(" ")
    }

    /// 向指定标签追加条目，私有标签会被忽略
    pub fn push(&mut self, tag: &str, item: &str) {
        if is_private_tag(tag) {
            return;
        }
        self.groups
            .entry(tag.to_string())
            .or_default()
            .push(item.to_string());
    }

    /// 获取指定标签下的条目
    pub fn get(&self, tag: &str) -> Option<&[String]> {
        self.groups.get(tag).map(Vec::as_slice)
    }

    /// 可见标签（已排序）
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .groups
            .keys()
            .map(String::as_str)
            .filter(|t| !is_private_tag(t))
            .collect();
        tags.sort_unstable();
        tags
    }

    /// 按标签顺序列出所有可见条目，重复条目只保留第一次
    pub fn all_items(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut items = Vec::new();
        for tag in self.tags() {
            for item in &self.groups[tag] {
                if seen.insert(item.as_str()) {
                    items.push(item.as_str());
                }
            }
        }
        items
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl From<HashMap<String, Vec<String>>> for TaggedList {
    fn from(groups: HashMap<String, Vec<String>>) -> Self {
        Self { groups }
    }
}

impl FromStr for TaggedList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::unmarshal(s))
    }
}

impl fmt::Display for TaggedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.marshal())
    }
}

#[cfg(test)]
#[path = "tagged_list_test.rs"]
mod tests;
