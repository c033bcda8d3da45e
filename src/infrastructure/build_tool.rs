// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ExtractionError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// 构建工具查询接口
///
/// 在 port 目录中查询一组变量的值，返回原始标准输出。
#[async_trait]
pub trait BuildTool: Send + Sync {
    /// 查询变量
    ///
    /// # 参数
    ///
    /// * `port_dir` - port 所在目录
    /// * `vars` - 按顺序请求的变量名
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 标准输出，每行对应一个变量
    /// * `Err(ExtractionError)` - 启动失败或非零退出
    async fn query(&self, port_dir: &Path, vars: &[&'static str]) -> Result<String, ExtractionError>;
}

/// 调用 `make -C <dir> -V VAR ...` 的构建工具
#[derive(Debug, Clone)]
pub struct MakeBuildTool {
    make_cmd: String,
}

impl MakeBuildTool {
    pub fn new(make_cmd: impl Into<String>) -> Self {
        Self {
            make_cmd: make_cmd.into(),
        }
    }
}

#[async_trait]
impl BuildTool for MakeBuildTool {
    async fn query(&self, port_dir: &Path, vars: &[&'static str]) -> Result<String, ExtractionError> {
        let mut command = Command::new(&self.make_cmd);
        command.arg("-C").arg(port_dir);
        for var in vars {
            command.arg("-V").arg(var);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {} -C {}", self.make_cmd, port_dir.display());

        let output = command.output().await.map_err(|source| ExtractionError::Spawn {
            command: self.make_cmd.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ExtractionError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
