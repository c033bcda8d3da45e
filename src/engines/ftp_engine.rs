// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{CrawlError, SiteHandler};
use async_trait::async_trait;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use suppaftp::list::File;
use suppaftp::{FtpError, FtpStream};
use tracing::{debug, warn};
use url::{Host, Url};

const DEFAULT_FTP_PORT: u16 = 21;
const ANONYMOUS: &str = "anonymous";

/// FTP 站点处理器
///
/// 匿名登录后列出站点目录，只保留普通文件。
/// suppaftp 的同步客户端运行在阻塞线程池中。
#[derive(Debug, Clone)]
pub struct FtpHandler {
    /// 连接超时
    timeout: Duration,
}

impl FtpHandler {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SiteHandler for FtpHandler {
    fn scheme(&self) -> &'static str {
        "ftp"
    }

    async fn list_files(&self, site: &Url) -> Result<Vec<Url>, CrawlError> {
        let site = site.clone();
        let timeout = self.timeout;

        tokio::task::spawn_blocking(move || list_blocking(&site, timeout))
            .await
            .map_err(|e| CrawlError::TaskFailed(e.to_string()))?
    }
}

fn list_blocking(site: &Url, timeout: Duration) -> Result<Vec<Url>, CrawlError> {
    let (host, port) = dial_target(site)?;
    let addr = format!("{}:{}", host, port);

    let dial_error = |source: FtpError| CrawlError::Dial {
        addr: addr.clone(),
        source,
    };

    let candidates: Vec<SocketAddr> = (host.as_str(), port)
        .to_socket_addrs()
        .map_err(|e| dial_error(FtpError::ConnectionError(e)))?
        .collect();

    debug!("Connecting to {} ({} addresses)", addr, candidates.len());
    let mut ftp = connect_any(&candidates, timeout).map_err(dial_error)?;

    ftp.login(ANONYMOUS, ANONYMOUS)
        .map_err(|source| CrawlError::Login {
            host: host.clone(),
            source,
        })?;

    let path = site_path(site)?;
    ftp.cwd(&path).map_err(|source| CrawlError::ChangeDir {
        host: host.clone(),
        path: path.clone(),
        source,
    })?;

    let lines = ftp.list(None).map_err(|source| CrawlError::List {
        host: host.clone(),
        path: path.clone(),
        source,
    })?;

    if let Err(e) = ftp.quit() {
        debug!("Ignoring QUIT failure on {}: {}", host, e);
    }

    let mut files = Vec::new();
    for line in &lines {
        match File::try_from(line.as_str()) {
            Ok(entry) if entry.is_file() => files.push(file_url(site, entry.name())?),
            Ok(_) => {}
            Err(e) => warn!("Skipping unparsable listing line from {}: {:?} ({})", host, line, e),
        }
    }

    debug!("Listed {} files at {}", files.len(), site);
    Ok(files)
}

/// 站点 URL 的主机名与端口，未指定端口时使用 21
fn dial_target(site: &Url) -> Result<(String, u16), CrawlError> {
    // IPv6 literals resolve without their URL brackets
    let host = match site.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        _ => {
            return Err(CrawlError::InvalidSite {
                site: site.to_string(),
                reason: "missing host".to_string(),
            })
        }
    };
    let port = site.port().unwrap_or(DEFAULT_FTP_PORT);
    Ok((host, port))
}

/// 依次尝试每个解析出的地址，返回第一个成功的连接
///
/// 全部失败时返回最后一个错误。
fn connect_any(candidates: &[SocketAddr], timeout: Duration) -> Result<FtpStream, FtpError> {
    let mut last_error = FtpError::ConnectionError(io::Error::new(
        io::ErrorKind::NotFound,
        "no address resolved",
    ));

    for candidate in candidates {
        match FtpStream::connect_timeout(*candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connecting to {} failed: {}", candidate, e);
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// 站点 URL 对应的服务器目录，空路径视为根目录
fn site_path(site: &Url) -> Result<String, CrawlError> {
    let decoded = urlencoding::decode(site.path()).map_err(|e| CrawlError::InvalidSite {
        site: site.to_string(),
        reason: e.to_string(),
    })?;

    if decoded.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(decoded.into_owned())
    }
}

/// 把目录项名称拼接到站点 URL 之后
pub fn file_url(site: &Url, name: &str) -> Result<Url, CrawlError> {
    let mut url = site.clone();
    url.path_segments_mut()
        .map_err(|_| CrawlError::InvalidSite {
            site: site.to_string(),
            reason: "cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .push(name);
    Ok(url)
}

#[cfg(test)]
#[path = "ftp_engine_test.rs"]
mod tests;
