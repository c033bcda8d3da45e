// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::TestTree;
use async_trait::async_trait;
use portscout::application::pager::PortPager;
use portscout::application::use_cases::check_updates::CheckUpdatesUseCase;
use portscout::application::use_cases::sync_ports::SyncPortsUseCase;
use portscout::domain::models::PortName;
use portscout::domain::repositories::port_store::PortStore;
use portscout::engines::router::HandlerRegistry;
use portscout::engines::traits::{CrawlError, SiteHandler};
use portscout::infrastructure::build_tool::BuildTool;
use portscout::infrastructure::git::GixTreeStore;
use portscout::infrastructure::storage::FilePortStore;
use portscout::utils::crawl_limiter::CrawlLimiter;
use portscout::utils::errors::ExtractionError;
use portscout::workers::crawler::SiteCrawler;
use portscout::workers::extractor::{MetadataExtractor, QUERY_VARS};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;

/// 从 port 目录中的 `VERSION` 文件读取版本的构建工具
struct VersionFileTool;

#[async_trait]
impl BuildTool for VersionFileTool {
    async fn query(&self, port_dir: &Path, vars: &[&'static str]) -> Result<String, ExtractionError> {
        let version = std::fs::read_to_string(port_dir.join("VERSION")).map_err(|e| {
            ExtractionError::Exit {
                code: Some(1),
                stderr: e.to_string(),
            }
        })?;
        let version = version.trim();
        let name = port_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut lines = vec![String::new(); vars.len()];
        lines[0] = format!("{}-{}", name, version);
        lines[1] = version.to_string();
        lines[2] = format!("{}-{}.tar.gz", name, version);
        lines[3] = ".tar.gz".to_string();
        lines[4] = format!("ftp://mirror.example.org/pub/{}/", name);
        Ok(lines.join("\n") + "\n")
    }
}

/// 代替 FTP 的固定目录列表
struct MirrorHandler;

#[async_trait]
impl SiteHandler for MirrorHandler {
    fn scheme(&self) -> &'static str {
        "ftp"
    }

    async fn list_files(&self, site: &Url) -> Result<Vec<Url>, CrawlError> {
        let files: &[&str] = match site.path() {
            "/pub/mutt/" => &["mutt-2.2.tar.gz", "mutt-2.3.tar.gz"],
            "/pub/curl/" => &["curl-8.0.tar.gz"],
            _ => &[],
        };
        Ok(files.iter().map(|f| site.join(f).unwrap()).collect())
    }
}

fn extractor(ports_dir: &Path) -> Arc<MetadataExtractor> {
    Arc::new(MetadataExtractor::new(Arc::new(VersionFileTool), ports_dir, 2))
}

#[tokio::test]
async fn test_sync_then_check_round() {
    let Some(tree) = TestTree::init() else {
        return;
    };
    assert_eq!(QUERY_VARS.len(), 16);

    tree.write("Mk/bsd.port.mk", "# framework\n");
    tree.write("mail/mutt/VERSION", "2.2\n");
    tree.write("net/curl/VERSION", "8.0\n");
    tree.write("net/wget/VERSION", "1.21\n");
    let base = tree.commit("base");

    let state = TempDir::new().unwrap();
    let cancel = CancellationToken::new();

    // First run sees every port
    {
        let store = Arc::new(FilePortStore::open(state.path()).await.unwrap());
        let sync = SyncPortsUseCase::new(
            Arc::new(GixTreeStore::open(tree.path()).unwrap()),
            store.clone(),
            extractor(tree.path()),
            8,
        );
        let report = sync.run(&cancel).await.unwrap();

        assert_eq!((report.added, report.updated, report.failed), (3, 3, 0));
        assert!(report.bookmarked);
        store.flush_if_dirty().await.unwrap();
    }

    // Second run only touches what changed
    tree.write("net/curl/VERSION", "8.1\n");
    tree.remove("net/wget");
    let head = tree.commit("update");

    let store = Arc::new(FilePortStore::open(state.path()).await.unwrap());
    assert_eq!(store.get_last_commit().await.unwrap(), Some(base));

    let sync = SyncPortsUseCase::new(
        Arc::new(GixTreeStore::open(tree.path()).unwrap()),
        store.clone(),
        extractor(tree.path()),
        8,
    );
    let report = sync.run(&cancel).await.unwrap();

    assert_eq!((report.changed, report.removed, report.updated), (1, 1, 1));
    assert_eq!(store.get_last_commit().await.unwrap(), Some(head));
    assert!(store.get(&PortName::new("net", "wget")).is_none());
    assert_eq!(
        store.get(&PortName::new("net", "curl")).unwrap().info.dist_version,
        "8.1"
    );

    // Check the stored ports against the mirror
    let mut handlers = HandlerRegistry::with_defaults(Duration::from_secs(5));
    handlers.register(Arc::new(MirrorHandler));
    let crawler = Arc::new(SiteCrawler::new(
        handlers,
        Arc::new(CrawlLimiter::new(10, Duration::from_secs(1)).unwrap()),
        cancel.clone(),
    ));
    let check = CheckUpdatesUseCase::new(store.clone(), crawler, None, 8);

    let (ports, pager) = PortPager::new(store.clone(), 1).spawn();
    let report = check.run(ports, &cancel).await.unwrap();

    assert_eq!(pager.await.unwrap().unwrap(), 2);
    assert_eq!(report.checked, 2);
    assert_eq!(
        report.updates,
        vec![(PortName::new("mail", "mutt"), "2.3".to_string())]
    );

    // Recorded versions survive a reopen
    drop(store);
    let reopened = FilePortStore::open(state.path()).await.unwrap();
    assert_eq!(
        reopened
            .get(&PortName::new("mail", "mutt"))
            .unwrap()
            .new_version
            .as_deref(),
        Some("2.3")
    );
}
