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

use anyhow::Context;
use portscout::application::pager::PortPager;
use portscout::application::use_cases::check_updates::CheckUpdatesUseCase;
use portscout::application::use_cases::sync_ports::SyncPortsUseCase;
use portscout::config::settings::Settings;
use portscout::engines::router::HandlerRegistry;
use portscout::infrastructure::build_tool::MakeBuildTool;
use portscout::infrastructure::git::GixTreeStore;
use portscout::infrastructure::metrics;
use portscout::infrastructure::storage::FilePortStore;
use portscout::utils::crawl_limiter::CrawlLimiter;
use portscout::utils::telemetry;
use portscout::workers::crawler::SiteCrawler;
use portscout::workers::extractor::MetadataExtractor;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 主函数
///
/// 同步 ports 树到状态存储，然后检查所有 port 的新版本
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    metrics::describe_metrics();
    info!("Starting portscout...");

    // 2. Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded");

    // 3. Open the ports tree and the state store
    let tree = Arc::new(
        GixTreeStore::open(&settings.tree.ports_dir)
            .with_context(|| format!("Failed to open {}", settings.tree.ports_dir.display()))?,
    );
    let store = Arc::new(
        FilePortStore::open(&settings.storage.state_dir)
            .await
            .context("Failed to open state store")?,
    );
    info!("State loaded from {}", store.path().display());

    // 4. Ctrl-C stops submitting new work
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight work");
            signal_cancel.cancel();
        }
    });

    // 5. Stage one: bring stored metadata up to date with the tree
    let extractor = Arc::new(MetadataExtractor::new(
        Arc::new(MakeBuildTool::new(settings.tree.make_cmd.clone())),
        settings.tree.ports_dir.clone(),
        settings.tree.make_threads,
    ));
    let sync = SyncPortsUseCase::new(
        tree,
        store.clone(),
        extractor,
        settings.crawler.queue_capacity,
    );
    let report = sync.run(&cancel).await.context("Port sync failed")?;
    store.flush_if_dirty().await.context("Failed to save state")?;
    info!(
        "Synced to {}: {} updated, {} failed",
        report.head, report.updated, report.failed
    );

    if cancel.is_cancelled() {
        return Ok(());
    }

    // 6. Stage two: look for newer distfiles on the master sites
    let limiter = CrawlLimiter::new(settings.crawler.max_requests, settings.crawl_window())
        .context("Invalid crawler rate limit")?;
    let crawler = Arc::new(SiteCrawler::new(
        HandlerRegistry::with_defaults(settings.ftp_timeout()),
        Arc::new(limiter),
        cancel.clone(),
    ));
    let check = CheckUpdatesUseCase::new(
        store.clone(),
        crawler,
        settings.special_index(),
        settings.crawler.queue_capacity,
    );

    let (ports, pager) = PortPager::new(store.clone(), settings.crawler.queue_capacity).spawn();
    let report = check.run(ports, &cancel).await.context("Update check failed")?;
    let paged = pager
        .await
        .context("Pager task failed")?
        .context("Failed to read stored ports")?;
    info!("Paged {} stored ports", paged);
    store.flush_if_dirty().await.context("Failed to save state")?;

    info!(
        "Checked {} ports on {} sites, {} new versions",
        report.checked,
        report.sites,
        report.updates.len()
    );

    Ok(())
}
