// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;

/// 注册指标说明
///
/// 未安装 recorder 时 `metrics` 门面不做任何事情。
pub fn describe_metrics() {
    describe_counter!(
        "portscout_extractions_total",
        "Number of metadata extractions, labelled by outcome"
    );
    describe_counter!(
        "portscout_crawls_total",
        "Number of site crawls, labelled by outcome"
    );
    describe_counter!(
        "portscout_rate_limit_waits_total",
        "Number of crawls that had to wait for a per-host rate limiter"
    );
}
