// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::{
    models::PortInfo,
    repositories::port_store::{PersistenceError, PortStore},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// 按页读取存储中的全部 port
///
/// 每页调用一次 `list_ports`，遇到空页或错误即停止并关闭输出通道。
/// 读取错误通过任务句柄返回，接收端只会看到提前关闭的通道。
pub struct PortPager<P> {
    store: Arc<P>,
    page_size: usize,
}

impl<P> PortPager<P>
where
    P: PortStore + 'static,
{
    /// # 参数
    ///
    /// * `store` - port 存储
    /// * `page_size` - 每页条数，为 0 时按 1 处理
    pub fn new(store: Arc<P>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    /// 启动后台分页任务
    ///
    /// # 返回值
    ///
    /// 返回 port 接收端和任务句柄，句柄结果为已读取的 port 数或第一个读取错误
    pub fn spawn(
        self,
    ) -> (
        mpsc::Receiver<PortInfo>,
        JoinHandle<Result<usize, PersistenceError>>,
    ) {
        let (tx, rx) = mpsc::channel(self.page_size);

        let handle = tokio::spawn(async move {
            let mut offset = 0usize;
            loop {
                let page = match self.store.list_ports(self.page_size, offset).await {
                    Ok(page) => page,
                    Err(e) => {
                        error!("Failed to list ports at offset {}: {}", offset, e);
                        return Err(e);
                    }
                };
                if page.is_empty() {
                    break;
                }

                debug!("Paging {} ports from offset {}", page.len(), offset);
                offset += page.len();
                for info in page {
                    if tx.send(info).await.is_err() {
                        debug!("Port receiver dropped");
                        return Ok(offset);
                    }
                }
            }
            Ok(offset)
        });

        (rx, handle)
    }
}
