use std::path::{Path, PathBuf};

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult, RenderError};
use crate::render::RenderEngine;

/// 无头 Chromium 渲染引擎（CDP `Page.printToPDF`）
pub struct ChromiumEngine {
    chrome_executable: Option<PathBuf>,
}

impl ChromiumEngine {
    /// `chrome_executable` 为空时由 chromiumoxide 自动查找
    pub fn new(chrome_executable: Option<&str>) -> Self {
        Self {
            chrome_executable: chrome_executable
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// 启动无头浏览器，并在后台处理浏览器事件
    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), RenderError> {
        info!("🚀 启动无头浏览器...");

        let mut builder = BrowserConfig::builder().new_headless_mode();
        if let Some(path) = &self.chrome_executable {
            debug!("浏览器路径: {}", path.display());
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .args(vec![
                "--no-sandbox",
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--allow-file-access-from-files",
            ])
            .build()
            .map_err(|e| {
                error!("配置无头浏览器失败: {}", e);
                RenderError::EngineLaunchFailed { message: e }
            })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            RenderError::EngineLaunchFailed {
                message: e.to_string(),
            }
        })?;
        debug!("无头浏览器启动成功");

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }
}

/// 绝对路径转为 `file://` URL（路径中的特殊字符会被转义）
fn file_url(path: &Path) -> Result<String, RenderError> {
    url::Url::from_file_path(path)
        .map(String::from)
        .map_err(|_| RenderError::EngineLaunchFailed {
            message: format!("无法转换为 file URL: {}", path.display()),
        })
}

impl RenderEngine for ChromiumEngine {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn render(&self, document: &Path) -> AppResult<Vec<u8>> {
        let display = document.display().to_string();
        let canonical = tokio::fs::canonicalize(document)
            .await
            .map_err(|e| AppError::file_read_failed(display.clone(), e))?;
        let url = file_url(&canonical)?;

        let (mut browser, handle) = self.launch().await?;

        let result = async {
            let page = browser
                .new_page(url.as_str())
                .await
                .map_err(|e| AppError::engine_failed(&display, e))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| AppError::engine_failed(&display, e))?;
            debug!("页面加载完成: {}", url);

            let params = PrintToPdfParams {
                print_background: Some(true),
                prefer_css_page_size: Some(true),
                ..Default::default()
            };
            page.pdf(params)
                .await
                .map_err(|e| AppError::engine_failed(&display, e))
        }
        .await;

        if let Err(e) = browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("等待浏览器退出失败: {}", e);
        }
        handle.abort();

        result
    }
}
