//! 渲染层
//!
//! - `stream` - 绘图指令流与可选原语
//! - `compat` - 缺少原语时的兼容层
//! - `chromium` - 无头 Chromium 引擎
//!
//! [`Renderer`] 按指令流自身报告的能力绑定原语，然后把整本书交给引擎输出 PDF。

pub mod chromium;
pub mod compat;
pub mod stream;

use std::future::Future;
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult, RenderError};
use compat::CompatLayer;
use stream::{ContentStream, Matrix};

pub use chromium::ChromiumEngine;

/// 渲染引擎
pub trait RenderEngine {
    fn name(&self) -> &str;

    /// 把 HTML 文件渲染为 PDF 字节
    fn render(&self, document: &Path) -> impl Future<Output = AppResult<Vec<u8>>> + Send;
}

/// 渲染适配器
pub struct Renderer<E> {
    engine: E,
}

impl<E: RenderEngine> Renderer<E> {
    pub fn new(engine: E) -> Self {
        debug!("渲染引擎: {}", engine.name());
        Self { engine }
    }

    /// 按指令流的能力安装兼容层
    pub fn compat_for<S: ContentStream + ?Sized>(&self, stream: &S) -> CompatLayer {
        let mut compat = CompatLayer::new();
        let shims = compat.install(stream.capabilities());
        if !shims.is_empty() {
            debug!("指令流缺少原语，使用兼容实现: {:?}", shims);
        }
        compat
    }

    pub fn transform<S: ContentStream + ?Sized>(&self, stream: &mut S, m: Matrix) -> Result<(), RenderError> {
        self.compat_for(stream).transform(stream, m)
    }

    pub fn text_matrix<S: ContentStream + ?Sized>(&self, stream: &mut S, m: Matrix) -> Result<(), RenderError> {
        self.compat_for(stream).text_matrix(stream, m)
    }

    /// 渲染 HTML 文件并写出 PDF，返回写入的字节数
    pub async fn render_to_file(&self, document: &Path, output: &Path) -> AppResult<usize> {
        let bytes = self.engine.render(document).await?;
        tokio::fs::write(output, &bytes)
            .await
            .map_err(|e| AppError::file_write_failed(output.display().to_string(), e))?;
        Ok(bytes.len())
    }
}
