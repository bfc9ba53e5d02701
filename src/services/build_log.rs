//! 构建日志服务 - 业务能力层
//!
//! 只负责"写构建日志"能力：开始时写入带时间戳的表头，每完成一个步骤追加一行。

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::content::ContentKind;

/// 构建日志
pub struct BuildLog {
    path: PathBuf,
}

impl BuildLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 创建（覆盖）日志文件并写入表头
    pub fn init(&self) -> AppResult<()> {
        let header = format!(
            "{}\n练习册构建日志 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.path, header).map_err(|e| self.write_failed(e))
    }

    /// 记录一个完成的步骤
    ///
    /// # 参数
    /// - `step`: 步骤序号和总数
    /// - `kind`: 内容类型
    /// - `label`: 步骤标签
    /// - `pages`: 本步骤产生的页数
    pub fn record(
        &self,
        step: (usize, usize),
        kind: ContentKind,
        label: &str,
        pages: usize,
    ) -> AppResult<()> {
        debug!("写入构建日志: 步骤 {}/{} {} | 页数: {}", step.0, step.1, label, pages);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_failed(e))?;

        let line = format!(
            "步骤 {}/{} | {} | {} | {} 页\n",
            step.0, step.1, kind, label, pages
        );
        file.write_all(line.as_bytes()).map_err(|e| self.write_failed(e))
    }

    fn write_failed(&self, source: std::io::Error) -> AppError {
        AppError::file_write_failed(self.path.display().to_string(), source)
    }
}
