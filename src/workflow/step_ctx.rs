//! 步骤上下文
//!
//! 封装"我正在生成第几步、什么内容"这一信息

use std::fmt::Display;

use crate::models::content::ContentKind;

/// 步骤上下文
#[derive(Debug, Clone)]
pub struct StepCtx {
    /// 步骤序号（从1开始）
    pub step_index: usize,

    /// 步骤总数（只用于进度显示）
    pub total_steps: usize,

    pub kind: ContentKind,

    /// 显示标签，如 "Mini Review 1 (Units 1–2)"
    pub label: String,
}

impl StepCtx {
    pub fn new(
        step_index: usize,
        total_steps: usize,
        kind: ContentKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            step_index,
            total_steps,
            kind,
            label: label.into(),
        }
    }

    /// 完成到本步骤时的进度百分比（向下取整）
    pub fn percent(&self) -> usize {
        if self.total_steps == 0 {
            return 100;
        }
        self.step_index * 100 / self.total_steps
    }
}

impl Display for StepCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[步骤 #{}/{} {} | {}]",
            self.step_index, self.total_steps, self.kind, self.label
        )
    }
}
