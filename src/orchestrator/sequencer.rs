//! 步骤规划 - 编排层
//!
//! 把 N 个单元展开成线性的步骤序列：
//! 每个单元一个词汇步骤和一个语法步骤，每两个单元之后一次小复习，最后一次总复习。

use std::fmt;
use std::ops::Range;

use crate::models::content::{ContentKind, GenerationRequest};
use crate::models::subject::SubjectRecord;
use crate::services::prompt_builder::PromptBuilder;

/// 规划中的一个步骤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    pub kind: ContentKind,
    /// 步骤序号（从 1 开始）
    pub sequence_index: usize,
    /// 单元类步骤的单元编号
    pub unit_number: Option<usize>,
    /// 小复习编号
    pub review_number: Option<usize>,
    /// 复习覆盖范围，如 "Units 1–2"
    pub unit_range: Option<String>,
    /// 本步骤使用的科目（下标区间）
    pub subjects: Range<usize>,
}

impl StepPlan {
    /// 步骤标签，如 "Mini Review 1 (Units 1–2)"
    pub fn label(&self) -> String {
        match self.kind {
            ContentKind::Vocabulary | ContentKind::Grammar => {
                format!("{} {}", self.kind, self.unit_number.unwrap_or_default())
            }
            ContentKind::MiniReview => format!(
                "{} {} ({})",
                self.kind,
                self.review_number.unwrap_or_default(),
                self.unit_range.as_deref().unwrap_or_default()
            ),
            ContentKind::FinalReview => format!(
                "{} ({})",
                self.kind,
                self.unit_range.as_deref().unwrap_or_default()
            ),
        }
    }

    /// 为本步骤构建生成请求
    pub fn request(&self, builder: &PromptBuilder, subjects: &[SubjectRecord]) -> GenerationRequest {
        let units = &subjects[self.subjects.clone()];
        let unit_number = self.unit_number.unwrap_or_default();
        let unit_range = self.unit_range.as_deref().unwrap_or_default();
        match self.kind {
            ContentKind::Vocabulary => builder.vocabulary(self.sequence_index, unit_number, &units[0]),
            ContentKind::Grammar => builder.grammar(self.sequence_index, unit_number, &units[0]),
            ContentKind::MiniReview => builder.mini_review(
                self.sequence_index,
                self.review_number.unwrap_or_default(),
                unit_range,
                units,
            ),
            ContentKind::FinalReview => builder.final_review(self.sequence_index, unit_range, units),
        }
    }
}

impl fmt::Display for StepPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: generating...", self.label())
    }
}

/// 规划循环中显式传递的计数器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceState {
    pub unit_number: usize,
    pub review_number: usize,
    pub sequence_index: usize,
}

impl Default for SequenceState {
    fn default() -> Self {
        Self {
            unit_number: 1,
            review_number: 1,
            sequence_index: 1,
        }
    }
}

/// 单元范围的显示文本（en dash）
pub fn unit_range(first: usize, last: usize) -> String {
    format!("Units {}–{}", first, last)
}

/// 步骤总数：2N + ⌊N/2⌋ + 1
pub fn total_steps(units: usize) -> usize {
    units * 2 + units / 2 + 1
}

/// 处理一个单元，返回新增的步骤和推进后的状态
fn plan_unit(state: SequenceState, position: usize) -> (Vec<StepPlan>, SequenceState) {
    let SequenceState {
        unit_number,
        review_number,
        sequence_index,
    } = state;
    let unit_step = |kind, sequence_index| StepPlan {
        kind,
        sequence_index,
        unit_number: Some(unit_number),
        review_number: None,
        unit_range: None,
        subjects: position - 1..position,
    };

    let mut steps = vec![
        unit_step(ContentKind::Vocabulary, sequence_index),
        unit_step(ContentKind::Grammar, sequence_index + 1),
    ];
    let mut next = SequenceState {
        unit_number: unit_number + 1,
        review_number,
        sequence_index: sequence_index + 2,
    };

    if position % 2 == 0 {
        steps.push(StepPlan {
            kind: ContentKind::MiniReview,
            sequence_index: next.sequence_index,
            unit_number: None,
            review_number: Some(review_number),
            unit_range: Some(unit_range(position - 1, position)),
            subjects: position - 2..position,
        });
        next.review_number += 1;
        next.sequence_index += 1;
    }

    (steps, next)
}

/// 规划整本书的步骤
pub fn plan_book(units: usize) -> Vec<StepPlan> {
    let mut steps = Vec::with_capacity(total_steps(units));
    let mut state = SequenceState::default();

    for position in 1..=units {
        let (unit_steps, next) = plan_unit(state, position);
        steps.extend(unit_steps);
        state = next;
    }

    steps.push(StepPlan {
        kind: ContentKind::FinalReview,
        sequence_index: state.sequence_index,
        unit_number: None,
        review_number: None,
        unit_range: Some(unit_range(1, units)),
        subjects: 0..units,
    });
    steps
}
