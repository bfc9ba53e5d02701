//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责步骤规划和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `sequencer` - 步骤规划
//! - 把 N 个单元展开为 2N + ⌊N/2⌋ + 1 个步骤
//! - 计数器（单元编号、复习编号）作为显式状态传递
//!
//! ### `book_processor` - 整书处理器
//! - 管理应用生命周期（初始化、运行）
//! - 串行执行每个步骤，累加页面
//! - 写出 book.html 并渲染 PDF
//!
//! ## 层次关系
//!
//! ```text
//! book_processor (处理整本书)
//!     ↓
//! sequencer (Vec<StepPlan>)
//!     ↓
//! workflow::StepFlow (处理单个步骤)
//!     ↓
//! services (能力层：prompt / llm / normalize / template / assemble)
//!     ↓
//! render (渲染引擎 + 兼容层)
//! ```

pub mod book_processor;
pub mod sequencer;

// 重新导出主要类型
pub use book_processor::{App, BookBuilder};
pub use sequencer::{plan_book, total_steps, SequenceState, StepPlan};
