//! # Exam Composer
//!
//! 一个用于组卷编辑与提交的 Rust 库
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 领域模型层（Models）
//! - `models/` - 试卷聚合：章节、题目（四种题型）、选项集合
//! - `models/loaders/` - TOML 草稿加载
//! - 不变式：同级 position 恒为连续的 1..=len
//!
//! ### ② 编辑层（Editor）
//! - `editor/` - 全卷唯一的题目编辑器
//! - `QuestionDraft` - 隔离的编辑缓冲，提交前不触碰聚合
//! - `ActiveEditorController` - 打开/切换/提交/取消 状态机
//!
//! ### ③ 持久化层（Persistence）
//! - `persistence/` - 两种互换的持久化策略
//! - `BatchAdapter` - 整卷起草、终点一次性提交
//! - `IncrementalAdapter` - 逐项同步、临时 id 换服务端 id
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - `EditorSession` 统一编排编辑与同步
//! - 乐观变更的回滚规则集中在这里执行
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod persistence;
pub mod reorder;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::exam_client::HttpExamClient;
pub use clients::ExamApi;
pub use config::Config;
pub use editor::{ActiveEditorController, QuestionDraft};
pub use error::{AppError, AppResult, ValidationError};
pub use models::composition::Composition;
pub use models::question::{Question, QuestionKind, VariantKind};
pub use models::section::Section;
pub use persistence::{BatchAdapter, IncrementalAdapter, PersistenceAdapter};
pub use reorder::{DragResult, Positioned};
pub use workflow::EditorSession;
