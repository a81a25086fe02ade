//! 远端试卷 API 协作方
//!
//! 编辑器核心只依赖 [`ExamApi`] 的操作契约；具体的请求/响应
//! 线格式、重试与超时都属于网络层，不在这里处理。

pub mod exam_client;

pub use exam_client::HttpExamClient;

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::persistence::projection::{ApiExamData, ApiQuestionData, ApiSectionData};

/// 题目创建响应（服务端 id 与顺序成为权威值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedQuestion {
    pub id: String,
    pub order: u32,
}

/// 整卷元信息（标题/时长等，不属于组卷树）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamMeta {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// 整卷元信息补丁
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// 远端试卷 API 操作契约
#[allow(async_fn_in_trait)]
pub trait ExamApi {
    /// 整卷创建（BatchAdapter 的终点调用），返回远端试卷 id
    async fn create_exam(&self, data: &ApiExamData) -> AppResult<String>;

    async fn get_exam(&self, exam_id: &str) -> AppResult<ExamMeta>;

    async fn update_exam(&self, exam_id: &str, patch: &ExamPatch) -> AppResult<()>;

    /// 新增章节，返回的 id 成为章节的权威 id
    async fn add_exam_section(&self, exam_id: &str, data: &ApiSectionData) -> AppResult<String>;

    async fn update_exam_section(&self, section_id: &str, data: &ApiSectionData) -> AppResult<()>;

    async fn delete_exam_section(&self, section_id: &str) -> AppResult<()>;

    /// 新增题目，返回的 id 与顺序成为权威值
    async fn add_exam_question(
        &self,
        section_id: &str,
        data: &ApiQuestionData,
    ) -> AppResult<CreatedQuestion>;

    async fn update_exam_question(&self, question_id: &str, data: &ApiQuestionData)
        -> AppResult<()>;

    async fn delete_exam_question(&self, question_id: &str) -> AppResult<()>;
}
