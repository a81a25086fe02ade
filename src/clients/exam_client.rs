/// 试卷 API 客户端
///
/// 封装所有与试卷 API 相关的调用逻辑
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::{CreatedQuestion, ExamApi, ExamMeta, ExamPatch};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::persistence::projection::{ApiExamData, ApiQuestionData, ApiSectionData};

/// 统一响应信封，`code == 200` 表示成功
///
/// `message`/`data` 缺失时按 `None` 处理，载荷类型不要求 `Default`
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: u64,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct IdData {
    id: String,
}

/// 基于 reqwest 的试卷 API 客户端
#[derive(Debug, Clone)]
pub struct HttpExamClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpExamClient {
    /// 创建新的试卷客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("client/build", e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    /// POST 请求并解析信封
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> AppResult<Option<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);

        debug!("POST {}", endpoint);

        let response = self
            .client
            .post(&url)
            .header("examtoken", &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        if envelope.code != 200 {
            return Err(AppError::bad_response(
                endpoint,
                Some(envelope.code),
                envelope.message,
            ));
        }

        Ok(envelope.data)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> AppResult<Option<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);

        debug!("GET {}", endpoint);

        let response = self
            .client
            .get(&url)
            .header("examtoken", &self.token)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        if envelope.code != 200 {
            return Err(AppError::bad_response(
                endpoint,
                Some(envelope.code),
                envelope.message,
            ));
        }

        Ok(envelope.data)
    }

    /// 有数据则返回，否则按空结果报错
    fn require_data<T>(endpoint: &str, data: Option<T>) -> AppResult<T> {
        data.ok_or_else(|| AppError::empty_response(endpoint))
    }
}

impl ExamApi for HttpExamClient {
    async fn create_exam(&self, data: &ApiExamData) -> AppResult<String> {
        let endpoint = "exam/new/save";
        let result: Option<IdData> = self.post_json(endpoint, data).await?;

        Ok(Self::require_data(endpoint, result)?.id)
    }

    async fn get_exam(&self, exam_id: &str) -> AppResult<ExamMeta> {
        let endpoint = format!("exam/{}", exam_id);
        let result: Option<ExamMeta> = self.get_json(&endpoint).await?;

        Self::require_data(&endpoint, result)
    }

    async fn update_exam(&self, exam_id: &str, patch: &ExamPatch) -> AppResult<()> {
        let endpoint = format!("exam/{}/update", exam_id);
        let _: Option<serde_json::Value> = self.post_json(&endpoint, patch).await?;

        Ok(())
    }

    async fn add_exam_section(&self, exam_id: &str, data: &ApiSectionData) -> AppResult<String> {
        let endpoint = format!("exam/{}/section/add", exam_id);
        let result: Option<IdData> = self.post_json(&endpoint, data).await?;

        Ok(Self::require_data(&endpoint, result)?.id)
    }

    async fn update_exam_section(&self, section_id: &str, data: &ApiSectionData) -> AppResult<()> {
        let endpoint = format!("section/{}/update", section_id);
        let _: Option<serde_json::Value> = self.post_json(&endpoint, data).await?;

        Ok(())
    }

    async fn delete_exam_section(&self, section_id: &str) -> AppResult<()> {
        let endpoint = format!("section/{}/delete", section_id);
        let _: Option<serde_json::Value> =
            self.post_json(&endpoint, &serde_json::json!({})).await?;

        Ok(())
    }

    async fn add_exam_question(
        &self,
        section_id: &str,
        data: &ApiQuestionData,
    ) -> AppResult<CreatedQuestion> {
        let endpoint = format!("section/{}/question/add", section_id);
        let result: Option<CreatedQuestion> = self.post_json(&endpoint, data).await?;

        Self::require_data(&endpoint, result)
    }

    async fn update_exam_question(
        &self,
        question_id: &str,
        data: &ApiQuestionData,
    ) -> AppResult<()> {
        let endpoint = format!("question/{}/update", question_id);
        let _: Option<serde_json::Value> = self.post_json(&endpoint, data).await?;

        Ok(())
    }

    async fn delete_exam_question(&self, question_id: &str) -> AppResult<()> {
        let endpoint = format!("question/{}/delete", question_id);
        let _: Option<serde_json::Value> =
            self.post_json(&endpoint, &serde_json::json!({})).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_with_missing_fields() {
        // 载荷类型（如 ExamMeta）没有 Default 实现，缺失字段照样解析
        let envelope: ApiEnvelope<ExamMeta> = serde_json::from_str(r#"{"code":200}"#).unwrap();
        assert_eq!(envelope.code, 200);
        assert!(envelope.message.is_none());
        assert!(envelope.data.is_none());

        let envelope: ApiEnvelope<IdData> =
            serde_json::from_str(r#"{"code":500,"message":"服务器内部错误"}"#).unwrap();
        assert_eq!(envelope.code, 500);
        assert_eq!(envelope.message.as_deref(), Some("服务器内部错误"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_envelope_parses_id_payload() {
        let envelope: ApiEnvelope<IdData> =
            serde_json::from_str(r#"{"code":200,"data":{"id":"srv-12"}}"#).unwrap();

        assert_eq!(envelope.data.unwrap().id, "srv-12");
    }
}
