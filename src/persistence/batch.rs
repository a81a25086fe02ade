//! 整卷批量提交策略
//!
//! 全卷在本地起草，逐实体操作全部是本地无操作；只有终点的
//! `submit` 做一次全卷校验并调用 `createExam`。

use tracing::info;

use crate::clients::ExamApi;
use crate::error::{AppError, AppResult};
use crate::models::composition::Composition;
use crate::models::question::Question;
use crate::models::section::Section;
use crate::persistence::projection::project_composition;
use crate::persistence::{IdChange, PersistenceAdapter};

/// 本地起草、一次性提交的适配器
pub struct BatchAdapter<A: ExamApi> {
    api: A,
    exam_title: String,
}

impl<A: ExamApi> BatchAdapter<A> {
    pub fn new(api: A, exam_title: impl Into<String>) -> Self {
        Self {
            api,
            exam_title: exam_title.into(),
        }
    }
}

impl<A: ExamApi> PersistenceAdapter for BatchAdapter<A> {
    async fn section_added(
        &mut self,
        _composition: &mut Composition,
        _section_id: &str,
    ) -> AppResult<Option<IdChange>> {
        Ok(None)
    }

    async fn section_updated(
        &mut self,
        _composition: &Composition,
        _section_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn section_removed(&mut self, _removed: &Section) -> AppResult<()> {
        Ok(())
    }

    async fn section_order_changed(&mut self, _composition: &Composition) -> AppResult<()> {
        Ok(())
    }

    async fn question_committed(
        &mut self,
        _composition: &mut Composition,
        _section_id: &str,
        _question_id: &str,
    ) -> AppResult<Option<IdChange>> {
        Ok(None)
    }

    async fn question_removed(&mut self, _section_id: &str, _removed: &Question) -> AppResult<()> {
        Ok(())
    }

    async fn question_order_changed(
        &mut self,
        _composition: &Composition,
        _section_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    /// 全卷校验后整卷提交
    ///
    /// 校验失败即中止，绝不半卷提交
    async fn submit(&mut self, composition: &Composition) -> AppResult<String> {
        composition.validate().map_err(AppError::Validation)?;

        let data = project_composition(&self.exam_title, composition);
        let exam_id = self.api.create_exam(&data).await?;

        info!(
            "✓ 试卷《{}》提交成功: {} 个章节 / {} 道题, 远端 id: {}",
            self.exam_title,
            composition.sections.len(),
            composition.question_count(),
            exam_id
        );

        Ok(exam_id)
    }
}
