//! 逐实体即时同步策略
//!
//! 在既有试卷上编辑时使用：每次章节/题目的增删改立即发远端
//! 调用，创建响应里的服务端 id 通过试卷的对账步骤原子替换
//! 本地临时 id。互不相关的章节顺序更新可以并发在途。

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::clients::ExamApi;
use crate::error::{AppError, AppResult};
use crate::models::composition::Composition;
use crate::models::question::Question;
use crate::models::section::Section;
use crate::models::is_local_id;
use crate::persistence::projection::{project_question, project_section};
use crate::persistence::{IdChange, PersistenceAdapter};

/// 逐实体即时同步的适配器
pub struct IncrementalAdapter<A: ExamApi> {
    api: A,
    exam_id: String,
}

impl<A: ExamApi> IncrementalAdapter<A> {
    /// 在既有试卷上编辑
    pub fn new(api: A, exam_id: impl Into<String>) -> Self {
        Self {
            api,
            exam_id: exam_id.into(),
        }
    }

    pub fn exam_id(&self) -> &str {
        &self.exam_id
    }
}

impl<A: ExamApi> PersistenceAdapter for IncrementalAdapter<A> {
    async fn section_added(
        &mut self,
        composition: &mut Composition,
        section_id: &str,
    ) -> AppResult<Option<IdChange>> {
        let Some(section) = composition.section(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };

        let payload = project_section(section);
        let server_id = self.api.add_exam_section(&self.exam_id, &payload).await?;

        // 原子对账：返回之前本地临时 id 已被替换
        composition.reconcile_section_id(section_id, &server_id);

        debug!("✓ 章节已同步: {} -> {}", section_id, server_id);

        Ok(Some(IdChange {
            local_id: section_id.to_string(),
            server_id,
        }))
    }

    async fn section_updated(
        &mut self,
        composition: &Composition,
        section_id: &str,
    ) -> AppResult<()> {
        let Some(section) = composition.section(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };

        self.api
            .update_exam_section(section_id, &project_section(section))
            .await
    }

    async fn section_removed(&mut self, removed: &Section) -> AppResult<()> {
        // 尚未持久化的章节远端无操作
        if removed.is_new_local {
            return Ok(());
        }

        self.api.delete_exam_section(&removed.id).await
    }

    async fn section_order_changed(&mut self, composition: &Composition) -> AppResult<()> {
        // 各章节互不共享可变状态，顺序更新并发在途
        let api = &self.api;
        let updates = composition
            .sections
            .iter()
            .filter(|section| !section.is_new_local)
            .map(|section| {
                let payload = project_section(section);
                async move { api.update_exam_section(&section.id, &payload).await }
            });

        try_join_all(updates).await?;

        Ok(())
    }

    async fn question_committed(
        &mut self,
        composition: &mut Composition,
        section_id: &str,
        question_id: &str,
    ) -> AppResult<Option<IdChange>> {
        let Some(section) = composition.section(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };
        let Some(question) = section.question(question_id) else {
            return Err(AppError::unknown_question(question_id));
        };

        let payload = project_question(question);

        if is_local_id(question_id) {
            let created = self.api.add_exam_question(section_id, &payload).await?;

            composition.reconcile_question_id(section_id, question_id, &created.id);
            // 服务端顺序为权威值
            if let Some(question) = composition
                .section_mut(section_id)
                .and_then(|section| section.question_mut(&created.id))
            {
                question.position = created.order;
            }

            debug!("✓ 题目已创建: {} -> {}", question_id, created.id);

            Ok(Some(IdChange {
                local_id: question_id.to_string(),
                server_id: created.id,
            }))
        } else {
            self.api.update_exam_question(question_id, &payload).await?;

            debug!("✓ 题目已更新: {}", question_id);

            Ok(None)
        }
    }

    async fn question_removed(&mut self, _section_id: &str, removed: &Question) -> AppResult<()> {
        // 尚未持久化的题目远端无操作
        if is_local_id(&removed.id) {
            return Ok(());
        }

        self.api.delete_exam_question(&removed.id).await
    }

    async fn question_order_changed(
        &mut self,
        composition: &Composition,
        section_id: &str,
    ) -> AppResult<()> {
        let Some(section) = composition.section(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };

        let api = &self.api;
        let updates = section
            .questions
            .iter()
            .filter(|question| !is_local_id(&question.id))
            .map(|question| {
                let payload = project_question(question);
                async move { api.update_exam_question(&question.id, &payload).await }
            });

        try_join_all(updates).await?;

        Ok(())
    }

    /// 逐实体模式没有终点远端调用：本地复验后返回既有试卷 id
    async fn submit(&mut self, composition: &Composition) -> AppResult<String> {
        composition.validate().map_err(AppError::Validation)?;

        info!("✓ 试卷 {} 校验通过，所有改动已逐项同步", self.exam_id);

        Ok(self.exam_id.clone())
    }
}
