//! 组卷编辑会话 - 流程层
//!
//! 界面消费的统一入口：持有试卷聚合、全卷唯一的编辑器控制器
//! 和一个持久化适配器。乐观变更的回滚规则在这里统一执行——
//! 创建/更新失败回滚本地状态，删除失败只上报不复活（下次刷新
//! 以远端为准），两种持久化策略因此看到完全一致的不变式。

use tracing::warn;

use crate::editor::controller::ActiveEditorController;
use crate::editor::draft::QuestionDraft;
use crate::error::{AppError, AppResult, EditError};
use crate::models::composition::Composition;
use crate::models::question::{Question, VariantKind};
use crate::persistence::PersistenceAdapter;
use crate::reorder::{renumber, DragResult};

/// 一次组卷编辑会话
pub struct EditorSession<P: PersistenceAdapter> {
    composition: Composition,
    controller: ActiveEditorController,
    adapter: P,
    /// 提交在途标志（按钮禁用即互斥）
    submitting: bool,
}

impl<P: PersistenceAdapter> EditorSession<P> {
    /// 从空试卷开始（整卷起草模式）
    pub fn new(adapter: P) -> Self {
        Self::with_composition(adapter, Composition::new())
    }

    /// 从既有试卷开始（编辑模式）
    pub fn with_composition(adapter: P, composition: Composition) -> Self {
        Self {
            composition,
            controller: ActiveEditorController::new(),
            adapter,
            submitting: false,
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn controller(&self) -> &ActiveEditorController {
        &self.controller
    }

    /// 当前打开的题目草稿
    pub fn draft_mut(&mut self) -> Option<&mut QuestionDraft> {
        self.controller.draft_mut()
    }

    // ========== 章节操作 ==========

    /// 新增章节，返回其 id（逐项同步模式下已是服务端 id）
    pub async fn add_section(&mut self) -> AppResult<String> {
        let local_id = self.composition.add_section();

        match self
            .adapter
            .section_added(&mut self.composition, &local_id)
            .await
        {
            Ok(Some(change)) => {
                self.controller
                    .redirect_section_id(&change.local_id, &change.server_id);
                Ok(change.server_id)
            }
            Ok(None) => Ok(local_id),
            Err(e) => {
                // 创建失败回滚乐观插入
                self.composition.remove_section(&local_id);
                warn!("⚠️ 新增章节同步失败: {}", e);
                Err(e)
            }
        }
    }

    /// 修改章节标题与内容
    pub async fn update_section_content(
        &mut self,
        section_id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> AppResult<()> {
        let Some(section) = self.composition.section_mut(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };

        let previous_title = std::mem::replace(&mut section.title, title.into());
        let previous_content = std::mem::replace(&mut section.content, content.into());

        if let Err(e) = self
            .adapter
            .section_updated(&self.composition, section_id)
            .await
        {
            // 更新失败回滚
            if let Some(section) = self.composition.section_mut(section_id) {
                section.title = previous_title;
                section.content = previous_content;
            }
            warn!("⚠️ 章节更新同步失败: {}", e);
            return Err(e);
        }

        Ok(())
    }

    /// 展开/折叠章节（纯界面状态）
    pub fn toggle_section_expanded(&mut self, section_id: &str) {
        if let Some(section) = self.composition.section_mut(section_id) {
            section.is_expanded = !section.is_expanded;
        }
    }

    /// 删除章节
    ///
    /// 删除是乐观的：本地立即移除，远端失败只上报、不复活
    pub async fn delete_section(&mut self, section_id: &str) -> AppResult<()> {
        let editor_in_section = self.controller.open_section() == Some(section_id);
        if editor_in_section {
            self.controller.cancel();
        }

        let Some(removed) = self.composition.remove_section(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };

        if let Err(e) = self.adapter.section_removed(&removed).await {
            warn!("⚠️ 远端删除章节失败（本地不恢复）: {}", e);
            return Err(e);
        }

        Ok(())
    }

    /// 拖拽章节
    pub async fn drag_section(&mut self, drag: DragResult) -> AppResult<()> {
        let previous: Vec<String> = self
            .composition
            .sections
            .iter()
            .map(|section| section.id.clone())
            .collect();

        let moved = self.composition.reorder_sections(&drag)?;
        if !moved {
            return Ok(());
        }

        if let Err(e) = self.adapter.section_order_changed(&self.composition).await {
            // 顺序同步失败回滚到原顺序
            self.composition
                .sections
                .sort_by_key(|section| index_of(&previous, &section.id));
            renumber(&mut self.composition.sections);
            warn!("⚠️ 章节顺序同步失败: {}", e);
            return Err(e);
        }

        Ok(())
    }

    /// 拖拽章节内的题目
    pub async fn drag_question(&mut self, section_id: &str, drag: DragResult) -> AppResult<()> {
        let Some(section) = self.composition.section_mut(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };

        let previous: Vec<String> = section
            .questions
            .iter()
            .map(|question| question.id.clone())
            .collect();

        let moved = section.reorder_questions(&drag)?;
        if !moved {
            return Ok(());
        }

        if let Err(e) = self
            .adapter
            .question_order_changed(&self.composition, section_id)
            .await
        {
            if let Some(section) = self.composition.section_mut(section_id) {
                section
                    .questions
                    .sort_by_key(|question| index_of(&previous, &question.id));
                renumber(&mut section.questions);
            }
            warn!("⚠️ 题目顺序同步失败: {}", e);
            return Err(e);
        }

        Ok(())
    }

    // ========== 题目编辑 ==========

    /// 在指定章节打开新题编辑器
    ///
    /// 另一处编辑器开着时先提交并同步；提交被校验拒绝则切换被
    /// 拒绝，原编辑器保持打开
    pub async fn open_new_question(
        &mut self,
        section_id: &str,
        variant: VariantKind,
    ) -> AppResult<()> {
        self.commit_and_sync().await?;
        self.controller
            .open_new(&mut self.composition, section_id, variant)
    }

    /// 打开已有题目的编辑器
    pub async fn open_question(&mut self, section_id: &str, question_id: &str) -> AppResult<()> {
        if self.controller.open_question_id() == Some(question_id) {
            return Ok(());
        }

        self.commit_and_sync().await?;
        self.controller
            .open_existing(&mut self.composition, section_id, question_id)
    }

    /// 修改当前草稿，编辑器没开时返回 false
    pub fn update_draft(&mut self, edit: impl FnOnce(&mut QuestionDraft)) -> bool {
        match self.controller.draft_mut() {
            Some(draft) => {
                edit(draft);
                true
            }
            None => false,
        }
    }

    /// 保存当前编辑器
    ///
    /// `Ok(None)` 是唯一的"草稿无效"信号（编辑器保持打开）；
    /// 远端同步失败回滚本地提交并返回错误
    pub async fn save(&mut self) -> AppResult<Option<Question>> {
        if !self.controller.is_open() {
            return Ok(None);
        }

        let draft_valid = self
            .controller
            .draft()
            .map(|draft| draft.is_valid())
            .unwrap_or(false);
        if !draft_valid {
            return Ok(None);
        }

        self.commit_and_sync().await
    }

    /// 取消当前编辑器，丢弃未提交的编辑
    pub fn cancel_editing(&mut self) {
        self.controller.cancel();
    }

    /// 删除题目（乐观删除，远端失败不复活）
    pub async fn delete_question(&mut self, section_id: &str, question_id: &str) -> AppResult<()> {
        if self.controller.open_question_id() == Some(question_id) {
            self.controller.cancel();
        }

        let Some(section) = self.composition.section_mut(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };
        let Some(removed) = section.remove_question(question_id) else {
            return Err(AppError::unknown_question(question_id));
        };

        if let Err(e) = self.adapter.question_removed(section_id, &removed).await {
            warn!("⚠️ 远端删除题目失败（本地不恢复）: {}", e);
            return Err(e);
        }

        Ok(())
    }

    // ========== 提交 ==========

    /// 终点提交
    ///
    /// 先提交开着的编辑器（失败即中止，错误与编辑器给出的相同），
    /// 再交给适配器做全卷校验与提交
    pub async fn submit(&mut self) -> AppResult<String> {
        if self.submitting {
            return Err(EditError::SubmitInProgress.into());
        }

        self.submitting = true;
        let result = self.submit_inner().await;
        self.submitting = false;

        result
    }

    async fn submit_inner(&mut self) -> AppResult<String> {
        self.commit_and_sync().await?;
        self.adapter.submit(&self.composition).await
    }

    /// 提交当前编辑器并通知适配器
    ///
    /// 编辑器关闭时无操作；草稿无效时返回校验错误（编辑器保持
    /// 打开）；远端失败时回滚控制器刚写入的本地提交，并把编辑器
    /// 连同草稿恢复为打开状态——用户输入的内容不随失败丢失
    async fn commit_and_sync(&mut self) -> AppResult<Option<Question>> {
        let Some(section_id) = self.controller.open_section().map(str::to_string) else {
            return Ok(None);
        };

        // 回滚快照：原位替换的旧题目 + 打开中的编辑器
        let previous = match self.controller.open_question_id() {
            Some(question_id) => self
                .composition
                .section(&section_id)
                .and_then(|section| section.question(question_id))
                .cloned(),
            None => None,
        };
        let editor_snapshot = self.controller.clone();

        let Some(committed) = self.controller.flush(&mut self.composition)? else {
            return Ok(None);
        };

        match self
            .adapter
            .question_committed(&mut self.composition, &section_id, &committed.id)
            .await
        {
            Ok(Some(change)) => {
                self.controller
                    .redirect_question_id(&change.local_id, &change.server_id);

                let reconciled = self
                    .composition
                    .section(&section_id)
                    .and_then(|section| section.question(&change.server_id))
                    .cloned();

                Ok(reconciled.or(Some(committed)))
            }
            Ok(None) => Ok(Some(committed)),
            Err(e) => {
                // 创建/更新失败回滚本地提交，编辑器带着草稿重新打开
                if let Some(section) = self.composition.section_mut(&section_id) {
                    match previous {
                        Some(previous) => {
                            section.replace_question(previous);
                        }
                        None => {
                            section.remove_question(&committed.id);
                        }
                    }
                }
                self.controller = editor_snapshot;
                warn!("⚠️ 题目同步失败: {}", e);
                Err(e)
            }
        }
    }
}

fn index_of(ids: &[String], id: &str) -> usize {
    ids.iter().position(|known| known == id).unwrap_or(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    use crate::models::is_local_id;
    use crate::models::option::OptionPatch;
    use crate::models::section::Section;
    use crate::persistence::IdChange;
    use crate::reorder::DragResult;

    /// 逐项同步行为的测试替身：本地分配服务端 id，可按开关注入失败
    #[derive(Default)]
    struct FakeSyncAdapter {
        fail_section_add: bool,
        fail_section_update: bool,
        fail_question_commit: bool,
        fail_order_sync: bool,
        fail_removals: bool,
        next_id: u32,
        removed_question_ids: Vec<String>,
    }

    impl FakeSyncAdapter {
        fn server_id(&mut self, prefix: &str) -> String {
            self.next_id += 1;
            format!("{}-{}", prefix, self.next_id)
        }

        fn failure(&self, endpoint: &str) -> AppError {
            AppError::bad_response(endpoint, Some(500), Some("模拟失败".to_string()))
        }
    }

    impl PersistenceAdapter for FakeSyncAdapter {
        async fn section_added(
            &mut self,
            composition: &mut Composition,
            section_id: &str,
        ) -> AppResult<Option<IdChange>> {
            if self.fail_section_add {
                return Err(self.failure("section/add"));
            }
            let server_id = self.server_id("srv-sec");
            composition.reconcile_section_id(section_id, &server_id);
            Ok(Some(IdChange {
                local_id: section_id.to_string(),
                server_id,
            }))
        }

        async fn section_updated(
            &mut self,
            _composition: &Composition,
            _section_id: &str,
        ) -> AppResult<()> {
            if self.fail_section_update {
                return Err(self.failure("section/update"));
            }
            Ok(())
        }

        async fn section_removed(&mut self, _removed: &Section) -> AppResult<()> {
            if self.fail_removals {
                return Err(self.failure("section/delete"));
            }
            Ok(())
        }

        async fn section_order_changed(&mut self, _composition: &Composition) -> AppResult<()> {
            if self.fail_order_sync {
                return Err(self.failure("exam/update"));
            }
            Ok(())
        }

        async fn question_committed(
            &mut self,
            composition: &mut Composition,
            section_id: &str,
            question_id: &str,
        ) -> AppResult<Option<IdChange>> {
            if self.fail_question_commit {
                return Err(self.failure("question/add"));
            }
            if is_local_id(question_id) {
                let server_id = self.server_id("srv-q");
                composition.reconcile_question_id(section_id, question_id, &server_id);
                return Ok(Some(IdChange {
                    local_id: question_id.to_string(),
                    server_id,
                }));
            }
            Ok(None)
        }

        async fn question_removed(
            &mut self,
            _section_id: &str,
            removed: &Question,
        ) -> AppResult<()> {
            if self.fail_removals {
                return Err(self.failure("question/delete"));
            }
            self.removed_question_ids.push(removed.id.clone());
            Ok(())
        }

        async fn question_order_changed(
            &mut self,
            _composition: &Composition,
            _section_id: &str,
        ) -> AppResult<()> {
            if self.fail_order_sync {
                return Err(self.failure("exam/update"));
            }
            Ok(())
        }

        async fn submit(&mut self, composition: &Composition) -> AppResult<String> {
            composition.validate().map_err(AppError::Validation)?;
            Ok("exam-1".to_string())
        }
    }

    fn session() -> EditorSession<FakeSyncAdapter> {
        EditorSession::new(FakeSyncAdapter::default())
    }

    async fn add_valid_question(
        session: &mut EditorSession<FakeSyncAdapter>,
        section_id: &str,
        title: &str,
    ) -> Question {
        session
            .open_new_question(section_id, VariantKind::FreeText)
            .await
            .unwrap();
        session.update_draft(|draft| draft.set_title(title));
        session.save().await.unwrap().unwrap()
    }

    #[test]
    fn test_add_section_reconciles_server_id() {
        block_on(async {
            let mut session = session();
            let id = session.add_section().await.unwrap();

            assert_eq!(id, "srv-sec-1");
            assert!(!is_local_id(&id));
            assert_eq!(session.composition().sections[0].id, id);
        });
    }

    #[test]
    fn test_add_section_rolls_back_on_failure() {
        block_on(async {
            let mut session = EditorSession::new(FakeSyncAdapter {
                fail_section_add: true,
                ..FakeSyncAdapter::default()
            });

            assert!(session.add_section().await.is_err());
            assert!(session.composition().sections.is_empty());
        });
    }

    #[test]
    fn test_update_section_rolls_back_on_failure() {
        block_on(async {
            let mut session = session();
            let id = session.add_section().await.unwrap();
            session
                .update_section_content(&id, "原标题", "<p>原内容</p>")
                .await
                .unwrap();

            session.adapter.fail_section_update = true;
            let result = session
                .update_section_content(&id, "新标题", "<p>新内容</p>")
                .await;

            assert!(result.is_err());
            let section = session.composition().section(&id).unwrap();
            assert_eq!(section.title, "原标题");
            assert_eq!(section.content, "<p>原内容</p>");
        });
    }

    #[test]
    fn test_delete_section_is_not_resurrected_on_failure() {
        block_on(async {
            let mut session = session();
            let id = session.add_section().await.unwrap();

            session.adapter.fail_removals = true;
            assert!(session.delete_section(&id).await.is_err());

            // 乐观删除：远端失败本地也不复活
            assert!(session.composition().sections.is_empty());
        });
    }

    #[test]
    fn test_save_reconciles_question_id_and_rolls_back_on_failure() {
        block_on(async {
            let mut session = session();
            let section_id = session.add_section().await.unwrap();

            let saved = add_valid_question(&mut session, &section_id, "第一题").await;
            assert_eq!(saved.id, "srv-q-2");

            // 同步失败时回滚乐观写入
            session.adapter.fail_question_commit = true;
            session
                .open_new_question(&section_id, VariantKind::FreeText)
                .await
                .unwrap();
            session.update_draft(|draft| draft.set_title("第二题"));

            assert!(session.save().await.is_err());
            let section = session.composition().section(&section_id).unwrap();
            assert_eq!(section.questions.len(), 1);
            assert_eq!(section.questions[0].position, 1);
        });
    }

    #[test]
    fn test_failed_sync_keeps_editor_open_with_draft() {
        block_on(async {
            let mut session = session();
            let section_id = session.add_section().await.unwrap();

            session.adapter.fail_question_commit = true;
            session
                .open_new_question(&section_id, VariantKind::FreeText)
                .await
                .unwrap();
            session.update_draft(|draft| draft.set_title("不能丢的草稿"));

            assert!(session.save().await.is_err());

            // 回滚后编辑器带着草稿保持打开，用户输入不丢失
            assert!(session.controller().is_open());
            assert_eq!(
                session.controller().draft().unwrap().question().title,
                "不能丢的草稿"
            );
            assert!(session.composition().sections[0].questions.is_empty());

            // 远端恢复后重试成功
            session.adapter.fail_question_commit = false;
            let saved = session.save().await.unwrap().unwrap();
            assert_eq!(saved.title, "不能丢的草稿");
            assert!(!session.controller().is_open());
            assert_eq!(session.composition().sections[0].questions.len(), 1);
        });
    }

    #[test]
    fn test_save_with_invalid_draft_returns_none_and_keeps_editor_open() {
        block_on(async {
            let mut session = session();
            let section_id = session.add_section().await.unwrap();

            session
                .open_new_question(&section_id, VariantKind::SingleOrMultiChoice)
                .await
                .unwrap();
            // 空题干 → 无效

            assert_eq!(session.save().await.unwrap(), None);
            assert!(session.controller().is_open());
            assert!(session.composition().sections[0].questions.is_empty());
        });
    }

    #[test]
    fn test_switch_question_refused_while_current_invalid() {
        block_on(async {
            let mut session = session();
            let section_id = session.add_section().await.unwrap();
            let existing = add_valid_question(&mut session, &section_id, "已有题").await;

            session
                .open_new_question(&section_id, VariantKind::SingleOrMultiChoice)
                .await
                .unwrap();

            let err = session
                .open_question(&section_id, &existing.id)
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::Validation(_)));
            assert!(session.controller().open_question_id().is_none());
            assert!(session.controller().is_open());
        });
    }

    #[test]
    fn test_drag_section_rolls_back_order_on_failure() {
        block_on(async {
            let mut session = session();
            let first = session.add_section().await.unwrap();
            let second = session.add_section().await.unwrap();

            session.adapter.fail_order_sync = true;
            let result = session.drag_section(DragResult::new(0, Some(1))).await;

            assert!(result.is_err());
            let ids: Vec<&str> = session
                .composition()
                .sections
                .iter()
                .map(|section| section.id.as_str())
                .collect();
            assert_eq!(ids, vec![first.as_str(), second.as_str()]);
            assert_eq!(session.composition().sections[0].position, 1);
            assert_eq!(session.composition().sections[1].position, 2);
        });
    }

    #[test]
    fn test_delete_question_cancels_its_editor() {
        block_on(async {
            let mut session = session();
            let section_id = session.add_section().await.unwrap();
            let question = add_valid_question(&mut session, &section_id, "待删除").await;

            session
                .open_question(&section_id, &question.id)
                .await
                .unwrap();
            session.delete_question(&section_id, &question.id).await.unwrap();

            assert!(!session.controller().is_open());
            assert_eq!(session.adapter.removed_question_ids, vec![question.id]);
        });
    }

    #[test]
    fn test_submit_aborts_on_open_invalid_editor() {
        block_on(async {
            let mut session = session();
            let section_id = session.add_section().await.unwrap();
            session
                .update_section_content(&section_id, "", "<p>材料</p>")
                .await
                .unwrap();
            add_valid_question(&mut session, &section_id, "有效题").await;

            // 无效编辑器开着 → 提交被编辑器校验错误拦下
            session
                .open_new_question(&section_id, VariantKind::Ranking)
                .await
                .unwrap();

            let err = session.submit().await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert!(session.controller().is_open());

            // 补全草稿后提交通过
            session.update_draft(|draft| {
                draft.set_title("排序题");
                for text in ["甲", "乙"] {
                    draft.add_option();
                    let id = draft.last_option_id().unwrap();
                    draft.update_option(&id, &OptionPatch::text(text));
                }
            });
            assert_eq!(session.submit().await.unwrap(), "exam-1");
        });
    }
}
