//! 题目编辑草稿
//!
//! 每种题型的编辑器都持有未归一化的临时状态（比如混合题同时
//! 拿着选项列表和说明占位符），这些状态在提交前只存在于草稿里，
//! 不会写回试卷。

use crate::error::AppResult;
use crate::models::option::OptionPatch;
use crate::models::question::{Question, QuestionKind, VariantKind};
use crate::reorder::DragResult;

/// 当前打开的编辑器持有的工作副本
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    question: Question,
}

impl QuestionDraft {
    /// 新题草稿（分配临时 id）
    pub(crate) fn new(variant: VariantKind) -> Self {
        Self {
            question: Question::new_local(variant),
        }
    }

    /// 已有题目的编辑草稿（工作副本，提交前不影响原题）
    pub(crate) fn from_existing(question: &Question) -> Self {
        Self {
            question: question.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.question.id
    }

    pub fn variant(&self) -> VariantKind {
        self.question.kind.variant()
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn is_valid(&self) -> bool {
        self.question.is_valid()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.question.title = title.into();
    }

    pub fn set_required(&mut self, required: bool) {
        self.question.required = required;
    }

    /// 设置分值，负数钳制为 0
    pub fn set_score(&mut self, score: f64) {
        self.question.score = score.max(0.0);
    }

    pub fn add_option(&mut self) {
        self.question.add_option();
    }

    pub fn update_option(&mut self, id: &str, patch: &OptionPatch) {
        self.question.update_option(id, patch);
    }

    pub fn delete_option(&mut self, id: &str) {
        self.question.delete_option(id);
    }

    pub fn reorder_options(&mut self, drag: &DragResult) -> AppResult<()> {
        self.question.reorder_options(drag)
    }

    /// 最后一个选项的 id（界面上"新增后立即聚焦"用）
    pub fn last_option_id(&self) -> Option<String> {
        self.question
            .kind
            .options()
            .and_then(|options| options.items().last())
            .map(|item| item.id.clone())
    }

    /// 单选/多选开关（仅选择类题型有效）
    pub fn set_allow_multiple(&mut self, allow: bool) {
        match &mut self.question.kind {
            QuestionKind::SingleOrMultiChoice { allow_multiple, .. }
            | QuestionKind::MixedChoiceAndText { allow_multiple, .. } => {
                *allow_multiple = allow;
            }
            QuestionKind::FreeText { .. } | QuestionKind::Ranking { .. } => {}
        }
    }

    /// 简答题字数上下限
    pub fn set_length_bounds(&mut self, min: Option<u32>, max: Option<u32>) {
        match &mut self.question.kind {
            QuestionKind::FreeText {
                min_length,
                max_length,
                ..
            } => {
                *min_length = min;
                *max_length = max;
            }
            QuestionKind::SingleOrMultiChoice { .. }
            | QuestionKind::MixedChoiceAndText { .. }
            | QuestionKind::Ranking { .. } => {}
        }
    }

    /// 简答题占位提示
    pub fn set_placeholder(&mut self, text: Option<String>) {
        match &mut self.question.kind {
            QuestionKind::FreeText { placeholder, .. } => {
                *placeholder = text;
            }
            QuestionKind::SingleOrMultiChoice { .. }
            | QuestionKind::MixedChoiceAndText { .. }
            | QuestionKind::Ranking { .. } => {}
        }
    }

    /// 混合题是否必填说明
    pub fn set_description_required(&mut self, required: bool) {
        match &mut self.question.kind {
            QuestionKind::MixedChoiceAndText {
                description_required,
                ..
            } => {
                *description_required = required;
            }
            QuestionKind::SingleOrMultiChoice { .. }
            | QuestionKind::FreeText { .. }
            | QuestionKind::Ranking { .. } => {}
        }
    }

    /// 混合题说明占位提示
    pub fn set_description_placeholder(&mut self, text: Option<String>) {
        match &mut self.question.kind {
            QuestionKind::MixedChoiceAndText {
                description_placeholder,
                ..
            } => {
                *description_placeholder = text;
            }
            QuestionKind::SingleOrMultiChoice { .. }
            | QuestionKind::FreeText { .. }
            | QuestionKind::Ranking { .. } => {}
        }
    }

    pub(crate) fn redirect_id(&mut self, server_id: &str) {
        self.question.id = server_id.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamped_to_zero() {
        let mut draft = QuestionDraft::new(VariantKind::FreeText);
        draft.set_score(-3.0);
        assert_eq!(draft.question().score, 0.0);

        draft.set_score(2.5);
        assert_eq!(draft.question().score, 2.5);
    }

    #[test]
    fn test_variant_specific_setters_ignore_wrong_kind() {
        let mut draft = QuestionDraft::new(VariantKind::Ranking);
        let before = draft.clone();

        draft.set_allow_multiple(true);
        draft.set_length_bounds(Some(1), Some(2));
        draft.set_description_required(true);

        assert_eq!(draft, before);
    }

    #[test]
    fn test_commit_twice_without_edits_is_structurally_equal() {
        let mut draft = QuestionDraft::new(VariantKind::SingleOrMultiChoice);
        draft.set_title("选择题");
        for text in ["A", "B"] {
            draft.add_option();
            let id = draft.last_option_id().unwrap();
            draft.update_option(&id, &OptionPatch::text(text));
        }

        assert!(draft.is_valid());
        assert_eq!(draft.question().clone(), draft.question().clone());
        assert_eq!(draft.is_valid(), draft.is_valid());
    }
}
