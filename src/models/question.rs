//! 题目模型
//!
//! 题目是带判别字段 `kind` 的封闭变体类型，四种结构不同的题型
//! 在校验、编辑器选择、投影等每个消费点都做穷尽匹配——新增第
//! 五种题型时所有未处理的地方都会在编译期报错，而不是静默落空。

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::new_local_id;
use crate::models::option::{OptionPatch, OptionSet};
use crate::reorder::{DragResult, Positioned};
use crate::utils::text::strip_markup;

/// 题型标识（用于编辑器选择新题型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantKind {
    SingleOrMultiChoice,
    FreeText,
    MixedChoiceAndText,
    Ranking,
}

/// 题型变体及其专有字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuestionKind {
    /// 单选/多选题
    #[serde(rename_all = "camelCase")]
    SingleOrMultiChoice {
        options: OptionSet,
        allow_multiple: bool,
    },
    /// 简答题
    #[serde(rename_all = "camelCase")]
    FreeText {
        #[serde(skip_serializing_if = "Option::is_none")]
        min_length: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    /// 选择加说明题
    #[serde(rename_all = "camelCase")]
    MixedChoiceAndText {
        options: OptionSet,
        allow_multiple: bool,
        description_required: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        description_placeholder: Option<String>,
    },
    /// 排序题（当前显示顺序即答案键）
    #[serde(rename_all = "camelCase")]
    Ranking { options: OptionSet },
}

impl QuestionKind {
    /// 按题型标识创建空白变体
    pub fn new_for(variant: VariantKind) -> Self {
        match variant {
            VariantKind::SingleOrMultiChoice => QuestionKind::SingleOrMultiChoice {
                options: OptionSet::new(),
                allow_multiple: false,
            },
            VariantKind::FreeText => QuestionKind::FreeText {
                min_length: None,
                max_length: None,
                placeholder: None,
            },
            VariantKind::MixedChoiceAndText => QuestionKind::MixedChoiceAndText {
                options: OptionSet::new(),
                allow_multiple: false,
                description_required: false,
                description_placeholder: None,
            },
            VariantKind::Ranking => QuestionKind::Ranking {
                options: OptionSet::new(),
            },
        }
    }

    /// 题型标识
    pub fn variant(&self) -> VariantKind {
        match self {
            QuestionKind::SingleOrMultiChoice { .. } => VariantKind::SingleOrMultiChoice,
            QuestionKind::FreeText { .. } => VariantKind::FreeText,
            QuestionKind::MixedChoiceAndText { .. } => VariantKind::MixedChoiceAndText,
            QuestionKind::Ranking { .. } => VariantKind::Ranking,
        }
    }

    /// 变体持有的选项集合（简答题没有）
    pub fn options(&self) -> Option<&OptionSet> {
        match self {
            QuestionKind::SingleOrMultiChoice { options, .. }
            | QuestionKind::MixedChoiceAndText { options, .. }
            | QuestionKind::Ranking { options } => Some(options),
            QuestionKind::FreeText { .. } => None,
        }
    }
}

/// 题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    /// 在所属章节内的位置（1 起始，连续）
    pub position: u32,
    /// 题干（富文本，必填）
    pub title: String,
    /// 是否必答
    pub required: bool,
    /// 分值（≥ 0）
    pub score: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// 创建一个空白新题目（分配临时 id，位置由所属章节编号）
    pub fn new_local(variant: VariantKind) -> Self {
        Self {
            id: new_local_id(),
            position: 0,
            title: String::new(),
            required: false,
            score: 0.0,
            kind: QuestionKind::new_for(variant),
        }
    }

    /// 题目是否可提交
    ///
    /// - 题干去掉标签后非空（所有题型）
    /// - 选择类题型：至少两个选项且至少一个有文字
    /// - 简答题：无选项约束；上下限同时存在时要求下限 ≤ 上限
    pub fn is_valid(&self) -> bool {
        if strip_markup(&self.title).is_empty() {
            return false;
        }

        match &self.kind {
            QuestionKind::SingleOrMultiChoice { options, .. } => options.has_valid_choices(),
            QuestionKind::MixedChoiceAndText { options, .. } => options.has_valid_choices(),
            QuestionKind::Ranking { options } => options.has_valid_choices(),
            QuestionKind::FreeText {
                min_length,
                max_length,
                ..
            } => match (min_length, max_length) {
                (Some(min), Some(max)) => min <= max,
                _ => true,
            },
        }
    }

    /// 追加空白选项（简答题为无操作）
    ///
    /// 排序题追加后立即重排答案键
    pub fn add_option(&mut self) {
        match &mut self.kind {
            QuestionKind::SingleOrMultiChoice { options, .. }
            | QuestionKind::MixedChoiceAndText { options, .. } => {
                *options = options.with_new_option();
            }
            QuestionKind::Ranking { options } => {
                *options = options.with_new_option().renumbered_ranks();
            }
            QuestionKind::FreeText { .. } => {}
        }
    }

    /// 按 id 修改选项（id 不存在或简答题为无操作）
    pub fn update_option(&mut self, id: &str, patch: &OptionPatch) {
        match &mut self.kind {
            QuestionKind::SingleOrMultiChoice { options, .. }
            | QuestionKind::MixedChoiceAndText { options, .. }
            | QuestionKind::Ranking { options } => {
                *options = options.with_updated(id, patch);
            }
            QuestionKind::FreeText { .. } => {}
        }
    }

    /// 按 id 删除选项
    ///
    /// 排序题删除后立即重排答案键
    pub fn delete_option(&mut self, id: &str) {
        match &mut self.kind {
            QuestionKind::SingleOrMultiChoice { options, .. }
            | QuestionKind::MixedChoiceAndText { options, .. } => {
                *options = options.with_deleted(id);
            }
            QuestionKind::Ranking { options } => {
                *options = options.with_deleted(id).renumbered_ranks();
            }
            QuestionKind::FreeText { .. } => {}
        }
    }

    /// 按拖拽结果重排选项
    ///
    /// 排序题重排后立即重排答案键
    pub fn reorder_options(&mut self, drag: &DragResult) -> AppResult<()> {
        match &mut self.kind {
            QuestionKind::SingleOrMultiChoice { options, .. }
            | QuestionKind::MixedChoiceAndText { options, .. } => {
                *options = options.reordered(drag)?;
            }
            QuestionKind::Ranking { options } => {
                *options = options.reordered(drag)?.renumbered_ranks();
            }
            QuestionKind::FreeText { .. } => {}
        }

        Ok(())
    }
}

impl Positioned for Question {
    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice_question(option_texts: &[&str]) -> Question {
        let mut question = Question::new_local(VariantKind::SingleOrMultiChoice);
        question.title = "<p>选择题</p>".to_string();

        for text in option_texts {
            question.add_option();
            if let Some(options) = question.kind.options() {
                let id = options.items().last().map(|item| item.id.clone());
                if let Some(id) = id {
                    question.update_option(&id, &OptionPatch::text(*text));
                }
            }
        }

        question
    }

    #[test]
    fn test_choice_needs_two_options_with_text() {
        // 只有一个非空选项 → 不可提交；补上第二个 → 可提交
        let mut question = choice_question(&["选项A"]);
        assert!(!question.is_valid());

        question.add_option();
        let id = question
            .kind
            .options()
            .unwrap()
            .items()
            .last()
            .unwrap()
            .id
            .clone();
        question.update_option(&id, &OptionPatch::text("选项B"));

        assert!(question.is_valid());
    }

    #[test]
    fn test_title_required_for_all_variants() {
        let mut question = choice_question(&["A", "B"]);
        question.title = "<p><br></p>".to_string();
        assert!(!question.is_valid());

        let mut free_text = Question::new_local(VariantKind::FreeText);
        assert!(!free_text.is_valid());
        free_text.title = "简答".to_string();
        assert!(free_text.is_valid());
    }

    #[test]
    fn test_free_text_length_bounds() {
        let mut question = Question::new_local(VariantKind::FreeText);
        question.title = "简答".to_string();
        question.kind = QuestionKind::FreeText {
            min_length: Some(100),
            max_length: Some(10),
            placeholder: None,
        };
        assert!(!question.is_valid());

        question.kind = QuestionKind::FreeText {
            min_length: Some(10),
            max_length: Some(100),
            placeholder: None,
        };
        assert!(question.is_valid());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let question = choice_question(&["A", "B"]);

        assert_eq!(question.is_valid(), question.is_valid());
    }

    #[test]
    fn test_ranking_reorder_renumbers_key() {
        let mut question = Question::new_local(VariantKind::Ranking);
        question.title = "排序题".to_string();
        for _ in 0..3 {
            question.add_option();
        }

        question
            .reorder_options(&DragResult::new(2, Some(0)))
            .unwrap();

        let ranks: Vec<u32> = question
            .kind
            .options()
            .unwrap()
            .items()
            .iter()
            .map(|item| item.rank_position.unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_update_option_unknown_id_is_noop() {
        let question_before = choice_question(&["A", "B"]);
        let mut question = question_before.clone();

        question.update_option("不存在", &OptionPatch::text("X"));

        assert_eq!(question, question_before);
    }
}
