//! 远端传输投影
//!
//! 远端接口的题目结构只有 `{options, correctAnswer}` 一档：多选
//! 的全部正确项和排序题的完整答案键都装不下。这里的有损投影
//! （取第一个正确选项，没有则取第一个选项；排序题取第 1 名占位）
//! 是远端 schema 的既有限制，为兼容必须原样保留——不要在这里
//! "修复"它。

use serde::{Deserialize, Serialize};

use crate::models::composition::Composition;
use crate::models::question::{Question, QuestionKind};
use crate::models::section::Section;

/// createExam 的整卷数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiExamData {
    pub title: String,
    pub sections: Vec<ApiExamSection>,
}

/// 整卷提交时的章节数据（含题目）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiExamSection {
    pub title: String,
    pub content: String,
    pub order: u32,
    pub questions: Vec<ApiQuestionData>,
}

/// 逐章节同步时的章节数据（不含题目）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSectionData {
    pub title: String,
    pub content: String,
    pub order: u32,
}

/// 传输用题目数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQuestionData {
    pub kind: String,
    pub title: String,
    pub required: bool,
    pub score: f64,
    pub order: u32,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// 把题目投影为传输结构
pub fn project_question(question: &Question) -> ApiQuestionData {
    let (kind, options, correct_answer) = match &question.kind {
        QuestionKind::SingleOrMultiChoice { options, .. } => (
            "singleOrMultiChoice",
            option_texts(options.items()),
            pick_correct_answer(options.items()),
        ),
        QuestionKind::MixedChoiceAndText { options, .. } => (
            "mixedChoiceAndText",
            option_texts(options.items()),
            pick_correct_answer(options.items()),
        ),
        // 排序题以第 1 名选项占位作答案键
        QuestionKind::Ranking { options } => (
            "ranking",
            option_texts(options.items()),
            options
                .items()
                .first()
                .map(|item| item.text.clone())
                .unwrap_or_default(),
        ),
        QuestionKind::FreeText { .. } => ("freeText", Vec::new(), String::new()),
    };

    ApiQuestionData {
        kind: kind.to_string(),
        title: question.title.clone(),
        required: question.required,
        score: question.score,
        order: question.position,
        options,
        correct_answer,
    }
}

/// 把章节投影为逐章节同步用的结构
pub fn project_section(section: &Section) -> ApiSectionData {
    ApiSectionData {
        title: section.title.clone(),
        content: section.content.clone(),
        order: section.position,
    }
}

/// 把整卷投影为 createExam 数据
pub fn project_composition(title: &str, composition: &Composition) -> ApiExamData {
    ApiExamData {
        title: title.to_string(),
        sections: composition
            .sections
            .iter()
            .map(|section| ApiExamSection {
                title: section.title.clone(),
                content: section.content.clone(),
                order: section.position,
                questions: section.questions.iter().map(project_question).collect(),
            })
            .collect(),
    }
}

fn option_texts(items: &[crate::models::option::OptionItem]) -> Vec<String> {
    items.iter().map(|item| item.text.clone()).collect()
}

/// 第一个标为正确的选项，没有则第一个选项，再没有则空串
fn pick_correct_answer(items: &[crate::models::option::OptionItem]) -> String {
    items
        .iter()
        .find(|item| item.is_correct)
        .or_else(|| items.first())
        .map(|item| item.text.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::option::{OptionItem, OptionSet};
    use crate::models::question::VariantKind;

    fn options_from(texts_and_correct: &[(&str, bool)]) -> OptionSet {
        OptionSet::from_items(
            texts_and_correct
                .iter()
                .map(|(text, is_correct)| OptionItem {
                    text: text.to_string(),
                    is_correct: *is_correct,
                    ..OptionItem::new()
                })
                .collect(),
        )
    }

    #[test]
    fn test_correct_answer_prefers_marked_option() {
        let mut question = Question::new_local(VariantKind::SingleOrMultiChoice);
        question.title = "选择".to_string();
        question.kind = QuestionKind::SingleOrMultiChoice {
            options: options_from(&[("A", false), ("B", true), ("C", true)]),
            allow_multiple: true,
        };

        let projected = project_question(&question);

        // 多选时只保留第一个正确项——远端 schema 的既有限制
        assert_eq!(projected.correct_answer, "B");
        assert_eq!(projected.options, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_correct_answer_falls_back_to_first_option() {
        let mut question = Question::new_local(VariantKind::SingleOrMultiChoice);
        question.kind = QuestionKind::SingleOrMultiChoice {
            options: options_from(&[("甲", false), ("乙", false)]),
            allow_multiple: false,
        };

        assert_eq!(project_question(&question).correct_answer, "甲");
    }

    #[test]
    fn test_ranking_uses_rank_one_placeholder() {
        let mut question = Question::new_local(VariantKind::Ranking);
        question.kind = QuestionKind::Ranking {
            options: options_from(&[("第一步", false), ("第二步", false)]),
        };

        let projected = project_question(&question);

        assert_eq!(projected.kind, "ranking");
        assert_eq!(projected.correct_answer, "第一步");
    }

    #[test]
    fn test_free_text_projects_empty_options() {
        let question = Question::new_local(VariantKind::FreeText);
        let projected = project_question(&question);

        assert_eq!(projected.kind, "freeText");
        assert!(projected.options.is_empty());
        assert_eq!(projected.correct_answer, "");
    }
}
