//! 试卷草稿 TOML 加载器
//!
//! 离线组卷的输入格式：一个目录下每个 TOML 文件是一张试卷草稿。
//! 原始结构（Raw*）只负责反序列化，转换为领域模型时分配临时 id
//! 并统一重编号。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::models::composition::Composition;
use crate::models::option::{OptionItem, OptionSet};
use crate::models::question::{Question, QuestionKind, VariantKind};
use crate::models::section::Section;
use crate::reorder::renumber;

/// 一张待提交的试卷草稿
#[derive(Debug, Clone)]
pub struct CompositionDraft {
    pub title: String,
    pub composition: Composition,
    pub file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDraft {
    title: String,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    kind: String,
    title: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    allow_multiple: bool,
    min_length: Option<u32>,
    max_length: Option<u32>,
    placeholder: Option<String>,
    #[serde(default)]
    description_required: bool,
    description_placeholder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    text: String,
    #[serde(default)]
    correct: bool,
    image: Option<String>,
}

impl RawOption {
    fn into_item(self) -> OptionItem {
        OptionItem {
            text: self.text,
            image: self.image,
            is_correct: self.correct,
            ..OptionItem::new()
        }
    }
}

impl RawQuestion {
    fn into_question(self) -> Result<Question> {
        let options = OptionSet::from_items(
            self.options
                .into_iter()
                .map(RawOption::into_item)
                .collect(),
        );

        let kind = match self.kind.as_str() {
            "singleOrMultiChoice" => QuestionKind::SingleOrMultiChoice {
                options,
                allow_multiple: self.allow_multiple,
            },
            "freeText" => QuestionKind::FreeText {
                min_length: self.min_length,
                max_length: self.max_length,
                placeholder: self.placeholder,
            },
            "mixedChoiceAndText" => QuestionKind::MixedChoiceAndText {
                options,
                allow_multiple: self.allow_multiple,
                description_required: self.description_required,
                description_placeholder: self.description_placeholder,
            },
            "ranking" => QuestionKind::Ranking {
                options: options.renumbered_ranks(),
            },
            other => anyhow::bail!("未知题型: {}", other),
        };

        let mut question = Question::new_local(VariantKind::FreeText);
        question.title = self.title;
        question.required = self.required;
        question.score = self.score.max(0.0);
        question.kind = kind;

        Ok(question)
    }
}

impl RawDraft {
    fn into_draft(self, file_path: Option<String>) -> Result<CompositionDraft> {
        let mut composition = Composition::new();

        for raw_section in self.sections {
            let mut section = Section::new_local();
            section.title = raw_section.title;
            section.content = raw_section.content;

            for raw_question in raw_section.questions {
                section.push_question(raw_question.into_question()?);
            }

            composition.sections.push(section);
        }
        renumber(&mut composition.sections);

        Ok(CompositionDraft {
            title: self.title,
            composition,
            file_path,
        })
    }
}

/// 从单个 TOML 文件加载试卷草稿
pub async fn load_draft_file(path: &Path) -> Result<CompositionDraft> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", path.display()))?;

    let raw: RawDraft = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", path.display()))?;

    raw.into_draft(Some(path.to_string_lossy().to_string()))
}

/// 从目录加载所有试卷草稿
///
/// 单个文件解析失败只警告并跳过，不影响其他草稿
pub async fn load_all_draft_files(folder_path: &str) -> Result<Vec<CompositionDraft>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut drafts = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_draft_file(&path).await {
                Ok(draft) => {
                    tracing::info!(
                        "成功加载《{}》: {} 个章节 / {} 道题",
                        draft.title,
                        draft.composition.sections.len(),
                        draft.composition.question_count()
                    );
                    drafts.push(draft);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
title = "2025年模拟卷"

[[sections]]
title = "第一部分"
content = "<p>材料一</p>"

[[sections.questions]]
kind = "singleOrMultiChoice"
title = "<p>选择题</p>"
score = 2.0
options = [
    { text = "选项A", correct = true },
    { text = "选项B" },
]

[[sections.questions]]
kind = "ranking"
title = "排序题"
options = [
    { text = "第一步" },
    { text = "第二步" },
    { text = "第三步" },
]
"#;

    #[test]
    fn test_raw_draft_converts_to_domain_model() {
        let raw: RawDraft = toml::from_str(SAMPLE).unwrap();
        let draft = raw.into_draft(None).unwrap();

        assert_eq!(draft.title, "2025年模拟卷");
        assert_eq!(draft.composition.sections.len(), 1);

        let section = &draft.composition.sections[0];
        assert_eq!(section.position, 1);
        assert_eq!(section.questions.len(), 2);
        assert_eq!(section.questions[1].position, 2);

        // 排序题加载后答案键立即成形
        let ranks: Vec<u32> = section.questions[1]
            .kind
            .options()
            .unwrap()
            .items()
            .iter()
            .map(|item| item.rank_position.unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        assert_eq!(draft.composition.validate(), Ok(()));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let raw: RawDraft = toml::from_str(
            r#"
title = "坏草稿"

[[sections]]
content = "<p>x</p>"

[[sections.questions]]
kind = "essayWithAudio"
title = "题干"
"#,
        )
        .unwrap();

        assert!(raw.into_draft(None).is_err());
    }
}
