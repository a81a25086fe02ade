//! 单一活动编辑器控制器
//!
//! 整张试卷同一时刻最多只允许一个题目编辑器处于可输入状态。
//! 控制器挂在试卷聚合之上而不是每个章节本地——按章节各自开关
//! 必然出现两个编辑器同时打开、提交时互相覆盖同一题目数组的
//! 问题。切换目标前必须先提交当前草稿，提交被校验拒绝时切换
//! 也被拒绝。

use tracing::debug;

use crate::error::{AppError, AppResult, ValidationError};
use crate::editor::draft::QuestionDraft;
use crate::models::composition::Composition;
use crate::models::question::{Question, VariantKind};
use crate::utils::text::{strip_markup, truncate_text};

/// 编辑目标：新题或已有题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(String),
}

#[derive(Debug, Clone, PartialEq)]
enum EditorState {
    Closed,
    Open {
        section_id: String,
        target: EditorTarget,
        draft: QuestionDraft,
    },
}

/// 全卷唯一的题目编辑器状态机
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEditorController {
    state: EditorState,
}

impl Default for ActiveEditorController {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveEditorController {
    pub fn new() -> Self {
        Self {
            state: EditorState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Open { .. })
    }

    /// 当前编辑器所在的章节 id
    pub fn open_section(&self) -> Option<&str> {
        match &self.state {
            EditorState::Open { section_id, .. } => Some(section_id),
            EditorState::Closed => None,
        }
    }

    /// 当前编辑中的已有题目 id（新题返回 None）
    pub fn open_question_id(&self) -> Option<&str> {
        match &self.state {
            EditorState::Open {
                target: EditorTarget::Existing(id),
                ..
            } => Some(id),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&QuestionDraft> {
        match &self.state {
            EditorState::Open { draft, .. } => Some(draft),
            EditorState::Closed => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut QuestionDraft> {
        match &mut self.state {
            EditorState::Open { draft, .. } => Some(draft),
            EditorState::Closed => None,
        }
    }

    /// 在指定章节打开新题编辑器
    ///
    /// 若另一处编辑器开着则先提交；提交被校验拒绝时保持原编辑器
    /// 打开并返回该校验错误
    pub fn open_new(
        &mut self,
        composition: &mut Composition,
        section_id: &str,
        variant: VariantKind,
    ) -> AppResult<()> {
        self.flush(composition)?;

        if composition.section(section_id).is_none() {
            return Err(AppError::unknown_section(section_id));
        }

        self.state = EditorState::Open {
            section_id: section_id.to_string(),
            target: EditorTarget::New,
            draft: QuestionDraft::new(variant),
        };

        Ok(())
    }

    /// 打开已有题目的编辑器
    pub fn open_existing(
        &mut self,
        composition: &mut Composition,
        section_id: &str,
        question_id: &str,
    ) -> AppResult<()> {
        // 同一题重复打开是无操作
        if self.open_question_id() == Some(question_id) {
            return Ok(());
        }

        self.flush(composition)?;

        let Some(section) = composition.section(section_id) else {
            return Err(AppError::unknown_section(section_id));
        };
        let Some(question) = section.question(question_id) else {
            return Err(AppError::unknown_question(question_id));
        };

        self.state = EditorState::Open {
            section_id: section_id.to_string(),
            target: EditorTarget::Existing(question_id.to_string()),
            draft: QuestionDraft::from_existing(question),
        };

        Ok(())
    }

    /// 提交当前草稿（若开着）并关闭编辑器
    ///
    /// 返回写入试卷后的题目；编辑器本来就是关闭状态时返回
    /// `Ok(None)`。校验失败时编辑器保持打开并返回对应的校验
    /// 错误——提交流程靠它在整卷校验前拦下未保存的编辑。
    pub fn flush(&mut self, composition: &mut Composition) -> AppResult<Option<Question>> {
        let EditorState::Open {
            section_id,
            target,
            draft,
        } = &self.state
        else {
            return Ok(None);
        };

        let Some(section) = composition.section(section_id) else {
            return Err(AppError::unknown_section(section_id.clone()));
        };

        if !draft.is_valid() {
            let question_position = match target {
                EditorTarget::Existing(id) => section
                    .question(id)
                    .map(|question| question.position)
                    .unwrap_or(section.questions.len() as u32 + 1),
                EditorTarget::New => section.questions.len() as u32 + 1,
            };

            return Err(ValidationError::InvalidQuestion {
                section_position: section.position,
                question_position,
            }
            .into());
        }

        let section_id = section_id.clone();
        let target = target.clone();
        let question = draft.question().clone();
        let question_id = question.id.clone();
        let title_preview = truncate_text(&strip_markup(&question.title), 20);

        let Some(section) = composition.section_mut(&section_id) else {
            return Err(AppError::unknown_section(section_id));
        };

        let committed = match target {
            EditorTarget::New => {
                section.push_question(question);
                section.questions.last().cloned()
            }
            EditorTarget::Existing(_) => {
                if !section.replace_question(question) {
                    return Err(AppError::unknown_question(question_id));
                }
                section.question(&question_id).cloned()
            }
        };

        debug!(
            "✓ 编辑器提交: 章节 {} 题目 {} 《{}》",
            section_id, question_id, title_preview
        );
        self.state = EditorState::Closed;

        Ok(committed)
    }

    /// 显式保存：提交并关闭，校验失败返回 `None`（编辑器保持打开）
    ///
    /// `None` 是变体编辑器边界上唯一的"无效"信号，不抛错
    pub fn save(&mut self, composition: &mut Composition) -> Option<Question> {
        match self.flush(composition) {
            Ok(question) => question,
            Err(e) => {
                debug!("编辑器保存被拒绝: {}", e);
                None
            }
        }
    }

    /// 显式取消：丢弃未提交的编辑并关闭
    pub fn cancel(&mut self) {
        if self.is_open() {
            debug!("编辑器取消，丢弃未提交的编辑");
        }
        self.state = EditorState::Closed;
    }

    /// 章节临时 id 对账后重定向编辑器引用
    pub(crate) fn redirect_section_id(&mut self, old_id: &str, new_id: &str) {
        if let EditorState::Open { section_id, .. } = &mut self.state {
            if section_id == old_id {
                *section_id = new_id.to_string();
            }
        }
    }

    /// 题目临时 id 对账后重定向编辑器引用
    pub(crate) fn redirect_question_id(&mut self, old_id: &str, new_id: &str) {
        if let EditorState::Open { target, draft, .. } = &mut self.state {
            if let EditorTarget::Existing(id) = target {
                if id == old_id {
                    *id = new_id.to_string();
                }
            }
            if draft.id() == old_id {
                draft.redirect_id(new_id);
            }
        }
    }
}
