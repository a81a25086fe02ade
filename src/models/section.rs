//! 章节模型
//!
//! 章节归试卷独占所有，章节内题目的顺序只由章节自己变更，
//! 避免兄弟实体之间的交叉写入造成更新丢失。

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::new_local_id;
use crate::models::question::Question;
use crate::reorder::{renumber, reorder, DragResult, Positioned};
use crate::utils::text::{contains_image, is_blank_rich_text};

/// 试卷章节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    /// 在试卷内的位置（1 起始，连续）
    pub position: u32,
    pub title: String,
    /// 章节说明（富文本，可内嵌图片）
    pub content: String,
    pub questions: Vec<Question>,
    /// 是否展开（纯界面状态，不持久化）
    #[serde(skip)]
    pub is_expanded: bool,
    /// 是否还是仅存在于本地的新章节
    #[serde(skip)]
    pub is_new_local: bool,
}

impl Section {
    /// 创建一个本地新章节（分配临时 id，位置由试卷编号）
    pub fn new_local() -> Self {
        Self {
            id: new_local_id(),
            position: 0,
            title: String::new(),
            content: String::new(),
            questions: Vec::new(),
            is_expanded: true,
            is_new_local: true,
        }
    }

    /// 章节内容是否满足提交要求：有文字或内嵌了图片
    pub fn has_content(&self) -> bool {
        !is_blank_rich_text(&self.content) || contains_image(&self.content)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn question_mut(&mut self, id: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|question| question.id == id)
    }

    pub fn question_index(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|question| question.id == id)
    }

    /// 追加题目并重编号
    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question);
        renumber(&mut self.questions);
    }

    /// 在指定下标插回题目并重编号（乐观回滚用）
    pub fn insert_question_at(&mut self, index: usize, question: Question) {
        let index = index.min(self.questions.len());
        self.questions.insert(index, question);
        renumber(&mut self.questions);
    }

    /// 按 id 原位替换题目（位置编号保持不变）
    pub fn replace_question(&mut self, question: Question) -> bool {
        match self.question_index(&question.id) {
            Some(index) => {
                let position = self.questions[index].position;
                self.questions[index] = question;
                self.questions[index].position = position;
                true
            }
            None => false,
        }
    }

    /// 按 id 删除题目并重编号，返回被删除的题目
    pub fn remove_question(&mut self, id: &str) -> Option<Question> {
        let index = self.question_index(id)?;
        let removed = self.questions.remove(index);
        renumber(&mut self.questions);

        Some(removed)
    }

    /// 按拖拽结果重排题目
    pub fn reorder_questions(&mut self, drag: &DragResult) -> AppResult<bool> {
        reorder(&mut self.questions, drag)
    }
}

impl Positioned for Section {
    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}
