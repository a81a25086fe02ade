//! 试卷聚合根
//!
//! 试卷持有有序章节列表；章节顺序只由试卷变更。临时 id 换
//! 服务端 id 走显式的对账步骤，而不是原地改写实体身份，这样
//! 持有旧 id 的引用（比如开着的编辑器）可以被原子地重定向。

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ValidationError};
use crate::models::question::Question;
use crate::models::section::Section;
use crate::reorder::{renumber, reorder, DragResult};

/// 试卷（整个编辑器的聚合根）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub sections: Vec<Section>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.id == id)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    /// 追加一个本地新章节并重编号，返回其临时 id
    pub fn add_section(&mut self) -> String {
        let section = Section::new_local();
        let id = section.id.clone();

        self.sections.push(section);
        renumber(&mut self.sections);

        id
    }

    /// 在指定下标插回章节并重编号（乐观回滚用）
    pub fn insert_section_at(&mut self, index: usize, section: Section) {
        let index = index.min(self.sections.len());
        self.sections.insert(index, section);
        renumber(&mut self.sections);
    }

    /// 按 id 删除章节并重编号，返回被删除的章节
    pub fn remove_section(&mut self, id: &str) -> Option<Section> {
        let index = self.section_index(id)?;
        let removed = self.sections.remove(index);
        renumber(&mut self.sections);

        Some(removed)
    }

    /// 按拖拽结果重排章节
    pub fn reorder_sections(&mut self, drag: &DragResult) -> AppResult<bool> {
        reorder(&mut self.sections, drag)
    }

    /// 把章节的临时 id 替换为服务端 id
    ///
    /// 同时把 `is_new_local` 置为 false；一个章节任何时刻只会有
    /// 一个已确认的身份
    pub fn reconcile_section_id(&mut self, local_id: &str, server_id: &str) -> bool {
        match self.section_mut(local_id) {
            Some(section) => {
                section.id = server_id.to_string();
                section.is_new_local = false;
                true
            }
            None => false,
        }
    }

    /// 把题目的临时 id 替换为服务端 id（可同时回填服务端顺序）
    pub fn reconcile_question_id(
        &mut self,
        section_id: &str,
        local_id: &str,
        server_id: &str,
    ) -> bool {
        let Some(section) = self.section_mut(section_id) else {
            return false;
        };

        match section.question_mut(local_id) {
            Some(question) => {
                question.id = server_id.to_string();
                true
            }
            None => false,
        }
    }

    /// 全卷校验，按固定顺序返回第一类失败
    ///
    /// 1. 至少一个章节
    /// 2. 每个章节有内容（文字或图片）
    /// 3. 每个章节至少一题
    /// 4. 每道题可提交
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sections.is_empty() {
            return Err(ValidationError::EmptyComposition);
        }

        for section in &self.sections {
            if !section.has_content() {
                return Err(ValidationError::SectionMissingContent {
                    section_position: section.position,
                });
            }
        }

        for section in &self.sections {
            if section.questions.is_empty() {
                return Err(ValidationError::SectionMissingQuestions {
                    section_position: section.position,
                });
            }
        }

        for section in &self.sections {
            for question in &section.questions {
                if !question.is_valid() {
                    return Err(ValidationError::InvalidQuestion {
                        section_position: section.position,
                        question_position: question.position,
                    });
                }
            }
        }

        Ok(())
    }

    /// 全卷题目总数
    pub fn question_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.questions.len())
            .sum()
    }

    /// 在全卷范围内按 id 查找题目及其所属章节
    pub fn find_question(&self, question_id: &str) -> Option<(&Section, &Question)> {
        self.sections.iter().find_map(|section| {
            section
                .question(question_id)
                .map(|question| (section, question))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Question, VariantKind};

    fn filled_section() -> Section {
        let mut section = Section::new_local();
        section.content = "<p>材料</p>".to_string();
        let mut question = Question::new_local(VariantKind::FreeText);
        question.title = "简答".to_string();
        section.push_question(question);
        section
    }

    fn positions(composition: &Composition) -> Vec<u32> {
        composition.sections.iter().map(|s| s.position).collect()
    }

    #[test]
    fn test_add_remove_reorder_keep_positions_contiguous() {
        let mut composition = Composition::new();
        composition.add_section();
        composition.add_section();
        let third = composition.add_section();
        assert_eq!(positions(&composition), vec![1, 2, 3]);

        composition
            .reorder_sections(&DragResult::new(2, Some(0)))
            .unwrap();
        assert_eq!(composition.sections[0].id, third);
        assert_eq!(positions(&composition), vec![1, 2, 3]);

        composition.remove_section(&third);
        assert_eq!(positions(&composition), vec![1, 2]);
    }

    #[test]
    fn test_validate_order_of_failures() {
        // 空试卷
        let mut composition = Composition::new();
        assert_eq!(
            composition.validate(),
            Err(ValidationError::EmptyComposition)
        );

        // 有内容但没有题目的章节
        let section_id = composition.add_section();
        composition.section_mut(&section_id).unwrap().content = "<p>材料</p>".to_string();
        assert_eq!(
            composition.validate(),
            Err(ValidationError::SectionMissingQuestions {
                section_position: 1
            })
        );

        // 没内容的章节排在题目校验之前
        composition.section_mut(&section_id).unwrap().content = String::new();
        assert_eq!(
            composition.validate(),
            Err(ValidationError::SectionMissingContent {
                section_position: 1
            })
        );
    }

    #[test]
    fn test_validate_reports_invalid_question_position() {
        let mut composition = Composition::new();
        composition.sections.push(filled_section());
        renumber(&mut composition.sections);

        let mut bad = Question::new_local(VariantKind::SingleOrMultiChoice);
        bad.title = "选择".to_string();
        composition.sections[0].push_question(bad);

        assert_eq!(
            composition.validate(),
            Err(ValidationError::InvalidQuestion {
                section_position: 1,
                question_position: 2
            })
        );
    }

    #[test]
    fn test_reconcile_section_id() {
        let mut composition = Composition::new();
        let local_id = composition.add_section();
        assert!(composition.sections[0].is_new_local);

        assert!(composition.reconcile_section_id(&local_id, "srv-7"));

        assert_eq!(composition.sections[0].id, "srv-7");
        assert!(!composition.sections[0].is_new_local);
        assert!(!composition.reconcile_section_id(&local_id, "srv-8"));
    }

    #[test]
    fn test_valid_composition_passes() {
        let mut composition = Composition::new();
        composition.sections.push(filled_section());
        renumber(&mut composition.sections);

        assert_eq!(composition.validate(), Ok(()));
    }
}
