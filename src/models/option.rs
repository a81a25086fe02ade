//! 答案选项模型
//!
//! [`OptionSet`] 是选择类题型持有的有序选项集合。所有修改操作都
//! 采用"返回新集合"的不可变更新方式，便于上层做差异比较；原地
//! 修改只允许发生在它的所有者（题目草稿）手里。

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::new_local_id;
use crate::reorder::{move_item, DragResult};
use crate::utils::text::strip_markup;

/// 单个答案选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    pub id: String,
    /// 选项文字（富文本）
    pub text: String,
    /// 选项配图
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 是否为正确答案（仅选择类题型有意义）
    #[serde(default)]
    pub is_correct: bool,
    /// 排序位置（仅排序题有意义，始终等于下标 + 1）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_position: Option<u32>,
}

impl OptionItem {
    /// 创建一个空白新选项（分配临时 id）
    pub fn new() -> Self {
        Self {
            id: new_local_id(),
            text: String::new(),
            image: None,
            is_correct: false,
            rank_position: None,
        }
    }

    /// 选项去掉富文本标签后是否有文字
    pub fn has_text(&self) -> bool {
        !strip_markup(&self.text).is_empty()
    }
}

impl Default for OptionItem {
    fn default() -> Self {
        Self::new()
    }
}

/// 选项修改补丁，`None` 字段保持原值
#[derive(Debug, Clone, Default)]
pub struct OptionPatch {
    pub text: Option<String>,
    pub image: Option<String>,
    pub is_correct: Option<bool>,
}

impl OptionPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn correct(is_correct: bool) -> Self {
        Self {
            is_correct: Some(is_correct),
            ..Self::default()
        }
    }
}

/// 有序选项集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    items: Vec<OptionItem>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<OptionItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[OptionItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&OptionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 追加一个空白新选项，返回新集合
    pub fn with_new_option(&self) -> Self {
        let mut items = self.items.clone();
        items.push(OptionItem::new());

        Self { items }
    }

    /// 按 id 应用补丁，返回新集合
    ///
    /// id 不存在时原样返回（恒等），绝不报错
    pub fn with_updated(&self, id: &str, patch: &OptionPatch) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id != id {
                    return item.clone();
                }

                let mut updated = item.clone();
                if let Some(text) = &patch.text {
                    updated.text = text.clone();
                }
                if let Some(image) = &patch.image {
                    updated.image = Some(image.clone());
                }
                if let Some(is_correct) = patch.is_correct {
                    updated.is_correct = is_correct;
                }
                updated
            })
            .collect();

        Self { items }
    }

    /// 按 id 删除选项，返回新集合
    pub fn with_deleted(&self, id: &str) -> Self {
        let items = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();

        Self { items }
    }

    /// 按拖拽结果重排序，返回新集合
    pub fn reordered(&self, drag: &DragResult) -> AppResult<Self> {
        let Some(destination) = drag.destination else {
            return Ok(self.clone());
        };

        let mut items = self.items.clone();
        move_item(&mut items, drag.source.index, destination.index)?;

        Ok(Self { items })
    }

    /// 把每个选项的排序位置重置为下标 + 1，返回新集合
    ///
    /// 排序题在任何插入、删除、重排之后立即调用，排序答案键里
    /// 不允许出现空洞
    pub fn renumbered_ranks(&self) -> Self {
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let mut renumbered = item.clone();
                renumbered.rank_position = Some(index as u32 + 1);
                renumbered
            })
            .collect();

        Self { items }
    }

    /// 是否满足选择类题型的选项要求：至少两个选项且至少一个有文字
    pub fn has_valid_choices(&self) -> bool {
        self.items.len() >= 2 && self.items.iter().any(|item| item.has_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with_texts(texts: &[&str]) -> OptionSet {
        let items = texts
            .iter()
            .map(|text| OptionItem {
                text: text.to_string(),
                ..OptionItem::new()
            })
            .collect();
        OptionSet::from_items(items)
    }

    #[test]
    fn test_with_new_option_appends_blank() {
        let set = set_with_texts(&["A"]);
        let updated = set.with_new_option();

        assert_eq!(set.len(), 1);
        assert_eq!(updated.len(), 2);
        assert_eq!(updated.items()[1].text, "");
    }

    #[test]
    fn test_with_updated_unknown_id_is_identity() {
        let set = set_with_texts(&["A", "B"]);
        let updated = set.with_updated("不存在的id", &OptionPatch::text("X"));

        assert_eq!(set, updated);
    }

    #[test]
    fn test_with_updated_applies_patch() {
        let set = set_with_texts(&["A", "B"]);
        let id = set.items()[1].id.clone();

        let updated = set.with_updated(
            &id,
            &OptionPatch {
                text: Some("B2".into()),
                image: None,
                is_correct: Some(true),
            },
        );

        assert_eq!(updated.items()[1].text, "B2");
        assert!(updated.items()[1].is_correct);
        // 其余选项不受影响
        assert_eq!(updated.items()[0], set.items()[0]);
    }

    #[test]
    fn test_renumbered_ranks_after_delete() {
        // 4 个排序选项删掉第 2 名后，剩下的按当前顺序重排为 1..3
        let set = set_with_texts(&["甲", "乙", "丙", "丁"]).renumbered_ranks();
        let second = set.items()[1].id.clone();

        let remaining = set.with_deleted(&second).renumbered_ranks();

        let ranks: Vec<u32> = remaining
            .items()
            .iter()
            .map(|item| item.rank_position.unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        let texts: Vec<&str> = remaining
            .items()
            .iter()
            .map(|item| item.text.as_str())
            .collect();
        assert_eq!(texts, vec!["甲", "丙", "丁"]);
    }

    #[test]
    fn test_has_valid_choices() {
        assert!(!set_with_texts(&["只有一个"]).has_valid_choices());
        assert!(!set_with_texts(&["", ""]).has_valid_choices());
        assert!(set_with_texts(&["有文字", ""]).has_valid_choices());
    }
}
