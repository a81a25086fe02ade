//! 重排序引擎
//!
//! 章节在试卷内、题目在章节内的拖拽重排都走这里，位置重编号
//! 只发生在本模块的 [`renumber`] —— 新增/删除路径同样调用它，
//! 不允许各处自行重编号。

use crate::error::{AppError, AppResult};

/// 拖拽位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLocation {
    pub index: usize,
}

/// 拖拽结果
///
/// `destination` 为 `None` 表示放到了有效目标之外，整个操作视为
/// 无操作，顺序保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragResult {
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

impl DragResult {
    pub fn new(source: usize, destination: Option<usize>) -> Self {
        Self {
            source: DragLocation { index: source },
            destination: destination.map(|index| DragLocation { index }),
        }
    }
}

/// 拥有 1 起始连续位置编号的实体（章节、题目）
pub trait Positioned {
    fn position(&self) -> u32;

    fn set_position(&mut self, position: u32);
}

/// 把每个元素的位置编号重置为其下标 + 1
pub fn renumber<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index as u32 + 1);
    }
}

/// 把 `source` 处的元素移动到 `destination` 处
///
/// 越界索引视为程序缺陷，在任何改动发生前快速失败；
/// 返回是否发生了实际移动
pub(crate) fn move_item<T>(
    items: &mut Vec<T>,
    source: usize,
    destination: usize,
) -> AppResult<bool> {
    let max_index = items.len().saturating_sub(1);

    if source >= items.len() {
        return Err(AppError::invalid_index(source, max_index));
    }
    if destination >= items.len() {
        return Err(AppError::invalid_index(destination, max_index));
    }

    if source == destination {
        return Ok(false);
    }

    let item = items.remove(source);
    items.insert(destination, item);

    Ok(true)
}

/// 按拖拽结果重排序并重编号
///
/// # 参数
/// - `items`: 有序集合（章节或题目）
/// - `drag`: 拖拽结果
///
/// # 返回
/// 返回是否发生了实际移动；拖出有效目标之外时原样返回，绝不
/// 部分生效
pub fn reorder<T: Positioned>(items: &mut Vec<T>, drag: &DragResult) -> AppResult<bool> {
    let Some(destination) = drag.destination else {
        return Ok(false);
    };

    let moved = move_item(items, drag.source.index, destination.index)?;

    if moved {
        renumber(items);
    }

    Ok(moved)
}
