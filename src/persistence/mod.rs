//! 持久化适配器
//!
//! 两种持久化策略——整卷本地起草后一次性提交（[`BatchAdapter`]），
//! 与逐章节/逐题即时同步（[`IncrementalAdapter`]）——共用同一个
//! 接口；上层（编辑会话）只依赖接口，排序与校验不变式对两种
//! 策略完全一致，不允许互相岔开。

pub mod batch;
pub mod incremental;
pub mod projection;

pub use batch::BatchAdapter;
pub use incremental::IncrementalAdapter;

use crate::error::AppResult;
use crate::models::composition::Composition;
use crate::models::question::Question;
use crate::models::section::Section;

/// 临时 id → 服务端 id 的对账结果
///
/// 对账在适配器返回前已经对试卷生效；调用方拿它去重定向仍持有
/// 旧 id 的引用（比如开着的编辑器）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdChange {
    pub local_id: String,
    pub server_id: String,
}

/// 持久化策略接口
///
/// 各操作都在本地乐观变更完成之后被通知；创建类操作可能返回
/// id 对账结果。失败时适配器只负责报错，本地回滚（或删除类
/// 操作的"不复活"）由调用方执行。
#[allow(async_fn_in_trait)]
pub trait PersistenceAdapter {
    /// 新章节已在本地插入
    async fn section_added(
        &mut self,
        composition: &mut Composition,
        section_id: &str,
    ) -> AppResult<Option<IdChange>>;

    /// 章节内容已在本地修改
    async fn section_updated(
        &mut self,
        composition: &Composition,
        section_id: &str,
    ) -> AppResult<()>;

    /// 章节已从本地有序集合移除
    async fn section_removed(&mut self, removed: &Section) -> AppResult<()>;

    /// 章节顺序已在本地重排
    async fn section_order_changed(&mut self, composition: &Composition) -> AppResult<()>;

    /// 题目已提交进本地章节（新建或原位替换）
    async fn question_committed(
        &mut self,
        composition: &mut Composition,
        section_id: &str,
        question_id: &str,
    ) -> AppResult<Option<IdChange>>;

    /// 题目已从本地章节移除
    async fn question_removed(&mut self, section_id: &str, removed: &Question) -> AppResult<()>;

    /// 某章节内题目顺序已在本地重排
    async fn question_order_changed(
        &mut self,
        composition: &Composition,
        section_id: &str,
    ) -> AppResult<()>;

    /// 终点提交，返回远端试卷 id
    async fn submit(&mut self, composition: &Composition) -> AppResult<String>;
}
