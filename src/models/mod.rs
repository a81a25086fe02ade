pub mod composition;
pub mod loaders;
pub mod option;
pub mod question;
pub mod section;

pub use composition::Composition;
pub use option::{OptionItem, OptionPatch, OptionSet};
pub use question::{Question, QuestionKind, VariantKind};
pub use section::Section;

use std::sync::atomic::{AtomicU64, Ordering};

static LOCAL_ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// 生成客户端临时 id
///
/// 实体创建的瞬间即分配，持久化后由服务端 id 原子替换；
/// 时间戳加序号，同一毫秒内也不会重复
pub fn new_local_id() -> String {
    let seq = LOCAL_ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("local-{}-{}", chrono::Utc::now().timestamp_millis(), seq)
}

/// 判断一个 id 是否还是客户端临时 id
pub fn is_local_id(id: &str) -> bool {
    id.starts_with("local-")
}
