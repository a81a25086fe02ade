/// 富文本工具模块
///
/// 题干、选项和章节内容均为富文本（HTML 片段），校验时只关心
/// 去掉标签后的纯文本
use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("内置正则不合法"))
}

/// 去掉富文本中的标签，返回纯文本
pub fn strip_markup(text: &str) -> String {
    tag_regex()
        .replace_all(text, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// 判断富文本去掉标签后是否为空
pub fn is_blank_rich_text(text: &str) -> bool {
    strip_markup(text).is_empty()
}

/// 判断富文本中是否内嵌了图片
pub fn contains_image(text: &str) -> bool {
    text.contains("<img")
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
