/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 试卷 API 基础地址
    pub api_base_url: String,
    /// 试卷 API 令牌
    pub api_token: String,
    /// 试卷草稿（TOML）存放目录
    pub draft_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://exam-admin-api.example.cn".to_string(),
            api_token: String::new(),
            draft_folder: "exam_drafts".to_string(),
            verbose_logging: false,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("EXAM_API_BASE_URL").unwrap_or(default.api_base_url),
            api_token: std::env::var("EXAM_API_TOKEN").unwrap_or(default.api_token),
            draft_folder: std::env::var("DRAFT_FOLDER").unwrap_or(default.draft_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
        }
    }
}
