use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 校验错误（用户可修正，不跨组件抛出）
    Validation(ValidationError),
    /// 编辑操作错误（程序缺陷，快速失败）
    Edit(EditError),
    /// API 调用错误
    Api(ApiError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Edit(e) => write!(f, "编辑错误: {}", e),
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Edit(e) => Some(e),
            AppError::Api(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 组卷校验错误
///
/// 校验顺序固定：空试卷 → 章节内容 → 章节题目数 → 单题校验。
/// 位置均为 1 起始，与界面显示一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 试卷没有任何章节
    EmptyComposition,
    /// 章节缺少内容（无文字也无图片）
    SectionMissingContent { section_position: u32 },
    /// 章节没有任何题目
    SectionMissingQuestions { section_position: u32 },
    /// 题目未通过校验
    InvalidQuestion {
        section_position: u32,
        question_position: u32,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyComposition => write!(f, "试卷至少需要一个章节"),
            ValidationError::SectionMissingContent { section_position } => {
                write!(f, "第 {} 章节缺少内容", section_position)
            }
            ValidationError::SectionMissingQuestions { section_position } => {
                write!(f, "第 {} 章节没有题目", section_position)
            }
            ValidationError::InvalidQuestion {
                section_position,
                question_position,
            } => {
                write!(
                    f,
                    "第 {} 章节的第 {} 题未通过校验",
                    section_position, question_position
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 编辑操作错误
///
/// 这类错误属于程序缺陷（拖拽层保证索引合法），不做静默钳制
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// 索引超出范围
    InvalidIndex { index: usize, max_index: usize },
    /// 未知章节
    UnknownSection { id: String },
    /// 未知题目
    UnknownQuestion { id: String },
    /// 提交仍在进行中（按钮禁用即互斥）
    SubmitInProgress,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::InvalidIndex { index, max_index } => {
                write!(f, "索引 {} 超出范围 [0, {}]", index, max_index)
            }
            EditError::UnknownSection { id } => write!(f, "未知章节: {}", id),
            EditError::UnknownQuestion { id } => write!(f, "未知题目: {}", id),
            EditError::SubmitInProgress => write!(f, "提交仍在进行中"),
        }
    }
}

impl std::error::Error for EditError {}

/// API 调用错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    BadResponse {
        endpoint: String,
        code: Option<u64>,
        message: Option<String>,
    },
    /// API 返回空结果
    EmptyResponse { endpoint: String },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { endpoint, source } => {
                write!(f, "API请求失败 ({}): {}", endpoint, source)
            }
            ApiError::BadResponse {
                endpoint,
                code,
                message,
            } => {
                write!(
                    f,
                    "API返回错误响应 ({}): code={:?}, message={:?}",
                    endpoint, code, message
                )
            }
            ApiError::EmptyResponse { endpoint } => {
                write!(f, "API返回空结果: {}", endpoint)
            }
            ApiError::JsonParseFailed { source } => write!(f, "JSON解析失败: {}", source),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    DirectoryNotFound { path: String },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        AppError::Edit(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建索引越界错误
    pub fn invalid_index(index: usize, max_index: usize) -> Self {
        AppError::Edit(EditError::InvalidIndex { index, max_index })
    }

    /// 创建未知章节错误
    pub fn unknown_section(id: impl Into<String>) -> Self {
        AppError::Edit(EditError::UnknownSection { id: id.into() })
    }

    /// 创建未知题目错误
    pub fn unknown_question(id: impl Into<String>) -> Self {
        AppError::Edit(EditError::UnknownQuestion { id: id.into() })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建API错误响应
    pub fn bad_response(
        endpoint: impl Into<String>,
        code: Option<u64>,
        message: Option<String>,
    ) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            code,
            message,
        })
    }

    /// 创建API空结果错误
    pub fn empty_response(endpoint: impl Into<String>) -> Self {
        AppError::Api(ApiError::EmptyResponse {
            endpoint: endpoint.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
