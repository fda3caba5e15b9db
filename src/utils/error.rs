use axum::http::StatusCode;
use thiserror::Error;

/// 406 回應的固定訊息
pub const NOT_ACCEPTABLE_MESSAGE: &str =
    "Your client indicated that it does not accept any of the representations we support.";

/// 5xx 回應對外的通用訊息，不洩漏內部細節
pub const INTERNAL_ERROR_MESSAGE: &str = "The server encountered an internal error and was unable to complete your request. Either the server is overloaded or there is an error in the application.";

pub const NOT_FOUND_MESSAGE: &str = "The requested URL was not found on the server. If you entered the URL manually please check your spelling and try again.";

pub const METHOD_NOT_ALLOWED_MESSAGE: &str =
    "The method is not allowed for the requested URL.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{}", NOT_ACCEPTABLE_MESSAGE)]
    NotAcceptable,

    #[error("{}", METHOD_NOT_ALLOWED_MESSAGE)]
    MethodNotAllowed,

    #[error("{message}")]
    NotImplemented { message: String },

    #[error("Attribute '{attribute}' is missing on {object}")]
    MissingAttribute { attribute: String, object: String },

    #[error("Attribute '{attribute}' of {object} cannot be rendered as {expected}")]
    InvalidAttribute {
        attribute: String,
        object: String,
        expected: String,
    },

    #[error("Cannot resolve route for '{resource}': {reason}")]
    UnresolvableRoute { resource: String, reason: String },

    #[error("Failed to marshal field '{field}' of {object}: {source}")]
    Marshal {
        field: String,
        object: String,
        #[source]
        source: Box<ApiError>,
    },

    #[error("Directory error: {message}")]
    DirectoryError { message: String },

    #[error("Template error: {0}")]
    TemplateError(#[from] Box<handlebars::TemplateError>),

    #[error("Render error: {0}")]
    RenderError(#[from] Box<handlebars::RenderError>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 用戶端請求問題 (4xx)
    Client,
    /// 結構定義與資料不一致、路由表不一致
    Schema,
    /// 外部協作者 (目錄、檔案系統)
    Collaborator,
    /// 啟動配置
    Configuration,
    /// 尚未實作的功能
    Unimplemented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ApiError {
    pub fn project_not_found(name: &str) -> Self {
        ApiError::NotFound {
            message: format!("Project {} doesn't exist.", name),
        }
    }

    pub fn user_not_found(username: &str) -> Self {
        ApiError::NotFound {
            message: format!("User {} doesn't exist.", username),
        }
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        ApiError::NotImplemented {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::NotFound { .. } | ApiError::NotAcceptable | ApiError::MethodNotAllowed => {
                ErrorCategory::Client
            }
            ApiError::NotImplemented { .. } => ErrorCategory::Unimplemented,
            ApiError::MissingAttribute { .. }
            | ApiError::InvalidAttribute { .. }
            | ApiError::UnresolvableRoute { .. }
            | ApiError::Marshal { .. }
            | ApiError::TemplateError(_)
            | ApiError::RenderError(_)
            | ApiError::SerializationError(_) => ErrorCategory::Schema,
            ApiError::DirectoryError { .. } | ApiError::IoError(_) => ErrorCategory::Collaborator,
            ApiError::ConfigError { .. }
            | ApiError::MissingConfigError { .. }
            | ApiError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client => ErrorSeverity::Low,
            ErrorCategory::Unimplemented => ErrorSeverity::Medium,
            ErrorCategory::Schema | ErrorCategory::Collaborator => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 回應本體中的 `message`：5xx 一律使用通用訊息，`NotImplemented` 例外
    pub fn user_friendly_message(&self) -> String {
        match self {
            ApiError::NotFound { message } | ApiError::NotImplemented { message } => {
                message.clone()
            }
            ApiError::NotAcceptable => NOT_ACCEPTABLE_MESSAGE.to_string(),
            ApiError::MethodNotAllowed => METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            ApiError::ConfigError { .. }
            | ApiError::MissingConfigError { .. }
            | ApiError::InvalidConfigValueError { .. } => self.to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Client => "Check the request URL and the Accept header",
            ErrorCategory::Unimplemented => "This operation is not available yet",
            ErrorCategory::Schema => {
                "Representation schemas and the route table disagree with the domain model; check the server logs"
            }
            ErrorCategory::Collaborator => "Check the directory seed file and that it is readable",
            ErrorCategory::Configuration => "Fix the configuration file or command line options",
        }
    }
}

impl From<handlebars::TemplateError> for ApiError {
    fn from(err: handlebars::TemplateError) -> Self {
        ApiError::TemplateError(Box::new(err))
    }
}

impl From<handlebars::RenderError> for ApiError {
    fn from(err: handlebars::RenderError) -> Self {
        ApiError::RenderError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
