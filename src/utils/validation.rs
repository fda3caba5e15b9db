use crate::utils::error::{ApiError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> ApiError {
    ApiError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 綁定位址不可為空，也不可含空白
pub fn validate_host(field: &str, host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(invalid(field, host, "Host cannot be empty"));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(invalid(field, host, "Host cannot contain whitespace"));
    }
    Ok(())
}

/// 0 代表由系統指派，伺服器設定中不接受
pub fn validate_port(field: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(invalid(field, &port.to_string(), "Port must be between 1 and 65535"));
    }
    Ok(())
}

/// 檔案路徑需可用且副檔名在允許清單中
pub fn validate_file(field: &str, path: &str, extensions: &[&str]) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }

    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(extension) if extensions.contains(&extension) => Ok(()),
        Some(extension) => Err(invalid(
            field,
            path,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                extensions.join(", ")
            ),
        )),
        None => Err(invalid(field, path, "File has no extension")),
    }
}

/// 連結基底：http(s)、需有主機、不可帶查詢字串或片段
pub fn validate_base_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(invalid(field, raw, format!("Unsupported URL scheme: {}", scheme)));
        }
    }
    if url.host_str().is_none() {
        return Err(invalid(field, raw, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(field, raw, "Base URL cannot carry a query or fragment"));
    }
    Ok(())
}
