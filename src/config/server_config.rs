use crate::utils::error::{ApiError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub directory: DirectorySettings,
    pub links: LinkSettings,
    pub templates: TemplateSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    /// 目錄種子檔；未設定時以空目錄啟動
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    /// 設定後連結輸出為絕對 URL
    pub external_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// 取代內建 XHTML 模板
    pub xhtml: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub verbose: bool,
    pub json: bool,
}

impl ServerConfig {
    /// 未指定設定檔時依序讀取的位置，後者覆蓋前者
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from("/etc/hgi-project.toml")];
        if let Ok(home) = std::env::var("HOME") {
            locations.push(Path::new(&home).join(".hgi-project.toml"));
        }
        locations.push(PathBuf::from("hgi-project.toml"));
        locations
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ApiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ApiError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 依序合併存在的設定檔；一個都沒有時使用預設值
    pub fn load_layered(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();

        for path in paths {
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(path).map_err(ApiError::IoError)?;
            let processed_content = Self::substitute_env_vars(&content)?;
            let layer: toml::Table =
                toml::from_str(&processed_content).map_err(|e| ApiError::ConfigError {
                    message: format!("TOML parsing error in {}: {}", path.display(), e),
                })?;

            tracing::debug!("📁 Merging configuration from {}", path.display());
            merge_tables(&mut merged, layer);
        }

        let serialized = toml::to_string(&merged).map_err(|e| ApiError::ConfigError {
            message: format!("TOML merge error: {}", e),
        })?;
        toml::from_str(&serialized).map_err(|e| ApiError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HGIP_PORT})；未定義的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ApiError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn external_base_url(&self) -> Result<Option<Url>> {
        self.links
            .external_base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| ApiError::InvalidConfigValueError {
                    field: "links.external_base_url".to_string(),
                    value: raw.to_string(),
                    reason: format!("Invalid URL format: {}", e),
                })
            })
            .transpose()
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_host("server.host", &self.server.host)?;
        validation::validate_port("server.port", self.server.port)?;

        if let Some(seed_file) = &self.directory.seed_file {
            validation::validate_file("directory.seed_file", seed_file, &["toml"])?;
        }

        if let Some(template) = &self.templates.xhtml {
            validation::validate_file("templates.xhtml", template, &["hbs", "xhtml", "html"])?;
        }

        if let Some(base_url) = &self.links.external_base_url {
            validation::validate_base_url("links.external_base_url", base_url)?;
        }

        Ok(())
    }
}
