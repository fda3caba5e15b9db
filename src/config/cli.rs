use crate::config::server_config::ServerConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "hgip")]
#[command(about = "HGI project and user directory over HTTP")]
pub struct CliConfig {
    #[arg(long, short, help = "Configuration file (skips the default locations)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to bind")]
    pub host: Option<String>,

    #[arg(long, short, help = "Port to listen on")]
    pub port: Option<u16>,

    #[arg(long, help = "TOML seed for the in-memory directory")]
    pub seed_file: Option<String>,

    #[arg(long, help = "Render links as absolute URLs under this base")]
    pub base_url: Option<String>,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 讀取設定檔後以命令列參數覆蓋
    pub fn load_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::load_layered(&ServerConfig::default_locations())?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(seed_file) = &self.seed_file {
            config.directory.seed_file = Some(seed_file.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.links.external_base_url = Some(base_url.clone());
        }
        config.logging.verbose |= self.verbose;
        config.logging.json |= self.json_logs;
    }
}
