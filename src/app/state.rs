use crate::adapters::memory::InMemoryDirectory;
use crate::config::ServerConfig;
use crate::core::marshal::Marshaller;
use crate::core::negotiate::RendererRegistry;
use crate::core::render::{Renderer, XhtmlRenderer};
use crate::core::routes::RouteTable;
use crate::core::schema::Schemas;
use crate::domain::ports::{Directory, RouteResolver};
use crate::utils::error::Result;
use std::sync::Arc;

/// 處理器共用的唯讀狀態，啟動後不再變動
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn Directory>,
    pub marshaller: Arc<Marshaller>,
    pub renderers: Arc<RendererRegistry>,
    pub routes: Arc<RouteTable>,
    pub schemas: Arc<Schemas>,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn Directory>,
        routes: RouteTable,
        renderers: RendererRegistry,
    ) -> Self {
        let routes = Arc::new(routes);
        let resolver: Arc<dyn RouteResolver> = routes.clone();

        Self {
            directory,
            marshaller: Arc::new(Marshaller::new(resolver)),
            renderers: Arc::new(renderers),
            routes,
            schemas: Arc::new(Schemas::default()),
        }
    }
}

/// 依配置組裝目錄、路由表與編碼器
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let directory = match &config.directory.seed_file {
        Some(seed_file) => InMemoryDirectory::from_file(seed_file)?,
        None => {
            tracing::warn!("⚠️ No directory seed configured, starting with an empty directory");
            InMemoryDirectory::new()
        }
    };

    let mut routes = RouteTable::standard();
    if let Some(base_url) = config.external_base_url()? {
        tracing::info!("🔗 Rendering links under {}", base_url);
        routes = routes.with_base_url(base_url);
    }

    let xhtml: Arc<dyn Renderer> = match &config.templates.xhtml {
        Some(path) => Arc::new(XhtmlRenderer::from_template_file(path)?),
        None => Arc::new(XhtmlRenderer::new()?),
    };

    Ok(AppState::new(
        Arc::new(directory),
        routes,
        RendererRegistry::standard(xhtml),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::routes::ResourceType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_build_state_from_config() {
        let mut seed = NamedTempFile::new().unwrap();
        seed.write_all(
            b"[[projects]]\nname = \"hgi\"\ngid = 1234\nsec_level = \"public\"\n",
        )
        .unwrap();

        let mut config = ServerConfig::default();
        config.directory.seed_file = Some(seed.path().to_string_lossy().to_string());
        config.links.external_base_url = Some("https://hgip.example.org/api".to_string());

        let state = build_state(&config).unwrap();

        assert!(state.directory.find_project("hgi").await.unwrap().is_some());
        assert_eq!(
            state
                .routes
                .resolve(ResourceType::Project, &[("name", "hgi".to_string())])
                .unwrap(),
            "https://hgip.example.org/api/projects/hgi"
        );
        assert_eq!(
            state.renderers.media_types().collect::<Vec<_>>(),
            vec!["application/json", "text/plain", "application/xhtml+xml"]
        );
    }

    #[test]
    fn test_build_state_missing_seed_fails() {
        let mut config = ServerConfig::default();
        config.directory.seed_file = Some("/nonexistent/hgip/seed.toml".to_string());
        assert!(build_state(&config).is_err());
    }
}
