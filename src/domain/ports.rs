use crate::core::routes::ResourceType;
use crate::domain::model::{Entity, Project, User};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 持久層協作者：提供專案、使用者與其關聯
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_project(&self, name: &str) -> Result<Option<Project>>;

    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// 載入 `entity` 的指定關聯（例如 `owners`、`memberof_projects`）
    async fn load_relation(&self, entity: &Entity, relation: &str) -> Result<Vec<Entity>>;
}

/// 反向路由：由資源類型與識別參數產生 URL
pub trait RouteResolver: Send + Sync {
    fn resolve(&self, resource: ResourceType, params: &[(&str, String)]) -> Result<String>;
}
