use crate::core::fields::{Rel, ValueTree};
use crate::core::routes::ResourceType;
use crate::domain::model::Entity;
use crate::domain::ports::RouteResolver;
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    pub description: String,
}

impl Link {
    pub fn into_tree(self) -> ValueTree {
        json!({
            "rel": self.rel,
            "href": self.href,
            "description": self.description,
        })
    }
}

/// 以注入的反向路由建立關聯連結
#[derive(Clone)]
pub struct LinkBuilder {
    resolver: Arc<dyn RouteResolver>,
}

impl LinkBuilder {
    pub fn new(resolver: Arc<dyn RouteResolver>) -> Self {
        Self { resolver }
    }

    /// `description` 一律是實體的預設字串表示（專案名稱或使用者名稱）
    pub fn build_link(&self, resource: ResourceType, rel: Rel, entity: &Entity) -> Result<Link> {
        let href = self.resolver.resolve(resource, &entity.identity_params())?;

        Ok(Link {
            rel: rel.as_str().to_string(),
            href,
            description: entity.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::routes::RouteTable;
    use crate::domain::model::{Project, SecurityLevel, User};
    use crate::utils::error::ApiError;

    fn builder() -> LinkBuilder {
        LinkBuilder::new(Arc::new(RouteTable::standard()))
    }

    #[test]
    fn test_build_user_link() {
        let alice = Entity::from(User {
            username: "alice".to_string(),
            uid: 1001,
            farm_user: false,
        });

        let link = builder()
            .build_link(ResourceType::User, Rel::Owner, &alice)
            .unwrap();

        assert_eq!(
            link,
            Link {
                rel: "x-owner".to_string(),
                href: "/users/alice".to_string(),
                description: "alice".to_string(),
            }
        );
        assert_eq!(
            link.into_tree(),
            json!({"rel": "x-owner", "href": "/users/alice", "description": "alice"})
        );
    }

    #[test]
    fn test_link_to_wrong_resource_type_fails() {
        let hgi = Entity::from(Project {
            name: "hgi".to_string(),
            gid: 1234,
            sec_level: SecurityLevel::Private,
        });

        let err = builder()
            .build_link(ResourceType::User, Rel::SelfLink, &hgi)
            .unwrap_err();
        assert!(matches!(err, ApiError::UnresolvableRoute { .. }));
    }
}
