use crate::core::fields::{self, Field, ValueTree};
use crate::core::links::LinkBuilder;
use crate::core::loader::Loaded;
use crate::core::schema::Schema;
use crate::domain::ports::RouteResolver;
use crate::utils::error::{ApiError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// 依結構描述將已載入的實體編組成值樹。純函式，不做 I/O
#[derive(Clone)]
pub struct Marshaller {
    links: LinkBuilder,
}

impl Marshaller {
    pub fn new(resolver: Arc<dyn RouteResolver>) -> Self {
        Self {
            links: LinkBuilder::new(resolver),
        }
    }

    pub fn link_builder(&self) -> &LinkBuilder {
        &self.links
    }

    /// 任何欄位失敗都會中止整個物件，不輸出部分結果
    pub fn marshal(&self, schema: &Schema, object: &Loaded) -> Result<ValueTree> {
        let mut tree = Map::with_capacity(schema.len());

        for (key, field) in schema.fields() {
            let value = self
                .render_field(key, field, object)
                .map_err(|err| annotate(key, object, err))?;
            tree.insert(key.to_string(), value);
        }

        Ok(Value::Object(tree))
    }

    pub fn marshal_many(&self, schema: &Schema, objects: &[Loaded]) -> Result<Vec<ValueTree>> {
        objects
            .iter()
            .map(|object| self.marshal(schema, object))
            .collect()
    }

    fn render_field(&self, key: &str, field: &Field, object: &Loaded) -> Result<ValueTree> {
        let entity = object.entity();

        match field {
            Field::Attribute { kind, .. } => {
                fields::render_attribute(field.source_name(key), *kind, entity)
            }
            Field::Enum { .. } => fields::render_enum(field.source_name(key), entity),
            Field::Link { resource, rel } => Ok(self
                .links
                .build_link(*resource, *rel, entity)?
                .into_tree()),
            Field::Nested { schema, .. } => {
                let relation = field.source_name(key);
                let related =
                    object
                        .relation(relation)
                        .ok_or_else(|| ApiError::MissingAttribute {
                            attribute: relation.to_string(),
                            object: entity.identity(),
                        })?;
                Ok(Value::Array(self.marshal_many(schema, related)?))
            }
        }
    }
}

/// 內層失敗已標註過欄位與物件時原樣傳遞，只標註最深處的失敗點
fn annotate(field: &str, object: &Loaded, err: ApiError) -> ApiError {
    match err {
        ApiError::Marshal { .. } => err,
        other => ApiError::Marshal {
            field: field.to_string(),
            object: object.entity().identity(),
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::Rel;
    use crate::core::routes::{ResourceType, RouteTable};
    use crate::core::schema;
    use crate::domain::model::{Project, SecurityLevel, User};
    use serde_json::json;

    fn marshaller() -> Marshaller {
        Marshaller::new(Arc::new(RouteTable::standard()))
    }

    fn user(username: &str, uid: i64) -> User {
        User {
            username: username.to_string(),
            uid,
            farm_user: false,
        }
    }

    fn hgi() -> Loaded {
        Loaded::new(Project {
            name: "hgi".to_string(),
            gid: 1234,
            sec_level: SecurityLevel::Public,
        })
        .with_relation("owners", vec![Loaded::new(user("alice", 1001))])
        .with_relation(
            "users",
            vec![Loaded::new(user("alice", 1001)), Loaded::new(user("bob", 1002))],
        )
    }

    #[test]
    fn test_marshal_project_detail() {
        let tree = marshaller().marshal(&schema::project_detail(), &hgi()).unwrap();

        assert_eq!(
            tree,
            json!({
                "project_name": "hgi",
                "link": {"rel": "self", "href": "/projects/hgi", "description": "hgi"},
                "gid": 1234,
                "sec_level": {"name": "PUBLIC", "value": "public", "description": "Publicly readable"},
                "owners": [
                    {"username": "alice", "link": {"rel": "x-owner", "href": "/users/alice", "description": "alice"}}
                ],
                "members": [
                    {"username": "alice", "link": {"rel": "x-member", "href": "/users/alice", "description": "alice"}},
                    {"username": "bob", "link": {"rel": "x-member", "href": "/users/bob", "description": "bob"}}
                ]
            })
        );
    }

    #[test]
    fn test_field_order_is_preserved() {
        let tree = marshaller().marshal(&schema::project_detail(), &hgi()).unwrap();
        let keys: Vec<&String> = tree.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["project_name", "link", "gid", "sec_level", "owners", "members"]
        );
    }

    #[test]
    fn test_self_link_round_trips_through_route_table() {
        let routes = Arc::new(RouteTable::standard());
        let marshaller = Marshaller::new(routes.clone());

        let tree = marshaller.marshal(&schema::project_list(), &hgi()).unwrap();
        assert_eq!(tree["link"]["rel"], "self");

        let href = tree["link"]["href"].as_str().unwrap();
        let (resource, params) = routes.recognize(href).unwrap();
        assert_eq!(resource, ResourceType::Project);
        assert_eq!(params, vec![("name".to_string(), "hgi".to_string())]);
    }

    #[test]
    fn test_marshal_is_idempotent() {
        let marshaller = marshaller();
        let schema = schema::project_detail();
        let object = hgi();

        let first = marshaller.marshal(&schema, &object).unwrap();
        let second = marshaller.marshal(&schema, &object).unwrap();
        assert_eq!(first, second);
        assert_eq!(object, hgi());
    }

    #[test]
    fn test_marshal_user_detail() {
        let alice = Loaded::new(User {
            username: "alice".to_string(),
            uid: 1001,
            farm_user: true,
        })
        .with_relation(
            "memberof_projects",
            vec![Loaded::new(Project {
                name: "hgi".to_string(),
                gid: 1234,
                sec_level: SecurityLevel::Public,
            })],
        )
        .with_relation("ownerof_projects", vec![]);

        let tree = marshaller().marshal(&schema::user_detail(), &alice).unwrap();

        assert_eq!(tree["uid"], 1001);
        assert_eq!(tree["farm_user"], true);
        assert_eq!(tree["link"]["href"], "/users/alice");
        assert_eq!(
            tree["memberof_projects"],
            json!([{
                "project_name": "hgi",
                "link": {"rel": "x-member-of", "href": "/projects/hgi", "description": "hgi"}
            }])
        );
        assert_eq!(tree["ownerof_projects"], json!([]));
    }

    #[test]
    fn test_missing_relation_aborts_whole_object() {
        let object = Loaded::new(Project {
            name: "hgi".to_string(),
            gid: 1234,
            sec_level: SecurityLevel::Public,
        });

        let err = marshaller()
            .marshal(&schema::project_detail(), &object)
            .unwrap_err();

        match err {
            ApiError::Marshal { field, object, source } => {
                assert_eq!(field, "owners");
                assert_eq!(object, "project 'hgi'");
                assert!(matches!(*source, ApiError::MissingAttribute { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_failure_names_innermost_field() {
        // 內層結構描述要求使用者沒有的屬性
        let schema = Schema::new().field(
            "owners",
            Field::nested(
                Schema::new()
                    .field("username", Field::string())
                    .field("gid", Field::integer()),
            ),
        );

        let err = marshaller().marshal(&schema, &hgi()).unwrap_err();
        match err {
            ApiError::Marshal { field, object, .. } => {
                assert_eq!(field, "gid");
                assert_eq!(object, "user 'alice'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_link_to_unrouted_resource_fails() {
        let marshaller = Marshaller::new(Arc::new(
            RouteTable::new().with_route(ResourceType::Project, "/projects/{name}"),
        ));
        let schema = Schema::new().field("link", Field::link(ResourceType::User, Rel::SelfLink));

        let err = marshaller.marshal(&schema, &hgi()).unwrap_err();
        match err {
            ApiError::Marshal { source, .. } => {
                assert!(matches!(*source, ApiError::UnresolvableRoute { .. }))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_marshal_many_keeps_sequence_order() {
        let objects = vec![
            Loaded::new(Project {
                name: "zeta".to_string(),
                gid: 2,
                sec_level: SecurityLevel::Private,
            }),
            Loaded::new(Project {
                name: "alpha".to_string(),
                gid: 1,
                sec_level: SecurityLevel::Restricted,
            }),
        ];

        let trees = marshaller()
            .marshal_many(&schema::project_list(), &objects)
            .unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0]["project_name"], "zeta");
        assert_eq!(trees[1]["sec_level"]["description"], "Readable by project members");
    }
}
