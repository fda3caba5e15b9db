use crate::core::fields::Field;
use crate::core::schema::Schema;
use crate::domain::model::Entity;
use crate::domain::ports::Directory;
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

/// 已預先載入所需關聯的實體
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    entity: Entity,
    relations: BTreeMap<String, Vec<Loaded>>,
}

impl Loaded {
    pub fn new(entity: impl Into<Entity>) -> Self {
        Self {
            entity: entity.into(),
            relations: BTreeMap::new(),
        }
    }

    pub fn with_relation(mut self, relation: &str, related: Vec<Loaded>) -> Self {
        self.relations.insert(relation.to_string(), related);
        self
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn relation(&self, relation: &str) -> Option<&[Loaded]> {
        self.relations.get(relation).map(Vec::as_slice)
    }
}

type CompleteFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// 依結構描述中的巢狀欄位，遞迴載入編組時需要的所有關聯
pub async fn load(directory: &dyn Directory, schema: &Schema, entity: Entity) -> Result<Loaded> {
    let mut loaded = Loaded::new(entity);
    complete(directory, schema, &mut loaded).await?;
    Ok(loaded)
}

/// 補齊結構描述需要但尚未載入的關聯。同一關聯只查詢一次，
/// 已載入的子實體仍會依每個內層結構描述往下補齊
fn complete<'a>(
    directory: &'a dyn Directory,
    schema: &'a Schema,
    loaded: &'a mut Loaded,
) -> CompleteFuture<'a> {
    Box::pin(async move {
        for (name, field) in schema.fields() {
            let Field::Nested { schema: inner, .. } = field else {
                continue;
            };

            let relation = field.source_name(name);
            if !loaded.relations.contains_key(relation) {
                let related = directory.load_relation(&loaded.entity, relation).await?;
                tracing::debug!(
                    "🔗 Loaded {} '{}' entries for {}",
                    related.len(),
                    relation,
                    loaded.entity.identity()
                );
                loaded.relations.insert(
                    relation.to_string(),
                    related.into_iter().map(Loaded::new).collect(),
                );
            }

            if let Some(children) = loaded.relations.get_mut(relation) {
                for child in children.iter_mut() {
                    complete(directory, inner, child).await?;
                }
            }
        }

        Ok(())
    })
}

pub async fn load_many(
    directory: &dyn Directory,
    schema: &Schema,
    entities: Vec<Entity>,
) -> Result<Vec<Loaded>> {
    let mut loaded = Vec::with_capacity(entities.len());
    for entity in entities {
        loaded.push(load(directory, schema, entity).await?);
    }
    Ok(loaded)
}
