use crate::core::routes::ResourceType;
use crate::core::schema::Schema;
use crate::domain::model::{AttrValue, Entity};
use crate::utils::error::{ApiError, Result};
use serde_json::{json, Value};

/// 與表示法無關的巢狀值樹（映射、序列、純量），欄位順序即宣告順序
pub type ValueTree = Value;

/// 連結的關係標籤，固定詞彙
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rel {
    SelfLink,
    Owner,
    Member,
    OwnerOf,
    MemberOf,
}

impl Rel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rel::SelfLink => "self",
            Rel::Owner => "x-owner",
            Rel::Member => "x-member",
            Rel::OwnerOf => "x-owner-of",
            Rel::MemberOf => "x-member-of",
        }
    }
}

/// 屬性欄位可強制轉換的語意型別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Boolean,
}

impl ValueKind {
    fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
        }
    }
}

/// 單一輸出欄位的宣告式描述
#[derive(Debug, Clone)]
pub enum Field {
    /// 讀取屬性，可改用其他來源名稱並強制轉型
    Attribute {
        source: Option<String>,
        kind: Option<ValueKind>,
    },
    /// 讀取列舉屬性並輸出 `{name, value, description}`
    Enum { source: Option<String> },
    /// 輸出 `{rel, href, description}` 連結
    Link { resource: ResourceType, rel: Rel },
    /// 集合型關聯，逐一以內層結構描述編組
    Nested {
        source: Option<String>,
        schema: Schema,
    },
}

impl Field {
    pub fn raw() -> Self {
        Field::Attribute {
            source: None,
            kind: None,
        }
    }

    pub fn string() -> Self {
        Field::Attribute {
            source: None,
            kind: Some(ValueKind::String),
        }
    }

    pub fn integer() -> Self {
        Field::Attribute {
            source: None,
            kind: Some(ValueKind::Integer),
        }
    }

    pub fn boolean() -> Self {
        Field::Attribute {
            source: None,
            kind: Some(ValueKind::Boolean),
        }
    }

    pub fn enumeration() -> Self {
        Field::Enum { source: None }
    }

    pub fn link(resource: ResourceType, rel: Rel) -> Self {
        Field::Link { resource, rel }
    }

    pub fn nested(schema: Schema) -> Self {
        Field::Nested {
            source: None,
            schema,
        }
    }

    /// 從另一個來源屬性讀值（例如 `project_name` 讀 `name`）。
    /// 連結欄位沒有來源屬性，對它呼叫是結構描述的錯誤
    pub fn attribute(self, name: &str) -> Self {
        debug_assert!(
            !matches!(self, Field::Link { .. }),
            "link fields have no source attribute (got `{}`)",
            name
        );
        let name = Some(name.to_string());
        match self {
            Field::Attribute { kind, .. } => Field::Attribute { source: name, kind },
            Field::Enum { .. } => Field::Enum { source: name },
            Field::Nested { schema, .. } => Field::Nested {
                source: name,
                schema,
            },
            link @ Field::Link { .. } => link,
        }
    }

    /// 實際讀取的來源名稱
    pub fn source_name<'a>(&'a self, key: &'a str) -> &'a str {
        match self {
            Field::Attribute { source, .. }
            | Field::Enum { source }
            | Field::Nested { source, .. } => source.as_deref().unwrap_or(key),
            Field::Link { .. } => key,
        }
    }
}

fn read_attribute(source: &str, entity: &Entity) -> Result<AttrValue> {
    entity
        .attribute(source)
        .ok_or_else(|| ApiError::MissingAttribute {
            attribute: source.to_string(),
            object: entity.identity(),
        })
}

pub(crate) fn render_attribute(
    source: &str,
    kind: Option<ValueKind>,
    entity: &Entity,
) -> Result<ValueTree> {
    let value = read_attribute(source, entity)?;
    let invalid = |expected: ValueKind| ApiError::InvalidAttribute {
        attribute: source.to_string(),
        object: entity.identity(),
        expected: expected.as_str().to_string(),
    };

    let rendered = match (value, kind) {
        (AttrValue::Str(s), None | Some(ValueKind::String)) => Value::String(s),
        (AttrValue::Int(i), None | Some(ValueKind::Integer)) => Value::from(i),
        (AttrValue::Bool(b), None | Some(ValueKind::Boolean)) => Value::Bool(b),
        (AttrValue::Enum(e), None | Some(ValueKind::String)) => Value::String(e.value),

        (AttrValue::Int(i), Some(ValueKind::String)) => Value::String(i.to_string()),
        (AttrValue::Bool(b), Some(ValueKind::String)) => Value::String(b.to_string()),

        (AttrValue::Str(s), Some(ValueKind::Integer)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(ValueKind::Integer))?,
        (AttrValue::Bool(b), Some(ValueKind::Integer)) => Value::from(i64::from(b)),

        (AttrValue::Str(s), Some(ValueKind::Boolean)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" | "" => Value::Bool(false),
                _ => return Err(invalid(ValueKind::Boolean)),
            }
        }
        (AttrValue::Int(i), Some(ValueKind::Boolean)) => Value::Bool(i != 0),

        (AttrValue::Enum(_), Some(kind)) => return Err(invalid(kind)),
    };

    Ok(rendered)
}

pub(crate) fn render_enum(source: &str, entity: &Entity) -> Result<ValueTree> {
    match read_attribute(source, entity)? {
        AttrValue::Enum(e) => Ok(json!({
            "name": e.name,
            "value": e.value,
            "description": e.description,
        })),
        _ => Err(ApiError::InvalidAttribute {
            attribute: source.to_string(),
            object: entity.identity(),
            expected: "enumeration".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Project, SecurityLevel, User};

    fn project() -> Entity {
        Entity::from(Project {
            name: "hgi".to_string(),
            gid: 1234,
            sec_level: SecurityLevel::Public,
        })
    }

    fn user() -> Entity {
        Entity::from(User {
            username: "alice".to_string(),
            uid: 1001,
            farm_user: true,
        })
    }

    #[test]
    fn test_plain_attributes() {
        assert_eq!(render_attribute("name", Some(ValueKind::String), &project()).unwrap(), json!("hgi"));
        assert_eq!(render_attribute("gid", Some(ValueKind::Integer), &project()).unwrap(), json!(1234));
        assert_eq!(render_attribute("farm_user", None, &user()).unwrap(), json!(true));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(render_attribute("gid", Some(ValueKind::String), &project()).unwrap(), json!("1234"));
        assert_eq!(render_attribute("gid", Some(ValueKind::Boolean), &project()).unwrap(), json!(true));
        assert_eq!(render_attribute("farm_user", Some(ValueKind::Integer), &user()).unwrap(), json!(1));
        assert_eq!(render_attribute("sec_level", Some(ValueKind::String), &project()).unwrap(), json!("public"));
    }

    #[test]
    fn test_impossible_coercion_fails() {
        let err = render_attribute("name", Some(ValueKind::Integer), &project()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidAttribute { .. }));

        let err = render_attribute("sec_level", Some(ValueKind::Boolean), &project()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_missing_attribute_never_renders_null() {
        let err = render_attribute("uid", Some(ValueKind::Integer), &project()).unwrap_err();
        match err {
            ApiError::MissingAttribute { attribute, object } => {
                assert_eq!(attribute, "uid");
                assert_eq!(object, "project 'hgi'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_enum_triple() {
        let rendered = render_enum("sec_level", &project()).unwrap();
        assert_eq!(
            rendered,
            json!({"name": "PUBLIC", "value": "public", "description": "Publicly readable"})
        );

        assert!(render_enum("gid", &project()).is_err());
    }

    #[test]
    fn test_source_override() {
        let field = Field::string().attribute("name");
        assert_eq!(field.source_name("project_name"), "name");
        assert_eq!(Field::integer().source_name("gid"), "gid");
        assert_eq!(Rel::OwnerOf.as_str(), "x-owner-of");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "link fields have no source attribute")]
    fn test_source_override_on_link_is_rejected() {
        let _ = Field::link(ResourceType::Project, Rel::SelfLink).attribute("name");
    }
}
