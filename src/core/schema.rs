use crate::core::fields::{Field, Rel};
use crate::core::routes::ResourceType;

/// 有序的「輸出欄位名稱 -> 欄位描述」對照
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, Field)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增欄位；已存在的名稱保留原位置並替換描述
    pub fn field(mut self, name: &str, field: Field) -> Self {
        match self.fields.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = field,
            None => self.fields.push((name.to_string(), field)),
        }
        self
    }

    /// 以另一份結構描述的欄位擴充
    pub fn extend(self, other: &Schema) -> Self {
        other
            .fields
            .iter()
            .fold(self, |schema, (name, field)| schema.field(name, field.clone()))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn project_core() -> Schema {
    Schema::new().field("project_name", Field::string().attribute("name"))
}

pub fn user_core() -> Schema {
    Schema::new().field("username", Field::string())
}

fn user_entry(rel: Rel) -> Schema {
    user_core().field("link", Field::link(ResourceType::User, rel))
}

fn project_entry(rel: Rel) -> Schema {
    project_core().field("link", Field::link(ResourceType::Project, rel))
}

pub fn project_detail() -> Schema {
    project_core().extend(
        &Schema::new()
            .field("link", Field::link(ResourceType::Project, Rel::SelfLink))
            .field("gid", Field::integer())
            .field("sec_level", Field::enumeration())
            .field("owners", Field::nested(user_entry(Rel::Owner)))
            .field(
                "members",
                Field::nested(user_entry(Rel::Member)).attribute("users"),
            ),
    )
}

/// 列表不含關聯，保持回應精簡
pub fn project_list() -> Schema {
    project_core()
        .field("gid", Field::integer())
        .field("sec_level", Field::enumeration())
        .field("link", Field::link(ResourceType::Project, Rel::SelfLink))
}

pub fn user_detail() -> Schema {
    user_core()
        .field("link", Field::link(ResourceType::User, Rel::SelfLink))
        .field("uid", Field::integer())
        .field("farm_user", Field::boolean())
        .field(
            "memberof_projects",
            Field::nested(project_entry(Rel::MemberOf)),
        )
        .field(
            "ownerof_projects",
            Field::nested(project_entry(Rel::OwnerOf)),
        )
}

/// 各端點使用的結構描述，啟動時建立一次
#[derive(Debug, Clone)]
pub struct Schemas {
    pub project_detail: Schema,
    pub project_list: Schema,
    pub user_detail: Schema,
}

impl Default for Schemas {
    fn default() -> Self {
        Self {
            project_detail: project_detail(),
            project_list: project_list(),
            user_detail: user_detail(),
        }
    }
}
