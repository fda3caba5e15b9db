use serde::{Deserialize, Serialize};
use std::fmt;

/// 專案的安全等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Public,
    Restricted,
    Private,
}

impl SecurityLevel {
    pub fn name(&self) -> &'static str {
        match self {
            SecurityLevel::Public => "PUBLIC",
            SecurityLevel::Restricted => "RESTRICTED",
            SecurityLevel::Private => "PRIVATE",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            SecurityLevel::Public => "public",
            SecurityLevel::Restricted => "restricted",
            SecurityLevel::Private => "private",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SecurityLevel::Public => "Publicly readable",
            SecurityLevel::Restricted => "Readable by project members",
            SecurityLevel::Private => "Readable by project owners only",
        }
    }

    pub fn as_enum_value(&self) -> EnumValue {
        EnumValue {
            name: self.name().to_string(),
            value: self.value().to_string(),
            description: self.description().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub gid: i64,
    pub sec_level: SecurityLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub uid: i64,
    #[serde(default)]
    pub farm_user: bool,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// 一個列舉值的三元組：名稱、原始值、描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: String,
    pub description: String,
}

/// 從實體讀出的屬性值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Enum(EnumValue),
}

/// 擁有權與成員資格兩種多對多關聯
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Association {
    Ownership,
    Membership,
}

/// 目錄中的任一實體
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Project(Project),
    User(User),
}

impl Entity {
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Project(_) => "project",
            Entity::User(_) => "user",
        }
    }

    /// 依屬性名稱讀值；關聯欄位不在此列
    pub fn attribute(&self, name: &str) -> Option<AttrValue> {
        match self {
            Entity::Project(project) => match name {
                "name" => Some(AttrValue::Str(project.name.clone())),
                "gid" => Some(AttrValue::Int(project.gid)),
                "sec_level" => Some(AttrValue::Enum(project.sec_level.as_enum_value())),
                _ => None,
            },
            Entity::User(user) => match name {
                "username" => Some(AttrValue::Str(user.username.clone())),
                "uid" => Some(AttrValue::Int(user.uid)),
                "farm_user" => Some(AttrValue::Bool(user.farm_user)),
                _ => None,
            },
        }
    }

    /// 關聯名稱對應的底層關聯；兩端共用同一組關聯
    pub fn association(&self, relation: &str) -> Option<Association> {
        match (self, relation) {
            (Entity::Project(_), "owners") => Some(Association::Ownership),
            (Entity::Project(_), "users") => Some(Association::Membership),
            (Entity::User(_), "ownerof_projects") => Some(Association::Ownership),
            (Entity::User(_), "memberof_projects") => Some(Association::Membership),
            _ => None,
        }
    }

    /// 反向路由所需的識別參數
    pub fn identity_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Entity::Project(project) => vec![("name", project.name.clone())],
            Entity::User(user) => vec![("username", user.username.clone())],
        }
    }

    /// 錯誤訊息與日誌中使用的識別字串，例如 `project 'hgi'`
    pub fn identity(&self) -> String {
        format!("{} '{}'", self.kind(), self)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Project(project) => project.fmt(f),
            Entity::User(user) => user.fmt(f),
        }
    }
}

impl From<Project> for Entity {
    fn from(project: Project) -> Self {
        Entity::Project(project)
    }
}

impl From<User> for Entity {
    fn from(user: User) -> Self {
        Entity::User(user)
    }
}
