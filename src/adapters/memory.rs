use crate::domain::model::{Association, Entity, Project, SecurityLevel, User};
use crate::domain::ports::Directory;
use crate::utils::error::{ApiError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// 目錄種子檔格式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub projects: Vec<ProjectSeed>,
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSeed {
    pub name: String,
    pub gid: i64,
    pub sec_level: SecurityLevel,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

/// 記憶體內的目錄。每個關聯只以 (專案, 使用者) 存一次，兩端視圖都由它導出
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    projects: BTreeMap<String, Project>,
    users: BTreeMap<String, User>,
    ownership: BTreeSet<(String, String)>,
    membership: BTreeSet<(String, String)>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 TOML 種子檔載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ApiError::IoError)?;
        let directory = Self::from_toml_str(&content)?;
        tracing::info!(
            "📂 Loaded directory seed from {}: {} projects, {} users",
            path.as_ref().display(),
            directory.projects.len(),
            directory.users.len()
        );
        Ok(directory)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let seed: DirectorySeed = toml::from_str(content).map_err(|e| ApiError::DirectoryError {
            message: format!("invalid directory seed: {}", e),
        })?;
        Self::from_seed(seed)
    }

    pub fn from_seed(seed: DirectorySeed) -> Result<Self> {
        let mut directory = Self::new();

        for user in seed.users {
            if directory.users.contains_key(&user.username) {
                return Err(ApiError::DirectoryError {
                    message: format!("duplicate username '{}'", user.username),
                });
            }
            directory.insert_user(user);
        }

        for project in &seed.projects {
            if directory.projects.contains_key(&project.name) {
                return Err(ApiError::DirectoryError {
                    message: format!("duplicate project name '{}'", project.name),
                });
            }
            directory.insert_project(Project {
                name: project.name.clone(),
                gid: project.gid,
                sec_level: project.sec_level,
            });
        }

        for project in &seed.projects {
            for owner in &project.owners {
                directory.add_owner(&project.name, owner)?;
            }
            for member in &project.members {
                directory.add_member(&project.name, member)?;
            }
        }

        Ok(directory)
    }

    pub fn insert_project(&mut self, project: Project) {
        self.projects.insert(project.name.clone(), project);
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.username.clone(), user);
    }

    pub fn add_owner(&mut self, project: &str, username: &str) -> Result<()> {
        let pair = self.association_pair(project, username)?;
        self.ownership.insert(pair);
        Ok(())
    }

    pub fn add_member(&mut self, project: &str, username: &str) -> Result<()> {
        let pair = self.association_pair(project, username)?;
        self.membership.insert(pair);
        Ok(())
    }

    fn association_pair(&self, project: &str, username: &str) -> Result<(String, String)> {
        if !self.projects.contains_key(project) {
            return Err(ApiError::DirectoryError {
                message: format!("unknown project '{}'", project),
            });
        }
        if !self.users.contains_key(username) {
            return Err(ApiError::DirectoryError {
                message: format!("unknown user '{}' in project '{}'", username, project),
            });
        }
        Ok((project.to_string(), username.to_string()))
    }

    fn pairs(&self, association: Association) -> &BTreeSet<(String, String)> {
        match association {
            Association::Ownership => &self.ownership,
            Association::Membership => &self.membership,
        }
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_project(&self, name: &str) -> Result<Option<Project>> {
        Ok(self.projects.get(name).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.values().cloned().collect())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.get(username).cloned())
    }

    async fn load_relation(&self, entity: &Entity, relation: &str) -> Result<Vec<Entity>> {
        let association =
            entity
                .association(relation)
                .ok_or_else(|| ApiError::MissingAttribute {
                    attribute: relation.to_string(),
                    object: entity.identity(),
                })?;
        let pairs = self.pairs(association);

        let related = match entity {
            Entity::Project(project) => pairs
                .iter()
                .filter(|(name, _)| *name == project.name)
                .filter_map(|(_, username)| self.users.get(username))
                .cloned()
                .map(Entity::User)
                .collect(),
            Entity::User(user) => pairs
                .iter()
                .filter(|(_, username)| *username == user.username)
                .filter_map(|(name, _)| self.projects.get(name))
                .cloned()
                .map(Entity::Project)
                .collect(),
        };

        Ok(related)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"
[[users]]
username = "alice"
uid = 1001

[[users]]
username = "bob"
uid = 1002
farm_user = true

[[projects]]
name = "hgi"
gid = 1234
sec_level = "public"
owners = ["alice"]
members = ["alice", "bob"]

[[projects]]
name = "archive"
gid = 1300
sec_level = "private"
owners = ["bob"]
"#;

    fn names(entities: Vec<Entity>) -> Vec<String> {
        entities.iter().map(|e| e.to_string()).collect()
    }

    #[tokio::test]
    async fn test_seed_parsing() {
        let directory = InMemoryDirectory::from_toml_str(SEED).unwrap();

        let projects = directory.list_projects().await.unwrap();
        assert_eq!(
            projects.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["archive", "hgi"]
        );

        let bob = directory.find_user("bob").await.unwrap().unwrap();
        assert!(bob.farm_user);
        assert!(directory.find_project("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_relations_are_two_views_of_one_association() {
        let directory = InMemoryDirectory::from_toml_str(SEED).unwrap();
        let hgi = Entity::from(directory.find_project("hgi").await.unwrap().unwrap());
        let bob = Entity::from(directory.find_user("bob").await.unwrap().unwrap());

        assert_eq!(names(directory.load_relation(&hgi, "owners").await.unwrap()), vec!["alice"]);
        assert_eq!(
            names(directory.load_relation(&hgi, "users").await.unwrap()),
            vec!["alice", "bob"]
        );
        assert_eq!(
            names(directory.load_relation(&bob, "memberof_projects").await.unwrap()),
            vec!["hgi"]
        );
        assert_eq!(
            names(directory.load_relation(&bob, "ownerof_projects").await.unwrap()),
            vec!["archive"]
        );
    }

    #[tokio::test]
    async fn test_unknown_relation_is_missing_attribute() {
        let directory = InMemoryDirectory::from_toml_str(SEED).unwrap();
        let hgi = Entity::from(directory.find_project("hgi").await.unwrap().unwrap());

        let err = directory.load_relation(&hgi, "members").await.unwrap_err();
        assert!(matches!(err, ApiError::MissingAttribute { .. }));
    }

    #[test]
    fn test_seed_rejects_unknown_user() {
        let seed = r#"
[[projects]]
name = "hgi"
gid = 1234
sec_level = "public"
owners = ["mallory"]
"#;
        let err = InMemoryDirectory::from_toml_str(seed).unwrap_err();
        assert!(err.to_string().contains("unknown user 'mallory'"));
    }

    #[test]
    fn test_seed_rejects_duplicates() {
        let seed = r#"
[[users]]
username = "alice"
uid = 1

[[users]]
username = "alice"
uid = 2
"#;
        let err = InMemoryDirectory::from_toml_str(seed).unwrap_err();
        assert!(err.to_string().contains("duplicate username 'alice'"));
    }

    #[test]
    fn test_invalid_security_level() {
        let seed = r#"
[[projects]]
name = "hgi"
gid = 1234
sec_level = "secret"
"#;
        assert!(InMemoryDirectory::from_toml_str(seed).is_err());
    }
}
