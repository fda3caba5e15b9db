use crate::domain::ports::RouteResolver;
use crate::utils::error::{ApiError, Result};
use std::fmt;
use url::Url;

/// 可被連結的資源類型（對應路由端點）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    ProjectList,
    Project,
    User,
}

impl ResourceType {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ResourceType::ProjectList => "projects",
            ResourceType::Project => "project",
            ResourceType::User => "user",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// 單一路由模板，例如 `/projects/{name}`
#[derive(Debug, Clone)]
pub struct Route {
    resource: ResourceType,
    template: String,
    segments: Vec<Segment>,
}

impl Route {
    fn new(resource: ResourceType, template: &str) -> Self {
        let segments = template
            .trim_start_matches('/')
            .split('/')
            .map(|segment| {
                match segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                {
                    Some(param) if !param.is_empty() => Segment::Param(param.to_string()),
                    _ => Segment::Literal(segment.to_string()),
                }
            })
            .collect();

        Self {
            resource,
            template: template.to_string(),
            segments,
        }
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// axum 的路徑語法 (`/projects/:name`)
    pub fn axum_path(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(s) => s.clone(),
                Segment::Param(p) => format!(":{}", p),
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    fn build_path(&self, params: &[(&str, String)]) -> std::result::Result<String, String> {
        let mut parts = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => parts.push(s.clone()),
                Segment::Param(name) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| value)
                        .ok_or_else(|| format!("missing parameter '{}'", name))?;
                    if value.is_empty() {
                        return Err(format!("parameter '{}' is empty", name));
                    }
                    parts.push(urlencoding::encode(value).into_owned());
                }
            }
        }

        Ok(format!("/{}", parts.join("/")))
    }

    fn recognize(&self, segments: &[&str]) -> Option<Vec<(String, String)>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (segment, actual) in self.segments.iter().zip(segments) {
            match segment {
                Segment::Literal(expected) if expected == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    let value = urlencoding::decode(actual).ok()?;
                    params.push((name.clone(), value.into_owned()));
                }
            }
        }
        Some(params)
    }
}

/// 路由表：同時供 axum 派送與反向路由使用
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    base_url: Option<Url>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目錄服務的標準路由。模板參數名稱必須與實體的識別屬性同名
    pub fn standard() -> Self {
        Self::new()
            .with_route(ResourceType::ProjectList, "/projects/")
            .with_route(ResourceType::Project, "/projects/{name}")
            .with_route(ResourceType::User, "/users/{username}")
    }

    pub fn with_route(mut self, resource: ResourceType, template: &str) -> Self {
        self.routes.retain(|route| route.resource != resource);
        self.routes.push(Route::new(resource, template));
        self
    }

    /// 設定外部基底 URL 後，產生的連結為絕對 URL
    pub fn with_base_url(mut self, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        self.base_url = Some(base);
        self
    }

    pub fn route(&self, resource: ResourceType) -> Option<&Route> {
        self.routes.iter().find(|route| route.resource == resource)
    }

    pub fn axum_path(&self, resource: ResourceType) -> Option<String> {
        self.route(resource).map(Route::axum_path)
    }

    /// 將連結解析回 (資源類型, 識別參數)
    pub fn recognize(&self, href: &str) -> Option<(ResourceType, Vec<(String, String)>)> {
        let path = match Url::parse(href) {
            Ok(url) => {
                let prefix = self
                    .base_url
                    .as_ref()
                    .map(|base| base.path().trim_end_matches('/').to_string())
                    .unwrap_or_default();
                url.path().strip_prefix(prefix.as_str())?.to_string()
            }
            Err(_) => href.split(['?', '#']).next().unwrap_or_default().to_string(),
        };

        let path = path.strip_prefix('/')?;
        let segments: Vec<&str> = path.split('/').collect();

        self.routes
            .iter()
            .find_map(|route| route.recognize(&segments).map(|params| (route.resource, params)))
    }
}

impl RouteResolver for RouteTable {
    fn resolve(&self, resource: ResourceType, params: &[(&str, String)]) -> Result<String> {
        let route = self
            .route(resource)
            .ok_or_else(|| ApiError::UnresolvableRoute {
                resource: resource.to_string(),
                reason: "no route registered".to_string(),
            })?;

        let path = route
            .build_path(params)
            .map_err(|reason| ApiError::UnresolvableRoute {
                resource: resource.to_string(),
                reason: format!("{} for template {}", reason, route.template),
            })?;

        match &self.base_url {
            Some(base) => base
                .join(path.trim_start_matches('/'))
                .map(|url| url.to_string())
                .map_err(|e| ApiError::UnresolvableRoute {
                    resource: resource.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(path),
        }
    }
}
