use crate::app::response::{error_response, respond};
use crate::app::state::AppState;
use crate::core::loader;
use crate::core::render::Rendered;
use crate::domain::model::{Entity, Project, User};
use crate::utils::error::{ApiError, Result, NOT_FOUND_MESSAGE};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{ACCEPT, ALLOW};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

/// 寫入請求可帶的參數；目前只解析並記錄
#[derive(Debug, Default, Deserialize)]
pub struct WriteArgs {
    pub gid: Option<String>,
}

type PathParam = std::result::Result<Path<String>, PathRejection>;
type WriteQuery = std::result::Result<Query<WriteArgs>, QueryRejection>;

/// 非 UTF-8 的位元組以替代字元保留，標頭存在時不會被當成缺少
fn accept(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(ACCEPT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

/// 無法解碼的路徑參數視為不存在的資源
fn path_param(param: PathParam) -> Result<String> {
    param.map(|Path(value)| value).map_err(|rejection| {
        tracing::debug!("↩️ Rejected path parameter: {}", rejection);
        ApiError::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
        }
    })
}

fn write_args(query: WriteQuery) -> WriteArgs {
    query.map(|Query(args)| args).unwrap_or_else(|rejection| {
        tracing::warn!("⚠️ Ignoring malformed write arguments: {}", rejection);
        WriteArgs::default()
    })
}

pub async fn list_projects(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let accept = accept(&headers);
    let accept = accept.as_deref();
    let result = render_project_list(&state, accept).await;
    respond(&state.renderers, accept, result)
}

async fn render_project_list(state: &AppState, accept: Option<&str>) -> Result<Rendered> {
    // 先協商，避免為無法輸出的請求查詢目錄
    state.renderers.negotiate(accept)?;

    let schema = &state.schemas.project_list;
    let projects: Vec<Entity> = state
        .directory
        .list_projects()
        .await?
        .into_iter()
        .map(Entity::from)
        .collect();
    tracing::debug!("📋 Listing {} projects", projects.len());

    let loaded = loader::load_many(state.directory.as_ref(), schema, projects).await?;
    let trees = state.marshaller.marshal_many(schema, &loaded)?;
    state
        .renderers
        .render(accept, &Value::Array(trees), StatusCode::OK)
}

pub async fn get_project(
    State(state): State<AppState>,
    name: PathParam,
    headers: HeaderMap,
) -> Response {
    let accept = accept(&headers);
    let accept = accept.as_deref();
    let result = match path_param(name) {
        Ok(name) => render_project(&state, accept, &name).await,
        Err(err) => Err(err),
    };
    respond(&state.renderers, accept, result)
}

async fn render_project(state: &AppState, accept: Option<&str>, name: &str) -> Result<Rendered> {
    state.renderers.negotiate(accept)?;

    let project = find_project(state, name).await?;
    let schema = &state.schemas.project_detail;
    let loaded = loader::load(state.directory.as_ref(), schema, project.into()).await?;
    let tree = state.marshaller.marshal(schema, &loaded)?;
    state.renderers.render(accept, &tree, StatusCode::OK)
}

pub async fn get_user(
    State(state): State<AppState>,
    username: PathParam,
    headers: HeaderMap,
) -> Response {
    let accept = accept(&headers);
    let accept = accept.as_deref();
    let result = match path_param(username) {
        Ok(username) => render_user(&state, accept, &username).await,
        Err(err) => Err(err),
    };
    respond(&state.renderers, accept, result)
}

async fn render_user(state: &AppState, accept: Option<&str>, username: &str) -> Result<Rendered> {
    state.renderers.negotiate(accept)?;

    let user = find_user(state, username).await?;
    let schema = &state.schemas.user_detail;
    let loaded = loader::load(state.directory.as_ref(), schema, user.into()).await?;
    let tree = state.marshaller.marshal(schema, &loaded)?;
    state.renderers.render(accept, &tree, StatusCode::OK)
}

async fn find_project(state: &AppState, name: &str) -> Result<Project> {
    state
        .directory
        .find_project(name)
        .await?
        .ok_or_else(|| ApiError::project_not_found(name))
}

async fn find_user(state: &AppState, username: &str) -> Result<User> {
    state
        .directory
        .find_user(username)
        .await?
        .ok_or_else(|| ApiError::user_not_found(username))
}

pub async fn create_project(
    State(state): State<AppState>,
    args: WriteQuery,
    headers: HeaderMap,
) -> Response {
    let args = write_args(args);
    tracing::info!("📝 POST project list with gid={:?}", args.gid);
    let err = ApiError::not_implemented("Post not implemented.");
    error_response(&state.renderers, accept(&headers).as_deref(), &err)
}

pub async fn update_project(
    State(state): State<AppState>,
    name: PathParam,
    args: WriteQuery,
    headers: HeaderMap,
) -> Response {
    let accept = accept(&headers);
    let err = match path_param(name) {
        Ok(name) => {
            let args = write_args(args);
            tracing::info!("📝 PUT project '{}' with gid={:?}", name, args.gid);
            ApiError::not_implemented("Put not implemented.")
        }
        Err(err) => err,
    };
    error_response(&state.renderers, accept.as_deref(), &err)
}

pub async fn delete_project(
    State(state): State<AppState>,
    name: PathParam,
    headers: HeaderMap,
) -> Response {
    let accept = accept(&headers);
    let result: Result<Rendered> = match path_param(name) {
        Ok(name) => find_project(&state, &name)
            .await
            .and_then(|_| Err(ApiError::not_implemented("Delete not implemented."))),
        Err(err) => Err(err),
    };
    respond(&state.renderers, accept.as_deref(), result)
}

pub async fn update_user(
    State(state): State<AppState>,
    username: PathParam,
    args: WriteQuery,
    headers: HeaderMap,
) -> Response {
    let accept = accept(&headers);
    let err = match path_param(username) {
        Ok(username) => {
            let args = write_args(args);
            tracing::info!("📝 PUT user '{}' with gid={:?}", username, args.gid);
            ApiError::not_implemented("Put not implemented.")
        }
        Err(err) => err,
    };
    error_response(&state.renderers, accept.as_deref(), &err)
}

pub async fn delete_user(
    State(state): State<AppState>,
    username: PathParam,
    headers: HeaderMap,
) -> Response {
    let accept = accept(&headers);
    let result: Result<Rendered> = match path_param(username) {
        Ok(username) => find_user(&state, &username)
            .await
            .and_then(|_| Err(ApiError::not_implemented("Delete not implemented."))),
        Err(err) => Err(err),
    };
    respond(&state.renderers, accept.as_deref(), result)
}

pub async fn not_found(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let err = ApiError::NotFound {
        message: NOT_FOUND_MESSAGE.to_string(),
    };
    error_response(&state.renderers, accept(&headers).as_deref(), &err)
}

/// 405 回應附上該路徑允許的方法
pub fn method_not_allowed(state: &AppState, headers: &HeaderMap, allow: &'static str) -> Response {
    let mut response = error_response(
        &state.renderers,
        accept(headers).as_deref(),
        &ApiError::MethodNotAllowed,
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    response
}
