use crate::app::handlers;
use crate::app::state::AppState;
use crate::core::routes::ResourceType;
use crate::utils::error::{ApiError, Result};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::future::{ready, Ready};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

fn path_for(state: &AppState, resource: ResourceType) -> Result<String> {
    state
        .routes
        .axum_path(resource)
        .ok_or_else(|| ApiError::UnresolvableRoute {
            resource: resource.to_string(),
            reason: "no route registered".to_string(),
        })
}

const COLLECTION_METHODS: &str = "GET, HEAD, POST";
const ITEM_METHODS: &str = "GET, HEAD, PUT, DELETE";

/// 其餘方法回 405，`Allow` 列出該路徑註冊的方法
fn reject_other_methods(
    allow: &'static str,
) -> impl Fn(State<AppState>, HeaderMap) -> Ready<Response> + Clone + Send + Sync + 'static {
    move |State(state): State<AppState>, headers: HeaderMap| {
        ready(handlers::method_not_allowed(&state, &headers, allow))
    }
}

/// 派送路徑取自同一張路由表，連結與派送不會不一致
pub fn build_router(state: AppState) -> Result<Router> {
    let project_list = path_for(&state, ResourceType::ProjectList)?;
    let project = path_for(&state, ResourceType::Project)?;
    let user = path_for(&state, ResourceType::User)?;

    tracing::debug!("🗺️ Routes: {}, {}, {}", project_list, project, user);

    let router = Router::new()
        .route(
            &project_list,
            get(handlers::list_projects)
                .post(handlers::create_project)
                .fallback(reject_other_methods(COLLECTION_METHODS)),
        )
        .route(
            &project,
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project)
                .fallback(reject_other_methods(ITEM_METHODS)),
        )
        .route(
            &user,
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user)
                .fallback(reject_other_methods(ITEM_METHODS)),
        )
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    Ok(router)
}
