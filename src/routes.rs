use crate::docs::ApiDoc;
use crate::state::AppState;
use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn configure_routes(state: &AppState) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes().merge(crate::modules::video::router()))
        .nest_service("/assets", asset_routes(&state.config.assets_root))
        .layer(cors)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", axum::routing::get(|| async { "ok" }))
}

fn asset_routes(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(middleware::from_fn(hide_dotfiles))
}

/// Staged uploads live next to published assets under dot-prefixed names.
async fn hide_dotfiles(req: Request, next: Next) -> Response {
    let hidden = req
        .uri()
        .path()
        .split('/')
        .any(|segment| segment.starts_with('.'));

    if hidden {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}
