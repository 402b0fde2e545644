use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router: public routes and the authenticated API,
/// wrapped in CORS, tracing and the body limit.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/auth/logout", post(public::logout))
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{notes, tags, users};

    Router::new()
        .route("/api/users/:user_id", get(users::get))
        .route("/api/users/:user_id/notes", get(notes::list).post(notes::create))
        .route(
            "/api/users/:user_id/notes/:note_id",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
        .route("/api/users/:user_id/notes/:note_id/file", get(notes::attachment))
        .route("/api/users/:user_id/notes/:note_id/tags", post(tags::link))
        .route("/api/users/:user_id/tags", get(tags::list_owner))
        .route("/api/tags", get(tags::list).post(tags::create))
        // route_layer: unmatched paths still 404 instead of 401
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
