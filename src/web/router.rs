use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handlers::{
        create_user, delete_user, get_user, healthcheck, list_users, method_not_allowed,
        update_user,
    },
    state::AppState,
};

/// Every `OPTIONS` request is answered by the CORS layer with 200 and the
/// allow headers; it never reaches a handler. Other unrouted methods get a
/// JSON 405.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck).fallback(method_not_allowed))
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .fallback(method_not_allowed),
        )
        .route(
            "/user",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}
