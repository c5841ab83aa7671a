use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{
    api_rate_limit, comment_rate_limit, jwt_auth_middleware, optional_auth_middleware, request_id, require_admin,
    security_headers,
};
use crate::middleware::security::REQUEST_ID_HEADER;
use crate::state::AppState;

/// The full HTTP surface: `/health` plus the versioned API.
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let api = Router::new()
        .merge(public_routes(&state))
        .merge(comment_routes(&state))
        .merge(protected_routes(&state))
        .nest("/admin", admin_routes(&state))
        .layer(from_fn_with_state(state.clone(), api_rate_limit));

    Router::new()
        .route("/health", get(public::health::health_get))
        .nest("/api/v1", api)
        // Global middleware, innermost first
        .layer(DefaultBodyLimit::max(security.max_request_size_bytes))
        .layer(cors_layer(&security.cors_origins))
        .layer(from_fn(security_headers))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!("http", method = %request.method(), uri = %request.uri(), request_id = %id)
        }))
        .layer(from_fn(request_id))
        .with_state(state)
}

fn public_routes(state: &AppState) -> Router<AppState> {
    use public::{auth, comments, posts, taxonomy};

    Router::new()
        // Token acquisition
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/refresh", post(auth::refresh_post))
        // Reading
        .route("/posts", get(posts::posts_get))
        .route("/posts/search", get(posts::posts_search))
        .route("/posts/:id", get(posts::post_get))
        .route("/posts/:id/view", post(posts::post_view))
        .route("/categories", get(taxonomy::categories_get))
        .route("/categories/:slug/posts", get(taxonomy::category_posts_get))
        .route("/tags", get(taxonomy::tags_get))
        .route("/tags/:slug/posts", get(taxonomy::tag_posts_get))
        .route("/comments/post/:post_id", get(comments::post_comments_get))
        .route("/comments/:id/replies", get(comments::replies_get))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
}

fn comment_routes(state: &AppState) -> Router<AppState> {
    use public::comments;

    Router::new()
        .route("/comments/post/:post_id", post(comments::post_comments_post))
        .route("/comments/:id/replies", post(comments::replies_post))
        .route("/comments/:id", put(comments::comment_put).delete(comments::comment_delete))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
        .route_layer(from_fn_with_state(state.clone(), comment_rate_limit))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use protected::{auth, interactions, notifications};

    Router::new()
        .route("/auth/logout", post(auth::logout_post))
        .route("/auth/me", get(auth::me_get).put(auth::me_put))
        .route(
            "/posts/:id/like",
            post(interactions::post_like_post).delete(interactions::post_like_delete),
        )
        .route(
            "/posts/:id/bookmark",
            post(interactions::bookmark_post).delete(interactions::bookmark_delete),
        )
        .route("/bookmarks", get(interactions::bookmarks_get))
        .route(
            "/comments/:id/like",
            post(interactions::comment_like_post).delete(interactions::comment_like_delete),
        )
        .route("/notifications", get(notifications::notifications_get))
        .route("/notifications/unread", get(notifications::unread_get))
        .route("/notifications/read-all", put(notifications::read_all_put))
        .route("/notifications/:id/read", put(notifications::read_put))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use elevated::admin::{dashboard, moderation, posts, taxonomy};

    Router::new()
        .route("/dashboard", get(dashboard::dashboard_get))
        .route("/users", get(moderation::users_get))
        .route("/users/:id", axum::routing::delete(moderation::user_delete))
        .route("/comments", get(moderation::comments_get))
        .route("/comments/:id", axum::routing::delete(moderation::comment_delete))
        .route("/categories", get(taxonomy::categories_get).post(taxonomy::category_post))
        .route(
            "/categories/:id",
            put(taxonomy::category_put).delete(taxonomy::category_delete),
        )
        .route("/tags", get(taxonomy::tags_get).post(taxonomy::tag_post))
        .route("/tags/:id", put(taxonomy::tag_put).delete(taxonomy::tag_delete))
        .route("/posts", post(posts::post_post))
        .route("/posts/:id", put(posts::post_put).delete(posts::post_delete))
        // Outermost last: authenticate, then check the admin flag
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
}
