//! 路由装配
//!
//! `/api/v1` 整体套在限流中间件里，资料与注销另加认证层。
//! 根路径和健康检查不参与限流，探活不该被打挂的配额挡住。

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use gatehouse_config::CorsConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::middleware::{AuthGuard, auth_middleware, rate_limit_middleware};
use crate::api::{handlers, health};
use crate::state::AppState;

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    let guard = AuthGuard {
        tokens: state.tokens.clone(),
        blacklist: state.blacklist.clone(),
    };

    let public = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/verify", get(handlers::verify_email))
        .route("/resend", post(handlers::resend_verification));

    let protected = Router::new()
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/logout", post(handlers::logout))
        .layer(middleware::from_fn_with_state(guard, auth_middleware));

    let api = public.merge(protected).layer(middleware::from_fn_with_state(
        state.rate_limiter.clone(),
        rate_limit_middleware,
    ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
