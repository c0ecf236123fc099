use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_secret::change_secret;
use super::handlers::deactivate_account::deactivate_account;
use super::handlers::delete_account::delete_account;
use super::handlers::get_profile::get_profile;
use super::handlers::login::login;
use super::handlers::reactivate_account::reactivate_account;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::account::ports::AccountServicePort;
use crate::session::ports::SessionServicePort;

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<dyn SessionServicePort>,
    pub account_service: Arc<dyn AccountServicePort>,
}

pub fn create_router(
    session_service: Arc<dyn SessionServicePort>,
    account_service: Arc<dyn AccountServicePort>,
    request_timeout: Duration,
) -> Router {
    let state = AppState {
        session_service,
        account_service,
    };

    let public_routes = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/refresh-token", post(refresh_token));

    let protected_routes = Router::new()
        .route("/api/v1/users/profile", get(get_profile))
        .route("/api/v1/users/profile", delete(delete_account))
        .route("/api/v1/users/profile/password", post(change_secret))
        .route("/api/v1/users/profile/deactivate", patch(deactivate_account))
        .route("/api/v1/users/profile/reactivate", patch(reactivate_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Authorization headers carry bearer tokens and are kept out of spans
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
