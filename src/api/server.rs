use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next, from_fn};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::api::handler::{compute_points, get_leaderboards};
use crate::api::middleware::{self as midware, MiddlewareErr};
use crate::db::prelude::*;
use crate::scoring::engine::ScoringError;
use crate::util::env::{EnvErr, Var};
use crate::var;

pub type JsonResult<T> = core::result::Result<Json<T>, RouteError>;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db_pool: &'static PgPool,
}

#[instrument]
pub async fn serve() -> Result<(), RouteError> {
    let state = Arc::new(AppState {
        db_pool: db_pool().await?,
    });

    let protected_routes = Router::new()
        .route("/points/compute", post(compute_points))
        .route("/leaderboards", get(get_leaderboards))
        .route_layer(middleware::from_fn(midware::auth::resolve_caller));

    let app = Router::new()
        .merge(protected_routes)
        .route("/", get(|| async { Response::new(Body::empty()) }))
        .layer(midware::cors().await?)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method();
                let uri = req.uri();

                let matched_path = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|matched| matched.as_str());

                tracing::debug_span!("api_request", ?method, ?uri, ?matched_path)
            }),
        )
        .layer(from_fn(log_route_errors))
        .with_state(state);

    let port = var!(Var::ServerApiPort).await?.parse::<u16>()?;
    let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), port);
    let listener = tokio::net::TcpListener::bind(socket_addr).await?;

    tracing::info!(%socket_addr, "server ready");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Custom error trace handler for `RouteError`-type responses
#[instrument(skip(request, next), fields(uri = request.uri().to_string()))]
async fn log_route_errors(request: Request, next: Next) -> Response {
    let res = next.run(request).await;
    if let Some(err) = res.extensions().get::<Arc<RouteError>>() {
        tracing::error!(error = ?err, "error occurred inside route handler");
    }

    res
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid authorization header")]
    Unauthorized,

    #[error("failed to resolve caller profile: {0}")]
    UserLookupFailed(sqlx::Error),

    #[error("failed to create caller profile: {0}")]
    UserCreationFailed(sqlx::Error),

    #[error("no profile exists for the authenticated user")]
    UnknownUser,

    #[error("failed to resolve caller profile: {0}")]
    ProfileLookupFailed(sqlx::Error),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    QueryError(#[from] PgError),

    #[error(transparent)]
    Middleware(#[from] MiddlewareErr),

    #[error(transparent)]
    EnvError(#[from] EnvErr),

    #[error("invalid port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl RouteError {
    fn status(&self) -> StatusCode {
        match self {
            RouteError::Unauthorized | RouteError::UserLookupFailed(_) => StatusCode::UNAUTHORIZED,
            RouteError::UnknownUser | RouteError::ProfileLookupFailed(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let status = self.status();
        let error = self.to_string();

        let mut response = (status, Json(ErrorResponse { error })).into_response();
        response.extensions_mut().insert(Arc::new(self));

        response
    }
}
