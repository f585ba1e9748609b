// In crates/web-server/src/lib.rs

use app_config::ServerSettings;
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::{get, post},
};
use engine::ManualDesk;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::{CandleParams, CandleResponse, TradeRequest, TradeResponse};

pub mod error;
pub mod types;

pub use error::{Error, Result};

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<ManualDesk>,
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // The front-end is served from another origin.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/candle", get(get_candle_handler))
        .route("/trade", post(post_trade_handler));

    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// The handler for `GET /api/candle`.
async fn get_candle_handler(
    State(state): State<AppState>,
    Query(params): Query<CandleParams>,
) -> Result<Json<CandleResponse>> {
    let candle = state.desk.latest_candle(&params.symbol, &params.interval).await?;
    Ok(Json(candle.into()))
}

/// The handler for `POST /api/trade`.
async fn post_trade_handler(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeResponse>> {
    let (Some(action), Some(symbol), Some(quantity)) = (request.action, request.symbol, request.quantity) else {
        return Err(Error::BadRequest(
            "Missing required fields: action, quantity, or symbol.".to_string(),
        ));
    };
    let quantity = quantity
        .to_decimal()
        .ok_or_else(|| Error::BadRequest(format!("Quantity is not a number: {quantity:?}")))?;

    let result = state.desk.trigger_trade(&action, &symbol, quantity).await?;
    Ok(Json(result.into()))
}

/// Serves the front-end API until `shutdown` resolves.
pub async fn run(settings: ServerSettings, desk: Arc<ManualDesk>, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let app = create_router(AppState { desk });

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;
    tracing::info!("Web server listening on {}", address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(Error::ServeError)?;

    tracing::info!("Web server stopped.");
    Ok(())
}
