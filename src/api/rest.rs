// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  The service only computes: the
// dashboard posts the sparkline it already fetched and gets indicator values
// back.  A series too short for an indicator is not an error; the field is
// simply `null`.
//
// CORS is configured permissively for the browser dashboard.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::app_state::AppState;
use crate::market::MarketSnapshot;
use crate::report::{analyze, IndicatorReport};
use crate::runtime_config::IndicatorSettings;
use crate::types::PriceSeries;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with tracing, CORS and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/indicators", post(indicators))
        .route("/api/v1/indicators/batch", post(indicators_batch))
        .route("/api/v1/settings", get(get_settings))
        .route("/api/v1/settings", post(set_settings))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    requests_served: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        requests_served: state.requests_served(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Settings overrides
// =============================================================================

/// Partial settings; only the fields present are changed.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    rsi_period: Option<usize>,
    #[serde(default)]
    rsi_overbought: Option<f64>,
    #[serde(default)]
    rsi_oversold: Option<f64>,
    #[serde(default)]
    macd_fast: Option<usize>,
    #[serde(default)]
    macd_slow: Option<usize>,
    #[serde(default)]
    macd_signal: Option<usize>,
    #[serde(default)]
    bollinger_period: Option<usize>,
    #[serde(default)]
    bollinger_k: Option<f64>,
}

impl SettingsUpdate {
    /// Apply onto `settings`, returning a description of each change.
    fn apply(&self, settings: &mut IndicatorSettings) -> Vec<String> {
        let update = self;
        let mut changes = Vec::new();

        macro_rules! apply_field {
            ($field:ident) => {
                if let Some(val) = update.$field {
                    if settings.$field != val {
                        changes.push(format!(
                            "{}: {} -> {}",
                            stringify!($field),
                            settings.$field,
                            val
                        ));
                        settings.$field = val;
                    }
                }
            };
        }

        apply_field!(rsi_period);
        apply_field!(rsi_overbought);
        apply_field!(rsi_oversold);
        apply_field!(macd_fast);
        apply_field!(macd_slow);
        apply_field!(macd_signal);
        apply_field!(bollinger_period);
        apply_field!(bollinger_k);

        changes
    }

    /// Current settings with this update layered on top, validated.
    fn resolve(&self, base: IndicatorSettings) -> Result<IndicatorSettings, ApiError> {
        let mut settings = base;
        self.apply(&mut settings);
        settings
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(settings)
    }
}

// =============================================================================
// Single series
// =============================================================================

#[derive(Deserialize)]
struct IndicatorRequest {
    prices: Vec<f64>,
    #[serde(default)]
    settings: Option<SettingsUpdate>,
}

async fn indicators(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IndicatorRequest>,
) -> Result<Json<IndicatorReport>, ApiError> {
    state.record_request();

    let base = state.settings();
    let settings = match &req.settings {
        Some(update) => update.resolve(base)?,
        None => base,
    };
    let prices = PriceSeries::new(req.prices)?;

    let report = analyze(&prices, &settings)?;
    Ok(Json(report))
}

// =============================================================================
// Batch of market rows
// =============================================================================

#[derive(Deserialize)]
struct BatchRequest {
    markets: Vec<MarketSnapshot>,
}

/// Indicator report for one market row, with the row's display fields.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub report: Option<IndicatorReport>,
    /// Set when this row's sparkline could not be analysed.
    pub error: Option<String>,
}

async fn indicators_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<Vec<BatchEntry>>, ApiError> {
    state.record_request();

    let max = state.max_batch_size();
    if req.markets.len() > max {
        return Err(ApiError::Validation(format!(
            "batch of {} markets exceeds the limit of {max}",
            req.markets.len()
        )));
    }

    let settings = state.settings();

    // Each series is independent; compute them on the blocking pool.
    let tasks = req.markets.into_iter().map(|market| {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = market
                .price_series()
                .map_err(|e| e.to_string())
                .and_then(|prices| analyze(&prices, &settings).map_err(|e| e.to_string()));
            let (report, error) = match outcome {
                Ok(report) => (Some(report), None),
                Err(e) => {
                    warn!(symbol = %market.symbol, error = %e, "market row not analysed");
                    (None, Some(e))
                }
            };
            BatchEntry {
                symbol: market.symbol,
                current_price: market.current_price,
                price_change_percentage_24h: market.price_change_percentage_24h,
                sentiment_score: market.sentiment_score,
                report,
                error,
            }
        })
    });

    let mut entries = Vec::new();
    for joined in join_all(tasks).await {
        entries.push(joined.map_err(|e| ApiError::Internal(e.to_string()))?);
    }

    Ok(Json(entries))
}

// =============================================================================
// Settings
// =============================================================================

async fn get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.settings())
}

async fn set_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<IndicatorSettings>, ApiError> {
    apply_settings_update(&state, &update).map(Json)
}

/// Validate and apply `update`, then persist it.
///
/// `save_lock` is held across the change and the save, so concurrent updates
/// reach disk in the same order they were applied in memory.
fn apply_settings_update(
    state: &AppState,
    update: &SettingsUpdate,
) -> Result<IndicatorSettings, ApiError> {
    let _guard = state.save_lock.lock();

    let mut config = state.config.write();
    let mut candidate = config.settings.clone();
    let changes = update.apply(&mut candidate);
    candidate
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    config.settings = candidate;

    if changes.is_empty() {
        return Ok(config.settings.clone());
    }

    info!(changes = ?changes, "indicator settings updated");

    // Readers only wait on the write lock, not on the file write.
    let config_clone = config.clone();
    drop(config);

    if let Err(e) = config_clone.save(&state.config_path) {
        warn!(error = %e, "failed to save settings to disk");
    }

    Ok(config_clone.settings)
}
