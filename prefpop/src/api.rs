use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::ResasConfig;
use crate::dashboard::fetch_all;
use crate::error::PrefPopError;
use crate::io::resas::{PopulationSource, ResasClient};
use crate::model::{aggregate, build_chart, Category, PrefCode, Prefecture};
use crate::proxy::forward;

/// Shared by every request. The prefecture list is read once at startup.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ResasClient>,
    pub prefectures: Arc<Vec<Prefecture>>,
}

impl AppState {
    pub async fn connect(config: &ResasConfig) -> Result<Self, PrefPopError> {
        let client = ResasClient::new(config)?;
        let prefectures = client.prefectures().await?;
        info!(count = prefectures.len(), "prefecture list loaded");
        Ok(Self {
            client: Arc::new(client),
            prefectures: Arc::new(prefectures),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PopulationQuery {
    #[serde(rename = "prefCodes")]
    pref_codes: Option<String>,
    category: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/resas/*path", get(resas_proxy))
        .route("/api/prefectures", get(prefectures))
        .route("/api/population", get(population))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

async fn resas_proxy(
    State(st): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let reply = forward(&st.client, &path, query.as_deref()).await;
    let code = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, [(header::CONTENT_TYPE, reply.content_type)], reply.body).into_response()
}

async fn prefectures(State(st): State<AppState>) -> impl IntoResponse {
    Json(json!(*st.prefectures))
}

async fn population(State(st): State<AppState>, Query(q): Query<PopulationQuery>) -> Response {
    let category = match q.category.as_deref().map(str::parse::<Category>).transpose() {
        Ok(c) => c.unwrap_or_default(),
        Err(e) => return (StatusCode::BAD_REQUEST, Json(json!({"error": e}))).into_response(),
    };
    let codes = match parse_codes(q.pref_codes.as_deref().unwrap_or("")) {
        Ok(c) => c,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(json!({"error": e}))).into_response(),
    };

    if codes.is_empty() {
        return (
            StatusCode::OK,
            Json(json!({"category": category, "rows": [], "chart": {"labels": [], "datasets": []}})),
        )
            .into_response();
    }

    match fetch_all(st.client.as_ref(), &codes).await {
        Ok(records) => {
            let rows = aggregate(&records, category);
            let chart = build_chart(&rows, &codes, &st.prefectures);
            info!(prefectures = codes.len(), rows = rows.len(), %category, "population cycle served");
            (
                StatusCode::OK,
                Json(json!({"category": category, "rows": rows, "chart": chart})),
            )
                .into_response()
        }
        Err(e) => error_response(&e).into_response(),
    }
}

fn error_response(e: &PrefPopError) -> (StatusCode, Json<serde_json::Value>) {
    warn!(error = %e, "upstream cycle failed");
    let code = match e {
        PrefPopError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    };
    (code, Json(json!({"error": e.to_string()})))
}

/// "1,13, 27" -> [1, 13, 27]; duplicates dropped, first position kept.
fn parse_codes(raw: &str) -> Result<Vec<PrefCode>, String> {
    let mut codes: Vec<PrefCode> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let code: PrefCode = part
            .parse()
            .map_err(|_| format!("invalid prefecture code '{}'", part))?;
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    Ok(codes)
}
