use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::handlers::error_response;
use crate::models::visit::VisitRecord;
use crate::state::app_state::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct LogsQuery {
    // Kept as a string so a non-numeric value falls back to the default
    // instead of failing extraction
    pub limit: Option<String>,
}

/// A visit as served by /api/logs: same fields, display-formatted timestamp.
#[derive(Serialize)]
pub struct VisitLogEntry {
    pub ip: String,
    pub country: String,
    pub city: String,
    pub path: String,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    pub referer: String,
    pub traffic: f64,
    pub timestamp: String,
}

impl From<VisitRecord> for VisitLogEntry {
    fn from(visit: VisitRecord) -> Self {
        let timestamp = chrono::DateTime::from_timestamp_millis(visit.timestamp)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| visit.timestamp.to_string());
        Self {
            ip: visit.ip,
            country: visit.country,
            city: visit.city,
            path: visit.path,
            user_agent: visit.user_agent,
            referer: visit.referer,
            traffic: visit.traffic,
            timestamp,
        }
    }
}

/// Most recent visits, newest first.
pub async fn get_logs(
    app_state: web::Data<AppState>,
    query: web::Query<LogsQuery>,
) -> HttpResponse {
    let limit = query
        .limit
        .as_deref()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT);

    let keys = match app_state.store.list(limit).await {
        Ok(keys) => keys,
        Err(e) => {
            log::error!("Failed to list visits: {}", e);
            return error_response(e);
        }
    };

    let mut visits: Vec<VisitRecord> = Vec::with_capacity(keys.len());
    for key in &keys {
        let value = match app_state.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to read visit {}: {}", key, e);
                return error_response(e);
            }
        };
        let Some(value) = value else { continue };
        match serde_json::from_str::<VisitRecord>(&value) {
            Ok(visit) => visits.push(visit),
            Err(e) => log::warn!("Skipping unparsable visit {}: {}", key, e),
        }
    }

    // Sort on the numeric timestamp before formatting it for display;
    // listing order already puts newer keys first, this pins ties down.
    visits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let logs: Vec<VisitLogEntry> = visits.into_iter().map(VisitLogEntry::from).collect();
    HttpResponse::Ok().json(logs)
}
