use std::collections::HashSet;

use actix_web::{HttpResponse, web};
use rand::Rng;
use serde::Serialize;

use crate::handlers::error_response;
use crate::models::visit::VisitRecord;
use crate::state::app_state::AppState;

/// Listing cap. Once more than this many records sit in the window, the
/// counts undercount; accepted approximation, see DESIGN.md.
const LIST_LIMIT: usize = 1000;

const TEN_MINUTES_MS: i64 = 10 * 60 * 1000;
const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub ten_minute_count: u64,
    pub today_count: u64,
    pub current_visitors: u32,
    pub unique_visitors: usize,
}

/// Rolling visit statistics over the most recent stored records.
pub async fn get_stats(app_state: web::Data<AppState>) -> HttpResponse {
    let now = chrono::Utc::now().timestamp_millis();
    let ten_minutes_ago = now - TEN_MINUTES_MS;
    let one_day_ago = now - ONE_DAY_MS;

    let keys = match app_state.store.list(LIST_LIMIT).await {
        Ok(keys) => keys,
        Err(e) => {
            log::error!("Failed to list visits: {}", e);
            return error_response(e);
        }
    };

    let mut ten_minute_count = 0u64;
    let mut today_count = 0u64;
    let mut unique_ips = HashSet::new();

    for key in &keys {
        let value = match app_state.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to read visit {}: {}", key, e);
                return error_response(e);
            }
        };
        // A key can expire between list and get
        let Some(value) = value else { continue };

        // A corrupt record is skipped rather than aborting the aggregation
        let visit: VisitRecord = match serde_json::from_str(&value) {
            Ok(visit) => visit,
            Err(e) => {
                log::warn!("Skipping unparsable visit {}: {}", key, e);
                continue;
            }
        };

        if visit.timestamp >= ten_minutes_ago {
            ten_minute_count += 1;
        }
        if visit.timestamp >= one_day_ago {
            today_count += 1;
            unique_ips.insert(visit.ip);
        }
    }

    // Synthetic placeholder, not a measurement; kept for parity with the
    // dashboard that consumes it.
    let current_visitors = rand::rng().random_range(1..=10);

    HttpResponse::Ok().json(StatsResponse {
        ten_minute_count,
        today_count,
        current_visitors,
        unique_visitors: unique_ips.len(),
    })
}
