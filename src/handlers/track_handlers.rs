use actix_web::{HttpRequest, HttpResponse, http, web};

use crate::handlers::error_response;
use crate::models::visit::VisitRecord;
use crate::state::app_state::AppState;
use crate::structs::track_request::TrackRequest;

/// Every record expires this long after being written; the ledger is a
/// rolling one-hour window.
pub const VISIT_TTL_SECS: u64 = 3600;

/// Record a single page visit into the ledger.
pub async fn track_visit(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    // Parse by hand so a malformed body surfaces as the generic error
    // response instead of an extractor-level 400.
    let data: TrackRequest = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(e) => return error_response(e),
    };

    // Get the visitor's IP address
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    let user_agent = header_or(&req, http::header::USER_AGENT.as_str(), "unknown");
    let referer = header_or(&req, http::header::REFERER.as_str(), "");

    // Geolocation metadata, when an edge proxy supplies it
    let country = header_or(&req, "CF-IPCountry", "unknown");
    let city = header_or(&req, "CF-IPCity", "unknown");

    let visit = VisitRecord::new(
        &ip,
        country,
        city,
        data.path.unwrap_or_else(|| String::from("/")),
        user_agent,
        referer,
        data.traffic.unwrap_or(0.0),
    );

    let value = match serde_json::to_string(&visit) {
        Ok(value) => value,
        Err(e) => return error_response(e),
    };

    match app_state
        .store
        .put(&visit.storage_key(), &value, VISIT_TTL_SECS)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::error!("Failed to store visit: {}", e);
            error_response(e)
        }
    }
}

fn header_or<'a>(req: &'a HttpRequest, name: &str, default: &'a str) -> &'a str {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};

    use crate::models::visit::VisitRecord;
    use crate::routes::init_routes;
    use crate::state::app_state::AppState;
    use crate::store::KvStore;
    use crate::store::memory::MemoryStore;

    fn state_for(store: &Arc<MemoryStore>) -> web::Data<AppState> {
        web::Data::new(AppState {
            store: store.clone() as Arc<dyn KvStore>,
        })
    }

    #[actix_web::test]
    async fn tracked_visit_is_stored_with_body_fields() {
        let store = Arc::new(MemoryStore::new());
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(init_routes)).await;

        let before = chrono::Utc::now().timestamp_millis();
        let req = test::TestRequest::post()
            .uri("/api/track")
            .insert_header(("User-Agent", "test-agent"))
            .set_json(serde_json::json!({ "path": "/x", "traffic": 5 }))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let after = chrono::Utc::now().timestamp_millis();
        assert_eq!(resp["success"], true);

        let keys = store.list(10).await.unwrap();
        assert_eq!(keys.len(), 1);
        let value = store.get(&keys[0]).await.unwrap().unwrap();
        let visit: VisitRecord = serde_json::from_str(&value).unwrap();
        assert_eq!(visit.path, "/x");
        assert_eq!(visit.traffic, 5.0);
        assert_eq!(visit.user_agent, "test-agent");
        assert!(visit.timestamp >= before && visit.timestamp <= after);

        // And it comes back through the log listing
        let req = test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["path"], "/x");
        assert_eq!(logs[0]["traffic"], 5.0);
    }

    #[actix_web::test]
    async fn two_quick_visits_get_distinct_keys() {
        let store = Arc::new(MemoryStore::new());
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(init_routes)).await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/track")
                .set_json(serde_json::json!({ "path": "/" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        // Same-millisecond writes still land under different keys thanks to
        // the random suffix.
        assert_eq!(store.list(10).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn malformed_body_yields_error_response() {
        let store = Arc::new(MemoryStore::new());
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/track")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
        assert!(store.list(10).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn missing_fields_fall_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/track")
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let keys = store.list(10).await.unwrap();
        let value = store.get(&keys[0]).await.unwrap().unwrap();
        let visit: VisitRecord = serde_json::from_str(&value).unwrap();
        assert_eq!(visit.path, "/");
        assert_eq!(visit.traffic, 0.0);
        assert_eq!(visit.user_agent, "unknown");
        assert_eq!(visit.country, "unknown");
        assert_eq!(visit.referer, "");
    }
}
