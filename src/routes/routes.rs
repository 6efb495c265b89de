use actix_web::{HttpResponse, web};

use crate::handlers::health_handlers::health_check;
use crate::handlers::log_handlers::get_logs;
use crate::handlers::stats_handlers::get_stats;
use crate::handlers::track_handlers::track_visit;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/track", web::post().to(track_visit))
            .route("/stats", web::get().to(get_stats))
            .route("/logs", web::get().to(get_logs))
            .route("/health/check", web::get().to(health_check)),
    );
    // Everything else is a plain 404
    cfg.default_service(web::route().to(not_found));
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("Not Found")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};

    use super::init_routes;
    use crate::state::app_state::AppState;
    use crate::store::KvStore;
    use crate::store::memory::MemoryStore;

    #[actix_web::test]
    async fn unknown_paths_return_404() {
        let state = web::Data::new(AppState {
            store: Arc::new(MemoryStore::new()) as Arc<dyn KvStore>,
        });
        let app = test::init_service(App::new().app_data(state).configure(init_routes)).await;

        for uri in ["/", "/api", "/api/unknown", "/tracker"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri {}", uri);
        }
    }
}
