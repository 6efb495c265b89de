mod db;
mod handlers;
mod models;
mod routes;
mod state;
mod store;
mod structs;

use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;

use crate::db::mongodb::get_database;
use crate::routes::init_routes;
use crate::state::app_state::AppState;
use crate::store::KvStore;
use crate::store::memory::MemoryStore;
use crate::store::mongo::MongoStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    let port_string = env::var("PORT").expect("PORT not set.");
    let port = port_string.parse::<u16>().unwrap();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Pick the store backend: MongoDB when configured, in-memory otherwise
    let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| String::from("mongodb"));
    let store: Arc<dyn KvStore> = if backend == "memory" || env::var("MONGODB_URI").is_err() {
        log::warn!("Using in-memory store; records do not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let db = match get_database().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("Error connecting to the database: {}", e);
                std::process::exit(1);
            }
        };
        match MongoStore::new(db).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                eprintln!("Error preparing the access log collection: {}", e);
                std::process::exit(1);
            }
        }
    };

    // Create shared state
    let app_state = web::Data::new(AppState { store });

    // Start the Actix Web server
    HttpServer::new(move || {
        // Create a logger with a custom format instead
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        // Visits are tracked from arbitrary pages, so CORS stays wide open
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(init_routes)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
