use std::env;

use dotenvy::dotenv;

use reliefnet::{create_router, database::create_database_pool};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    log::info!("database connection established");

    let app = create_router(db);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("reliefnet listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
