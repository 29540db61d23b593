pub mod database;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod utils;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use database::Database;

pub fn create_router(db: Database) -> Router {
    Router::new()
        // Public routes (no authentication required)
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/verify", get(handlers::auth::verify))
        // Needs
        .route(
            "/needs",
            get(handlers::needs::list_needs).post(handlers::needs::create_need),
        )
        .route("/needs/user/:id", get(handlers::needs::needs_by_user))
        .route("/needs/:id/fulfill", patch(handlers::needs::fulfill_need))
        .route(
            "/needs/:id/dispatch",
            post(handlers::needs::create_dispatch).patch(handlers::needs::mark_reached),
        )
        // Dispatches
        .route("/dispatches", get(handlers::dispatches::list_dispatches))
        .route(
            "/dispatches/:id",
            get(handlers::dispatches::get_dispatch)
                .patch(handlers::dispatches::update_dispatch_status)
                .delete(handlers::dispatches::delete_dispatch),
        )
        // Stock
        .route(
            "/stock",
            get(handlers::stock::list_stock)
                .post(handlers::stock::add_stock)
                .patch(handlers::stock::set_stock),
        )
        // Organizations
        .route(
            "/organizations",
            get(handlers::organizations::list_organizations)
                .post(handlers::organizations::create_organization)
                .patch(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .route(
            "/organizations/:id/members",
            get(handlers::organizations::list_members)
                .post(handlers::organizations::add_member)
                .delete(handlers::organizations::remove_member),
        )
        // Resources
        .route(
            "/resources",
            get(handlers::resources::list_resources).post(handlers::resources::create_resource),
        )
        .route(
            "/resources/:id",
            patch(handlers::resources::update_resource_status),
        )
        // Admin user management
        .route(
            "/admin/users",
            get(handlers::users::list_users)
                .post(handlers::users::create_user)
                .patch(handlers::users::update_user),
        )
        .route("/admin/users/:id", delete(handlers::users::delete_user))
        .route("/users/:id", patch(handlers::users::change_role))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}
