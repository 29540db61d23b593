pub mod auth;
pub mod dispatches;
pub mod needs;
pub mod organizations;
pub mod resources;
pub mod stock;
pub mod users;
