pub mod api;
pub mod app;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod controller;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
pub mod theme;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use controller::Controller;
pub use session::Session;
pub use state::AppState;
pub use storage::LocalStore;
