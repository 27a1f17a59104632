pub mod app;
pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod handlers;
pub mod paths;
pub mod profiling;
pub mod services;
pub mod session;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use app::build_app;
pub use state::AppState;
