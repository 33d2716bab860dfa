pub mod app;
pub mod calendar;
pub mod command;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod scheduler;
pub mod serde_utils;
pub mod state;
pub mod storage;
pub mod tally;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
pub use tally::TallyStore;
