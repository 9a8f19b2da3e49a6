// State management module
// Holds the handles request handlers share

pub mod app_state;

pub use app_state::AppState;
