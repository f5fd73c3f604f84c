pub mod service;

pub use service::{AppState, create_app};
