// src/lib.rs
//! Client for the Stockfolio portfolio backend: typed REST calls, the signed-in
//! session, form and page state, and the helpers that shape data for display.

pub mod analytics;
pub mod api;
pub mod auth;
pub mod chart;
pub mod company;
pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod forms;
pub mod models;
pub mod pages;
pub mod routes;
pub mod session;
pub mod token;
pub mod view;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, FormError, ValidationError};
pub use session::{SessionContext, SessionState};
