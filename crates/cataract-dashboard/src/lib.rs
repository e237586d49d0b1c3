//! Cataract screening dashboard
//!
//! A thin axum server around the inference pipeline: a JSON API for
//! predictions, model status, dataset preview and training history, plus
//! embedded static pages.

pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod dataset;
pub mod error;
pub mod form;
pub mod response;
pub mod server;
pub mod state;

pub use cli::*;
pub use config::*;
pub use error::ApiError;
pub use server::*;
pub use state::*;
