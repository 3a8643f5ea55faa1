//! Backend for a housing-listing bookmarking app.
//!
//! Users sign up and receive an opaque access token, browse the proxied
//! listings feed, and save the listings they like.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod listings;
pub mod saved;
pub mod state;

pub use app::build_app;
pub use state::AppState;
