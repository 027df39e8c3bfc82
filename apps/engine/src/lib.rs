//! Client-side state engine for a résumé-screening dashboard.
//!
//! The engine ingests scored candidate records from a remote scoring
//! backend, derives filtered/sorted views, tracks multi-select state for
//! bulk actions, and manages the lifecycle of asynchronous upload jobs.
//! Scoring itself, auth, rendering, and persistence are external.

pub mod api_client;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod export;
pub mod models;
pub mod roster;
pub mod state;
pub mod upload;
