//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod contact;
pub mod message;
pub mod thread;

// Re-exports per facilitare l'import
pub use contact::{
    delete_contact, list_contacts, respond_to_contact, submit_contact_form, update_contact_status,
};
pub use message::{post_message, recall_message};
pub use thread::{get_thread, list_threads, mark_thread_read, start_thread};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
