//! Client library - client HTTP tipizzato per il servizio contatti
//!
//! Contiene il wrapper degli endpoint REST, il poller dei thread (ogni 3 secondi)
//! e le regole di rendering dei messaggi lato client.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod render;

// Re-export dei tipi principali per facilitare l'import
pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use poller::{PollState, ThreadPoller};
