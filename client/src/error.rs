use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Errore di trasporto (connessione rifiutata, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Il server ha risposto con uno stato diverso da 2xx
    #[error("server returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ClientError {
    /// Codice HTTP, se l'errore viene da una risposta del server
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Messaggio `error` del body JSON restituito dal server, se presente
    pub fn server_message(&self) -> Option<String> {
        match self {
            ClientError::Status { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .map(|parsed| parsed.error),
            _ => None,
        }
    }
}
