//! Message DTOs - Data Transfer Objects per messaggi

use crate::entities::{Message, MessageKind, MessageOrigin, OriginTag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vista di un messaggio restituita al client.
///
/// Un messaggio ritirato non espone mai `text` né `url`, per nessun ruolo:
/// restano solo autore, tipo e timestamp originale.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub id: String,
    pub from: OriginTag,
    pub from_user_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub at: DateTime<Utc>,
    pub recalled: bool,
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        let (text, url) = if value.recalled {
            (None, None) // contenuto conservato nel db ma mai esposto
        } else {
            (Some(value.text), Some(value.url))
        };
        Self {
            id: value.message_id,
            from: value.origin.tag(),
            from_user_id: value.origin.author_id(),
            kind: value.kind,
            text,
            url,
            at: value.at,
            recalled: value.recalled,
        }
    }
}

/// Risposta di append e ritiro: il client risincronizza l'intera lista
#[derive(Serialize, Deserialize, Debug)]
pub struct MessagesDTO {
    pub messages: Vec<MessageDTO>,
}

impl From<Vec<Message>> for MessagesDTO {
    fn from(value: Vec<Message>) -> Self {
        Self {
            messages: value.into_iter().map(MessageDTO::from).collect(),
        }
    }
}

/// Body di `POST /threads/{id}/messages`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PostMessageDTO {
    // stringa libera: il tipo viene normalizzato in `into_content`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
}

/// Contenuto di un messaggio già validato
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContent {
    pub kind: MessageKind,
    pub text: String,
    pub url: String,
}

impl PostMessageDTO {
    /// Normalizza e valida il payload: tipo di default `text`, testo e url ripuliti dagli spazi.
    /// Un messaggio di testo richiede `text`, tutti gli altri tipi richiedono `url`.
    pub fn into_content(self) -> Result<MessageContent, &'static str> {
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => MessageKind::Text,
            Some(raw) => raw
                .parse::<MessageKind>()
                .map_err(|_| "Unsupported message type")?,
        };
        let text = self.text.as_deref().map(str::trim).unwrap_or_default().to_string();
        let url = self.url.as_deref().map(str::trim).unwrap_or_default().to_string();

        match kind {
            MessageKind::Text if text.is_empty() => Err("Message text is required"),
            MessageKind::Image | MessageKind::Video | MessageKind::Audio if url.is_empty() => {
                Err("Media url is required")
            }
            _ => Ok(MessageContent { kind, text, url }),
        }
    }
}

/// DTO per inserire un nuovo messaggio (seq assegnato dal db)
#[derive(Debug, Clone)]
pub struct CreateMessageDTO {
    pub message_id: String,
    pub thread_id: i32,
    pub origin: MessageOrigin,
    pub kind: MessageKind,
    pub text: String,
    pub url: String,
    pub at: DateTime<Utc>,
}
