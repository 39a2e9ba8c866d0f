//! Modelli lato client - rispecchiano i JSON restituiti dal server
//!
//! I campi sconosciuti vengono ignorati, così il client sopravvive
//! all'aggiunta di nuovi campi lato server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Guest,
    User,
    Admin,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Audio,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub from: Origin,
    pub from_user_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    // assenti per i messaggi ritirati
    pub text: Option<String>,
    pub url: Option<String>,
    pub at: DateTime<Utc>,
    pub recalled: bool,
}

/// Campi comuni a thread, elementi della lista e richieste del back-office
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: i32,
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub priority: String,
    pub is_read: bool,
    pub response_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Thread {
    #[serde(flatten)]
    pub contact: Contact,
    pub messages: Vec<Message>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessagePreview {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub at: DateTime<Utc>,
}

/// Cliente registrato titolare del thread
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Owner {
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(default)]
    pub owner: Option<Owner>,
    pub unread_count: u32,
    pub last_message: Option<MessagePreview>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageList {
    pub messages: Vec<Message>,
}

/// Body di invio messaggio
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NewMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            text: Some(text.into()),
            url: None,
        }
    }

    /// Messaggio multimediale: l'upload avviene altrove, qui viaggia solo l'url
    pub fn media(kind: MessageKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            text: None,
            url: Some(url.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_interest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContactSubmitted {
    pub message: String,
    pub contact_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ack {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pagination {
    pub current: u32,
    pub pages: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub pagination: Pagination,
}

/// Filtri di `GET /contact`
#[derive(Serialize, Debug, Clone, Default)]
pub struct ContactQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<i32>,
}
