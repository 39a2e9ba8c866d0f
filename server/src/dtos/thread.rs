//! Thread DTOs - Data Transfer Objects per thread e richieste di contatto

use super::message::MessageDTO;
use crate::entities::{
    InquirySource, InquiryType, Message, MessageKind, Priority, Thread, ThreadStatus, User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Oggetto usato quando il cliente apre una chat senza specificarlo
pub const DEFAULT_CHAT_SUBJECT: &str = "Chat";

/// Campi del thread esposti al client (senza la lista dei messaggi)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContactDTO {
    pub id: i32,
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub subject: String,
    pub message: String,
    pub product_interest: Option<String>,
    pub inquiry_type: InquiryType,
    pub source: InquirySource,
    pub status: ThreadStatus,
    pub priority: Priority,
    pub is_read: bool,
    pub response_message: Option<String>,
    pub responded_by: Option<i32>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Thread> for ContactDTO {
    fn from(value: Thread) -> Self {
        Self {
            id: value.thread_id,
            user_id: value.user_id,
            assigned_to: value.assigned_to,
            name: value.name,
            email: value.email,
            phone: value.phone,
            company: value.company,
            country: value.country,
            subject: value.subject,
            message: value.message,
            product_interest: value.product_interest,
            inquiry_type: value.inquiry_type,
            source: value.source,
            status: value.status,
            priority: value.priority,
            is_read: value.is_read,
            response_message: value.response_message,
            responded_by: value.responded_by,
            responded_at: value.responded_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
            // ip_address e user_agent restano interni
        }
    }
}

/// Thread completo con la lista ordinata dei messaggi
#[derive(Serialize, Deserialize, Debug)]
pub struct ThreadDTO {
    #[serde(flatten)]
    pub contact: ContactDTO,
    pub messages: Vec<MessageDTO>,
}

impl ThreadDTO {
    pub fn new(thread: Thread, messages: Vec<Message>) -> Self {
        Self {
            contact: ContactDTO::from(thread),
            messages: messages.into_iter().map(MessageDTO::from).collect(),
        }
    }
}

/// Anteprima dell'ultimo messaggio nella lista dei thread
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessagePreviewDTO {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub at: DateTime<Utc>,
}

impl From<&Message> for MessagePreviewDTO {
    fn from(value: &Message) -> Self {
        let text = if value.recalled {
            "[recalled]".to_string()
        } else if value.kind == MessageKind::Text {
            value.text.clone()
        } else {
            value.kind.preview_label().to_string()
        };
        Self {
            text,
            kind: value.kind,
            at: value.at,
        }
    }
}

/// Titolare del thread mostrato nella lista (null per le richieste anonime)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OwnerDTO {
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

impl From<User> for OwnerDTO {
    fn from(value: User) -> Self {
        Self {
            user_id: value.user_id,
            username: value.username,
            email: value.email,
        }
    }
}

/// Elemento di `GET /threads`
#[derive(Serialize, Deserialize, Debug)]
pub struct ThreadSummaryDTO {
    #[serde(flatten)]
    pub contact: ContactDTO,
    pub owner: Option<OwnerDTO>,
    pub unread_count: usize,
    pub last_message: Option<MessagePreviewDTO>,
}

/// Body di `POST /threads`
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct StartThreadDTO {
    #[serde(default)]
    pub subject: Option<String>,
}

impl StartThreadDTO {
    /// Oggetto ripulito dagli spazi, "Chat" se assente o vuoto
    pub fn normalized_subject(&self) -> String {
        match self.subject.as_deref().map(str::trim) {
            Some(subject) if !subject.is_empty() => subject.to_string(),
            _ => DEFAULT_CHAT_SUBJECT.to_string(),
        }
    }
}

/// DTO per creare un nuovo thread (senza thread_id)
#[derive(Debug, Clone)]
pub struct CreateThreadDTO {
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub subject: String,
    pub message: String,
    pub product_interest: Option<String>,
    pub inquiry_type: InquiryType,
    pub source: InquirySource,
    pub status: ThreadStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// DTO per aggiornare un thread (solo campi del flusso di lavoro lato staff)
#[derive(Debug, Clone)]
pub struct UpdateThreadDTO {
    pub status: Option<ThreadStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<i32>,
    pub response_message: Option<String>,
    pub responded_by: Option<i32>,
    pub responded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateThreadDTO {
    pub fn touched_at(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: None,
            priority: None,
            assigned_to: None,
            response_message: None,
            responded_by: None,
            responded_at: None,
            updated_at,
        }
    }
}

/// Body di `PUT /contact/{id}/status`
#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateStatusDTO {
    pub status: ThreadStatus,
    pub priority: Option<Priority>,
    pub assigned_to: Option<i32>,
}

/// Body di `PUT /contact/{id}/respond`
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct RespondDTO {
    #[validate(length(min = 1, max = 5000, message = "Response message is required"))]
    pub response: String,
}
