//! Thread entity - Richiesta di contatto usata come conversazione cliente/staff

use super::enums::{InquirySource, InquiryType, Priority, ThreadStatus};
use super::message::Message;
use super::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Thread {
    pub thread_id: i32,
    // None per le richieste inviate da ospiti tramite il form pubblico
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub subject: String,
    // corpo originale della richiesta, vuoto per i thread aperti dalla chat
    pub message: String,
    pub product_interest: Option<String>,
    pub inquiry_type: InquiryType,
    pub source: InquirySource,
    pub status: ThreadStatus,
    pub priority: Priority,
    // flag lato staff, diventa true solo con la chiamata esplicita di mark-read
    pub is_read: bool,
    // "il cliente ha letto fino a questo istante, istante INCLUSO"
    pub customer_last_read_at: Option<DateTime<Utc>>,
    pub response_message: Option<String>,
    pub responded_by: Option<i32>,
    pub responded_at: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == Some(user_id)
    }

    /// Lo staff accede a tutti i thread, un cliente solo ai propri
    pub fn is_accessible_by(&self, user: &User) -> bool {
        user.is_staff() || self.is_owned_by(user.user_id)
    }

    /// Contatore dei non letti visto da `viewer`.
    ///
    /// Per lo staff vale 0 o 1 ed è l'inverso di `is_read`.
    /// Per il cliente conta i messaggi dello staff (non ritirati) arrivati dopo
    /// `customer_last_read_at`, oppure tutti se il cliente non ha mai letto.
    pub fn unread_count_for(&self, viewer: &User, messages: &[Message]) -> usize {
        if viewer.is_staff() {
            return if self.is_read { 0 } else { 1 };
        }

        messages
            .iter()
            .filter(|m| m.origin.is_staff() && !m.recalled)
            .filter(|m| match self.customer_last_read_at {
                Some(read_until) => m.at > read_until,
                None => true,
            })
            .count()
    }
}
