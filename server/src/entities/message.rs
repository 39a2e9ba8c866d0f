//! Message entity - Entità messaggio di un thread

use super::enums::{MessageKind, OriginTag};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Autore di un messaggio.
///
/// Le colonne `origin` e `from_user_id` vengono sempre lette insieme e
/// convertite in questa enum, così autorizzazione e rendering fanno match
/// esaustivo invece di confrontare stringhe.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// Visitatore anonimo del form pubblico, non ha un account
    Guest,
    Customer(i32),
    Staff(i32),
}

impl MessageOrigin {
    pub fn for_author(user_id: i32, is_staff: bool) -> Self {
        if is_staff {
            MessageOrigin::Staff(user_id)
        } else {
            MessageOrigin::Customer(user_id)
        }
    }

    pub fn author_id(&self) -> Option<i32> {
        match self {
            MessageOrigin::Guest => None,
            MessageOrigin::Customer(id) | MessageOrigin::Staff(id) => Some(*id),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, MessageOrigin::Staff(_))
    }

    pub fn tag(&self) -> OriginTag {
        match self {
            MessageOrigin::Guest => OriginTag::Guest,
            MessageOrigin::Customer(_) => OriginTag::User,
            MessageOrigin::Staff(_) => OriginTag::Admin,
        }
    }

    /// Ricostruisce l'autore dalle due colonne persistite
    pub fn from_parts(tag: OriginTag, from_user_id: Option<i32>) -> Option<Self> {
        match (tag, from_user_id) {
            (OriginTag::Guest, _) => Some(MessageOrigin::Guest),
            (OriginTag::User, Some(id)) => Some(MessageOrigin::Customer(id)),
            (OriginTag::Admin, Some(id)) => Some(MessageOrigin::Staff(id)),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    // chiave di ordinamento assegnata dal db (autoincrement)
    pub seq: i64,
    // id visibile al client, univoco solo all'interno del thread
    pub message_id: String,
    pub thread_id: i32,
    pub origin: MessageOrigin,
    pub kind: MessageKind,
    pub text: String,
    pub url: String,
    pub at: DateTime<Utc>,
    pub recalled: bool,
}

/// Motivo per cui un ritiro viene rifiutato
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallRefusal {
    NotAuthor,
    WindowExpired,
}

impl Message {
    /// Verifica se `caller_id` può ritirare il messaggio all'istante `now`.
    /// Solo l'autore può farlo (nessuna eccezione per lo staff) e solo finché
    /// `now - at < window`.
    pub fn check_recall(
        &self,
        caller_id: i32,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<(), RecallRefusal> {
        if self.origin.author_id() != Some(caller_id) {
            return Err(RecallRefusal::NotAuthor);
        }
        if now - self.at >= window {
            return Err(RecallRefusal::WindowExpired);
        }
        Ok(())
    }
}

impl<'r> FromRow<'r, SqliteRow> for Message {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let tag: OriginTag = row.try_get("origin")?;
        let from_user_id: Option<i32> = row.try_get("from_user_id")?;
        let origin = MessageOrigin::from_parts(tag, from_user_id).ok_or_else(|| {
            sqlx::Error::ColumnDecode {
                index: "from_user_id".to_string(),
                source: format!("origin {:?} requires an author id", tag).into(),
            }
        })?;

        Ok(Self {
            seq: row.try_get("seq")?,
            message_id: row.try_get("message_id")?,
            thread_id: row.try_get("thread_id")?,
            origin,
            kind: row.try_get("kind")?,
            text: row.try_get("text")?,
            url: row.try_get("url")?,
            at: row.try_get("at")?,
            recalled: row.try_get("recalled")?,
        })
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Genera l'id client-visible di un messaggio: millisecondi + 9 caratteri base36 casuali
pub fn generate_message_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", now.timestamp_millis(), suffix)
}
