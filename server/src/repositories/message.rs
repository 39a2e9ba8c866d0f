//! MessageRepository - Repository per la gestione dei messaggi dei thread

use super::Create;
use crate::dtos::CreateMessageDTO;
use crate::entities::{Message, MessageOrigin, ThreadStatus};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

const SELECT_MESSAGE: &str = r#"
    SELECT seq, message_id, thread_id, origin, from_user_id, kind, text, url, at, recalled
    FROM messages
"#;

// MESSAGE REPO
pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Tutti i messaggi del thread in ordine di inserimento
    #[instrument(skip(self), fields(thread_id = %thread_id))]
    pub async fn find_many_by_thread_id(&self, thread_id: &i32) -> Result<Vec<Message>, Error> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "{SELECT_MESSAGE} WHERE thread_id = ? ORDER BY seq ASC"
        ))
        .bind(thread_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Loaded {} messages", messages.len());
        Ok(messages)
    }

    #[instrument(skip(self), fields(thread_id = %thread_id, message_id = %message_id))]
    pub async fn find_by_message_id(
        &self,
        thread_id: &i32,
        message_id: &str,
    ) -> Result<Option<Message>, Error> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "{SELECT_MESSAGE} WHERE thread_id = ? AND message_id = ?"
        ))
        .bind(thread_id)
        .bind(message_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(message)
    }

    /// Segna il messaggio come ritirato. Il passaggio false -> true avviene una sola volta:
    /// restituisce false se il messaggio era già ritirato (o non esiste).
    #[instrument(skip(self), fields(thread_id = %thread_id, message_id = %message_id))]
    pub async fn mark_recalled(&self, thread_id: &i32, message_id: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE messages SET recalled = 1 WHERE thread_id = ? AND message_id = ? AND recalled = 0",
        )
        .bind(thread_id)
        .bind(message_id)
        .execute(&self.connection_pool)
        .await?;

        let changed = result.rows_affected() > 0;
        if changed {
            info!("Message recalled");
        }
        Ok(changed)
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    /// Append atomico: una INSERT sulla tabella figlia più l'aggiornamento del thread,
    /// nella stessa transazione. Due append concorrenti producono due righe distinte.
    #[instrument(skip(self, data), fields(thread_id = %data.thread_id, message_id = %data.message_id))]
    async fn create(&self, data: &CreateMessageDTO) -> Result<Message, Error> {
        debug!("Appending message to thread");
        // un messaggio di cliente (o ospite) rende il thread non letto per lo staff
        let marks_unread = !matches!(data.origin, MessageOrigin::Staff(_));

        let mut tx = self.connection_pool.begin().await?;

        let touched = sqlx::query(
            r#"
            UPDATE threads
            SET updated_at = ?,
                is_read = CASE WHEN ? THEN 0 ELSE is_read END,
                status = CASE WHEN status = ? THEN ? ELSE status END
            WHERE thread_id = ?
            "#,
        )
        .bind(data.at)
        .bind(marks_unread)
        .bind(ThreadStatus::New)
        .bind(ThreadStatus::New.after_new_message())
        .bind(data.thread_id)
        .execute(&mut *tx)
        .await?;

        if touched.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO messages (message_id, thread_id, origin, from_user_id, kind, text, url, at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.message_id)
        .bind(data.thread_id)
        .bind(data.origin.tag())
        .bind(data.origin.author_id())
        .bind(data.kind)
        .bind(&data.text)
        .bind(&data.url)
        .bind(data.at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let seq = result.last_insert_rowid();
        info!("Message appended with seq {}", seq);

        Ok(Message {
            seq,
            message_id: data.message_id.clone(),
            thread_id: data.thread_id,
            origin: data.origin,
            kind: data.kind,
            text: data.text.clone(),
            url: data.url.clone(),
            at: data.at,
            recalled: false,
        })
    }
}
