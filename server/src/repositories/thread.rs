//! ThreadRepository - Repository per la gestione dei thread (richieste di contatto)

use super::{Create, Delete, Read, Update};
use crate::dtos::{ContactListQuery, CreateMessageDTO, CreateThreadDTO, UpdateThreadDTO};
use crate::entities::Thread;
use chrono::{DateTime, Utc};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

const SELECT_THREAD: &str = r#"
    SELECT
        thread_id, user_id, assigned_to, name, email, phone, company, country,
        subject, message, product_interest, inquiry_type, source, status, priority,
        is_read, customer_last_read_at, response_message, responded_by, responded_at,
        ip_address, user_agent, created_at, updated_at
    FROM threads
"#;

// THREAD REPOSITORY
pub struct ThreadRepository {
    connection_pool: SqlitePool,
}

impl ThreadRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Thread più recente (per updated_at) del cliente con esattamente questo oggetto
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn find_latest_by_owner_and_subject(
        &self,
        user_id: &i32,
        subject: &str,
    ) -> Result<Option<Thread>, Error> {
        debug!("Looking for reusable thread");
        let thread = sqlx::query_as::<_, Thread>(&format!(
            "{SELECT_THREAD} WHERE user_id = ? AND subject = ? ORDER BY updated_at DESC, thread_id DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(subject)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(thread)
    }

    /// Thread visibili al chiamante, dal più recentemente aggiornato.
    /// `owner = None` restituisce tutti i thread (vista dello staff).
    #[instrument(skip(self))]
    pub async fn find_many_by_owner(&self, owner: Option<i32>) -> Result<Vec<Thread>, Error> {
        debug!("Listing threads");
        let threads = match owner {
            Some(user_id) => {
                sqlx::query_as::<_, Thread>(&format!(
                    "{SELECT_THREAD} WHERE user_id = ? ORDER BY updated_at DESC, thread_id DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.connection_pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Thread>(&format!(
                    "{SELECT_THREAD} ORDER BY updated_at DESC, thread_id DESC"
                ))
                .fetch_all(&self.connection_pool)
                .await?
            }
        };

        debug!("Found {} threads", threads.len());
        Ok(threads)
    }

    /// Pagina filtrata per il back-office, dalla più recente per data di creazione.
    /// Restituisce anche il totale dei thread che soddisfano i filtri.
    #[instrument(skip(self, filter))]
    pub async fn search_paginated(
        &self,
        filter: &ContactListQuery,
    ) -> Result<(Vec<Thread>, i64), Error> {
        debug!("Searching threads for back-office");
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM threads WHERE 1 = 1");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut page_query = QueryBuilder::<Sqlite>::new(format!("{SELECT_THREAD} WHERE 1 = 1"));
        push_filters(&mut page_query, filter);
        page_query.push(" ORDER BY created_at DESC, thread_id DESC LIMIT ");
        page_query.push_bind(filter.limit() as i64);
        page_query.push(" OFFSET ");
        page_query.push_bind(filter.offset());

        let threads = page_query
            .build_query_as::<Thread>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Page contains {} of {} threads", threads.len(), total);
        Ok((threads, total))
    }

    /// Crea il thread e il suo primo messaggio nella stessa transazione
    /// (form pubblico: il corpo della richiesta diventa il primo messaggio)
    #[instrument(skip(self, data, first_message), fields(subject = %data.subject))]
    pub async fn create_with_message(
        &self,
        data: &CreateThreadDTO,
        first_message: &CreateMessageDTO,
    ) -> Result<Thread, Error> {
        debug!("Creating thread with first message");
        let mut tx = self.connection_pool.begin().await?;

        let thread_id = insert_thread(&mut *tx, data).await?;
        sqlx::query(
            r#"
            INSERT INTO messages (message_id, thread_id, origin, from_user_id, kind, text, url, at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&first_message.message_id)
        .bind(thread_id)
        .bind(first_message.origin.tag())
        .bind(first_message.origin.author_id())
        .bind(first_message.kind)
        .bind(&first_message.text)
        .bind(&first_message.url)
        .bind(first_message.at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Thread {} created with first message", thread_id);

        self.read(&thread_id).await?.ok_or(Error::RowNotFound)
    }

    /// Lo staff ha aperto il thread: unico punto in cui `is_read` diventa true
    #[instrument(skip(self), fields(thread_id = %thread_id))]
    pub async fn mark_read_by_staff(&self, thread_id: &i32) -> Result<(), Error> {
        sqlx::query("UPDATE threads SET is_read = 1 WHERE thread_id = ?")
            .bind(thread_id)
            .execute(&self.connection_pool)
            .await?;
        debug!("Thread marked as read by staff");
        Ok(())
    }

    /// Il cliente ha letto il thread fino a `read_at` (incluso)
    #[instrument(skip(self), fields(thread_id = %thread_id))]
    pub async fn mark_read_by_customer(
        &self,
        thread_id: &i32,
        read_at: &DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE threads SET customer_last_read_at = ? WHERE thread_id = ?")
            .bind(read_at)
            .bind(thread_id)
            .execute(&self.connection_pool)
            .await?;
        debug!("Thread marked as read by customer");
        Ok(())
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &ContactListQuery) {
    if let Some(status) = filter.status {
        query.push(" AND status = ");
        query.push_bind(status);
    }
    if let Some(priority) = filter.priority {
        query.push(" AND priority = ");
        query.push_bind(priority);
    }
    if let Some(term) = filter.search_term() {
        let pattern = format!("%{}%", term);
        query.push(" AND (name LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR email LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR subject LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR message LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}

async fn insert_thread<'e, E>(executor: E, data: &CreateThreadDTO) -> Result<i32, Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO threads (
            user_id, name, email, phone, company, country, subject, message,
            product_interest, inquiry_type, source, status, ip_address, user_agent,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(data.user_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.company)
    .bind(&data.country)
    .bind(&data.subject)
    .bind(&data.message)
    .bind(&data.product_interest)
    .bind(data.inquiry_type)
    .bind(data.source)
    .bind(data.status)
    .bind(&data.ip_address)
    .bind(&data.user_agent)
    .bind(data.created_at)
    .bind(data.created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid() as i32)
}

impl Create<Thread, CreateThreadDTO> for ThreadRepository {
    #[instrument(skip(self, data), fields(subject = %data.subject))]
    async fn create(&self, data: &CreateThreadDTO) -> Result<Thread, Error> {
        debug!("Creating new thread");
        let new_id = insert_thread(&self.connection_pool, data).await?;
        info!("Thread created with id {}", new_id);

        self.read(&new_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Thread, i32> for ThreadRepository {
    #[instrument(skip(self), fields(thread_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Thread>, Error> {
        debug!("Reading thread by id");
        let thread = sqlx::query_as::<_, Thread>(&format!("{SELECT_THREAD} WHERE thread_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(thread)
    }
}

impl Update<Thread, UpdateThreadDTO, i32> for ThreadRepository {
    #[instrument(skip(self, data), fields(thread_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateThreadDTO) -> Result<Thread, Error> {
        debug!("Updating thread");
        // Build dynamic UPDATE query using QueryBuilder (idiomatic SQLx way)
        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE threads SET ");

        let mut separated = query_builder.separated(", ");
        separated.push("updated_at = ");
        separated.push_bind_unseparated(data.updated_at);
        if let Some(status) = data.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status);
        }
        if let Some(priority) = data.priority {
            separated.push("priority = ");
            separated.push_bind_unseparated(priority);
        }
        if let Some(assigned_to) = data.assigned_to {
            separated.push("assigned_to = ");
            separated.push_bind_unseparated(assigned_to);
        }
        if let Some(ref response_message) = data.response_message {
            separated.push("response_message = ");
            separated.push_bind_unseparated(response_message.clone());
        }
        if let Some(responded_by) = data.responded_by {
            separated.push("responded_by = ");
            separated.push_bind_unseparated(responded_by);
        }
        if let Some(responded_at) = data.responded_at {
            separated.push("responded_at = ");
            separated.push_bind_unseparated(responded_at);
        }

        query_builder.push(" WHERE thread_id = ");
        query_builder.push_bind(*id);

        let result = query_builder.build().execute(&self.connection_pool).await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        info!("Thread updated successfully");

        // Fetch and return the updated thread
        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for ThreadRepository {
    #[instrument(skip(self), fields(thread_id = %id))]
    async fn delete(&self, id: &i32) -> Result<bool, Error> {
        debug!("Deleting thread");
        // i messaggi vengono rimossi in cascata
        let result = sqlx::query("DELETE FROM threads WHERE thread_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Thread deleted successfully");
        }
        Ok(deleted)
    }
}
