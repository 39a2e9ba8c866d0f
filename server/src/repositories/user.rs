//! UserRepository - Repository per la lettura degli utenti

use super::Read;
use crate::entities::User;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

// USER REPO
pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }
}

impl Read<User, i32> for UserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<User>, Error> {
        debug!("Reading user by id");
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, role, is_active FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}
