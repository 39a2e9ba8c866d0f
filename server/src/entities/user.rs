//! User entity - Entità utente (solo i campi usati dal contesto di autenticazione)

use super::enums::UserRole;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl User {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}
