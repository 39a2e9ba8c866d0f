//! Common repository traits
//!
//! Generic CRUD interfaces shared by the thread, message and user repositories.
//! Every method returns `sqlx::Error` so that services can propagate it with `?`
//! and let `AppError` pick the status code.

/// Trait for inserting a new row
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with keys assigned by the database)
/// * `CreateDTO` - Input data without database-assigned keys
pub trait Create<Entity, CreateDTO> {
    /// Inserts a new row and returns the stored entity
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for reading a single entity by primary key
///
/// # Returns
/// * `Ok(Some(Entity))` - Entity found
/// * `Ok(None)` - No entity with that key
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Trait for partial updates: only `Some(_)` fields of the DTO are written
pub trait Update<Entity, UpdateDTO, Id> {
    /// # Returns
    /// * `Ok(Entity)` - Updated entity
    /// * `Err(sqlx::Error::RowNotFound)` - No entity with that key
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for deleting entities
pub trait Delete<Id> {
    /// # Returns
    /// * `Ok(true)` - A row was deleted
    /// * `Ok(false)` - Nothing matched the key
    async fn delete(&self, id: &Id) -> Result<bool, sqlx::Error>;
}
