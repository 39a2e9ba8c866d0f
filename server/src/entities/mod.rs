//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod enums;
pub mod message;
pub mod thread;
pub mod user;

// Re-exports per facilitare l'import
pub use enums::{
    InquirySource, InquiryType, MessageKind, OriginTag, Priority, ThreadStatus, UserRole,
};
pub use message::{Message, MessageOrigin, RecallRefusal, generate_message_id};
pub use thread::Thread;
pub use user::User;
