//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod contact;
pub mod message;
pub mod query;
pub mod thread;

// Re-exports per facilitare l'import
pub use contact::{AckDTO, ContactFormDTO, ContactPageDTO, ContactSubmittedDTO, PaginationDTO};
pub use message::{CreateMessageDTO, MessageContent, MessageDTO, MessagesDTO, PostMessageDTO};
pub use query::ContactListQuery;
pub use thread::{
    ContactDTO, CreateThreadDTO, MessagePreviewDTO, OwnerDTO, RespondDTO, StartThreadDTO, ThreadDTO,
    ThreadSummaryDTO, UpdateStatusDTO, UpdateThreadDTO,
};
