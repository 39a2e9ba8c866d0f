//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SULLE QUERY ************************* //

/*
   Le query usano sqlx::query / sqlx::query_as con i parametri passati tramite .bind(),
   e non le macro query! / query_as!: le macro richiedono un database raggiungibile
   (o i metadati offline) già in fase di compilazione.
   La mappatura riga -> entità la fa #[derive(sqlx::FromRow)] sulle entities
   (Message ha un FromRow scritto a mano perché ricompone l'autore da due colonne).

   Promemoria sui metodi di fetch:
   .execute(...)         -> INSERT/UPDATE/DELETE, restituisce rows_affected / last_insert_rowid
   .fetch_optional(...)  -> zero o una riga
   .fetch_one(...)       -> esattamente una riga (aggregati come COUNT(*))
   .fetch_all(...)       -> Vec con tutte le righe

   Ogni errore è sqlx::Error e risale con ? fino al service, dove diventa AppError.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod message;
pub mod thread;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use message::MessageRepository;
pub use thread::ThreadRepository;
pub use user::UserRepository;
