//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::notifier::EmailNotifier;
use crate::repositories::{MessageRepository, ThreadRepository, UserRepository};
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Finestra di ritiro predefinita: 2 minuti
pub const DEFAULT_RECALL_WINDOW_SECS: i64 = 120;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per la gestione dei thread (richieste di contatto)
    pub thread: ThreadRepository,

    /// Repository per la gestione dei messaggi dei thread
    pub msg: MessageRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Finestra entro cui l'autore può ritirare un proprio messaggio
    pub recall_window: Duration,

    /// Notifiche email best-effort (disabilitate se SMTP non è configurato)
    pub notifier: Arc<EmailNotifier>,

    /// Serializza il "cerca o crea" dei thread di chat all'interno del processo,
    /// evitando thread duplicati per la stessa coppia (utente, oggetto)
    pub thread_creation: Mutex<()>,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e la JWT secret.
    ///
    /// Le notifiche email partono disabilitate, la finestra di ritiro è quella predefinita.
    pub fn new(pool: SqlitePool, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            thread: ThreadRepository::new(pool.clone()),
            msg: MessageRepository::new(pool),
            jwt_secret,
            recall_window: Duration::seconds(DEFAULT_RECALL_WINDOW_SECS),
            notifier: Arc::new(EmailNotifier::disabled()),
            thread_creation: Mutex::new(()),
        }
    }

    pub fn with_notifier(mut self, notifier: EmailNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_recall_window(mut self, window: Duration) -> Self {
        self.recall_window = window;
        self
    }
}
