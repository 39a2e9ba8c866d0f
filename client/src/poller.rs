//! ThreadPoller - risincronizzazione periodica del thread aperto
//!
//! Il "tempo reale" della chat è un polling di `GET /threads/{id}`: ogni
//! snapshot viene pubblicato su un canale `watch` insieme allo stato della
//! connessione. Un poll fallito non cancella l'ultimo snapshot valido.

use crate::api::ApiClient;
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::models::Thread;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    /// Ultimo snapshot ricevuto con successo
    pub thread: Option<Thread>,
    /// false dopo un poll fallito, torna true al successivo poll riuscito
    pub connected: bool,
    pub last_error: Option<String>,
}

pub struct ThreadPoller {
    thread_id: i32,
    receiver: watch::Receiver<PollState>,
    handle: JoinHandle<()>,
}

impl ThreadPoller {
    /// Avvia il polling: il primo fetch parte subito, poi uno ogni `every`.
    /// Un intervallo nullo viene sostituito da quello predefinito.
    pub fn spawn(client: ApiClient, thread_id: i32, every: Duration) -> Self {
        let every = if every.is_zero() {
            warn!(thread_id, "zero poll interval, using {:?}", DEFAULT_POLL_INTERVAL);
            DEFAULT_POLL_INTERVAL
        } else {
            every
        };
        let (sender, receiver) = watch::channel(PollState::default());

        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(thread_id, "thread poller started");

            loop {
                ticker.tick().await;
                let outcome = client.get_thread(thread_id).await;
                sender.send_modify(|state| match outcome {
                    Ok(thread) => {
                        debug!(thread_id, messages = thread.messages.len(), "thread refreshed");
                        state.thread = Some(thread);
                        state.connected = true;
                        state.last_error = None;
                    }
                    Err(e) => {
                        warn!(thread_id, error = %e, "thread poll failed");
                        state.connected = false;
                        state.last_error = Some(e.to_string());
                    }
                });
            }
        });

        Self {
            thread_id,
            receiver,
            handle,
        }
    }

    pub fn thread_id(&self) -> i32 {
        self.thread_id
    }

    /// Nuovo receiver: `changed().await` si sveglia ad ogni poll
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> PollState {
        self.receiver.borrow().clone()
    }

    /// Ferma il polling (equivalente al drop)
    pub fn stop(self) {}
}

impl Drop for ThreadPoller {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(thread_id = self.thread_id, "thread poller stopped");
    }
}
