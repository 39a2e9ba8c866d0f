use contact_client::models::Message;
use contact_client::render::render_message;
use contact_client::{ApiClient, ClientConfig, ThreadPoller};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Segue un thread da terminale: stampa i messaggi nuovi ad ogni poll.
/// Configurazione da env (`CONTACT_API_URL`, `CONTACT_TOKEN`, `POLL_INTERVAL_SECS`),
/// il thread si sceglie con `CONTACT_THREAD_ID` oppure si apre la chat "Chat".
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("contact_client=info,contact_watch=info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let client = ApiClient::new(&config)?;

    let thread_id = match env::var("CONTACT_THREAD_ID") {
        Ok(raw) => raw.parse::<i32>()?,
        Err(_) => client.start_thread(None).await?.contact.id,
    };
    info!(thread_id, "watching thread");

    let poller = ThreadPoller::spawn(client, thread_id, config.poll_interval);
    let mut updates = poller.subscribe();
    let mut shown: Vec<Message> = Vec::new();
    let mut was_connected = true;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    error!("poller stopped unexpectedly");
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.connected != was_connected {
                    match state.connected {
                        true => info!("connection restored"),
                        false => warn!(error = ?state.last_error, "connection lost"),
                    }
                    was_connected = state.connected;
                }
                if let Some(thread) = state.thread {
                    // un ritiro modifica messaggi già stampati: in quel caso si ristampa tutto
                    let start = if thread.messages.starts_with(&shown) {
                        shown.len()
                    } else {
                        println!("---");
                        0
                    };
                    for message in &thread.messages[start..] {
                        println!("{}", render_message(message));
                    }
                    shown = thread.messages;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}
