//! Message services - Invio e ritiro dei messaggi di un thread

use crate::core::{AppError, AppState};
use crate::dtos::{CreateMessageDTO, MessagesDTO, PostMessageDTO};
use crate::entities::{MessageOrigin, RecallRefusal, Thread, User, generate_message_id};
use crate::repositories::Create;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state, current_user, thread, body), fields(user_id = %current_user.user_id, thread_id = %thread.thread_id))]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Extension(thread): Extension<Thread>,
    Json(body): Json<PostMessageDTO>,
) -> Result<Json<MessagesDTO>, AppError> {
    debug!("Posting message");
    // 1. Validare il contenuto (nessuna scrittura se non è valido)
    // 2. Inserire il messaggio: il repository aggiorna anche updated_at, is_read e status del thread
    // 3. Ritornare la lista completa e ordinata dei messaggi
    let content = body.into_content().map_err(|reason| {
        warn!("Rejected message: {}", reason);
        AppError::bad_request(reason)
    })?;

    let now = Utc::now();
    let message = state
        .msg
        .create(&CreateMessageDTO {
            message_id: generate_message_id(now),
            thread_id: thread.thread_id,
            origin: MessageOrigin::for_author(current_user.user_id, current_user.is_staff()),
            kind: content.kind,
            text: content.text,
            url: content.url,
            at: now,
        })
        .await?;

    info!("Message {} posted", message.message_id);
    let messages = state.msg.find_many_by_thread_id(&thread.thread_id).await?;
    Ok(Json(messages.into()))
}

#[instrument(skip(state, current_user, thread), fields(user_id = %current_user.user_id, thread_id = %thread.thread_id))]
pub async fn recall_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Extension(thread): Extension<Thread>,
    Path((_, message_id)): Path<(i32, String)>,
) -> Result<Json<MessagesDTO>, AppError> {
    debug!("Recalling message {}", message_id);
    let message = state
        .msg
        .find_by_message_id(&thread.thread_id, &message_id)
        .await?
        .ok_or_else(|| {
            warn!("Message {} not found", message_id);
            AppError::not_found("Message not found")
        })?;

    match message.check_recall(current_user.user_id, Utc::now(), state.recall_window) {
        Ok(()) => {
            state.msg.mark_recalled(&thread.thread_id, &message_id).await?;
        }
        Err(RecallRefusal::NotAuthor) => {
            warn!("User {} is not the author of {}", current_user.user_id, message_id);
            return Err(AppError::forbidden("Can only recall your own messages"));
        }
        // ripetere il ritiro di un messaggio già ritirato non è un errore
        Err(RecallRefusal::WindowExpired) if message.recalled => {
            debug!("Message already recalled");
        }
        Err(RecallRefusal::WindowExpired) => {
            warn!("Recall window expired for {}", message_id);
            return Err(AppError::bad_request(format!(
                "Can only recall messages within {}",
                describe_window(state.recall_window)
            )));
        }
    }

    let messages = state.msg.find_many_by_thread_id(&thread.thread_id).await?;
    Ok(Json(messages.into()))
}

/// Finestra di ritiro in forma leggibile: minuti interi se possibile, altrimenti secondi
fn describe_window(window: Duration) -> String {
    let secs = window.num_seconds();
    let (amount, unit) = if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}
