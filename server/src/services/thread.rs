//! Thread services - Apertura, elenco e lettura dei thread di chat

use crate::core::{AppError, AppState};
use crate::dtos::{
    AckDTO, CreateThreadDTO, MessagePreviewDTO, OwnerDTO, StartThreadDTO, ThreadDTO,
    ThreadSummaryDTO,
};
use crate::entities::{InquirySource, InquiryType, Message, Thread, ThreadStatus, User};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, State},
};
use chrono::Utc;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn start_thread(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<StartThreadDTO>,
) -> Result<Json<ThreadDTO>, AppError> {
    debug!("Starting or reusing chat thread");
    // 1. Normalizzare l'oggetto (trim, "Chat" se vuoto)
    // 2. Sotto il lock di creazione, cercare il thread più recente del cliente con lo stesso oggetto
    // 3. Se esiste lo si riusa, altrimenti si crea un thread In Progress senza messaggi
    let subject = body.normalized_subject();

    let _creation_guard = state.thread_creation.lock().await;

    if let Some(thread) = state
        .thread
        .find_latest_by_owner_and_subject(&current_user.user_id, &subject)
        .await?
    {
        debug!("Reusing thread {}", thread.thread_id);
        let messages = state.msg.find_many_by_thread_id(&thread.thread_id).await?;
        return Ok(Json(ThreadDTO::new(thread, messages)));
    }

    let thread = state
        .thread
        .create(&CreateThreadDTO {
            user_id: Some(current_user.user_id),
            name: current_user.username.clone(),
            email: current_user.email.clone(),
            phone: None,
            company: None,
            country: None,
            subject,
            message: String::new(),
            product_interest: None,
            inquiry_type: InquiryType::default(),
            source: InquirySource::default(),
            status: ThreadStatus::InProgress,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        })
        .await?;

    info!("Chat thread {} opened", thread.thread_id);
    Ok(Json(ThreadDTO::new(thread, Vec::new())))
}

fn summarize(
    thread: Thread,
    owner: Option<User>,
    viewer: &User,
    messages: &[Message],
) -> ThreadSummaryDTO {
    ThreadSummaryDTO {
        owner: owner.map(OwnerDTO::from),
        unread_count: thread.unread_count_for(viewer, messages),
        last_message: messages.last().map(MessagePreviewDTO::from),
        contact: thread.into(),
    }
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<ThreadSummaryDTO>>, AppError> {
    debug!("Listing threads");
    // lo staff vede tutti i thread, il cliente solo i propri
    let owner = (!current_user.is_staff()).then_some(current_user.user_id);
    let threads = state.thread.find_many_by_owner(owner).await?;

    let viewer = &current_user;
    let summaries: Vec<ThreadSummaryDTO> = try_join_all(threads.into_iter().map(|thread| {
        let state = state.clone();
        async move {
            let messages = state.msg.find_many_by_thread_id(&thread.thread_id).await?;
            let owner = match thread.user_id {
                Some(user_id) => state.user.read(&user_id).await?,
                None => None,
            };
            Ok::<_, sqlx::Error>(summarize(thread, owner, viewer, &messages))
        }
    }))
    .await?;

    info!("Successfully retrieved {} threads", summaries.len());
    Ok(Json(summaries))
}

#[instrument(skip(state, thread), fields(thread_id = %thread.thread_id))]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Extension(thread): Extension<Thread>, // caricato dal thread_access_middleware
) -> Result<Json<ThreadDTO>, AppError> {
    debug!("Fetching thread");
    let messages = state.msg.find_many_by_thread_id(&thread.thread_id).await?;
    Ok(Json(ThreadDTO::new(thread, messages)))
}

#[instrument(skip(state, current_user, thread), fields(user_id = %current_user.user_id, thread_id = %thread.thread_id))]
pub async fn mark_thread_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Extension(thread): Extension<Thread>,
) -> Result<Json<AckDTO>, AppError> {
    // l'accesso è già verificato: chi non è staff qui è il proprietario
    if current_user.is_staff() {
        state.thread.mark_read_by_staff(&thread.thread_id).await?;
    } else {
        state
            .thread
            .mark_read_by_customer(&thread.thread_id, &Utc::now())
            .await?;
    }

    info!("Thread marked as read");
    Ok(Json(AckDTO::new("Marked as read")))
}
