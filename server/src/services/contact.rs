//! Contact services - Form pubblico e back-office delle richieste di contatto

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{
    AckDTO, ContactDTO, ContactFormDTO, ContactListQuery, ContactPageDTO, ContactSubmittedDTO,
    CreateMessageDTO, CreateThreadDTO, PaginationDTO, RespondDTO, UpdateStatusDTO, UpdateThreadDTO,
};
use crate::entities::{
    InquirySource, MessageKind, MessageOrigin, Thread, ThreadStatus, User, UserRole,
    generate_message_id,
};
use crate::repositories::{Delete, Read, Update};
use axum::{
    Extension,
    extract::{ConnectInfo, Json, Path, Query, State},
    http::{HeaderMap, header},
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const STAFF_ROLES: &[UserRole] = &[UserRole::Editor, UserRole::Admin];

/// IP del richiedente: prima voce di X-Forwarded-For, altrimenti l'indirizzo del socket
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

// i campi opzionali del form arrivano spesso come stringa vuota
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn load_contact(state: &AppState, contact_id: i32) -> Result<Thread, AppError> {
    state.thread.read(&contact_id).await?.ok_or_else(|| {
        warn!("Contact inquiry {} not found", contact_id);
        AppError::not_found("Contact inquiry not found")
    })
}

#[instrument(skip(state, current_user, connect_info, headers, body))]
pub async fn submit_contact_form(
    State(state): State<Arc<AppState>>,
    current_user: Option<Extension<User>>, // presente solo se la richiesta ha un token valido
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    headers: HeaderMap,
    Json(mut body): Json<ContactFormDTO>,
) -> Result<Json<ContactSubmittedDTO>, AppError> {
    debug!("Submitting contact form");
    // 1. Normalizzare e validare il form
    // 2. Creare sempre un nuovo thread New con il corpo della richiesta come primo messaggio
    // 3. Inviare le email in background, senza attendere
    body.phone = blank_to_none(body.phone);
    body.company = blank_to_none(body.company);
    body.country = blank_to_none(body.country);
    body.product_interest = blank_to_none(body.product_interest);
    body.validate()?;

    let owner = current_user.map(|Extension(user)| user);
    let origin = match &owner {
        Some(user) => MessageOrigin::Customer(user.user_id),
        None => MessageOrigin::Guest,
    };
    let peer = connect_info.map(|Extension(ConnectInfo(addr))| addr);
    let now = Utc::now();

    let thread_data = CreateThreadDTO {
        user_id: owner.as_ref().map(|user| user.user_id),
        name: body.name,
        email: body.email,
        phone: body.phone,
        company: body.company,
        country: body.country,
        subject: body.subject,
        message: body.message.clone(),
        product_interest: body.product_interest,
        inquiry_type: body.inquiry_type,
        source: InquirySource::WebsiteForm,
        status: ThreadStatus::New,
        ip_address: client_ip(&headers, peer),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(String::from),
        created_at: now,
    };
    let first_message = CreateMessageDTO {
        message_id: generate_message_id(now),
        thread_id: 0, // assegnato dal repository dentro la transazione
        origin,
        kind: MessageKind::Text,
        text: body.message,
        url: String::new(),
        at: now,
    };

    let thread = state
        .thread
        .create_with_message(&thread_data, &first_message)
        .await?;
    info!("Contact inquiry {} submitted", thread.thread_id);

    state.notifier.notify_new_inquiry(&thread);

    Ok(Json(ContactSubmittedDTO {
        message: "Contact form submitted successfully".to_string(),
        contact_id: thread.thread_id,
    }))
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ContactPageDTO>, AppError> {
    debug!("Listing contact inquiries");
    require_role(&current_user, STAFF_ROLES)?;
    query.validate()?;

    let (threads, total) = state.thread.search_paginated(&query).await?;
    let contacts: Vec<ContactDTO> = threads.into_iter().map(ContactDTO::from).collect();

    info!("Returning {} of {} contact inquiries", contacts.len(), total);
    Ok(Json(ContactPageDTO {
        contacts,
        pagination: PaginationDTO::new(query.page(), query.limit(), total),
    }))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, contact_id = %contact_id))]
pub async fn update_contact_status(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(contact_id): Path<i32>,
    Json(body): Json<UpdateStatusDTO>,
) -> Result<Json<ContactDTO>, AppError> {
    debug!("Updating contact status");
    require_role(&current_user, STAFF_ROLES)?;
    load_contact(&state, contact_id).await?;

    if let Some(assignee_id) = body.assigned_to {
        match state.user.read(&assignee_id).await? {
            Some(assignee) if assignee.is_staff() => {}
            _ => {
                warn!("Cannot assign inquiry to user {}", assignee_id);
                return Err(AppError::bad_request("Assignee must be a staff member"));
            }
        }
    }

    let updated = state
        .thread
        .update(
            &contact_id,
            &UpdateThreadDTO {
                status: Some(body.status),
                priority: body.priority,
                assigned_to: body.assigned_to,
                ..UpdateThreadDTO::touched_at(Utc::now())
            },
        )
        .await?;

    info!("Contact {} moved to {:?}", contact_id, updated.status);
    Ok(Json(updated.into()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, contact_id = %contact_id))]
pub async fn respond_to_contact(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(contact_id): Path<i32>,
    Json(body): Json<RespondDTO>,
) -> Result<Json<AckDTO>, AppError> {
    debug!("Responding to contact inquiry");
    require_role(&current_user, STAFF_ROLES)?;
    body.validate()?;
    load_contact(&state, contact_id).await?;

    let now = Utc::now();
    let updated = state
        .thread
        .update(
            &contact_id,
            &UpdateThreadDTO {
                status: Some(ThreadStatus::Responded),
                response_message: Some(body.response),
                responded_by: Some(current_user.user_id),
                responded_at: Some(now),
                ..UpdateThreadDTO::touched_at(now)
            },
        )
        .await?;

    state.notifier.notify_response(&updated);

    info!("Response stored for contact {}", contact_id);
    Ok(Json(AckDTO::new("Response sent successfully")))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, contact_id = %contact_id))]
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(contact_id): Path<i32>,
) -> Result<Json<AckDTO>, AppError> {
    debug!("Deleting contact inquiry");
    require_role(&current_user, &[UserRole::Admin])?;

    if !state.thread.delete(&contact_id).await? {
        warn!("Contact inquiry {} not found", contact_id);
        return Err(AppError::not_found("Contact inquiry not found"));
    }

    info!("Contact inquiry {} deleted", contact_id);
    Ok(Json(AckDTO::new("Contact inquiry deleted successfully")))
}
