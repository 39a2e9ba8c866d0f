use crate::core::{AppError, AppState};
use crate::entities::{Thread, User, UserRole};
use crate::repositories::Read;
use axum::extract::{Path, State};
use axum::{Error, body::Body, extract::Request, http, http::HeaderMap, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i32,
    pub username: String,
}

/// Firma un token per l'utente. L'emissione dei token appartiene al servizio di
/// autenticazione esterno, qui serve a strumenti e test.
#[instrument(skip(secret), fields(username = %username, id = %id))]
pub fn encode_jwt(username: String, id: i32, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(24);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        username,
        id,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded successfully for user: {}", data.claims.username);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Estrae il token dall'header `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("No token, authorization denied"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header"))?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::unauthorized("Invalid authorization header")),
    }
}

/// Risolve l'utente a partire dal token: l'utente viene sempre ricaricato dal db
/// e deve essere ancora attivo
async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers)?;
    let token_data = decode_jwt(token, &state.jwt_secret)
        .map_err(|_| AppError::unauthorized("Token is not valid"))?;

    match state.user.read(&token_data.claims.id).await? {
        Some(user) if user.is_active => Ok(user),
        Some(user) => {
            warn!("Inactive user attempted access: {}", user.user_id);
            Err(AppError::unauthorized("Token is not valid"))
        }
        None => {
            warn!("User not found in database: {}", token_data.claims.id);
            Err(AppError::unauthorized("Token is not valid"))
        }
    }
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let current_user = resolve_user(&state, req.headers()).await.map_err(|e| {
        warn!("Authentication failed: {}", e.message());
        e
    })?;
    info!("User authenticated: {}", current_user.username);

    // l'utente si recupera negli handler con Extension<User>
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Come `authentication_middleware` ma non rifiuta mai la richiesta: per il form
/// pubblico un token valido collega la richiesta all'account, altrimenti è un ospite
#[instrument(skip(state, req, next))]
pub async fn optional_authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response<Body> {
    if req.headers().contains_key(http::header::AUTHORIZATION) {
        match resolve_user(&state, req.headers()).await {
            Ok(user) => {
                debug!("Request attached to user {}", user.user_id);
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!("Ignoring invalid credentials on public route: {}", e.message()),
        }
    }
    next.run(req).await
}

/// Middleware che verifica che l'utente corrente possa accedere al thread del path
/// (staff oppure proprietario) e inserisce il thread nell'Extension
#[instrument(skip(state, params, req, next))]
pub async fn thread_access_middleware(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running thread access middleware");
    // 1. Ottenere l'utente corrente dall'Extension (inserito dall'authentication_middleware)
    let current_user = req
        .extensions()
        .get::<User>()
        .ok_or_else(|| {
            warn!("User not found in request extensions");
            AppError::unauthorized("User not authenticated")
        })?
        .clone();

    // 2. Estrarre thread_id dal path
    let thread_id: i32 = params
        .get("thread_id")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| {
            warn!("Thread ID not found in path: {}", req.uri().path());
            AppError::bad_request("Invalid thread id")
        })?;

    // 3. Caricare il thread, 404 se non esiste
    let thread = state.thread.read(&thread_id).await?.ok_or_else(|| {
        warn!("Thread {} not found", thread_id);
        AppError::not_found("Thread not found")
    })?;

    // 4. Lo staff vede tutto, il cliente solo i propri thread
    if !thread.is_accessible_by(&current_user) {
        warn!(
            "User {} is not permitted on thread {}",
            current_user.user_id, thread_id
        );
        return Err(AppError::forbidden("Not permitted"));
    }

    debug!("User {} granted access to thread {}", current_user.user_id, thread_id);
    req.extensions_mut().insert::<Thread>(thread);

    Ok(next.run(req).await)
}

/// Helper function per verificare che un utente abbia uno dei ruoli richiesti
///
/// # Arguments
/// * `user` - L'utente da verificare
/// * `allowed_roles` - Lista di ruoli permessi
///
/// # Returns
/// * `Ok(())` se il ruolo è permesso
/// * `Err(AppError)` se il ruolo non è tra quelli permessi
#[instrument(skip(user), fields(user_id = %user.user_id))]
pub fn require_role(user: &User, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&user.role) {
        warn!(
            "User {} has insufficient role {:?}, required one of: {:?}",
            user.user_id, user.role, allowed_roles
        );
        return Err(AppError::forbidden("Access denied").with_details(format!(
            "This action requires one of the following roles: {:?}",
            allowed_roles
        )));
    }

    debug!("Role check passed for user {} with role {:?}", user.user_id, user.role);
    Ok(())
}
