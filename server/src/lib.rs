//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod notifier;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root))
        .nest("/threads", configure_thread_routes(state.clone()))
        .nest("/contact", configure_contact_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Configura le routes dei thread di chat
fn configure_thread_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, thread_access_middleware};
    use services::*;

    // Rotte che NON lavorano su un thread specifico (solo autenticazione)
    let collection_routes = Router::new()
        .route("/", get(list_threads).post(start_thread))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // Rotte su un singolo thread (autenticazione + controllo di accesso al thread)
    let thread_routes = Router::new()
        .route("/{thread_id}", get(get_thread))
        .route("/{thread_id}/read", put(mark_thread_read))
        .route("/{thread_id}/messages", post(post_message))
        .route(
            "/{thread_id}/messages/{message_id}/recall",
            put(recall_message),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            thread_access_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    collection_routes.merge(thread_routes)
}

/// Configura le routes del form pubblico e del back-office
fn configure_contact_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, optional_authentication_middleware};
    use services::*;

    // Il form è pubblico: un token valido collega solo la richiesta all'account
    let public_routes = Router::new()
        .route("/", post(submit_contact_form))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_authentication_middleware,
        ));

    // Back-office: il controllo del ruolo avviene negli handler
    let staff_routes = Router::new()
        .route("/", get(list_contacts))
        .route("/{contact_id}/status", put(update_contact_status))
        .route("/{contact_id}/respond", put(respond_to_contact))
        .route("/{contact_id}", delete(delete_contact))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(staff_routes)
}
