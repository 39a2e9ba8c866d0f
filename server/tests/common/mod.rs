#![allow(dead_code)]

use axum_test::TestServer;
use contact_server::core::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const JWT_SECRET: &str = "contact-test-secret-non-usare-in-produzione";

// utenti delle fixtures (id, username)
pub const ALICE: (i32, &str) = (1, "alice");
pub const BOB: (i32, &str) = (2, "bob");
pub const CAROL: (i32, &str) = (3, "carol"); // editor
pub const DAVE: (i32, &str) = (4, "dave"); // admin
pub const ERIN: (i32, &str) = (5, "erin"); // disattivato

/// Crea un AppState per i test (email disabilitate, finestra di ritiro predefinita)
///
/// # Arguments
/// * `pool` - Connection pool SQLite fornito da `#[sqlx::test]`
pub fn create_test_state(pool: SqlitePool) -> AppState {
    AppState::new(pool, JWT_SECRET.to_string())
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: AppState) -> TestServer {
    let app = contact_server::create_router(Arc::new(state));
    TestServer::new(app).expect("Failed to create test server")
}

pub fn default_server(pool: SqlitePool) -> TestServer {
    create_test_server(create_test_state(pool))
}

/// Genera un JWT token valido per 24 ore per un utente delle fixtures
pub fn token((user_id, username): (i32, &str)) -> String {
    contact_server::core::encode_jwt(username.to_string(), user_id, JWT_SECRET)
        .expect("Failed to create JWT token")
}
