//! Integration tests per invio e ritiro dei messaggi

mod common;

#[cfg(test)]
mod message_tests {
    use super::common::*;
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    async fn post(server: &TestServer, user: (i32, &str), thread_id: i32, body: Value) -> Value {
        let response = server
            .post(&format!("/threads/{}/messages", thread_id))
            .authorization_bearer(token(user))
            .json(&body)
            .await;
        response.assert_status_ok();
        response.json()
    }

    async fn fetch_thread(server: &TestServer, thread_id: i32) -> Value {
        server
            .get(&format!("/threads/{}", thread_id))
            .authorization_bearer(token(DAVE))
            .await
            .json()
    }

    fn last(messages: &Value) -> &Value {
        messages["messages"].as_array().unwrap().last().unwrap()
    }

    // ============================================================
    // POST /threads/{id}/messages - post_message
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_staff_text_message_keeps_read_flag(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let body = post(&server, CAROL, 2, json!({ "type": "text", "text": "Hello" })).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        let appended = last(&body);
        assert_eq!(appended["from"], "admin");
        assert_eq!(appended["from_user_id"], 3);
        assert_eq!(appended["type"], "text");
        assert_eq!(appended["text"], "Hello");
        assert_eq!(appended["recalled"], false);

        let thread = fetch_thread(&server, 2).await;
        assert_eq!(thread["is_read"], true);
        // New -> In Progress anche per i messaggi dello staff
        assert_eq!(thread["status"], "In Progress");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_customer_image_message_marks_unread(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .put("/threads/1/read")
            .authorization_bearer(token(CAROL))
            .await
            .assert_status_ok();

        let body = post(
            &server,
            ALICE,
            1,
            json!({ "type": "image", "url": " https://x/y.jpg " }),
        )
        .await;
        let appended = last(&body);
        assert_eq!(appended["from"], "user");
        assert_eq!(appended["type"], "image");
        assert_eq!(appended["url"], "https://x/y.jpg");
        assert_eq!(appended["text"], "");

        let thread = fetch_thread(&server, 1).await;
        assert_eq!(thread["is_read"], false);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_message_updates_thread_order(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        // il thread dell'ospite era l'ultimo, ora è il più recente
        post(&server, DAVE, 3, json!({ "text": "Quote attached" })).await;

        let threads: Vec<Value> = server
            .get("/threads")
            .authorization_bearer(token(CAROL))
            .await
            .json();
        assert_eq!(threads[0]["id"], 3);
        assert_eq!(threads[0]["last_message"]["text"], "Quote attached");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_messages_keep_insertion_order(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        for text in ["one", "two", "three"] {
            post(&server, ALICE, 1, json!({ "text": text })).await;
        }

        let thread = fetch_thread(&server, 1).await;
        let texts: Vec<&str> = thread["messages"]
            .as_array()
            .unwrap()
            .iter()
            .skip(3)
            .map(|m| m["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_invalid_messages_are_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let cases = [
            (json!({ "type": "text", "text": "   " }), "Message text is required"),
            (json!({}), "Message text is required"),
            (json!({ "type": "video", "text": "look" }), "Media url is required"),
            (json!({ "type": "audio", "url": "" }), "Media url is required"),
            (json!({ "type": "sticker", "url": "https://x/s.png" }), "Unsupported message type"),
        ];

        for (body, expected) in cases {
            let response = server
                .post("/threads/1/messages")
                .authorization_bearer(token(ALICE))
                .json(&body)
                .await;
            response.assert_status_bad_request();
            let error: Value = response.json();
            assert_eq!(error["error"], expected);
        }

        let thread = fetch_thread(&server, 1).await;
        assert_eq!(thread["messages"].as_array().unwrap().len(), 3);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_message_type_is_case_insensitive(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let body = post(&server, ALICE, 1, json!({ "type": "VIDEO", "url": "https://x/v.mp4" })).await;
        assert_eq!(last(&body)["type"], "video");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_foreign_customer_cannot_post(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .post("/threads/1/messages")
            .authorization_bearer(token(BOB))
            .json(&json!({ "text": "hi" }))
            .await
            .assert_status_forbidden();
        server
            .post("/threads/77/messages")
            .authorization_bearer(token(BOB))
            .json(&json!({ "text": "hi" }))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_concurrent_appends_both_survive(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let server_ref = &server;
        let (from_customer, from_staff) = tokio::join!(
            async move { post(server_ref, ALICE, 1, json!({ "text": "from customer" })).await },
            async move { post(server_ref, CAROL, 1, json!({ "text": "from staff" })).await },
        );
        assert!(from_customer["messages"].is_array());
        assert!(from_staff["messages"].is_array());

        let thread = fetch_thread(&server, 1).await;
        let messages = thread["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 5);
        assert!(messages.iter().any(|m| m["text"] == "from customer"));
        assert!(messages.iter().any(|m| m["text"] == "from staff"));
        Ok(())
    }

    // ============================================================
    // PUT /threads/{id}/messages/{message_id}/recall - recall_message
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_recall_own_message_hides_content(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let body = post(&server, ALICE, 1, json!({ "text": "wrong chat, sorry" })).await;
        let message_id = last(&body)["id"].as_str().unwrap().to_string();
        let recall_path = format!("/threads/1/messages/{}/recall", message_id);

        let response = server
            .put(&recall_path)
            .authorization_bearer(token(ALICE))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let recalled = last(&body);
        assert_eq!(recalled["id"], message_id.as_str());
        assert_eq!(recalled["recalled"], true);
        assert!(recalled.get("text").is_none());
        assert!(recalled.get("url").is_none());

        // anche lo staff vede solo il segnaposto
        let thread = fetch_thread(&server, 1).await;
        let seen_by_staff = thread["messages"].as_array().unwrap().last().unwrap();
        assert_eq!(seen_by_staff["recalled"], true);
        assert!(seen_by_staff.get("text").is_none());

        let threads: Vec<Value> = server
            .get("/threads")
            .authorization_bearer(token(ALICE))
            .await
            .json();
        assert_eq!(threads[0]["last_message"]["text"], "[recalled]");

        // ritirare di nuovo non è un errore
        server
            .put(&recall_path)
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_staff_cannot_recall_other_staff_message(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server
            .put("/threads/1/messages/1735809000000dave00001/recall")
            .authorization_bearer(token(CAROL))
            .await;
        response.assert_status_forbidden();
        let body: Value = response.json();
        assert_eq!(body["error"], "Can only recall your own messages");

        let thread = fetch_thread(&server, 1).await;
        assert_eq!(thread["messages"][2]["recalled"], false);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_staff_cannot_recall_customer_message(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .put("/threads/1/messages/1735808400000alice0001/recall")
            .authorization_bearer(token(DAVE))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_recall_after_window_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        // messaggio di alice del 2025, ben oltre i 2 minuti
        let response = server
            .put("/threads/1/messages/1735808400000alice0001/recall")
            .authorization_bearer(token(ALICE))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Can only recall messages within 2 minutes");

        let thread = fetch_thread(&server, 1).await;
        assert_eq!(thread["messages"][0]["recalled"], false);
        assert_eq!(thread["messages"][0]["text"], "Hi, is the crane still available?");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_recall_window_is_configurable(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool).with_recall_window(chrono::Duration::seconds(30));
        let server = create_test_server(state);

        // dentro la finestra di 30 secondi
        let body = post(&server, ALICE, 1, json!({ "text": "typo" })).await;
        let message_id = last(&body)["id"].as_str().unwrap().to_string();
        server
            .put(&format!("/threads/1/messages/{}/recall", message_id))
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_ok();

        // fuori finestra: il motivo riporta la finestra configurata
        let response = server
            .put("/threads/1/messages/1735808400000alice0001/recall")
            .authorization_bearer(token(ALICE))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Can only recall messages within 30 seconds");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_recall_rejected_with_tiny_window(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool).with_recall_window(chrono::Duration::zero());
        let server = create_test_server(state);

        let body = post(&server, ALICE, 1, json!({ "text": "instant" })).await;
        let message_id = last(&body)["id"].as_str().unwrap().to_string();

        server
            .put(&format!("/threads/1/messages/{}/recall", message_id))
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_recall_unknown_message(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server
            .put("/threads/1/messages/does-not-exist/recall")
            .authorization_bearer(token(ALICE))
            .await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "Message not found");

        // l'id esiste ma in un altro thread
        server
            .put("/threads/2/messages/1735808400000alice0001/recall")
            .authorization_bearer(token(CAROL))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_recall_on_foreign_thread(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .put("/threads/2/messages/1735891200000bob000001/recall")
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_forbidden();
        Ok(())
    }
}
