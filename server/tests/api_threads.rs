//! Integration tests per gli endpoints dei thread di chat

mod common;

#[cfg(test)]
mod thread_tests {
    use super::common::*;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    fn ids(threads: &[Value]) -> Vec<i64> {
        threads.iter().map(|t| t["id"].as_i64().unwrap()).collect()
    }

    // ============================================================
    // POST /threads - start_thread
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_start_thread_creates_new_chat(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        // bob non ha ancora un thread "Chat"
        let response = server
            .post("/threads")
            .authorization_bearer(token(BOB))
            .json(&json!({ "subject": "Chat" }))
            .await;

        response.assert_status_ok();
        let thread: Value = response.json();
        assert_eq!(thread["subject"], "Chat");
        assert_eq!(thread["status"], "In Progress");
        assert_eq!(thread["user_id"], 2);
        assert_eq!(thread["name"], "bob");
        assert_eq!(thread["message"], "");
        assert_eq!(thread["messages"], json!([]));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_start_thread_reuses_existing(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server
            .post("/threads")
            .authorization_bearer(token(ALICE))
            .json(&json!({ "subject": "   Chat  " }))
            .await;
        response.assert_status_ok();
        let thread: Value = response.json();
        assert_eq!(thread["id"], 1);
        assert_eq!(thread["messages"].as_array().unwrap().len(), 3);

        // oggetto assente -> "Chat", stesso thread
        let response = server
            .post("/threads")
            .authorization_bearer(token(ALICE))
            .json(&json!({}))
            .await;
        let thread: Value = response.json();
        assert_eq!(thread["id"], 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_start_thread_concurrent_requests_share_thread(
        pool: SqlitePool,
    ) -> sqlx::Result<()> {
        let server = default_server(pool.clone());

        let server = &server;
        let open = || async move {
            server
                .post("/threads")
                .authorization_bearer(token(BOB))
                .json(&json!({ "subject": "Spare parts" }))
                .await
        };
        let (first, second) = tokio::join!(open(), open());

        let first: Value = first.json();
        let second: Value = second.json();
        assert_eq!(first["id"], second["id"]);

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM threads WHERE user_id = 2 AND subject = 'Spare parts'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_start_thread_without_token(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server.post("/threads").json(&json!({})).await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"], "No token, authorization denied");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_inactive_user_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server.get("/threads").authorization_bearer(token(ERIN)).await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_invalid_token_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server
            .get("/threads")
            .authorization_bearer("invalid_token_here")
            .await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"], "Token is not valid");
        Ok(())
    }

    // ============================================================
    // GET /threads - list_threads
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_staff_lists_all_threads_by_update(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server.get("/threads").authorization_bearer(token(CAROL)).await;
        response.assert_status_ok();
        let threads: Vec<Value> = response.json();
        assert_eq!(ids(&threads), vec![2, 1, 3]);

        // staff: 1 se il thread non è letto, 0 altrimenti
        assert_eq!(threads[0]["unread_count"], 0);
        assert_eq!(threads[1]["unread_count"], 1);
        assert_eq!(threads[2]["unread_count"], 1);

        let preview = &threads[1]["last_message"];
        assert_eq!(preview["text"], "[image]");
        assert_eq!(preview["type"], "image");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_thread_list_includes_owner(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server.get("/threads").authorization_bearer(token(CAROL)).await;
        let threads: Vec<Value> = response.json();

        let bob = &threads[0]["owner"];
        assert_eq!(bob["user_id"], 2);
        assert_eq!(bob["username"], "bob");
        assert_eq!(bob["email"], "bob@example.com");
        assert_eq!(threads[1]["owner"]["username"], "alice");
        // richiesta anonima dal form
        assert!(threads[2]["owner"].is_null());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_customer_lists_only_own_threads(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server.get("/threads").authorization_bearer(token(ALICE)).await;
        response.assert_status_ok();
        let threads: Vec<Value> = response.json();
        assert_eq!(ids(&threads), vec![1]);
        // due messaggi dello staff mai letti
        assert_eq!(threads[0]["unread_count"], 2);
        assert!(threads[0].get("messages").is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_empty_thread_has_no_preview(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .post("/threads")
            .authorization_bearer(token(BOB))
            .json(&json!({ "subject": "Chat" }))
            .await
            .assert_status_ok();

        let threads: Vec<Value> = server
            .get("/threads")
            .authorization_bearer(token(BOB))
            .await
            .json();
        let chat = threads.iter().find(|t| t["subject"] == "Chat").unwrap();
        assert_eq!(chat["last_message"], Value::Null);
        assert_eq!(chat["unread_count"], 0);
        Ok(())
    }

    // ============================================================
    // GET /threads/{id} - get_thread
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_get_thread_returns_ordered_messages(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server.get("/threads/1").authorization_bearer(token(ALICE)).await;
        response.assert_status_ok();
        let thread: Value = response.json();
        let messages = thread["messages"].as_array().unwrap();
        let message_ids: Vec<&str> = messages.iter().map(|m| m["id"].as_str().unwrap()).collect();
        assert_eq!(
            message_ids,
            vec!["1735808400000alice0001", "1735808700000carol0001", "1735809000000dave00001"]
        );
        assert_eq!(messages[0]["from"], "user");
        assert_eq!(messages[1]["from"], "admin");
        assert_eq!(messages[2]["url"], "https://cdn.example.com/crane.jpg");
        // ip e user agent non vengono esposti
        assert!(thread.get("ip_address").is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_get_thread_has_no_side_effects(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .get("/threads/1")
            .authorization_bearer(token(CAROL))
            .await
            .assert_status_ok();

        let thread: Value = server
            .get("/threads/1")
            .authorization_bearer(token(CAROL))
            .await
            .json();
        assert_eq!(thread["is_read"], false);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_get_thread_access_rules(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        // thread di alice visto da bob
        let response = server.get("/threads/1").authorization_bearer(token(BOB)).await;
        response.assert_status_forbidden();
        let body: Value = response.json();
        assert_eq!(body["error"], "Not permitted");

        // thread di un ospite: solo staff
        server
            .get("/threads/3")
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_forbidden();
        server
            .get("/threads/3")
            .authorization_bearer(token(DAVE))
            .await
            .assert_status_ok();

        server
            .get("/threads/999")
            .authorization_bearer(token(CAROL))
            .await
            .assert_status_not_found();

        server
            .get("/threads/abc")
            .authorization_bearer(token(CAROL))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // PUT /threads/{id}/read - mark_thread_read
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_staff_mark_read_clears_unread(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        let response = server
            .put("/threads/1/read")
            .authorization_bearer(token(CAROL))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Marked as read");

        let threads: Vec<Value> = server
            .get("/threads")
            .authorization_bearer(token(CAROL))
            .await
            .json();
        let thread = threads.iter().find(|t| t["id"] == 1).unwrap();
        assert_eq!(thread["unread_count"], 0);
        assert_eq!(thread["is_read"], true);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_customer_mark_read_keeps_staff_flag(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .put("/threads/1/read")
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_ok();

        let threads: Vec<Value> = server
            .get("/threads")
            .authorization_bearer(token(ALICE))
            .await
            .json();
        assert_eq!(threads[0]["unread_count"], 0);
        // is_read è il flag dello staff, il cliente non lo tocca
        assert_eq!(threads[0]["is_read"], false);

        // un nuovo messaggio dello staff torna a contare
        server
            .post("/threads/1/messages")
            .authorization_bearer(token(CAROL))
            .json(&json!({ "text": "Anything else?" }))
            .await
            .assert_status_ok();
        let threads: Vec<Value> = server
            .get("/threads")
            .authorization_bearer(token(ALICE))
            .await
            .json();
        assert_eq!(threads[0]["unread_count"], 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "threads", "messages")))]
    async fn test_mark_read_on_foreign_thread(pool: SqlitePool) -> sqlx::Result<()> {
        let server = default_server(pool);

        server
            .put("/threads/2/read")
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_forbidden();
        server
            .put("/threads/42/read")
            .authorization_bearer(token(ALICE))
            .await
            .assert_status_not_found();
        Ok(())
    }
}
