//! ApiClient - wrapper tipizzato degli endpoint REST del servizio contatti

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    Ack, ContactForm, ContactPage, ContactQuery, ContactSubmitted, Contact, Message, MessageList,
    NewMessage, StatusUpdate, Thread, ThreadSummary,
};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Aggiunge il token, invia la richiesta e decodifica il body JSON
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, "response received");

        if !status.is_success() {
            warn!(status = %status, body = %body, "request rejected by server");
            return Err(ClientError::Status {
                code: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    // ---------------------------------------------------------------- thread

    #[instrument(skip(self))]
    pub async fn list_threads(&self) -> Result<Vec<ThreadSummary>, ClientError> {
        self.send(self.http.get(self.url("/threads"))).await
    }

    /// Apre (o riprende) il thread con l'oggetto indicato, "Chat" se assente
    #[instrument(skip(self))]
    pub async fn start_thread(&self, subject: Option<&str>) -> Result<Thread, ClientError> {
        let body = match subject {
            Some(subject) => json!({ "subject": subject }),
            None => json!({}),
        };
        self.send(self.http.post(self.url("/threads")).json(&body)).await
    }

    #[instrument(skip(self))]
    pub async fn get_thread(&self, thread_id: i32) -> Result<Thread, ClientError> {
        self.send(self.http.get(self.url(&format!("/threads/{}", thread_id))))
            .await
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, thread_id: i32) -> Result<Ack, ClientError> {
        self.send(self.http.put(self.url(&format!("/threads/{}/read", thread_id))))
            .await
    }

    // ------------------------------------------------------------- messaggi

    #[instrument(skip(self, message))]
    pub async fn post_message(
        &self,
        thread_id: i32,
        message: &NewMessage,
    ) -> Result<Vec<Message>, ClientError> {
        let list: MessageList = self
            .send(
                self.http
                    .post(self.url(&format!("/threads/{}/messages", thread_id)))
                    .json(message),
            )
            .await?;
        Ok(list.messages)
    }

    pub async fn send_text(&self, thread_id: i32, text: &str) -> Result<Vec<Message>, ClientError> {
        self.post_message(thread_id, &NewMessage::text(text)).await
    }

    #[instrument(skip(self))]
    pub async fn recall_message(
        &self,
        thread_id: i32,
        message_id: &str,
    ) -> Result<Vec<Message>, ClientError> {
        let list: MessageList = self
            .send(self.http.put(self.url(&format!(
                "/threads/{}/messages/{}/recall",
                thread_id, message_id
            ))))
            .await?;
        Ok(list.messages)
    }

    // ------------------------------------------------------- form e back-office

    #[instrument(skip(self, form))]
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<ContactSubmitted, ClientError> {
        self.send(self.http.post(self.url("/contact")).json(form)).await
    }

    #[instrument(skip(self, query))]
    pub async fn list_contacts(&self, query: &ContactQuery) -> Result<ContactPage, ClientError> {
        self.send(self.http.get(self.url("/contact")).query(query)).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_contact_status(
        &self,
        contact_id: i32,
        update: &StatusUpdate,
    ) -> Result<Contact, ClientError> {
        self.send(
            self.http
                .put(self.url(&format!("/contact/{}/status", contact_id)))
                .json(update),
        )
        .await
    }

    #[instrument(skip(self, response))]
    pub async fn respond_to_contact(
        &self,
        contact_id: i32,
        response: &str,
    ) -> Result<Ack, ClientError> {
        self.send(
            self.http
                .put(self.url(&format!("/contact/{}/respond", contact_id)))
                .json(&json!({ "response": response })),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_contact(&self, contact_id: i32) -> Result<Ack, ClientError> {
        self.send(self.http.delete(self.url(&format!("/contact/{}", contact_id))))
            .await
    }
}
