//! Email notifier - Notifiche SMTP best-effort per le richieste di contatto
//!
//! Ogni invio parte in un task separato: la richiesta HTTP non aspetta mai il
//! server SMTP e un errore di consegna viene solo loggato.
//! I corpi HTML sono template Tera (`server/templates`), con escape automatico
//! dei valori inseriti dall'utente.

use crate::core::Config;
use crate::entities::Thread;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message as Email, Tokio1Executor};
use tera::{Context, Tera};
use tracing::{debug, info, instrument, warn};

const COMPANY_NAME: &str = "Vanguard Machinery";

// il suffisso .html attiva l'autoescape di Tera
const CONFIRMATION_TEMPLATE: &str = "inquiry_confirmation.html";
const ADMIN_TEMPLATE: &str = "inquiry_admin.html";
const RESPONSE_TEMPLATE: &str = "inquiry_response.html";

/// Carica i template delle email, inclusi nel binario a compile time
pub fn email_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (
            CONFIRMATION_TEMPLATE,
            include_str!("../templates/inquiry_confirmation.html"),
        ),
        (ADMIN_TEMPLATE, include_str!("../templates/inquiry_admin.html")),
        (
            RESPONSE_TEMPLATE,
            include_str!("../templates/inquiry_response.html"),
        ),
    ])?;
    Ok(tera)
}

/// Variabili comuni a tutti i template
fn thread_context(thread: &Thread) -> Context {
    let mut context = Context::new();
    context.insert("company", COMPANY_NAME);
    context.insert("name", &thread.name);
    context.insert("email", &thread.email);
    context.insert("subject", &thread.subject);
    context.insert("message", &thread.message);
    // null se assenti: il template mostra "N/A"
    context.insert("requester_company", &thread.company);
    context.insert("requester_country", &thread.country);
    context.insert("inquiry_type", thread.inquiry_type.label());
    context.insert("submitted", &thread.created_at.to_rfc3339());
    context.insert(
        "response",
        thread.response_message.as_deref().unwrap_or_default(),
    );
    context
}

struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    // mittente e destinatario delle notifiche interne coincidono
    mailbox: Mailbox,
    templates: Tera,
}

impl SmtpSender {
    /// Renderizza il template e costruisce l'email; un errore viene loggato e l'email saltata
    fn compose(&self, to: Mailbox, subject: String, template: &str, thread: &Thread) -> Option<Email> {
        let html = match self.templates.render(template, &thread_context(thread)) {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to render {}: {}", template, e);
                return None;
            }
        };

        Email::builder()
            .from(self.mailbox.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| warn!("Failed to build email: {}", e))
            .ok()
    }
}

pub struct EmailNotifier {
    sender: Option<SmtpSender>,
}

impl EmailNotifier {
    /// Notifier che non invia nulla (SMTP non configurato, test)
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Costruisce il transport STARTTLS a partire dalla configurazione.
    /// Senza sezione SMTP il notifier resta disabilitato.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let Some(smtp) = config.smtp.as_ref() else {
            info!("SMTP not configured, email notifications disabled");
            return Ok(Self::disabled());
        };

        let mailbox: Mailbox = smtp
            .user
            .parse()
            .map_err(|e| format!("SMTP_USER is not a valid address: {}", e))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| format!("Invalid SMTP relay {}: {}", smtp.host, e))?
            .port(smtp.port)
            .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
            .build();

        let templates =
            email_templates().map_err(|e| format!("Invalid email templates: {}", e))?;

        info!("Email notifications enabled via {}:{}", smtp.host, smtp.port);
        Ok(Self {
            sender: Some(SmtpSender {
                transport,
                mailbox,
                templates,
            }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Conferma al richiedente + avviso allo staff per una nuova richiesta dal form
    #[instrument(skip(self, thread), fields(thread_id = %thread.thread_id))]
    pub fn notify_new_inquiry(&self, thread: &Thread) {
        let Some(sender) = self.sender.as_ref() else {
            debug!("Email disabled, skipping inquiry notifications");
            return;
        };

        let mut emails = Vec::with_capacity(2);
        match requester_mailbox(thread) {
            Some(to) => emails.extend(sender.compose(
                to,
                format!("Thank you for contacting {}", COMPANY_NAME),
                CONFIRMATION_TEMPLATE,
                thread,
            )),
            None => warn!("Requester address {} is not valid, skipping confirmation", thread.email),
        }
        emails.extend(sender.compose(
            sender.mailbox.clone(),
            "New Contact Form Submission".to_string(),
            ADMIN_TEMPLATE,
            thread,
        ));

        dispatch(sender, emails);
    }

    /// Invia al richiedente la risposta formale dello staff
    #[instrument(skip(self, thread), fields(thread_id = %thread.thread_id))]
    pub fn notify_response(&self, thread: &Thread) {
        let Some(sender) = self.sender.as_ref() else {
            debug!("Email disabled, skipping response notification");
            return;
        };
        let Some(to) = requester_mailbox(thread) else {
            warn!("Requester address {} is not valid, skipping response", thread.email);
            return;
        };

        let emails = sender
            .compose(to, format!("Re: {}", thread.subject), RESPONSE_TEMPLATE, thread)
            .into_iter()
            .collect();
        dispatch(sender, emails);
    }
}

fn requester_mailbox(thread: &Thread) -> Option<Mailbox> {
    thread.email.parse().ok()
}

/// Sgancia l'invio dalla richiesta corrente
fn dispatch(sender: &SmtpSender, emails: Vec<Email>) {
    if emails.is_empty() {
        return;
    }
    let transport = sender.transport.clone();
    tokio::spawn(async move {
        for email in emails {
            match transport.send(email).await {
                Ok(_) => debug!("Email delivered"),
                Err(e) => warn!("Failed to send email: {}", e),
            }
        }
    });
}
