//! Rendering dei messaggi lato client

use crate::models::{Message, MessageKind, Origin};
use chrono::{DateTime, Duration, Utc};

pub const RECALLED_PLACEHOLDER: &str = "[message recalled]";

/// Il server rifiuta il ritiro oltre questa soglia
pub const RECALL_WINDOW: Duration = Duration::minutes(2);

/// Ruolo di chi sta guardando la conversazione
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Customer(i32),
    Staff(i32),
}

impl Viewer {
    fn user_id(&self) -> i32 {
        match self {
            Viewer::Customer(id) | Viewer::Staff(id) => *id,
        }
    }

    /// Il messaggio sta "dal lato" di chi guarda (bolla a destra)
    pub fn is_own_side(&self, message: &Message) -> bool {
        match (self, message.from) {
            (Viewer::Staff(_), Origin::Admin) => true,
            (Viewer::Customer(_), Origin::User) => true,
            _ => false,
        }
    }
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Una riga di testo per il messaggio.
/// Un messaggio ritirato mostra solo il segnaposto e l'orario originale.
pub fn render_message(message: &Message) -> String {
    let at = format_timestamp(&message.at);
    if message.recalled {
        return format!("{} {}", RECALLED_PLACEHOLDER, at);
    }

    let author = match message.from {
        Origin::Guest => "guest",
        Origin::User => "customer",
        Origin::Admin => "staff",
    };
    let body = match message.kind {
        MessageKind::Text => message.text.clone().unwrap_or_default(),
        MessageKind::Image => format!("[image] {}", message.url.as_deref().unwrap_or_default()),
        MessageKind::Video => format!("[video] {}", message.url.as_deref().unwrap_or_default()),
        MessageKind::Audio => format!("[audio] {}", message.url.as_deref().unwrap_or_default()),
    };
    format!("[{}] {}: {}", at, author, body)
}

/// Mostrare o no il comando "ritira": solo sui propri messaggi, non ritirati,
/// entro la finestra. Il server ricontrolla comunque.
pub fn can_offer_recall(viewer: Viewer, message: &Message, now: DateTime<Utc>) -> bool {
    viewer.is_own_side(message)
        && message.from_user_id == Some(viewer.user_id())
        && !message.recalled
        && now - message.at < RECALL_WINDOW
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(from: Origin, from_user_id: Option<i32>, recalled: bool) -> Message {
        Message {
            id: "1735808400000abcdefghi".to_string(),
            from,
            from_user_id,
            kind: MessageKind::Text,
            text: (!recalled).then(|| "Is the crane available?".to_string()),
            url: None,
            at: Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap(),
            recalled,
        }
    }

    #[test]
    fn test_recalled_message_shows_placeholder_and_time() {
        let rendered = render_message(&message(Origin::User, Some(1), true));
        assert_eq!(rendered, "[message recalled] 2025-01-02 09:00:00");
    }

    #[test]
    fn test_render_text_and_media() {
        assert_eq!(
            render_message(&message(Origin::User, Some(1), false)),
            "[2025-01-02 09:00:00] customer: Is the crane available?"
        );

        let mut image = message(Origin::Admin, Some(3), false);
        image.kind = MessageKind::Image;
        image.text = Some(String::new());
        image.url = Some("https://x/y.jpg".to_string());
        assert_eq!(
            render_message(&image),
            "[2025-01-02 09:00:00] staff: [image] https://x/y.jpg"
        );
    }

    #[test]
    fn test_recall_offer_rules() {
        let own = message(Origin::User, Some(1), false);
        let sent = own.at;

        assert!(can_offer_recall(Viewer::Customer(1), &own, sent + Duration::seconds(30)));
        assert!(!can_offer_recall(Viewer::Customer(1), &own, sent + Duration::minutes(3)));
        // altro cliente o staff: mai
        assert!(!can_offer_recall(Viewer::Customer(2), &own, sent));
        assert!(!can_offer_recall(Viewer::Staff(1), &own, sent));

        let staff = message(Origin::Admin, Some(3), false);
        assert!(can_offer_recall(Viewer::Staff(3), &staff, sent));
        assert!(!can_offer_recall(Viewer::Staff(4), &staff, sent));

        let recalled = message(Origin::User, Some(1), true);
        assert!(!can_offer_recall(Viewer::Customer(1), &recalled, sent));
    }
}
