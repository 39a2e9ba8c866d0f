//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ********************* ENUMERAZIONI UTILI **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Editor,
    Admin,
}

impl UserRole {
    /// Editor e admin sono considerati staff: vedono e rispondono a tutti i thread
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Editor | UserRole::Admin)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum ThreadStatus {
    New,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Responded,
    Closed,
}

impl ThreadStatus {
    /// Stato dopo l'arrivo di un nuovo messaggio: solo un thread `New` avanza,
    /// gli altri stati sono già più avanti nel flusso
    pub fn after_new_message(self) -> Self {
        match self {
            ThreadStatus::New => ThreadStatus::InProgress,
            other => other,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
pub enum InquiryType {
    #[default]
    #[sqlx(rename = "General Inquiry")]
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
    #[sqlx(rename = "Product Information")]
    #[serde(rename = "Product Information")]
    ProductInformation,
    #[sqlx(rename = "Quote Request")]
    #[serde(rename = "Quote Request")]
    QuoteRequest,
    #[sqlx(rename = "Technical Support")]
    #[serde(rename = "Technical Support")]
    TechnicalSupport,
    Partnership,
    Other,
}

impl InquiryType {
    pub fn label(&self) -> &'static str {
        match self {
            InquiryType::GeneralInquiry => "General Inquiry",
            InquiryType::ProductInformation => "Product Information",
            InquiryType::QuoteRequest => "Quote Request",
            InquiryType::TechnicalSupport => "Technical Support",
            InquiryType::Partnership => "Partnership",
            InquiryType::Other => "Other",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
pub enum InquirySource {
    #[default]
    #[sqlx(rename = "Website Form")]
    #[serde(rename = "Website Form")]
    WebsiteForm,
    Email,
    Phone,
    #[sqlx(rename = "Social Media")]
    #[serde(rename = "Social Media")]
    SocialMedia,
    Referral,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Audio,
}

impl MessageKind {
    /// Etichetta usata nell'anteprima dell'ultimo messaggio per i contenuti multimediali
    pub fn preview_label(&self) -> &'static str {
        match self {
            MessageKind::Text => "",
            MessageKind::Image => "[image]",
            MessageKind::Video => "[video]",
            MessageKind::Audio => "[audio]",
        }
    }
}

impl FromStr for MessageKind {
    type Err = ();

    // il client può inviare il tipo con maiuscole arbitrarie
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "video" => Ok(MessageKind::Video),
            "audio" => Ok(MessageKind::Audio),
            _ => Err(()),
        }
    }
}

/// Etichetta grezza dell'autore così come è salvata nella colonna `origin`.
/// Nel codice applicativo si usa sempre `MessageOrigin`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OriginTag {
    Guest,
    User,
    Admin,
}
