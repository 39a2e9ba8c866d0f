//! Contact DTOs - form pubblico e back-office dello staff

use super::thread::ContactDTO;
use crate::entities::InquiryType;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    // cifre, spazi, trattini, parentesi e prefisso internazionale opzionale
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()\-]{5,20}$").unwrap();
}

/// Body di `POST /contact` (form pubblico, anche senza account)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct ContactFormDTO {
    #[validate(length(min = 2, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Please include a valid email"))]
    pub email: String,

    #[validate(length(min = 2, max = 200, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub company: Option<String>,

    #[validate(length(max = 100))]
    pub country: Option<String>,

    #[validate(length(max = 200))]
    pub product_interest: Option<String>,

    #[serde(default)]
    pub inquiry_type: InquiryType,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ContactSubmittedDTO {
    pub message: String,
    pub contact_id: i32,
}

/// Conferma generica per operazioni senza payload di ritorno
#[derive(Serialize, Deserialize, Debug)]
pub struct AckDTO {
    pub message: String,
}

impl AckDTO {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PaginationDTO {
    pub current: u32,
    pub pages: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationDTO {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit = limit.max(1) as i64;
        let pages = ((total + limit - 1) / limit) as u32;
        Self {
            current: page,
            pages,
            total,
            has_next: (page as i64) * limit < total,
            has_prev: page > 1,
        }
    }
}

/// Risposta di `GET /contact`
#[derive(Serialize, Deserialize, Debug)]
pub struct ContactPageDTO {
    pub contacts: Vec<ContactDTO>,
    pub pagination: PaginationDTO,
}
