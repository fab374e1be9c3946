use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::shared::normalize_optional;
use crate::entity::enquiry;
use crate::error::AppError;

/// Accepted values of an enquiry's `type`.
pub const ENQUIRY_TYPES: &[&str] = &["rental", "sales", "parts", "contact"];

#[derive(Deserialize, ToSchema)]
pub struct CreateEnquiryRequest {
    #[serde(rename = "type")]
    #[schema(example = "rental")]
    pub enquiry_type: String,
    #[schema(example = "Need a backhoe for two weeks in Nashik")]
    pub message: String,
    /// Exactly 10 digits.
    #[schema(example = "9876543210")]
    pub mobile: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub machine_id: Option<i32>,
    #[serde(default)]
    pub machine_title: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EnquiryResponse {
    pub id: i32,
    #[serde(rename = "type")]
    pub enquiry_type: String,
    pub message: String,
    pub mobile: String,
    pub email: Option<String>,
    pub machine_id: Option<i32>,
    pub machine_title: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<enquiry::Model> for EnquiryResponse {
    fn from(e: enquiry::Model) -> Self {
        Self {
            id: e.id,
            enquiry_type: e.enquiry_type,
            message: e.message,
            mobile: e.mobile,
            email: e.email,
            machine_id: e.machine_id,
            machine_title: e.machine_title,
            is_read: e.is_read,
            created_at: e.created_at,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnquiryListQuery {
    /// One of: rental, sales, parts, contact.
    #[serde(rename = "type")]
    pub enquiry_type: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MarkReadResponse {
    /// Number of enquiries that were unread.
    #[schema(example = 3)]
    pub updated: u64,
}

pub fn validate_enquiry_type(value: &str) -> Result<(), AppError> {
    if ENQUIRY_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "type must be one of: {}",
            ENQUIRY_TYPES.join(", ")
        )))
    }
}

fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Validate and normalize a submitted enquiry in place.
pub fn validate_create_enquiry(payload: &mut CreateEnquiryRequest) -> Result<(), AppError> {
    payload.enquiry_type = payload.enquiry_type.trim().to_lowercase();
    validate_enquiry_type(&payload.enquiry_type)?;

    if payload.message.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".into()));
    }

    payload.mobile = payload.mobile.trim().to_string();
    if !is_valid_mobile(&payload.mobile) {
        return Err(AppError::Validation(
            "Mobile number must be exactly 10 digits".into(),
        ));
    }

    payload.email = normalize_optional(payload.email.take());
    if let Some(ref email) = payload.email
        && !is_valid_email(email)
    {
        return Err(AppError::Validation("Email address is invalid".into()));
    }

    payload.machine_title = normalize_optional(payload.machine_title.take());
    Ok(())
}
