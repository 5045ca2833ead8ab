//! Request validation.
//!
//! Checks run in a fixed order and stop at the first violation: required
//! fields (in configured order, `deviceToken` always first), token length,
//! email shape, then coordinate ranges.

use thiserror::Error;
use vasatey_common::models::AlertRequest;
use vasatey_config::{DispatchConfig, RequiredField};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("deviceToken must be at least {min} characters (got {actual})")]
    TokenTooShort { min: usize, actual: usize },

    #[error("recipientEmail is not a valid email address")]
    InvalidEmail,

    #[error("latitude must be within [-90, 90] (got {0})")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be within [-180, 180] (got {0})")]
    LongitudeOutOfRange(f64),
}

/// A request that passed every validation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest(AlertRequest);

impl ValidatedRequest {
    pub fn request(&self) -> &AlertRequest {
        &self.0
    }

    pub fn into_inner(self) -> AlertRequest {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Validator {
    required: Vec<RequiredField>,
    min_token_length: usize,
}

impl Validator {
    pub fn new(required_fields: &[RequiredField], min_token_length: usize) -> Self {
        // a message cannot be addressed without a token
        let mut required = vec![RequiredField::DeviceToken];
        for field in required_fields {
            if !required.contains(field) {
                required.push(*field);
            }
        }
        Self {
            required,
            min_token_length,
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(&config.required_fields, config.min_token_length)
    }

    pub fn required_fields(&self) -> &[RequiredField] {
        &self.required
    }

    pub fn validate(&self, request: AlertRequest) -> Result<ValidatedRequest, ValidationError> {
        for field in &self.required {
            let present = field_value(&request, *field)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false);
            if !present {
                return Err(ValidationError::MissingField(field.as_str()));
            }
        }

        let token_length = request.device_token.trim().chars().count();
        if token_length < self.min_token_length {
            return Err(ValidationError::TokenTooShort {
                min: self.min_token_length,
                actual: token_length,
            });
        }

        if !request.recipient_email.trim().is_empty() && !is_email_shaped(&request.recipient_email)
        {
            return Err(ValidationError::InvalidEmail);
        }

        if let Some(latitude) = request.latitude {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(ValidationError::LatitudeOutOfRange(latitude));
            }
        }
        if let Some(longitude) = request.longitude {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(ValidationError::LongitudeOutOfRange(longitude));
            }
        }

        Ok(ValidatedRequest(request))
    }
}

fn field_value(request: &AlertRequest, field: RequiredField) -> Option<&str> {
    match field {
        RequiredField::DeviceToken => Some(&request.device_token),
        RequiredField::Title => Some(&request.title),
        RequiredField::Body => Some(&request.body),
        RequiredField::RecipientEmail => Some(&request.recipient_email),
        RequiredField::FullName => request.full_name.as_deref(),
        RequiredField::PhoneNumber => request.phone_number.as_deref(),
    }
}

/// Coarse `local@domain` check.
fn is_email_shaped(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
