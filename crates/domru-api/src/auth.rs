// Authentication data: credentials, login candidates and token bundles.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Everything needed to sign requests on behalf of one subscriber account.
///
/// Replaced wholesale by [`SessionClient::set_credentials`]; a refresh swaps
/// the token pair and keeps the account metadata.
///
/// [`SessionClient::set_credentials`]: crate::SessionClient::set_credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub operator_id: u64,
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub phone: Option<u64>,
    pub subscriber_id: Option<u64>,
    pub account_id: Option<String>,
    pub place_id: Option<u64>,
}

impl Credentials {
    /// Bare credentials: operator plus token pair, no account metadata.
    pub fn new(
        operator_id: u64,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            operator_id,
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            phone: None,
            subscriber_id: None,
            account_id: None,
            place_id: None,
        }
    }

    /// Credentials for the account that just completed SMS confirmation.
    pub fn from_login(details: &LoginDetails, tokens: &SessionTokens) -> Self {
        Self {
            operator_id: tokens.operator_id.unwrap_or(details.account.operator_id),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            phone: Some(details.phone),
            subscriber_id: Some(details.account.subscriber_id),
            account_id: details.account.account_id.clone(),
            place_id: Some(details.account.place_id),
        }
    }

    /// Same account, new token pair. The operator never changes on refresh.
    pub(crate) fn with_tokens(&self, tokens: &SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            ..self.clone()
        }
    }
}

/// One account record returned by `/auth/v2/login/{phone}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAccount {
    pub operator_id: u64,
    pub subscriber_id: u64,
    pub account_id: Option<String>,
    pub place_id: u64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub profile_id: Option<String>,
}

/// A login candidate: an account record plus the phone it was looked up by.
///
/// The vendor omits the phone from each record; the client attaches it so
/// the confirmation steps can address the right endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginDetails {
    pub phone: u64,
    #[serde(flatten)]
    pub account: LoginAccount,
}

/// Token bundle returned by login confirmation and by session refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    #[serde(default)]
    pub operator_id: Option<u64>,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub access_token: SecretString,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub refresh_token: SecretString,
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
}

/// Published to subscribers each time the client stores a refreshed pair.
#[derive(Debug, Clone)]
pub struct TokenRefresh {
    pub operator_id: u64,
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

/// Body of the SMS code submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfirmationRequest<'a> {
    pub operator_id: u64,
    pub subscriber_id: u64,
    pub account_id: Option<&'a str>,
    pub login: u64,
    pub confirm1: String,
}

impl<'a> ConfirmationRequest<'a> {
    pub(crate) fn new(details: &'a LoginDetails, code: u32) -> Self {
        Self {
            operator_id: details.account.operator_id,
            subscriber_id: details.account.subscriber_id,
            account_id: details.account.account_id.as_deref(),
            login: details.phone,
            confirm1: code.to_string(),
        }
    }
}

// ── Phone validation ─────────────────────────────────────────────────

/// Check that `phone` is an 11-digit number starting with the national
/// prefix 7 or 8.
pub fn validate_phone(phone: u64) -> Result<(), Error> {
    let digits = phone.to_string();
    let reason = if digits.len() != 11 {
        format!("expected 11 digits, got {}", digits.len())
    } else if !digits.starts_with(['7', '8']) {
        "must start with 7 or 8".to_owned()
    } else {
        return Ok(());
    };
    Err(Error::InvalidPhone {
        phone: digits,
        reason,
    })
}

/// Parse user input such as `+7 (999) 123-45-67` into a phone number.
///
/// Formatting characters are stripped; the result still has to pass
/// [`validate_phone`].
pub fn parse_phone(input: &str) -> Result<u64, Error> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    let invalid = |reason: &str| Error::InvalidPhone {
        phone: input.to_owned(),
        reason: reason.to_owned(),
    };
    if input
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')')))
    {
        return Err(invalid("contains characters other than digits"));
    }
    let phone: u64 = digits.parse().map_err(|_| invalid("no digits"))?;
    validate_phone(phone)?;
    Ok(phone)
}
