//! Guest identity types
//!
//! Read-only projection of a directory user plus the transient invitation
//! payloads exchanged with the `/invitations` endpoint.

use serde::{Deserialize, Serialize};

use crate::constants::GUEST_USER_TYPE;
use crate::errors::{DirectoryError, Result};

/// Directory user as returned by `GET /users/{id}`
///
/// Every attribute defaults when absent so that structured error bodies
/// (e.g. `{"error": ...}`) still decode and the caller sees the HTTP status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
}

impl Guest {
    /// `true` only for identities the directory marks as external guests
    pub fn is_guest(&self) -> bool {
        self.user_type.as_deref() == Some(GUEST_USER_TYPE)
    }
}

/// Body posted to `/invitations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInvitationRequest {
    pub invited_user_email_address: String,
    pub invite_redirect_url: String,
    pub send_invitation_message: bool,
}

/// User created (or matched) by an invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedUser {
    #[serde(deserialize_with = "non_empty_string")]
    pub id: String,
}

fn non_empty_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(serde::de::Error::custom("expected a non-empty string"));
    }
    Ok(value)
}

/// Response from `/invitations`
///
/// `invitedUser.id` is required: a body without it, or with an empty one, is a
/// decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInvitationResponse {
    pub invited_user: InvitedUser,
}

/// Caller-supplied description of the guest to manage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSpec {
    pub mail: String,
}

impl GuestSpec {
    /// Validate and normalize a guest description
    ///
    /// # Errors
    /// Returns `DirectoryError::Config` when `mail` is empty or whitespace.
    pub fn new(mail: impl Into<String>) -> Result<Self> {
        let mail = mail.into().trim().to_string();
        if mail.is_empty() {
            return Err(DirectoryError::config("mail must not be empty"));
        }
        Ok(Self { mail })
    }
}

/// OData collection wrapper (`{"value": [...]}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataCollection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}
