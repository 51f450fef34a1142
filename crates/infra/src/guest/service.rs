use std::collections::HashSet;
use std::sync::Arc;

use guestdir_domain::constants::{DEFAULT_INVITE_REDIRECT_URL, GUEST_SELECT_FIELDS};
use guestdir_domain::{
    DirectoryConfig, DirectoryError, Guest, GuestInvitationRequest, GuestInvitationResponse,
    GuestSpec, ODataCollection, Result,
};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiClientConfig, DirectoryAuthService};

/// Upper bound on `@odata.nextLink` pages followed by one lookup
const MAX_PAGES: usize = 1000;

/// Guest identity operations against the directory
///
/// Holds no state of its own beyond invitation settings; every read goes to
/// the directory.
pub struct GuestService {
    client: Arc<ApiClient>,
    invite_redirect_url: String,
    send_invitation_message: bool,
}

impl GuestService {
    /// Wrap an existing API client with default invitation settings
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            invite_redirect_url: DEFAULT_INVITE_REDIRECT_URL.to_string(),
            send_invitation_message: true,
        }
    }

    /// Build the token cache, API client and service from one configuration
    ///
    /// # Errors
    /// Returns `DirectoryError::Config` if the configuration is invalid.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self> {
        config.validate()?;

        let auth = Arc::new(DirectoryAuthService::from_config(config)?);
        let client = ApiClient::new(ApiClientConfig::from(config), auth)?;

        Ok(Self::new(Arc::new(client))
            .with_invite_redirect_url(config.invite_redirect_url.clone())
            .with_send_invitation_message(config.send_invitation_message))
    }

    /// Where invited users land after redeeming the invitation
    #[must_use]
    pub fn with_invite_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.invite_redirect_url = url.into();
        self
    }

    /// Whether the directory emails the invitation
    #[must_use]
    pub fn with_send_invitation_message(mut self, send: bool) -> Self {
        self.send_invitation_message = send;
        self
    }

    /// Fetch one identity by object id
    ///
    /// A missing identity surfaces as `DirectoryError::Api { status: 404, .. }`;
    /// use [`DirectoryError::is_not_found`] to tell it apart.
    ///
    /// # Errors
    /// `Config` for an empty id, `Decode` for a success body without an
    /// `id`, otherwise any API client error.
    #[instrument(skip(self))]
    pub async fn get_guest(&self, id: &str) -> Result<Guest> {
        let path = format!("users/{}?$select={GUEST_SELECT_FIELDS}", encoded_id(id)?);
        self.client.get_validated(&path, require_id).await
    }

    /// Invite an external user and return the new identity's object id
    ///
    /// Not idempotent: inviting the same address twice sends two invitations.
    ///
    /// # Errors
    /// `Config` for an empty address, `Decode` if the response lacks
    /// `invitedUser.id`, otherwise any API client error.
    #[instrument(skip(self))]
    pub async fn invite_guest(&self, email: &str) -> Result<String> {
        let spec = GuestSpec::new(email)?;

        let request = GuestInvitationRequest {
            invited_user_email_address: spec.mail,
            invite_redirect_url: self.invite_redirect_url.clone(),
            send_invitation_message: self.send_invitation_message,
        };

        let response: GuestInvitationResponse = self.client.post("invitations", &request).await?;

        info!(id = %response.invited_user.id, "guest invited");
        Ok(response.invited_user.id)
    }

    /// Delete a guest identity
    ///
    /// Reads the identity first. An identity that is already gone counts as
    /// deleted; one that is not a guest is left alone. The read and the
    /// delete are two separate calls, not one atomic operation.
    ///
    /// # Errors
    /// `Precondition` when the identity is not a guest, otherwise any API
    /// client error other than 404.
    #[instrument(skip(self))]
    pub async fn delete_guest(&self, id: &str) -> Result<()> {
        let guest = match self.get_guest(id).await {
            Ok(guest) => guest,
            Err(e) if e.is_not_found() => {
                info!("guest already absent");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !guest.is_guest() {
            warn!(user_type = ?guest.user_type, "refusing to delete non-guest identity");
            return Err(DirectoryError::precondition(format!(
                "identity {id} has userType {}; only guests can be deleted",
                guest.user_type.as_deref().unwrap_or("<unset>")
            )));
        }

        match self.client.delete(&format!("users/{}", encoded_id(id)?)).await {
            Ok(()) => {
                info!("guest deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!("guest removed concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Every identity whose `mail` equals `mail`
    ///
    /// The directory does not enforce unique mail addresses, so zero, one or
    /// several identities may come back. Follows `@odata.nextLink` pages.
    ///
    /// # Errors
    /// `Config` for an empty address, otherwise any API client error.
    #[instrument(skip(self))]
    pub async fn find_guests_by_mail(&self, mail: &str) -> Result<Vec<Guest>> {
        let spec = GuestSpec::new(mail)?;
        let filter = format!("mail eq '{}'", spec.mail.replace('\'', "''"));
        let mut path = format!(
            "users?$filter={}&$select={GUEST_SELECT_FIELDS}",
            urlencoding::encode(&filter)
        );

        let mut guests = Vec::new();
        let mut visited = HashSet::new();
        loop {
            let page: ODataCollection<Guest> = self.client.get(&path).await?;
            guests.extend(page.value);
            let Some(next) = page.next_link else { break };

            visited.insert(path);
            if visited.contains(&next) || visited.len() >= MAX_PAGES {
                warn!(pages = visited.len(), next = %next, "stopping unbounded paging");
                return Err(DirectoryError::decode(
                    200,
                    format!("@odata.nextLink does not converge after {} pages", visited.len()),
                    &next,
                ));
            }
            path = next;
        }

        Ok(guests)
    }
}

/// A 2xx user body must identify the user
fn require_id(guest: &Guest) -> std::result::Result<(), String> {
    if guest.id.trim().is_empty() {
        return Err("user body has no id".to_string());
    }
    Ok(())
}

/// Percent-encode an object id as a single path segment
fn encoded_id(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(DirectoryError::config("guest id must not be empty"));
    }
    Ok(urlencoding::encode(id).into_owned())
}
