//! Directory client constants
//!
//! Centralized location for defaults shared by configuration, the
//! authenticated API client and the guest operations.

// Endpoints
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0/";
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

// Request behaviour
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TOKEN_SKEW_SECS: u64 = 60;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const MAX_BODY_EXCERPT: usize = 512;

// Guest invitations
pub const DEFAULT_INVITE_REDIRECT_URL: &str = "https://portal.azure.com";
pub const GUEST_USER_TYPE: &str = "Guest";
pub const GUEST_SELECT_FIELDS: &str = "id,displayName,mail,userType,userPrincipalName";
