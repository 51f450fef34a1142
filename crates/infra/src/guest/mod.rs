//! Guest lifecycle operations
//!
//! `get_guest`, `invite_guest`, `delete_guest` and `find_guests_by_mail`
//! on top of the authenticated [`ApiClient`](crate::api::ApiClient).

pub mod service;

pub use service::GuestService;
