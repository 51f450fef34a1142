//! Domain types and models

pub mod guest;

pub use guest::{
    Guest, GuestInvitationRequest, GuestInvitationResponse, GuestSpec, InvitedUser,
    ODataCollection,
};
