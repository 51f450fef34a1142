//! Example: Inviting, reading and deleting a guest
//!
//! Loads configuration from `GUESTDIR_*` environment variables (or a
//! `guestdir.{json,toml}` file), invites the given address, reads the new
//! identity back and deletes it again.
//!
//! # Setup
//!
//! 1. Register an application with permission to invite and delete users.
//!
//! 2. Set up environment variables: ```bash export GUESTDIR_TENANT_ID=...
//!    export GUESTDIR_CLIENT_ID=... export GUESTDIR_CLIENT_SECRET=... ```
//!
//! 3. Run this example: ```bash cargo run --example guest_lifecycle --
//!    someone@example.com ```

use anyhow::Context;
use guestdir_infra::{config, GuestService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let email = std::env::args()
        .nth(1)
        .context("usage: guest_lifecycle <email-address>")?;

    let config = config::load().context("failed to load directory configuration")?;
    let service = GuestService::from_config(&config)?;

    let id = service.invite_guest(&email).await?;
    println!("Invited {email} as {id}");

    let guest = service.get_guest(&id).await?;
    println!(
        "Read back: display name {:?}, userType {:?}",
        guest.display_name, guest.user_type
    );

    let matches = service.find_guests_by_mail(&email).await?;
    println!("{} identities share this address", matches.len());

    service.delete_guest(&id).await?;
    println!("Deleted {id}");

    Ok(())
}
