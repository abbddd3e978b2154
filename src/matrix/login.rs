//! Login and session restoration.
//!
//! The first start logs in with the password and writes the session file.
//! Later starts restore that session from the sqlite store, which is
//! encrypted with the configured passphrase.

use anyhow::{Context, anyhow};
use log::{debug, info};
use matrix_sdk::{
    Client,
    encryption::EncryptionSettings,
    ruma::{OwnedUserId, api::client::uiaa},
};

use crate::{
    constants::NAME,
    matrix::{UserCredentials, session::SessionStore},
};

/// Creates a cross-signing identity for the bot device when it has none.
///
/// The homeserver usually asks for the password again (UIAA), in which case
/// the request is retried with it.
async fn bootstrap_cross_signing(client: &Client, credentials: &UserCredentials) -> anyhow::Result<()> {
    debug!("setting up cross signing");

    let Err(e) = client.encryption().bootstrap_cross_signing_if_needed(None).await else {
        debug!("cross signing already set up");
        return Ok(());
    };

    let response = e
        .as_uiaa_response()
        .ok_or_else(|| anyhow!("cannot bootstrap cross signing: {:?}", e))?;
    let mut password = uiaa::Password::new(
        uiaa::UserIdentifier::UserIdOrLocalpart(credentials.user_id.clone()),
        credentials.password.clone(),
    );
    password.session = response.session.clone();

    client
        .encryption()
        .bootstrap_cross_signing(Some(uiaa::AuthData::Password(password)))
        .await?;

    debug!("cross signing set up");
    Ok(())
}

async fn build_client(user_id: &OwnedUserId, credentials: &UserCredentials, store: &SessionStore) -> anyhow::Result<Client> {
    let encryption_settings = EncryptionSettings {
        auto_enable_cross_signing: true,
        ..EncryptionSettings::default()
    };

    let client = Client::builder()
        .server_name(user_id.server_name())
        .sqlite_store(store.sqlite_path(), Some(&credentials.passphrase))
        .with_encryption_settings(encryption_settings)
        .build()
        .await?;

    debug!("matrix client created");
    Ok(client)
}

/// Logs in with the password and persists the new session.
async fn create_session(credentials: &UserCredentials, store: &SessionStore) -> anyhow::Result<Client> {
    let user_id: OwnedUserId = credentials.user_id.clone().try_into()?;
    let client = build_client(&user_id, credentials, store).await?;

    client
        .matrix_auth()
        .login_username(user_id, &credentials.password)
        .initial_device_display_name(&format!("{} bot", NAME.to_lowercase()))
        .send()
        .await
        .context("login failed")?;

    info!("logged in as {}", credentials.user_id);

    bootstrap_cross_signing(&client, credentials).await?;

    let user_session = client
        .matrix_auth()
        .session()
        .ok_or_else(|| anyhow!("no user session after login"))?;
    store
        .persist_user_session(&user_session)
        .await
        .context("error persisting user session")?;

    Ok(client)
}

/// Restores the session written by a previous [`create_session`].
async fn restore_session(credentials: &UserCredentials, store: &SessionStore) -> anyhow::Result<Client> {
    info!("restoring matrix session from disk");

    let user_session = store
        .user_session()
        .ok_or_else(|| anyhow!("no persisted user session"))?
        .clone();

    let user_id: OwnedUserId = credentials.user_id.clone().try_into()?;
    if user_session.meta.user_id != user_id {
        return Err(anyhow!(
            "persisted session belongs to {}, not {}",
            user_session.meta.user_id,
            user_id
        ));
    }

    let client = build_client(&user_id, credentials, store).await?;
    client
        .restore_session(user_session)
        .await
        .context("cannot restore session")?;

    info!("matrix session restored");
    Ok(client)
}

/// Returns a logged in client, restoring the persisted session if there is one.
///
/// # Errors
///
/// Fails on an invalid user id, a refused login, a wrong passphrase for the
/// store or a persisted session that belongs to another account.
pub async fn setup_client(credentials: &UserCredentials, store: &SessionStore) -> anyhow::Result<Client> {
    info!("setting up matrix client for user {}", credentials.user_id);

    if store.has_session() {
        restore_session(credentials, store).await
    } else {
        create_session(credentials, store).await
    }
}
