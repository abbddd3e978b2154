//! Matrix client wrapper implementing the bot [`Transport`].
//!
//! Pages are sent as markdown messages (see [`render_markdown`]), edits are
//! `m.replace` events, reactions are `m.annotation` events and removing a
//! reaction redacts it.

use async_trait::async_trait;
use log::{debug, error, info};
use matrix_sdk::{
    Client, Room,
    ruma::{
        OwnedEventId, OwnedRoomId,
        events::{
            reaction::ReactionEventContent,
            relation::Annotation,
            room::message::{
                MessageType, ReplacementMetadata, RoomMessageEventContent, RoomMessageEventContentWithoutRelation,
            },
        },
    },
};

use crate::{
    constants::NAME,
    matrix::{UserCredentials, login::setup_client, render::render_markdown, session::SessionStore, sync::MatrixSync},
    pagination::Page,
    response::{EventHub, Transport, TransportError},
};

/// Logged in Matrix client.
pub struct MatrixClient {
    /// Synchronization service feeding the event hub
    matrix_sync: MatrixSync,
    /// Underlying Matrix SDK client
    client: Client,
}

impl MatrixClient {
    /// Logs in (or restores the session) and sets the display name.
    ///
    /// # Arguments
    ///
    /// * `credentials` - User id, password and store passphrase
    /// * `session_path` - Directory of the session file and sqlite store
    ///
    /// # Errors
    ///
    /// Fails when the session directory is unusable or the login fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use herald::matrix::{MatrixClient, UserCredentials};
    ///
    /// # async fn example() -> Result<(), anyhow::Error> {
    /// let credentials = UserCredentials {
    ///     user_id: "@herald:example.org".to_string(),
    ///     password: "password".to_string(),
    ///     passphrase: "passphrase".to_string(),
    /// };
    /// let client = MatrixClient::new(&credentials, "./data/session").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(credentials: &UserCredentials, session_path: &str) -> Result<Self, anyhow::Error> {
        let store = SessionStore::open(session_path).await?;
        let client = setup_client(credentials, &store).await?;

        client.account().set_display_name(Some(NAME)).await?;

        let matrix_sync = MatrixSync::new(&client, &store);

        Ok(MatrixClient { matrix_sync, client })
    }

    /// Syncs until the connection fails, publishing incoming events to `events`.
    pub async fn sync(&self, events: EventHub) {
        match self.matrix_sync.sync(events).await {
            Ok(_) => info!("matrix sync ended successfully"),
            Err(e) => error!("matrix sync ended with error: {:?}", e),
        }
    }

    fn room(&self, room_id: &str) -> Result<Room, TransportError> {
        let room_id: OwnedRoomId = room_id
            .try_into()
            .map_err(|_| TransportError::InvalidId(room_id.to_owned()))?;

        self.client
            .get_room(&room_id)
            .ok_or_else(|| TransportError::UnknownRoom(room_id.to_string()))
    }
}

fn parse_event_id(event_id: &str) -> Result<OwnedEventId, TransportError> {
    event_id
        .try_into()
        .map_err(|_| TransportError::InvalidId(event_id.to_owned()))
}

fn failure(e: impl std::fmt::Debug) -> TransportError {
    error!("matrix request failed: {:?}", e);
    TransportError::Failure(format!("{:?}", e))
}

#[async_trait]
impl Transport for MatrixClient {
    async fn send_page(&self, room_id: &str, page: &Page) -> Result<String, TransportError> {
        let room = self.room(room_id)?;
        let content = RoomMessageEventContent::text_markdown(render_markdown(page));

        let result = room.send(content).await.map_err(failure)?;
        debug!("page sent to {} as {}", room_id, result.event_id);

        Ok(result.event_id.to_string())
    }

    async fn edit_page(&self, room_id: &str, message_id: &str, page: &Page) -> Result<(), TransportError> {
        let room = self.room(room_id)?;
        let event_id = parse_event_id(message_id)?;

        let content = RoomMessageEventContentWithoutRelation::new(MessageType::text_markdown(render_markdown(page)))
            .make_replacement(ReplacementMetadata::new(event_id, None));

        room.send(content).await.map_err(failure)?;
        debug!("message {} edited", message_id);

        Ok(())
    }

    async fn add_reaction(&self, room_id: &str, message_id: &str, key: &str) -> Result<String, TransportError> {
        let room = self.room(room_id)?;
        let event_id = parse_event_id(message_id)?;

        let content = ReactionEventContent::new(Annotation::new(event_id, key.to_owned()));
        let result = room.send(content).await.map_err(failure)?;

        Ok(result.event_id.to_string())
    }

    async fn remove_reaction(&self, room_id: &str, reaction_id: &str) -> Result<(), TransportError> {
        let room = self.room(room_id)?;
        let event_id = parse_event_id(reaction_id)?;

        room.redact(&event_id, None, None).await.map_err(failure)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_event_id() {
        let event_id = parse_event_id("$prompt:example.org").unwrap();
        assert_eq!(event_id.as_str(), "$prompt:example.org");
    }

    #[test]
    fn test_parse_invalid_event_id() {
        assert_eq!(
            parse_event_id("prompt"),
            Err(TransportError::InvalidId("prompt".to_owned()))
        );
    }

    #[test]
    fn test_failure_keeps_the_cause() {
        let error = failure("timed out");
        assert_eq!(error, TransportError::Failure("\"timed out\"".to_owned()));
    }
}
