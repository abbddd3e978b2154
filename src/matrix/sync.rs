//! Matrix synchronization loop.
//!
//! [`MatrixSync::sync`] turns the Matrix event stream into [`ChatEvent`]s:
//! 1. Auto-joins the rooms the bot is invited to
//! 2. Runs an initial sync, retried until it succeeds, to skip history
//! 3. Publishes every new text message and reaction from other users to the
//!    [`EventHub`]
//! 4. Persists the sync token after each sync

use anyhow::Result;
use log::{debug, error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        RoomId, UserId,
        api::client::filter::FilterDefinition,
        events::{
            reaction::OriginalSyncReactionEvent,
            room::{
                member::StrippedRoomMemberEvent,
                message::{MessageType, OriginalSyncRoomMessageEvent, Relation},
            },
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::{
    matrix::session::SessionStore,
    response::{ChatEvent, EventHub, IncomingMessage, IncomingReaction},
};

/// Delay between two attempts of the initial sync.
const INITIAL_SYNC_RETRY: Duration = Duration::from_secs(5);

/// Synchronization of one logged in client.
#[derive(Clone)]
pub struct MatrixSync {
    client: Client,
    store: SessionStore,
}

impl MatrixSync {
    /// Prepares the sync, nothing is fetched until [`MatrixSync::sync`].
    pub fn new(client: &Client, store: &SessionStore) -> Self {
        MatrixSync {
            client: client.to_owned(),
            store: store.to_owned(),
        }
    }

    /// Syncs forever, publishing incoming events to `events`.
    ///
    /// Only events received after the initial sync are published, the bot
    /// does not answer commands sent while it was offline.
    ///
    /// # Errors
    ///
    /// Returns when the sync loop fails. Token persistence failures are only
    /// logged.
    pub async fn sync(&self, events: EventHub) -> Result<()> {
        info!("start syncing");

        self.client.add_event_handler(auto_join_rooms);

        // See <https://spec.matrix.org/v1.6/client-server-api/#lazy-loading-room-members>.
        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());

        if let Some(sync_token) = self.store.sync_token() {
            sync_settings = sync_settings.token(sync_token);
        }

        // Catches up on invitations received while offline
        let response = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response,
                Err(e) => {
                    error!("an error occurred during initial sync: {e}");
                    error!("trying again in {}s", INITIAL_SYNC_RETRY.as_secs());
                    sleep(INITIAL_SYNC_RETRY).await;
                }
            }
        };

        if let Err(err) = self.store.persist_sync_token(response.next_batch.clone()).await {
            error!("failed to persist sync token: {:?}", err);
        }

        self.client.add_event_handler({
            let events = events.clone();
            move |event: OriginalSyncRoomMessageEvent, room: Room, client: Client| {
                let events = events.clone();
                async move { on_room_message(event, room, client, &events).await }
            }
        });

        self.client.add_event_handler({
            let events = events.clone();
            move |event: OriginalSyncReactionEvent, room: Room, client: Client| {
                let events = events.clone();
                async move { on_reaction(event, room, client, &events) }
            }
        });

        sync_settings = sync_settings.token(response.next_batch);

        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                let response = sync_result?;

                if let Err(err) = self.store.persist_sync_token(response.next_batch).await {
                    error!("failed to persist sync token: {:?}", err);
                }

                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }
}

/// Joins the rooms the bot is invited to.
///
/// See <https://github.com/matrix-org/synapse/issues/4345> for why joining is
/// retried.
async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            error!("failed to join room {} ({err:?}), retrying in {delay}s", room.room_id());

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > 3600 {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }
        info!("successfully joined room {}", room.room_id());
    });
}

async fn on_room_message(event: OriginalSyncRoomMessageEvent, room: Room, client: Client, events: &EventHub) {
    if room.state() != RoomState::Joined {
        return;
    }

    let is_direct = room.is_direct().await.unwrap_or_else(|e| {
        warn!("cannot tell whether {} is direct: {:?}", room.room_id(), e);
        false
    });

    if let Some(message) = to_incoming_message(&event, room.room_id(), client.user_id(), is_direct) {
        events.publish(ChatEvent::Message(message));
    }
}

fn on_reaction(event: OriginalSyncReactionEvent, room: Room, client: Client, events: &EventHub) {
    if room.state() != RoomState::Joined {
        return;
    }

    if let Some(reaction) = to_incoming_reaction(&event, room.room_id(), client.user_id()) {
        events.publish(ChatEvent::Reaction(reaction));
    }
}

/// Converts a text message from another user.
///
/// Edits (`m.replace`) are skipped, they would otherwise be seen as a second
/// message with a `*` prefixed body.
fn to_incoming_message(
    event: &OriginalSyncRoomMessageEvent,
    room_id: &RoomId,
    own_user_id: Option<&UserId>,
    is_direct: bool,
) -> Option<IncomingMessage> {
    if own_user_id == Some(&*event.sender) {
        return None;
    }

    if matches!(event.content.relates_to, Some(Relation::Replacement(_))) {
        debug!("ignoring edit {}", event.event_id);
        return None;
    }

    let MessageType::Text(text_content) = &event.content.msgtype else {
        return None;
    };

    Some(IncomingMessage {
        room_id: room_id.to_string(),
        sender: event.sender.to_string(),
        event_id: event.event_id.to_string(),
        body: text_content.body.clone(),
        is_direct,
    })
}

fn to_incoming_reaction(
    event: &OriginalSyncReactionEvent,
    room_id: &RoomId,
    own_user_id: Option<&UserId>,
) -> Option<IncomingReaction> {
    if own_user_id == Some(&*event.sender) {
        return None;
    }

    Some(IncomingReaction {
        room_id: room_id.to_string(),
        sender: event.sender.to_string(),
        event_id: event.event_id.to_string(),
        target_event_id: event.content.relates_to.event_id.to_string(),
        key: event.content.relates_to.key.clone(),
    })
}
