//! Secret exchange between the members of a room.
//!
//! An exchange is started in a group room. While it runs, participants send
//! their secret to the bot in a direct chat, and the prompt in the group room
//! lists who answered. The initiator then reveals every secret at once with a
//! reaction, or cancels the exchange.
//!
//! # Flow
//!
//! ```text
//! !herald hide (group room) ──► prompt with 👁️ ❌
//! !herald hide <secret> (DM) ──► recorded, prompt lists respondents
//! 👁️ by initiator ──────────────► all secrets posted as one paginated document
//! ❌ / cancel message / timeout ─► prompt edited, secrets discarded
//! ```
//!
//! Only one exchange can run at a time, across all rooms.

use std::time::Duration;

use log::{debug, info};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    constants::{CANCEL_MSGS, COMMAND_PREFIX, colors, emoji},
    error::Error,
    pagination::Document,
    response::{Conversation, RaceOutcome, TransientReactions},
    utils::human_list,
};

/// Misuse of the secret exchange.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("a secret exchange is already in progress")]
    AlreadyActive,
    #[error("no secret exchange is in progress")]
    NotActive,
}

/// How an exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The secrets were revealed, with the number of respondents
    Revealed(usize),
    Cancelled,
    TimedOut,
}

/// Location of the prompt of the running exchange.
struct Prompt {
    conversation: Conversation,
    message_id: String,
}

#[derive(Default)]
struct ExchangeState {
    prompt: Option<Prompt>,
    /// Secrets in first-answer order, keyed by user id
    secrets: Vec<(String, String)>,
}

/// The single secret exchange of the bot.
pub struct SecretExchange {
    /// Bot user id, shown in the instructions
    bot_user_id: String,
    /// Held for the whole life of an exchange
    active: Mutex<()>,
    /// Serialises submissions with the end of the exchange
    state: Mutex<ExchangeState>,
}

impl SecretExchange {
    pub fn new(bot_user_id: &str) -> Self {
        SecretExchange {
            bot_user_id: bot_user_id.to_owned(),
            active: Mutex::new(()),
            state: Mutex::new(ExchangeState::default()),
        }
    }

    /// Whether an exchange is currently running.
    pub fn is_active(&self) -> bool {
        self.active.try_lock().is_err()
    }

    /// Runs an exchange in the conversation's room until it ends.
    ///
    /// Fails immediately with [`ExchangeError::AlreadyActive`] when another
    /// exchange is running.
    ///
    /// # Arguments
    ///
    /// * `conversation` - The initiator and the group room
    /// * `timeout` - How long participants have before the exchange expires
    pub async fn run(&self, conversation: &Conversation, timeout: Duration) -> Result<ExchangeOutcome, Error> {
        let _active = self
            .active
            .try_lock()
            .map_err(|_| ExchangeError::AlreadyActive)?;

        info!(
            "starting secret exchange in {} for {}",
            conversation.scope().room_id,
            conversation.scope().user_id
        );

        let listener = conversation.listen();
        let preparing = Document::new()
            .title("Preparing secret exchange…")
            .color(colors::TEMPORARY);
        let ids = conversation.send_document(&preparing).await?;
        let message_id = ids.last().cloned().unwrap_or_default();

        {
            let mut state = self.state.lock().await;
            state.secrets.clear();
            conversation
                .edit_document(&message_id, &self.prompt_document(&state.secrets))
                .await?;
            // Submissions are accepted only once the prompt is shown
            state.prompt = Some(Prompt {
                conversation: conversation.clone(),
                message_id: message_id.clone(),
            });
        }

        let mut markers = TransientReactions::new(conversation.transport(), &conversation.scope().room_id);
        let placed = markers
            .place(&message_id, &[emoji::REVEAL, emoji::CANCEL])
            .await;

        let outcome = match placed {
            Ok(()) => {
                conversation
                    .race(
                        listener,
                        &message_id,
                        timeout,
                        |message| CANCEL_MSGS.contains(&message.body.trim()),
                        |reaction| reaction.key == emoji::REVEAL || reaction.key == emoji::CANCEL,
                    )
                    .await
            }
            Err(e) => {
                markers.release().await;
                self.state.lock().await.prompt = None;
                return Err(e.into());
            }
        };
        markers.release().await;

        let mut state = self.state.lock().await;
        let secrets = std::mem::take(&mut state.secrets);
        state.prompt = None;

        let result = match outcome {
            RaceOutcome::Reaction(reaction) if reaction.key == emoji::REVEAL => {
                let body = secrets
                    .iter()
                    .map(|(user_id, secret)| format!("{}: {}", user_id, secret))
                    .collect::<Vec<_>>()
                    .join("\n");
                let revealed = Document::new()
                    .title("Secret exchange completed")
                    .body(body)
                    .color(colors::SUCCESS);
                conversation.send_document(&revealed).await?;
                ExchangeOutcome::Revealed(secrets.len())
            }
            RaceOutcome::Timeout => {
                let expired = Document::new()
                    .title("Secret exchange timed out")
                    .color(colors::TIMEOUT);
                conversation.edit_document(&message_id, &expired).await?;
                ExchangeOutcome::TimedOut
            }
            _ => {
                let cancelled = Document::new()
                    .title("Secret exchange cancelled")
                    .color(colors::CANCEL);
                conversation.edit_document(&message_id, &cancelled).await?;
                ExchangeOutcome::Cancelled
            }
        };

        info!("secret exchange ended: {:?}", result);
        Ok(result)
    }

    /// Records or replaces the secret of a participant.
    ///
    /// The prompt of the running exchange is updated with the list of
    /// respondents.
    pub async fn record(&self, user_id: &str, secret: &str) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        let Some(prompt) = &state.prompt else {
            return Err(ExchangeError::NotActive.into());
        };
        let conversation = prompt.conversation.clone();
        let message_id = prompt.message_id.clone();

        match state.secrets.iter().position(|(id, _)| id == user_id) {
            Some(index) => state.secrets[index].1 = secret.to_owned(),
            None => state.secrets.push((user_id.to_owned(), secret.to_owned())),
        }
        debug!("recorded secret of {} ({} respondent(s))", user_id, state.secrets.len());

        conversation
            .edit_document(&message_id, &self.prompt_document(&state.secrets))
            .await
    }

    fn prompt_document(&self, secrets: &[(String, String)]) -> Document {
        let respondents: Vec<&str> = secrets.iter().map(|(user_id, _)| user_id.as_str()).collect();

        Document::new()
            .title("Secret exchange")
            .body(format!(
                "DM {} with `{}herald hide <secret…>`.",
                self.bot_user_id, COMMAND_PREFIX
            ))
            .field("Respondents", human_list(&respondents), true)
            .color(colors::ASK)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::{sync::mpsc, sync::watch, time::sleep};

    use super::*;
    use crate::{
        pagination::{Limits, Page},
        response::{ChatEvent, EventHub, IncomingReaction, MockTransport, Scope, TransportError},
    };

    const ROOM: &str = "!group:example.org";
    const ALICE: &str = "@alice:example.org";

    struct TestBed {
        conversation: Conversation,
        events: EventHub,
        sent: mpsc::UnboundedReceiver<Page>,
        edited: mpsc::UnboundedReceiver<Page>,
        _shutdown: watch::Sender<bool>,
    }

    fn create_test_bed() -> TestBed {
        let (sent_tx, sent) = mpsc::unbounded_channel();
        let (edited_tx, edited) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        let mut count = 0;
        transport.expect_send_page().returning(move |_, page| {
            count += 1;
            let _ = sent_tx.send(page.clone());
            Ok(format!("$page-{}", count))
        });
        transport.expect_edit_page().returning(move |_, _, page| {
            let _ = edited_tx.send(page.clone());
            Ok(())
        });
        transport
            .expect_add_reaction()
            .returning(|_, _, key| Ok(format!("$marker-{}", key)));
        transport.expect_remove_reaction().returning(|_, _| Ok(()));

        let events = EventHub::new(16);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let conversation = Conversation::new(
            Arc::new(transport),
            events.clone(),
            shutdown_rx,
            Limits::default(),
            Scope {
                room_id: ROOM.to_owned(),
                user_id: ALICE.to_owned(),
            },
        );
        TestBed {
            conversation,
            events,
            sent,
            edited,
            _shutdown: shutdown,
        }
    }

    fn create_test_reaction(key: &str) -> ChatEvent {
        ChatEvent::Reaction(IncomingReaction {
            room_id: ROOM.to_owned(),
            sender: ALICE.to_owned(),
            event_id: "$reaction".to_owned(),
            target_event_id: "$page-1".to_owned(),
            key: key.to_owned(),
        })
    }

    #[tokio::test]
    async fn test_record_without_exchange() {
        let exchange = SecretExchange::new("@herald:example.org");

        let result = exchange.record(ALICE, "rock").await;

        assert!(matches!(
            result,
            Err(Error::Exchange(ExchangeError::NotActive))
        ));
    }

    #[tokio::test]
    async fn test_second_exchange_is_rejected_immediately() {
        let exchange = Arc::new(SecretExchange::new("@herald:example.org"));
        let bed = create_test_bed();

        let first = tokio::spawn({
            let exchange = Arc::clone(&exchange);
            let conversation = bed.conversation.clone();
            async move { exchange.run(&conversation, Duration::from_secs(5)).await }
        });
        sleep(Duration::from_millis(20)).await;
        assert!(exchange.is_active());

        let second = exchange.run(&bed.conversation, Duration::from_secs(5)).await;
        assert!(matches!(
            second,
            Err(Error::Exchange(ExchangeError::AlreadyActive))
        ));

        bed.events.publish(create_test_reaction(emoji::CANCEL));
        assert_eq!(first.await.unwrap().unwrap(), ExchangeOutcome::Cancelled);
        assert!(!exchange.is_active());
    }

    #[tokio::test]
    async fn test_reveal_posts_every_secret() {
        let exchange = Arc::new(SecretExchange::new("@herald:example.org"));
        let mut bed = create_test_bed();

        let run = tokio::spawn({
            let exchange = Arc::clone(&exchange);
            let conversation = bed.conversation.clone();
            async move { exchange.run(&conversation, Duration::from_secs(5)).await }
        });
        sleep(Duration::from_millis(20)).await;

        exchange.record(ALICE, "rock").await.unwrap();
        exchange.record("@bob:example.org", "paper").await.unwrap();
        exchange.record(ALICE, "scissors").await.unwrap();
        bed.events.publish(create_test_reaction(emoji::REVEAL));

        assert_eq!(run.await.unwrap().unwrap(), ExchangeOutcome::Revealed(2));

        let preparing = bed.sent.recv().await.unwrap();
        assert_eq!(preparing.title.as_deref(), Some("Preparing secret exchange…"));
        let revealed = bed.sent.recv().await.unwrap();
        assert_eq!(revealed.title.as_deref(), Some("Secret exchange completed"));
        assert_eq!(
            revealed.body.as_deref(),
            Some("@alice:example.org: scissors\n@bob:example.org: paper")
        );

        // Initial prompt, then one edit per recorded secret
        let mut last_edit = None;
        for _ in 0..4 {
            last_edit = bed.edited.recv().await;
        }
        let last_edit = last_edit.unwrap();
        assert_eq!(last_edit.fields[0].name, "Respondents");
        assert_eq!(last_edit.fields[0].value, "@alice:example.org and @bob:example.org");
    }

    #[tokio::test]
    async fn test_exchange_times_out() {
        let exchange = SecretExchange::new("@herald:example.org");
        let mut bed = create_test_bed();

        let outcome = exchange
            .run(&bed.conversation, Duration::from_millis(20))
            .await
            .unwrap();

        assert_eq!(outcome, ExchangeOutcome::TimedOut);
        let _prompt = bed.edited.recv().await.unwrap();
        let expired = bed.edited.recv().await.unwrap();
        assert_eq!(expired.title.as_deref(), Some("Secret exchange timed out"));
        assert!(matches!(
            exchange.record(ALICE, "late").await,
            Err(Error::Exchange(ExchangeError::NotActive))
        ));
    }

    #[tokio::test]
    async fn test_failed_prompt_edit_leaves_no_exchange_open() {
        let mut transport = MockTransport::new();
        transport
            .expect_send_page()
            .returning(|_, _| Ok("$page-1".to_owned()));
        transport
            .expect_edit_page()
            .returning(|_, _, _| Err(TransportError::Failure("boom".to_owned())));
        transport.expect_add_reaction().never();
        let (_shutdown, shutdown_rx) = watch::channel(false);
        let conversation = Conversation::new(
            Arc::new(transport),
            EventHub::new(16),
            shutdown_rx,
            Limits::default(),
            Scope {
                room_id: ROOM.to_owned(),
                user_id: ALICE.to_owned(),
            },
        );
        let exchange = SecretExchange::new("@herald:example.org");

        let result = exchange.run(&conversation, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(!exchange.is_active());
        assert!(matches!(
            exchange.record("@bob:example.org", "secret").await,
            Err(Error::Exchange(ExchangeError::NotActive))
        ));
    }
}
