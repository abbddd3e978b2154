use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        watch,
    },
    time::sleep,
};

use crate::{
    constants::{CANCEL_MSGS, COMMAND_PREFIX, CONFIRM_MSGS, colors, emoji},
    error::Error,
    pagination::{Document, Limits, PaginateError, paginate},
    response::{
        ChatEvent, EventHub, IncomingMessage, IncomingReaction, RaceOutcome, Scope, TransientReactions, Transport,
        TransportError,
    },
};

/// Answer to a yes/no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Timeout,
}

impl Confirmation {
    /// Colour of a prompt edited to show this answer.
    pub fn color(&self) -> u32 {
        match self {
            Confirmation::Yes => colors::CONFIRM,
            Confirmation::No => colors::CANCEL,
            Confirmation::Timeout => colors::TIMEOUT,
        }
    }

    /// Past participle describing the answer, e.g. `"cancelled"`.
    pub fn describe(&self) -> &'static str {
        match self {
            Confirmation::Yes => "confirmed",
            Confirmation::No => "cancelled",
            Confirmation::Timeout => "timed out",
        }
    }
}

/// Answer to a prompt asking for free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentResponse {
    /// The trimmed text the user typed
    Yes(String),
    /// The user cancelled, typed a command or sent an empty message
    No,
    Timeout,
}

/// Subscriptions opened before a prompt is sent.
///
/// Events published between [`Conversation::listen`] and the start of the
/// race are buffered, so an answer typed before the markers are placed is
/// not lost.
pub struct Listener {
    messages: broadcast::Receiver<ChatEvent>,
    reactions: broadcast::Receiver<ChatEvent>,
}

/// Prompts addressed to one user in one room.
///
/// Created for every command, it bundles what a command needs to answer and
/// to wait for answers: the transport, the event hub, the shutdown signal and
/// the page limits.
///
/// # Examples
///
/// ```no_run
/// # use std::time::Duration;
/// # use herald::pagination::Document;
/// # use herald::response::{Confirmation, Conversation};
/// # async fn example(conversation: Conversation) -> Result<(), herald::error::Error> {
/// let document = Document::new().title("Delete everything?");
/// let (prompt_id, answer) = conversation
///     .confirm_document(&document, Duration::from_secs(30))
///     .await?;
/// conversation
///     .edit_for_response(&prompt_id, answer, "Deletion {}")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Conversation {
    transport: Arc<dyn Transport>,
    events: EventHub,
    shutdown: watch::Receiver<bool>,
    limits: Limits,
    scope: Scope,
}

impl Conversation {
    pub fn new(
        transport: Arc<dyn Transport>,
        events: EventHub,
        shutdown: watch::Receiver<bool>,
        limits: Limits,
        scope: Scope,
    ) -> Self {
        Conversation {
            transport,
            events,
            shutdown,
            limits,
            scope,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Returns a conversation with the same plumbing in another room.
    #[cfg(test)]
    pub fn with_room(&self, room_id: &str) -> Self {
        Conversation {
            scope: Scope {
                room_id: room_id.to_owned(),
                user_id: self.scope.user_id.clone(),
            },
            ..self.clone()
        }
    }

    /// Opens the message and reaction subscriptions of a future race.
    ///
    /// Must be called before the prompt is sent.
    pub fn listen(&self) -> Listener {
        Listener {
            messages: self.events.subscribe(),
            reactions: self.events.subscribe(),
        }
    }

    /// Paginates a document and sends every page in order.
    ///
    /// # Returns
    ///
    /// The ids of the sent messages, one per page.
    pub async fn send_document(&self, document: &Document) -> Result<Vec<String>, Error> {
        let pages = paginate(document, &self.limits)?;
        let mut ids = Vec::with_capacity(pages.len());
        for page in &pages {
            ids.push(self.transport.send_page(&self.scope.room_id, page).await?);
        }
        debug!("sent {} page(s) to {}", ids.len(), self.scope.room_id);
        Ok(ids)
    }

    /// Replaces a sent message with a document.
    ///
    /// # Errors
    ///
    /// [`PaginateError::TooManyPages`] when the document does not fit in one
    /// page. Nothing is edited in that case.
    pub async fn edit_document(&self, message_id: &str, document: &Document) -> Result<(), Error> {
        let pages = paginate(document, &self.limits)?;
        let [page] = pages.as_slice() else {
            return Err(PaginateError::TooManyPages(pages.len()).into());
        };
        self.transport
            .edit_page(&self.scope.room_id, message_id, page)
            .await?;
        Ok(())
    }

    /// Waits for the first matching message or reaction.
    ///
    /// The message waiter accepts messages from the scope's user in the scope's
    /// room that satisfy `message_check`. The reaction waiter accepts reactions
    /// from the same user to `target` that satisfy `reaction_check`. The first
    /// waiter to match wins and the other is dropped.
    ///
    /// # Arguments
    ///
    /// * `listener` - Subscriptions opened before the prompt was sent
    /// * `target` - Id of the prompt message
    /// * `timeout` - How long to wait for an answer
    /// * `message_check` - Extra condition on messages
    /// * `reaction_check` - Extra condition on reactions
    ///
    /// # Returns
    ///
    /// [`RaceOutcome::Timeout`] when nothing matched in time, and
    /// [`RaceOutcome::Cancelled`] when the bot started shutting down.
    pub async fn race<M, R>(
        &self,
        listener: Listener,
        target: &str,
        timeout: Duration,
        message_check: M,
        reaction_check: R,
    ) -> RaceOutcome
    where
        M: Fn(&IncomingMessage) -> bool,
        R: Fn(&IncomingReaction) -> bool,
    {
        let Listener {
            mut messages,
            mut reactions,
        } = listener;
        let mut shutdown = self.shutdown.clone();
        let scope = &self.scope;

        let message_waiter = next_match(&mut messages, |event| match event {
            ChatEvent::Message(message)
                if message.room_id == scope.room_id
                    && message.sender == scope.user_id
                    && message_check(&message) =>
            {
                Some(message)
            }
            _ => None,
        });
        let reaction_waiter = next_match(&mut reactions, |event| match event {
            ChatEvent::Reaction(reaction)
                if reaction.room_id == scope.room_id
                    && reaction.sender == scope.user_id
                    && reaction.target_event_id == target
                    && reaction_check(&reaction) =>
            {
                Some(reaction)
            }
            _ => None,
        });

        let outcome = tokio::select! {
            Some(message) = message_waiter => RaceOutcome::Message(message),
            Some(reaction) = reaction_waiter => RaceOutcome::Reaction(reaction),
            _ = sleep(timeout) => RaceOutcome::Timeout,
            _ = shutdown_requested(&mut shutdown) => RaceOutcome::Cancelled,
        };

        debug!("race on {} in {} ended with {}", target, scope.room_id, outcome);
        outcome
    }

    /// Asks for a yes/no answer to a prompt already sent.
    ///
    /// Places ✅ and ❌ on the prompt, then accepts either reaction or one of
    /// the confirm/cancel messages. The markers are removed before returning.
    /// A shutdown during the wait counts as a negative answer.
    pub async fn confirm(
        &self,
        listener: Listener,
        message_id: &str,
        timeout: Duration,
    ) -> Result<Confirmation, TransportError> {
        let mut markers = TransientReactions::new(self.transport(), &self.scope.room_id);
        markers
            .place(message_id, &[emoji::CONFIRM, emoji::CANCEL])
            .await?;

        let outcome = self
            .race(
                listener,
                message_id,
                timeout,
                |message| {
                    let body = message.body.trim();
                    CONFIRM_MSGS.contains(&body) || CANCEL_MSGS.contains(&body)
                },
                |reaction| reaction.key == emoji::CONFIRM || reaction.key == emoji::CANCEL,
            )
            .await;
        markers.release().await;

        Ok(match outcome {
            RaceOutcome::Message(message) if CONFIRM_MSGS.contains(&message.body.trim()) => Confirmation::Yes,
            RaceOutcome::Reaction(reaction) if reaction.key == emoji::CONFIRM => Confirmation::Yes,
            RaceOutcome::Message(_) | RaceOutcome::Reaction(_) | RaceOutcome::Cancelled => Confirmation::No,
            RaceOutcome::Timeout => Confirmation::Timeout,
        })
    }

    /// Sends a question and waits for a yes/no answer.
    ///
    /// The document is sent with the ASK colour. The markers go on its last page.
    ///
    /// # Returns
    ///
    /// The id of the prompt message, to be edited afterward, and the answer.
    pub async fn confirm_document(
        &self,
        document: &Document,
        timeout: Duration,
    ) -> Result<(String, Confirmation), Error> {
        let listener = self.listen();
        let prompt_id = self.send_prompt(document).await?;
        let answer = self.confirm(listener, &prompt_id, timeout).await?;
        info!("prompt {} in {} {}", prompt_id, self.scope.room_id, answer.describe());
        Ok((prompt_id, answer))
    }

    /// Sends a question and waits for free text.
    ///
    /// Only ❌ is placed on the prompt. Any message from the user ends the wait:
    /// an empty one or one starting with the command prefix counts as a
    /// cancellation.
    pub async fn query_content(
        &self,
        document: &Document,
        timeout: Duration,
    ) -> Result<(String, ContentResponse), Error> {
        let listener = self.listen();
        let prompt_id = self.send_prompt(document).await?;

        let mut markers = TransientReactions::new(self.transport(), &self.scope.room_id);
        markers.place(&prompt_id, &[emoji::CANCEL]).await?;

        let outcome = self
            .race(
                listener,
                &prompt_id,
                timeout,
                |_| true,
                |reaction| reaction.key == emoji::CANCEL,
            )
            .await;
        markers.release().await;

        let response = match outcome {
            RaceOutcome::Message(message) => {
                let content = message.body.trim();
                if content.is_empty() || content.starts_with(COMMAND_PREFIX) {
                    ContentResponse::No
                } else {
                    ContentResponse::Yes(content.to_owned())
                }
            }
            RaceOutcome::Reaction(_) | RaceOutcome::Cancelled => ContentResponse::No,
            RaceOutcome::Timeout => ContentResponse::Timeout,
        };
        Ok((prompt_id, response))
    }

    /// Edits a prompt to show how it was answered.
    ///
    /// # Arguments
    ///
    /// * `message_id` - The prompt to edit
    /// * `response` - The answer, which picks the colour
    /// * `title_format` - Title in which `{}` is replaced by the answer
    ///   (`"Shutdown {}"` becomes `"Shutdown cancelled"`)
    pub async fn edit_for_response(
        &self,
        message_id: &str,
        response: Confirmation,
        title_format: &str,
    ) -> Result<(), Error> {
        let document = Document::new()
            .title(title_format.replace("{}", response.describe()))
            .color(response.color());
        self.edit_document(message_id, &document).await
    }

    /// Sends a prompt in the ASK colour and returns the id of its last page.
    async fn send_prompt(&self, document: &Document) -> Result<String, Error> {
        let document = Document {
            color: Some(colors::ASK),
            ..document.clone()
        };
        let ids = self.send_document(&document).await?;
        // paginate always yields at least one page
        Ok(ids.last().cloned().unwrap_or_default())
    }
}

/// Receives events until `select` accepts one.
///
/// Returns `None` when the hub is gone.
async fn next_match<T>(
    receiver: &mut broadcast::Receiver<ChatEvent>,
    mut select: impl FnMut(ChatEvent) -> Option<T>,
) -> Option<T> {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if let Some(found) = select(event) {
                    return Some(found);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("response listener lagged, {} event(s) skipped", skipped);
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Resolves once the shutdown flag is set, never if its sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let requested = shutdown.wait_for(|stopping| *stopping).await.is_ok();
    if !requested {
        std::future::pending::<()>().await;
    }
}
