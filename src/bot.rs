//! Bot lifecycle and command dispatch.
//!
//! The [`Bot`] wires the Matrix client to the command layer:
//!
//! ```text
//! Matrix sync ──► EventHub ──► Dispatcher ──► one task per command ──► Transport
//!                    │                              │
//!                    └──── races of prompts ◄───────┘
//! ```
//!
//! The bot stops on Ctrl-C, when the sync loop ends or when an owner runs
//! `shutdown`. Commands still running are cancelled through the shutdown
//! watch and awaited before [`Bot::start`] returns.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::{
    signal,
    sync::{broadcast::error::RecvError, watch},
    task::{JoinHandle, JoinSet},
};

use crate::{
    Args,
    commands::{CommandContext, CommandParseError, Commander, responses::format_unexpected_error},
    config::{BotSettings, Config},
    exchange::SecretExchange,
    matrix::MatrixClient,
    pagination::{Document, Limits},
    response::{ChatEvent, Conversation, EventHub, IncomingMessage, Scope, Transport},
    utils::get_path,
};

/// Turns incoming messages into command runs.
pub struct Dispatcher {
    /// Where replies and prompts are sent
    transport: Arc<dyn Transport>,
    /// Incoming events, shared with every conversation
    events: EventHub,
    /// The secret exchange shared by every room
    exchange: Arc<SecretExchange>,
    commander: Commander,
    settings: BotSettings,
    limits: Limits,
    /// Set to `true` to stop the bot
    shutdown: watch::Sender<bool>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        events: EventHub,
        bot_user_id: &str,
        settings: BotSettings,
        limits: Limits,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Dispatcher {
            transport,
            events,
            exchange: Arc::new(SecretExchange::new(bot_user_id)),
            commander: Commander::new(),
            settings,
            limits,
            shutdown,
        }
    }

    /// Receiver notified when the bot must stop.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Asks every running command and the bot itself to stop.
    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Starts dispatching the messages published from now on.
    ///
    /// Each command runs in its own task so that a prompt waiting for an
    /// answer never blocks other commands. The returned task ends once a
    /// shutdown is requested and every command task has finished.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let mut receiver = self.events.subscribe();
        let mut shutdown = self.shutdown_signal();
        let dispatcher = Arc::clone(self);

        tokio::spawn(async move {
            let mut tasks = JoinSet::new();

            loop {
                tokio::select! {
                    event = receiver.recv() => match event {
                        Ok(ChatEvent::Message(message)) => {
                            let dispatcher = Arc::clone(&dispatcher);
                            tasks.spawn(async move { dispatcher.handle_message(message).await });
                        }
                        Ok(ChatEvent::Reaction(_)) => {}
                        Err(RecvError::Lagged(skipped)) => warn!("dispatcher skipped {} events", skipped),
                        Err(RecvError::Closed) => break,
                    },
                    Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                        if let Err(e) = result {
                            error!("command task failed: {:?}", e);
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("waiting for {} running command(s)", tasks.len());
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    error!("command task failed: {:?}", e);
                }
            }
        })
    }

    fn context_for(&self, message: &IncomingMessage) -> CommandContext {
        let conversation = Conversation::new(
            Arc::clone(&self.transport),
            self.events.clone(),
            self.shutdown_signal(),
            self.limits,
            Scope {
                room_id: message.room_id.clone(),
                user_id: message.sender.clone(),
            },
        );

        CommandContext {
            conversation,
            exchange: Arc::clone(&self.exchange),
            message_id: message.event_id.clone(),
            is_direct: message.is_direct,
            is_owner: self.settings.is_owner(&message.sender),
            confirm_timeout: self.settings.confirm_timeout(),
            exchange_timeout: self.settings.exchange_timeout(),
        }
    }

    /// Parses a message and runs the command it holds, if any.
    pub async fn handle_message(&self, message: IncomingMessage) {
        let command = match self.commander.parse(&message.body) {
            Ok(command) => command,
            Err(CommandParseError::NotForBot) => return,
            Err(CommandParseError::InvalidCommand(document)) => {
                debug!("invalid command from {}: {}", message.sender, message.body);
                reply(&self.context_for(&message).conversation, &document).await;
                return;
            }
        };

        info!("{} runs {:?} in {}", message.sender, command, message.room_id);

        let context = self.context_for(&message);
        match self.commander.parse_command(&command, &context).await {
            Ok(result) => {
                if let Some(document) = &result.response {
                    reply(&context.conversation, document).await;
                }
                if result.shutdown {
                    info!("shutdown requested by {}", message.sender);
                    self.request_shutdown();
                }
            }
            Err(e) => {
                error!("command {:?} from {} failed: {}", command, message.sender, e);
                reply(&context.conversation, &format_unexpected_error()).await;
            }
        }
    }
}

async fn reply(conversation: &Conversation, document: &Document) {
    if let Err(e) = conversation.send_document(document).await {
        error!("failed to reply in {}: {}", conversation.scope().room_id, e);
    }
}

/// The running bot: a Matrix client and the dispatcher it feeds.
pub struct Bot {
    matrix_client: Arc<MatrixClient>,
    events: EventHub,
    dispatcher: Arc<Dispatcher>,
}

impl Bot {
    /// Logs in and prepares the dispatcher.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `args` - Command line arguments, the session is kept in `<data>/session`
    ///
    /// # Errors
    ///
    /// Fails when the Matrix login or the session restoration fails.
    pub async fn new(config: Config, args: Args) -> Result<Self, anyhow::Error> {
        let matrix_client = Arc::new(MatrixClient::new(&config.credentials(), &get_path(&args.data, "session")).await?);

        let events = EventHub::default();
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&matrix_client) as Arc<dyn Transport>,
            events.clone(),
            &config.matrix.user_id,
            config.bot,
            config.limits,
        ));

        Ok(Bot {
            matrix_client,
            events,
            dispatcher,
        })
    }

    /// Runs until Ctrl-C, a `shutdown` command or the end of the sync loop.
    pub async fn start(self) {
        let mut shutdown = self.dispatcher.shutdown_signal();
        let dispatching = self.dispatcher.spawn();

        tokio::select! {
            _ = self.matrix_client.sync(self.events.clone()) => warn!("matrix sync stopped"),
            result = signal::ctrl_c() => match result {
                Ok(()) => info!("received ctrl-c"),
                Err(e) => error!("cannot listen for ctrl-c: {}", e),
            },
            _ = shutdown.wait_for(|stop| *stop) => {}
        }

        info!("shutting down");
        self.dispatcher.request_shutdown();

        if let Err(e) = dispatching.await {
            error!("dispatcher failed: {:?}", e);
        }
        info!("bot stopped");
    }
}
