//! Colours, emoji and fixed strings shared by the commands and prompts.

/// Accent colours of rendered documents, as `0xRRGGBB`.
pub mod colors {
    pub const ASK: u32 = 0x00FFFF;
    pub const CONFIRM: u32 = 0x339933;
    pub const CANCEL: u32 = 0x993333;
    pub const TIMEOUT: u32 = 0x4F545C;
    pub const TEMPORARY: u32 = 0x4F545C;
    pub const INFO: u32 = 0x7289DA;
    pub const HELP: u32 = 0x7F007F;
    pub const ERROR: u32 = 0xFF0000;
    pub const SUCCESS: u32 = 0x00FF00;
}

/// Reaction keys placed on prompts.
pub mod emoji {
    pub const CONFIRM: &str = "✅";
    pub const CANCEL: &str = "❌";
    pub const REVEAL: &str = "👁️";
    pub const SUCCESS: &str = "👌";
}

/// Prefix of every bot command.
pub const COMMAND_PREFIX: char = '!';

/// Messages accepted as a positive answer to a confirmation prompt.
pub const CONFIRM_MSGS: [&str; 5] = ["!confirm", "!y", "!yes", "y", "yes"];

/// Messages accepted as a negative answer to a confirmation prompt.
pub const CANCEL_MSGS: [&str; 5] = ["!cancel", "!n", "!no", "n", "no"];

/// Placeholder for lists with no entries.
pub const EMPTY_LIST: &str = "(none)";

/// Timestamp format used in page footers.
pub const TIME_FORMAT: &str = "UTC %H:%M:%S on %Y-%m-%d";

/// Bot name shown in replies.
pub const NAME: &str = "Herald";

pub const ABOUT_TEXT: &str = "Herald is an open source Matrix bot answering `!herald` commands. \
Long replies are split into pages and confirmations can be given by reply or by reaction.";
