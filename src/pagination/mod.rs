//! Splitting of long documents into pages that fit platform limits.
//!
//! Chat platforms cap how much a single rich message may carry: the body, each
//! field value, the number of fields and the total amount of text. This module
//! turns one logical [`Document`] into an ordered list of [`Page`]s, each valid
//! against every configured [`Limits`] value.
//!
//! # Overview
//!
//! ```text
//! Document ──► paginate() ──► [Page 1 (title, body…), Page 2 (body…, fields…), …]
//! ```
//!
//! - The body is cut at paragraph, line or word boundaries ([`split_text`])
//! - Oversized field values are split into continued fields
//! - Multi-page output gets a `(i/N)` page indicator in every footer
//!
//! # Examples
//!
//! ```no_run
//! use herald::pagination::{Document, Limits, paginate};
//!
//! let document = Document::new()
//!     .title("Numbers")
//!     .body("1, 2, 3, …")
//!     .field("Even", "2, 4, 6", true);
//!
//! let pages = paginate(&document, &Limits::default()).unwrap();
//! assert_eq!(pages.len(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

mod paginator;
mod split;

pub use crate::pagination::{paginator::paginate, split::split_text};

/// Marker appended to the name of a field holding the tail of a split value.
pub const CONTINUED: &str = " (cont.)";

/// Footer of a document or page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    /// Footer text
    pub text: String,
    /// Optional icon shown next to the footer text
    pub icon_url: Option<String>,
}

/// A named block of text displayed below the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, suffixed with [`CONTINUED`] when `continued` is set on a page
    pub name: String,
    /// Field value
    pub value: String,
    /// Whether the field may be displayed next to its neighbours
    pub inline: bool,
    /// Whether this field holds the tail of a value split from an earlier field
    pub continued: bool,
}

impl Field {
    /// Creates a field that is not a continuation.
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Field {
            name: name.into(),
            value: value.into(),
            inline,
            continued: false,
        }
    }

    /// Number of characters the field contributes to a page.
    pub fn size(&self) -> usize {
        self.name.chars().count() + self.value.chars().count()
    }
}

/// The unsplit input of [`paginate`].
///
/// Built with the chained setters below, then handed to the paginator by
/// reference. The paginator never mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Title, carried by the first page only
    pub title: Option<String>,
    /// Body text, may be empty
    pub body: String,
    /// Ordered fields
    pub fields: Vec<Field>,
    /// Footer, rewritten with a page indicator when the document spans pages
    pub footer: Option<Footer>,
    /// Link attached to every page
    pub url: Option<String>,
    /// Timestamp attached to every page
    pub timestamp: Option<DateTime<Utc>>,
    /// Accent colour attached to every page, as `0xRRGGBB`
    pub color: Option<u32>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field::new(name, value, inline));
        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(Footer {
            text: text.into(),
            icon_url,
        });
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
}

/// One renderable unit produced by [`paginate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Title, only set on the first page
    pub title: Option<String>,
    /// Body chunk
    pub body: Option<String>,
    /// Fields of this page
    pub fields: Vec<Field>,
    /// Footer, with a `(i/N)` indicator when there are several pages
    pub footer: Option<Footer>,
    /// Link replicated from the document
    pub url: Option<String>,
    /// Timestamp replicated from the document
    pub timestamp: Option<DateTime<Utc>>,
    /// Colour replicated from the document
    pub color: Option<u32>,
}

impl Page {
    /// Number of characters counted against [`Limits::max_total`].
    ///
    /// Title, body, every field name and value, and the footer text.
    pub fn size(&self) -> usize {
        let title = self.title.as_deref().map_or(0, |t| t.chars().count());
        let body = self.body.as_deref().map_or(0, |b| b.chars().count());
        let fields: usize = self.fields.iter().map(Field::size).sum();
        let footer = self.footer.as_ref().map_or(0, |f| f.text.chars().count());
        title + body + fields + footer
    }

    /// Whether the page carries no text at all.
    pub fn is_blank(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.fields.is_empty()
    }
}

/// Hard limits a page must respect, all counted in characters.
///
/// Defaults follow the common rich-message limits of chat platforms. Every
/// value can be overridden from the `limits` section of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum title length
    pub max_title: usize,
    /// Maximum body length
    pub max_body: usize,
    /// Maximum field name length
    pub max_field_name: usize,
    /// Maximum field value length
    pub max_field_value: usize,
    /// Maximum number of fields per page
    pub max_fields: usize,
    /// Maximum total characters per page
    pub max_total: usize,
    /// Room kept free for the `(i/N)` page indicator
    pub footer_slack: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_title: 256,
            max_body: 2048,
            max_field_name: 256,
            max_field_value: 1024,
            max_fields: 25,
            max_total: 6000,
            footer_slack: 10,
        }
    }
}

impl Limits {
    /// Checks that the limits leave room for at least one page of content.
    ///
    /// Splitting needs at least two characters per chunk to make progress,
    /// and a full first page (title and body chunk) plus the reserved footer
    /// room must fit in the total budget.
    pub fn validate(&self) -> Result<(), PaginateError> {
        if self.max_body < 2 || self.max_field_value < 2 {
            return Err(PaginateError::InvalidLimits(
                "body and field value limits must be at least 2".to_owned(),
            ));
        }
        if self.max_fields == 0 {
            return Err(PaginateError::InvalidLimits(
                "at least one field per page is required".to_owned(),
            ));
        }
        if self.max_title + self.max_body + self.footer_slack > self.max_total {
            return Err(PaginateError::InvalidLimits(format!(
                "title ({}) + body ({}) + footer slack ({}) exceed the total limit ({})",
                self.max_title, self.max_body, self.footer_slack, self.max_total
            )));
        }
        Ok(())
    }
}

/// Errors raised by [`paginate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginateError {
    /// An indivisible part of the document cannot fit in any page.
    #[error("{part} is {length} characters long, the limit is {limit}")]
    LimitExceeded {
        /// What did not fit (title, field name, footer…)
        part: String,
        /// Its length
        length: usize,
        /// The limit it broke
        limit: usize,
    },
    /// The limits contradict each other.
    #[error("invalid limits: {0}")]
    InvalidLimits(String),
    /// A single message was expected but the document needs several pages.
    #[error("document needs {0} pages, an edit replaces a single message")]
    TooManyPages(usize),
}
