//! Crate-level error type.

use thiserror::Error;

use crate::{exchange::ExchangeError, pagination::PaginateError, response::TransportError};

/// Failure of an operation that paginates, talks to the transport or drives
/// the secret exchange.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Paginate(#[from] PaginateError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}
