//! Errors for the application clients.

use std::path::PathBuf;

use plato_protocol::identity::Address;
use plato_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    /// Anything the transaction pipeline reports, passed through untouched.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An order whose price and courier reward cannot make a valid escrow.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// A requested amount plus the fees it implies does not fit in a u64.
    #[error("{0} overflows the microAlgo range")]
    AmountOverflow(&'static str),

    #[error("funding of {provided} microAlgos is below the required {required}")]
    InsufficientFunding { required: u64, provided: u64 },

    #[error("{address} holds {available} but needs {required}")]
    InsufficientBalance {
        address: Address,
        required: u64,
        available: u64,
    },

    #[error("cannot read program source {}: {source}", path.display())]
    ProgramSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The node confirmed a creation but did not report what it created.
    #[error("confirmed {0} creation reported no id")]
    MissingCreatedId(&'static str),
}

pub type Result<T> = std::result::Result<T, ContractError>;
