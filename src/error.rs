// Error types shared by every primitive in the crate

use thiserror::Error;

use crate::math::BigInteger;

/// Errors reported by arithmetic, generation and protocol operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Malformed numeric input (zero or negative modulus, bad range, unparsable text)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{value} has no inverse modulo {modulus}")]
    NotInvertible {
        value: BigInteger,
        modulus: BigInteger,
    },

    /// A bounded search ran out of attempts
    #[error("{what}: no result after {attempts} attempts")]
    GenerationTimeout { what: &'static str, attempts: u32 },

    #[error("message out of range for the modulus")]
    MessageTooLarge,

    /// Degenerate or small-subgroup key-exchange value
    #[error("invalid public value")]
    InvalidPublicValue,
}

impl CryptoError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CryptoError::InvalidArgument(msg.into())
    }
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
