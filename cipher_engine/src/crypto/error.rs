use crate::crypto::cipher_types::CipherMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid block size: expected {expected} bytes, got {actual}")]
    InvalidBlockSize { expected: usize, actual: usize },

    #[error("input of {len} bytes is not a multiple of the {block_size}-byte block size")]
    UnalignedInput { len: usize, block_size: usize },

    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("{0} mode requires an IV")]
    MissingIv(CipherMode),

    #[error("key expansion produced {actual} round keys, network needs {expected}")]
    InvalidRoundKeyCount { expected: usize, actual: usize },

    #[error("key has not been set")]
    KeyNotSet,

    #[error("unsupported cipher mode: {0}")]
    UnsupportedMode(String),

    #[error("unsupported padding mode: {0}")]
    UnsupportedPadding(String),

    #[error("padding validation failed: {0}")]
    PaddingValidation(&'static str),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("random source failure: {0}")]
    RandomSource(String),

    #[error("worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CipherError>;
