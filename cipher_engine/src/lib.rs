pub mod crypto;
pub use crypto::cipher_context::*;
pub use crypto::cipher_traits::*;
pub use crypto::cipher_types::*;
pub use crypto::error::{CipherError, Result};
pub use crypto::stream_processor::{StreamConfig, StreamProcessor};
