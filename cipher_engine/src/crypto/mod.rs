pub mod cipher_context;
pub mod cipher_traits;
pub mod cipher_types;
pub mod des;
pub mod des_key_expansion;
pub mod des_tables;
pub mod des_transformation;
pub mod encryption_transformation;
pub mod error;
pub mod feistel_network;
pub mod key_expansion;
pub mod padding;
pub mod stream_processor;
pub mod utils;
