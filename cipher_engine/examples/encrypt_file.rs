use std::path::PathBuf;
use std::sync::Arc;

use rand::RngCore;

use cipher_engine::crypto::cipher_context::CipherContext;
use cipher_engine::crypto::cipher_types::{CipherMode, PaddingMode};
use cipher_engine::crypto::des::DES;
use cipher_engine::crypto::error::{CipherError, Result};
use cipher_engine::crypto::stream_processor::StreamProcessor;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::rng().fill_bytes(&mut buf);
    buf
}

// Usage: encrypt_file <input> [mode] [padding]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next().ok_or_else(|| {
        CipherError::InvalidArgument("usage: encrypt_file <input> [mode] [padding]".to_string())
    })?);
    let mode: CipherMode = args.next().as_deref().unwrap_or("cbc").parse()?;
    let padding: PaddingMode = args.next().as_deref().unwrap_or("pkcs7").parse()?;

    let key = random_bytes(8);
    let iv = mode.requires_iv().then(|| random_bytes(8));
    println!("key {}", hex::encode(&key));
    if let Some(iv) = &iv {
        println!("iv  {}", hex::encode(iv));
    }

    let ctx = CipherContext::new(Box::new(DES::new()?), &key, mode, padding, iv)?;
    let processor = StreamProcessor::new(Arc::new(ctx));

    let encrypted = input.with_extension("enc");
    processor.encrypt_file(&input, &encrypted).await?;
    println!("{mode}+{padding} encrypted -> {}", encrypted.display());

    if mode == CipherMode::RandomDelta {
        return Ok(());
    }

    let decrypted = input.with_extension("dec");
    processor.decrypt_file(&encrypted, &decrypted).await?;
    println!("{mode}+{padding} decrypted -> {}", decrypted.display());

    let same = tokio::fs::read(&input).await? == tokio::fs::read(&decrypted).await?;
    println!("round trip {}", if same { "OK" } else { "MISMATCH" });

    Ok(())
}
