use cipher_engine::crypto::cipher_context::CipherContext;
use cipher_engine::crypto::cipher_traits::{CipherAlgorithm, SymmetricCipher};
use cipher_engine::crypto::cipher_types::{CipherMode, PaddingMode};
use cipher_engine::crypto::des::DES;
use cipher_engine::crypto::error::Result;

fn main() -> Result<()> {
    env_logger::init();

    let key = hex_literal::hex!("13 34 57 79 9B BC DF F1");
    let plaintext = hex_literal::hex!("01 23 45 67 89 AB CD EF");

    let mut des = DES::new()?;
    des.set_key(&key)?;
    let ciphertext = des.encrypt_block(&plaintext)?;
    println!("key        {}", hex::encode_upper(key));
    println!("plaintext  {}", hex::encode_upper(plaintext));
    println!("ciphertext {}", hex::encode_upper(&ciphertext));
    println!("round trip {}", hex::encode_upper(des.decrypt_block(&ciphertext)?));

    let message = b"Every mode, one message.";
    for mode in CipherMode::ALL {
        let iv = mode.requires_iv().then(|| vec![0x24; 8]);
        let ctx = CipherContext::new(Box::new(DES::new()?), &key, mode, PaddingMode::PKCS7, iv)?;
        let encrypted = ctx.encrypt(message)?;
        let decrypted = match ctx.decrypt(&encrypted) {
            Ok(plain) => String::from_utf8_lossy(&plain).into_owned(),
            Err(e) => format!("<{e}>"),
        };
        println!("{:<12} {} -> {}", mode.to_string(), hex::encode(&encrypted), decrypted);
    }

    Ok(())
}
