use crate::crypto::cipher_types::PaddingMode;
use crate::crypto::error::{CipherError, Result};
use rand::TryRngCore;
use rand::rngs::OsRng;

/// Bytes to append so that `data_len` reaches the next block boundary. An
/// aligned length still gets a whole block.
pub fn padding_length(data_len: usize, block_size: usize) -> usize {
    block_size - data_len % block_size
}

pub fn apply_padding(mut data: Vec<u8>, block_size: usize, padding: PaddingMode) -> Result<Vec<u8>> {
    if block_size == 0 || block_size > u8::MAX as usize {
        return Err(CipherError::InvalidArgument(format!(
            "padding block size must be within 1..=255, got {block_size}"
        )));
    }

    let padding_length = padding_length(data.len(), block_size);
    data.reserve(padding_length);

    match padding {
        PaddingMode::Zeros => data.resize(data.len() + padding_length, 0),
        PaddingMode::ANSI_X923 => {
            data.resize(data.len() + padding_length - 1, 0);
            data.push(padding_length as u8);
        }
        PaddingMode::PKCS7 => {
            data.resize(data.len() + padding_length, padding_length as u8);
        }
        PaddingMode::ISO10126 => {
            let mut filler = vec![0u8; padding_length - 1];
            OsRng
                .try_fill_bytes(&mut filler)
                .map_err(|e| CipherError::RandomSource(e.to_string()))?;
            data.extend_from_slice(&filler);
            data.push(padding_length as u8);
        }
    }

    Ok(data)
}

pub fn remove_padding(mut data: Vec<u8>, padding: PaddingMode) -> Result<Vec<u8>> {
    match padding {
        PaddingMode::Zeros => {
            // Plaintext that ends in zero bytes loses them too.
            let keep = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            data.truncate(keep);
        }
        PaddingMode::PKCS7 => {
            let pad_len = trailing_length(&data)?;
            if pad_len == 0 {
                return Err(CipherError::PaddingValidation("PKCS7 padding length is zero"));
            }
            let start = data.len() - pad_len;
            if data[start..].iter().any(|&b| b as usize != pad_len) {
                return Err(CipherError::PaddingValidation("PKCS7 padding bytes mismatch"));
            }
            data.truncate(start);
        }
        // ISO 10126 filler is random, so only the length byte is checked.
        PaddingMode::ANSI_X923 | PaddingMode::ISO10126 => {
            let pad_len = trailing_length(&data)?;
            data.truncate(data.len() - pad_len);
        }
    }

    Ok(data)
}

fn trailing_length(data: &[u8]) -> Result<usize> {
    let last = *data
        .last()
        .ok_or(CipherError::PaddingValidation("no data to unpad"))?;
    let pad_len = last as usize;
    if pad_len > data.len() {
        return Err(CipherError::PaddingValidation(
            "padding length exceeds data length",
        ));
    }
    Ok(pad_len)
}
