use crate::crypto::cipher_traits::SymmetricCipher;
use crate::crypto::cipher_types::{CipherMode, Direction, PaddingMode};
use crate::crypto::error::{CipherError, Result};
use crate::crypto::padding::{apply_padding, remove_padding};
use crate::crypto::utils::xor_blocks;
use log::{debug, trace};
use rand::TryRngCore;
use rand::rngs::OsRng;
use rayon::prelude::*;

// ECB work is split into chunks of at most this many bytes per rayon task
const CHUNK_SIZE: usize = 1024 * 1024;
const OPTIMAL_PARALLELISM_THRESHOLD: usize = 4 * 1024 * 1024;

/// Runs a block cipher under one of the chaining modes with one of the padding
/// schemes.
///
/// Block modes (ECB, CBC, PCBC, RandomDelta) pad on encryption and strip the
/// padding after decryption. Stream modes (CFB, OFB, CTR) keep the message
/// length and handle a short final block directly.
///
/// The stored IV is never modified: each call works on its own copy, and
/// [`CipherContext::encrypt_with_iv`] lets a caller supply a different one.
pub struct CipherContext {
    algorithm: Box<dyn SymmetricCipher + Send + Sync>,
    mode: CipherMode,
    padding: PaddingMode,
    iv: Option<Vec<u8>>,
}

impl CipherContext {
    pub fn new(
        algorithm: Box<dyn SymmetricCipher + Send + Sync>,
        key: &[u8],
        mode: CipherMode,
        padding: PaddingMode,
        iv: Option<Vec<u8>>,
    ) -> Result<Self> {
        if algorithm.block_size() == 0 {
            return Err(CipherError::InvalidArgument(
                "cipher declares a zero block size".to_string(),
            ));
        }
        let mut ctx = Self {
            algorithm,
            mode,
            padding,
            iv: None,
        };
        ctx.set_key(key)?;
        ctx.set_iv(iv)?;
        if mode.is_stream_mode() {
            debug!("{} is a stream mode, padding {} has no effect", mode, padding);
        }
        Ok(ctx)
    }

    /// Re-keys the underlying cipher.
    pub fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.algorithm.set_key(key)
    }

    pub fn set_iv(&mut self, iv: Option<Vec<u8>>) -> Result<()> {
        if self.mode.requires_iv() {
            self.chaining_iv(iv.as_deref())?;
        }
        self.iv = iv;
        Ok(())
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with_iv(data, self.iv.as_deref())
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_with_iv(data, self.iv.as_deref())
    }

    pub fn encrypt_with_iv(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        debug!(
            "{} encrypt: {} bytes, padding {}",
            self.mode,
            data.len(),
            self.padding
        );

        if self.mode.is_stream_mode() {
            return self.encrypt_unpadded(data, iv);
        }
        self.encrypt_unpadded(&self.pad(data)?, iv)
    }

    pub fn decrypt_with_iv(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        debug!(
            "{} decrypt: {} bytes, padding {}",
            self.mode,
            data.len(),
            self.padding
        );

        let plain = self.decrypt_unpadded(data, iv)?;
        if self.mode.is_stream_mode() {
            return Ok(plain);
        }
        self.unpad(plain)
    }

    /// Runs the mode over `data` without adding padding. Block modes need
    /// block-aligned input here.
    pub fn encrypt_unpadded(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        match self.mode {
            CipherMode::ECB => self.process_ecb(data, Direction::Encrypt),
            CipherMode::CBC => self.encrypt_cbc(data, iv),
            CipherMode::PCBC => self.encrypt_pcbc(data, iv),
            CipherMode::CFB => self.process_cfb(data, iv, Direction::Encrypt),
            CipherMode::OFB => self.process_ofb(data, iv),
            CipherMode::CTR => self.process_ctr(data, iv),
            CipherMode::RandomDelta => self.encrypt_random_delta(data),
        }
    }

    /// Inverse of [`CipherContext::encrypt_unpadded`]; padding is left in place.
    pub fn decrypt_unpadded(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        match self.mode {
            CipherMode::ECB => self.process_ecb(data, Direction::Decrypt),
            CipherMode::CBC => self.decrypt_cbc(data, iv),
            CipherMode::PCBC => self.decrypt_pcbc(data, iv),
            CipherMode::CFB => self.process_cfb(data, iv, Direction::Decrypt),
            CipherMode::OFB => self.process_ofb(data, iv),
            CipherMode::CTR => self.process_ctr(data, iv),
            CipherMode::RandomDelta => Err(CipherError::UnsupportedOperation(
                "RandomDelta ciphertext cannot be decrypted, the per-block deltas are not kept",
            )),
        }
    }

    /// Adds `value` to a big-endian counter block, wrapping on overflow.
    pub fn increment_block(block: &mut [u8], value: usize) {
        let mut carry = value;
        for byte in block.iter_mut().rev() {
            if carry == 0 {
                break;
            }
            let sum = *byte as usize + (carry & 0xFF);
            *byte = sum as u8;
            carry = (carry >> 8) + (sum >> 8);
        }
    }

    fn pad(&self, data: &[u8]) -> Result<Vec<u8>> {
        apply_padding(data.to_vec(), self.block_size(), self.padding)
    }

    fn unpad(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        remove_padding(data, self.padding)
    }

    // Validates and copies the IV so chaining state never aliases caller data
    fn chaining_iv(&self, iv: Option<&[u8]>) -> Result<Vec<u8>> {
        let block_size = self.block_size();
        match iv {
            None => Err(CipherError::MissingIv(self.mode)),
            Some(iv) if iv.len() != block_size => Err(CipherError::InvalidIvLength {
                expected: block_size,
                actual: iv.len(),
            }),
            Some(iv) => Ok(iv.to_vec()),
        }
    }

    fn check_aligned(&self, data: &[u8]) -> Result<()> {
        let block_size = self.block_size();
        if data.len() % block_size != 0 {
            return Err(CipherError::UnalignedInput {
                len: data.len(),
                block_size,
            });
        }
        Ok(())
    }

    fn transform_block(&self, block: &[u8], direction: Direction) -> Result<Vec<u8>> {
        match direction {
            Direction::Encrypt => self.algorithm.encrypt_block(block),
            Direction::Decrypt => self.algorithm.decrypt_block(block),
        }
    }

    fn process_ecb(&self, data: &[u8], direction: Direction) -> Result<Vec<u8>> {
        self.check_aligned(data)?;
        let block_size = self.block_size();

        // Larger inputs get bigger per-task chunks to keep scheduling overhead down
        let chunk_size = if data.len() > OPTIMAL_PARALLELISM_THRESHOLD {
            (data.len() / rayon::current_num_threads())
                .max(block_size)
                .min(CHUNK_SIZE)
                / block_size
                * block_size
        } else {
            block_size
        };
        trace!("ECB over {} bytes in {}-byte tasks", data.len(), chunk_size);

        let processed = data
            .par_chunks(chunk_size)
            .map(|mega_chunk| -> Result<Vec<u8>> {
                let mut result = Vec::with_capacity(mega_chunk.len());
                for block in mega_chunk.chunks(block_size) {
                    result.extend(self.transform_block(block, direction)?);
                }
                Ok(result)
            })
            .collect::<Result<Vec<Vec<u8>>>>()?;

        Ok(processed.concat())
    }

    fn encrypt_cbc(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        self.check_aligned(data)?;
        let mut prev = self.chaining_iv(iv)?;
        let mut result = Vec::with_capacity(data.len());

        for block in data.chunks(self.block_size()) {
            let encrypted = self.algorithm.encrypt_block(&xor_blocks(block, &prev))?;
            result.extend_from_slice(&encrypted);
            prev = encrypted;
        }

        Ok(result)
    }

    fn decrypt_cbc(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        self.check_aligned(data)?;
        let mut prev = self.chaining_iv(iv)?;
        let mut result = Vec::with_capacity(data.len());

        for block in data.chunks(self.block_size()) {
            let decrypted = self.algorithm.decrypt_block(block)?;
            result.extend(xor_blocks(&decrypted, &prev));
            prev = block.to_vec();
        }

        Ok(result)
    }

    // PCBC feedback is P_{i-1} ^ C_{i-1}, seeded with the IV.
    fn encrypt_pcbc(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        self.check_aligned(data)?;
        let mut feedback = self.chaining_iv(iv)?;
        let mut result = Vec::with_capacity(data.len());

        for block in data.chunks(self.block_size()) {
            let encrypted = self.algorithm.encrypt_block(&xor_blocks(block, &feedback))?;
            feedback = xor_blocks(block, &encrypted);
            result.extend(encrypted);
        }

        Ok(result)
    }

    fn decrypt_pcbc(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        self.check_aligned(data)?;
        let mut feedback = self.chaining_iv(iv)?;
        let mut result = Vec::with_capacity(data.len());

        for block in data.chunks(self.block_size()) {
            let plain = xor_blocks(&self.algorithm.decrypt_block(block)?, &feedback);
            feedback = xor_blocks(&plain, block);
            result.extend(plain);
        }

        Ok(result)
    }

    // The shift register is fed with ciphertext in both directions, so only the
    // forward primitive is needed.
    fn process_cfb(&self, data: &[u8], iv: Option<&[u8]>, direction: Direction) -> Result<Vec<u8>> {
        let mut register = self.chaining_iv(iv)?;
        let mut result = Vec::with_capacity(data.len());

        for chunk in data.chunks(self.block_size()) {
            let keystream = self.algorithm.encrypt_block(&register)?;
            let output = xor_blocks(chunk, &keystream);
            let ciphertext = match direction {
                Direction::Encrypt => &output[..],
                Direction::Decrypt => chunk,
            };
            register.drain(..chunk.len());
            register.extend_from_slice(ciphertext);
            result.extend(output);
        }

        Ok(result)
    }

    fn process_ofb(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        let mut register = self.chaining_iv(iv)?;
        let mut result = Vec::with_capacity(data.len());

        for chunk in data.chunks(self.block_size()) {
            register = self.algorithm.encrypt_block(&register)?;
            result.extend(xor_blocks(chunk, &register));
        }

        Ok(result)
    }

    fn process_ctr(&self, data: &[u8], iv: Option<&[u8]>) -> Result<Vec<u8>> {
        let mut counter = self.chaining_iv(iv)?;
        let mut result = Vec::with_capacity(data.len());

        for chunk in data.chunks(self.block_size()) {
            let keystream = self.algorithm.encrypt_block(&counter)?;
            result.extend(xor_blocks(chunk, &keystream));
            Self::increment_block(&mut counter, 1);
        }

        Ok(result)
    }

    fn encrypt_random_delta(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.check_aligned(data)?;
        let block_size = self.block_size();
        let mut delta = vec![0u8; block_size];
        let mut result = Vec::with_capacity(data.len());

        for block in data.chunks(block_size) {
            OsRng
                .try_fill_bytes(&mut delta)
                .map_err(|e| CipherError::RandomSource(e.to_string()))?;
            result.extend(self.algorithm.encrypt_block(&xor_blocks(block, &delta))?);
        }

        Ok(result)
    }
}
