use crate::crypto::cipher_traits::{CipherAlgorithm, SymmetricCipher};
use crate::crypto::encryption_transformation::EncryptionTransformation;
use crate::crypto::error::{CipherError, Result};
use crate::crypto::key_expansion::KeyExpansion;
use crate::crypto::utils::xor_blocks;
use std::sync::Arc;

/// Balanced Feistel network over any key schedule and round function.
///
/// The output of `encrypt_block` is `L_R ‖ R_R` after the last round, without
/// the final half exchange some ciphers (DES among them) perform; a wrapper
/// that needs it applies it itself.
pub struct FeistelNetwork {
    num_round: usize,
    block_size: usize,
    key_expansion: Arc<dyn KeyExpansion + Send + Sync>,
    transformation: Arc<dyn EncryptionTransformation + Send + Sync>,
    round_keys: Vec<Vec<u8>>,
}

impl FeistelNetwork {
    pub fn new(
        num_round: usize,
        block_size: usize,
        key_expansion: Arc<dyn KeyExpansion + Send + Sync>,
        transformation: Arc<dyn EncryptionTransformation + Send + Sync>,
    ) -> Result<Self> {
        if num_round == 0 {
            return Err(CipherError::InvalidArgument(
                "Feistel network needs at least one round".to_string(),
            ));
        }
        if block_size == 0 || block_size % 2 != 0 {
            return Err(CipherError::InvalidArgument(format!(
                "Feistel block size must be even and non-zero, got {block_size}"
            )));
        }

        Ok(Self {
            num_round,
            block_size,
            key_expansion,
            transformation,
            round_keys: Vec::new(),
        })
    }

    pub fn num_round(&self) -> usize {
        self.num_round
    }

    pub fn round_keys(&self) -> &[Vec<u8>] {
        &self.round_keys
    }

    fn check_input(&self, block: &[u8], round_keys: &[Vec<u8>]) -> Result<()> {
        if block.len() != self.block_size {
            return Err(CipherError::InvalidBlockSize {
                expected: self.block_size,
                actual: block.len(),
            });
        }
        if round_keys.is_empty() {
            return Err(CipherError::KeyNotSet);
        }
        if round_keys.len() < self.num_round {
            return Err(CipherError::InvalidRoundKeyCount {
                expected: self.num_round,
                actual: round_keys.len(),
            });
        }
        Ok(())
    }

    pub fn encrypt_with_round_keys(&self, block: &[u8], round_keys: &[Vec<u8>]) -> Result<Vec<u8>> {
        self.check_input(block, round_keys)?;

        let (left, right) = block.split_at(self.block_size / 2);
        let mut left = left.to_vec();
        let mut right = right.to_vec();

        for round_key in &round_keys[..self.num_round] {
            let feistel_out = self.transformation.transform(&right, round_key)?;
            let new_right = xor_blocks(&left, &feistel_out);
            left = right;
            right = new_right;
        }

        Ok([left, right].concat())
    }

    pub fn decrypt_with_round_keys(&self, block: &[u8], round_keys: &[Vec<u8>]) -> Result<Vec<u8>> {
        self.check_input(block, round_keys)?;

        let (left, right) = block.split_at(self.block_size / 2);
        let mut left = left.to_vec();
        let mut right = right.to_vec();

        for round_key in round_keys[..self.num_round].iter().rev() {
            let feistel_out = self.transformation.transform(&left, round_key)?;
            let new_left = xor_blocks(&right, &feistel_out);
            right = left;
            left = new_left;
        }

        Ok([left, right].concat())
    }
}

impl CipherAlgorithm for FeistelNetwork {
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with_round_keys(block, &self.round_keys)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_with_round_keys(block, &self.round_keys)
    }

    fn block_size(&self) -> usize {
        self.block_size
    }
}

impl SymmetricCipher for FeistelNetwork {
    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        let round_keys = self.key_expansion.generate_round_keys(key)?;
        if round_keys.len() != self.num_round {
            return Err(CipherError::InvalidRoundKeyCount {
                expected: self.num_round,
                actual: round_keys.len(),
            });
        }
        self.round_keys = round_keys;
        Ok(())
    }
}
