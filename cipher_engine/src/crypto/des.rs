use crate::crypto::cipher_traits::{CipherAlgorithm, SymmetricCipher};
use crate::crypto::des_key_expansion::{DES_ROUNDS, DesKeyExpansion};
use crate::crypto::des_tables::{FP, IP};
use crate::crypto::des_transformation::DesTransformation;
use crate::crypto::encryption_transformation::EncryptionTransformation;
use crate::crypto::error::{CipherError, Result};
use crate::crypto::feistel_network::FeistelNetwork;
use crate::crypto::key_expansion::KeyExpansion;
use crate::crypto::utils::permute_bits;
use std::sync::Arc;

pub const DES_BLOCK_SIZE: usize = 8;

pub struct DES {
    feistel_network: FeistelNetwork,
}

impl DES {
    pub fn new() -> Result<Self> {
        Self::with_components(Arc::new(DesKeyExpansion), Arc::new(DesTransformation))
    }

    pub fn with_components(
        key_expansion: Arc<dyn KeyExpansion + Send + Sync>,
        transformation: Arc<dyn EncryptionTransformation + Send + Sync>,
    ) -> Result<Self> {
        let feistel_network =
            FeistelNetwork::new(DES_ROUNDS, DES_BLOCK_SIZE, key_expansion, transformation)?;

        Ok(DES { feistel_network })
    }

    pub fn round_keys(&self) -> &[Vec<u8>] {
        self.feistel_network.round_keys()
    }

    fn check_block(block: &[u8]) -> Result<()> {
        if block.len() != DES_BLOCK_SIZE {
            return Err(CipherError::InvalidBlockSize {
                expected: DES_BLOCK_SIZE,
                actual: block.len(),
            });
        }
        Ok(())
    }
}

// R16 ‖ L16 pre-output exchange
fn swap_halves(block: &mut [u8]) {
    let half = block.len() / 2;
    let (left, right) = block.split_at_mut(half);
    left.swap_with_slice(right);
}

impl CipherAlgorithm for DES {
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        Self::check_block(block)?;
        let permuted = permute_bits(block, &IP)?;
        let mut result = self.feistel_network.encrypt_block(&permuted)?;
        swap_halves(&mut result);
        permute_bits(&result, &FP)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        Self::check_block(block)?;
        let mut permuted = permute_bits(block, &IP)?;
        swap_halves(&mut permuted);
        let result = self.feistel_network.decrypt_block(&permuted)?;
        permute_bits(&result, &FP)
    }

    fn block_size(&self) -> usize {
        DES_BLOCK_SIZE
    }
}

impl SymmetricCipher for DES {
    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.feistel_network.set_key(key)
    }
}
