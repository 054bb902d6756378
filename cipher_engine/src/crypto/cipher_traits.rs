use crate::crypto::error::Result;

pub trait CipherAlgorithm {
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>>;
    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>>;
    fn block_size(&self) -> usize;
}

pub trait SymmetricCipher: CipherAlgorithm {
    fn set_key(&mut self, key: &[u8]) -> Result<()>;
}
