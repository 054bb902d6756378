use crate::crypto::des_tables::{PC1, PC2, SHIFT_BITS};
use crate::crypto::error::{CipherError, Result};
use crate::crypto::key_expansion::KeyExpansion;
use crate::crypto::utils::{bits_to_bytes, bytes_to_bits, permute_bits};
use bitvec::prelude::BitVec;

pub const DES_KEY_SIZE: usize = 8;
pub const DES_ROUNDS: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct DesKeyExpansion;

impl KeyExpansion for DesKeyExpansion {
    fn generate_round_keys(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        if key.len() != DES_KEY_SIZE {
            return Err(CipherError::InvalidKeyLength {
                expected: DES_KEY_SIZE,
                actual: key.len(),
            });
        }

        // PC-1 drops the parity bits: 64 -> 56
        let permuted = permute_bits(key, &PC1)?;
        let bits = bytes_to_bits(&permuted);

        let mut c = bits.iter().by_vals().take(28).collect::<BitVec>();
        let mut d = bits.iter().by_vals().skip(28).take(28).collect::<BitVec>();

        let mut round_keys = Vec::with_capacity(DES_ROUNDS);
        for &shift in &SHIFT_BITS {
            c.rotate_left(shift);
            d.rotate_left(shift);

            let mut cd = BitVec::with_capacity(56);
            cd.extend(c.iter().by_vals());
            cd.extend(d.iter().by_vals());

            let cd_bytes = bits_to_bytes(&cd);
            round_keys.push(permute_bits(&cd_bytes, &PC2)?);
        }

        Ok(round_keys)
    }
}
