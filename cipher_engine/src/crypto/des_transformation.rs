use crate::crypto::des_tables::{E, P, S_BOXES};
use crate::crypto::encryption_transformation::EncryptionTransformation;
use crate::crypto::error::{CipherError, Result};
use crate::crypto::utils::{get_bit, permute_bits, set_bit, xor_blocks};

const HALF_BLOCK_SIZE: usize = 4;
const ROUND_KEY_SIZE: usize = 6;

/// The DES round function `f(R, K)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesTransformation;

impl EncryptionTransformation for DesTransformation {
    fn transform(&self, r_block: &[u8], round_key: &[u8]) -> Result<Vec<u8>> {
        if r_block.len() != HALF_BLOCK_SIZE {
            return Err(CipherError::InvalidBlockSize {
                expected: HALF_BLOCK_SIZE,
                actual: r_block.len(),
            });
        }
        if round_key.len() != ROUND_KEY_SIZE {
            return Err(CipherError::InvalidKeyLength {
                expected: ROUND_KEY_SIZE,
                actual: round_key.len(),
            });
        }

        // 1. Expansion
        let expanded = permute_bits(r_block, &E)?;

        // 2. XOR
        let mixed = xor_blocks(&expanded, round_key);

        // 3. S-boxes
        let mut s_result = [0u8; HALF_BLOCK_SIZE];
        for (box_i, s_box) in S_BOXES.iter().enumerate() {
            let start = box_i * 6;
            let row = (get_bit(&mixed, start) << 1) | get_bit(&mixed, start + 5);
            let mut col = 0;
            for j in 1..5 {
                col = (col << 1) | get_bit(&mixed, start + j);
            }
            let s_val = s_box[row as usize][col as usize];
            for i in 0..4 {
                set_bit(&mut s_result, box_i * 4 + i, (s_val >> (3 - i)) & 1);
            }
        }

        // 4. P-permutation
        permute_bits(&s_result, &P)
    }
}
