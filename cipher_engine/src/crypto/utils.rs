use crate::crypto::error::{CipherError, Result};
use bitvec::prelude::BitVec;

/// Bit `index` of `data`, counted from the most significant bit of byte 0.
pub fn get_bit(data: &[u8], index: usize) -> u8 {
    (data[index / 8] >> (7 - index % 8)) & 1
}

pub fn set_bit(data: &mut [u8], index: usize, bit: u8) {
    let mask = 1 << (7 - index % 8);
    if bit & 1 == 1 {
        data[index / 8] |= mask;
    } else {
        data[index / 8] &= !mask;
    }
}

/// Builds `ceil(p_block.len() / 8)` bytes where output bit `i` is input bit
/// `p_block[i]`, both numbered from 1 at the MSB of the first byte.
pub fn permute_bits(data: &[u8], p_block: &[usize]) -> Result<Vec<u8>> {
    let bit_count = data.len() * 8;
    let mut output = vec![0u8; p_block.len().div_ceil(8)];

    for (i, &pos) in p_block.iter().enumerate() {
        if pos == 0 || pos > bit_count {
            return Err(CipherError::InvalidArgument(format!(
                "permutation entry {pos} outside 1..={bit_count}"
            )));
        }
        set_bit(&mut output, i, get_bit(data, pos - 1));
    }

    Ok(output)
}

pub fn bytes_to_bits(input: &[u8]) -> BitVec {
    let mut bits = BitVec::with_capacity(input.len() * 8);
    for &byte in input {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 != 0);
        }
    }
    bits
}

pub fn bits_to_bytes(bits: &BitVec) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));

    for chunk in bits.chunks(8) {
        let mut byte = 0;
        for (i, bit) in chunk.iter().enumerate() {
            if *bit {
                byte |= 1 << (7 - i);
            }
        }
        bytes.push(byte);
    }
    bytes
}

pub fn xor_blocks(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}
