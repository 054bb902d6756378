#[cfg(test)]
mod tests {
    use bitvec::prelude::*;
    use cipher_engine::crypto::error::CipherError;
    use cipher_engine::crypto::utils::*;

    #[test]
    fn test_get_bit_msb_first() {
        let data = [0b1000_0001, 0b0100_0000];
        assert_eq!(get_bit(&data, 0), 1);
        assert_eq!(get_bit(&data, 1), 0);
        assert_eq!(get_bit(&data, 7), 1);
        assert_eq!(get_bit(&data, 9), 1);
        assert_eq!(get_bit(&data, 15), 0);
    }

    #[test]
    fn test_set_bit_is_inverse_of_get_bit() {
        let mut data = [0u8; 2];
        set_bit(&mut data, 0, 1);
        set_bit(&mut data, 10, 1);
        assert_eq!(data, [0b1000_0000, 0b0010_0000]);

        set_bit(&mut data, 0, 0);
        assert_eq!(data, [0b0000_0000, 0b0010_0000]);
        assert_eq!(get_bit(&data, 10), 1);
    }

    #[test]
    fn test_bytes_to_bits() {
        let input = vec![0b10101010, 0b11001100];
        let expected = bitvec![1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0];
        assert_eq!(bytes_to_bits(&input), expected);
    }

    #[test]
    fn test_bits_to_bytes() {
        let bits = bitvec![1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0];
        let expected = vec![0b10101010, 0b11001100];
        assert_eq!(bits_to_bytes(&bits), expected);
    }

    #[test]
    fn test_bits_to_bytes_pads_last_byte() {
        let bits = bitvec![1, 1, 0, 1];
        assert_eq!(bits_to_bytes(&bits), vec![0b1101_0000]);
    }

    #[test]
    fn test_permute_bits_even_then_odd() {
        let input = vec![0b10101010, 0b11001100];
        let p_block = vec![2, 4, 6, 8, 10, 12, 14, 16, 1, 3, 5, 7, 9, 11, 13, 15];

        let result = permute_bits(&input, &p_block).unwrap();

        assert_eq!(result, vec![0b00001010, 0b11111010]);
    }

    #[test]
    fn test_permute_bits_reverse() {
        let input = vec![0b10101010, 0b11001100];
        let p_block = vec![16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];

        let result = permute_bits(&input, &p_block).unwrap();

        assert_eq!(result, vec![0b00110011, 0b01010101]);
    }

    #[test]
    fn test_permute_bits_output_length_rounds_up() {
        let input = vec![0b1010_0000];
        let result = permute_bits(&input, &[1, 2, 3]).unwrap();
        assert_eq!(result, vec![0b1010_0000]);

        let wide = permute_bits(&input, &[1; 9]).unwrap();
        assert_eq!(wide, vec![0xFF, 0b1000_0000]);
    }

    #[test]
    fn test_permute_bits_rejects_zero_index() {
        let result = permute_bits(&[0xFF], &[1, 0, 2]);
        assert!(matches!(result, Err(CipherError::InvalidArgument(_))));
    }

    #[test]
    fn test_permute_bits_rejects_index_past_end() {
        let result = permute_bits(&[0xFF, 0xFF], &[16, 17]);
        assert!(matches!(result, Err(CipherError::InvalidArgument(_))));
    }

    #[test]
    fn test_xor_blocks_uses_shorter_length() {
        assert_eq!(xor_blocks(&[0xFF, 0x0F, 0xAA], &[0x0F, 0x0F]), vec![0xF0, 0x00]);
    }
}
