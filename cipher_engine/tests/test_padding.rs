#[cfg(test)]
mod tests {
    use cipher_engine::crypto::cipher_types::PaddingMode;
    use cipher_engine::crypto::error::CipherError;
    use cipher_engine::crypto::padding::{apply_padding, remove_padding};

    const BLOCK_SIZE: usize = 8;

    #[test]
    fn test_padded_length_is_always_next_boundary() {
        for padding in PaddingMode::ALL {
            for len in 0..=3 * BLOCK_SIZE {
                let padded = apply_padding(vec![0x5A; len], BLOCK_SIZE, padding).unwrap();
                assert_eq!(padded.len() % BLOCK_SIZE, 0, "{padding} len {len}");
                assert!(padded.len() > len, "{padding} len {len}");
                assert!(padded.len() - len <= BLOCK_SIZE, "{padding} len {len}");
                assert_eq!(&padded[..len], &vec![0x5A; len][..]);
            }
        }
    }

    #[test]
    fn test_aligned_input_gains_a_full_block() {
        let padded = apply_padding(vec![1; 16], BLOCK_SIZE, PaddingMode::PKCS7).unwrap();
        assert_eq!(padded.len(), 24);
        assert_eq!(&padded[16..], &[8; 8]);
    }

    #[test]
    fn test_pkcs7_layout() {
        let padded = apply_padding(b"hello".to_vec(), BLOCK_SIZE, PaddingMode::PKCS7).unwrap();
        assert_eq!(padded, b"hello\x03\x03\x03");
    }

    #[test]
    fn test_zeros_layout() {
        let padded = apply_padding(b"hey".to_vec(), BLOCK_SIZE, PaddingMode::Zeros).unwrap();
        assert_eq!(padded, b"hey\0\0\0\0\0");
    }

    #[test]
    fn test_iso10126_ends_with_length() {
        let padded = apply_padding(b"abcdef".to_vec(), BLOCK_SIZE, PaddingMode::ISO10126).unwrap();
        assert_eq!(padded.len(), 8);
        assert_eq!(padded[7], 2);
        assert_eq!(&padded[..6], b"abcdef");
    }

    #[test]
    fn test_remove_padding_round_trip() {
        let data = b"the quick brown fox".to_vec();
        for padding in PaddingMode::ALL {
            let padded = apply_padding(data.clone(), BLOCK_SIZE, padding).unwrap();
            assert_eq!(remove_padding(padded, padding).unwrap(), data, "{padding}");
        }
    }

    #[test]
    fn test_zeros_strips_trailing_plaintext_zeros() {
        let padded = apply_padding(vec![7, 0, 0], BLOCK_SIZE, PaddingMode::Zeros).unwrap();
        assert_eq!(remove_padding(padded, PaddingMode::Zeros).unwrap(), vec![7]);
    }

    #[test]
    fn test_pkcs7_rejects_zero_length() {
        let result = remove_padding(vec![1, 2, 3, 4, 5, 6, 7, 0], PaddingMode::PKCS7);
        assert!(matches!(result, Err(CipherError::PaddingValidation(_))));
    }

    #[test]
    fn test_pkcs7_rejects_length_past_data() {
        let result = remove_padding(vec![9; 8], PaddingMode::PKCS7);
        assert!(matches!(result, Err(CipherError::PaddingValidation(_))));
    }

    #[test]
    fn test_pkcs7_rejects_each_corrupted_pad_byte() {
        let padded = apply_padding(b"abc".to_vec(), BLOCK_SIZE, PaddingMode::PKCS7).unwrap();
        for i in 3..7 {
            let mut corrupted = padded.clone();
            corrupted[i] ^= 0xFF;
            assert!(matches!(
                remove_padding(corrupted, PaddingMode::PKCS7),
                Err(CipherError::PaddingValidation(_))
            ));
        }
    }

    #[test]
    fn test_ansi_x923_only_checks_length() {
        let result = remove_padding(vec![1, 2, 3, 4, 5, 9, 9, 3], PaddingMode::ANSI_X923).unwrap();
        assert_eq!(result, vec![1, 2, 3, 4, 5]);

        let too_long = remove_padding(vec![1, 2, 3, 12], PaddingMode::ANSI_X923);
        assert!(matches!(too_long, Err(CipherError::PaddingValidation(_))));
    }

    #[test]
    fn test_length_padding_rejects_empty_input() {
        for padding in [PaddingMode::PKCS7, PaddingMode::ANSI_X923, PaddingMode::ISO10126] {
            assert!(matches!(
                remove_padding(Vec::new(), padding),
                Err(CipherError::PaddingValidation(_))
            ));
        }
        assert_eq!(remove_padding(Vec::new(), PaddingMode::Zeros).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_zero_block_size_is_rejected() {
        assert!(matches!(
            apply_padding(vec![1], 0, PaddingMode::Zeros),
            Err(CipherError::InvalidArgument(_))
        ));
    }
}
