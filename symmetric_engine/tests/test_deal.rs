use symmetric_engine::crypto::cipher_traits::{BlockCipher, KeyExpander};
use symmetric_engine::crypto::deal::{Deal, DEAL_DEFAULT_ROUNDS};
use symmetric_engine::crypto::deal_key_expansion::DealKeyExpansion;
use symmetric_engine::crypto::errors::CipherError;

const KEY: [u8; 16] = [
    0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
    0x00,
];

const BLOCK: [u8; 16] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54, 0x32,
    0x10,
];

#[test]
fn roundtrip_with_reference_round_count() {
    let mut deal = Deal::new(DEAL_DEFAULT_ROUNDS);
    deal.set_key(&KEY).unwrap();

    let encrypted = deal.encrypt(&BLOCK).unwrap();
    assert_ne!(encrypted, BLOCK);
    assert_eq!(encrypted.len(), 16);

    let decrypted = deal.decrypt(&encrypted).unwrap();
    assert_eq!(decrypted, BLOCK);
}

#[test]
fn roundtrip_with_other_round_counts() {
    for rounds in [1, 2, 4, 8] {
        let mut deal = Deal::new(rounds);
        deal.set_key(&KEY).unwrap();

        let encrypted = deal.encrypt(&BLOCK).unwrap();
        let decrypted = deal.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, BLOCK, "roundtrip failed at {rounds} rounds");
    }
}

#[test]
fn key_schedule_mixes_key_bytes_per_round() {
    let round_keys = DealKeyExpansion::new(6).expand_key(&KEY).unwrap();

    assert_eq!(round_keys.len(), 6);
    assert!(round_keys.iter().all(|k| k.len() == 8));

    // round_key[i][j] = key[(2i + j) % 16] ^ (i + 1) ^ (j << 1)
    assert_eq!(round_keys[0][0], KEY[0] ^ 0x01);
    assert_eq!(round_keys[1][3], KEY[5] ^ 0x02 ^ 0x06);
    assert_eq!(round_keys[5][7], KEY[(5 * 2 + 7) % 16] ^ 0x06 ^ 0x0E);
}

#[test]
fn wrong_key_length_is_rejected() {
    let mut deal = Deal::default();
    assert!(matches!(
        deal.set_key(&[0u8; 8]),
        Err(CipherError::Validation(_))
    ));
    assert!(deal.set_key(&[0u8; 24]).is_err());
}

#[test]
fn wrong_block_length_is_rejected() {
    let mut deal = Deal::default();
    deal.set_key(&KEY).unwrap();

    assert!(deal.encrypt(&[0u8; 8]).is_err());
    assert!(deal.decrypt(&[0u8; 15]).is_err());
}

#[test]
fn block_size_is_sixteen() {
    assert_eq!(Deal::default().block_size(), 16);
}
