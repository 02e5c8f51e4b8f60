//! # 25-Word Mnemonics
//!
//! Algorand's mnemonic is not BIP-39, it only borrows BIP-39's English word
//! list. The 32-byte seed is read as a little-endian bit stream and cut into
//! 11-bit word indices: 256 bits make 23 full words plus a 3-bit tail, which
//! becomes word 24. Word 25 is a checksum, the first 11-bit word of
//! SHA-512/256(seed).
//!
//! Decoding reverses the packing: 24 words give 264 bits, i.e. 33 bytes, and
//! the 33rd byte must be zero (it only holds the padding of word 24).

use bip39::Language;
use thiserror::Error;

use super::hash::sha512_256;

/// Number of words in a mnemonic, checksum included.
pub const MNEMONIC_WORDS: usize = 25;

const KEY_WORDS: usize = MNEMONIC_WORDS - 1;
const WORD_MASK: u32 = 0x7ff;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("mnemonic must have {MNEMONIC_WORDS} words, got {0}")]
    WrongWordCount(usize),

    #[error("word {0:?} is not in the word list")]
    UnknownWord(String),

    #[error("mnemonic does not decode to a 32-byte seed")]
    Malformed,

    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,
}

/// Encode a 32-byte seed as a 25-word mnemonic.
pub fn mnemonic_from_seed(seed: &[u8; 32]) -> String {
    let words = Language::English.word_list();
    let mut phrase: Vec<&str> = to_u11(seed)
        .into_iter()
        .map(|index| words[index as usize])
        .collect();
    phrase.push(checksum_word(seed));
    phrase.join(" ")
}

/// Decode a 25-word mnemonic back into its 32-byte seed.
pub fn seed_from_mnemonic(phrase: &str) -> Result<[u8; 32], MnemonicError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(MnemonicError::WrongWordCount(words.len()));
    }

    let mut indices = Vec::with_capacity(KEY_WORDS);
    for word in &words[..KEY_WORDS] {
        let index = Language::English
            .find_word(word)
            .ok_or_else(|| MnemonicError::UnknownWord((*word).to_string()))?;
        indices.push(index);
    }

    let bytes = to_u8(&indices);
    if bytes.len() != 33 || bytes[32] != 0 {
        return Err(MnemonicError::Malformed);
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);

    if checksum_word(&seed) != words[KEY_WORDS] {
        return Err(MnemonicError::ChecksumMismatch);
    }
    Ok(seed)
}

fn checksum_word(seed: &[u8; 32]) -> &'static str {
    let digest = sha512_256(seed);
    let first = to_u11(&digest).first().copied().unwrap_or(0);
    Language::English.word_list()[first as usize]
}

/// Repack bytes into 11-bit values, least significant bits first.
fn to_u11(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len() * 8 / 11 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &byte in bytes {
        acc |= u32::from(byte) << bits;
        bits += 8;
        if bits >= 11 {
            out.push((acc & WORD_MASK) as u16);
            acc >>= 11;
            bits -= 11;
        }
    }
    if bits > 0 {
        out.push(acc as u16);
    }
    out
}

/// Inverse of [`to_u11`].
fn to_u8(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 11 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &value in values {
        acc |= u32::from(value) << bits;
        bits += 11;
        while bits >= 8 {
            out.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace_word(phrase: &str, position: usize, word: &str) -> String {
        let mut words: Vec<&str> = phrase.split(' ').collect();
        words[position] = word;
        words.join(" ")
    }

    #[test]
    fn round_trip() {
        let seed = [42u8; 32];
        let phrase = mnemonic_from_seed(&seed);
        assert_eq!(phrase.split(' ').count(), MNEMONIC_WORDS);
        assert_eq!(seed_from_mnemonic(&phrase).unwrap(), seed);
    }

    #[test]
    fn zero_seed_is_all_first_word() {
        let phrase = mnemonic_from_seed(&[0u8; 32]);
        let words: Vec<&str> = phrase.split(' ').collect();
        assert!(words[..KEY_WORDS].iter().all(|w| *w == "abandon"));
    }

    #[test]
    fn tolerates_extra_whitespace() {
        let seed = [3u8; 32];
        let phrase = mnemonic_from_seed(&seed).replace(' ', "  ");
        assert_eq!(seed_from_mnemonic(&format!(" {phrase}\n")).unwrap(), seed);
    }

    #[test]
    fn wrong_word_count() {
        assert_eq!(
            seed_from_mnemonic("abandon abandon"),
            Err(MnemonicError::WrongWordCount(2))
        );
    }

    #[test]
    fn unknown_word() {
        let phrase = replace_word(&mnemonic_from_seed(&[5u8; 32]), 3, "plato");
        assert_eq!(
            seed_from_mnemonic(&phrase),
            Err(MnemonicError::UnknownWord("plato".into()))
        );
    }

    #[test]
    fn bad_checksum_word() {
        let phrase = mnemonic_from_seed(&[11u8; 32]);
        let checksum = phrase.split(' ').last().unwrap().to_string();
        let other = if checksum == "zoo" { "abandon" } else { "zoo" };
        let tampered = replace_word(&phrase, KEY_WORDS, other);
        assert_eq!(
            seed_from_mnemonic(&tampered),
            Err(MnemonicError::ChecksumMismatch)
        );
    }

    #[test]
    fn nonzero_padding_is_malformed() {
        // Word 24 only carries 3 bits of seed; "zoo" (2047) sets the padding.
        let phrase = replace_word(&mnemonic_from_seed(&[11u8; 32]), KEY_WORDS - 1, "zoo");
        assert_eq!(seed_from_mnemonic(&phrase), Err(MnemonicError::Malformed));
    }

    #[test]
    fn bit_packing_inverts() {
        let bytes: Vec<u8> = (0u8..33).collect();
        assert_eq!(to_u8(&to_u11(&bytes)), bytes);
    }
}
