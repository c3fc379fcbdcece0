//! Alphabetic-shift variant.
//!
//! Each ASCII letter moves forward by a fixed offset, wrapping inside
//! its own case's alphabet.  Everything else (digits, punctuation, and
//! every byte of a multi-byte UTF-8 sequence) passes through untouched,
//! so valid UTF-8 in gives valid UTF-8 out.
//!
//! This is materially weaker than the XOR variant: the offset is a
//! fixed configuration constant rather than a secret key, there are
//! only 25 useful offsets, and non-letters are stored verbatim.

use super::ObfuscationCodec;

/// Offset used when the configuration does not name one.
pub const DEFAULT_OFFSET: u8 = 3;

const ALPHABET_LEN: u8 = 26;

/// Shift every ASCII letter in `plaintext` forward by `offset`.
pub fn encrypt(plaintext: &[u8], offset: u8) -> Vec<u8> {
    let offset = offset % ALPHABET_LEN;
    plaintext.iter().map(|&b| shift_byte(b, offset)).collect()
}

/// Reverse `encrypt` for the same `offset`.
pub fn decrypt(ciphertext: &[u8], offset: u8) -> Vec<u8> {
    let back = (ALPHABET_LEN - offset % ALPHABET_LEN) % ALPHABET_LEN;
    ciphertext.iter().map(|&b| shift_byte(b, back)).collect()
}

fn shift_byte(b: u8, offset: u8) -> u8 {
    let base = match b {
        b'a'..=b'z' => b'a',
        b'A'..=b'Z' => b'A',
        _ => return b,
    };
    base + (b - base + offset) % ALPHABET_LEN
}

/// Fixed-offset shift codec.
#[derive(Debug, Clone, Copy)]
pub struct ShiftCodec {
    offset: u8,
}

impl ShiftCodec {
    pub fn new(offset: u8) -> Self {
        Self {
            offset: offset % ALPHABET_LEN,
        }
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }
}

impl Default for ShiftCodec {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSET)
    }
}

impl ObfuscationCodec for ShiftCodec {
    fn name(&self) -> &'static str {
        "shift"
    }

    fn obscure(&self, plain: &[u8]) -> Vec<u8> {
        encrypt(plain, self.offset)
    }

    fn reveal(&self, obscured: &[u8]) -> Vec<u8> {
        decrypt(obscured, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_letters_and_wraps() {
        assert_eq!(encrypt(b"abcxyz", 3), b"defabc");
        assert_eq!(encrypt(b"ABCXYZ", 3), b"DEFABC");
    }

    #[test]
    fn non_letters_pass_through() {
        assert_eq!(encrypt(b"p@ss1,!", 3), b"s@vv1,!");
    }

    #[test]
    fn roundtrip_preserves_utf8() {
        let text = "Grüße, naïve café";
        let ct = encrypt(text.as_bytes(), 7);
        assert!(std::str::from_utf8(&ct).is_ok());
        assert_eq!(decrypt(&ct, 7), text.as_bytes());
    }

    #[test]
    fn offset_is_reduced_mod_alphabet() {
        assert_eq!(ShiftCodec::new(29).offset(), 3);
        assert_eq!(encrypt(b"abc", 26), b"abc");
    }

    #[test]
    fn default_offset_is_three() {
        let codec = ShiftCodec::default();
        assert_eq!(codec.obscure(b"Zed"), b"Chg");
        assert_eq!(codec.reveal(b"Chg"), b"Zed");
    }
}
