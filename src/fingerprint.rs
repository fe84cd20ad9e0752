//! content fingerprint of sequences.
//!
//! A fingerprint is the sha256 digest of the normalized sequence bytes : line wrapping and
//! any ascii whitespace are removed, case is preserved.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{NrError, Result};

/// size in bytes of a fingerprint
pub const FINGERPRINT_SIZE: usize = 32;

/// Fixed width digest of a normalized sequence. Used as cluster key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.0
    }
} // end of impl Fingerprint

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl FromStr for Fingerprint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 2 * FINGERPRINT_SIZE || !s.is_ascii() {
            return Err(format!("not a {} hex digits fingerprint : {:?}", 2 * FINGERPRINT_SIZE, s));
        }
        let mut bytes = [0u8; FINGERPRINT_SIZE];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                .map_err(|e| format!("bad hex digit in fingerprint {:?} : {}", s, e))?;
        }
        Ok(Fingerprint(bytes))
    }
} // end of FromStr for Fingerprint

#[inline]
/// clones the sequence dropping whitespace and line breaks, keeps case.
/// Fails if a byte is not printable ascii or if nothing is left.
pub fn normalize(id: &str, seq: &[u8]) -> Result<Vec<u8>> {
    let mut normalized = Vec::<u8>::with_capacity(seq.len());
    for c in seq {
        if c.is_ascii_whitespace() {
            continue;
        }
        if !c.is_ascii_graphic() {
            return Err(NrError::InvalidSequence {
                id: id.to_string(),
                reason: format!("non printable byte 0x{:02x}", c),
            });
        }
        normalized.push(*c);
    }
    if normalized.is_empty() {
        return Err(NrError::InvalidSequence {
            id: id.to_string(),
            reason: String::from("empty sequence"),
        });
    }
    if log::log_enabled!(log::Level::Trace) && normalized.len() < seq.len() {
        log::trace!("{} : dropped {} whitespace bytes", id, seq.len() - normalized.len());
    }
    Ok(normalized)
} // end of normalize

/// digest of an already normalized sequence
pub fn digest(normalized: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(normalized);
    Fingerprint(hasher.finalize().into())
}

/// normalizes then hashes a sequence.
pub fn fingerprint(sequence: &[u8]) -> Result<Fingerprint> {
    Ok(digest(&normalize("", sequence)?))
}

//=====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn wrapping_does_not_change_fingerprint() {
        log_init_test();
        let one_line = fingerprint(b"MKVLAAGIVGLLLA").unwrap();
        let wrapped = fingerprint(b"MKVLA\nAGIVG\r\nLLLA\n").unwrap();
        let spaced = fingerprint(b" MKV LAAGIVG\tLLLA ").unwrap();
        assert_eq!(one_line, wrapped);
        assert_eq!(one_line, spaced);
    }

    #[test]
    fn case_is_preserved() {
        let upper = fingerprint(b"MKVL").unwrap();
        let lower = fingerprint(b"mkvl").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn empty_sequence_is_invalid() {
        assert!(matches!(fingerprint(b""), Err(NrError::InvalidSequence { .. })));
        assert!(matches!(fingerprint(b" \n\n "), Err(NrError::InvalidSequence { .. })));
        assert!(matches!(fingerprint(b"MK\x00V"), Err(NrError::InvalidSequence { .. })));
    }

    #[test]
    fn hex_display_parses_back() {
        let fp = fingerprint(b"ACDEFGHIKLMNPQRSTVWY").unwrap();
        let hex = fp.to_string();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex.parse::<Fingerprint>().unwrap(), fp);
        assert!("abc".parse::<Fingerprint>().is_err());
    }

    #[test]
    fn known_digest() {
        // sha256 of "abc"
        let fp = fingerprint(b"abc").unwrap();
        assert_eq!(
            fp.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
} // end of mod tests
