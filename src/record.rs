//! sequence records, annotation flags and parsing of protein names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fingerprint::{self, Fingerprint};

/// annotation flags attached to a record
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flags {
    /// higher confidence, non speculative annotation
    pub non_putative: bool,
    /// member of the curated reference subset
    pub gold_standard: bool,
}

impl Flags {
    pub fn new(non_putative: bool, gold_standard: bool) -> Self {
        Flags { non_putative, gold_standard }
    }

    pub fn is_empty(&self) -> bool {
        !self.non_putative && !self.gold_standard
    }

    /// flags carried by any of self and other
    pub fn union(&self, other: &Flags) -> Flags {
        Flags {
            non_putative: self.non_putative || other.non_putative,
            gold_standard: self.gold_standard || other.gold_standard,
        }
    }
} // end of impl Flags

const NON_PUTATIVE_TAG: &str = "non_putative";
const GOLD_STANDARD_TAG: &str = "gold_standard";
const NO_FLAG_TAG: &str = "-";

/// Flags are persisted as a comma separated list of tags, `-` when empty.
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.non_putative, self.gold_standard) {
            (false, false) => write!(f, "{}", NO_FLAG_TAG),
            (true, false) => write!(f, "{}", NON_PUTATIVE_TAG),
            (false, true) => write!(f, "{}", GOLD_STANDARD_TAG),
            (true, true) => write!(f, "{},{}", NON_PUTATIVE_TAG, GOLD_STANDARD_TAG),
        }
    }
}

impl FromStr for Flags {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut flags = Flags::default();
        let s = s.trim();
        if s == NO_FLAG_TAG || s.is_empty() {
            return Ok(flags);
        }
        for tag in s.split(',') {
            match tag.trim() {
                NON_PUTATIVE_TAG => flags.non_putative = true,
                GOLD_STANDARD_TAG => flags.gold_standard = true,
                other => return Err(format!("unknown flag {:?}", other)),
            }
        }
        Ok(flags)
    }
} // end of FromStr for Flags

//==========================================================================================

/// A record as delivered by the record source. Immutable once read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecord {
    /// id, unique in its source file
    id: String,
    /// externally meaningful key used downstream
    name: String,
    /// sequence bytes as read, possibly line wrapped
    sequence: Vec<u8>,
    flags: Flags,
}

impl SequenceRecord {
    pub fn new(id: String, name: String, sequence: Vec<u8>, flags: Flags) -> Self {
        SequenceRecord { id, name, sequence, flags }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn get_flags(&self) -> Flags {
        self.flags
    }

    /// normalized sequence, errors carry the record id
    pub fn normalized(&self) -> Result<Vec<u8>> {
        fingerprint::normalize(&self.id, &self.sequence)
    }

    /// returns the fingerprint and the normalized sequence it was computed from
    pub fn fingerprint(&self) -> Result<(Fingerprint, Vec<u8>)> {
        let normalized = self.normalized()?;
        Ok((fingerprint::digest(&normalized), normalized))
    }
} // end of impl SequenceRecord

//==========================================================================================

/// Shape of a protein name.
///
/// REBASE like names are either tagged with their protein type (`M.EcoRI`, `M2.BsaI`, `R.Hpy99XIP`)
/// or plain (`EcoRI`, `Hpy99XIP`).
/// A trailing putative suffix (`P` by default) marks a putative protein.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedName {
    /// `<tag>[digits].<base>`, the tag is the leading letters
    Tagged {
        tag: String,
        base: String,
        putative: bool,
    },
    /// a name without type tag
    Plain { base: String, putative: bool },
    /// empty name or name containing whitespace
    Unrecognized(String),
}

impl ParsedName {
    pub fn parse(name: &str, putative_suffix: &str) -> ParsedName {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return ParsedName::Unrecognized(name.to_string());
        }
        let putative = !putative_suffix.is_empty()
            && name.ends_with(putative_suffix)
            && name.len() > putative_suffix.len();
        let base = if putative { &name[..name.len() - putative_suffix.len()] } else { name };
        //
        if let Some((prefix, rest)) = base.split_once('.') {
            let tag = prefix.trim_end_matches(|c: char| c.is_ascii_digit());
            if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphabetic()) && !rest.is_empty() {
                return ParsedName::Tagged {
                    tag: tag.to_string(),
                    base: rest.to_string(),
                    putative,
                };
            }
        }
        ParsedName::Plain {
            base: base.to_string(),
            putative,
        }
    } // end of parse

    /// true if name shape says the protein is putative.
    /// Unrecognized names are considered putative.
    pub fn is_putative(&self) -> bool {
        match self {
            ParsedName::Tagged { putative, .. } | ParsedName::Plain { putative, .. } => *putative,
            ParsedName::Unrecognized(_) => true,
        }
    }

    pub fn get_tag(&self) -> Option<&str> {
        match self {
            ParsedName::Tagged { tag, .. } => Some(tag),
            _ => None,
        }
    }
} // end of impl ParsedName

//==========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_text_form() {
        for flags in [
            Flags::default(),
            Flags::new(true, false),
            Flags::new(false, true),
            Flags::new(true, true),
        ] {
            assert_eq!(flags.to_string().parse::<Flags>().unwrap(), flags);
        }
        assert_eq!(Flags::default().to_string(), "-");
        assert!("putative".parse::<Flags>().is_err());
    }

    #[test]
    fn parse_tagged_names() {
        let parsed = ParsedName::parse("M.EcoRI", "P");
        assert_eq!(
            parsed,
            ParsedName::Tagged {
                tag: "M".to_string(),
                base: "EcoRI".to_string(),
                putative: false
            }
        );
        let parsed = ParsedName::parse("M2.Hpy99XIP", "P");
        assert_eq!(parsed.get_tag(), Some("M"));
        assert!(parsed.is_putative());
    }

    #[test]
    fn parse_plain_and_unrecognized() {
        let parsed = ParsedName::parse("Hpy99XIP", "P");
        assert_eq!(
            parsed,
            ParsedName::Plain {
                base: "Hpy99XI".to_string(),
                putative: true
            }
        );
        assert!(!ParsedName::parse("EcoRI", "P").is_putative());
        // a dot not preceded by a type tag does not make a tagged name
        assert!(matches!(ParsedName::parse("12.ab", "P"), ParsedName::Plain { .. }));
        assert!(matches!(ParsedName::parse("", "P"), ParsedName::Unrecognized(_)));
        assert!(matches!(ParsedName::parse("Eco RI", "P"), ParsedName::Unrecognized(_)));
        // the suffix alone is not a putative name
        assert!(!ParsedName::parse("P", "P").is_putative());
    }

    #[test]
    fn record_fingerprint_carries_id_on_error() {
        let rec =
            SequenceRecord::new("id1".into(), "EcoRI".into(), b"\n".to_vec(), Flags::default());
        match rec.fingerprint() {
            Err(crate::NrError::InvalidSequence { id, .. }) => assert_eq!(id, "id1"),
            other => panic!("unexpected {:?}", other),
        }
    }
} // end of mod tests
