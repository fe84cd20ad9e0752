//! sorted deduplicated identifier lists.
//!
//! Identifiers are ordered by [`id_cmp`] : all-digit identifiers come first in numeric order,
//! other identifiers follow in byte wise order. This order is locale independent and total,
//! two identifiers compare equal only if they are byte identical.
//!
//! Persisted form is one identifier per line, optionally preceded by a `#:label` line.

use std::cmp::Ordering;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{NrError, Result};

/// marker starting the header line of persisted lists and tables
pub const HEADER_MARKER: &str = "#:";

#[inline]
fn is_numeric(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// total order on identifiers
pub fn id_cmp(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => {
            let a_val = a.trim_start_matches('0');
            let b_val = b.trim_start_matches('0');
            a_val
                .len()
                .cmp(&b_val.len())
                .then_with(|| a_val.cmp(b_val))
                // 007 and 7 have the same value, keep them distinct
                .then_with(|| a.as_bytes().cmp(b.as_bytes()))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.as_bytes().cmp(b.as_bytes()),
    }
} // end of id_cmp

/// Identifiers are persisted one per line and as tab separated columns.
pub(crate) fn check_identifier(id: &str) -> Result<()> {
    if id.contains(['\t', '\n', '\r']) {
        return Err(NrError::InvalidIdentifier {
            id: id.to_string(),
            reason: String::from("contains a tab or a line break"),
        });
    }
    Ok(())
}

/// sorts by id_cmp and removes duplicates
pub(crate) fn sort_dedup(ids: &mut Vec<String>) {
    ids.sort_unstable_by(|a, b| id_cmp(a, b));
    ids.dedup();
}

/// Reads the optional `#:` header line. Returns its content without the marker.
/// The reader is left positioned on the first data line.
pub(crate) fn read_header<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let has_header = reader.fill_buf()?.starts_with(HEADER_MARKER.as_bytes());
    if !has_header {
        return Ok(None);
    }
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let label = line[HEADER_MARKER.len()..].trim_end_matches(['\n', '\r']).to_string();
    Ok(Some(label))
} // end of read_header

//==========================================================================================

/// A sorted, deduplicated list of names with an optional label describing what it enumerates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    label: Option<String>,
    ids: Vec<String>,
}

impl IdentifierSet {
    /// builds a set from any iterator, sorting and deduplicating
    pub fn new<I, S>(label: Option<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        sort_dedup(&mut ids);
        IdentifierSet { label, ids }
    }

    /// ids must already be strictly increasing for id_cmp
    pub(crate) fn from_sorted(label: Option<String>, ids: Vec<String>) -> Self {
        debug_assert!(ids.windows(2).all(|w| id_cmp(&w[0], &w[1]) == Ordering::Less));
        IdentifierSet { label, ids }
    }

    pub fn get_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// same identifiers, another label
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.binary_search_by(|probe| id_cmp(probe, id)).is_ok()
    }

    /// Writes in persisted form. Nothing is written if an identifier does not fit on one line.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        for id in &self.ids {
            check_identifier(id)?;
        }
        if let Some(label) = &self.label {
            writeln!(out, "{}{}", HEADER_MARKER, label)?;
        }
        for id in &self.ids {
            writeln!(out, "{}", id)?;
        }
        Ok(())
    }

    /// dump into a file, truncating it
    pub fn dump(&self, path: &Path) -> Result<()> {
        log::info!("dumping {} identifiers in file : {:?}", self.ids.len(), path);
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    } // end of dump

    /// Reads a persisted list. Lists out of canonical order are accepted, sorted and deduplicated,
    /// with a warning. `source` is only used in messages.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        let label = read_header(&mut reader)?;
        let mut line_num: u64 = if label.is_some() { 1 } else { 0 };
        let mut ids = Vec::<String>::new();
        let mut canonical = true;
        for line in reader.lines() {
            line_num += 1;
            let line = line?;
            let id = line.trim_end_matches('\r');
            if id.is_empty() {
                continue;
            }
            if id.starts_with(HEADER_MARKER) {
                return Err(NrError::format(source, line_num, "header line after data"));
            }
            if id.contains('\t') {
                let msg = format!("tab in identifier {:?}", id);
                return Err(NrError::format(source, line_num, msg));
            }
            if let Some(last) = ids.last() {
                if id_cmp(last, id) != Ordering::Less {
                    canonical = false;
                }
            }
            ids.push(id.to_string());
        }
        if !canonical {
            log::warn!("identifier list {} is not strictly sorted, sorting it", source);
            sort_dedup(&mut ids);
        }
        log::debug!("read {} identifiers from {}", ids.len(), source);
        Ok(IdentifierSet { label, ids })
    } // end of from_reader

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        IdentifierSet::from_reader(file, &path.to_string_lossy())
    }
} // end of impl IdentifierSet

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

//==========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_before_alphabetic() {
        let set = IdentifierSet::new(None, ["b", "10", "a", "9", "B", "009", "a"]);
        let ids: Vec<&str> = set.iter().collect();
        assert_eq!(ids, vec!["009", "9", "10", "B", "a", "b"]);
    }

    #[test]
    fn order_is_total() {
        assert_eq!(id_cmp("7", "7"), Ordering::Equal);
        assert_ne!(id_cmp("07", "7"), Ordering::Equal);
        assert_eq!(id_cmp("07", "7"), id_cmp("7", "07").reverse());
        assert_eq!(id_cmp("0", "00"), Ordering::Less);
        // huge numbers do not overflow
        assert_eq!(id_cmp("123456789012345678901234567890", "99"), Ordering::Greater);
    }

    #[test]
    fn unwritable_identifier_is_rejected() {
        let set = IdentifierSet::new(Some("names".into()), ["M.EcoRI", "M.Hpa\nII"]);
        let mut out = Vec::<u8>::new();
        match set.write(&mut out) {
            Err(NrError::InvalidIdentifier { id, .. }) => assert_eq!(id, "M.Hpa\nII"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(out.is_empty());
        let set = IdentifierSet::new(None, ["a\tb"]);
        assert!(set.write(&mut out).is_err());
    }

    #[test]
    fn contains_uses_same_order() {
        let set = IdentifierSet::new(None, ["M.EcoRI", "2", "M.BsaI", "10"]);
        assert!(set.contains("10"));
        assert!(set.contains("M.BsaI"));
        assert!(!set.contains("M.HpaII"));
    }

    #[test]
    fn read_with_header() {
        let text = "#:REBASE_name\nEcoRI\nHpaII\n\nMspI\n";
        let set = IdentifierSet::from_reader(text.as_bytes(), "test").unwrap();
        assert_eq!(set.get_label(), Some("REBASE_name"));
        assert_eq!(set.len(), 3);
        let mut out = Vec::<u8>::new();
        set.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "#:REBASE_name\nEcoRI\nHpaII\nMspI\n");
    }

    #[test]
    fn read_unsorted_is_canonicalized() {
        let text = "c\na\nb\na\n";
        let set = IdentifierSet::from_reader(text.as_bytes(), "test").unwrap();
        assert_eq!(set.get_label(), None);
        assert_eq!(set.as_slice(), &["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn misplaced_header_fails() {
        let text = "a\n#:label\n";
        assert!(matches!(
            IdentifierSet::from_reader(text.as_bytes(), "test"),
            Err(NrError::Format { line: 2, .. })
        ));
    }
} // end of mod tests
