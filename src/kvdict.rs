//! key to value dictionaries.
//!
//! - [`KeyValueDict`] is functional : one value per key.
//! - [`MultiDict`] stores one to many relations
//!   (representative to all cluster members for example).
//!
//! Both are kept sorted by key with [`id_cmp`] and persisted as two tab separated columns,
//! one row per (key, value) pair, with an optional `#:key_label<TAB>value_label` header.

use std::cmp::Ordering;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{NrError, Result};
use crate::idset::{check_identifier, id_cmp, read_header, IdentifierSet, HEADER_MARKER};

/// column labels of a persisted dictionary
pub type Labels = Option<(String, String)>;

fn parse_labels(header: Option<String>, source: &str) -> Result<Labels> {
    match header {
        None => Ok(None),
        Some(header) => match header.split_once('\t') {
            Some((k, v)) if !v.contains('\t') => Ok(Some((k.to_string(), v.to_string()))),
            _ => {
                let msg = format!("expecting 2 column labels in header {:?}", header);
                Err(NrError::format(source, 1, msg))
            }
        },
    }
}

fn write_pairs<'a, W, I>(out: &mut W, labels: &Labels, pairs: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = (&'a str, &'a str)>,
{
    if let Some((k, v)) = labels {
        writeln!(out, "{}{}\t{}", HEADER_MARKER, k, v)?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(out);
    for (k, v) in pairs {
        check_identifier(k)?;
        check_identifier(v)?;
        wtr.write_record([k, v])?;
    }
    wtr.flush()?;
    Ok(())
} // end of write_pairs

/// reads labels and all (key, value) rows in file order
fn read_pairs<R: Read>(reader: R, source: &str) -> Result<(Labels, Vec<(String, String)>)> {
    let mut reader = BufReader::new(reader);
    let labels = parse_labels(read_header(&mut reader)?, source)?;
    let offset: u64 = if labels.is_some() { 1 } else { 0 };
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);
    let mut pairs = Vec::<(String, String)>::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() != 2 {
            let line = record.position().map(|p| p.line()).unwrap_or(0) + offset;
            let msg = format!("expecting 2 columns, got {}", record.len());
            return Err(NrError::format(source, line, msg));
        }
        pairs.push((record[0].to_string(), record[1].to_string()));
    }
    log::debug!("read {} rows from {}", pairs.len(), source);
    Ok((labels, pairs))
} // end of read_pairs

fn pair_cmp(a: &(String, String), b: &(String, String)) -> Ordering {
    id_cmp(&a.0, &b.0).then_with(|| id_cmp(&a.1, &b.1))
}

//==========================================================================================

/// A functional dictionary, each key appears once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyValueDict {
    labels: Labels,
    pairs: Vec<(String, String)>,
}

impl KeyValueDict {
    /// Builds a dictionary from (key, value) pairs in any order.
    /// Repeated identical pairs collapse, a key with two different values is an error.
    pub fn from_pairs<I, K, V>(labels: Labels, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        pairs.sort_unstable_by(pair_cmp);
        pairs.dedup();
        for w in pairs.windows(2) {
            if w[0].0 == w[1].0 {
                return Err(NrError::DuplicateKey {
                    key: w[0].0.clone(),
                    first: w[0].1.clone(),
                    second: w[1].1.clone(),
                });
            }
        }
        Ok(KeyValueDict { labels, pairs })
    } // end of from_pairs

    pub fn get_labels(&self) -> Option<(&str, &str)> {
        self.labels.as_ref().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get_value_label(&self) -> Option<&str> {
        self.labels.as_ref().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// pairs sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .binary_search_by(|(probe, _)| id_cmp(probe, key))
            .ok()
            .map(|i| self.pairs[i].1.as_str())
    }

    /// the set of keys, labelled with the key label
    pub fn keys(&self) -> IdentifierSet {
        let label = self.labels.as_ref().map(|(k, _)| k.clone());
        IdentifierSet::from_sorted(label, self.pairs.iter().map(|(k, _)| k.clone()).collect())
    }

    /// the set of distinct values, labelled with the value label
    pub fn values(&self) -> IdentifierSet {
        let label = self.labels.as_ref().map(|(_, v)| v.clone());
        IdentifierSet::new(label, self.pairs.iter().map(|(_, v)| v.clone()))
    }

    /// Swaps keys and values. Fails with AmbiguousRename if two keys share a value
    /// as the inverse would not be functional.
    pub fn invert(&self) -> Result<KeyValueDict> {
        let mut inverted: Vec<(String, String)> = self
            .pairs
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect();
        inverted.sort_unstable_by(pair_cmp);
        for w in inverted.windows(2) {
            if w[0].0 == w[1].0 {
                return Err(NrError::AmbiguousRename {
                    first: w[0].1.clone(),
                    second: w[1].1.clone(),
                    renamed: w[0].0.clone(),
                });
            }
        }
        let labels = self.labels.as_ref().map(|(k, v)| (v.clone(), k.clone()));
        Ok(KeyValueDict { labels, pairs: inverted })
    } // end of invert

    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        write_pairs(out, &self.labels, self.iter())
    }

    pub fn dump(&self, path: &Path) -> Result<()> {
        log::info!("dumping dictionary of {} keys in file : {:?}", self.pairs.len(), path);
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let (labels, pairs) = read_pairs(reader, source)?;
        KeyValueDict::from_pairs(labels, pairs)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        KeyValueDict::from_reader(file, &path.to_string_lossy())
    }
} // end of impl KeyValueDict

//==========================================================================================

/// A one to many dictionary. Keys are sorted, values of a key are sorted and deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiDict {
    labels: Labels,
    entries: Vec<(String, Vec<String>)>,
}

impl MultiDict {
    pub fn from_pairs<I, K, V>(labels: Labels, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        pairs.sort_unstable_by(pair_cmp);
        pairs.dedup();
        let mut entries = Vec::<(String, Vec<String>)>::new();
        for (k, v) in pairs {
            if let Some((last, values)) = entries.last_mut() {
                if *last == k {
                    values.push(v);
                    continue;
                }
            }
            entries.push((k, vec![v]));
        }
        MultiDict { labels, entries }
    } // end of from_pairs

    pub fn get_labels(&self) -> Option<(&str, &str)> {
        self.labels.as_ref().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .binary_search_by(|(probe, _)| id_cmp(probe, key))
            .ok()
            .map(|i| self.entries[i].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keys(&self) -> IdentifierSet {
        let label = self.labels.as_ref().map(|(k, _)| k.clone());
        IdentifierSet::from_sorted(label, self.entries.iter().map(|(k, _)| k.clone()).collect())
    }

    /// all (key, value) pairs, key major
    pub fn iter_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        write_pairs(out, &self.labels, self.iter_pairs())
    }

    pub fn dump(&self, path: &Path) -> Result<()> {
        log::info!(
            "dumping one to many dictionary of {} keys in file : {:?}",
            self.entries.len(),
            path
        );
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let (labels, pairs) = read_pairs(reader, source)?;
        Ok(MultiDict::from_pairs(labels, pairs))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        MultiDict::from_reader(file, &path.to_string_lossy())
    }
} // end of impl MultiDict

//==========================================================================================

// end of mod tests
