//! This file contains loading of sequence records and of their flags.
//!
//! Sequences are read from fasta files (possibly gzipped) with needletail,
//! which joins wrapped lines.
//! The record id is the first word of the fasta header, it is also used as the record name.

use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

use fxhash::FxHashSet;

use crate::error::{NrError, Result};
use crate::idset::IdentifierSet;
use crate::record::{Flags, ParsedName, SequenceRecord};
use crate::utils::parameters::ClusterParams;

/// Side channel flag lists. A missing non putative list means putative status is read from names.
#[derive(Clone, Debug, Default)]
pub struct FlagSources {
    pub non_putative: Option<IdentifierSet>,
    pub gold_standard: Option<IdentifierSet>,
}

impl FlagSources {
    pub fn new(non_putative: Option<IdentifierSet>, gold_standard: Option<IdentifierSet>) -> Self {
        FlagSources { non_putative, gold_standard }
    }

    /// flags of a name
    pub fn flags_of(&self, name: &str, putative_suffix: &str) -> Flags {
        let non_putative = match &self.non_putative {
            Some(set) => set.contains(name),
            None => !ParsedName::parse(name, putative_suffix).is_putative(),
        };
        let gold_standard = self
            .gold_standard
            .as_ref()
            .map(|set| set.contains(name))
            .unwrap_or(false);
        Flags::new(non_putative, gold_standard)
    }
} // end of impl FlagSources

/// opens parse fasta data with needletail and returns all records with their flags.
/// Fails if two records share an id.
pub fn read_records<R: Read + Send>(
    reader: R,
    source: &str,
    flag_sources: &FlagSources,
    params: &ClusterParams,
) -> Result<Vec<SequenceRecord>> {
    log::debug!("read_records from {}", source);
    let mut reader = needletail::parse_fastx_reader(reader)
        .map_err(|e| NrError::Fasta(format!("{} : {}", source, e)))?;
    let mut records = Vec::<SequenceRecord>::new();
    let mut seen_ids = FxHashSet::<String>::default();
    let mut nb_bases: usize = 0;
    //
    while let Some(record) = reader.next() {
        let seqrec = record.map_err(|e| NrError::Fasta(format!("{} : {}", source, e)))?;
        let header = String::from_utf8_lossy(seqrec.id());
        let id = header.split_whitespace().next().unwrap_or("").to_string();
        if id.is_empty() {
            let msg = format!("{} : record {} has an empty header", source, records.len());
            return Err(NrError::Fasta(msg));
        }
        if !seen_ids.insert(id.clone()) {
            return Err(NrError::Fasta(format!("{} : repeated record id {}", source, id)));
        }
        let seq = seqrec.seq().into_owned();
        nb_bases += seq.len();
        let flags = flag_sources.flags_of(&id, &params.putative_suffix);
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("record {} , len {}, flags {}", id, seq.len(), flags);
        }
        records.push(SequenceRecord::new(id.clone(), id, seq, flags));
        if records.len() % 50000 == 0 {
            log::info!("nb records read : {}", records.len());
        }
    } // end while
    //
    log::info!("read_records {} : nb records {}, nb residues {}", source, records.len(), nb_bases);
    Ok(records)
} // end of read_records

/// same as read_records on a file, gzipped files are decompressed
pub fn read_records_from_path(
    path: &Path,
    flag_sources: &FlagSources,
    params: &ClusterParams,
) -> Result<Vec<SequenceRecord>> {
    let file = OpenOptions::new().read(true).open(path).map_err(|e| {
        log::error!("read_records_from_path could not open file {:?}", path);
        e
    })?;
    read_records(file, &path.to_string_lossy(), flag_sources, params)
}

/// loads an optional identifier list
pub fn load_optional_set(path: Option<&Path>) -> Result<Option<IdentifierSet>> {
    path.map(IdentifierSet::from_path).transpose()
}

//=====================================================================================

// end of mod tests
