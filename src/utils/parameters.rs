//! structures related to processing parameters

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::to_writer;

use crate::error::Result;

/// default label of the first column of a cluster table
pub const DEFAULT_COLUMN_NAME: &str = "Fingerprint";

const PARAMETERS_FILE: &str = "parameters.json";

/// Gathers parameters used in clustering.
/// Dumped with the cluster table so that later runs combining derived lists can check coherence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// prefix of cluster ids (nr-0, nr-1 ...)
    pub cluster_prefix: String,
    /// line width of representative fasta output, 0 means no wrapping
    pub sequence_width: usize,
    /// label of first column of cluster table
    pub column_name: String,
    /// name suffix marking a putative protein when no non putative list is given
    pub putative_suffix: String,
    /// compare full sequences inside a fingerprint group
    pub verify_sequences: bool,
} // end of struct ClusterParams

impl Default for ClusterParams {
    fn default() -> Self {
        ClusterParams {
            cluster_prefix: String::from("nr-"),
            sequence_width: 80,
            column_name: String::from(DEFAULT_COLUMN_NAME),
            putative_suffix: String::from("P"),
            verify_sequences: true,
        }
    }
} // end of default for ClusterParams

impl ClusterParams {
    pub fn new(
        cluster_prefix: String,
        sequence_width: usize,
        column_name: String,
        putative_suffix: String,
        verify_sequences: bool,
    ) -> Self {
        ClusterParams {
            cluster_prefix,
            sequence_width,
            column_name,
            putative_suffix,
            verify_sequences,
        }
    }

    /// dumps parameters in dirpath/parameters.json
    pub fn dump_json(&self, dirpath: &Path) -> Result<()> {
        //
        let filepath = dirpath.join(PARAMETERS_FILE);
        //
        log::info!("dumping ClusterParams in json file : {:?}", filepath);
        //
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&filepath)
            .map_err(|e| {
                log::error!("ClusterParams dump : could not open file {:?}", filepath.as_os_str());
                e
            })?;
        //
        let mut writer = BufWriter::new(file);
        to_writer(&mut writer, &self)?;
        writer.flush()?;
        //
        Ok(())
    } // end of dump_json

    /// reload from a json dump made by dump_json in dirpath
    pub fn reload_json(dirpath: &Path) -> Result<Self> {
        log::info!("in ClusterParams::reload_json");
        //
        let filepath = dirpath.join(PARAMETERS_FILE);
        let file = OpenOptions::new().read(true).open(&filepath).map_err(|e| {
            log::error!(
                "ClusterParams reload_json : reload could not open file {:?}",
                filepath.as_os_str()
            );
            e
        })?;
        //
        let reader = BufReader::new(file);
        let params: Self = serde_json::from_reader(reader)?;
        //
        log::info!(
            "ClusterParams reload, prefix : {}, verify : {}",
            params.cluster_prefix,
            params.verify_sequences
        );
        //
        Ok(params)
    } // end of reload_json
} // end of impl ClusterParams

//=====================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_dump_reload() {
        let dir = tempfile::tempdir().unwrap();
        let params =
            ClusterParams::new("cl-".to_string(), 60, "Seq".to_string(), "P".to_string(), false);
        params.dump_json(dir.path()).unwrap();
        let reloaded = ClusterParams::reload_json(dir.path()).unwrap();
        assert_eq!(reloaded, params);
    }

    #[test]
    fn reload_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(ClusterParams::reload_json(dir.path()), Err(crate::NrError::Io(_))));
    }
} // end of mod tests
