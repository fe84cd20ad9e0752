//! errors raised by clustering and identifier list computations.
//!
//! All variants carry the identifier (or fingerprint) needed to locate the offending record.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NrError>;

#[derive(Error, Debug)]
pub enum NrError {
    /// empty or unnormalizable sequence given to fingerprinting
    #[error("invalid sequence for record {id:?} : {reason}")]
    InvalidSequence { id: String, reason: String },

    /// the same name is attached to two different sequences
    #[error("name {name} denotes two different sequences, fingerprints {first} and {second}")]
    DuplicateNameConflict {
        name: String,
        first: String,
        second: String,
    },

    /// two different normalized sequences gave the same fingerprint
    #[error("fingerprint {fingerprint} shared by different sequences of {first} and {second}")]
    FingerprintCollision {
        fingerprint: String,
        first: String,
        second: String,
    },

    /// a cluster has a flagged member but its stored representative carries no flag
    #[error(
        "cluster of {representative} has flagged member {member} but unflagged representative, \
         cluster table is stale"
    )]
    PolicyInconsistency {
        representative: String,
        member: String,
    },

    /// strict lookup join miss
    #[error("key not found in dictionary : {key}")]
    KeyNotFound { key: String },

    /// two distinct identifiers rewritten to the same one
    #[error("rename maps both {first} and {second} to {renamed}")]
    AmbiguousRename {
        first: String,
        second: String,
        renamed: String,
    },

    /// an identifier that cannot be persisted on one line or in one column
    #[error("invalid identifier {id:?} : {reason}")]
    InvalidIdentifier { id: String, reason: String },

    /// a functional dictionary got two values for one key
    #[error("key {key} has two values : {first} and {second}")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    /// malformed line in a persisted artifact
    #[error("format error in {path} at line {line} : {msg}")]
    Format {
        path: String,
        line: u64,
        msg: String,
    },

    #[error("fasta parsing error : {0}")]
    Fasta(String),

    #[error("I/O error - {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error - {0}")]
    Csv(#[from] csv::Error),

    #[error("json error - {0}")]
    Json(#[from] serde_json::Error),
}

impl NrError {
    pub(crate) fn format<P: std::fmt::Debug>(path: P, line: u64, msg: impl Into<String>) -> Self {
        NrError::Format {
            path: format!("{:?}", path),
            line,
            msg: msg.into(),
        }
    }
} // end of impl NrError
