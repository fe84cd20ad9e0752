//! nrseq builds non redundant protein sets.
//!
//! - records sharing exactly the same sequence are gathered in clusters keyed by a content
//!   fingerprint, one representative per cluster is elected (non putative first,
//!   then gold standard, then name order).
//! - identifier lists and key/value dictionaries derived from the cluster table are computed
//!   with a small algebra of sorted sets : membership filter, cluster selection, lookup join
//!   and renaming.
//!
//! All computations are pure batch functions on immutable inputs, so re-running them on unchanged
//! inputs gives byte identical files.

pub mod error;
pub mod fingerprint;
pub mod record;
pub mod selector;
pub mod cluster;
pub mod idset;
pub mod kvdict;
pub mod join;
pub mod utils;

pub use error::{NrError, Result};
