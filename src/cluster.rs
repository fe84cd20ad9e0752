//! clustering of identical sequences.
//!
//! Records are grouped by the fingerprint of their normalized sequence, each group becomes a
//! [`Cluster`] with one representative elected by [`crate::selector`].
//! The [`ClusterTable`] is persisted as a tab separated file with one row per member :
//!
//! `fingerprint  representative  member  sequence_length  cluster_id  member_flags`
//!
//! rows sorted by representative then member.

use std::collections::hash_map::Entry;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use cpu_time::ProcessTime;
use fxhash::FxHashMap;
use rayon::prelude::*;

use crate::error::{NrError, Result};
use crate::fingerprint::{self, Fingerprint};
use crate::idset::{id_cmp, read_header, IdentifierSet, HEADER_MARKER};
use crate::kvdict::{KeyValueDict, MultiDict};
use crate::record::{Flags, SequenceRecord};
use crate::selector::{self, Candidate};
use crate::utils::parameters::{ClusterParams, DEFAULT_COLUMN_NAME};

pub const REPRESENTATIVE_LABEL: &str = "Representative";
pub const MEMBER_LABEL: &str = "Member";
pub const CLUSTER_ID_LABEL: &str = "Cluster_ID";
const TABLE_NB_COLUMNS: usize = 6;

/// a cluster member : a name and the flags it carried at build time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    name: String,
    flags: Flags,
}

impl Member {
    pub fn new(name: String, flags: Flags) -> Self {
        Member { name, flags }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_flags(&self) -> Flags {
        self.flags
    }
}

impl Candidate for Member {
    fn name(&self) -> &str {
        &self.name
    }
    fn flags(&self) -> Flags {
        self.flags
    }
}

//==========================================================================================

/// All records sharing one fingerprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    fingerprint: Fingerprint,
    cluster_id: String,
    representative: String,
    /// sorted by name, representative is one of them
    members: Vec<Member>,
    sequence_length: usize,
    /// normalized sequence, only kept in freshly built tables
    sequence: Option<Vec<u8>>,
}

impl Cluster {
    pub fn get_fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn get_cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn get_representative(&self) -> &str {
        &self.representative
    }

    pub fn get_members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    pub fn get_sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn get_sequence(&self) -> Option<&[u8]> {
        self.sequence.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.binary_search_by(|m| id_cmp(&m.name, name)).is_ok()
    }

    /// flags stored for the representative
    pub fn representative_flags(&self) -> Flags {
        self.members
            .binary_search_by(|m| id_cmp(&m.name, &self.representative))
            .map(|i| self.members[i].flags)
            .unwrap_or_default()
    }

    /// members in preference order, representative first
    pub fn members_by_preference(&self) -> Vec<&Member> {
        let mut ordered: Vec<&Member> = self.members.iter().collect();
        ordered.sort_by(|a, b| selector::preference_cmp(*a, *b));
        ordered
    }
} // end of impl Cluster

//==========================================================================================

/// the persisted result of clustering, clusters sorted by representative
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterTable {
    /// label of the first (fingerprint) column
    column_name: String,
    clusters: Vec<Cluster>,
}

impl ClusterTable {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get_column_name(&self) -> &str {
        &self.column_name
    }

    pub fn get_clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    /// cluster with given representative
    pub fn get(&self, representative: &str) -> Option<&Cluster> {
        self.clusters
            .binary_search_by(|c| id_cmp(&c.representative, representative))
            .ok()
            .map(|i| &self.clusters[i])
    }

    /// number of members over all clusters
    pub fn nb_members(&self) -> usize {
        self.clusters.iter().map(|c| c.members.len()).sum()
    }

    pub fn representatives(&self) -> IdentifierSet {
        IdentifierSet::from_sorted(
            Some(REPRESENTATIVE_LABEL.to_string()),
            self.clusters.iter().map(|c| c.representative.clone()).collect(),
        )
    }

    /// all member names
    pub fn members(&self) -> IdentifierSet {
        IdentifierSet::new(
            Some(MEMBER_LABEL.to_string()),
            self.clusters.iter().flat_map(|c| c.member_names().map(String::from)),
        )
    }

    pub fn member_to_representative(&self) -> Result<KeyValueDict> {
        let pairs = self
            .clusters
            .iter()
            .flat_map(|c| c.member_names().map(move |m| (m, c.representative.as_str())));
        let labels = Some((MEMBER_LABEL.to_string(), REPRESENTATIVE_LABEL.to_string()));
        KeyValueDict::from_pairs(labels, pairs)
    }

    pub fn representative_to_members(&self) -> MultiDict {
        let pairs = self
            .clusters
            .iter()
            .flat_map(|c| c.member_names().map(move |m| (c.representative.as_str(), m)));
        let labels = Some((REPRESENTATIVE_LABEL.to_string(), MEMBER_LABEL.to_string()));
        MultiDict::from_pairs(labels, pairs)
    }

    pub fn representative_to_cluster_id(&self) -> Result<KeyValueDict> {
        let pairs = self
            .clusters
            .iter()
            .map(|c| (c.representative.as_str(), c.cluster_id.as_str()));
        let labels = Some((REPRESENTATIVE_LABEL.to_string(), CLUSTER_ID_LABEL.to_string()));
        KeyValueDict::from_pairs(labels, pairs)
    }

    /// write in persisted tab separated form
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "{}{}\t{}\t{}\tSequence_length\t{}\tFlags",
            HEADER_MARKER, self.column_name, REPRESENTATIVE_LABEL, MEMBER_LABEL, CLUSTER_ID_LABEL
        )?;
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(out);
        for cluster in &self.clusters {
            let fingerprint = cluster.fingerprint.to_string();
            let seq_len = cluster.sequence_length.to_string();
            for member in &cluster.members {
                let flags = member.flags.to_string();
                wtr.write_record([
                    fingerprint.as_str(),
                    cluster.representative.as_str(),
                    member.name.as_str(),
                    seq_len.as_str(),
                    cluster.cluster_id.as_str(),
                    flags.as_str(),
                ])?;
            }
        }
        wtr.flush()?;
        Ok(())
    } // end of write

    pub fn dump(&self, path: &Path) -> Result<()> {
        log::info!("dumping {} clusters in file : {:?}", self.clusters.len(), path);
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes representative sequences as fasta, wrapped at width (no wrapping if width is 0).
    /// Only possible on a table built in this run, reloaded tables do not keep sequences.
    pub fn write_representatives_fasta<W: Write>(&self, out: &mut W, width: usize) -> Result<()> {
        for cluster in &self.clusters {
            let seq = cluster.sequence.as_deref().ok_or_else(|| NrError::InvalidSequence {
                id: cluster.representative.clone(),
                reason: String::from("sequence not kept in a reloaded cluster table"),
            })?;
            writeln!(out, ">{}", cluster.representative)?;
            let width = if width == 0 { seq.len() } else { width };
            for chunk in seq.chunks(width) {
                out.write_all(chunk)?;
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    } // end of write_representatives_fasta

    pub fn dump_representatives_fasta(&self, path: &Path, width: usize) -> Result<()> {
        log::info!("dumping {} representative sequences in file : {:?}", self.clusters.len(), path);
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        let mut writer = BufWriter::new(file);
        self.write_representatives_fasta(&mut writer, width)?;
        writer.flush()?;
        Ok(())
    }

    /// Reloads a persisted table. Checks that rows of a cluster agree, that the representative
    /// is a member, that no name belongs to two clusters and no fingerprint to two clusters.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        let header = read_header(&mut reader)?;
        let offset: u64 = if header.is_some() { 1 } else { 0 };
        let column_name = header
            .as_deref()
            .and_then(|h| h.split('\t').next())
            .unwrap_or(DEFAULT_COLUMN_NAME)
            .to_string();
        //
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);
        // representative -> (first line of the cluster, cluster)
        let mut clusters = FxHashMap::<String, (u64, Cluster)>::default();
        let mut member_of = FxHashMap::<String, String>::default();
        let mut owner_of = FxHashMap::<Fingerprint, String>::default();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0) + offset;
            if record.len() != TABLE_NB_COLUMNS {
                let msg = format!("expecting {} columns, got {}", TABLE_NB_COLUMNS, record.len());
                return Err(NrError::format(source, line, msg));
            }
            let fingerprint: Fingerprint = record[0]
                .parse()
                .map_err(|e: String| NrError::format(source, line, e))?;
            let representative = &record[1];
            let member = &record[2];
            let sequence_length: usize = record[3].parse().map_err(|e| {
                let msg = format!("bad sequence length {:?} : {}", &record[3], e);
                NrError::format(source, line, msg)
            })?;
            let cluster_id = &record[4];
            let flags: Flags = record[5]
                .parse()
                .map_err(|e: String| NrError::format(source, line, e))?;
            //
            if let Some(other) = member_of.insert(member.to_string(), representative.to_string()) {
                if other != representative {
                    return Err(NrError::DuplicateNameConflict {
                        name: member.to_string(),
                        first: clusters
                            .get(&other)
                            .map(|(_, c)| c.fingerprint.to_string())
                            .unwrap_or_default(),
                        second: fingerprint.to_string(),
                    });
                }
                return Err(NrError::format(source, line, format!("member {} repeated", member)));
            }
            match owner_of.entry(fingerprint) {
                Entry::Occupied(e) => {
                    if e.get() != representative {
                        let msg = format!(
                            "fingerprint {} already in cluster of {}, again with representative {}",
                            fingerprint,
                            e.get(),
                            representative
                        );
                        log::error!("{}", msg);
                        return Err(NrError::format(source, line, msg));
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(representative.to_string());
                }
            }
            let (_, cluster) = clusters.entry(representative.to_string()).or_insert_with(|| {
                let cluster = Cluster {
                    fingerprint,
                    cluster_id: cluster_id.to_string(),
                    representative: representative.to_string(),
                    members: Vec::new(),
                    sequence_length,
                    sequence: None,
                };
                (line, cluster)
            });
            if cluster.fingerprint != fingerprint
                || cluster.cluster_id != cluster_id
                || cluster.sequence_length != sequence_length
            {
                let msg = format!("rows of cluster {} disagree", representative);
                return Err(NrError::format(source, line, msg));
            }
            cluster.members.push(Member::new(member.to_string(), flags));
        }
        //
        let mut located: Vec<(u64, Cluster)> = clusters.into_values().collect();
        // report the first faulty cluster in file order
        located.sort_by_key(|(line, _)| *line);
        for (line, cluster) in located.iter_mut() {
            cluster.members.sort_by(|a, b| id_cmp(&a.name, &b.name));
            if !cluster.contains(&cluster.representative) {
                let msg = format!(
                    "representative {} is not a member of its cluster",
                    cluster.representative
                );
                return Err(NrError::format(source, *line, msg));
            }
        }
        let mut clusters: Vec<Cluster> = located.into_iter().map(|(_, c)| c).collect();
        clusters.sort_by(|a, b| id_cmp(&a.representative, &b.representative));
        log::info!(
            "reloaded {} clusters, {} members from {}",
            clusters.len(),
            member_of.len(),
            source
        );
        Ok(ClusterTable { column_name, clusters })
    } // end of from_reader

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        ClusterTable::from_reader(file, &path.to_string_lossy())
    }
} // end of impl ClusterTable

//==========================================================================================

/// records gathered under one fingerprint during build
struct Group {
    /// name of the first record seen, for collision reports
    first_name: String,
    normalized: Vec<u8>,
    members: FxHashMap<String, Flags>,
}

/// Builds a ClusterTable from a full set of records.
pub struct ClusterBuilder {
    params: ClusterParams,
}

impl ClusterBuilder {
    pub fn new(params: ClusterParams) -> Self {
        ClusterBuilder { params }
    }

    pub fn get_params(&self) -> &ClusterParams {
        &self.params
    }

    /// Partitions records by sequence content.
    /// Either all records are clustered or an error is returned, there is no partial table.
    pub fn build(&self, records: &[SequenceRecord]) -> Result<ClusterTable> {
        self.build_with_digest(records, fingerprint::digest)
    }

    /// build with a given digest of normalized sequences
    pub(crate) fn build_with_digest(
        &self,
        records: &[SequenceRecord],
        digest: fn(&[u8]) -> Fingerprint,
    ) -> Result<ClusterTable> {
        let start_t = SystemTime::now();
        let cpu_start = ProcessTime::now();
        log::info!("ClusterBuilder::build, nb records : {}", records.len());
        // fingerprints are independent, errors are reported in input order
        let fingerprinted: Vec<Result<(Fingerprint, Vec<u8>)>> = records
            .par_iter()
            .map(|r| r.normalized().map(|normalized| (digest(&normalized), normalized)))
            .collect();
        //
        let mut groups = FxHashMap::<Fingerprint, Group>::default();
        let mut name_to_fp = FxHashMap::<&str, Fingerprint>::default();
        for (record, res) in records.iter().zip(fingerprinted) {
            let (fp, normalized) = res?;
            let name = record.get_name();
            match name_to_fp.entry(name) {
                Entry::Occupied(e) => {
                    if *e.get() != fp {
                        log::error!("name {} attached to two different sequences", name);
                        return Err(NrError::DuplicateNameConflict {
                            name: name.to_string(),
                            first: e.get().to_string(),
                            second: fp.to_string(),
                        });
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(fp);
                }
            }
            match groups.entry(fp) {
                Entry::Occupied(mut e) => {
                    let group = e.get_mut();
                    if self.params.verify_sequences && group.normalized != normalized {
                        log::error!("fingerprint collision, {} and {}", group.first_name, name);
                        return Err(NrError::FingerprintCollision {
                            fingerprint: fp.to_string(),
                            first: group.first_name.clone(),
                            second: name.to_string(),
                        });
                    }
                    let flags = record.get_flags();
                    group
                        .members
                        .entry(name.to_string())
                        .and_modify(|f| {
                            if *f != flags {
                                log::warn!("repeated name {} with different flags, merged", name);
                            }
                            *f = f.union(&flags);
                        })
                        .or_insert(flags);
                }
                Entry::Vacant(e) => {
                    let mut members = FxHashMap::<String, Flags>::default();
                    members.insert(name.to_string(), record.get_flags());
                    e.insert(Group {
                        first_name: name.to_string(),
                        normalized,
                        members,
                    });
                }
            }
        }
        //
        let mut clusters: Vec<Cluster> = groups
            .into_iter()
            .map(|(fp, group)| make_cluster(fp, group))
            .collect();
        // cluster ids follow decreasing size, then representative
        clusters.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then_with(|| id_cmp(&a.representative, &b.representative))
                .then_with(|| a.sequence_length.cmp(&b.sequence_length))
        });
        for (num, cluster) in clusters.iter_mut().enumerate() {
            cluster.cluster_id = format!("{}{}", self.params.cluster_prefix, num);
        }
        clusters.sort_by(|a, b| id_cmp(&a.representative, &b.representative));
        //
        let cpu_time = cpu_start.elapsed().as_secs();
        log::info!(
            "ClusterBuilder::build : nb records {}, nb names {}, nb clusters {}",
            records.len(),
            name_to_fp.len(),
            clusters.len()
        );
        if let Ok(sys_t) = start_t.elapsed() {
            log::info!(
                "ClusterBuilder::build : sys time(s) {:.2e} cpu time(s) {}",
                sys_t.as_secs_f64(),
                cpu_time
            );
        }
        Ok(ClusterTable {
            column_name: self.params.column_name.clone(),
            clusters,
        })
    } // end of build
} // end of impl ClusterBuilder

fn make_cluster(fingerprint: Fingerprint, group: Group) -> Cluster {
    let mut members: Vec<Member> = group
        .members
        .into_iter()
        .map(|(name, flags)| Member::new(name, flags))
        .collect();
    members.sort_by(|a, b| id_cmp(&a.name, &b.name));
    // a group always has at least the record that created it
    let representative = selector::select_representative(&members)
        .map(|m| m.name.clone())
        .unwrap_or_default();
    Cluster {
        fingerprint,
        cluster_id: String::new(),
        representative,
        members,
        sequence_length: group.normalized.len(),
        sequence: Some(group.normalized),
    }
} // end of make_cluster

//==========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rec(name: &str, seq: &str, non_putative: bool, gold_standard: bool) -> SequenceRecord {
        let flags = Flags::new(non_putative, gold_standard);
        SequenceRecord::new(name.to_string(), name.to_string(), seq.as_bytes().to_vec(), flags)
    }

    fn builder() -> ClusterBuilder {
        ClusterBuilder::new(ClusterParams::default())
    }

    #[test]
    fn scenario_non_putative_wins() {
        log_init_test();
        let records = vec![
            rec("A", "MKVL", false, false),
            rec("B", "MK\nVL", true, false),
            rec("C", "MKVL\n", false, true),
        ];
        let table = builder().build(&records).unwrap();
        assert_eq!(table.len(), 1);
        let cluster = &table.get_clusters()[0];
        assert_eq!(cluster.get_representative(), "B");
        assert_eq!(cluster.member_names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(cluster.get_cluster_id(), "nr-0");
        assert_eq!(cluster.get_sequence(), Some(&b"MKVL"[..]));
        let ordered: Vec<&str> = cluster
            .members_by_preference()
            .iter()
            .map(|m| m.get_name())
            .collect();
        assert_eq!(ordered, vec!["B", "C", "A"]);
    }

    #[test]
    fn scenario_gold_wins() {
        let records = vec![
            rec("E", "MSTNPKPQRK", false, false),
            rec("D", "MSTNPKPQRK", false, true),
        ];
        let table = builder().build(&records).unwrap();
        assert_eq!(table.get_clusters()[0].get_representative(), "D");
        assert!(table.get_clusters()[0].representative_flags().gold_standard);
    }

    #[test]
    fn clusters_partition_input() {
        let records = vec![
            rec("r1", "AAAA", false, false),
            rec("r2", "CCCC", true, false),
            rec("r3", "AAAA", false, false),
            rec("r4", "GGGG", false, false),
            rec("r5", "CCCC", false, true),
        ];
        let table = builder().build(&records).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.nb_members(), 5);
        assert_eq!(table.members().len(), 5);
        for cluster in table.iter() {
            assert!(cluster.contains(cluster.get_representative()));
        }
        // sorted by representative
        let reps: Vec<&str> = table.iter().map(|c| c.get_representative()).collect();
        assert_eq!(reps, vec!["r1", "r2", "r4"]);
        // ids by decreasing size then representative
        assert_eq!(table.get("r1").unwrap().get_cluster_id(), "nr-0");
        assert_eq!(table.get("r2").unwrap().get_cluster_id(), "nr-1");
        assert_eq!(table.get("r4").unwrap().get_cluster_id(), "nr-2");
    }

    #[test]
    fn build_ignores_input_order() {
        let mut records = vec![
            rec("M.a", "AAAA", false, true),
            rec("M.b", "AAAA", true, false),
            rec("M.c", "CCCC", false, false),
            rec("M.d", "CCCC", false, false),
            rec("M.e", "GG", true, true),
        ];
        let table = builder().build(&records).unwrap();
        records.reverse();
        assert_eq!(builder().build(&records).unwrap(), table);
        records.swap(0, 3);
        assert_eq!(builder().build(&records).unwrap(), table);
    }

    #[test]
    fn name_on_two_sequences_fails() {
        let records = vec![rec("X", "AAAA", false, false), rec("X", "CCCC", false, false)];
        match builder().build(&records) {
            Err(NrError::DuplicateNameConflict { name, .. }) => assert_eq!(name, "X"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn repeated_record_collapses() {
        let records = vec![rec("X", "AAAA", false, false), rec("X", "AA\nAA", true, false)];
        let table = builder().build(&records).unwrap();
        assert_eq!(table.nb_members(), 1);
        assert!(table.get("X").unwrap().representative_flags().non_putative);
    }

    #[test]
    fn empty_sequence_fails_whole_build() {
        let records = vec![rec("X", "AAAA", false, false), rec("Y", "\n", false, false)];
        match builder().build(&records) {
            Err(NrError::InvalidSequence { id, .. }) => assert_eq!(id, "Y"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn table_text_form_reloads() {
        log_init_test();
        let records = vec![
            rec("B", "MKVL", true, false),
            rec("A", "MKVL", false, false),
            rec("10", "MSS", false, false),
        ];
        let table = builder().build(&records).unwrap();
        let mut out = Vec::<u8>::new();
        table.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "#:Fingerprint\tRepresentative\tMember\tSequence_length\tCluster_ID\tFlags"
        );
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("\t10\t10\t3\tnr-1\t-"));
        assert!(lines[2].ends_with("\tB\tA\t4\tnr-0\t-"));
        assert!(lines[3].ends_with("\tB\tB\t4\tnr-0\tnon_putative"));
        //
        let reloaded = ClusterTable::from_reader(text.as_bytes(), "test").unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("B").unwrap().get_sequence(), None);
        let mut again = Vec::<u8>::new();
        reloaded.write(&mut again).unwrap();
        assert_eq!(String::from_utf8(again).unwrap(), text);
    }

    #[test]
    fn reload_rejects_member_in_two_clusters() {
        let fp_a = crate::fingerprint::fingerprint(b"AAAA").unwrap();
        let fp_c = crate::fingerprint::fingerprint(b"CCCC").unwrap();
        let text = format!(
            "{}\tA\tA\t4\tnr-0\t-\n{}\tC\tA\t4\tnr-1\t-\n{}\tC\tC\t4\tnr-1\t-\n",
            fp_a, fp_c, fp_c
        );
        assert!(matches!(
            ClusterTable::from_reader(text.as_bytes(), "test"),
            Err(NrError::DuplicateNameConflict { .. })
        ));
        // representative missing from its members, reported at the first row of its cluster
        let text = format!(
            "#:Fingerprint\n{}\tA\tA\t4\tnr-0\t-\n{}\tC\tB\t4\tnr-1\t-\n{}\tC\tD\t4\tnr-1\t-\n",
            fp_a, fp_c, fp_c
        );
        match ClusterTable::from_reader(text.as_bytes(), "test") {
            Err(NrError::Format { line, msg, .. }) => {
                assert_eq!(line, 3);
                assert!(msg.contains("representative C"));
            }
            other => panic!("unexpected {:?}", other),
        }
        // two clusters on one fingerprint
        let text = format!("{}\tA\tA\t4\tnr-0\t-\n{}\tB\tB\t4\tnr-1\t-\n", fp_a, fp_a);
        match ClusterTable::from_reader(text.as_bytes(), "test") {
            Err(NrError::Format { line, msg, .. }) => {
                assert_eq!(line, 2);
                assert!(msg.contains("already in cluster of A"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    // every sequence gets the same fingerprint
    fn constant_digest(_normalized: &[u8]) -> Fingerprint {
        fingerprint::digest(b"MKVL")
    }

    #[test]
    fn colliding_fingerprints_are_detected() {
        log_init_test();
        let records = vec![rec("A", "MKVL", false, false), rec("B", "MSS", true, false)];
        match builder().build_with_digest(&records, constant_digest) {
            Err(NrError::FingerprintCollision { first, second, .. }) => {
                assert_eq!((first.as_str(), second.as_str()), ("A", "B"));
            }
            other => panic!("unexpected {:?}", other),
        }
        // identical sequences under the same digest are no collision
        let same = vec![rec("A", "MKVL", false, false), rec("B", "MK\nVL", false, false)];
        assert_eq!(builder().build_with_digest(&same, constant_digest).unwrap().len(), 1);
    }

    #[test]
    fn unverified_build_trusts_fingerprints() {
        let params = ClusterParams {
            verify_sequences: false,
            ..ClusterParams::default()
        };
        let records = vec![rec("A", "MKVL", false, false), rec("B", "MSS", true, false)];
        let table = ClusterBuilder::new(params)
            .build_with_digest(&records, constant_digest)
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.nb_members(), 2);
        assert_eq!(table.get_clusters()[0].get_representative(), "B");
    }

    #[test]
    fn representatives_fasta_is_wrapped() {
        let records = vec![rec("r1", "ACDEFGHIK", false, false), rec("r2", "LMN", false, false)];
        let table = builder().build(&records).unwrap();
        let mut out = Vec::<u8>::new();
        table.write_representatives_fasta(&mut out, 4).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">r1\nACDE\nFGHI\nK\n>r2\nLMN\n");
    }

    #[test]
    fn derived_dictionaries() {
        let records = vec![
            rec("A", "MKVL", false, false),
            rec("B", "MKVL", true, false),
            rec("C", "MSS", false, false),
        ];
        let table = builder().build(&records).unwrap();
        let m2r = table.member_to_representative().unwrap();
        assert_eq!(m2r.get("A"), Some("B"));
        assert_eq!(m2r.get("C"), Some("C"));
        let r2m = table.representative_to_members();
        assert_eq!(r2m.get("B").unwrap().len(), 2);
        let r2id = table.representative_to_cluster_id().unwrap();
        assert_eq!(r2id.get("B"), Some("nr-0"));
        assert_eq!(table.representatives().as_slice(), &["B".to_string(), "C".to_string()]);
    }
} // end of mod tests
