//! algebra over identifier sets and dictionaries.
//!
//! Every derived identifier list is a short pipeline of the four primitives of this module :
//! - [`filter_by_membership`] keeps entries of a set present in another one,
//! - [`select_clusters_containing`] maps a flag list to cluster representatives,
//! - [`lookup_join`] maps keys through a dictionary,
//! - [`rename`] rewrites identifiers with an injective substitution.
//!
//! [`select_preferred_flagged`] applies the representative policy to the flagged members
//! of each cluster.
//!
//! Inputs are sorted with the same order, so intersections and joins are single merge passes.
//! All functions are pure and their results sorted and deduplicated.

use std::cmp::Ordering;

use crate::cluster::{ClusterTable, REPRESENTATIVE_LABEL};
use crate::error::{NrError, Result};
use crate::idset::{check_identifier, id_cmp, sort_dedup, IdentifierSet};
use crate::kvdict::KeyValueDict;
use crate::selector;

/// behaviour of lookup_join on keys absent from the dictionary
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JoinMode {
    /// a missing key fails the join
    Strict,
    /// missing keys are omitted
    Lenient,
}

/// keeps entries of base also present in filter. The result keeps the label of base.
pub fn filter_by_membership(base: &IdentifierSet, filter: &IdentifierSet) -> IdentifierSet {
    let (a, b) = (base.as_slice(), filter.as_slice());
    let mut kept = Vec::<String>::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match id_cmp(&a[i], &b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                kept.push(a[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    log::debug!("filter_by_membership : kept {} of {}", kept.len(), a.len());
    IdentifierSet::from_sorted(base.get_label().map(String::from), kept)
} // end of filter_by_membership

/// Returns the representative of each cluster having at least one member in flag_set.
///
/// Representatives were elected at build time with all flags then known,
/// so no election is redone here.
/// If a cluster has a member in flag_set while its stored representative carries no flag at all,
/// the table was built without that information and PolicyInconsistency is returned.
pub fn select_clusters_containing(
    clusters: &ClusterTable,
    flag_set: &IdentifierSet,
) -> Result<IdentifierSet> {
    let mut selected = Vec::<String>::new();
    for cluster in clusters.iter() {
        let flagged = cluster.member_names().find(|m| flag_set.contains(m));
        if let Some(member) = flagged {
            if cluster.representative_flags().is_empty() {
                log::error!(
                    "cluster {} : member {} is flagged, representative {} is not",
                    cluster.get_cluster_id(),
                    member,
                    cluster.get_representative()
                );
                return Err(NrError::PolicyInconsistency {
                    representative: cluster.get_representative().to_string(),
                    member: member.to_string(),
                });
            }
            selected.push(cluster.get_representative().to_string());
        }
    }
    log::debug!(
        "select_clusters_containing : {} clusters of {} selected",
        selected.len(),
        clusters.len()
    );
    // the table is sorted by representative
    Ok(IdentifierSet::from_sorted(Some(REPRESENTATIVE_LABEL.to_string()), selected))
} // end of select_clusters_containing

/// For each cluster having members in flag_set, the preferred of those flagged members.
/// The stored member flags drive the election as for representatives.
/// Gives the name standing for each cluster in a list restricted to flag_set.
/// The label of flag_set is kept.
pub fn select_preferred_flagged(
    clusters: &ClusterTable,
    flag_set: &IdentifierSet,
) -> IdentifierSet {
    let preferred = clusters.iter().filter_map(|cluster| {
        selector::select_preferred(cluster.get_members(), |m| flag_set.contains(m.get_name()))
            .map(|m| m.get_name().to_string())
    });
    let selected = IdentifierSet::new(flag_set.get_label().map(String::from), preferred);
    log::debug!(
        "select_preferred_flagged : {} names for {} clusters",
        selected.len(),
        clusters.len()
    );
    selected
} // end of select_preferred_flagged

/// Maps each key through mapping. Distinct keys with the same value give one entry.
/// The result is labelled with the value label of mapping.
pub fn lookup_join(
    keys: &IdentifierSet,
    mapping: &KeyValueDict,
    mode: JoinMode,
) -> Result<IdentifierSet> {
    let (a, b) = (keys.as_slice(), mapping.as_slice());
    let mut values = Vec::<String>::with_capacity(a.len());
    let mut nb_missing: usize = 0;
    let mut j = 0;
    for key in a {
        while j < b.len() && id_cmp(&b[j].0, key) == Ordering::Less {
            j += 1;
        }
        if j < b.len() && b[j].0 == *key {
            values.push(b[j].1.clone());
            j += 1;
        } else {
            match mode {
                JoinMode::Strict => {
                    log::error!("lookup_join : key {} not in dictionary", key);
                    return Err(NrError::KeyNotFound { key: key.clone() });
                }
                JoinMode::Lenient => nb_missing += 1,
            }
        }
    }
    if nb_missing > 0 {
        log::info!("lookup_join : {} keys of {} not found, omitted", nb_missing, a.len());
    }
    sort_dedup(&mut values);
    Ok(IdentifierSet::from_sorted(mapping.get_value_label().map(String::from), values))
} // end of lookup_join

/// Applies substitution to every entry. Fails with AmbiguousRename if two distinct entries
/// are rewritten to the same identifier. The label is kept.
pub fn rename<F>(ids: &IdentifierSet, substitution: F) -> Result<IdentifierSet>
where
    F: Fn(&str) -> String,
{
    let mut renamed: Vec<(String, &str)> = ids.iter().map(|id| (substitution(id), id)).collect();
    if let Some((new, old)) = renamed.iter().find(|(new, _)| check_identifier(new).is_err()) {
        log::error!("rename : {} rewritten to unwritable identifier {:?}", old, new);
        return Err(NrError::InvalidIdentifier {
            id: new.clone(),
            reason: format!("renamed from {}, contains a tab or a line break", old),
        });
    }
    renamed.sort_unstable_by(|a, b| id_cmp(&a.0, &b.0).then_with(|| id_cmp(a.1, b.1)));
    for w in renamed.windows(2) {
        if w[0].0 == w[1].0 {
            return Err(NrError::AmbiguousRename {
                first: w[0].1.to_string(),
                second: w[1].1.to_string(),
                renamed: w[0].0.clone(),
            });
        }
    }
    let renamed: Vec<String> = renamed.into_iter().map(|(new, _)| new).collect();
    Ok(IdentifierSet::from_sorted(ids.get_label().map(String::from), renamed))
} // end of rename

/// Substitution replacing prefix from by prefix to, identifiers without prefix from are unchanged.
pub fn prefix_substitution<'a>(from: &'a str, to: &'a str) -> impl Fn(&str) -> String + 'a {
    move |id: &str| match id.strip_prefix(from) {
        Some(rest) => format!("{}{}", to, rest),
        None => id.to_string(),
    }
}

/// Substitution through a dictionary, identifiers absent from it are unchanged.
pub fn dict_substitution(dict: &KeyValueDict) -> impl Fn(&str) -> String + '_ {
    move |id: &str| dict.get(id).unwrap_or(id).to_string()
}

//==========================================================================================

// end of mod tests
