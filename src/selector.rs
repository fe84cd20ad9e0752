//! election of a representative among records sharing a sequence.
//!
//! Preference order, most preferred first :
//! 1. non putative members,
//! 2. then among the remaining candidates gold standard members,
//! 3. then identifier order of names ([`id_cmp`]).
//!
//! As non putative is examined first it dominates gold standard : a non putative member
//! always wins against a putative gold standard one.

use std::cmp::Ordering;

use crate::idset::id_cmp;
use crate::record::{Flags, SequenceRecord};

/// Anything that can compete for representative
pub trait Candidate {
    fn name(&self) -> &str;
    fn flags(&self) -> Flags;
}

impl Candidate for SequenceRecord {
    fn name(&self) -> &str {
        self.get_name()
    }
    fn flags(&self) -> Flags {
        self.get_flags()
    }
}

/// Total order on candidates, Less means preferred.
pub fn preference_cmp<C: Candidate + ?Sized>(a: &C, b: &C) -> Ordering {
    let (fa, fb) = (a.flags(), b.flags());
    // true must come first
    fb.non_putative
        .cmp(&fa.non_putative)
        .then_with(|| fb.gold_standard.cmp(&fa.gold_standard))
        .then_with(|| id_cmp(a.name(), b.name()))
} // end of preference_cmp

/// returns the representative of members, None if members is empty.
/// The result does not depend on the order of members.
pub fn select_representative<C: Candidate>(members: &[C]) -> Option<&C> {
    let representative = select_preferred(members, |_| true);
    if log::log_enabled!(log::Level::Trace) {
        if let Some(r) = representative {
            log::trace!("representative {} elected among {} members", r.name(), members.len());
        }
    }
    representative
}

/// Same policy restricted to candidates accepted by keep.
/// Used when one name must stand for a group in a flag filtered list.
pub fn select_preferred<C, F>(candidates: &[C], keep: F) -> Option<&C>
where
    C: Candidate,
    F: Fn(&C) -> bool,
{
    candidates
        .iter()
        .filter(|&c| keep(c))
        .min_by(|a, b| preference_cmp(*a, *b))
} // end of select_preferred

/// sorts members in preference order, representative first
pub fn order_by_preference<C: Candidate>(members: &mut [C]) {
    members.sort_by(|a, b| preference_cmp(a, b));
}

//==========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug)]
    struct FlaggedName<'a> {
        name: &'a str,
        flags: Flags,
    }

    impl<'a> Candidate for FlaggedName<'a> {
        fn name(&self) -> &str {
            self.name
        }
        fn flags(&self) -> Flags {
            self.flags
        }
    }

    fn cand(name: &str, non_putative: bool, gold_standard: bool) -> FlaggedName {
        FlaggedName {
            name,
            flags: Flags::new(non_putative, gold_standard),
        }
    }

    #[test]
    fn non_putative_dominates_gold() {
        let members = [cand("A", false, false), cand("B", true, false), cand("C", false, true)];
        assert_eq!(select_representative(&members).unwrap().name, "B");
    }

    #[test]
    fn gold_preferred_over_unflagged() {
        let members = [cand("E", false, false), cand("D", false, true)];
        assert_eq!(select_representative(&members).unwrap().name, "D");
    }

    #[test]
    fn gold_breaks_ties_among_non_putative() {
        let members = [cand("A", true, false), cand("Z", true, true), cand("B", false, true)];
        assert_eq!(select_representative(&members).unwrap().name, "Z");
    }

    #[test]
    fn name_order_breaks_remaining_ties() {
        let members = [cand("b", false, false), cand("a", false, false), cand("10", false, false)];
        assert_eq!(select_representative(&members).unwrap().name, "10");
        let none: [FlaggedName; 0] = [];
        assert!(select_representative(&none).is_none());
    }

    #[test]
    fn selection_ignores_input_order() {
        let mut members = vec![
            cand("M.X", false, true),
            cand("M.Y", true, false),
            cand("M.A", false, false),
            cand("M.W", true, false),
        ];
        let first = select_representative(&members).unwrap().name;
        members.reverse();
        assert_eq!(select_representative(&members).unwrap().name, first);
        assert_eq!(first, "M.W");
        order_by_preference(&mut members);
        let ordered: Vec<&str> = members.iter().map(|c| c.name).collect();
        assert_eq!(ordered, vec!["M.W", "M.Y", "M.X", "M.A"]);
    }

    #[test]
    fn preferred_among_kept_candidates() {
        let members = [cand("A", true, false), cand("B", false, false), cand("C", false, true)];
        let picked = select_preferred(&members, |c| c.name != "A").unwrap();
        assert_eq!(picked.name, "C");
        let picked = select_preferred(&members, |c| c.name == "B").unwrap();
        assert_eq!(picked.name, "B");
        assert!(select_preferred(&members, |_| false).is_none());
    }
} // end of mod tests
