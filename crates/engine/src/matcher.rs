use std::collections::BTreeSet;

use crate::input::InputKey;
use crate::normalize::normalize_key;
use crate::reference::Reference;

/// Ids matched for one input key, split by how they were found.
/// Both sets iterate in ascending id order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchSet<'r> {
    pub direct: BTreeSet<&'r str>,
    pub ids: BTreeSet<&'r str>,
}

impl MatchSet<'_> {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Ids whose record matches the key directly.
pub fn direct_matches<'r>(key: &InputKey, reference: &'r Reference) -> BTreeSet<&'r str> {
    let value = normalize_key(key.value());
    let index = reference.index();
    let positions = match key {
        InputKey::Id(_) => index.by_id(&value),
        InputKey::Phone(_) => index.by_phone(&value),
        InputKey::Serial(_) => index.by_serial(&value),
    };
    positions
        .iter()
        .filter_map(|&pos| reference.records().get(pos))
        .map(|r| r.id.as_str())
        .collect()
}

/// Every id sharing a group with one of `direct`.
///
/// One hop only: members found here are not expanded again, so a record that
/// shares a different group with an expanded member is not pulled in.
pub fn expand_groups<'r>(direct: &BTreeSet<&'r str>, reference: &'r Reference) -> BTreeSet<&'r str> {
    let mut expanded = BTreeSet::new();
    for id in direct {
        let Some(group) = reference.group_of(id) else {
            continue;
        };
        for &pos in reference.index().by_group(group) {
            if let Some(rec) = reference.records().get(pos) {
                expanded.insert(rec.id.as_str());
            }
        }
    }
    expanded
}

/// Direct matches plus their one-hop group expansion, deduplicated.
pub fn match_key<'r>(key: &InputKey, reference: &'r Reference) -> MatchSet<'r> {
    let direct = direct_matches(key, reference);
    let mut ids = expand_groups(&direct, reference);
    ids.extend(direct.iter().copied());
    MatchSet { direct, ids }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::reference_table;

    fn ids<'a>(set: &BTreeSet<&'a str>) -> Vec<&'a str> {
        set.iter().copied().collect()
    }

    #[test]
    fn id_match_ignores_case_and_whitespace() {
        let r = Reference::from_table(&reference_table(&[&[("id", "abc ")]])).unwrap();
        let m = match_key(&InputKey::Id("ABC".into()), &r);
        assert_eq!(ids(&m.ids), vec!["ABC"]);
        let m = match_key(&InputKey::Id(" abc".into()), &r);
        assert_eq!(ids(&m.ids), vec!["ABC"]);
    }

    #[test]
    fn phone_matches_any_slot() {
        let r = Reference::from_table(&reference_table(&[
            &[("id", "P1"), ("phone5", "555-123-4567")],
            &[("id", "P2"), ("phone1", "5551234567")],
            &[("id", "P3"), ("phone1", "5550000000")],
        ]))
        .unwrap();
        let m = match_key(&InputKey::Phone("5551234567".into()), &r);
        assert_eq!(ids(&m.ids), vec!["P1", "P2"]);
    }

    #[test]
    fn serial_match_is_case_insensitive() {
        let r = Reference::from_table(&reference_table(&[&[
            ("id", "S1"),
            ("Serial Number", "ab-77"),
        ]]))
        .unwrap();
        let m = match_key(&InputKey::Serial("AB-77".into()), &r);
        assert_eq!(ids(&m.ids), vec!["S1"]);
    }

    #[test]
    fn empty_keys_match_nothing() {
        let r = Reference::from_table(&reference_table(&[&[("id", "E1")]])).unwrap();
        assert!(match_key(&InputKey::Phone(String::new()), &r).is_empty());
        assert!(match_key(&InputKey::Serial(String::new()), &r).is_empty());
        assert!(match_key(&InputKey::Id("  ".into()), &r).is_empty());
    }

    #[test]
    fn group_expansion_is_one_hop() {
        // A, B, C share G1; C and D share G2 through a duplicate C row.
        let r = Reference::from_table(&reference_table(&[
            &[("id", "A"), ("contact_group_id", "G1")],
            &[("id", "B"), ("contact_group_id", "G1")],
            &[("id", "C"), ("contact_group_id", "G1")],
            &[("id", "D"), ("contact_group_id", "G2")],
            &[("id", "C"), ("contact_group_id", "G2")],
        ]))
        .unwrap();
        let m = match_key(&InputKey::Id("A".into()), &r);
        assert_eq!(ids(&m.direct), vec!["A"]);
        assert_eq!(ids(&m.ids), vec!["A", "B", "C"]);
    }

    #[test]
    fn records_without_group_do_not_expand() {
        let r = Reference::from_table(&reference_table(&[
            &[("id", "N1")],
            &[("id", "N2")],
        ]))
        .unwrap();
        let m = match_key(&InputKey::Id("N1".into()), &r);
        assert_eq!(ids(&m.ids), vec!["N1"]);
    }

    #[test]
    fn phone_scenario_expands_through_group() {
        let r = Reference::from_table(&reference_table(&[
            &[("id", "X1"), ("contact_group_id", "G"), ("phone1", "5551234567")],
            &[("id", "X2"), ("contact_group_id", "G")],
            &[("id", "X3")],
        ]))
        .unwrap();
        let m = match_key(&InputKey::Phone("5551234567".into()), &r);
        assert_eq!(ids(&m.direct), vec!["X1"]);
        assert_eq!(ids(&m.ids), vec!["X1", "X2"]);
        assert_eq!(m.len(), 2);
    }
}
