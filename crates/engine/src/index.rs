//! Lookup index over the reference arena.
//!
//! Every map stores arena positions, never record copies. Empty keys are not
//! indexed, so an empty lookup value can never match.

use rustc_hash::FxHashMap;

use crate::normalize::normalize_key;
use crate::reference::ReferenceRecord;

#[derive(Debug, Default)]
pub struct ReferenceIndex {
    by_id: FxHashMap<String, Vec<usize>>,
    by_phone: FxHashMap<String, Vec<usize>>,
    by_serial: FxHashMap<String, Vec<usize>>,
    by_group: FxHashMap<String, Vec<usize>>,
}

impl ReferenceIndex {
    pub fn build(records: &[ReferenceRecord]) -> Self {
        let mut index = Self::default();

        for (pos, rec) in records.iter().enumerate() {
            push(&mut index.by_id, &rec.id, pos);

            for phone in &rec.phones {
                // a record listing the same number twice is still one hit
                let slot = index.by_phone.get(phone.as_str());
                if slot.is_some_and(|v| v.last() == Some(&pos)) {
                    continue;
                }
                push(&mut index.by_phone, phone, pos);
            }

            push(&mut index.by_serial, &normalize_key(&rec.serial_number), pos);

            if let Some(group) = &rec.group_id {
                push(&mut index.by_group, group, pos);
            }
        }

        index
    }

    /// Positions of records whose id equals `id` (already normalized).
    pub fn by_id(&self, id: &str) -> &[usize] {
        lookup(&self.by_id, id)
    }

    /// Positions of records with `phone` in any of their five slots.
    pub fn by_phone(&self, phone: &str) -> &[usize] {
        lookup(&self.by_phone, phone)
    }

    pub fn by_serial(&self, serial: &str) -> &[usize] {
        lookup(&self.by_serial, serial)
    }

    pub fn by_group(&self, group: &str) -> &[usize] {
        lookup(&self.by_group, group)
    }

    pub fn id_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn phone_count(&self) -> usize {
        self.by_phone.len()
    }

    pub fn serial_count(&self) -> usize {
        self.by_serial.len()
    }

    pub fn group_count(&self) -> usize {
        self.by_group.len()
    }
}

fn push(map: &mut FxHashMap<String, Vec<usize>>, key: &str, pos: usize) {
    if key.is_empty() {
        return;
    }
    map.entry(key.to_string()).or_default().push(pos);
}

fn lookup<'a>(map: &'a FxHashMap<String, Vec<usize>>, key: &str) -> &'a [usize] {
    if key.is_empty() {
        return &[];
    }
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use crate::reference::Reference;
    use crate::test_utils::reference_table;

    fn sample() -> Reference {
        Reference::from_table(&reference_table(&[
            &[("id", "A"), ("phone1", "5551234567"), ("phone2", "5551234567"), ("contact_group_id", "G1")],
            &[("id", "B"), ("phone4", "(555) 123-4567"), ("Serial Number", "sn-9 ")],
            &[("id", "C"), ("contact_group_id", "G1"), ("Serial Number", "SN-9")],
        ]))
        .unwrap()
    }

    #[test]
    fn phone_matches_any_slot_once_per_record() {
        let r = sample();
        assert_eq!(r.index().by_phone("5551234567"), &[0, 1]);
    }

    #[test]
    fn serial_lookup_is_case_normalized() {
        let r = sample();
        assert_eq!(r.index().by_serial("SN-9"), &[1, 2]);
        assert!(r.index().by_serial("sn-9").is_empty());
    }

    #[test]
    fn empty_keys_never_match() {
        let r = sample();
        assert!(r.index().by_phone("").is_empty());
        assert!(r.index().by_serial("").is_empty());
        assert!(r.index().by_group("").is_empty());
        assert_eq!(r.index().phone_count(), 1);
    }

    #[test]
    fn groups_collect_members() {
        let r = sample();
        assert_eq!(r.index().by_group("G1"), &[0, 2]);
        assert_eq!(r.index().group_count(), 1);
        assert_eq!(r.index().by_id("B"), &[1]);
    }
}
