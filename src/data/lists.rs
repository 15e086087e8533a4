// lists.rs - Blacklist / whitelist decision sets exchanged between stages

use crate::data::locus::{Catalog, LocusId};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Loci to remove
pub type Blacklist = BTreeSet<LocusId>;

/// Which sites of a whitelisted locus are retained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteSelection {
    /// Every polymorphic site of the locus
    All,
    /// Exactly these consensus columns
    Columns(BTreeSet<usize>),
}

impl SiteSelection {
    pub fn contains(&self, col: usize) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Columns(cols) => cols.contains(&col),
        }
    }
}

/// Loci to keep, each with its retained sites
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    loci: BTreeMap<LocusId, SiteSelection>,
}

/// Outcome of [`Whitelist::check_integrity`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub missing_loci: usize,
    pub invalid_columns: usize,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    pub fn contains(&self, locus: LocusId) -> bool {
        self.loci.contains_key(&locus)
    }

    pub fn get(&self, locus: LocusId) -> Option<&SiteSelection> {
        self.loci.get(&locus)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocusId, &SiteSelection)> {
        self.loci.iter().map(|(&id, sel)| (id, sel))
    }

    /// Keep a locus with all of its sites
    pub fn keep_all(&mut self, locus: LocusId) {
        self.loci.insert(locus, SiteSelection::All);
    }

    /// Keep a locus without selecting any site yet
    pub fn keep_locus(&mut self, locus: LocusId) {
        self.loci
            .entry(locus)
            .or_insert_with(|| SiteSelection::Columns(BTreeSet::new()));
    }

    /// Keep one site column of a locus; a locus already kept whole stays whole
    pub fn keep_site(&mut self, locus: LocusId, col: usize) {
        match self.loci.entry(locus) {
            Entry::Vacant(slot) => {
                slot.insert(SiteSelection::Columns(BTreeSet::from([col])));
            }
            Entry::Occupied(mut slot) => {
                if let SiteSelection::Columns(cols) = slot.get_mut() {
                    cols.insert(col);
                }
            }
        }
    }

    /// Number of explicitly selected site columns
    pub fn selected_site_count(&self) -> usize {
        self.loci
            .values()
            .map(|sel| match sel {
                SiteSelection::All => 0,
                SiteSelection::Columns(cols) => cols.len(),
            })
            .sum()
    }

    /// Drop whitelist entries that do not match the catalog: loci that are
    /// absent and columns that are not polymorphic sites of their locus.
    pub fn check_integrity(&mut self, catalog: &Catalog) -> IntegrityReport {
        let mut report = IntegrityReport::default();

        self.loci.retain(|&id, selection| {
            let Some(locus) = catalog.get(id) else {
                report.missing_loci += 1;
                return false;
            };
            if let SiteSelection::Columns(cols) = selection {
                let before = cols.len();
                cols.retain(|&col| locus.has_site(col));
                report.invalid_columns += before - cols.len();
            }
            true
        });

        if report.missing_loci > 0 || report.invalid_columns > 0 {
            log::warn!(
                "Whitelist integrity: removed {} loci absent from the catalog and {} columns that are not variant sites",
                report.missing_loci,
                report.invalid_columns
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::locus::Locus;

    #[test]
    fn test_keep_site_accumulates() {
        let mut wl = Whitelist::new();
        wl.keep_site(3, 10);
        wl.keep_site(3, 12);
        wl.keep_locus(3);
        assert_eq!(
            wl.get(3),
            Some(&SiteSelection::Columns(BTreeSet::from([10, 12])))
        );
        assert_eq!(wl.selected_site_count(), 2);

        wl.keep_all(4);
        wl.keep_site(4, 1);
        assert_eq!(wl.get(4), Some(&SiteSelection::All));
        assert!(wl.get(4).unwrap().contains(99));
    }

    #[test]
    fn test_check_integrity() {
        let catalog = Catalog::from_loci(vec![
            Locus::new(1, "ACGTACGT").with_sites(&[2, 5]),
            Locus::new(2, "ACGTACGT"),
        ])
        .unwrap();

        let mut wl = Whitelist::new();
        wl.keep_site(1, 2);
        wl.keep_site(1, 3);
        wl.keep_all(2);
        wl.keep_all(99);

        let report = wl.check_integrity(&catalog);
        assert_eq!(report.missing_loci, 1);
        assert_eq!(report.invalid_columns, 1);
        assert!(!wl.contains(99));
        assert_eq!(wl.get(1), Some(&SiteSelection::Columns(BTreeSet::from([2]))));
    }
}
