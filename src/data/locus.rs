// locus.rs - Catalog loci and their polymorphic sites

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Catalog locus identifier
pub type LocusId = u32;

/// Chromosome label given to loci of a catalog that was never aligned to a reference
pub const UNORDERED_CHROMOSOME: &str = "un";

/// A polymorphic site: a column of the consensus sequence and its genomic position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub col: usize,
    #[serde(default)]
    pub bp: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    #[default]
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

/// One consensus locus of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Locus {
    pub id: LocusId,
    pub consensus: String,
    pub sites: Vec<SiteDescriptor>,
    pub chr: String,
    pub bp: u64,
    pub strand: Strand,
    /// Number of samples with a genotype call at this locus
    pub hcnt: usize,
}

impl Locus {
    pub fn new(id: LocusId, consensus: impl Into<String>) -> Self {
        Self {
            id,
            consensus: consensus.into(),
            sites: Vec::new(),
            chr: String::new(),
            bp: 0,
            strand: Strand::Plus,
            hcnt: 0,
        }
    }

    /// Builder helper: attach polymorphic columns (bp follows the locus position)
    pub fn with_sites(mut self, cols: &[usize]) -> Self {
        self.sites = cols
            .iter()
            .map(|&col| SiteDescriptor {
                col,
                bp: self.bp + col as u64,
            })
            .collect();
        self
    }

    pub fn len(&self) -> usize {
        self.consensus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consensus.is_empty()
    }

    pub fn is_polymorphic(&self) -> bool {
        !self.sites.is_empty()
    }

    pub fn has_site(&self, col: usize) -> bool {
        self.sites.iter().any(|s| s.col == col)
    }

    /// Leftmost genomic coordinate of the locus, independent of strand
    pub fn sort_bp(&self) -> u64 {
        match self.strand {
            Strand::Plus => self.bp,
            Strand::Minus => (self.bp + 1).saturating_sub(self.len() as u64),
        }
    }

    /// Genomic coordinate of a consensus column
    pub fn sort_bp_at(&self, col: usize) -> u64 {
        match self.strand {
            Strand::Plus => self.bp + col as u64,
            Strand::Minus => self.bp.saturating_sub(col as u64),
        }
    }

    /// Keep only the sites whose column is listed
    pub fn retain_sites(&mut self, cols: &BTreeSet<usize>) {
        self.sites.retain(|site| cols.contains(&site.col));
    }
}

/// Catalog of loci ordered by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    loci: BTreeMap<LocusId, Locus>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate locus ids
    pub fn from_loci(loci: impl IntoIterator<Item = Locus>) -> Result<Self> {
        let mut catalog = Self::new();
        for locus in loci {
            let id = locus.id;
            if catalog.loci.insert(id, locus).is_some() {
                return Err(FilterError::consistency(format!(
                    "catalog locus {} occurs more than once",
                    id
                )));
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, locus: Locus) -> Option<Locus> {
        self.loci.insert(locus.id, locus)
    }

    pub fn get(&self, id: LocusId) -> Option<&Locus> {
        self.loci.get(&id)
    }

    pub fn get_mut(&mut self, id: LocusId) -> Option<&mut Locus> {
        self.loci.get_mut(&id)
    }

    pub fn remove(&mut self, id: LocusId) -> Option<Locus> {
        self.loci.remove(&id)
    }

    pub fn contains(&self, id: LocusId) -> bool {
        self.loci.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = LocusId> + '_ {
        self.loci.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locus> {
        self.loci.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Locus> {
        self.loci.values_mut()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Locus) -> bool) {
        self.loci.retain(|_, locus| keep(locus));
    }

    pub fn polymorphic_site_count(&self) -> usize {
        self.loci.values().map(|l| l.sites.len()).sum()
    }

    /// Give an arbitrary ordering to a catalog that was not reference aligned.
    ///
    /// Returns `true` when the catalog already carries chromosome labels, in
    /// which case nothing is changed.
    pub fn order_unordered_loci(&mut self) -> bool {
        if self.loci.values().any(|l| !l.chr.is_empty()) {
            return true;
        }

        log::info!("Catalog is not reference aligned, arbitrarily ordering catalog loci");
        let mut bp = 1u64;
        for locus in self.loci.values_mut() {
            locus.chr = UNORDERED_CHROMOSOME.to_string();
            locus.bp = bp;
            locus.strand = Strand::Plus;
            for site in &mut locus.sites {
                site.bp = bp + site.col as u64;
            }
            bp += locus.len() as u64;
        }
        false
    }
}
