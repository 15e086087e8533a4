// genotype.rs - Per-sample genotype calls and the sparse genotype table

use crate::data::locus::LocusId;
use crate::error::{FilterError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Dense sample index, ordered to match the population ranges
pub type SampleIndex = usize;

/// Model call for one consensus column of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCall {
    Homozygous,
    Heterozygous,
    Unknown,
}

impl ModelCall {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'O' => Some(ModelCall::Homozygous),
            'E' => Some(ModelCall::Heterozygous),
            'U' => Some(ModelCall::Unknown),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            ModelCall::Homozygous => 'O',
            ModelCall::Heterozygous => 'E',
            ModelCall::Unknown => 'U',
        }
    }

    pub fn is_called(&self) -> bool {
        matches!(self, ModelCall::Homozygous | ModelCall::Heterozygous)
    }
}

/// One sample's data at one locus
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeCall {
    pub depth: u32,
    pub lnl: f64,
    pub model: Vec<ModelCall>,
}

impl GenotypeCall {
    /// Parse a model string such as `OOOEOOU`
    pub fn new(depth: u32, lnl: f64, model: &str) -> Result<Self> {
        let model = model
            .chars()
            .map(|c| {
                ModelCall::from_char(c).ok_or_else(|| {
                    FilterError::consistency(format!("invalid model call character '{}'", c))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { depth, lnl, model })
    }

    /// Number of consensus columns covered by the model calls
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Mask the model call at `col` by setting it to unknown; the record
    /// itself stays in place. Returns false when the call is too short.
    pub fn mask(&mut self, col: usize) -> bool {
        match self.model.get_mut(col) {
            Some(call) => {
                *call = ModelCall::Unknown;
                true
            }
            None => false,
        }
    }

    pub fn model_string(&self) -> String {
        self.model.iter().map(ModelCall::as_char).collect()
    }
}

impl fmt::Display for GenotypeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth={} lnl={:.2} model={}", self.depth, self.lnl, self.model_string())
    }
}

/// Genotype calls indexed by (locus, sample).
///
/// Each locus owns one slot per sample; `None` means the sample was not
/// genotyped at that locus.
#[derive(Debug, Clone, Default)]
pub struct GenotypeTable {
    sample_count: usize,
    rows: BTreeMap<LocusId, Vec<Option<GenotypeCall>>>,
}

impl GenotypeTable {
    pub fn new(sample_count: usize) -> Self {
        Self {
            sample_count,
            rows: BTreeMap::new(),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn loci_count(&self) -> usize {
        self.rows.len()
    }

    /// Register a locus with no calls yet
    pub fn ensure_locus(&mut self, locus: LocusId) {
        let samples = self.sample_count;
        self.rows.entry(locus).or_insert_with(|| vec![None; samples]);
    }

    /// Store a call; a second call for the same slot is an error
    pub fn insert(&mut self, locus: LocusId, sample: SampleIndex, call: GenotypeCall) -> Result<()> {
        if sample >= self.sample_count {
            return Err(FilterError::consistency(format!(
                "sample index {} out of range ({} samples) at locus {}",
                sample, self.sample_count, locus
            )));
        }
        let samples = self.sample_count;
        let row = self.rows.entry(locus).or_insert_with(|| vec![None; samples]);
        if row[sample].is_some() {
            return Err(FilterError::consistency(format!(
                "locus {} has more than one call for sample index {}",
                locus, sample
            )));
        }
        row[sample] = Some(call);
        Ok(())
    }

    pub fn call(&self, locus: LocusId, sample: SampleIndex) -> Option<&GenotypeCall> {
        self.rows.get(&locus)?.get(sample)?.as_ref()
    }

    pub fn call_mut(&mut self, locus: LocusId, sample: SampleIndex) -> Option<&mut GenotypeCall> {
        self.rows.get_mut(&locus)?.get_mut(sample)?.as_mut()
    }

    /// Take a call out of the table, leaving "no entry" behind
    pub fn remove(&mut self, locus: LocusId, sample: SampleIndex) -> Option<GenotypeCall> {
        self.rows.get_mut(&locus)?.get_mut(sample)?.take()
    }

    pub fn row(&self, locus: LocusId) -> Option<&[Option<GenotypeCall>]> {
        self.rows.get(&locus).map(Vec::as_slice)
    }

    pub fn row_mut(&mut self, locus: LocusId) -> Option<&mut [Option<GenotypeCall>]> {
        self.rows.get_mut(&locus).map(Vec::as_mut_slice)
    }

    /// Number of samples with a call at `locus`
    pub fn called_samples(&self, locus: LocusId) -> usize {
        self.row(locus)
            .map(|row| row.iter().filter(|c| c.is_some()).count())
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.rows
            .values()
            .map(|row| row.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    pub fn contains_locus(&self, locus: LocusId) -> bool {
        self.rows.contains_key(&locus)
    }

    /// Drop every locus row rejected by `keep`; returns the rows retained
    pub fn retain_loci(&mut self, mut keep: impl FnMut(LocusId) -> bool) -> usize {
        self.rows.retain(|&id, _| keep(id));
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_string() {
        let call = GenotypeCall::new(12, -3.5, "OOEU").unwrap();
        assert_eq!(call.len(), 4);
        assert_eq!(call.model[2], ModelCall::Heterozygous);
        assert_eq!(call.model_string(), "OOEU");

        assert!(GenotypeCall::new(12, -3.5, "OOXU").is_err());
    }

    #[test]
    fn test_mask_keeps_record() {
        let mut call = GenotypeCall::new(5, -1.0, "OEO").unwrap();
        assert!(call.mask(1));
        assert!(!call.mask(3));
        assert_eq!(call.model_string(), "OUO");
        assert_eq!(call.model[1], ModelCall::Unknown);
        assert!(!call.model[1].is_called());

        assert!(GenotypeCall::new(5, -1.0, "OMO").is_err());
    }

    #[test]
    fn test_missing_is_distinct_from_masked() {
        let mut table = GenotypeTable::new(3);
        table.insert(1, 0, GenotypeCall::new(5, -1.0, "OE").unwrap()).unwrap();
        table.call_mut(1, 0).unwrap().mask(0);

        assert!(table.call(1, 0).is_some());
        assert!(table.call(1, 1).is_none());
        assert_eq!(table.called_samples(1), 1);

        assert!(table.remove(1, 0).is_some());
        assert!(table.remove(1, 0).is_none());
        assert_eq!(table.called_samples(1), 0);
    }

    #[test]
    fn test_insert_rejects_duplicates_and_bad_index() {
        let mut table = GenotypeTable::new(2);
        let call = GenotypeCall::new(5, -1.0, "O").unwrap();
        table.insert(4, 1, call.clone()).unwrap();
        assert!(table.insert(4, 1, call.clone()).is_err());
        assert!(table.insert(4, 2, call).is_err());
    }

    #[test]
    fn test_retain_loci() {
        let mut table = GenotypeTable::new(1);
        for locus in 1..=4 {
            table.insert(locus, 0, GenotypeCall::new(1, 0.0, "O").unwrap()).unwrap();
        }
        assert_eq!(table.retain_loci(|id| id % 2 == 0), 2);
        assert!(table.contains_locus(2));
        assert!(!table.contains_locus(3));
        assert_eq!(table.total_calls(), 2);
    }
}
