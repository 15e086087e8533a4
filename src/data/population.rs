// population.rs - Population to sample-range index

use crate::data::genotype::SampleIndex;
use crate::error::{FilterError, Result};
use std::ops::RangeInclusive;

pub type PopulationId = u32;

/// Inclusive range of sample indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    pub start: SampleIndex,
    pub end: SampleIndex,
}

impl SampleRange {
    pub fn new(start: SampleIndex, end: SampleIndex) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, sample: SampleIndex) -> bool {
        (self.start..=self.end).contains(&sample)
    }

    pub fn indices(&self) -> RangeInclusive<SampleIndex> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    pub id: PopulationId,
    pub name: String,
    pub range: SampleRange,
}

/// Populations sorted by id; their ranges partition `0..sample_count`
#[derive(Debug, Clone)]
pub struct PopulationIndex {
    populations: Vec<Population>,
    sample_count: usize,
}

impl PopulationIndex {
    /// Validate and index a set of populations
    pub fn new(mut populations: Vec<Population>) -> Result<Self> {
        populations.sort_by_key(|p| p.id);

        let mut next_start = 0;
        for (i, pop) in populations.iter().enumerate() {
            if i > 0 && populations[i - 1].id == pop.id {
                return Err(FilterError::consistency(format!(
                    "population id {} occurs more than once",
                    pop.id
                )));
            }
            if pop.range.is_empty() {
                return Err(FilterError::consistency(format!(
                    "population '{}' has an empty sample range",
                    pop.name
                )));
            }
            if pop.range.start != next_start {
                return Err(FilterError::consistency(format!(
                    "population '{}' starts at sample {} but {} was expected",
                    pop.name, pop.range.start, next_start
                )));
            }
            next_start = pop.range.end + 1;
        }

        Ok(Self {
            populations,
            sample_count: next_start,
        })
    }

    /// Build ranges from per-sample population labels already sorted by population
    pub fn from_ordered_samples<'a>(
        labels: impl IntoIterator<Item = (PopulationId, &'a str)>,
    ) -> Result<Self> {
        let mut populations: Vec<Population> = Vec::new();
        for (sample, (id, name)) in labels.into_iter().enumerate() {
            match populations.last_mut() {
                Some(last) if last.id == id => last.range.end = sample,
                Some(last) if last.id > id => {
                    return Err(FilterError::consistency(format!(
                        "samples are not ordered by population (population {} after {})",
                        id, last.id
                    )));
                }
                _ => populations.push(Population {
                    id,
                    name: name.to_string(),
                    range: SampleRange::new(sample, sample),
                }),
            }
        }
        Self::new(populations)
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn iter(&self) -> impl Iterator<Item = &Population> {
        self.populations.iter()
    }

    pub fn get(&self, id: PopulationId) -> Option<&Population> {
        self.populations
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.populations[i])
    }

    pub fn id_by_name(&self, name: &str) -> Option<PopulationId> {
        self.populations.iter().find(|p| p.name == name).map(|p| p.id)
    }

    /// Number of samples in a population (0 for an unknown id)
    pub fn pop_size(&self, id: PopulationId) -> usize {
        self.get(id).map(|p| p.range.len()).unwrap_or(0)
    }

    /// Position (in id order) of the population a sample belongs to
    pub fn position_of(&self, sample: SampleIndex) -> Option<usize> {
        self.populations.iter().position(|p| p.range.contains(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pop(id: PopulationId, start: usize, end: usize) -> Population {
        Population {
            id,
            name: format!("pop{}", id),
            range: SampleRange::new(start, end),
        }
    }

    #[test]
    fn test_valid_partition() {
        let index = PopulationIndex::new(vec![pop(2, 3, 4), pop(1, 0, 2)]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.sample_count(), 5);
        assert_eq!(index.pop_size(1), 3);
        assert_eq!(index.pop_size(2), 2);
        assert_eq!(index.position_of(4), Some(1));
        assert_eq!(index.id_by_name("pop2"), Some(2));
        assert_eq!(index.iter().next().unwrap().id, 1);
    }

    #[test]
    fn test_gaps_and_overlaps_rejected() {
        assert!(PopulationIndex::new(vec![pop(1, 0, 2), pop(2, 4, 5)]).is_err());
        assert!(PopulationIndex::new(vec![pop(1, 0, 2), pop(2, 2, 5)]).is_err());
        assert!(PopulationIndex::new(vec![pop(1, 1, 2)]).is_err());
        assert!(PopulationIndex::new(vec![pop(1, 0, 2), pop(1, 3, 4)]).is_err());
    }

    #[test]
    fn test_from_ordered_samples() {
        let labels = vec![(1, "north"), (1, "north"), (2, "south"), (3, "east"), (3, "east")];
        let index = PopulationIndex::from_ordered_samples(labels).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(3).unwrap().range, SampleRange::new(3, 4));
        assert_eq!(index.get(2).unwrap().name, "south");

        let unordered = vec![(2, "south"), (1, "north")];
        assert!(PopulationIndex::from_ordered_samples(unordered).is_err());
    }
}
