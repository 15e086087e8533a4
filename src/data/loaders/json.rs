// json.rs - JSON loaders for datasets and population summaries

use crate::data::dataset::{Dataset, Sample};
use crate::data::genotype::{GenotypeCall, GenotypeTable};
use crate::data::locus::{Catalog, Locus, LocusId, SiteDescriptor, Strand};
use crate::data::population::{PopulationId, PopulationIndex};
use crate::data::summary::{PopulationSiteSummary, SiteSummaries, SiteTally};
use crate::error::{FilterError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub population: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocusRecord {
    pub id: LocusId,
    pub consensus: String,
    #[serde(default)]
    pub sites: Vec<SiteDescriptor>,
    #[serde(default)]
    pub chr: String,
    #[serde(default)]
    pub bp: u64,
    #[serde(default)]
    pub strand: Strand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub locus: LocusId,
    /// Sample id (not index)
    pub sample: u32,
    pub depth: u32,
    pub lnl: f64,
    pub model: String,
}

/// On-disk layout of a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub samples: Vec<SampleRecord>,
    pub loci: Vec<LocusRecord>,
    #[serde(default)]
    pub calls: Vec<CallRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSummaryRecord {
    pub col: usize,
    pub tally: SiteTally,
    /// Keyed by population name
    #[serde(default)]
    pub populations: BTreeMap<String, PopulationSiteSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocusSummaryRecord {
    pub locus: LocusId,
    #[serde(default)]
    pub sites: Vec<SiteSummaryRecord>,
}

/// On-disk layout of the summary engine output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub loci: Vec<LocusSummaryRecord>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| FilterError::resource(path, e))?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

impl Dataset {
    /// Load a dataset JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        log::info!("Loading dataset: {}", path.display());
        let record: DatasetRecord = read_json(path)?;
        Self::from_record(record)
    }

    /// Build and cross-check a dataset.
    ///
    /// Samples without any genotype call are left out of the population
    /// analysis. Populations are numbered in order of first appearance and
    /// samples are ordered by population, then name, so that every population
    /// occupies a contiguous block of sample indices.
    pub fn from_record(record: DatasetRecord) -> Result<Self> {
        if record.samples.is_empty() {
            return Err(FilterError::consistency("dataset contains no samples"));
        }

        let mut population_ids: HashMap<String, PopulationId> = HashMap::new();
        let mut population_names: BTreeMap<PopulationId, String> = BTreeMap::new();
        let mut samples = Vec::with_capacity(record.samples.len());
        let mut seen_ids = HashSet::new();
        let genotyped: HashSet<u32> = record.calls.iter().map(|c| c.sample).collect();

        for sample in record.samples {
            if !seen_ids.insert(sample.id) {
                return Err(FilterError::consistency(format!(
                    "sample ID {} occurs twice in this data set",
                    sample.id
                )));
            }
            if !genotyped.contains(&sample.id) {
                log::warn!(
                    "Unable to find any matches for sample ID {}, excluding this sample from population analysis",
                    sample.id
                );
                continue;
            }
            let next_id = population_ids.len() as PopulationId + 1;
            let population = *population_ids
                .entry(sample.population.clone())
                .or_insert(next_id);
            population_names
                .entry(population)
                .or_insert_with(|| sample.population.clone());
            samples.push(Sample {
                id: sample.id,
                name: sample.name.unwrap_or_else(|| sample.id.to_string()),
                population,
            });
        }
        if samples.is_empty() {
            return Err(FilterError::consistency("no sample in the dataset has a genotype call"));
        }
        samples.sort_by(|a, b| (a.population, &a.name).cmp(&(b.population, &b.name)));

        let populations = PopulationIndex::from_ordered_samples(samples.iter().map(|s| {
            let name = population_names
                .get(&s.population)
                .map(String::as_str)
                .unwrap_or_default();
            (s.population, name)
        }))?;

        let catalog = Catalog::from_loci(record.loci.into_iter().map(|l| Locus {
            id: l.id,
            consensus: l.consensus,
            sites: l.sites,
            chr: l.chr,
            bp: l.bp,
            strand: l.strand,
            hcnt: 0,
        }))?;

        let sample_index: HashMap<u32, usize> =
            samples.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        let mut genotypes = GenotypeTable::new(samples.len());
        for id in catalog.ids() {
            genotypes.ensure_locus(id);
        }
        for call in record.calls {
            if !catalog.contains(call.locus) {
                return Err(FilterError::consistency(format!(
                    "unable to find catalog locus {} for sample ID {}",
                    call.locus, call.sample
                )));
            }
            let index = *sample_index.get(&call.sample).ok_or_else(|| {
                FilterError::consistency(format!(
                    "call at locus {} refers to unknown sample ID {}",
                    call.locus, call.sample
                ))
            })?;
            let genotype = GenotypeCall::new(call.depth, call.lnl, &call.model)?;
            genotypes.insert(call.locus, index, genotype)?;
        }

        let mut dataset = Self {
            catalog,
            genotypes,
            populations,
            samples,
        };
        dataset.refresh_haplotype_counts();

        log::info!(
            "Loaded {} samples in {} populations, {} loci, {} genotype calls",
            dataset.samples.len(),
            dataset.populations.len(),
            dataset.catalog.len(),
            dataset.genotypes.total_calls()
        );
        Ok(dataset)
    }

    /// Inverse of [`Dataset::from_record`] for the current (filtered) state
    pub fn to_record(&self) -> DatasetRecord {
        let samples = self
            .samples
            .iter()
            .map(|s| SampleRecord {
                id: s.id,
                name: Some(s.name.clone()),
                population: self
                    .populations
                    .get(s.population)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
            })
            .collect();

        let loci = self
            .catalog
            .iter()
            .map(|l| LocusRecord {
                id: l.id,
                consensus: l.consensus.clone(),
                sites: l.sites.clone(),
                chr: l.chr.clone(),
                bp: l.bp,
                strand: l.strand,
            })
            .collect();

        let mut calls = Vec::new();
        for locus in self.catalog.ids() {
            let Some(row) = self.genotypes.row(locus) else {
                continue;
            };
            for (index, call) in row.iter().enumerate() {
                if let Some(call) = call {
                    calls.push(CallRecord {
                        locus,
                        sample: self.samples[index].id,
                        depth: call.depth,
                        lnl: call.lnl,
                        model: call.model_string(),
                    });
                }
            }
        }

        DatasetRecord {
            samples,
            loci,
            calls,
        }
    }

    /// Write the current state as a dataset JSON file
    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        crate::output::ensure_parent_dir(path)?;
        let file = File::create(path).map_err(|e| FilterError::resource(path, e))?;
        serde_json::to_writer(BufWriter::new(file), &self.to_record())?;
        log::info!("Filtered dataset written to: {}", path.display());
        Ok(())
    }
}

impl SiteSummaries {
    /// Load summary engine output, resolving population names against `populations`
    pub fn from_json_file(path: &Path, populations: &PopulationIndex) -> Result<Self> {
        log::info!("Loading population summaries: {}", path.display());
        let record: SummaryRecord = read_json(path)?;
        Self::from_record(record, populations)
    }

    pub fn from_record(record: SummaryRecord, populations: &PopulationIndex) -> Result<Self> {
        let mut summaries = SiteSummaries::new();
        for locus in record.loci {
            for site in locus.sites {
                summaries.insert_tally(locus.locus, site.col, site.tally);
                for (name, summary) in site.populations {
                    let population = populations.id_by_name(&name).ok_or_else(|| {
                        FilterError::consistency(format!(
                            "summary for locus {} refers to unknown population '{}'",
                            locus.locus, name
                        ))
                    })?;
                    summaries.insert_population_site(locus.locus, population, site.col, summary);
                }
            }
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DatasetRecord {
        serde_json::from_str(
            r#"{
                "samples": [
                    {"id": 10, "name": "s_b", "population": "south"},
                    {"id": 11, "name": "n_a", "population": "north"},
                    {"id": 12, "name": "s_a", "population": "south"}
                ],
                "loci": [
                    {"id": 1, "consensus": "ACGTA", "sites": [{"col": 2, "bp": 0}]},
                    {"id": 2, "consensus": "ACGTT"}
                ],
                "calls": [
                    {"locus": 1, "sample": 10, "depth": 9, "lnl": -2.0, "model": "OOEOO"},
                    {"locus": 1, "sample": 11, "depth": 4, "lnl": -8.0, "model": "OOOOO"},
                    {"locus": 2, "sample": 12, "depth": 6, "lnl": -3.0, "model": "OOOOO"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_from_record() {
        let dataset = Dataset::from_record(record()).unwrap();

        // south was seen first, so it is population 1 and occupies indices 0..=1
        let names: Vec<&str> = dataset.samples.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["s_a", "s_b", "n_a"]);
        assert_eq!(dataset.populations.id_by_name("south"), Some(1));
        assert_eq!(dataset.populations.pop_size(1), 2);

        let s_b = dataset.sample_index(10).unwrap();
        assert_eq!(dataset.genotypes.call(1, s_b).unwrap().depth, 9);
        assert_eq!(dataset.catalog.get(1).unwrap().hcnt, 2);
        assert_eq!(dataset.catalog.get(2).unwrap().hcnt, 1);
        assert!(dataset.genotypes.contains_locus(2));
    }

    #[test]
    fn test_sample_without_calls_excluded() {
        let mut rec = record();
        rec.samples.push(SampleRecord {
            id: 13,
            name: Some("s_c".to_string()),
            population: "south".to_string(),
        });
        // a population whose only sample has no calls disappears
        rec.samples.push(SampleRecord {
            id: 14,
            name: None,
            population: "east".to_string(),
        });
        let dataset = Dataset::from_record(rec).unwrap();

        assert_eq!(dataset.samples.len(), 3);
        assert!(dataset.sample_index(13).is_none());
        assert_eq!(dataset.populations.pop_size(1), 2);
        assert_eq!(dataset.populations.len(), 2);
        assert_eq!(dataset.populations.id_by_name("east"), None);
        assert_eq!(dataset.genotypes.sample_count(), 3);
    }

    #[test]
    fn test_no_genotyped_sample_rejected() {
        let mut rec = record();
        rec.calls.clear();
        assert!(matches!(
            Dataset::from_record(rec),
            Err(FilterError::DataConsistency(_))
        ));
    }

    #[test]
    fn test_duplicate_sample_rejected() {
        let mut rec = record();
        rec.samples[1].id = 10;
        let err = Dataset::from_record(rec).unwrap_err();
        assert!(err.to_string().contains("occurs twice"));
    }

    #[test]
    fn test_call_for_unknown_locus_rejected() {
        let mut rec = record();
        rec.calls[0].locus = 77;
        assert!(matches!(
            Dataset::from_record(rec),
            Err(FilterError::DataConsistency(_))
        ));
    }

    #[test]
    fn test_record_round_trip_preserves_masking() {
        let mut dataset = Dataset::from_record(record()).unwrap();
        let index = dataset.sample_index(11).unwrap();
        dataset.genotypes.call_mut(1, index).unwrap().mask(2);

        let back = Dataset::from_record(dataset.to_record()).unwrap();
        let index = back.sample_index(11).unwrap();
        assert_eq!(back.genotypes.call(1, index).unwrap().model_string(), "OOUOO");
    }

    #[test]
    fn test_summaries_resolve_population_names() {
        let dataset = Dataset::from_record(record()).unwrap();
        let rec: SummaryRecord = serde_json::from_str(
            r#"{"loci": [{"locus": 1, "sites": [{
                "col": 2,
                "tally": {"fixed": false, "allele_cnt": 2, "p_freq": 0.75, "obs_het": 0.25},
                "populations": {"north": {"num_indv": 1}, "south": {"num_indv": 2, "incompatible": true}}
            }]}]}"#,
        )
        .unwrap();

        let summaries = SiteSummaries::from_record(rec.clone(), &dataset.populations).unwrap();
        assert_eq!(summaries.tally(1, 2).unwrap().allele_cnt, 2);
        assert!(summaries.population_site(1, 1, 2).unwrap().incompatible);
        assert_eq!(summaries.population_site(1, 2, 2).unwrap().num_indv, 1);

        let mut bad = rec;
        bad.loci[0].sites[0]
            .populations
            .insert("east".to_string(), PopulationSiteSummary {
                num_indv: 1,
                incompatible: false,
                p_freq: 1.0,
            });
        assert!(SiteSummaries::from_record(bad, &dataset.populations).is_err());
    }
}
