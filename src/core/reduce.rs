// reduce.rs - Apply blacklist / whitelist decisions to the catalog

use crate::data::genotype::GenotypeTable;
use crate::data::lists::{Blacklist, SiteSelection, Whitelist};
use crate::data::locus::Catalog;

/// The only place where loci leave the catalog
pub struct CatalogReducer;

impl CatalogReducer {
    /// Remove blacklisted loci and, with a whitelist, every locus it does not
    /// name; whitelisted column sets trim the site lists of their locus.
    ///
    /// Returns the number of loci left. Applying the same lists twice is a no-op.
    pub fn reduce(
        catalog: &mut Catalog,
        genotypes: &mut GenotypeTable,
        blacklist: &Blacklist,
        whitelist: Option<&Whitelist>,
    ) -> usize {
        let before = catalog.len();

        catalog.retain(|locus| {
            !blacklist.contains(&locus.id) && whitelist.map_or(true, |wl| wl.contains(locus.id))
        });

        if let Some(wl) = whitelist {
            for (id, selection) in wl.iter() {
                if let (Some(locus), SiteSelection::Columns(cols)) = (catalog.get_mut(id), selection) {
                    locus.retain_sites(cols);
                }
            }
        }

        genotypes.retain_loci(|id| catalog.contains(id));

        let remaining = catalog.len();
        log::debug!("Catalog reduced from {} to {} loci", before, remaining);
        remaining
    }
}
