// markers.rs - Marker whitelist / blacklist files

use crate::data::lists::{Blacklist, Whitelist};
use crate::data::locus::LocusId;
use crate::error::{FilterError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Yield (line number, trimmed content) for every non-comment, non-blank line
fn marker_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let file = File::open(path).map_err(|e| FilterError::resource(path, e))?;
    let mut lines = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| FilterError::resource(path, e))?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push((i + 1, trimmed.to_string()));
    }
    if lines.is_empty() {
        return Err(FilterError::consistency(format!(
            "unable to load any markers from '{}'",
            path.display()
        )));
    }
    Ok(lines)
}

fn parse_field<T: std::str::FromStr>(path: &Path, line_no: usize, field: &str) -> Result<T> {
    field.trim().parse().map_err(|_| {
        FilterError::consistency(format!(
            "{}:{}: '{}' is not a valid marker",
            path.display(),
            line_no,
            field
        ))
    })
}

/// Read a blacklist: one locus id per line
pub fn load_marker_list(path: &Path) -> Result<Blacklist> {
    let mut list = Blacklist::new();
    for (line_no, line) in marker_lines(path)? {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() > 1 {
            return Err(FilterError::consistency(format!(
                "{}:{}: blacklist lines hold a single locus id",
                path.display(),
                line_no
            )));
        }
        list.insert(parse_field::<LocusId>(path, line_no, fields[0])?);
    }
    log::info!("Loaded {} blacklisted markers from {}", list.len(), path.display());
    Ok(list)
}

/// Read a whitelist: `<locus>` keeps every site, `<locus>\t<column>` keeps one site
pub fn load_marker_column_list(path: &Path) -> Result<Whitelist> {
    let mut list = Whitelist::new();
    for (line_no, line) in marker_lines(path)? {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.as_slice() {
            [locus] => list.keep_all(parse_field(path, line_no, locus)?),
            [locus, col] => {
                list.keep_site(parse_field(path, line_no, locus)?, parse_field(path, line_no, col)?)
            }
            _ => {
                return Err(FilterError::consistency(format!(
                    "{}:{}: too many columns in whitelist; expected '<locus>[\\t<column>]'",
                    path.display(),
                    line_no
                )));
            }
        }
    }
    log::info!(
        "Loaded {} whitelisted markers ({} explicit columns) from {}",
        list.len(),
        list.selected_site_count(),
        path.display()
    );
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::lists::SiteSelection;
    use std::collections::BTreeSet;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_list(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_blacklist() {
        let file = write_list("# loci to drop\n12\n\n7\n12\n");
        let list = load_marker_list(file.path()).unwrap();
        assert_eq!(list.into_iter().collect::<Vec<_>>(), vec![7, 12]);
    }

    #[test]
    fn test_load_whitelist_with_columns() {
        let file = write_list("3\t10\n3\t14\n5\n");
        let list = load_marker_column_list(file.path()).unwrap();
        assert_eq!(
            list.get(3),
            Some(&SiteSelection::Columns(BTreeSet::from([10, 14])))
        );
        assert_eq!(list.get(5), Some(&SiteSelection::All));
    }

    #[test]
    fn test_malformed_lists_rejected() {
        let file = write_list("3\t10\t2\n");
        assert!(load_marker_column_list(file.path()).is_err());

        let file = write_list("abc\n");
        assert!(matches!(
            load_marker_list(file.path()),
            Err(FilterError::DataConsistency(_))
        ));

        let file = write_list("# nothing\n\n");
        assert!(load_marker_list(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_marker_list(&dir.path().join("absent.tsv"));
        assert!(matches!(result, Err(FilterError::Resource { .. })));
    }
}
