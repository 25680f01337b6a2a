//! Module listing.
//!
//! The listing query already keeps the newest version per module, but the
//! parser does not rely on it: rows sharing a name collapse to the one with
//! the highest version, at the position where the name first appeared.

use std::cmp::Ordering;
use std::collections::HashMap;

use psform_core::Module;
use tracing::debug;

use crate::tokenizer::{TABLE_HEADER_ROWS, logical_rows, tabular_fields};

/// One data row of the module table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRow {
    pub name: String,
    pub version: Option<String>,
    pub base: Option<String>,
}

impl ModuleRow {
    /// Reads `Name Version ModuleBase` columns. The install path may
    /// contain spaces, so everything after the version is joined back.
    fn from_fields(fields: &[&str]) -> Option<Self> {
        let (name, rest) = fields.split_first()?;
        let version = rest.first().map(|v| v.to_string());
        let base = (rest.len() > 1).then(|| rest[1..].join(" "));
        Some(Self {
            name: name.to_string(),
            version,
            base,
        })
    }
}

/// Parses module table output into rows, one per distinct name.
pub fn parse_module_rows(raw: &str) -> Vec<ModuleRow> {
    let mut rows: Vec<ModuleRow> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for line in logical_rows(raw, TABLE_HEADER_ROWS) {
        let fields = tabular_fields(&line);
        let Some(row) = ModuleRow::from_fields(&fields) else {
            continue;
        };
        match index_by_name.get(&row.name) {
            Some(&idx) => {
                if compare_versions(row.version.as_deref(), rows[idx].version.as_deref())
                    == Ordering::Greater
                {
                    debug!(module = %row.name, "Replacing older module version row");
                    rows[idx] = row;
                }
            }
            None => {
                index_by_name.insert(row.name.clone(), rows.len());
                rows.push(row);
            }
        }
    }

    rows
}

/// Parses module table output into [`Module`] records.
///
/// # Examples
///
/// ```
/// use psform_discovery::modules::parse_modules;
///
/// let raw = "\
/// Name        Version ModuleBase
/// ----        ------- ----------
/// Pester      3.4.0   C:\\Program Files\\Pester\\3.4.0
/// Pester      5.5.0   C:\\Program Files\\Pester\\5.5.0
/// PSReadLine  2.3.4   C:\\Program Files\\PSReadLine
/// ";
/// let names: Vec<String> = parse_modules(raw).into_iter().map(|m| m.name).collect();
/// assert_eq!(names, ["Pester", "PSReadLine"]);
/// ```
pub fn parse_modules(raw: &str) -> Vec<Module> {
    parse_module_rows(raw)
        .into_iter()
        .map(|row| Module::new(row.name))
        .collect()
}

/// Orders dotted versions segment by segment.
///
/// Numeric segments compare numerically, others lexically; a numeric
/// segment sorts above a non-numeric one and missing segments count as `0`.
/// A missing version sorts below any present one.
pub fn compare_versions(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let a: Vec<&str> = a.split('.').collect();
            let b: Vec<&str> = b.split('.').collect();
            for i in 0..a.len().max(b.len()) {
                let ord = compare_segment(
                    a.get(i).copied().unwrap_or("0"),
                    b.get(i).copied().unwrap_or("0"),
                );
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        }
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
