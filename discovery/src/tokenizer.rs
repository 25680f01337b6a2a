//! Splitting raw interpreter output into rows and fields.
//!
//! Two shapes of output are handled:
//!
//! - **Tabular** listings (`Format-Table` style): a header row, an underline
//!   row, then one data row per record with columns separated by runs of
//!   whitespace. Column widths vary, so only whitespace runs are trusted.
//! - **Metadata** rows: `set|required|optional`, where each section is a
//!   space-separated list of `name,type,values` tokens and `values` is
//!   `;`-joined.
//!
//! Nothing in here fails. Odd rows come back as-is or as `None` and the
//! callers decide what to drop.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Header plus underline rows preceding tabular data.
pub const TABLE_HEADER_ROWS: usize = 2;

/// Strips terminal escape sequences and unifies line endings.
pub fn normalize_output(raw: &str) -> Cow<'_, str> {
    static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("static regex must compile")
    });

    let stripped = ANSI_RE.replace_all(raw, "");
    if stripped.contains('\r') {
        Cow::Owned(stripped.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        stripped
    }
}

/// Trimmed, non-empty logical rows after discarding the first `skip` rows.
///
/// Leading and trailing blank lines of the whole output do not count
/// towards `skip`.
///
/// # Examples
///
/// ```
/// use psform_discovery::tokenizer::logical_rows;
///
/// let raw = "\nName    Version\n----    -------\nPester  5.5.0\n  PSReadLine 2.3.4  \n\n";
/// assert_eq!(logical_rows(raw, 2), ["Pester  5.5.0", "PSReadLine 2.3.4"]);
/// assert!(logical_rows("", 2).is_empty());
/// ```
pub fn logical_rows(raw: &str, skip: usize) -> Vec<String> {
    let normalized = normalize_output(raw);
    normalized
        .trim()
        .lines()
        .skip(skip)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Positional fields of a tabular row.
///
/// # Examples
///
/// ```
/// use psform_discovery::tokenizer::tabular_fields;
///
/// assert_eq!(tabular_fields("Pester   5.5.0 \t C:\\Modules"), ["Pester", "5.5.0", "C:\\Modules"]);
/// ```
pub fn tabular_fields(row: &str) -> Vec<&str> {
    row.split_whitespace().collect()
}

/// The three sections of a metadata row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataRow<'a> {
    pub set_name: &'a str,
    pub required: &'a str,
    pub optional: &'a str,
}

/// Splits a metadata row on `|`.
///
/// Returns the trimmed first section and, when the row has at least three
/// sections, the required and optional blobs. Sections past the third are
/// ignored.
pub fn split_metadata_row(row: &str) -> (&str, Option<MetadataRow<'_>>) {
    let mut parts = row.split('|');
    let set_name = parts.next().unwrap_or_default().trim();
    let sections = match (parts.next(), parts.next()) {
        (Some(required), Some(optional)) => Some(MetadataRow {
            set_name,
            required,
            optional,
        }),
        _ => None,
    };
    (set_name, sections)
}

/// Parameter tokens of a required/optional blob, separated by single spaces.
///
/// Empty tokens from doubled or edge spaces are skipped.
pub fn parameter_tokens(blob: &str) -> impl Iterator<Item = &str> {
    blob.split(' ').filter(|token| !token.trim().is_empty())
}

/// Raw subfields of one `name,type,values` parameter token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterToken<'a> {
    pub name: &'a str,
    pub type_name: &'a str,
    pub values: Vec<&'a str>,
}

/// Splits a parameter token on `,` and its values on `;`.
///
/// Missing subfields come back empty; names and types are trimmed and empty
/// values dropped.
///
/// # Examples
///
/// ```
/// use psform_discovery::tokenizer::split_parameter_token;
///
/// let token = split_parameter_token("Scope,String,CurrentUser;AllUsers");
/// assert_eq!(token.name, "Scope");
/// assert_eq!(token.type_name, "String");
/// assert_eq!(token.values, ["CurrentUser", "AllUsers"]);
///
/// let bare = split_parameter_token("Force");
/// assert_eq!(bare.type_name, "");
/// assert!(bare.values.is_empty());
/// ```
pub fn split_parameter_token(token: &str) -> ParameterToken<'_> {
    let mut fields = token.split(',');
    let name = fields.next().unwrap_or_default().trim();
    let type_name = fields.next().unwrap_or_default().trim();
    let values = fields
        .next()
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    ParameterToken {
        name,
        type_name,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_is_lines_minus_header() {
        let mut raw = String::from("Name\n----\n");
        for i in 0..7 {
            raw.push_str(&format!("Command-{i}\n"));
        }
        assert_eq!(logical_rows(&raw, TABLE_HEADER_ROWS).len(), 7);
    }

    #[test]
    fn test_crlf_and_ansi_are_normalized() {
        let raw = "\u{1b}[32;1mName\u{1b}[0m\r\n\u{1b}[32;1m----\u{1b}[0m\r\nGet-Foo\r\nGet-Bar\r\n";
        assert_eq!(logical_rows(raw, TABLE_HEADER_ROWS), ["Get-Foo", "Get-Bar"]);
    }

    #[test]
    fn test_header_only_output_has_no_rows() {
        assert!(logical_rows("Name\n----\n", TABLE_HEADER_ROWS).is_empty());
        assert!(logical_rows("   \n\n", TABLE_HEADER_ROWS).is_empty());
    }

    #[test]
    fn test_skip_zero_keeps_every_row() {
        assert_eq!(logical_rows("a|b|c\n\nd|e|f\n", 0), ["a|b|c", "d|e|f"]);
    }

    #[test]
    fn test_split_metadata_row() {
        let (name, sections) = split_metadata_row("ByName|Name,String[],|Force,SwitchParameter,");
        assert_eq!(name, "ByName");
        let sections = sections.unwrap();
        assert_eq!(sections.required, "Name,String[],");
        assert_eq!(sections.optional, "Force,SwitchParameter,");
    }

    #[test]
    fn test_split_metadata_row_malformed() {
        assert_eq!(split_metadata_row("OnlyName"), ("OnlyName", None));
        assert_eq!(split_metadata_row("Two|Parts").1, None);
    }

    #[test]
    fn test_parameter_tokens_skip_empty() {
        let tokens: Vec<&str> = parameter_tokens(" A,String,  B,Int32, ").collect();
        assert_eq!(tokens, ["A,String,", "B,Int32,"]);
        assert_eq!(parameter_tokens("").count(), 0);
    }

    #[test]
    fn test_split_parameter_token_trims_and_drops_empty_values() {
        let token = split_parameter_token(" Level , String , Low;;High; ");
        assert_eq!(token.name, "Level");
        assert_eq!(token.type_name, "String");
        assert_eq!(token.values, ["Low", "High"]);
    }
}
