use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{Field, Record};

/// Fields dropped from every fetched record unless the config says otherwise.
pub const DEFAULT_IGNORED_FIELDS: [&str; 7] = [
    "date",
    "ean",
    "month",
    "issn",
    "language",
    "copyright",
    "pagetotal",
];

static VENDOR_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i) ?gmbh").unwrap());

/// Run the normalization steps in order.
///
/// NOTE: `date` is renamed before ignored fields are dropped, so a `date` entry in `ignored`
/// never matches anything.
pub fn normalize(record: &mut Record, ignored: &[String]) {
    normalize_indentation(record);
    strip_vendor_suffix(record);
    lowercase_field_names(record);
    rename_date_to_year(record);
    drop_ignored_fields(record, ignored);
}

/// Indent every field line with a single tab.
pub fn normalize_indentation(record: &mut Record) {
    for field in &mut record.fields {
        field.indent = "\t".to_string();
    }
}

/// Remove the "GmbH" company suffix that ISBN lookups attach to publishers.
pub fn strip_vendor_suffix(record: &mut Record) {
    for field in &mut record.fields {
        if VENDOR_SUFFIX_RE.is_match(&field.value) {
            field.value = VENDOR_SUFFIX_RE.replace_all(&field.value, "").into_owned();
        }
    }
}

pub fn lowercase_field_names(record: &mut Record) {
    for field in &mut record.fields {
        field.name = field.name.to_lowercase();
    }
}

pub fn rename_date_to_year(record: &mut Record) {
    for field in record.fields.iter_mut().filter(|f| f.name == "date") {
        field.name = "year".to_string();
    }
}

pub fn drop_ignored_fields(record: &mut Record, ignored: &[String]) {
    record
        .fields
        .retain(|f| !ignored.iter().any(|i| i.eq_ignore_ascii_case(&f.name)));
}

/// Put an empty `keywords` field first.
///
/// This is not an unconditional insert: a record that already carries `keywords` (anystyle
/// output sometimes does) is left as is, so the appended entry never holds the field twice.
pub fn insert_keywords(record: &mut Record) {
    if record.get("keywords").is_none() {
        record.fields.insert(0, Field::new("keywords", "{}"));
    }
}

pub fn default_ignored_fields() -> Vec<String> {
    DEFAULT_IGNORED_FIELDS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(src: &str) -> Record {
        Record::parse(src).expect("test record parses")
    }

    fn names(rec: &Record) -> Vec<&str> {
        rec.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn indentation_becomes_a_single_tab() {
        let mut rec = record("@book{k,\n    title = {T},\n  year = 2000\n}");
        normalize_indentation(&mut rec);
        assert!(rec.fields.iter().all(|f| f.indent == "\t"));
    }

    #[test]
    fn vendor_suffix_is_stripped_case_insensitively() {
        let mut rec = record("@book{k,\n  publisher = {Springer GmbH},\n  note = {xGMBH}\n}");
        strip_vendor_suffix(&mut rec);
        assert_eq!(rec.fields[0].value, "{Springer}");
        assert_eq!(rec.fields[1].value, "{x}");
    }

    #[test]
    fn field_names_are_lowercased() {
        let mut rec = record("@article{k, Title={T}, DOI={10.1/x}}");
        lowercase_field_names(&mut rec);
        assert_eq!(names(&rec), ["title", "doi"]);
    }

    #[test]
    fn date_survives_as_year() {
        let mut rec = record("@book{k,\n  Date = {2018},\n  EAN = {978},\n  Month = {may},\n  title = {T}\n}");
        normalize(&mut rec, &default_ignored_fields());
        assert_eq!(names(&rec), ["year", "title"]);
        assert_eq!(rec.value("year").as_deref(), Some("2018"));
    }

    #[test]
    fn ignored_fields_follow_config() {
        let mut rec = record("@book{k, isbn={1}, title={T}, pages={3}}");
        drop_ignored_fields(&mut rec, &["ISBN".to_string(), "pages".to_string()]);
        assert_eq!(names(&rec), ["title"]);
    }

    #[test]
    fn field_order_is_preserved() {
        let mut rec = record("@misc{k, c={3}, language={en}, a={1}, b={2}}");
        normalize(&mut rec, &default_ignored_fields());
        assert_eq!(names(&rec), ["c", "a", "b"]);
    }

    #[test]
    fn keywords_go_first_once() {
        let mut rec = record("@misc{k, title={T}}");
        insert_keywords(&mut rec);
        insert_keywords(&mut rec);
        assert_eq!(names(&rec), ["keywords", "title"]);
        assert_eq!(rec.fields[0].value, "{}");

        let mut tagged = record("@misc{k, title={T}, keywords={x}}");
        insert_keywords(&mut tagged);
        assert_eq!(names(&tagged), ["title", "keywords"]);
    }
}
