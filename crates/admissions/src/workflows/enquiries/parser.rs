use super::normalizer::{clean_name, lead_source_for};
use crate::workflows::admissions::domain::LeadSource;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct EnquiryRecord {
    pub(crate) student_name: String,
    pub(crate) parent_name: String,
    pub(crate) contact: String,
    pub(crate) class_applied: String,
    pub(crate) source: LeadSource,
    pub(crate) enquiry_date: Option<NaiveDate>,
    pub(crate) date_of_birth: Option<NaiveDate>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<EnquiryRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<EnquiryRow>() {
        let row = record?;
        records.push(EnquiryRecord {
            student_name: clean_name(&row.student_name),
            parent_name: row.parent_name.map(|name| clean_name(&name)).unwrap_or_default(),
            contact: row.contact.unwrap_or_default(),
            class_applied: row.class.unwrap_or_default(),
            source: row
                .source
                .as_deref()
                .map(lead_source_for)
                .unwrap_or(LeadSource::CsvImport),
            enquiry_date: row.enquiry_date.as_deref().and_then(parse_date),
            date_of_birth: row.date_of_birth.as_deref().and_then(parse_date),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct EnquiryRow {
    #[serde(rename = "Student Name")]
    student_name: String,
    #[serde(rename = "Parent Name", default, deserialize_with = "empty_string_as_none")]
    parent_name: Option<String>,
    #[serde(rename = "Contact", default, deserialize_with = "empty_string_as_none")]
    contact: Option<String>,
    #[serde(rename = "Class", default, deserialize_with = "empty_string_as_none")]
    class: Option<String>,
    #[serde(rename = "Enquiry Date", default, deserialize_with = "empty_string_as_none")]
    enquiry_date: Option<String>,
    #[serde(rename = "Source", default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
    #[serde(rename = "Date of Birth", default, deserialize_with = "empty_string_as_none")]
    date_of_birth: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Date cells arrive as ISO dates or the day-first format the front office
/// exports; anything else is treated as absent.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_date(value)
}
