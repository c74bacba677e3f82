//! CSV enquiry ingestion: turns front-office enquiry exports into lead
//! intakes, skipping rows without a student name.

mod normalizer;
mod parser;

use crate::workflows::admissions::domain::LeadIntake;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum EnquiryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for EnquiryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnquiryImportError::Io(err) => write!(f, "failed to read enquiry export: {}", err),
            EnquiryImportError::Csv(err) => write!(f, "invalid enquiry CSV data: {}", err),
        }
    }
}

impl std::error::Error for EnquiryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnquiryImportError::Io(err) => Some(err),
            EnquiryImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for EnquiryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for EnquiryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Parsed import result: registrable intakes plus the count of rows dropped
/// for lacking a student name.
#[derive(Debug)]
pub struct EnquiryBatch {
    pub leads: Vec<LeadIntake>,
    pub skipped: usize,
}

pub struct EnquiryImporter;

impl EnquiryImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<EnquiryBatch, EnquiryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<EnquiryBatch, EnquiryImportError> {
        let mut leads = Vec::new();
        let mut skipped = 0;

        for record in parser::parse_records(reader)? {
            if record.student_name.is_empty() {
                skipped += 1;
                continue;
            }

            leads.push(LeadIntake {
                student_name: record.student_name,
                parent_name: record.parent_name,
                contact: record.contact,
                class_applied: record.class_applied,
                source: record.source,
                enquiry_date: record.enquiry_date,
                follow_up_on: None,
                date_of_birth: record.date_of_birth,
            });
        }

        Ok(EnquiryBatch { leads, skipped })
    }
}
