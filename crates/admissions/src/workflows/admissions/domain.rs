use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier wrapper for admissions enquiries (leads).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

/// Identifier wrapper for formal applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for scheduled interviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterviewId(pub String);

/// Identifier wrapper for fee invoices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

/// Identifier for the counselor assigned to assess an applicant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounselorId(pub String);

/// Wall-clock time within a single day, stored as minutes since midnight.
///
/// Interview slots arrive as fixed-width `HH:MM` 24-hour strings; parsing them to
/// minutes up front keeps every later comparison an integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    pub const fn minutes_from_midnight(self) -> u16 {
        self.0
    }

    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    pub const fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Raised when a slot time is not a zero-padded `HH:MM` 24-hour string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected HH:MM 24-hour time, got '{0}'")]
pub struct TimeParseError(pub String);

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (hour, minute) = trimmed
            .split_once(':')
            .ok_or_else(|| TimeParseError(value.to_string()))?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(TimeParseError(value.to_string()));
        }

        let hour: u16 = hour.parse().map_err(|_| TimeParseError(value.to_string()))?;
        let minute: u16 = minute
            .parse()
            .map_err(|_| TimeParseError(value.to_string()))?;

        Self::from_hm(hour, minute).ok_or_else(|| TimeParseError(value.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Where an enquiry originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    WalkIn,
    Website,
    Referral,
    Phone,
    CsvImport,
    Other,
}

impl LeadSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WalkIn => "Walk In",
            Self::Website => "Website",
            Self::Referral => "Referral",
            Self::Phone => "Phone",
            Self::CsvImport => "CSV Import",
            Self::Other => "Other",
        }
    }
}

/// Kanban column for an enquiry before it becomes a formal application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    ApplicationStarted,
    Converted,
    Lost,
}

impl LeadStatus {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::New,
            Self::Contacted,
            Self::Qualified,
            Self::ApplicationStarted,
            Self::Converted,
            Self::Lost,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::ApplicationStarted => "Application Started",
            Self::Converted => "Converted",
            Self::Lost => "Lost",
        }
    }
}

/// High level status tracked throughout the admission decision pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    Interview,
    OfferSent,
    Waitlisted,
    Rejected,
    Enrolled,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Draft,
            Self::Submitted,
            Self::UnderReview,
            Self::Interview,
            Self::OfferSent,
            Self::Waitlisted,
            Self::Rejected,
            Self::Enrolled,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::UnderReview => "Under Review",
            Self::Interview => "Interview",
            Self::OfferSent => "Offer Sent",
            Self::Waitlisted => "Waitlisted",
            Self::Rejected => "Rejected",
            Self::Enrolled => "Enrolled",
        }
    }
}

/// Verification state of a single supporting document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Missing,
    Uploaded,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Missing => "Missing",
            Self::Uploaded => "Uploaded",
            Self::Verified => "Verified",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    InPerson,
    Online,
}

impl InterviewMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InPerson => "In Person",
            Self::Online => "Online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl InterviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "No Show",
        }
    }
}

/// Settlement state of a fee invoice. Never written directly by callers; the
/// billing module derives it after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Partial,
    Overdue,
    Void,
}

impl InvoiceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Partial => "Partial",
            Self::Overdue => "Overdue",
            Self::Void => "Void",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Online,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::BankTransfer => "Bank Transfer",
            Self::Online => "Online",
        }
    }
}

/// An admissions enquiry prior to formal application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub student_name: String,
    pub parent_name: String,
    pub contact: String,
    pub class_applied: String,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub enquiry_date: NaiveDate,
    pub follow_up_on: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Inbound payload used to register a lead, whether typed in or imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadIntake {
    pub student_name: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub contact: String,
    pub class_applied: String,
    pub source: LeadSource,
    #[serde(default)]
    pub enquiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub follow_up_on: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

/// A required or optional supporting document named at intake time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub kind: String,
    pub mandatory: bool,
}

/// Tracked verification state for one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub kind: String,
    pub mandatory: bool,
    pub status: DocumentStatus,
}

impl DocumentRecord {
    pub fn missing(requirement: DocumentRequirement) -> Self {
        Self {
            kind: requirement.kind,
            mandatory: requirement.mandatory,
            status: DocumentStatus::Missing,
        }
    }
}

/// Applicant data carried by a formal application. Status and the eligibility
/// check live on the repository record so they are assigned in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub target_class: String,
    pub documents: Vec<DocumentRecord>,
}

/// Inbound payload for a direct application submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationIntake {
    pub applicant_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub target_class: String,
    #[serde(default)]
    pub documents: Vec<DocumentRequirement>,
}

/// A scheduled assessment slot between an applicant and a counselor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub applicant_name: String,
    pub counselor_id: CounselorId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub mode: InterviewMode,
    pub location: String,
    pub status: InterviewStatus,
}

/// A recorded payment against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: u32,
    pub method: PaymentMethod,
    pub received_on: NaiveDate,
}

/// A fee invoice raised against an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub application_id: ApplicationId,
    pub amount: u32,
    pub discount: u32,
    pub paid_amount: u32,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub payments: Vec<Payment>,
}

impl Invoice {
    /// Billed amount after discount.
    pub fn final_amount(&self) -> u32 {
        self.amount.saturating_sub(self.discount)
    }

    pub fn balance(&self) -> u32 {
        self.final_amount().saturating_sub(self.paid_amount)
    }
}
