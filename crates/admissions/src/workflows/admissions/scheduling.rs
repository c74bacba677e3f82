use super::domain::{
    CounselorId, Interview, InterviewId, InterviewMode, InterviewStatus, TimeOfDay,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Candidate slot checked before an interview is created or moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub applicant_name: String,
    pub counselor_id: CounselorId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub mode: InterviewMode,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("interview window is empty: start {start} is not before end {end}")]
    EmptyWindow { start: TimeOfDay, end: TimeOfDay },
    #[error("applicant name is required")]
    MissingApplicant,
}

impl SlotRequest {
    pub fn validate(&self) -> Result<(), SlotError> {
        if self.applicant_name.trim().is_empty() {
            return Err(SlotError::MissingApplicant);
        }
        if self.start >= self.end {
            return Err(SlotError::EmptyWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Hard, save-blocking overlap with another interview for the same counselor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounselorConflict {
    pub interview_id: InterviewId,
    pub counselor_id: CounselorId,
    pub date: NaiveDate,
    pub busy_start: TimeOfDay,
    pub busy_end: TimeOfDay,
}

impl CounselorConflict {
    pub fn message(&self) -> String {
        format!(
            "Counselor {} is busy {}-{} on {}",
            self.counselor_id.0, self.busy_start, self.busy_end, self.date
        )
    }
}

/// Non-blocking notice that the applicant already has an open interview. The
/// caller may confirm and proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateApplicantWarning {
    pub interview_id: InterviewId,
    pub applicant_name: String,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub status: InterviewStatus,
}

impl DuplicateApplicantWarning {
    pub fn message(&self) -> String {
        format!(
            "{} already has a {} interview on {} at {}",
            self.applicant_name,
            self.status.label(),
            self.date,
            self.start
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<CounselorConflict>,
    pub warnings: Vec<DuplicateApplicantWarning>,
}

impl ConflictReport {
    pub fn blocks_save(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn needs_confirmation(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Scan the existing interview list for counselor double-bookings and repeat
/// applicants. `exclude` skips the interview being rescheduled.
pub fn detect_conflicts(
    candidate: &SlotRequest,
    existing: &[Interview],
    exclude: Option<&InterviewId>,
) -> ConflictReport {
    let candidate_name = fold_name(&candidate.applicant_name);
    let mut report = ConflictReport::default();

    for interview in existing {
        if exclude.is_some_and(|id| id == &interview.id) {
            continue;
        }

        if interview.status != InterviewStatus::Cancelled
            && interview.counselor_id == candidate.counselor_id
            && interview.date == candidate.date
            && overlaps(candidate.start, candidate.end, interview.start, interview.end)
        {
            report.conflicts.push(CounselorConflict {
                interview_id: interview.id.clone(),
                counselor_id: interview.counselor_id.clone(),
                date: interview.date,
                busy_start: interview.start,
                busy_end: interview.end,
            });
        }

        let open = !matches!(
            interview.status,
            InterviewStatus::Cancelled | InterviewStatus::Completed
        );
        if open && fold_name(&interview.applicant_name) == candidate_name {
            report.warnings.push(DuplicateApplicantWarning {
                interview_id: interview.id.clone(),
                applicant_name: interview.applicant_name.clone(),
                date: interview.date,
                start: interview.start,
                status: interview.status,
            });
        }
    }

    report
}

/// Half-open `[start, end)` intersection. Touching slots do not overlap.
fn overlaps(a_start: TimeOfDay, a_end: TimeOfDay, b_start: TimeOfDay, b_end: TimeOfDay) -> bool {
    a_start < b_end && b_start < a_end
}

fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}
