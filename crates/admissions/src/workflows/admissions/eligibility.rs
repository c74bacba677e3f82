use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Half-open age window `[min, max)` in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeWindow {
    pub min: u8,
    pub max: u8,
}

impl AgeWindow {
    pub fn contains(&self, age: i32) -> bool {
        age >= i32::from(self.min) && age < i32::from(self.max)
    }
}

/// Age computed as of the reference date: calendar-year difference, decremented
/// when the reference month/day falls before the birth month/day.
pub fn age_on(date_of_birth: NaiveDate, reference: NaiveDate) -> i32 {
    let mut age = reference.year() - date_of_birth.year();
    if (reference.month(), reference.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Outcome of an eligibility assessment. Never an error: a failed check is a
/// normal result the caller surfaces to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCheck {
    pub passed: bool,
    pub age: Option<i32>,
    pub message: String,
}

/// Maps target classes to the age windows they require. Classes without a
/// configured window always pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    reference_date: NaiveDate,
    windows: BTreeMap<String, AgeWindow>,
}

impl EligibilityPolicy {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            windows: BTreeMap::new(),
        }
    }

    /// The policy the school runs by default: entry to Class 1 requires an age
    /// of five or six as of the reference date.
    pub fn standard(reference_date: NaiveDate) -> Self {
        Self::new(reference_date).with_window("Class 1", AgeWindow { min: 5, max: 7 })
    }

    pub fn with_window(mut self, target_class: &str, window: AgeWindow) -> Self {
        self.windows.insert(target_class.to_string(), window);
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn window_for(&self, target_class: &str) -> Option<AgeWindow> {
        self.windows.get(target_class).copied()
    }

    /// Assess an applicant against the window configured for the target class.
    pub fn check(&self, date_of_birth: Option<NaiveDate>, target_class: &str) -> EligibilityCheck {
        let Some(date_of_birth) = date_of_birth else {
            return EligibilityCheck {
                passed: false,
                age: None,
                message: "DOB Missing".to_string(),
            };
        };

        let age = age_on(date_of_birth, self.reference_date);

        match self.window_for(target_class) {
            Some(window) if window.contains(age) => EligibilityCheck {
                passed: true,
                age: Some(age),
                message: format!("Age {age}: Eligible ({}-{})", window.min, window.max),
            },
            Some(window) => EligibilityCheck {
                passed: false,
                age: Some(age),
                message: format!("Age {age}: Check Age (Req: {}-{})", window.min, window.max),
            },
            None => EligibilityCheck {
                passed: true,
                age: Some(age),
                message: format!("Age {age}: OK"),
            },
        }
    }
}
