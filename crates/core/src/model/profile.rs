use serde::{Deserialize, Serialize};

/// How much study time the student wants scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyIntensity {
    Light,
    Moderate,
    Intense,
}

/// Personal details collected during onboarding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    full_name: String,
    grade_level: Option<String>,
    school_name: Option<String>,
}

/// Raw profile input; blank optional fields are dropped on validation.
#[derive(Clone, Debug, Default)]
pub struct UserProfileDraft {
    pub full_name: String,
    pub grade_level: Option<String>,
    pub school_name: Option<String>,
}

impl UserProfileDraft {
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    /// Normalize the draft into a profile.
    #[must_use]
    pub fn validate(self) -> UserProfile {
        UserProfile {
            full_name: self.full_name.trim().to_string(),
            grade_level: normalize_optional(self.grade_level),
            school_name: normalize_optional(self.school_name),
        }
    }
}

impl UserProfile {
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn grade_level(&self) -> Option<&str> {
        self.grade_level.as_deref()
    }

    #[must_use]
    pub fn school_name(&self) -> Option<&str> {
        self.school_name.as_deref()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
