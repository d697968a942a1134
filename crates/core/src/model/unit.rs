use thiserror::Error;

use crate::model::ids::UnitId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnitError {
    #[error("unit title cannot be empty")]
    EmptyTitle,

    #[error("unit description cannot be empty")]
    EmptyDescription,
}

//
// ─── UNIT ──────────────────────────────────────────────────────────────────────
//

/// A single catalog entry. Immutable after construction; the catalog is
/// loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    title: String,
    description: String,
    image_path: String,
}

impl Unit {
    /// Create a validated unit.
    ///
    /// # Errors
    ///
    /// Returns `UnitError` if the title or description is blank.
    pub fn new(
        id: UnitId,
        title: impl Into<String>,
        description: impl Into<String>,
        image_path: impl Into<String>,
    ) -> Result<Self, UnitError> {
        let title = title.into();
        let description = description.into();
        if title.trim().is_empty() {
            return Err(UnitError::EmptyTitle);
        }
        if description.trim().is_empty() {
            return Err(UnitError::EmptyDescription);
        }
        Ok(Self {
            id,
            title,
            description,
            image_path: image_path.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    /// Case-insensitive substring match over title and description.
    ///
    /// A blank query matches every unit, so the caller can feed the search
    /// box value through unconditionally.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&q) || self.description.to_lowercase().contains(&q)
    }
}

//
// ─── BUILTIN CATALOG ───────────────────────────────────────────────────────────
//

/// The fixed seven-unit catalog presented by the course.
///
/// # Panics
///
/// Panics only if the builtin entries fail validation, which would be a
/// programming error in this table.
#[must_use]
pub fn builtin_catalog() -> Vec<Unit> {
    let entries: [(u32, &str, &str, &str); 7] = [
        (
            1,
            "Welcome & Onboarding",
            "A first introduction to NAO and how to work with it.",
            "assets/WelcomeOnboarding.png",
        ),
        (
            2,
            "Empathy Warm-Up",
            "A short opening exercise for empathy and communication.",
            "assets/EmpathyWarmUp.png",
        ),
        (
            3,
            "Digital Literacy Coach",
            "Tools for checking information, credibility and digital content.",
            "assets/DigitalLiteracyCoach.png",
        ),
        (
            4,
            "Team Communication",
            "Practicing group discussion, roles and active listening.",
            "assets/TeamCommunication.png",
        ),
        (
            5,
            "Stress Check-In",
            "Recognizing stress and emotions before a task or discussion.",
            "assets/StressCheckIn.png",
        ),
        (
            6,
            "Reflection Quiz",
            "A short questionnaire for reflection and takeaways.",
            "assets/ReflectionQuiz.png",
        ),
        (
            7,
            "Campus Guide",
            "A guided tour and orientation around the campus environment.",
            "assets/CampusGuide.png",
        ),
    ];

    entries
        .into_iter()
        .map(|(id, title, desc, img)| {
            Unit::new(UnitId::new(id), title, desc, img).expect("builtin catalog entry is valid")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_title() {
        let err = Unit::new(UnitId::new(1), "  ", "desc", "a.png").unwrap_err();
        assert_eq!(err, UnitError::EmptyTitle);
    }

    #[test]
    fn rejects_blank_description() {
        let err = Unit::new(UnitId::new(1), "Title", "", "a.png").unwrap_err();
        assert_eq!(err, UnitError::EmptyDescription);
    }

    #[test]
    fn builtin_catalog_has_seven_units() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog[0].id(), UnitId::new(1));
        assert_eq!(catalog[6].title(), "Campus Guide");
    }

    #[test]
    fn matches_is_case_insensitive_over_both_fields() {
        let unit = Unit::new(UnitId::new(2), "Empathy Warm-Up", "opening exercise", "e.png")
            .unwrap();
        assert!(unit.matches("WARM"));
        assert!(unit.matches("exercise"));
        assert!(!unit.matches("quiz"));
    }

    #[test]
    fn blank_query_matches_everything() {
        let unit = Unit::new(UnitId::new(3), "T", "D", "t.png").unwrap();
        assert!(unit.matches(""));
        assert!(unit.matches("   "));
    }
}
