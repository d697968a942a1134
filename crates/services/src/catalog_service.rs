use course_core::model::{builtin_catalog, Unit, UnitId};

/// Owns the immutable unit catalog and answers lookups and search-box
/// queries. Pure; persistence never touches it.
#[derive(Debug, Clone)]
pub struct CatalogService {
    units: Vec<Unit>,
}

impl CatalogService {
    /// The fixed builtin catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            units: builtin_catalog(),
        }
    }

    /// A catalog with explicit units, mainly for tests.
    #[must_use]
    pub fn with_units(units: Vec<Unit>) -> Self {
        Self { units }
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Units matching the search query; a blank query returns everything.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<&Unit> {
        self.units.iter().filter(|u| u.matches(query)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_returns_the_whole_catalog() {
        let catalog = CatalogService::builtin();
        assert_eq!(catalog.filter("").len(), catalog.len());
        assert_eq!(catalog.filter("  ").len(), catalog.len());
    }

    #[test]
    fn query_narrows_by_title_or_description() {
        let catalog = CatalogService::builtin();
        let hits = catalog.filter("empathy");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title(), "Empathy Warm-Up");

        assert!(catalog.filter("zzzz").is_empty());
    }

    #[test]
    fn lookup_by_id() {
        let catalog = CatalogService::builtin();
        assert!(catalog.get(UnitId::new(7)).is_some());
        assert!(catalog.get(UnitId::new(99)).is_none());
    }
}
