use std::sync::Arc;

use crate::db::PreferenceStore;
use crate::models::{default_criteria, Category, Criterion, MAX_WEIGHT, MIN_WEIGHT};

/// Loads, persists and resets the per-category criterion weight configuration
///
/// The persisted configuration is accepted as-is only when it is a list
/// containing an entry for every required key of the category, with every
/// weight inside [1,10]. Anything else (absent, corrupt, schema-mismatched,
/// incomplete) silently falls back to the built-in defaults.
pub struct CriteriaStore {
    prefs: Arc<dyn PreferenceStore>,
}

impl CriteriaStore {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    /// The stored configuration for `category`, or the built-in defaults
    pub fn load(&self, category: Category) -> Vec<Criterion> {
        let Some(value) = self.prefs.read(category.criteria_key()) else {
            return default_criteria(category);
        };

        match Self::validate(category, value) {
            Some(criteria) => criteria,
            None => {
                tracing::debug!(
                    category = %category,
                    "Stored criteria configuration invalid, using defaults"
                );
                default_criteria(category)
            }
        }
    }

    fn validate(category: Category, value: serde_json::Value) -> Option<Vec<Criterion>> {
        let parsed: Vec<Criterion> = serde_json::from_value(value).ok()?;

        let all_keys_present = category
            .profile()
            .criteria
            .iter()
            .all(|spec| parsed.iter().any(|c| c.key == spec.key));
        let weights_in_bounds = parsed
            .iter()
            .all(|c| (MIN_WEIGHT..=MAX_WEIGHT).contains(&c.weight));

        (all_keys_present && weights_in_bounds).then_some(parsed)
    }

    /// Persists the configuration. Invoked on every weight mutation; a failed
    /// write is non-fatal and leaves the in-memory configuration
    /// authoritative for the session.
    pub fn save(&self, category: Category, criteria: &[Criterion]) {
        match serde_json::to_value(criteria) {
            Ok(value) => self.prefs.write(category.criteria_key(), value),
            Err(e) => tracing::warn!(category = %category, error = %e, "Criteria serialization error"),
        }
    }

    /// Restores and persists the built-in defaults
    pub fn reset(&self, category: Category) -> Vec<Criterion> {
        let defaults = default_criteria(category);
        self.save(category, &defaults);
        defaults
    }
}
