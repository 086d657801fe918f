//! In-memory index of the `condition_types` table.

use std::collections::HashMap;

use rcdb_core::Id;

use crate::{models::ConditionType, RCDBError, RCDBResult};

/// Condition types indexed by name and by id.
///
/// A registry is built once per connection (and on explicit reload) and is never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTypeRegistry {
    by_name: HashMap<String, ConditionType>,
    names_by_id: HashMap<Id, String>,
}

impl ConditionTypeRegistry {
    /// Indexes `types`. If two entries share a name the later one wins.
    pub fn new(types: impl IntoIterator<Item = ConditionType>) -> Self {
        let mut registry = Self::default();
        for condition_type in types {
            if let Some(previous) = registry.by_name.remove(condition_type.name()) {
                registry.names_by_id.remove(&previous.id());
            }
            registry
                .names_by_id
                .insert(condition_type.id(), condition_type.name().to_string());
            registry
                .by_name
                .insert(condition_type.name().to_string(), condition_type);
        }
        registry
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&ConditionType> {
        self.by_name.get(name)
    }

    /// Looks up a type by database id.
    pub fn get_by_id(&self, id: Id) -> Option<&ConditionType> {
        self.names_by_id
            .get(&id)
            .and_then(|name| self.by_name.get(name))
    }

    /// Looks up a type by name, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::ConditionTypeNotFound`] for unknown names.
    pub fn resolve(&self, name: &str) -> RCDBResult<&ConditionType> {
        self.get(name)
            .ok_or_else(|| RCDBError::ConditionTypeNotFound(name.to_string()))
    }

    /// Returns `true` if a type with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All types, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &ConditionType> {
        let mut types: Vec<&ConditionType> = self.by_name.values().collect();
        types.sort_by(|a, b| a.name().cmp(b.name()));
        types.into_iter()
    }

    /// All type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(ConditionType::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValueType;

    fn sample() -> ConditionTypeRegistry {
        ConditionTypeRegistry::new([
            ConditionType::new(3, "run_type", ValueType::String),
            ConditionType::new(1, "event_count", ValueType::Int),
            ConditionType::new(2, "beam_current", ValueType::Float),
        ])
    }

    #[test]
    fn lookups_by_name_and_id_agree() {
        let registry = sample();
        assert_eq!(registry.len(), 3);
        let by_name = registry.get("beam_current").expect("missing beam_current");
        assert_eq!(by_name.value_type(), ValueType::Float);
        assert_eq!(registry.get_by_id(2), Some(by_name));
        assert_eq!(registry.get_by_id(42), None);
        assert!(registry.contains("run_type"));
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        assert_eq!(
            sample().names(),
            ["beam_current", "event_count", "run_type"]
        );
    }

    #[test]
    fn unknown_names_fail_to_resolve() {
        let err = sample().resolve("missing").expect_err("should not resolve");
        assert!(matches!(err, RCDBError::ConditionTypeNotFound(name) if name == "missing"));
    }

    #[test]
    fn duplicate_names_keep_the_later_entry() {
        let registry = ConditionTypeRegistry::new([
            ConditionType::new(1, "x", ValueType::Int),
            ConditionType::new(2, "x", ValueType::Bool),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("x").map(ConditionType::id).ok(), Some(2));
        assert_eq!(registry.get_by_id(1), None);
    }
}
