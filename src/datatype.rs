//! Runtime-visible type tags for connectors and the assignability relation between them.
//!
//! A [`DataType`] is a name plus the set of type names it directly extends. Assignability
//! is computed by walking the extends-chain of either side: `a` is assignable to `b` when
//! the names are equal or `b` appears in `a`'s ancestor chain. Connection wiring in
//! [`crate::graph`] additionally accepts the symmetric case (see
//! [`DataType::compatible`]) per the permissive default documented in `RunnerConfig`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named runtime type with an optional chain of supertypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    name: String,
    supertypes: Vec<String>,
}

impl DataType {
    /// A type with no declared supertypes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
        }
    }

    /// A type that directly extends the given supertype names.
    pub fn with_supertypes(name: impl Into<String>, supertypes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            supertypes,
        }
    }

    /// The built-in wildcard type: assignable to and from anything.
    pub fn any() -> Self {
        Self::new("Any")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// `self` is assignable to `target` iff the names match, `target` is `Any`, `self` is
    /// `Any`, or `target` names an ancestor of `self` (one-directional subtype check).
    fn assignable_to(&self, target: &DataType, registry: &TypeRegistry) -> bool {
        if self.name == target.name || self.name == "Any" || target.name == "Any" {
            return true;
        }
        registry.is_ancestor(&self.name, &target.name)
    }

    /// Connection-time compatibility: types are compatible iff assignable in either
    /// direction. See §9 open question 2 — this symmetric default is permissive and can
    /// admit unsound connections when a narrower runtime value flows into a wider-typed
    /// input; strict wiring should only rely on the one-directional [`DataType::assignable_to`].
    pub fn compatible(&self, other: &DataType, registry: &TypeRegistry) -> bool {
        self.assignable_to(other, registry) || other.assignable_to(self, registry)
    }
}

/// Resolves ancestor relationships between [`DataType`] names.
///
/// A `DataType` only stores the supertypes it directly declares; the registry lets
/// ancestors be looked up transitively (`Dog extends Animal`, `Animal extends Any` ⇒ `Dog`
/// is an ancestor-compatible with `Any`). Types that are never registered still compare
/// correctly by name equality — the registry only adds transitive reach.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    direct_supertypes: HashMap<String, Vec<String>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or extend) the direct supertypes of `type_name`.
    pub fn register(&mut self, data_type: &DataType) {
        self.direct_supertypes
            .entry(data_type.name.clone())
            .or_default()
            .extend(data_type.supertypes.iter().cloned());
    }

    /// True iff `ancestor` can be reached by following declared supertype edges from
    /// `descendant` (breadth-first, cycle-safe).
    pub fn is_ancestor(&self, descendant: &str, ancestor: &str) -> bool {
        let mut visited = std::collections::HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(descendant.to_string());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(supers) = self.direct_supertypes.get(&current) {
                for s in supers {
                    if s == ancestor {
                        return true;
                    }
                    queue.push_back(s.clone());
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_names_are_compatible() {
        let registry = TypeRegistry::new();
        let a = DataType::new("string");
        let b = DataType::new("string");
        assert!(a.compatible(&b, &registry));
    }

    #[test]
    fn any_is_compatible_with_everything() {
        let registry = TypeRegistry::new();
        let any = DataType::any();
        let custom = DataType::new("custom");
        assert!(any.compatible(&custom, &registry));
        assert!(custom.compatible(&any, &registry));
    }

    #[test]
    fn transitive_ancestor_is_compatible() {
        let mut registry = TypeRegistry::new();
        let animal = DataType::new("animal");
        let dog = DataType::with_supertypes("dog", vec!["animal".to_string()]);
        registry.register(&animal);
        registry.register(&dog);

        assert!(dog.compatible(&animal, &registry));
        // symmetric: animal -> dog also reported compatible (permissive default)
        assert!(animal.compatible(&dog, &registry));
    }

    #[test]
    fn unrelated_types_are_incompatible() {
        let registry = TypeRegistry::new();
        let a = DataType::new("string");
        let b = DataType::new("number");
        assert!(!a.compatible(&b, &registry));
    }
}
