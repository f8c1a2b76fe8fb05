//! Registry of node-type constructors, keyed by name (§4.9).
//!
//! A [`NodeCatalog`] lets a runner or a graph-building tool instantiate nodes by a
//! string type name instead of the caller needing to know the concrete Rust type —
//! the same role a plugin registry plays in a pluggable node-execution system.

use crate::condition::{Combinator, ConditionRule};
use crate::error::{GraphError, Result};
use crate::node::Node;
use crate::nodes::{EndNode, IfElseNode, InputJsonNode, MergeNode, OutputNode, SetVariableNode, StartNode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructs a fresh, independently-owned node instance.
pub type NodeFactory = Arc<dyn Fn() -> Box<dyn Node> + Send + Sync>;

/// Static description of a registered node type.
#[derive(Clone)]
pub struct NodeMetadata {
    type_name: &'static str,
    display_name: &'static str,
    category: &'static str,
    description: &'static str,
    factory: NodeFactory,
}

impl NodeMetadata {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Maps node type names to the factories that build them.
///
/// Entries are keyed by the lowercased type name; a second index maps the lowercased
/// display name back to that key, so [`NodeCatalog::create_instance`] can resolve either
/// `type` or `displayName` case-insensitively (§4.9, spec.md:193).
#[derive(Default, Clone)]
pub struct NodeCatalog {
    entries: HashMap<String, NodeMetadata>,
    by_display_name: HashMap<String, String>,
}

impl NodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-populated with the seven canonical node types (§4.8). Parameterised
    /// node types (`SetVariable`, `IfElse`, `InputJson`, `Output`) are registered with
    /// reasonable no-argument defaults; callers wanting a configured instance should
    /// build the node directly and skip the catalog.
    pub fn with_canonical_nodes() -> Self {
        let mut catalog = Self::new();
        catalog.register(
            "Start",
            "Start",
            "Control Flow",
            "Entry point; activates its single output",
            || Box::new(StartNode::new()) as Box<dyn Node>,
        );
        catalog.register(
            "End",
            "End",
            "Control Flow",
            "Terminal point; accepts one input",
            || Box::new(EndNode::new()) as Box<dyn Node>,
        );
        catalog.register(
            "Merge",
            "Merge",
            "Control Flow",
            "Joins two branches into one output",
            || Box::new(MergeNode::new()) as Box<dyn Node>,
        );
        catalog.register(
            "SetVariable",
            "Set Variable",
            "Data",
            "Writes a fixed value into the run's context",
            || Box::new(SetVariableNode::new("value", Value::Null)) as Box<dyn Node>,
        );
        catalog.register(
            "IfElse",
            "If/Else",
            "Control Flow",
            "Routes to one of two outputs based on condition rules",
            || Box::new(IfElseNode::new(Vec::<ConditionRule>::new(), Combinator::And, None)) as Box<dyn Node>,
        );
        catalog.register(
            "InputJson",
            "JSON Input",
            "I/O",
            "Parses a configured JSON source",
            || Box::new(InputJsonNode::new("null")) as Box<dyn Node>,
        );
        catalog.register(
            "Output",
            "Output",
            "I/O",
            "Captures its input into a named context variable",
            || Box::new(OutputNode::new("output")) as Box<dyn Node>,
        );
        catalog
    }

    pub fn register(
        &mut self,
        type_name: &'static str,
        display_name: &'static str,
        category: &'static str,
        description: &'static str,
        factory: impl Fn() -> Box<dyn Node> + Send + Sync + 'static,
    ) {
        let key = type_name.to_lowercase();
        self.by_display_name.insert(display_name.to_lowercase(), key.clone());
        self.entries.insert(
            key,
            NodeMetadata {
                type_name,
                display_name,
                category,
                description,
                factory: Arc::new(factory),
            },
        );
    }

    /// Resolves `type_or_display_name` case-insensitively against either the type name or
    /// the display name.
    fn resolve(&self, type_or_display_name: &str) -> Option<&NodeMetadata> {
        let needle = type_or_display_name.to_lowercase();
        self.entries
            .get(&needle)
            .or_else(|| self.by_display_name.get(&needle).and_then(|key| self.entries.get(key)))
    }

    pub fn metadata(&self, type_or_display_name: &str) -> Option<&NodeMetadata> {
        self.resolve(type_or_display_name)
    }

    pub fn registered_types(&self) -> impl Iterator<Item = &NodeMetadata> {
        self.entries.values()
    }

    /// Instantiates a fresh node looked up by `type` or `displayName` (case-insensitive),
    /// or a [`GraphError::InvalidArgument`] if neither resolves to a registered type.
    pub fn create_instance(&self, type_or_display_name: &str) -> Result<Box<dyn Node>> {
        let entry = self.resolve(type_or_display_name).ok_or_else(|| {
            GraphError::invalid_argument(format!("unregistered node type '{type_or_display_name}'"))
        })?;
        Ok((entry.factory)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_catalog_creates_all_seven_types() {
        let catalog = NodeCatalog::with_canonical_nodes();
        for name in ["Start", "End", "Merge", "SetVariable", "IfElse", "InputJson", "Output"] {
            let node = catalog.create_instance(name).unwrap();
            assert_eq!(node.type_name(), name);
        }
    }

    #[test]
    fn unregistered_type_is_an_error() {
        let catalog = NodeCatalog::with_canonical_nodes();
        assert!(catalog.create_instance("DoesNotExist").is_err());
    }

    #[test]
    fn each_call_creates_an_independent_instance() {
        let catalog = NodeCatalog::with_canonical_nodes();
        let a = catalog.create_instance("Start").unwrap();
        let b = catalog.create_instance("Start").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn lookup_by_type_name_is_case_insensitive() {
        let catalog = NodeCatalog::with_canonical_nodes();
        assert_eq!(catalog.create_instance("ifelse").unwrap().type_name(), "IfElse");
        assert_eq!(catalog.create_instance("INPUTJSON").unwrap().type_name(), "InputJson");
    }

    #[test]
    fn lookup_by_display_name_is_case_insensitive() {
        let catalog = NodeCatalog::with_canonical_nodes();
        assert_eq!(catalog.create_instance("if/else").unwrap().type_name(), "IfElse");
        assert_eq!(catalog.create_instance("JSON INPUT").unwrap().type_name(), "InputJson");
        assert_eq!(catalog.create_instance("Set Variable").unwrap().type_name(), "SetVariable");
    }

    #[test]
    fn every_canonical_entry_has_a_real_category() {
        let catalog = NodeCatalog::with_canonical_nodes();
        for entry in catalog.registered_types() {
            assert!(!entry.category().is_empty());
            assert!(!entry.display_name().is_empty());
        }
    }
}
