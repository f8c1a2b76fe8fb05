//! Stable identifiers for the graph model.
//!
//! Nodes, connectors and connections form a cyclic object graph (node ↔ connector ↔
//! connection ↔ connector ↔ node). Rather than storing direct references between them
//! (which would require `Rc`/`Weak` cycles or unsafe aliasing), every entity is addressed
//! by a small UUID-backed handle and the [`crate::graph::Graph`] is the only place that
//! resolves a handle back to data. Connections and connectors therefore only ever hold
//! ids, never pointers to one another.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh, random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The underlying UUID value.
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

id_type!(NodeId);
id_type!(ConnectorId);
id_type!(ConnectionId);
id_type!(ExecutionId);

/// Direction of a connector. Immutable once a connector is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
        assert_ne!(ConnectorId::new(), ConnectorId::new());
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn display_round_trips_through_uuid() {
        let id = NodeId::new();
        let text = id.to_string();
        assert_eq!(text, id.uuid().to_string());
    }
}
