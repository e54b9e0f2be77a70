use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node (a table, module, or any other entity).
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A declared island: a named, ordered group of nodes forming one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandSpec {
    pub name: String,
    #[serde(default)]
    pub members: Vec<NodeId>,
}

impl IslandSpec {
    pub fn new<I, S>(name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        Self {
            name: name.to_string(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// A declared dependency: `consumer` depends on `provider`.
///
/// Deserializes either from a `[consumer, provider]` pair or from a table
/// with `consumer` and `provider` keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "EdgeRepr")]
pub struct EdgeSpec {
    pub consumer: NodeId,
    pub provider: NodeId,
}

impl EdgeSpec {
    pub fn new(consumer: impl Into<NodeId>, provider: impl Into<NodeId>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
        }
    }
}

impl fmt::Display for EdgeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.consumer, self.provider)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EdgeRepr {
    Pair(NodeId, NodeId),
    Named { consumer: NodeId, provider: NodeId },
}

impl From<EdgeRepr> for EdgeSpec {
    fn from(repr: EdgeRepr) -> Self {
        match repr {
            EdgeRepr::Pair(consumer, provider) | EdgeRepr::Named { consumer, provider } => {
                Self { consumer, provider }
            }
        }
    }
}

/// The declarative input to an analysis run: islands in layer order plus
/// the dependency edges between their members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureDefinition {
    #[serde(default)]
    pub islands: Vec<IslandSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// Classification of a single edge against the island order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeClass {
    /// Consumer and provider share an island (self-edges always land here).
    IntraLayer,
    /// Peripheral island depending on a more foundational one.
    CrossLayer,
    /// Foundational island depending on a more peripheral one.
    Violation,
}

impl EdgeClass {
    /// Classify an edge from the ranks of its consumer and provider islands.
    pub fn from_ranks(consumer_rank: usize, provider_rank: usize) -> Self {
        if consumer_rank == provider_rank {
            EdgeClass::IntraLayer
        } else if consumer_rank < provider_rank {
            EdgeClass::Violation
        } else {
            EdgeClass::CrossLayer
        }
    }

    pub fn crosses_islands(&self) -> bool {
        !matches!(self, EdgeClass::IntraLayer)
    }
}

impl fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeClass::IntraLayer => write!(f, "intra-layer"),
            EdgeClass::CrossLayer => write!(f, "cross-layer"),
            EdgeClass::Violation => write!(f, "violation"),
        }
    }
}

/// A back-edge: a foundational node depending on a peripheral one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub consumer: NodeId,
    pub provider: NodeId,
    pub from_island: String,
    pub to_island: String,
    /// Node matrix row (consumer index).
    pub row: usize,
    /// Node matrix column (provider index).
    pub col: usize,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {} ({})",
            self.consumer, self.from_island, self.provider, self.to_island
        )
    }
}
