use std::collections::BTreeSet;
use std::fmt;

/// An undirected, weighted similarity edge between two proteins.
///
/// Endpoints are stored in canonical order (`source < target` by string
/// ordering), so the same unordered pair always has the same representation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityEdge {
    source: String,
    target: String,
    weight: f64,
}

impl SimilarityEdge {
    /// Builds an edge from two endpoints in either order.
    ///
    /// Returns `None` for a self-pair. The weight is stored as given.
    pub fn new(a: impl Into<String>, b: impl Into<String>, weight: f64) -> Option<Self> {
        let a = a.into();
        let b = b.into();
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self {
                source: a,
                target: b,
                weight,
            }),
            std::cmp::Ordering::Greater => Some(Self {
                source: b,
                target: a,
                weight,
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The canonical key of the unordered pair.
    pub fn key(&self) -> (&str, &str) {
        (&self.source, &self.target)
    }

    /// Returns the endpoint opposite to `id`, or `None` if `id` is not an endpoint.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

impl fmt::Display for SimilarityEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {} ({:.4})", self.source, self.target, self.weight)
    }
}

/// One side of an edge as seen from a queried node.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: String,
    pub weight: f64,
    pub labels: BTreeSet<String>,
}

impl Neighbor {
    #[inline]
    pub fn is_labeled(&self) -> bool {
        !self.labels.is_empty()
    }
}
