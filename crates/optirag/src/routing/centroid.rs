//! Centroid metadata format
//!
//! Each vector database advertises one representative embedding (its
//! centroid) in a JSON document stored in the blob store:
//!
//! ```json
//! {
//!   "databases": {
//!     "QdrantVectorDBStorage": { "centroid": [0.1, 0.2, 0.3] },
//!     "WeaviateDBVectorStorage": { "centroid": [0.9, 0.8, 0.7] }
//!   }
//! }
//! ```
//!
//! This is a persisted/exchanged format; field names and shape are fixed.
//! A missing or empty `"databases"` mapping means "no centroid data".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known blob key of the centroid document.
pub const CENTROID_KEY: &str = "centroids/databases.json";

/// One database's entry in the centroid document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidEntry {
    /// Representative embedding vector
    pub centroid: Vec<f32>,
}

/// The full centroid document.
///
/// `databases` preserves document order, which makes the router's
/// tie-break (first entry wins at equal distance) deterministic and
/// reproducible across fetches of the same document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CentroidSet {
    #[serde(default)]
    pub databases: IndexMap<String, CentroidEntry>,
}

impl CentroidSet {
    /// Parse a centroid document from raw blob bytes (UTF-8 JSON).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serialize back to the wire format.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// True when there is no usable centroid data.
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    /// Insert an entry, keeping insertion order.
    pub fn insert(&mut self, name: impl Into<String>, centroid: Vec<f32>) {
        self.databases
            .insert(name.into(), CentroidEntry { centroid });
    }
}

/// Euclidean (L2) distance between two vectors of equal length.
///
/// Callers check dimensionality first; comparing vectors of different
/// lengths is a configuration bug, not a routing outcome.
pub(crate) fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_identical() {
        let a = vec![1.0, 2.0, 3.0];
        let dist = euclidean_distance(&a, &a);
        assert!(dist.abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_known_distance() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        let dist = euclidean_distance(&a, &b);
        assert!((dist - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_wire_format() {
        let raw = br#"{"databases": {"db_a": {"centroid": [0.0, 1.0]}, "db_b": {"centroid": [1.0, 0.0]}}}"#;
        let set = CentroidSet::from_slice(raw).unwrap();
        assert_eq!(set.databases.len(), 2);
        assert_eq!(set.databases["db_a"].centroid, vec![0.0, 1.0]);
    }

    #[test]
    fn test_missing_databases_key_is_empty() {
        let set = CentroidSet::from_slice(b"{}").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_document_order_preserved() {
        let raw = br#"{"databases": {"z": {"centroid": [0.0]}, "a": {"centroid": [1.0]}, "m": {"centroid": [2.0]}}}"#;
        let set = CentroidSet::from_slice(raw).unwrap();
        let names: Vec<&str> = set.databases.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let mut set = CentroidSet::default();
        set.insert("db_a", vec![0.125, -3.5, 7.25]);
        set.insert("db_b", vec![1.5, 2.5]);

        let encoded = set.to_vec().unwrap();
        let decoded = CentroidSet::from_slice(&encoded).unwrap();

        assert_eq!(decoded.databases.len(), 2);
        for (name, entry) in &set.databases {
            let other = &decoded.databases[name];
            assert_eq!(entry.centroid.len(), other.centroid.len());
            for (x, y) in entry.centroid.iter().zip(other.centroid.iter()) {
                assert!((x - y).abs() < 1e-6);
            }
        }
    }
}
