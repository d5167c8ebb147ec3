//! Name-indexed circuit registry.
//!
//! Circuits live for the lifetime of the process. Names are unique at all
//! times: a taken name is resolved by appending `_1`, `_2`, … rather than
//! failing or overwriting.

use std::sync::Arc;

use chrono::Utc;
use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use qmcp_ir::Circuit;

use crate::error::ToolError;

/// Shared, individually lockable circuit.
pub type CircuitHandle = Arc<Mutex<Circuit>>;

/// Row of [`CircuitRegistry::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitSummary {
    /// Qubit count.
    pub num_qubits: usize,
    /// Classical bit count.
    pub num_clbits: usize,
    /// Instruction count, barriers excluded.
    pub size: usize,
}

#[derive(Default)]
struct Entries {
    order: Vec<String>,
    circuits: FxHashMap<String, CircuitHandle>,
}

impl Entries {
    fn contains(&self, name: &str) -> bool {
        self.circuits.contains_key(name)
    }

    fn push(&mut self, name: String, circuit: Circuit) {
        self.order.push(name.clone());
        self.circuits.insert(name, Arc::new(Mutex::new(circuit)));
    }
}

/// The circuit store shared by every tool.
#[derive(Default)]
pub struct CircuitRegistry {
    entries: RwLock<Entries>,
}

impl CircuitRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty circuit and return its final name.
    pub async fn create(
        &self,
        num_qubits: u32,
        num_clbits: u32,
        requested: Option<&str>,
    ) -> String {
        self.insert(requested, Circuit::with_size("", num_qubits, num_clbits))
            .await
    }

    /// Store `circuit` under `requested` (suffixed if taken) or a generated
    /// name. The circuit is renamed to match its key.
    pub async fn insert(&self, requested: Option<&str>, mut circuit: Circuit) -> String {
        let mut entries = self.entries.write().await;
        let name = match requested {
            Some(base) => unique_name(base, |n| entries.contains(n)),
            None => loop {
                let candidate = generated_name();
                if !entries.contains(&candidate) {
                    break candidate;
                }
            },
        };
        circuit.set_name(name.clone());
        entries.push(name.clone(), circuit);
        debug!(circuit = %name, total = entries.order.len(), "registered circuit");
        name
    }

    /// Look up a circuit.
    pub async fn get(&self, name: &str) -> Result<CircuitHandle, ToolError> {
        self.entries
            .read()
            .await
            .circuits
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Clone a circuit under its lock.
    pub async fn snapshot(&self, name: &str) -> Result<Circuit, ToolError> {
        let handle = self.get(name).await?;
        let circuit = handle.lock().await;
        Ok(circuit.clone())
    }

    /// Whether `name` is registered.
    pub async fn contains(&self, name: &str) -> bool {
        self.entries.read().await.contains(name)
    }

    /// Number of circuits.
    pub async fn len(&self) -> usize {
        self.entries.read().await.order.len()
    }

    /// Whether no circuit has been created.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Summaries in insertion order.
    pub async fn list(&self) -> Vec<(String, CircuitSummary)> {
        let entries = self.entries.read().await;
        let mut rows = Vec::with_capacity(entries.order.len());
        for name in &entries.order {
            if let Some(handle) = entries.circuits.get(name) {
                let circuit = handle.lock().await;
                rows.push((
                    name.clone(),
                    CircuitSummary {
                        num_qubits: circuit.num_qubits(),
                        num_clbits: circuit.num_clbits(),
                        size: circuit.size(),
                    },
                ));
            }
        }
        rows
    }
}

/// `base` if free, otherwise the first free `base_1`, `base_2`, ….
pub fn unique_name(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (1u64..)
        .map(|i| format!("{base}_{i}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// First eight hex digits of a fresh v4 UUID.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// `circuit_{unix_millis}_{short_id}`.
pub fn generated_name() -> String {
    format!("circuit_{}_{}", Utc::now().timestamp_millis(), short_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unique_name_suffixes() {
        let taken: HashSet<&str> = ["bell", "bell_1"].into_iter().collect();
        assert_eq!(unique_name("ghz", |n| taken.contains(n)), "ghz");
        assert_eq!(unique_name("bell", |n| taken.contains(n)), "bell_2");
    }

    #[test]
    fn test_generated_name_shape() {
        let name = generated_name();
        let parts: Vec<_> = name.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "circuit");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_create_and_collide() {
        let registry = CircuitRegistry::new();
        let first = registry.create(2, 2, Some("bell")).await;
        let second = registry.create(3, 0, Some("bell")).await;
        assert_eq!(first, "bell");
        assert_eq!(second, "bell_1");

        let original = registry.snapshot("bell").await.unwrap();
        assert_eq!(original.num_qubits(), 2);
        assert_eq!(original.name(), "bell");
        assert_eq!(registry.snapshot("bell_1").await.unwrap().num_qubits(), 3);
    }

    #[tokio::test]
    async fn test_generated_names_differ() {
        let registry = CircuitRegistry::new();
        let a = registry.create(1, 1, None).await;
        let b = registry.create(1, 1, None).await;
        assert_ne!(a, b);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_missing_circuit() {
        let registry = CircuitRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(
            registry.get("nope").await.unwrap_err(),
            ToolError::NotFound("nope".into())
        );
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let registry = CircuitRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.create(1, 0, Some(name)).await;
        }
        let names: Vec<_> = registry.list().await.into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
