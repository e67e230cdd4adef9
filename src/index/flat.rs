//! Exact linear-scan index.

use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};

use crate::error::Result;
use crate::index::{Ranked, VectorIndex};
use crate::vector::DistanceMetric;

#[derive(Debug)]
struct Slot {
    id: String,
    seq: u64,
    vector: Vec<f64>,
}

/// Exact nearest-neighbor index backed by a dense slot vector.
///
/// Every query computes the distance to every indexed vector, which is
/// correct at any scale. Maintenance is O(1) per mutation: inserts append a
/// slot, removals swap-remove and patch the id map.
#[derive(Debug)]
pub struct FlatIndex {
    metric: DistanceMetric,
    slots: Vec<Slot>,
    positions: AHashMap<String, usize>,
}

impl FlatIndex {
    /// Create an empty index for the given metric.
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            slots: Vec::new(),
            positions: AHashMap::new(),
        }
    }

    /// The metric this index ranks by.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Whether the index holds a vector for the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }
}

impl VectorIndex for FlatIndex {
    fn upsert(&mut self, id: &str, seq: u64, vector: Vec<f64>) {
        match self.positions.get(id) {
            Some(&position) => {
                let slot = &mut self.slots[position];
                slot.seq = seq;
                slot.vector = vector;
            }
            None => {
                self.positions.insert(id.to_string(), self.slots.len());
                self.slots.push(Slot {
                    id: id.to_string(),
                    seq,
                    vector,
                });
            }
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let Some(position) = self.positions.remove(id) else {
            return false;
        };

        self.slots.swap_remove(position);
        if position < self.slots.len() {
            // The former last slot moved into the vacated position.
            self.positions
                .insert(self.slots[position].id.clone(), position);
        }
        true
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn rank(&self, query: &[f64], candidates: Option<&AHashSet<String>>) -> Result<Vec<Ranked>> {
        let eligible: Vec<&Slot> = match candidates {
            Some(ids) => self
                .slots
                .iter()
                .filter(|slot| ids.contains(slot.id.as_str()))
                .collect(),
            None => self.slots.iter().collect(),
        };

        let vectors: Vec<&[f64]> = eligible.iter().map(|slot| slot.vector.as_slice()).collect();
        let distances = self.metric.batch_distance(query, &vectors)?;

        let mut ranked: Vec<Ranked> = eligible
            .iter()
            .zip(distances)
            .map(|(slot, distance)| Ranked {
                id: slot.id.clone(),
                seq: slot.seq,
                distance,
            })
            .collect();

        // Distances are finite here: vectors are validated on the way in.
        ranked.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.seq.cmp(&b.seq))
        });

        Ok(ranked)
    }
}
