//! Per-seed reachability reconstruction
//!
//! A trial's step records only say who infected whom at each step. Walking
//! them in order and attributing every infector to the seed that already owns
//! it yields, per seed, the full set of vertices it transitively infected.

use super::cascade::CascadeStep;
use super::{DiffusionError, DiffusionResult};
use crate::graph::VertexId;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// seed -> every vertex it transitively infected (the seed itself excluded)
pub type SeedDescendants = IndexMap<VertexId, BTreeSet<VertexId>>;

/// Rebuild each seed's descendant set from one trial's ordered step records.
///
/// The first record holds the seeds' direct infections. Every key of a later
/// record must already belong to exactly one seed's set; a key owned by no
/// seed, or an infectee claimed twice, means the records are corrupt.
pub fn unify(seeds: &[VertexId], steps: &[CascadeStep]) -> DiffusionResult<SeedDescendants> {
    let mut descendants: SeedDescendants = seeds.iter().map(|&s| (s, BTreeSet::new())).collect();
    // vertex -> owning seed
    let mut owner: FxHashMap<VertexId, VertexId> = FxHashMap::default();

    let Some((first, rest)) = steps.split_first() else {
        return Ok(descendants);
    };

    for (&seed, infectees) in &first.infections {
        if !descendants.contains_key(&seed) {
            return Err(DiffusionError::OrphanInfector {
                step: first.step,
                vertex: seed,
            });
        }
        claim(&mut descendants, &mut owner, first.step, seed, infectees)?;
    }

    for record in rest {
        for (&infector, infectees) in &record.infections {
            let seed = owner
                .get(&infector)
                .copied()
                .ok_or(DiffusionError::OrphanInfector {
                    step: record.step,
                    vertex: infector,
                })?;
            claim(&mut descendants, &mut owner, record.step, seed, infectees)?;
        }
    }

    Ok(descendants)
}

fn claim(
    descendants: &mut SeedDescendants,
    owner: &mut FxHashMap<VertexId, VertexId>,
    step: usize,
    seed: VertexId,
    infectees: &[VertexId],
) -> DiffusionResult<()> {
    for &v in infectees {
        if descendants.contains_key(&v) || owner.insert(v, seed).is_some() {
            return Err(DiffusionError::DuplicateInfection { step, vertex: v });
        }
        if let Some(set) = descendants.get_mut(&seed) {
            set.insert(v);
        }
    }
    Ok(())
}
