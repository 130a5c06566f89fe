// Fixed-point calculation of cluster count vs. FAT size
// The FAT size depends on the cluster count and the cluster count depends on
// the space left after both FAT copies, so iterate until the space settles.

use crate::layout::VolumeLayout;
use crate::{FatCountError, SolverConfig};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Snapshot of one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IterationRow {
    pub i: u64,
    /// Bytes occupied by all clusters
    pub cluster_space: u64,
    /// Bytes occupied by both FAT copies
    pub both_fat_size: u64,
    pub cluster_count: u64,
    /// Available space the iteration started from
    pub available_space: u64,
    /// Size of a single FAT copy
    pub fat_table_size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub config: SolverConfig,
    pub rows: Vec<IterationRow>,
}

impl Solution {
    /// The converged row. `None` only for a hand-built solution without rows.
    pub fn final_row(&self) -> Option<&IterationRow> {
        self.rows.last()
    }

    pub fn iterations(&self) -> usize {
        self.rows.len()
    }

    pub fn layout(&self) -> Result<VolumeLayout, FatCountError> {
        VolumeLayout::from_solution(self)
    }
}

/// Iterate until the available space no longer changes.
///
/// Every iteration yields one row, the last one being the fixed point. The
/// loop state is the available space alone, so a value seen twice without
/// converging means the calculation cycles forever.
pub fn solve(config: &SolverConfig) -> Result<Solution, FatCountError> {
    config.validate()?;

    let base_space = config.initial_available_space()?;
    let mut available_space = base_space;
    let mut fat_table_size = 0u64;
    let mut i = 0u64;
    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    loop {
        let overflow = |quantity: &'static str| FatCountError::ArithmeticOverflow { iteration: i, quantity };

        let cluster_count = available_space
            .checked_sub(fat_table_size)
            .ok_or_else(|| overflow("cluster space"))?
            / config.cluster_size;

        fat_table_size = cluster_count
            .checked_mul(config.fat_row_size)
            .ok_or_else(|| overflow("FAT size"))?;
        let both_fat_size = fat_table_size
            .checked_mul(2)
            .ok_or_else(|| overflow("FAT size"))?;
        let cluster_space = cluster_count
            .checked_mul(config.cluster_size)
            .ok_or_else(|| overflow("cluster space"))?;

        let new_available_space = base_space
            .checked_sub(both_fat_size)
            .ok_or_else(|| overflow("available space"))?;

        debug!(
            i,
            available_space,
            cluster_count,
            fat_table_size,
            new_available_space,
            "FAT sizing iteration"
        );

        rows.push(IterationRow {
            i,
            cluster_space,
            both_fat_size,
            cluster_count,
            available_space,
            fat_table_size,
        });

        if new_available_space == available_space {
            info!(
                iterations = rows.len(),
                cluster_count,
                both_fat_size,
                "FAT sizing converged"
            );
            return Ok(Solution {
                config: config.clone(),
                rows,
            });
        }

        seen.insert(available_space);
        if seen.contains(&new_available_space) {
            return Err(FatCountError::Oscillation {
                iteration: i,
                available_space: new_available_space,
            });
        }

        if let Some(limit) = config.max_iterations {
            if rows.len() as u64 >= limit {
                return Err(FatCountError::IterationLimit { limit });
            }
        }

        available_space = new_available_space;
        i += 1;
    }
}
