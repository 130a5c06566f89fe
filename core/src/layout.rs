// Volume layout derived from a converged solution
// Header, FAT #1, FAT #2 and the data region follow each other without gaps.

use crate::solver::Solution;
use crate::FatCountError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeLayout {
    pub volume_size: u64,
    pub cluster_size: u64,
    pub cluster_count: u64,
    /// Size of one FAT copy
    pub fat_size: u64,
    pub fat01_start: u64,
    pub fat02_start: u64,
    pub data_start: u64,
    pub data_size: u64,
    /// Bytes past the last cluster that nothing uses
    pub unused: u64,
}

impl VolumeLayout {
    pub fn from_solution(solution: &Solution) -> Result<Self, FatCountError> {
        let config = &solution.config;
        let row = solution
            .final_row()
            .ok_or_else(|| FatCountError::InvalidLayout("solution has no iterations".to_string()))?;
        let overflow = || {
            FatCountError::InvalidLayout(format!(
                "regions exceed the addressable range (FAT size {}, data size {})",
                row.fat_table_size, row.cluster_space
            ))
        };

        let fat01_start = config.struct_size;
        let fat02_start = fat01_start
            .checked_add(row.fat_table_size)
            .ok_or_else(overflow)?;
        let data_start = fat02_start
            .checked_add(row.fat_table_size)
            .ok_or_else(overflow)?;
        let data_end = data_start
            .checked_add(row.cluster_space)
            .ok_or_else(overflow)?;

        let unused = config.max_fs_size.checked_sub(data_end).ok_or_else(|| {
            FatCountError::InvalidLayout(format!(
                "data region ends at {} beyond the volume size {}",
                data_end, config.max_fs_size
            ))
        })?;

        let layout = Self {
            volume_size: config.max_fs_size,
            cluster_size: config.cluster_size,
            cluster_count: row.cluster_count,
            fat_size: row.fat_table_size,
            fat01_start,
            fat02_start,
            data_start,
            data_size: row.cluster_space,
            unused,
        };
        layout.check()?;
        Ok(layout)
    }

    /// Verify that no two regions overlap and everything fits in the volume.
    pub fn check(&self) -> Result<(), FatCountError> {
        let out_of_range = |what: &str| {
            FatCountError::InvalidLayout(format!("{} exceeds the addressable range", what))
        };

        let fat01_end = self
            .fat01_start
            .checked_add(self.fat_size)
            .ok_or_else(|| out_of_range("FAT #1"))?;
        if fat01_end > self.fat02_start {
            return Err(FatCountError::InvalidLayout(format!(
                "FAT tables overlap (fat01 start {}, fat02 start {}, FAT size {})",
                self.fat01_start, self.fat02_start, self.fat_size
            )));
        }

        let fat02_end = self
            .fat02_start
            .checked_add(self.fat_size)
            .ok_or_else(|| out_of_range("FAT #2"))?;
        if self.data_start < fat02_end {
            return Err(FatCountError::InvalidLayout(format!(
                "data region overlaps FAT tables (data start {}, fat02 start {}, FAT size {})",
                self.data_start, self.fat02_start, self.fat_size
            )));
        }

        let clusters_size = self
            .cluster_count
            .checked_mul(self.cluster_size)
            .ok_or_else(|| out_of_range("cluster space"))?;
        if self.data_size != clusters_size {
            return Err(FatCountError::InvalidLayout(format!(
                "data size {} does not hold {} clusters of {} bytes",
                self.data_size, self.cluster_count, self.cluster_size
            )));
        }

        let total = self
            .data_start
            .checked_add(self.data_size)
            .and_then(|end| end.checked_add(self.unused))
            .ok_or_else(|| out_of_range("data region"))?;
        if total != self.volume_size {
            return Err(FatCountError::InvalidLayout(format!(
                "regions do not add up to the volume size {}",
                self.volume_size
            )));
        }

        Ok(())
    }

    /// Whole clusters that would still fit into the unused tail.
    pub fn spare_clusters(&self) -> u64 {
        if self.cluster_size == 0 {
            return 0;
        }
        self.unused / self.cluster_size
    }
}
