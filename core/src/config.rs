//! Solver configuration.
//!
//! Defaults describe a 4 GB volume with 4000 byte clusters, a 32 byte
//! header and 4 byte FAT entries.

use crate::FatCountError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_FS_SIZE: u64 = 4_294_967_295;
pub const DEFAULT_CLUSTER_SIZE: u64 = 4000;
pub const DEFAULT_STRUCT_SIZE: u64 = 32;
pub const DEFAULT_FAT_ROW_SIZE: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Total addressable space of the volume in bytes
    pub max_fs_size: u64,
    /// Bytes per cluster
    pub cluster_size: u64,
    /// Bytes reserved for the header in front of the first FAT
    pub struct_size: u64,
    /// Bytes per FAT entry
    pub fat_row_size: u64,
    /// Upper bound on emitted rows; `None` iterates until a fixed point
    /// or a repeated state is found
    pub max_iterations: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_fs_size: DEFAULT_MAX_FS_SIZE,
            cluster_size: DEFAULT_CLUSTER_SIZE,
            struct_size: DEFAULT_STRUCT_SIZE,
            fat_row_size: DEFAULT_FAT_ROW_SIZE,
            max_iterations: None,
        }
    }
}

impl SolverConfig {
    /// Check the preconditions the solver relies on.
    pub fn validate(&self) -> Result<(), FatCountError> {
        if self.cluster_size == 0 {
            return Err(FatCountError::ZeroClusterSize);
        }

        if self.struct_size > self.max_fs_size {
            return Err(FatCountError::StructExceedsVolume {
                struct_size: self.struct_size,
                max_fs_size: self.max_fs_size,
            });
        }

        Ok(())
    }

    /// Parse a (possibly partial) JSON configuration. Missing fields keep
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, FatCountError> {
        let config = Self::parse_json(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, FatCountError> {
        let config = Self::read_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Deserialize without validating, for callers that layer further
    /// overrides on top before calling [`SolverConfig::validate`].
    pub fn parse_json(json: &str) -> Result<Self, FatCountError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read_path(path: &Path) -> Result<Self, FatCountError> {
        let json = std::fs::read_to_string(path)?;
        Self::parse_json(&json)
    }

    /// Space left for clusters and both FAT copies before any table is
    /// accounted for.
    pub fn initial_available_space(&self) -> Result<u64, FatCountError> {
        self.max_fs_size
            .checked_sub(self.struct_size)
            .ok_or(FatCountError::StructExceedsVolume {
                struct_size: self.struct_size,
                max_fs_size: self.max_fs_size,
            })
    }
}
