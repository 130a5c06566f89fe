use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatCountError {
    #[error("Cluster size must be greater than zero")]
    ZeroClusterSize,

    #[error("Header of {struct_size} bytes does not fit in a volume of {max_fs_size} bytes")]
    StructExceedsVolume { struct_size: u64, max_fs_size: u64 },

    #[error("Arithmetic overflow computing {quantity} in iteration {iteration}")]
    ArithmeticOverflow { iteration: u64, quantity: &'static str },

    #[error("Calculation oscillates: available space {available_space} repeats after iteration {iteration}")]
    Oscillation { iteration: u64, available_space: u64 },

    #[error("No fixed point within {limit} iterations")]
    IterationLimit { limit: u64 },

    #[error("Invalid volume layout: {0}")]
    InvalidLayout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
