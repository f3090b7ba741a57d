//! Limits for container decoding.

/// Sizes checked against header fields before anything is allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLimits {
    /// Maximum size the compressed frame may declare.
    pub max_decompressed_bytes: usize,
    /// Maximum plaintext size the container header may declare.
    pub max_plaintext_bytes: usize,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: 64 * 1024 * 1024,
            max_plaintext_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ContainerLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_decompressed_bytes: 1024 * 1024,
            max_plaintext_bytes: 1024 * 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_decompressed_bytes: usize::MAX,
            max_plaintext_bytes: usize::MAX,
        }
    }
}
