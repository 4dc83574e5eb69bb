//! Derivative generation outcomes.
//!
//! Generation is best effort: the caller gets either the full set of
//! derivatives or a [`PartialFailure`] that still lists what was written. The
//! upload itself never fails because of it.

use showcase_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum DerivativeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode derivative: {0}")]
    Encode(String),

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("Failed to store derivative: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Processing task failed: {0}")]
    Task(String),
}

/// One resized copy in the source format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub width: u32,
    pub key: String,
}

/// Derivatives actually written to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivatives {
    pub variants: Vec<Variant>,
    pub webp: Vec<String>,
    pub thumbnail: Option<String>,
}

impl Derivatives {
    pub fn keys(&self) -> Vec<&str> {
        self.variants
            .iter()
            .map(|v| v.key.as_str())
            .chain(self.webp.iter().map(String::as_str))
            .chain(self.thumbnail.as_deref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len() + self.webp.len() + usize::from(self.thumbnail.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct DerivativeFailure {
    /// Key the derivative would have been written to, or the original key
    /// when the source itself could not be processed.
    pub key: String,
    pub error: DerivativeError,
}

#[derive(Debug, thiserror::Error)]
#[error("{} derivative(s) failed, {} written", failures.len(), produced.len())]
pub struct PartialFailure {
    pub produced: Derivatives,
    pub failures: Vec<DerivativeFailure>,
}

impl PartialFailure {
    /// Nothing could be produced from `key`.
    pub fn total(key: &str, error: DerivativeError) -> Self {
        Self {
            produced: Derivatives::default(),
            failures: vec![DerivativeFailure {
                key: key.to_string(),
                error,
            }],
        }
    }
}
