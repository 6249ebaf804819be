//! Face encodings and the vision collaborator boundary.

pub mod file_service;

pub use file_service::FileVisionService;

use crate::commands::Outcome;
use async_trait::async_trait;
use std::fmt::{Display, Formatter};

/// Minimum number of values in a face encoding.
pub const ENCODING_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    Incomplete { len: usize },
    InvalidNumber { token: String },
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete { len } => {
                write!(f, "encoding incompleto: {} valores, minimo {}", len, ENCODING_LEN)
            }
            Self::InvalidNumber { token } => write!(f, "valor invalido no encoding: {:?}", token),
        }
    }
}

impl std::error::Error for EncodingError {}

/// A face encoding with at least [`ENCODING_LEN`] values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Result<Self, EncodingError> {
        if values.len() < ENCODING_LEN {
            return Err(EncodingError::Incomplete { len: values.len() });
        }
        Ok(Self(values))
    }

    /// Parses the comma-joined text form stored in the profiles table.
    /// Blank entries are skipped.
    pub fn parse(text: &str) -> Result<Self, EncodingError> {
        let values = text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|_| EncodingError::InvalidNumber {
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(values)
    }

    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Euclidean distance from `probe` to each of `known`.
pub fn euclidean_distances(
    known: &[FeatureVector],
    probe: &FeatureVector,
) -> anyhow::Result<Vec<f64>> {
    known
        .iter()
        .map(|candidate| {
            if candidate.0.len() != probe.0.len() {
                anyhow::bail!(
                    "encoding length mismatch: {} vs {}",
                    candidate.0.len(),
                    probe.0.len()
                );
            }
            Ok(candidate
                .0
                .iter()
                .zip(&probe.0)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt())
        })
        .collect()
}

/// External face capture and comparison.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Captures a frame and returns the encoding of the first face found.
    /// Not finding a face is a non-critical failure.
    async fn first_face_encoding(&self) -> Outcome<FeatureVector, String>;

    async fn face_distance(
        &self,
        known: &[FeatureVector],
        probe: &FeatureVector,
    ) -> anyhow::Result<Vec<f64>>;
}

#[cfg(test)]
#[path = "tests/vision_tests.rs"]
mod tests;
