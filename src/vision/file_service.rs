//! Vision adapter backed by an encoding file written by an external capture
//! process.

use super::{euclidean_distances, FeatureVector, VisionService};
use crate::commands::Outcome;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileVisionService {
    encoding_file: PathBuf,
}

impl FileVisionService {
    pub fn new(encoding_file: impl Into<PathBuf>) -> Self {
        Self {
            encoding_file: encoding_file.into(),
        }
    }
}

#[async_trait]
impl VisionService for FileVisionService {
    async fn first_face_encoding(&self) -> Outcome<FeatureVector, String> {
        let text = match tokio::fs::read_to_string(&self.encoding_file).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(
                    path = %self.encoding_file.display(),
                    error = %error,
                    "no captured encoding"
                );
                return Outcome::failure("Erro ao obter o frame da câmera".to_string())
                    .with_details(format!("{}: {}", self.encoding_file.display(), error));
            }
        };

        // One encoding per line; the first face wins.
        let Some(first) = text.lines().find(|line| !line.trim().is_empty()) else {
            return Outcome::failure("Nenhum rosto encontrado".to_string());
        };

        match FeatureVector::parse(first) {
            Ok(encoding) => {
                Outcome::success(encoding).with_log("Primeiro encoding obtido com sucesso")
            }
            Err(error) => Outcome::failure("Erro ao obter encodings".to_string())
                .with_details(error.to_string()),
        }
    }

    async fn face_distance(
        &self,
        known: &[FeatureVector],
        probe: &FeatureVector,
    ) -> anyhow::Result<Vec<f64>> {
        euclidean_distances(known, probe)
    }
}

#[cfg(test)]
#[path = "tests/file_service_tests.rs"]
mod tests;
