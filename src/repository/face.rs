//! Matching a captured face against stored profiles.

use crate::commands::Outcome;
use crate::models::Profile;
use crate::vision::{FeatureVector, VisionService};

/// Minimum similarity, in percent, for a match.
pub const DEFAULT_TOLERANCE: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    pub profile: Profile,
    pub similarity: f64,
}

pub fn similarity_percent(distance: f64) -> f64 {
    (1.0 - distance) * 100.0
}

/// Picks the most similar profile at or above `tolerance`.
///
/// No candidate above the threshold is an access denial, not a fault.
pub async fn match_face_to_profiles(
    vision: &dyn VisionService,
    candidates: Vec<(Profile, FeatureVector)>,
    probe: &FeatureVector,
    tolerance: f64,
) -> Outcome<FaceMatch, String> {
    let known: Vec<FeatureVector> = candidates.iter().map(|(_, e)| e.clone()).collect();
    let distances = match vision.face_distance(&known, probe).await {
        Ok(distances) if distances.len() == known.len() => distances,
        Ok(distances) => {
            return Outcome::fault("Erro ao comparar rosto com perfis".to_string())
                .with_details(format!(
                    "{} distancias para {} perfis",
                    distances.len(),
                    known.len()
                ))
                .with_log("Erro Match")
        }
        Err(error) => {
            tracing::error!(error = %format!("{:#}", error), "face comparison failed");
            return Outcome::fault("Erro ao comparar rosto com perfis".to_string())
                .with_details(format!("{:#}", error))
                .with_log("Erro Match");
        }
    };

    let best = candidates
        .into_iter()
        .zip(distances)
        .map(|((profile, _), distance)| (profile, similarity_percent(distance)))
        .filter(|(_, similarity)| *similarity >= tolerance)
        .max_by(|a, b| a.1.total_cmp(&b.1));

    match best {
        Some((profile, similarity)) => {
            let log = format!(
                "Rosto reconhecido como {} com {:.2}% de similaridade",
                profile.nome.as_deref().unwrap_or(&profile.id),
                similarity
            );
            Outcome::success(FaceMatch { profile, similarity }).with_log(log)
        }
        None => Outcome::failure("Acesso negado: rosto não reconhecido".to_string())
            .with_details("Nenhum perfil corresponde ao rosto detectado")
            .with_log("Acesso Negado"),
    }
}

#[cfg(test)]
#[path = "tests/face_tests.rs"]
mod tests;
