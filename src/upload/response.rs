use std::collections::BTreeMap;

use serde::Deserialize;

use crate::upload::types::{Artifact, ArtifactSet};
use crate::upload::FlowError;

/// Shown when the server reports failure without an `error` field.
const DEFAULT_ERROR: &str = "The server reported an error without details";
/// Shown when a success response carries no `message`.
const DEFAULT_MESSAGE: &str = "File processed successfully";

#[derive(Debug, Deserialize)]
struct RawArtifact {
    name: String,
    data: String,
}

/// The response body as it comes off the wire. Two success shapes
/// coexist across server versions: a single combined archive under
/// `zip_file`, or a category-to-file-list map under `files`.
#[derive(Debug, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    error: Option<String>,
    zip_file: Option<RawArtifact>,
    files: Option<BTreeMap<String, Vec<RawArtifact>>>,
}

/// A success response with its shape already resolved.
#[derive(Debug)]
pub struct ResolvedSuccess {
    pub message: String,
    pub artifacts: ArtifactSet,
}

impl RawResponse {
    /// Resolves the union once, here, so nothing downstream probes
    /// optional fields. `success: false` becomes an application error.
    pub fn resolve(self) -> Result<ResolvedSuccess, FlowError> {
        if !self.success {
            return Err(FlowError::Application(
                self.error.unwrap_or_else(|| DEFAULT_ERROR.to_string()),
            ));
        }

        // The archive shape wins when a server sends both.
        let artifacts = if let Some(zip) = self.zip_file {
            ArtifactSet::Archive(zip.into())
        } else {
            ArtifactSet::Categorized(
                self.files
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(category, list)| {
                        (category, list.into_iter().map(Artifact::from).collect())
                    })
                    .collect(),
            )
        };

        Ok(ResolvedSuccess {
            message: self.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            artifacts,
        })
    }
}

impl From<RawArtifact> for Artifact {
    fn from(raw: RawArtifact) -> Self {
        Artifact {
            name: raw.name,
            data: raw.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> RawResponse {
        serde_json::from_str(body).expect("response should parse")
    }

    #[test]
    fn archive_shape_resolves_to_single_artifact() {
        let resolved = parse(
            r#"{"success": true, "message": "done",
                "zip_file": {"name": "out.zip", "data": "QUJD"}}"#,
        )
        .resolve()
        .unwrap();

        assert_eq!(resolved.message, "done");
        assert_eq!(
            resolved.artifacts,
            ArtifactSet::Archive(Artifact {
                name: "out.zip".to_string(),
                data: "QUJD".to_string(),
            })
        );
    }

    #[test]
    fn categorized_shape_resolves_per_category() {
        let resolved = parse(
            r#"{"success": true, "message": "done",
                "files": {
                    "pdf": [{"name": "a.pdf", "data": "QQ=="},
                            {"name": "b.pdf", "data": "Qg=="}],
                    "ocr": [{"name": "a.txt", "data": "Qw=="}]
                }}"#,
        )
        .resolve()
        .unwrap();

        assert_eq!(resolved.artifacts.len(), 3);
        match resolved.artifacts {
            ArtifactSet::Categorized(groups) => {
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0].0, "ocr");
                assert_eq!(groups[1].1[1].name, "b.pdf");
            }
            other => panic!("expected categorized shape, got {:?}", other),
        }
    }

    #[test]
    fn archive_wins_when_both_shapes_are_present() {
        let resolved = parse(
            r#"{"success": true,
                "zip_file": {"name": "out.zip", "data": "QUJD"},
                "files": {"pdf": [{"name": "a.pdf", "data": "QQ=="}]}}"#,
        )
        .resolve()
        .unwrap();

        assert!(matches!(resolved.artifacts, ArtifactSet::Archive(_)));
        assert_eq!(resolved.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn failure_carries_the_error_field() {
        let err = parse(r#"{"success": false, "error": "Niet-toegestaan bestandstype"}"#)
            .resolve()
            .unwrap_err();

        assert!(matches!(err, FlowError::Application(_)));
        assert_eq!(err.to_string(), "Niet-toegestaan bestandstype");
    }

    #[test]
    fn failure_without_error_field_uses_the_default() {
        let err = parse(r#"{"success": false}"#).resolve().unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_ERROR);
    }

    #[test]
    fn success_with_no_artifacts_resolves_empty() {
        let resolved = parse(r#"{"success": true, "message": "nothing to do"}"#)
            .resolve()
            .unwrap();
        assert!(resolved.artifacts.is_empty());
        assert!(resolved.artifacts.links().is_empty());
    }
}
