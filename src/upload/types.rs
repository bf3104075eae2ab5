use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::upload::FlowError;

/// Simulated progress advances by this much per tick...
pub const PROGRESS_STEP: u8 = 5;
/// ...every this often...
pub const TICK_PERIOD_MS: u64 = 200;
/// ...but never past this while the request is in flight.
pub const PROGRESS_CEILING: u8 = 90;
/// Snapped here once the response arrives, success or not.
pub const PROGRESS_DONE: u8 = 100;

/// The file part of a submission.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One submission: exactly one file plus any accompanying text fields.
/// Built when the user submits, consumed by the multipart encoder.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: FilePayload,
    pub fields: Vec<(String, String)>,
}

impl UploadRequest {
    pub fn new(file: FilePayload) -> Self {
        Self {
            file,
            fields: Vec::new(),
        }
    }

    /// Adds a text field, skipping it entirely when the value is blank
    /// so the server sees the same body an empty form input produces.
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.fields.push((name.to_string(), value.to_string()));
        }
        self
    }
}

/// A named binary output returned by the server, base64 payload kept
/// exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub data: String,
}

impl Artifact {
    pub fn link(&self, category: Option<&str>) -> DownloadLink {
        DownloadLink {
            download: self.name.clone(),
            href: format!("data:{};base64,{}", mime_for_name(&self.name), self.data),
            category: category.map(str::to_string),
        }
    }
}

/// The two historical success shapes, resolved once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSet {
    /// A single combined archive (`zip_file` in the response).
    Archive(Artifact),
    /// Category name to file list (`files` in the response).
    Categorized(Vec<(String, Vec<Artifact>)>),
}

impl ArtifactSet {
    pub fn len(&self) -> usize {
        match self {
            ArtifactSet::Archive(_) => 1,
            ArtifactSet::Categorized(groups) => groups.iter().map(|(_, a)| a.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One link per artifact, category order preserved.
    pub fn links(&self) -> Vec<DownloadLink> {
        match self {
            ArtifactSet::Archive(artifact) => vec![artifact.link(None)],
            ArtifactSet::Categorized(groups) => groups
                .iter()
                .flat_map(|(category, artifacts)| {
                    artifacts.iter().map(|a| a.link(Some(category)))
                })
                .collect(),
        }
    }
}

/// A client-side download: the artifact bytes embedded in a `data:`
/// URI so no second round-trip is needed to save them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub download: String,
    pub href: String,
    pub category: Option<String>,
}

impl DownloadLink {
    pub fn label(&self) -> String {
        match &self.category {
            Some(category) => format!("{} · {}", category, self.download),
            None => self.download.clone(),
        }
    }

    /// Decodes the payload embedded in the href back into file bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, FlowError> {
        let payload = self
            .href
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .unwrap_or_default();
        STANDARD.decode(payload).map_err(|e| {
            FlowError::Application(format!("could not decode {}: {}", self.download, e))
        })
    }
}

/// Outcome of one submission. Never persisted across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Success {
        message: String,
        artifacts: ArtifactSet,
    },
    Failure {
        message: String,
    },
}

/// What the controller reports back to the UI thread while a request
/// is in flight.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    Progress(u8),
    Finished(UploadResult),
}

fn mime_for_name(name: &str) -> &'static str {
    match name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("zip") => "application/zip",
        Some("pdf") => "application/pdf",
        Some("txt") | Some("log") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
