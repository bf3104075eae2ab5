use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use crate::upload::{DownloadLink, FlowError, FlowEvent, UploadResult, PROGRESS_DONE};
use crate::utils::file_size::format_size;

/// The server rejects bodies above this (Flask MAX_CONTENT_LENGTH);
/// the client only warns, enforcement stays server-side.
pub const UPLOAD_LIMIT_BYTES: u64 = 40 * 1024 * 1024;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/upload";

/// One submission cycle: Idle → Submitting → (Succeeded | Failed),
/// and back to a submittable state either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: MessageKind,
    pub text: String,
}

/// The file currently sitting in the form.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// Outcome of the local page-count parse, shown inline next to the
/// selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewLine {
    Pending,
    Pages(usize),
    Unavailable(String),
}

/// Processing options sent along with the file, verbatim, as the
/// server-side form expects them.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub remove_pages: String,
    pub article_ranges: String,
    pub merge_pages: String,
    pub year: String,
    pub number: String,
}

pub struct AppState {
    pub endpoint: String,
    pub fields: FormFields,
    pub picked: Option<PickedFile>,
    pub phase: FlowPhase,
    pub progress: u8,
    pub status: Option<StatusLine>,
    pub links: Vec<DownloadLink>,
    pub preview: Option<PreviewLine>,
    pub flow_receiver: Option<Receiver<FlowEvent>>,
    pub preview_receiver: Option<Receiver<Result<usize, FlowError>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fields: FormFields::default(),
            picked: None,
            phase: FlowPhase::default(),
            progress: 0,
            status: None,
            links: Vec::new(),
            preview: None,
            flow_receiver: None,
            preview_receiver: None,
        }
    }
}

impl AppState {
    /// The submit control is live whenever a file is selected and no
    /// request is in flight.
    pub fn can_submit(&self) -> bool {
        self.picked.is_some() && self.phase != FlowPhase::Submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.phase == FlowPhase::Submitting {
            "⏳ Processing…"
        } else {
            "📤 Process File"
        }
    }

    /// Clears the outcome of the previous cycle; runs at the top of
    /// every submission and whenever a new file is picked.
    pub fn clear_results(&mut self) {
        self.phase = FlowPhase::Idle;
        self.progress = 0;
        self.status = None;
        self.links.clear();
        self.flow_receiver = None;
    }

    /// Back to initial values; only the endpoint survives.
    pub fn reset(&mut self) {
        let endpoint = std::mem::take(&mut self.endpoint);
        *self = Self {
            endpoint,
            ..Self::default()
        };
    }

    pub fn begin_submission(&mut self) {
        self.clear_results();
        self.phase = FlowPhase::Submitting;
    }

    /// Applies one controller event. Pure state, no rendering surface
    /// involved, so the cycle is testable headlessly.
    pub fn apply(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::Progress(p) => self.progress = p,
            FlowEvent::Finished(result) => {
                self.progress = PROGRESS_DONE;
                match result {
                    UploadResult::Success { message, artifacts } => {
                        self.phase = FlowPhase::Succeeded;
                        self.links = artifacts.links();
                        self.status = Some(StatusLine {
                            kind: MessageKind::Success,
                            text: message,
                        });
                    }
                    UploadResult::Failure { message } => {
                        self.phase = FlowPhase::Failed;
                        self.links.clear();
                        self.status = Some(StatusLine {
                            kind: MessageKind::Error,
                            text: message,
                        });
                    }
                }
            }
        }
    }

    pub fn progress_fraction(&self) -> f32 {
        f32::from(self.progress) / f32::from(PROGRESS_DONE)
    }

    pub fn size_warning(&self) -> Option<String> {
        let picked = self.picked.as_ref()?;
        (picked.size > UPLOAD_LIMIT_BYTES).then(|| {
            format!(
                "{} is {}, above the server's {} limit",
                picked.name,
                format_size(picked.size),
                format_size(UPLOAD_LIMIT_BYTES)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{Artifact, ArtifactSet};

    fn with_picked_file() -> AppState {
        let mut state = AppState::default();
        state.picked = Some(PickedFile {
            path: PathBuf::from("/tmp/a.pdf"),
            name: "a.pdf".to_string(),
            size: 1024,
        });
        state
    }

    fn success_with_zip() -> FlowEvent {
        FlowEvent::Finished(UploadResult::Success {
            message: "done".to_string(),
            artifacts: ArtifactSet::Archive(Artifact {
                name: "out.zip".to_string(),
                data: "QUJD".to_string(),
            }),
        })
    }

    #[test]
    fn submit_requires_a_selected_file() {
        assert!(!AppState::default().can_submit());
        assert!(with_picked_file().can_submit());
    }

    #[test]
    fn submit_is_disabled_only_while_in_flight() {
        let mut state = with_picked_file();
        state.begin_submission();
        assert!(!state.can_submit());
        assert_eq!(state.submit_label(), "⏳ Processing…");

        state.apply(success_with_zip());
        assert!(state.can_submit());
        assert_eq!(state.submit_label(), "📤 Process File");
    }

    #[test]
    fn success_renders_links_and_snaps_progress() {
        let mut state = with_picked_file();
        state.begin_submission();
        state.apply(FlowEvent::Progress(45));
        assert_eq!(state.progress, 45);

        state.apply(success_with_zip());
        assert_eq!(state.phase, FlowPhase::Succeeded);
        assert_eq!(state.progress, PROGRESS_DONE);
        assert_eq!(state.links.len(), 1);
        assert_eq!(state.links[0].href, "data:application/zip;base64,QUJD");
        assert_eq!(
            state.status,
            Some(StatusLine {
                kind: MessageKind::Success,
                text: "done".to_string()
            })
        );
    }

    #[test]
    fn failure_renders_no_links_and_reenables_submit() {
        let mut state = with_picked_file();
        state.begin_submission();
        state.apply(FlowEvent::Finished(UploadResult::Failure {
            message: "boom".to_string(),
        }));

        assert_eq!(state.phase, FlowPhase::Failed);
        assert!(state.links.is_empty());
        assert_eq!(state.status.as_ref().unwrap().text, "boom");
        assert!(state.can_submit());
    }

    #[test]
    fn new_cycle_clears_the_previous_outcome() {
        let mut state = with_picked_file();
        state.begin_submission();
        state.apply(success_with_zip());

        state.begin_submission();
        assert!(state.links.is_empty());
        assert!(state.status.is_none());
        assert_eq!(state.progress, 0);
    }

    #[test]
    fn reset_keeps_the_endpoint_only() {
        let mut state = with_picked_file();
        state.endpoint = "http://example:9/upload".to_string();
        state.fields.year = "2024".to_string();
        state.begin_submission();
        state.apply(success_with_zip());

        state.reset();
        assert_eq!(state.endpoint, "http://example:9/upload");
        assert!(state.picked.is_none());
        assert!(state.fields.year.is_empty());
        assert!(state.links.is_empty());
        assert_eq!(state.phase, FlowPhase::Idle);
    }

    #[test]
    fn oversized_files_warn_but_stay_submittable() {
        let mut state = with_picked_file();
        assert!(state.size_warning().is_none());

        state.picked.as_mut().unwrap().size = UPLOAD_LIMIT_BYTES + 1;
        assert!(state.size_warning().unwrap().contains("40.00 MB"));
        assert!(state.can_submit());
    }
}
