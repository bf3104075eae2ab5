mod state;
mod ui;

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::mpsc::TryRecvError;

use eframe::{egui, App};
use tracing::{info, warn};

use crate::preview;
use crate::upload::{
    DownloadLink, FilePayload, FlowError, FlowEvent, UploadFlowController, UploadRequest,
    UploadResult, PROGRESS_DONE,
};
pub use state::{AppState, FlowPhase, MessageKind, PickedFile, PreviewLine, StatusLine};

#[derive(Default)]
pub struct PdfUploader {
    state: AppState,
}

impl PdfUploader {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        info!("starting PDF upload tool");
        Self::default()
    }

    /// A new file replaces the previous cycle's outcome entirely and
    /// kicks off the page-count preview on its own thread.
    pub(crate) fn on_file_picked(&mut self, path: PathBuf) {
        // One request at a time: accepting a pick mid-flight would
        // drop the running cycle's receiver and re-enable submit.
        if self.state.phase == FlowPhase::Submitting {
            return;
        }
        self.state.clear_results();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        info!(file = %name, size, "file selected");

        self.state.picked = Some(PickedFile {
            path: path.clone(),
            name,
            size,
        });
        self.state.preview = Some(PreviewLine::Pending);

        let (tx, rx) = std_mpsc::channel();
        self.state.preview_receiver = Some(rx);
        std::thread::spawn(move || {
            let outcome = fs::read(&path)
                .map_err(|e| FlowError::Preview(format!("could not read file: {}", e)))
                .and_then(|bytes| preview::pdf_page_count(&bytes));
            let _ = tx.send(outcome);
        });
    }

    pub(crate) fn start_submit(&mut self) {
        if !self.state.can_submit() {
            return;
        }
        let Some(picked) = self.state.picked.clone() else {
            return;
        };
        self.state.begin_submission();

        let bytes = match fs::read(&picked.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                // Treated like any other failed cycle so the submit
                // control comes straight back.
                self.state.apply(FlowEvent::Finished(UploadResult::Failure {
                    message: format!("could not read {}: {}", picked.name, e),
                }));
                return;
            }
        };

        let fields = self.state.fields.clone();
        let request = UploadRequest::new(FilePayload {
            name: picked.name,
            bytes,
        })
        .with_field("remove_pages", &fields.remove_pages)
        .with_field("article_ranges", &fields.article_ranges)
        .with_field("merge_pages", &fields.merge_pages)
        .with_field("year", &fields.year)
        .with_field("number", &fields.number);

        let controller = UploadFlowController::new(self.state.endpoint.trim());
        let (tx, rx) = std_mpsc::channel();
        self.state.flow_receiver = Some(rx);

        std::thread::spawn(move || match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(controller.run(request, &tx)),
            Err(e) => {
                let _ = tx.send(FlowEvent::Progress(PROGRESS_DONE));
                let _ = tx.send(FlowEvent::Finished(UploadResult::Failure {
                    message: format!("could not start worker runtime: {}", e),
                }));
            }
        });
    }

    /// Decodes the link's embedded payload and writes it wherever the
    /// user points the save dialog.
    pub(crate) fn save_link(&mut self, link: &DownloadLink) {
        let Some(target) = rfd::FileDialog::new()
            .set_file_name(&link.download)
            .save_file()
        else {
            return;
        };

        let outcome = link
            .decode_bytes()
            .and_then(|bytes| {
                fs::write(&target, bytes).map_err(|e| {
                    FlowError::Application(format!("could not save {}: {}", link.download, e))
                })
            });

        match outcome {
            Ok(()) => info!(file = %link.download, path = %target.display(), "artifact saved"),
            Err(e) => {
                warn!(file = %link.download, error = %e, "saving artifact failed");
                self.state.status = Some(StatusLine {
                    kind: MessageKind::Error,
                    text: e.to_string(),
                });
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        info!("resetting form");
        self.state.reset();
    }

    fn drain_flow_events(&mut self, ctx: &egui::Context) {
        let Some(rx) = self.state.flow_receiver.take() else {
            return;
        };
        let mut finished = false;
        while let Ok(event) = rx.try_recv() {
            finished |= matches!(event, FlowEvent::Finished(_));
            self.state.apply(event);
            ctx.request_repaint();
        }
        if !finished {
            self.state.flow_receiver = Some(rx);
        }
    }

    fn drain_preview_events(&mut self, ctx: &egui::Context) {
        let Some(rx) = self.state.preview_receiver.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(pages)) => {
                self.state.preview = Some(PreviewLine::Pages(pages));
                ctx.request_repaint();
            }
            Ok(Err(e)) => {
                warn!(error = %e, "page-count preview failed");
                self.state.preview = Some(PreviewLine::Unavailable(e.to_string()));
                ctx.request_repaint();
            }
            Err(TryRecvError::Empty) => self.state.preview_receiver = Some(rx),
            Err(TryRecvError::Disconnected) => {
                let file = self
                    .state
                    .picked
                    .as_ref()
                    .map(|p| p.name.as_str())
                    .unwrap_or("<none>");
                warn!(file = %file, "preview worker stopped without reporting an outcome");
                self.state.preview = Some(PreviewLine::Unavailable(
                    "preview worker stopped unexpectedly".to_string(),
                ));
            }
        }
    }
}

impl App for PdfUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_flow_events(ctx);
        self.drain_preview_events(ctx);

        // Channels are polled from this loop, so keep frames coming
        // while anything is still in flight.
        if self.state.flow_receiver.is_some() || self.state.preview_receiver.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::mpsc::channel;

    use super::*;

    fn app_with_in_flight_request() -> PdfUploader {
        let mut app = PdfUploader::default();
        app.state.picked = Some(PickedFile {
            path: PathBuf::from("/tmp/a.pdf"),
            name: "a.pdf".to_string(),
            size: 1024,
        });
        app.state.begin_submission();
        let (_tx, rx) = channel::<FlowEvent>();
        app.state.flow_receiver = Some(rx);
        app
    }

    #[test]
    fn file_pick_is_ignored_while_a_request_is_in_flight() {
        let mut app = app_with_in_flight_request();

        app.on_file_picked(PathBuf::from("/tmp/b.pdf"));

        assert_eq!(app.state.phase, FlowPhase::Submitting);
        assert!(!app.state.can_submit());
        assert!(app.state.flow_receiver.is_some());
        assert_eq!(app.state.picked.as_ref().unwrap().name, "a.pdf");
    }

    #[test]
    fn file_pick_after_completion_starts_a_fresh_cycle() {
        let mut app = app_with_in_flight_request();
        app.state.apply(FlowEvent::Finished(UploadResult::Failure {
            message: "boom".to_string(),
        }));

        app.on_file_picked(PathBuf::from("/tmp/b.pdf"));

        assert_eq!(app.state.phase, FlowPhase::Idle);
        assert_eq!(app.state.picked.as_ref().unwrap().name, "b.pdf");
        assert!(app.state.status.is_none());
    }
}
