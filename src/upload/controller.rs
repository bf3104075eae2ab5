use std::sync::mpsc::Sender;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{info, warn};

use crate::upload::response::RawResponse;
use crate::upload::types::{
    FlowEvent, UploadRequest, UploadResult, PROGRESS_CEILING, PROGRESS_DONE, PROGRESS_STEP,
    TICK_PERIOD_MS,
};
use crate::upload::FlowError;

/// Mediates exactly one request/response cycle with the processing
/// endpoint. Progress events are cosmetic: a fixed-step ticker capped
/// below completion, snapped to done when the response lands.
#[derive(Clone)]
pub struct UploadFlowController {
    endpoint: String,
    client: Client,
    tick_period: Duration,
}

impl UploadFlowController {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
            tick_period: Duration::from_millis(TICK_PERIOD_MS),
        }
    }

    /// Runs one full cycle. Always ends with `Progress(100)` followed
    /// by `Finished(..)`, no matter how the request went, so the UI is
    /// guaranteed to leave the submitting state.
    pub async fn run(&self, request: UploadRequest, events: &Sender<FlowEvent>) {
        let file_name = request.file.name.clone();
        info!(endpoint = %self.endpoint, file = %file_name, "submitting upload");

        let result = match self.submit(request, events).await {
            Ok(result) => {
                info!(file = %file_name, "upload cycle finished");
                result
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "upload cycle failed");
                UploadResult::Failure {
                    message: e.to_string(),
                }
            }
        };

        let _ = events.send(FlowEvent::Progress(PROGRESS_DONE));
        let _ = events.send(FlowEvent::Finished(result));
    }

    async fn submit(
        &self,
        request: UploadRequest,
        events: &Sender<FlowEvent>,
    ) -> Result<UploadResult, FlowError> {
        let response_fut = self
            .client
            .post(&self.endpoint)
            .multipart(build_form(request)?)
            .send();
        tokio::pin!(response_fut);

        let mut ticker = tokio::time::interval(self.tick_period);
        // An interval's first tick completes immediately; consume it so
        // the first visible step lands one period after dispatch.
        ticker.tick().await;

        let mut progress: u8 = 0;
        let response = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    progress = (progress + PROGRESS_STEP).min(PROGRESS_CEILING);
                    let _ = events.send(FlowEvent::Progress(progress));
                }
                response = &mut response_fut => break response?,
            }
        };

        // The server returns error JSON with 4xx/5xx statuses, so the
        // body is parsed regardless of the status code.
        let raw: RawResponse = response.json().await?;
        let resolved = raw.resolve()?;
        Ok(UploadResult::Success {
            message: resolved.message,
            artifacts: resolved.artifacts,
        })
    }
}

fn build_form(request: UploadRequest) -> Result<Form, FlowError> {
    let UploadRequest { file, fields } = request;
    let part = Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str("application/pdf")?;

    let mut form = Form::new().part("file", part);
    for (name, value) in fields {
        form = form.text(name, value);
    }
    Ok(form)
}
