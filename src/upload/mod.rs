mod controller;
mod error;
mod response;
mod types;

pub use controller::UploadFlowController;
pub use error::FlowError;
pub use types::{
    Artifact, ArtifactSet, DownloadLink, FilePayload, FlowEvent, UploadRequest, UploadResult,
    PROGRESS_DONE,
};
