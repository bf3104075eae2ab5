use thiserror::Error;

/// Everything that can go wrong in one upload cycle.
///
/// All variants end up as a user-visible status line; none of them
/// abort the application or leave the submit control disabled.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The request could not be sent, or the response body was not
    /// valid JSON.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with `success: false`.
    #[error("{0}")]
    Application(String),

    /// The local page-count preview could not read the file. Cosmetic
    /// only; never blocks submission.
    #[error("preview failed: {0}")]
    Preview(String),
}
