use thiserror::Error;

/// Error depicting failures of the program itself, as opposed to failures to load the forecast
/// which are always rendered into the page
///
#[derive(Debug, Error)]
#[error("error while updating forecast page: {0}")]
pub struct PanelError(pub String);
