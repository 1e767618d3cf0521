use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::config::PublicAppConfig;
use crate::errors::AppError;
use crate::export::{ExportDocument, ExportOptions};
use crate::render::RenderModel;
use crate::view::ViewState;
use crate::AppState;

/// Generic notice for transport-level failures; rejection messages from the
/// backend are surfaced verbatim instead.
pub const ANALYSIS_FAILED_NOTICE: &str = "An error occurred during analysis.";

/// Everything the presentation layer needs to render the current view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub view: ViewState,
    pub can_submit: bool,
    pub in_flight: bool,
    /// Display label of the selected file, e.g. `Selected: resume.pdf`.
    pub selected_file: Option<String>,
    pub model: Option<RenderModel>,
}

/// Export document plus the fixed options, handed as one value to the
/// document flattening service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub document: ExportDocument,
    pub options: ExportOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHealth {
    pub telemetry_buffer_path: String,
    pub telemetry_queue_depth: usize,
    pub config: PublicAppConfig,
    pub user_email: Option<String>,
    pub view: ViewState,
}

pub fn select_file(state: &AppState, path: PathBuf) -> Result<DashboardSnapshot, String> {
    state.select_file(&path).map_err(|err| err.to_string())
}

pub async fn submit_analysis(state: &AppState) -> Result<DashboardSnapshot, String> {
    match state.submit_analysis().await {
        Ok(snapshot) => Ok(snapshot),
        Err(AppError::Rejected(message)) => Err(message),
        Err(err @ AppError::State(_)) => Err(err.to_string()),
        Err(err) => {
            warn!(?err, "analysis submission failed");
            Err(ANALYSIS_FAILED_NOTICE.to_string())
        }
    }
}

pub fn navigate_back(state: &AppState) -> Result<DashboardSnapshot, String> {
    state.navigate_back().map_err(|err| err.to_string())
}

pub fn export_report(state: &AppState) -> Result<ExportRequest, String> {
    state.export_report().map_err(|err| err.to_string())
}

pub async fn sign_out(state: &AppState) -> Result<(), String> {
    state.sign_out().await.map_err(|err| err.to_string())
}

pub fn client_health(state: &AppState) -> ClientHealth {
    state.client_health()
}
