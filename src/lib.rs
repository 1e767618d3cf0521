mod commands;
mod config;
mod errors;
mod export;
mod normalize;
mod render;
mod session;
mod telemetry;
mod transport;
mod view;

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde_json::json;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use commands::{
    client_health, export_report, navigate_back, select_file, sign_out, submit_analysis,
    ClientHealth, DashboardSnapshot, ExportRequest, ANALYSIS_FAILED_NOTICE,
};
pub use config::{AppConfig, PublicAppConfig, RemoteConfig};
pub use errors::{AppError, AppResult};
pub use export::{
    build_export_document, CardStyle, ExportDocument, ExportEntry, ExportOptions, Pill, PillStyle,
    ScoreBlock, SectionBlock, TitleBlock, REPORT_FILE_NAME, REPORT_TITLE,
};
pub use normalize::{
    normalize, submission_error, AnalysisResult, JobRole, SkillCategory, SkillGap, TechnicalSkills,
};
pub use render::{
    build, display_label, RenderModel, SearchLink, Section, SectionItem, SectionKind,
    NO_GAPS_MESSAGE,
};
pub use session::{Session, SupabaseSession};
pub use telemetry::{TelemetryClient, TelemetryEvent};
pub use transport::{AnalysisTransport, HttpAnalysisTransport};
pub use view::{FileSelection, SelectedFile, ViewState, ViewStateController};

/// Startup outcome: either a ready state, or a signal to the shell that the
/// user must log in first.
pub enum Bootstrap {
    Ready(AppState),
    RedirectToLogin,
}

/// Owner of all mutable session state. The controller behind the mutex is
/// the single writer of view state, file selection, and render model; the
/// lock is never held across an await.
pub struct AppState {
    controller: Mutex<ViewStateController>,
    transport: Arc<dyn AnalysisTransport>,
    telemetry: TelemetryClient,
    config: AppConfig,
    sessions: SupabaseSession,
    user_email: Option<String>,
}

/// Initialize the client core: tracing, env config, the remote `/config`
/// fetch, and the session gate, in that order. No core state exists until a
/// session is confirmed.
pub async fn bootstrap(data_dir: &Path) -> AppResult<Bootstrap> {
    init_tracing();
    let config = AppConfig::from_env();
    let http = reqwest::Client::new();
    let remote = RemoteConfig::fetch(&http, &config.config_endpoint()).await?;
    let sessions = SupabaseSession::new(http.clone(), &remote, data_dir);

    let Some(session) = sessions.get_session().await? else {
        return Ok(Bootstrap::RedirectToLogin);
    };

    let telemetry = TelemetryClient::new(data_dir, &config)?;
    let transport = Arc::new(HttpAnalysisTransport::new(
        http,
        config.analyze_endpoint(),
        session.access_token.clone(),
    ));
    let state = AppState::new(config, transport, telemetry, sessions, session.user_email);

    if let Err(err) = state.telemetry.record(
        "app_start",
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "telemetry_enabled": state.config.telemetry_enabled_by_default,
        }),
    ) {
        warn!(?err, "failed to queue telemetry bootstrap event");
    }
    if let Err(err) = state.telemetry.flush() {
        warn!(?err, "failed to flush telemetry queue");
    }

    Ok(Bootstrap::Ready(state))
}

impl AppState {
    pub fn new(
        config: AppConfig,
        transport: Arc<dyn AnalysisTransport>,
        telemetry: TelemetryClient,
        sessions: SupabaseSession,
        user_email: Option<String>,
    ) -> Self {
        Self {
            controller: Mutex::new(ViewStateController::new()),
            transport,
            telemetry,
            config,
            sessions,
            user_email,
        }
    }

    /// Replace the file selection; legal only in the upload view.
    pub fn select_file(&self, path: &Path) -> AppResult<DashboardSnapshot> {
        self.controller.lock().select_file(path)?;
        Ok(self.dashboard_snapshot())
    }

    /// Run one analysis round-trip: guard, transport call, settle. The
    /// submit guard stays down for the duration of the call, so a second
    /// submission for the same selection cannot start.
    pub async fn submit_analysis(&self) -> AppResult<DashboardSnapshot> {
        let file = self.controller.lock().begin_submission()?;

        let raw = match self.transport.submit(&file).await {
            Ok(raw) => raw,
            Err(err) => {
                self.controller.lock().abort_submission();
                self.record_event("analysis_rejected", json!({ "reason": "transport_failure" }));
                return Err(err);
            }
        };

        let outcome = {
            let mut controller = self.controller.lock();
            controller
                .complete_submission(&raw)
                .map(|model| model.ats_score())
        };
        match outcome {
            Ok(ats_score) => {
                self.record_event(
                    "analysis_completed",
                    json!({ "status": "success", "ats_score": ats_score }),
                );
                Ok(self.dashboard_snapshot())
            }
            Err(err) => {
                self.record_event(
                    "analysis_rejected",
                    json!({ "reason": "submission_rejected" }),
                );
                Err(err)
            }
        }
    }

    /// Return to the upload view, clearing the selection and discarding the
    /// render model.
    pub fn navigate_back(&self) -> AppResult<DashboardSnapshot> {
        self.controller.lock().navigate_back()?;
        Ok(self.dashboard_snapshot())
    }

    /// Rebuild the current render model into an export document plus the
    /// fixed flattening options.
    pub fn export_report(&self) -> AppResult<ExportRequest> {
        let request = {
            let controller = self.controller.lock();
            let Some(model) = controller.model() else {
                return Err(AppError::State("dashboard is not rendered".into()));
            };
            let score_label = model.score_display().unwrap_or("0%").to_string();
            ExportRequest {
                document: build_export_document(model, &score_label),
                options: ExportOptions::default(),
            }
        };
        self.record_event(
            "report_exported",
            json!({ "blocks": request.document.block_count() }),
        );
        Ok(request)
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        self.sessions.sign_out().await?;
        self.record_event("signed_out", json!({}));
        if let Err(err) = self.telemetry.flush() {
            warn!(?err, "failed to flush telemetry queue on sign-out");
        }
        Ok(())
    }

    pub fn dashboard_snapshot(&self) -> DashboardSnapshot {
        let controller = self.controller.lock();
        DashboardSnapshot {
            view: controller.view(),
            can_submit: controller.can_submit(),
            in_flight: controller.in_flight(),
            selected_file: controller
                .selected_file()
                .map(|file| file.display_label()),
            model: controller.model().cloned(),
        }
    }

    pub fn client_health(&self) -> ClientHealth {
        ClientHealth {
            telemetry_buffer_path: self.telemetry.buffer_path().to_string_lossy().to_string(),
            telemetry_queue_depth: self.telemetry.queue_depth(),
            config: self.config.public_profile(),
            user_email: self.user_email.clone(),
            view: self.controller.lock().view(),
        }
    }

    fn record_event(&self, name: &str, payload: serde_json::Value) {
        if let Err(err) = self.telemetry.record(name, payload) {
            warn!(?err, event = name, "failed to record telemetry event");
        }
    }
}

fn init_tracing() {
    static INIT: OnceCell<()> = OnceCell::new();
    let _ = INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,career_insight=debug"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}
