use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::normalize::{normalize, submission_error};
use crate::render::{build, RenderModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Upload,
    Dashboard,
}

impl ViewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Upload => "upload",
            ViewState::Dashboard => "dashboard",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl SelectedFile {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "resume".to_string());
        Self { path, file_name }
    }

    /// Label shown next to the drop zone, e.g. `Selected: resume.pdf`.
    pub fn display_label(&self) -> String {
        format!("Selected: {}", self.file_name)
    }
}

/// At most one selected file; replaced wholesale on every selection event and
/// cleared when navigating back to the upload view.
#[derive(Debug, Default)]
pub struct FileSelection {
    selected: Option<SelectedFile>,
}

impl FileSelection {
    pub fn replace(&mut self, file: SelectedFile) {
        self.selected = Some(file);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }
}

/// Two-state view machine. Owns the file selection and the current render
/// model; the three transitions below are the only paths that mutate either.
///
/// Submission is split into `begin`/`complete` so the transport call can run
/// outside any lock while the controller still refuses a second in-flight
/// submission.
#[derive(Debug)]
pub struct ViewStateController {
    view: ViewState,
    selection: FileSelection,
    model: Option<RenderModel>,
    in_flight: bool,
}

impl Default for ViewStateController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStateController {
    pub fn new() -> Self {
        Self {
            view: ViewState::Upload,
            selection: FileSelection::default(),
            model: None,
            in_flight: false,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn can_submit(&self) -> bool {
        self.selection.can_submit() && !self.in_flight
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn model(&self) -> Option<&RenderModel> {
        self.model.as_ref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selection.selected()
    }

    /// Replace the file selection. Legal only in the upload view.
    pub fn select_file(&mut self, path: &Path) -> AppResult<()> {
        if self.view != ViewState::Upload {
            return Err(AppError::State(
                "files can only be selected in the upload view".into(),
            ));
        }
        if self.in_flight {
            return Err(AppError::State("analysis already in progress".into()));
        }
        self.selection.replace(SelectedFile::new(path.to_path_buf()));
        Ok(())
    }

    /// Start a submission: checks the guards, marks the controller busy, and
    /// hands back the file for the transport call.
    pub fn begin_submission(&mut self) -> AppResult<SelectedFile> {
        if self.view != ViewState::Upload {
            return Err(AppError::State(
                "submissions are only accepted from the upload view".into(),
            ));
        }
        if self.in_flight {
            return Err(AppError::State("analysis already in progress".into()));
        }
        let Some(file) = self.selection.selected() else {
            return Err(AppError::State("no file selected".into()));
        };
        let file = file.clone();
        self.in_flight = true;
        Ok(file)
    }

    /// Settle a submission with the raw transport payload. A payload carrying
    /// a truthy `error` field keeps the upload view and surfaces the message;
    /// anything else normalizes, builds the render model, and switches to the
    /// dashboard.
    pub fn complete_submission(&mut self, raw: &Value) -> AppResult<&RenderModel> {
        self.in_flight = false;
        if let Some(message) = submission_error(raw) {
            return Err(AppError::Rejected(message));
        }
        let result = normalize(raw);
        self.view = ViewState::Dashboard;
        Ok(&*self.model.insert(build(&result)))
    }

    /// Settle a submission that never produced a payload. The view and the
    /// current render model are left untouched.
    pub fn abort_submission(&mut self) {
        self.in_flight = false;
    }

    /// Return to the upload view, clearing the selection and discarding the
    /// render model; the next analysis rebuilds it from scratch.
    pub fn navigate_back(&mut self) -> AppResult<()> {
        if self.view != ViewState::Dashboard {
            return Err(AppError::State("already in the upload view".into()));
        }
        self.view = ViewState::Upload;
        self.selection.clear();
        self.model = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn success_payload() -> Value {
        json!({
            "ats_score": 72,
            "technical_skills": { "Languages": ["Go", "Rust"] },
            "soft_skills": ["Communication"],
            "missing_skills": [],
            "job_roles": [{ "title": "Backend Engineer", "description": "Builds services" }]
        })
    }

    #[test]
    fn submission_requires_a_selected_file() {
        let mut controller = ViewStateController::new();
        assert!(!controller.can_submit());
        assert!(matches!(
            controller.begin_submission(),
            Err(AppError::State(_))
        ));
        assert_eq!(controller.view(), ViewState::Upload);
    }

    #[test]
    fn successful_submission_reaches_dashboard() {
        let mut controller = ViewStateController::new();
        controller.select_file(Path::new("/tmp/resume.pdf")).unwrap();
        assert!(controller.can_submit());

        let file = controller.begin_submission().unwrap();
        assert_eq!(file.file_name, "resume.pdf");
        assert_eq!(file.display_label(), "Selected: resume.pdf");
        assert!(!controller.can_submit());

        controller.complete_submission(&success_payload()).unwrap();
        assert_eq!(controller.view(), ViewState::Dashboard);
        assert!(controller.model().is_some());
    }

    #[test]
    fn second_submission_is_refused_while_in_flight() {
        let mut controller = ViewStateController::new();
        controller.select_file(Path::new("/tmp/resume.pdf")).unwrap();
        controller.begin_submission().unwrap();
        assert!(matches!(
            controller.begin_submission(),
            Err(AppError::State(_))
        ));
    }

    #[test]
    fn rejected_payload_keeps_upload_view_and_model_untouched() {
        let mut controller = ViewStateController::new();
        controller.select_file(Path::new("/tmp/resume.pdf")).unwrap();
        controller.begin_submission().unwrap();

        let err = controller
            .complete_submission(&json!({ "error": "Invalid file type" }))
            .unwrap_err();
        assert!(matches!(err, AppError::Rejected(message) if message == "Invalid file type"));
        assert_eq!(controller.view(), ViewState::Upload);
        assert!(controller.model().is_none());
        // Selection survives a rejection; the user can retry.
        assert!(controller.can_submit());
    }

    #[test]
    fn transport_failure_reenables_submit() {
        let mut controller = ViewStateController::new();
        controller.select_file(Path::new("/tmp/resume.pdf")).unwrap();
        controller.begin_submission().unwrap();
        controller.abort_submission();
        assert_eq!(controller.view(), ViewState::Upload);
        assert!(controller.can_submit());
    }

    #[test]
    fn navigate_back_clears_selection_and_model() {
        let mut controller = ViewStateController::new();
        controller.select_file(Path::new("/tmp/resume.pdf")).unwrap();
        controller.begin_submission().unwrap();
        controller.complete_submission(&success_payload()).unwrap();

        controller.navigate_back().unwrap();
        assert_eq!(controller.view(), ViewState::Upload);
        assert!(controller.model().is_none());
        assert!(!controller.can_submit());
        assert!(controller.selected_file().is_none());
    }

    #[test]
    fn selection_is_replaced_wholesale() {
        let mut controller = ViewStateController::new();
        controller.select_file(Path::new("/tmp/first.pdf")).unwrap();
        controller.select_file(Path::new("/tmp/second.docx")).unwrap();
        assert_eq!(
            controller.selected_file().unwrap().file_name,
            "second.docx"
        );
    }

    #[test]
    fn selecting_in_dashboard_is_rejected() {
        let mut controller = ViewStateController::new();
        controller.select_file(Path::new("/tmp/resume.pdf")).unwrap();
        controller.begin_submission().unwrap();
        controller.complete_submission(&success_payload()).unwrap();
        assert!(matches!(
            controller.select_file(Path::new("/tmp/other.pdf")),
            Err(AppError::State(_))
        ));
    }
}
