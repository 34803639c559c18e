use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an ingestion job.
///
/// The pipeline only moves forward: `pending → scraping → downloading →
/// parsing → embedding → completed`, with `failed` reachable from any
/// non-terminal stage. `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Pending,
    Scraping,
    Downloading,
    Parsing,
    Embedding,
    Completed,
    Failed,
}

impl ProjectStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }
}

/// A submitted document link and its server-side ingestion job.
///
/// `status` is only ever copied from what the API or the push stream report;
/// it is never inferred locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub url: String,
    pub company_name: String,
    pub status: ProjectStatus,
    pub error_message: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived from `status`; recomputed on every status change.
    #[serde(rename = "isProcessing", default)]
    pub is_processing: bool,
}

impl Project {
    /// Synthetic row inserted right after the create call succeeds, before
    /// the server reports any progress.
    pub fn pending(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            company_name: company_name.into(),
            status: ProjectStatus::Pending,
            error_message: None,
            pdf_url: None,
            created_at: now,
            updated_at: now,
            is_processing: true,
        }
    }

    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        self.is_processing = !status.is_terminal();
        self.updated_at = Utc::now();
    }
}

/// Response of `POST /api/projects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectResponse {
    pub project_id: String,
    pub name: String,
    pub company_name: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ProjectStatus::Downloading).unwrap();
        assert_eq!(json, "\"downloading\"");

        let status: ProjectStatus = serde_json::from_str("\"embedding\"").unwrap();
        assert_eq!(status, ProjectStatus::Embedding);
    }

    #[test]
    fn terminal_statuses() {
        assert!(ProjectStatus::Completed.is_terminal());
        assert!(ProjectStatus::Failed.is_terminal());
        assert!(!ProjectStatus::Pending.is_terminal());
        assert!(!ProjectStatus::Embedding.is_terminal());
    }

    #[test]
    fn set_status_recomputes_processing() {
        let mut project = Project::pending("p1", "Report", "https://example.com", "Example");
        assert!(project.is_processing);

        project.set_status(ProjectStatus::Scraping);
        assert!(project.is_processing);

        project.set_status(ProjectStatus::Completed);
        assert!(!project.is_processing);
    }
}
