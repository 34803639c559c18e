use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::StreamExt;
use linkchat_api::ProjectsClient;
use linkchat_types::{Project, ProjectEvent, ProjectStatus};

use crate::error::Result;
use crate::subscription::EventSubscription;

/// Canonical process-wide table of known projects and their job status.
///
/// Mutated only by API results and push events; all mutations are short
/// synchronous critical sections, never held across an await. State updated
/// after an await is always re-read under the lock, not captured beforehand.
pub struct ProjectRegistry {
    api: Arc<dyn ProjectsClient>,
    inner: RwLock<Vec<Project>>,
}

impl ProjectRegistry {
    pub fn new(api: Arc<dyn ProjectsClient>) -> Self {
        Self {
            api,
            inner: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Project>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Project>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self) -> Vec<Project> {
        self.read().clone()
    }

    pub fn get(&self, project_id: &str) -> Option<Project> {
        self.read().iter().find(|p| p.id == project_id).cloned()
    }

    pub fn set_all(&self, projects: Vec<Project>) {
        *self.write() = projects;
    }

    /// Replace the row with the same id, or prepend a new one.
    pub fn upsert(&self, project: Project) {
        let mut projects = self.write();
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project,
            None => projects.insert(0, project),
        }
    }

    /// Apply a mutation to the current row. Returns false when the id is
    /// unknown.
    pub fn update<F>(&self, project_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Project),
    {
        let mut projects = self.write();
        match projects.iter_mut().find(|p| p.id == project_id) {
            Some(project) => {
                f(project);
                true
            }
            None => false,
        }
    }

    /// Fold one push event into the registry.
    ///
    /// Status is copied, never inferred: `Status` overwrites, `Complete`
    /// forces `completed`, `Error` forces `failed` with the server's detail.
    /// `Progress` is telemetry and leaves the registry untouched.
    pub fn apply_event(&self, project_id: &str, event: &ProjectEvent) {
        match event {
            ProjectEvent::Status { status, .. } => {
                self.update(project_id, |p| p.set_status(*status));
            }
            ProjectEvent::Complete { .. } => {
                self.update(project_id, |p| p.set_status(ProjectStatus::Completed));
            }
            ProjectEvent::Error { error } => {
                self.update(project_id, |p| {
                    p.set_status(ProjectStatus::Failed);
                    p.error_message = Some(error.clone());
                });
            }
            ProjectEvent::Progress { .. } => {}
        }
    }

    /// Replace the table with the server's list. A failed fetch leaves the
    /// prior state untouched.
    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let projects = self.api.list_projects().await?;
        self.set_all(projects.clone());
        Ok(projects)
    }

    pub async fn fetch_project(&self, project_id: &str) -> Result<Project> {
        let project = self.api.get_project(project_id).await?;
        self.upsert(project.clone());
        Ok(project)
    }

    /// Start an ingestion job and insert a synthetic `pending` row before
    /// returning, so a caller can navigate to it without waiting for the
    /// first push event.
    pub async fn create(&self, url: &str, name: Option<&str>) -> Result<Project> {
        let created = self.api.create_project(url, name).await?;
        let project = Project::pending(created.project_id, created.name, url, created.company_name);
        self.upsert(project.clone());
        Ok(project)
    }

    /// Open one push connection for the project and keep the registry in
    /// sync with every event before forwarding it to `handler`.
    ///
    /// The connection closes itself on `Complete`/`Error`; transport errors
    /// degrade into a synthetic `Connection error` event. The returned
    /// subscription's `unsubscribe` is idempotent.
    pub fn subscribe<F>(self: &Arc<Self>, project_id: &str, mut handler: F) -> EventSubscription
    where
        F: FnMut(ProjectEvent) + Send + 'static,
    {
        let registry = Arc::clone(self);
        let api = Arc::clone(&self.api);
        let project_id = project_id.to_string();

        let handle = tokio::spawn(async move {
            let mut events = match api.project_events(&project_id).await {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!("Failed to open push stream for {}: {}", project_id, e);
                    let event = ProjectEvent::Error {
                        error: "Connection error".to_string(),
                    };
                    registry.apply_event(&project_id, &event);
                    handler(event);
                    return;
                }
            };

            while let Some(item) = events.next().await {
                let event = match item {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Push stream transport error for {}: {}", project_id, e);
                        ProjectEvent::Error {
                            error: "Connection error".to_string(),
                        }
                    }
                };

                let terminal = event.is_terminal();
                registry.apply_event(&project_id, &event);
                handler(event);
                if terminal {
                    break;
                }
            }
        });

        EventSubscription::new(handle)
    }
}
