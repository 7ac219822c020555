//! Registration lifecycle management

use crate::error::{SwError, SwResult};
use crate::registration::state::{registration_path, Registration, VersionRecord};
use crate::worker::WorkerState;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where a freshly installed version ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Nothing was active; the version should activate right away
    ActivateNow,
    /// Another version is active; this one waits
    Waiting,
    /// Same version as the active one; nothing changes
    AlreadyActive,
}

/// Registration manager handles the persisted active/waiting record
pub struct RegistrationManager {
    path: PathBuf,
    scope: String,
}

impl RegistrationManager {
    /// Registration kept under `state_dir` for `scope`
    pub fn new(state_dir: impl Into<PathBuf>, scope: impl Into<String>) -> Self {
        Self {
            path: registration_path(&state_dir.into()),
            scope: scope.into(),
        }
    }

    /// Current registration, empty if none saved yet
    pub async fn load(&self) -> SwResult<Registration> {
        Ok(Registration::load(&self.path)
            .await?
            .unwrap_or_else(|| Registration::new(&self.scope)))
    }

    async fn save(&self, mut registration: Registration) -> SwResult<Registration> {
        registration.updated_at = Utc::now();
        registration.save(&self.path).await?;
        Ok(registration)
    }

    /// Record a successful install
    pub async fn record_install(&self, record: VersionRecord) -> SwResult<Placement> {
        let mut registration = self.load().await?;

        let placement = match &registration.active {
            None => Placement::ActivateNow,
            Some(active) if active.cache_name == record.cache_name => Placement::AlreadyActive,
            Some(_) => Placement::Waiting,
        };

        if placement != Placement::AlreadyActive {
            debug!("Recorded {} as waiting", record.cache_name);
            registration.waiting = Some(record);
            self.save(registration).await?;
        }
        Ok(placement)
    }

    /// Promote the waiting version to active
    pub async fn promote(&self) -> SwResult<VersionRecord> {
        let mut registration = self.load().await?;
        let mut record = registration.waiting.take().ok_or(SwError::NothingWaiting)?;

        record.activated_at = Some(Utc::now());
        if let Some(old) = registration.active.replace(record.clone()) {
            info!("{} superseded by {}", old.cache_name, record.cache_name);
        }
        self.save(registration).await?;
        Ok(record)
    }

    /// Lifecycle state a worker for `cache_name` should resume in
    pub async fn state_of(&self, cache_name: &str) -> SwResult<WorkerState> {
        let registration = self.load().await?;
        let state = if registration
            .active
            .as_ref()
            .is_some_and(|r| r.cache_name == cache_name)
        {
            WorkerState::Activated
        } else if registration
            .waiting
            .as_ref()
            .is_some_and(|r| r.cache_name == cache_name)
        {
            WorkerState::Installed
        } else {
            WorkerState::Parsed
        };
        Ok(state)
    }

    /// Forget every version
    pub async fn clear(&self) -> SwResult<()> {
        Registration::delete(&self.path).await?;
        info!("Cleared registration for {}", self.scope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> RegistrationManager {
        RegistrationManager::new(dir.path(), "https://portfolio.example")
    }

    #[tokio::test]
    async fn first_install_activates_immediately() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);

        let placement = mgr
            .record_install(VersionRecord::new("portafolio-v1.0.0", "1.0.0"))
            .await
            .unwrap();
        assert_eq!(placement, Placement::ActivateNow);
        assert_eq!(
            mgr.state_of("portafolio-v1.0.0").await.unwrap(),
            WorkerState::Installed
        );

        let active = mgr.promote().await.unwrap();
        assert!(active.activated_at.is_some());
        assert_eq!(
            mgr.state_of("portafolio-v1.0.0").await.unwrap(),
            WorkerState::Activated
        );
    }

    #[tokio::test]
    async fn second_version_waits_until_promoted() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);
        mgr.record_install(VersionRecord::new("portafolio-v1.0.0", "1.0.0"))
            .await
            .unwrap();
        mgr.promote().await.unwrap();

        let placement = mgr
            .record_install(VersionRecord::new("portafolio-v1.1.0", "1.1.0"))
            .await
            .unwrap();
        assert_eq!(placement, Placement::Waiting);

        let reg = mgr.load().await.unwrap();
        assert_eq!(reg.active.unwrap().cache_name, "portafolio-v1.0.0");
        assert_eq!(reg.waiting.unwrap().cache_name, "portafolio-v1.1.0");

        mgr.promote().await.unwrap();
        let reg = mgr.load().await.unwrap();
        assert_eq!(reg.active.unwrap().cache_name, "portafolio-v1.1.0");
        assert!(reg.waiting.is_none());
    }

    #[tokio::test]
    async fn reinstalling_active_version_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);
        mgr.record_install(VersionRecord::new("portafolio-v1.0.0", "1.0.0"))
            .await
            .unwrap();
        mgr.promote().await.unwrap();

        let placement = mgr
            .record_install(VersionRecord::new("portafolio-v1.0.0", "1.0.0"))
            .await
            .unwrap();
        assert_eq!(placement, Placement::AlreadyActive);
        assert!(mgr.load().await.unwrap().waiting.is_none());
    }

    #[tokio::test]
    async fn promote_without_waiting_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            manager(&dir).promote().await,
            Err(SwError::NothingWaiting)
        ));
    }

    #[tokio::test]
    async fn unknown_cache_is_parsed() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            manager(&dir).state_of("x-v1.0.0").await.unwrap(),
            WorkerState::Parsed
        );
    }

    #[tokio::test]
    async fn clear_forgets_everything() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);
        mgr.record_install(VersionRecord::new("portafolio-v1.0.0", "1.0.0"))
            .await
            .unwrap();
        mgr.clear().await.unwrap();
        assert!(mgr.load().await.unwrap().waiting.is_none());
    }
}
