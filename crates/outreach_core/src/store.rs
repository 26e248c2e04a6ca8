//! Config-owning application store.
//!
//! # Responsibility
//! - Expose the record store and query engine to presentation callers.
//! - Open one scoped connection per operation and release it before return.
//! - Emit one metadata-only log event per operation.
//!
//! # Invariants
//! - No connection outlives the call that opened it, including on error.
//! - Every mutating call has committed (autocommit) when it returns `Ok`.

use crate::config::StoreConfig;
use crate::db::open_db_with_timeout;
use crate::model::application::{Application, ApplicationId, ApplicationRecord};
use crate::repo::application_repo::{ErrorKind, RepoResult, SqliteApplicationRepository};
use crate::repo::stats::{CountryCount, ResponseStats};
use crate::search::filter::FilterSet;
use crate::service::application_service::ApplicationService;
use log::{debug, error, info, warn};
use std::time::Instant;

type SqliteService<'conn> = ApplicationService<SqliteApplicationRepository<'conn>>;

/// Record store bound to one database location.
#[derive(Debug, Clone)]
pub struct ApplicationStore {
    config: StoreConfig,
}

impl ApplicationStore {
    /// Creates a store without touching storage.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Creates a store and runs [`Self::initialize`].
    pub fn open(config: StoreConfig) -> RepoResult<Self> {
        let store = Self::new(config);
        store.initialize()?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Ensures the schema exists. Safe on every startup; never drops data.
    pub fn initialize(&self) -> RepoResult<()> {
        self.with_service("store_init", |_| Ok(()))
    }

    /// Inserts `application` and returns its assigned id.
    pub fn add(&self, application: &Application) -> RepoResult<ApplicationId> {
        let id = self.with_service("application_add", |service| service.add(application))?;
        info!("event=application_add module=store status=ok id={id}");
        Ok(id)
    }

    pub fn get(&self, id: ApplicationId) -> RepoResult<ApplicationRecord> {
        self.with_service("application_get", |service| service.get(id))
    }

    /// Every record, id ascending.
    pub fn get_all(&self) -> RepoResult<Vec<ApplicationRecord>> {
        self.with_service("application_list", |service| service.get_all())
    }

    /// Replaces every field of record `id`; `NotFound` when it does not exist.
    pub fn update(&self, id: ApplicationId, application: &Application) -> RepoResult<()> {
        self.with_service("application_update", |service| {
            service.update(id, application)
        })?;
        info!("event=application_update module=store status=ok id={id}");
        Ok(())
    }

    /// Removes record `id`; unknown ids are a silent no-op.
    pub fn delete(&self, id: ApplicationId) -> RepoResult<()> {
        self.with_service("application_delete", |service| service.delete(id))?;
        info!("event=application_delete module=store status=ok id={id}");
        Ok(())
    }

    pub fn filter_exact(&self, filters: &FilterSet) -> RepoResult<Vec<ApplicationRecord>> {
        self.with_service("application_filter", |service| service.filter_exact(filters))
    }

    pub fn fetch_by_ids(&self, ids: &[ApplicationId]) -> RepoResult<Vec<ApplicationRecord>> {
        self.with_service("application_fetch", |service| service.fetch_by_ids(ids))
    }

    /// Free-text plus structured search.
    pub fn search(
        &self,
        term: Option<&str>,
        filters: &FilterSet,
    ) -> RepoResult<Vec<ApplicationRecord>> {
        self.with_service("application_search", |service| service.search(term, filters))
    }

    pub fn response_stats(&self) -> RepoResult<ResponseStats> {
        self.with_service("response_stats", |service| service.response_stats())
    }

    pub fn country_stats(&self) -> RepoResult<Vec<CountryCount>> {
        self.with_service("country_stats", |service| service.country_stats())
    }

    fn with_service<T>(
        &self,
        event: &'static str,
        f: impl FnOnce(&SqliteService<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = open_db_with_timeout(&self.config.db_path, self.config.busy_timeout)
            .map_err(Into::into)
            .and_then(|conn| {
                let repo = SqliteApplicationRepository::try_new(&conn)?;
                let service = ApplicationService::new(repo);
                f(&service)
            });

        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => debug!("event={event} module=store status=ok duration_ms={duration_ms}"),
            Err(err) => match err.kind() {
                ErrorKind::Validation | ErrorKind::NotFound => warn!(
                    "event={event} module=store status=error duration_ms={duration_ms} error_kind={:?} error={err}",
                    err.kind()
                ),
                ErrorKind::Persistence => error!(
                    "event={event} module=store status=error duration_ms={duration_ms} error_kind={:?} error={err}",
                    err.kind()
                ),
            },
        }
        result
    }
}
