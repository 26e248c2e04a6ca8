//! Application use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD, search and aggregate entry points for core callers.
//! - Delegate persistence to repository implementations and free-text
//!   resolution to [`QueryEngine`].
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::application::{Application, ApplicationId, ApplicationRecord};
use crate::repo::application_repo::{ApplicationRepository, RepoError, RepoResult};
use crate::repo::stats::{CountryCount, ResponseStats};
use crate::search::engine::QueryEngine;
use crate::search::filter::FilterSet;

/// Use-case service wrapper for application records.
pub struct ApplicationService<R: ApplicationRepository> {
    repo: R,
}

impl<R: ApplicationRepository> ApplicationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and inserts a record; returns the assigned id.
    pub fn add(&self, application: &Application) -> RepoResult<ApplicationId> {
        self.repo.create_application(application)
    }

    /// Full-record replace of `id`.
    ///
    /// Returns `NotFound` when no row was affected.
    pub fn update(&self, id: ApplicationId, application: &Application) -> RepoResult<()> {
        self.repo.update_application(id, application)
    }

    /// Hard delete; idempotent for unknown ids.
    pub fn delete(&self, id: ApplicationId) -> RepoResult<()> {
        self.repo.delete_application(id)
    }

    /// Targeted fetch; unknown id is `NotFound`.
    pub fn get(&self, id: ApplicationId) -> RepoResult<ApplicationRecord> {
        self.repo
            .get_application(id)?
            .ok_or(RepoError::NotFound(id))
    }

    pub fn get_all(&self) -> RepoResult<Vec<ApplicationRecord>> {
        self.repo.list_applications()
    }

    pub fn filter_exact(&self, filters: &FilterSet) -> RepoResult<Vec<ApplicationRecord>> {
        self.repo.filter_applications(filters)
    }

    pub fn fetch_by_ids(&self, ids: &[ApplicationId]) -> RepoResult<Vec<ApplicationRecord>> {
        self.repo.fetch_by_ids(ids)
    }

    /// Free-text plus structured search; see [`QueryEngine::search`].
    pub fn search(
        &self,
        term: Option<&str>,
        filters: &FilterSet,
    ) -> RepoResult<Vec<ApplicationRecord>> {
        QueryEngine::new(&self.repo).search(term, filters)
    }

    pub fn response_stats(&self) -> RepoResult<ResponseStats> {
        self.repo.response_stats()
    }

    pub fn country_stats(&self) -> RepoResult<Vec<CountryCount>> {
        self.repo.country_stats()
    }
}
