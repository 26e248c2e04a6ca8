//! Core record store and query engine for the professor outreach tracker.
//! Presentation layers call into this crate and render what it returns.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingStatus};
pub use model::application::{
    Application, ApplicationId, ApplicationRecord, ApplicationResponse, ApplicationStatus,
    IsoDate, ValidationError,
};
pub use repo::application_repo::{
    ApplicationRepository, ErrorKind, RepoError, RepoResult, SqliteApplicationRepository,
};
pub use repo::stats::{CountryCount, ResponseStats};
pub use search::engine::{refine, CandidateSet, CandidateStage, QueryEngine};
pub use search::filter::{FilterField, FilterSet, MatchMode};
pub use search::fuzzy::{FuzzyMatch, PartialRatio, Scorer, MATCH_LIMIT, MATCH_THRESHOLD};
pub use service::application_service::ApplicationService;
pub use store::ApplicationStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
