//! Two-stage search pipeline over an application repository.
//!
//! # Responsibility
//! - Candidate stage: fuzzy-rank professor emails, or fall back to a
//!   case-insensitive substring match when nothing scores.
//! - Refinement stage: keep candidates equal to every structured filter.
//! - Delegate term-less requests straight to the repository filter.
//!
//! # Invariants
//! - Substring matching runs only when the fuzzy pass yields zero matches;
//!   the two candidate sources are never merged.
//! - Fuzzy results keep rank order; substring results keep store order.

use crate::model::application::{ApplicationId, ApplicationRecord};
use crate::repo::application_repo::{ApplicationRepository, RepoResult};
use crate::search::filter::{FilterField, FilterSet, MatchMode};
use crate::search::fuzzy::{rank_matches, FuzzyMatch, PartialRatio, Scorer};
use log::debug;
use std::collections::HashMap;

/// Which candidate source produced a [`CandidateSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateStage {
    /// Ranked fuzzy matches, best first.
    Fuzzy(Vec<FuzzyMatch>),
    /// Substring fallback after an empty fuzzy pass.
    Substring,
}

/// Possibly over-inclusive records selected for a search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    pub stage: CandidateStage,
    pub records: Vec<ApplicationRecord>,
}

/// Stateless search facade; holds only the repository and scorer.
pub struct QueryEngine<'r, R: ?Sized, S = PartialRatio> {
    repo: &'r R,
    scorer: S,
}

impl<'r, R> QueryEngine<'r, R>
where
    R: ApplicationRepository + ?Sized,
{
    /// Creates an engine using partial-ratio scoring.
    pub fn new(repo: &'r R) -> Self {
        Self::with_scorer(repo, PartialRatio)
    }
}

impl<'r, R, S> QueryEngine<'r, R, S>
where
    R: ApplicationRepository + ?Sized,
    S: Scorer,
{
    pub fn with_scorer(repo: &'r R, scorer: S) -> Self {
        Self { repo, scorer }
    }

    /// Resolves `term` and `filters` into matching records.
    ///
    /// # Contract
    /// - Blank or absent term: repository filter (contains/enum semantics).
    /// - Otherwise: [`Self::select_candidates`] then [`refine`].
    ///
    /// # Errors
    /// - `Validation` for enum filter values outside their enumerations.
    /// - Storage failures from the repository.
    pub fn search(
        &self,
        term: Option<&str>,
        filters: &FilterSet,
    ) -> RepoResult<Vec<ApplicationRecord>> {
        filters.validate()?;

        let Some(term) = term.map(str::trim).filter(|value| !value.is_empty()) else {
            return self.repo.filter_applications(filters);
        };

        let candidates = self.select_candidates(term)?;
        let candidate_count = candidates.records.len();
        let stage = match candidates.stage {
            CandidateStage::Fuzzy(_) => "fuzzy",
            CandidateStage::Substring => "substring",
        };
        let results = refine(candidates.records, filters);

        debug!(
            "event=search module=search status=ok stage={} candidates={} results={} filters={}",
            stage,
            candidate_count,
            results.len(),
            filters.len()
        );
        Ok(results)
    }

    /// Candidate stage for a non-blank `term`.
    pub fn select_candidates(&self, term: &str) -> RepoResult<CandidateSet> {
        let index = self.repo.email_index()?;
        let ranked = rank_matches(&self.scorer, term, &index);

        if ranked.is_empty() {
            let by_substring = FilterSet::new().with(FilterField::ProfessorEmail, term);
            return Ok(CandidateSet {
                stage: CandidateStage::Substring,
                records: self.repo.filter_applications(&by_substring)?,
            });
        }

        let ids = ranked.iter().map(|matched| matched.id).collect::<Vec<_>>();
        let mut fetched: HashMap<ApplicationId, ApplicationRecord> = self
            .repo
            .fetch_by_ids(&ids)?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        // Rows deleted between the two reads are simply absent.
        let records = ids.iter().filter_map(|id| fetched.remove(id)).collect();

        Ok(CandidateSet {
            stage: CandidateStage::Fuzzy(ranked),
            records,
        })
    }
}

/// Refinement stage: keeps records equal to every filter value, in order.
pub fn refine(records: Vec<ApplicationRecord>, filters: &FilterSet) -> Vec<ApplicationRecord> {
    if filters.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| filters.matches(record, MatchMode::Exact))
        .collect()
}
