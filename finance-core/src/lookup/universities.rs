use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{Faculty, University};

use super::cached::CachedList;
use super::source::{LookupError, LookupSource};

/// Universities and faculties, loaded independently of each other.
pub struct UniversityCache {
    source: Arc<dyn LookupSource>,
    universities: CachedList<University>,
    faculties: CachedList<Faculty>,
}

impl UniversityCache {
    pub fn new(source: Arc<dyn LookupSource>) -> Self {
        Self {
            source,
            universities: CachedList::new(),
            faculties: CachedList::new(),
        }
    }

    pub async fn load_universities(&self) -> Result<Vec<University>, LookupError> {
        if let Some(cached) = self.universities.fresh() {
            return Ok(cached);
        }

        match self.source.fetch_universities().await {
            Ok(universities) => {
                info!(count = universities.len(), "universities loaded");
                self.universities.fill(universities.clone());
                Ok(universities)
            }
            Err(e) => {
                warn!(error = %e, "could not load universities");
                self.universities.clear();
                Err(e)
            }
        }
    }

    pub async fn load_faculties(&self) -> Result<Vec<Faculty>, LookupError> {
        if let Some(cached) = self.faculties.fresh() {
            return Ok(cached);
        }

        match self.source.fetch_faculties().await {
            Ok(faculties) => {
                info!(count = faculties.len(), "faculties loaded");
                self.faculties.fill(faculties.clone());
                Ok(faculties)
            }
            Err(e) => {
                warn!(error = %e, "could not load faculties");
                self.faculties.clear();
                Err(e)
            }
        }
    }

    pub fn cached_universities(&self) -> Vec<University> {
        self.universities.items()
    }

    pub fn cached_faculties(&self) -> Vec<Faculty> {
        self.faculties.items()
    }

    pub fn is_universities_loaded(&self) -> bool {
        self.universities.is_loaded()
    }

    pub fn is_faculties_loaded(&self) -> bool {
        self.faculties.is_loaded()
    }

    pub fn faculties_for_university(
        &self,
        university_id: i64,
    ) -> Vec<Faculty> {
        self.faculties.filter(|f| f.university_id == university_id)
    }

    pub fn clear_cache(&self) {
        self.universities.clear();
        self.faculties.clear();
    }
}
