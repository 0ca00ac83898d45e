use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{Governorate, fallback_governorates};

use super::cached::CachedList;
use super::source::{LookupError, LookupSource};

/// Governorate list for the personal-information step.
///
/// Unlike the other caches a failed load is not an error: a short built-in
/// list is served instead and the next `load` tries the network again.
pub struct GovernorateCache {
    source: Arc<dyn LookupSource>,
    cache: CachedList<Governorate>,
}

impl GovernorateCache {
    pub fn new(source: Arc<dyn LookupSource>) -> Self {
        Self {
            source,
            cache: CachedList::new(),
        }
    }

    pub async fn load(&self) -> Vec<Governorate> {
        if let Some(cached) = self.cache.fresh() {
            return cached;
        }

        match self.source.fetch_governorates().await {
            Ok(governorates) => {
                info!(count = governorates.len(), "governorates loaded");
                self.cache.fill(governorates.clone());
                governorates
            }
            Err(e) => {
                warn!(error = %e, "governorates unavailable, using built-in list");
                let fallback = fallback_governorates();
                self.cache.stand_in(fallback.clone());
                fallback
            }
        }
    }

    /// Always hits the source. On failure the current list is kept and the
    /// error returned.
    pub async fn refresh(&self) -> Result<Vec<Governorate>, LookupError> {
        let governorates = self.source.fetch_governorates().await?;
        self.cache.fill(governorates.clone());
        Ok(governorates)
    }

    pub fn cached(&self) -> Vec<Governorate> {
        self.cache.items()
    }

    /// `true` once a fetch has succeeded; the fallback list does not count.
    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    pub fn governorate_by_id(
        &self,
        id: i32,
    ) -> Option<Governorate> {
        self.cache.find(|g| g.id == id)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
