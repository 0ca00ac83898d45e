use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::models::{CarModel, GroupedCarModels};

use super::cached::CachedList;
use super::source::{LookupError, LookupSource};

/// Car models and their per-brand grouping.
pub struct CarModelCache {
    source: Arc<dyn LookupSource>,
    models: CachedList<CarModel>,
    grouped: Mutex<GroupedCarModels>,
}

impl CarModelCache {
    pub fn new(source: Arc<dyn LookupSource>) -> Self {
        Self {
            source,
            models: CachedList::new(),
            grouped: Mutex::new(GroupedCarModels::new()),
        }
    }

    /// Fetch models on first use. A failure empties the cache and is
    /// returned to the caller.
    pub async fn load(&self) -> Result<Vec<CarModel>, LookupError> {
        if let Some(cached) = self.models.fresh() {
            return Ok(cached);
        }

        match self.source.fetch_car_models().await {
            Ok(models) => {
                info!(count = models.len(), "car models loaded");
                *self.lock_grouped() = group_by_brand(&models);
                self.models.fill(models.clone());
                Ok(models)
            }
            Err(e) => {
                warn!(error = %e, "could not load car models");
                self.clear_cache();
                Err(e)
            }
        }
    }

    pub fn cached(&self) -> Vec<CarModel> {
        self.models.items()
    }

    pub fn grouped(&self) -> GroupedCarModels {
        self.lock_grouped().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.models.is_loaded()
    }

    /// Brand names in alphabetical order.
    pub fn brand_names(&self) -> Vec<String> {
        self.lock_grouped().keys().cloned().collect()
    }

    /// Models of one brand, matched by exact name; empty for unknown brands.
    pub fn models_for_brand(
        &self,
        brand_name: &str,
    ) -> Vec<CarModel> {
        self.lock_grouped()
            .get(brand_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn car_model_by_id(
        &self,
        id: &str,
    ) -> Option<CarModel> {
        self.models.find(|m| m.id == id)
    }

    pub fn clear_cache(&self) {
        self.models.clear();
        self.lock_grouped().clear();
    }

    fn lock_grouped(&self) -> MutexGuard<'_, GroupedCarModels> {
        self.grouped.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn group_by_brand(models: &[CarModel]) -> GroupedCarModels {
    let mut grouped = GroupedCarModels::new();
    for model in models {
        grouped
            .entry(model.brand.name.clone())
            .or_default()
            .push(model.clone());
    }
    for brand_models in grouped.values_mut() {
        brand_models.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
    }
    grouped
}
