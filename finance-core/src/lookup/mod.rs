mod cached;
mod car_models;
mod governorates;
mod source;
mod universities;

pub use car_models::CarModelCache;
pub use governorates::GovernorateCache;
pub use source::{LookupError, LookupSource};
pub use universities::UniversityCache;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Brand, CarModel, Faculty, Governorate, University};

    // ── scripted source ──────────────────────────────────────────────────
    /// Serves canned lists; `fail` flips every fetch to a network error.
    #[derive(Default)]
    struct ScriptedSource {
        governorates: Vec<Governorate>,
        models: Vec<CarModel>,
        universities: Vec<University>,
        faculties: Vec<Faculty>,
        fail: Mutex<bool>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn answer<T: Clone>(
            &self,
            items: &[T],
        ) -> Result<Vec<T>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                Err(LookupError::Network("connection refused".to_string()))
            } else {
                Ok(items.to_vec())
            }
        }
    }

    #[async_trait]
    impl LookupSource for ScriptedSource {
        async fn fetch_governorates(&self) -> Result<Vec<Governorate>, LookupError> {
            self.answer(&self.governorates)
        }

        async fn fetch_car_models(&self) -> Result<Vec<CarModel>, LookupError> {
            self.answer(&self.models)
        }

        async fn fetch_universities(&self) -> Result<Vec<University>, LookupError> {
            self.answer(&self.universities)
        }

        async fn fetch_faculties(&self) -> Result<Vec<Faculty>, LookupError> {
            self.answer(&self.faculties)
        }
    }

    fn governorate(
        id: i32,
        name: &str,
    ) -> Governorate {
        Governorate {
            id,
            name: name.to_string(),
        }
    }

    fn model(
        id: &str,
        name: &str,
        brand: &str,
    ) -> CarModel {
        CarModel {
            id: id.to_string(),
            name: name.to_string(),
            brand: Brand {
                id: brand.to_lowercase(),
                name: brand.to_string(),
                image: None,
            },
            created_at: None,
            updated_at: None,
        }
    }

    fn faculty(
        id: i64,
        name: &str,
        university_id: i64,
    ) -> Faculty {
        Faculty {
            id,
            name: name.to_string(),
            university_id,
            created_at: None,
            updated_at: None,
        }
    }

    fn names(models: &[CarModel]) -> Vec<&str> {
        models.iter().map(|m| m.name.as_str()).collect()
    }

    // ── governorates ─────────────────────────────────────────────────────
    #[tokio::test]
    async fn governorates_fetch_once() {
        let source = Arc::new(ScriptedSource {
            governorates: vec![governorate(1, "Cairo"), governorate(9, "Dakahlia")],
            ..Default::default()
        });
        let cache = GovernorateCache::new(source.clone());

        cache.load().await;
        let second = cache.load().await;

        assert_eq!(second.len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded());
        assert_eq!(cache.governorate_by_id(9).map(|g| g.name), Some("Dakahlia".to_string()));
    }

    #[tokio::test]
    async fn governorate_failure_serves_fallback_and_retries() {
        let source = Arc::new(ScriptedSource {
            governorates: vec![governorate(14, "Kafr el-Sheikh")],
            ..Default::default()
        });
        source.failing(true);
        let cache = GovernorateCache::new(source.clone());

        let fallback = cache.load().await;
        assert_eq!(
            fallback.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            vec!["Cairo", "Giza", "Alexandria", "Luxor", "Aswan"]
        );
        assert!(!cache.is_loaded());

        source.failing(false);
        let fetched = cache.load().await;
        assert_eq!(fetched, vec![governorate(14, "Kafr el-Sheikh")]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn governorate_refresh_surfaces_errors_and_keeps_list() {
        let source = Arc::new(ScriptedSource {
            governorates: vec![governorate(1, "Cairo")],
            ..Default::default()
        });
        let cache = GovernorateCache::new(source.clone());
        cache.load().await;

        source.failing(true);
        assert!(cache.refresh().await.is_err());
        assert_eq!(cache.cached(), vec![governorate(1, "Cairo")]);
    }

    #[tokio::test]
    async fn governorate_clear_forces_refetch() {
        let source = Arc::new(ScriptedSource {
            governorates: vec![governorate(1, "Cairo")],
            ..Default::default()
        });
        let cache = GovernorateCache::new(source.clone());
        cache.load().await;

        cache.clear_cache();
        assert!(!cache.is_loaded());
        assert!(cache.cached().is_empty());

        cache.load().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_answers_are_cached_too() {
        let source = Arc::new(ScriptedSource::default());
        let governorates = GovernorateCache::new(source.clone());
        let models = CarModelCache::new(source.clone());
        let universities = UniversityCache::new(source.clone());

        for _ in 0..2 {
            assert!(governorates.load().await.is_empty());
            assert!(models.load().await.unwrap().is_empty());
            assert!(universities.load_universities().await.unwrap().is_empty());
        }

        assert!(governorates.is_loaded());
        assert!(models.is_loaded());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    // ── car models ───────────────────────────────────────────────────────
    #[tokio::test]
    async fn car_models_grouped_and_sorted() {
        let source = Arc::new(ScriptedSource {
            models: vec![
                model("1", "Yaris", "Toyota"),
                model("2", "Accent", "Hyundai"),
                model("3", "corolla", "Toyota"),
                model("4", "Elantra", "Hyundai"),
            ],
            ..Default::default()
        });
        let cache = CarModelCache::new(source);

        cache.load().await.unwrap();

        assert_eq!(cache.brand_names(), vec!["Hyundai", "Toyota"]);
        assert_eq!(names(&cache.models_for_brand("Toyota")), vec!["corolla", "Yaris"]);
        assert_eq!(names(&cache.models_for_brand("Hyundai")), vec!["Accent", "Elantra"]);
        assert!(cache.models_for_brand("toyota").is_empty());
        assert_eq!(cache.car_model_by_id("4").map(|m| m.name), Some("Elantra".to_string()));
    }

    #[tokio::test]
    async fn car_model_failure_empties_cache_and_reports() {
        let source = Arc::new(ScriptedSource {
            models: vec![model("1", "Yaris", "Toyota")],
            ..Default::default()
        });
        let cache = CarModelCache::new(source.clone());
        cache.load().await.unwrap();
        cache.clear_cache();

        source.failing(true);
        let err = cache.load().await.unwrap_err();

        assert_eq!(err, LookupError::Network("connection refused".to_string()));
        assert!(cache.cached().is_empty());
        assert!(cache.grouped().is_empty());
        assert!(!cache.is_loaded());
    }

    #[tokio::test]
    async fn car_models_served_from_cache_until_cleared() {
        let source = Arc::new(ScriptedSource {
            models: vec![model("1", "Yaris", "Toyota")],
            ..Default::default()
        });
        let cache = CarModelCache::new(source.clone());

        cache.load().await.unwrap();
        cache.load().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cache.clear_cache();
        assert!(cache.brand_names().is_empty());
        cache.load().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    // ── universities ─────────────────────────────────────────────────────
    #[tokio::test]
    async fn faculties_filter_by_university() {
        let source = Arc::new(ScriptedSource {
            universities: vec![University {
                id: 1,
                name: "Cairo University".to_string(),
                created_at: None,
                updated_at: None,
            }],
            faculties: vec![
                faculty(10, "Engineering", 1),
                faculty(11, "Medicine", 2),
                faculty(12, "Commerce", 1),
            ],
            ..Default::default()
        });
        let cache = UniversityCache::new(source);

        assert_eq!(cache.load_universities().await.unwrap().len(), 1);
        cache.load_faculties().await.unwrap();

        let ids: Vec<i64> = cache.faculties_for_university(1).iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert!(cache.faculties_for_university(3).is_empty());

        cache.clear_cache();
        assert!(!cache.is_universities_loaded());
        assert!(!cache.is_faculties_loaded());
        assert!(cache.cached_faculties().is_empty());
    }

    #[tokio::test]
    async fn university_failure_leaves_empty_list() {
        let source = Arc::new(ScriptedSource::default());
        source.failing(true);
        let cache = UniversityCache::new(source);

        assert!(cache.load_universities().await.is_err());
        assert!(cache.cached_universities().is_empty());
        assert!(cache.load_faculties().await.is_err());
    }
}
