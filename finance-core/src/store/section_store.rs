use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::models::{PersonalInformation, ReferencePerson, SectionForm, UploadFile, WorkDetails};
use crate::storage::KeyValueStore;

use super::observer::{Observers, SubscriptionId};

/// Observable, persisted state for one form section.
///
/// Every mutation publishes the full snapshot to subscribers and then
/// writes it through to the [`KeyValueStore`] under
/// [`SectionForm::STORAGE_KEY`]. Storage failures are logged and
/// swallowed; the in-memory snapshot stays authoritative.
///
/// Writes are serialized per store: a mutation holds the write lock from
/// the state change until its snapshot reaches storage, so storage always
/// ends up with the latest in-memory snapshot.
///
/// Subscriber callbacks run while the publication is in progress and must
/// not call `subscribe`/`unsubscribe` on the same store.
pub struct SectionStore<T: SectionForm> {
    state: Mutex<T>,
    writes: tokio::sync::Mutex<()>,
    observers: Observers<T>,
    storage: Arc<dyn KeyValueStore>,
}

pub type PersonalInformationStore = SectionStore<PersonalInformation>;
pub type WorkDetailsStore = SectionStore<WorkDetails>;
pub type ReferencePersonStore = SectionStore<ReferencePerson>;

impl<T: SectionForm> SectionStore<T> {
    /// Restore the section from storage.
    ///
    /// A missing entry, an unreadable backend or malformed JSON all yield
    /// the default snapshot. Keys absent from stored JSON take defaults.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let initial = match storage.get(T::STORAGE_KEY).await {
            Ok(Some(json)) => serde_json::from_str::<T>(&json).unwrap_or_else(|e| {
                warn!(
                    section = T::SECTION_NAME,
                    error = %e,
                    "discarding malformed saved form data"
                );
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(section = T::SECTION_NAME, error = %e, "could not read saved form data");
                T::default()
            }
        };

        Self {
            state: Mutex::new(initial),
            writes: tokio::sync::Mutex::new(()),
            observers: Observers::new(),
            storage,
        }
    }

    /// Current snapshot.
    pub fn form_data(&self) -> T {
        self.lock().clone()
    }

    pub async fn update_field(
        &self,
        field: T::Field,
        value: impl Into<String>,
    ) {
        let value = value.into();
        self.mutate(|form| form.set_field(field, value)).await;
    }

    /// Apply several changes as one publication.
    pub async fn update_form_data(
        &self,
        update: impl FnOnce(&mut T),
    ) {
        self.mutate(update).await;
    }

    pub fn has_data(&self) -> bool {
        self.lock().has_data()
    }

    pub fn is_form_complete(&self) -> bool {
        self.lock().is_complete()
    }

    /// Back to defaults and drop the saved entry.
    pub async fn clear_form_data(&self) {
        let _write = self.writes.lock().await;
        self.publish(|form| *form = T::default());
        if let Err(e) = self.storage.remove(T::STORAGE_KEY).await {
            warn!(section = T::SECTION_NAME, error = %e, "could not remove saved form data");
        }
        debug!(section = T::SECTION_NAME, "form data cleared");
    }

    /// Back to defaults; the empty snapshot is saved like any other edit.
    pub async fn reset(&self) {
        self.mutate(|form| *form = T::default()).await;
    }

    /// The callback receives the current snapshot right away, then every
    /// later one.
    pub fn subscribe(
        &self,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let current = self.form_data();
        callback(&current);
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(
        &self,
        id: SubscriptionId,
    ) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Pretty-printed JSON of the persisted part of the snapshot.
    pub fn export_data(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.lock())
    }

    async fn mutate(
        &self,
        update: impl FnOnce(&mut T),
    ) {
        let _write = self.writes.lock().await;
        let snapshot = self.publish(update);
        self.persist(&snapshot).await;
    }

    fn publish(
        &self,
        update: impl FnOnce(&mut T),
    ) -> T {
        let mut state = self.lock();
        update(&mut *state);
        let snapshot = state.clone();
        let publication = self.observers.begin_publish();
        drop(state);
        publication.send(&snapshot);
        snapshot
    }

    async fn persist(
        &self,
        snapshot: &T,
    ) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(section = T::SECTION_NAME, error = %e, "could not serialize form data");
                return;
            }
        };

        if let Err(e) = self.storage.set(T::STORAGE_KEY, &json).await {
            warn!(section = T::SECTION_NAME, error = %e, "could not save form data");
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SectionStore<PersonalInformation> {
    pub async fn upload_card_front(
        &self,
        file: Option<UploadFile>,
    ) {
        self.mutate(|form| form.card_front_file = file).await;
    }

    pub async fn upload_card_back(
        &self,
        file: Option<UploadFile>,
    ) {
        self.mutate(|form| form.card_back_file = file).await;
    }

    /// `(front, back)` attachments currently held.
    pub fn uploaded_files(&self) -> (Option<UploadFile>, Option<UploadFile>) {
        let form = self.lock();
        (form.card_front_file.clone(), form.card_back_file.clone())
    }

    /// `true` only when both sides are attached.
    pub fn has_files(&self) -> bool {
        let form = self.lock();
        form.card_front_file.is_some() && form.card_back_file.is_some()
    }
}

impl SectionStore<ReferencePerson> {
    /// Selecting a type twice keeps a single entry.
    pub async fn add_car_type(
        &self,
        car_type: &str,
    ) {
        self.mutate(|form| form.add_car_type(car_type)).await;
    }

    pub async fn remove_car_type(
        &self,
        car_type: &str,
    ) {
        self.mutate(|form| form.remove_car_type(car_type)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{PersonalField, ReferenceField, WorkField};
    use crate::storage::{MemoryStore, StorageError};

    // ── broken storage ───────────────────────────────────────────────────
    struct UnwritableStore;

    #[async_trait]
    impl KeyValueStore for UnwritableStore {
        async fn get(
            &self,
            _key: &str,
        ) -> Result<Option<String>, StorageError> {
            Err(StorageError::Backend("read failed".to_string()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
        ) -> Result<(), StorageError> {
            Err(StorageError::Backend("quota exceeded".to_string()))
        }

        async fn remove(
            &self,
            _key: &str,
        ) -> Result<(), StorageError> {
            Err(StorageError::Backend("remove failed".to_string()))
        }
    }

    /// Holds the first write back for 50 ms.
    struct SlowFirstWrite {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl SlowFirstWrite {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryStore::new(),
                writes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl KeyValueStore for SlowFirstWrite {
        async fn get(
            &self,
            key: &str,
        ) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(
            &self,
            key: &str,
            value: &str,
        ) -> Result<(), StorageError> {
            if self.writes.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.inner.set(key, value).await
        }

        async fn remove(
            &self,
            key: &str,
        ) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &T| sink.lock().unwrap().push(v.clone()))
    }

    // ── load ─────────────────────────────────────────────────────────────
    #[tokio::test]
    async fn empty_storage_loads_defaults() {
        let store = WorkDetailsStore::load(memory()).await;
        assert_eq!(store.form_data(), WorkDetails::default());
        assert!(!store.has_data());
    }

    #[tokio::test]
    async fn malformed_json_loads_defaults() {
        let storage = memory();
        storage.set(WorkDetails::STORAGE_KEY, "{not json").await.unwrap();

        let store = WorkDetailsStore::load(storage).await;

        assert_eq!(store.form_data(), WorkDetails::default());
    }

    #[tokio::test]
    async fn partial_json_fills_missing_keys_with_defaults() {
        let storage = memory();
        storage
            .set(WorkDetails::STORAGE_KEY, r#"{"jobTitle":"Engineer"}"#)
            .await
            .unwrap();

        let store = WorkDetailsStore::load(storage).await;

        assert_eq!(store.form_data().job_title, "Engineer");
        assert_eq!(store.form_data().occupation_type, "");
    }

    #[tokio::test]
    async fn unreadable_storage_loads_defaults() {
        let store = ReferencePersonStore::load(Arc::new(UnwritableStore)).await;
        assert_eq!(store.form_data(), ReferencePerson::default());
    }

    // ── persistence ──────────────────────────────────────────────────────
    #[tokio::test]
    async fn edits_survive_reload() {
        let storage = memory();
        let store = ReferencePersonStore::load(storage.clone()).await;
        store.update_field(ReferenceField::TotalPrice, "500000").await;
        store.update_field(ReferenceField::HasSpecificCar, "no").await;
        store.add_car_type("SUV").await;
        let before = store.form_data();

        let reloaded = ReferencePersonStore::load(storage).await;

        assert_eq!(reloaded.form_data(), before);
    }

    #[tokio::test]
    async fn persisted_json_uses_camel_case_keys() {
        let storage = memory();
        let store = PersonalInformationStore::load(storage.clone()).await;
        store.update_field(PersonalField::FullName, "Mona Adel").await;

        let raw = storage.get(PersonalInformation::STORAGE_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["fullName"], "Mona Adel");
    }

    #[tokio::test]
    async fn attachments_are_not_persisted() {
        let storage = memory();
        let store = PersonalInformationStore::load(storage.clone()).await;
        store
            .upload_card_front(Some(UploadFile::new("front.png", "image/png", vec![1, 2, 3])))
            .await;
        assert!(store.uploaded_files().0.is_some());

        let raw = storage.get(PersonalInformation::STORAGE_KEY).await.unwrap().unwrap();
        assert!(!raw.contains("front.png"));

        let reloaded = PersonalInformationStore::load(storage).await;
        assert_eq!(reloaded.uploaded_files(), (None, None));
    }

    #[tokio::test]
    async fn storage_failures_keep_in_memory_state() {
        let store = WorkDetailsStore::load(Arc::new(UnwritableStore)).await;
        store.update_field(WorkField::JobTitle, "Teacher").await;
        store.clear_form_data().await;
        store.update_field(WorkField::JobTitle, "Nurse").await;

        assert_eq!(store.form_data().job_title, "Nurse");
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_edits_are_saved_in_order() {
        let storage = SlowFirstWrite::new();
        let store = WorkDetailsStore::load(storage.clone()).await;

        tokio::join!(
            store.update_field(WorkField::JobTitle, "first"),
            store.update_field(WorkField::JobTitle, "second"),
        );

        assert_eq!(store.form_data().job_title, "second");
        let reloaded = WorkDetailsStore::load(storage).await;
        assert_eq!(reloaded.form_data().job_title, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn clear_waits_for_a_slow_save() {
        let storage = SlowFirstWrite::new();
        let store = WorkDetailsStore::load(storage.clone()).await;

        tokio::join!(
            store.update_field(WorkField::JobTitle, "Teacher"),
            store.clear_form_data(),
        );

        assert_eq!(store.form_data(), WorkDetails::default());
        assert_eq!(storage.get(WorkDetails::STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_removes_saved_entry() {
        let storage = memory();
        let store = WorkDetailsStore::load(storage.clone()).await;
        store.update_field(WorkField::JobTitle, "Teacher").await;

        store.clear_form_data().await;

        assert_eq!(storage.get(WorkDetails::STORAGE_KEY).await.unwrap(), None);
        assert_eq!(store.form_data(), WorkDetails::default());
    }

    #[tokio::test]
    async fn reset_saves_the_default_snapshot() {
        let storage = memory();
        let store = WorkDetailsStore::load(storage.clone()).await;
        store.update_field(WorkField::JobTitle, "Teacher").await;

        store.reset().await;

        let raw = storage.get(WorkDetails::STORAGE_KEY).await.unwrap().unwrap();
        let saved: WorkDetails = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved, WorkDetails::default());
    }

    // ── observers ────────────────────────────────────────────────────────
    #[tokio::test]
    async fn subscriber_gets_current_then_each_change() {
        let store = WorkDetailsStore::load(memory()).await;
        store.update_field(WorkField::OccupationType, "employee").await;

        let (seen, callback) = recorder::<WorkDetails>();
        store.subscribe(callback);
        store.update_field(WorkField::JobTitle, "Engineer").await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].occupation_type, "employee");
        assert_eq!(seen[0].job_title, "");
        assert_eq!(seen[1].job_title, "Engineer");
    }

    #[tokio::test]
    async fn update_form_data_publishes_once() {
        let store = PersonalInformationStore::load(memory()).await;
        let (seen, callback) = recorder::<PersonalInformation>();
        store.subscribe(callback);

        store
            .update_form_data(|form| {
                form.full_name = "Omar".to_string();
                form.email = "omar@example.com".to_string();
            })
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].full_name, "Omar");
        assert_eq!(seen[1].email, "omar@example.com");
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let store = WorkDetailsStore::load(memory()).await;
        let (seen, callback) = recorder::<WorkDetails>();
        let id = store.subscribe(callback);

        assert!(store.unsubscribe(id));
        store.update_field(WorkField::JobTitle, "Engineer").await;

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    // ── section extras ───────────────────────────────────────────────────
    #[tokio::test]
    async fn car_types_are_idempotent() {
        let store = ReferencePersonStore::load(memory()).await;
        store.add_car_type("Sedan").await;
        store.add_car_type("Sedan").await;
        store.add_car_type("SUV").await;
        store.remove_car_type("Hatchback").await;

        assert_eq!(store.form_data().selected_car_types, vec!["Sedan", "SUV"]);

        store.remove_car_type("Sedan").await;
        assert_eq!(store.form_data().selected_car_types, vec!["SUV"]);
    }

    #[tokio::test]
    async fn has_files_needs_both_sides() {
        let store = PersonalInformationStore::load(memory()).await;
        let card = UploadFile::new("id.jpg", "image/jpeg", vec![0xff, 0xd8]);

        store.upload_card_front(Some(card.clone())).await;
        assert!(!store.has_files());

        store.upload_card_back(Some(card)).await;
        assert!(store.has_files());

        store.upload_card_front(None).await;
        assert!(!store.has_files());
    }

    #[tokio::test]
    async fn completeness_follows_section_rule() {
        let store = PersonalInformationStore::load(memory()).await;
        for (field, value) in [
            (PersonalField::FullName, "Mona Adel"),
            (PersonalField::PhoneNumber, "01001234567"),
            (PersonalField::Email, "mona@example.com"),
        ] {
            store.update_field(field, value).await;
            assert!(!store.is_form_complete());
        }

        store.update_field(PersonalField::Governorate, "Giza").await;
        assert!(store.is_form_complete());

        store.update_field(PersonalField::Email, "   ").await;
        assert!(!store.is_form_complete());
    }

    #[tokio::test]
    async fn export_is_pretty_json() {
        let store = WorkDetailsStore::load(memory()).await;
        store.update_field(WorkField::WorkPhone, "0223456789").await;

        let exported = store.export_data().unwrap();

        assert!(exported.contains('\n'));
        assert!(exported.contains(r#""workPhone": "0223456789""#));
    }
}
