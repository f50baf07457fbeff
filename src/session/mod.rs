use crate::backend::{Prompt, TripRepository, UploadAdapter};
use crate::error::TripError;
use crate::itinerary::Itinerary;
use crate::models::{City, Country, Document, Place};
use leptos::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where the current snapshot lives. The browser keeps it in a signal so the
/// view re-renders on replacement.
pub trait SnapshotStore {
    fn current(&self) -> Itinerary;
    fn replace(&self, next: Itinerary);
}

impl SnapshotStore for RwSignal<Itinerary> {
    fn current(&self) -> Itinerary {
        self.get_untracked()
    }

    fn replace(&self, next: Itinerary) {
        self.set(next);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SaveOutcome {
    /// The repository now holds this snapshot.
    Saved(Itinerary),
    /// Another save was running; it picks up the latest snapshot when it finishes.
    Coalesced,
}

#[derive(Default)]
struct SaveState {
    in_flight: bool,
    pending: bool,
}

/// At most one save in flight. Requests arriving meanwhile collapse into one
/// follow-up round that reads the snapshot when it starts.
#[derive(Clone, Default)]
pub struct SaveQueue {
    state: Arc<Mutex<SaveState>>,
}

impl SaveQueue {
    pub fn is_saving(&self) -> bool {
        self.lock().in_flight
    }

    /// `false` when a save is already running (the request is recorded).
    fn try_begin(&self) -> bool {
        let mut st = self.lock();
        if st.in_flight {
            st.pending = true;
            return false;
        }
        st.in_flight = true;
        true
    }

    /// Close one round. Returns `true` when another round must run.
    fn finish_round(&self, ok: bool) -> bool {
        let mut st = self.lock();
        if ok && st.pending {
            st.pending = false;
            return true;
        }
        st.in_flight = false;
        st.pending = false;
        false
    }

    fn lock(&self) -> MutexGuard<'_, SaveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Identifiers with an operation running on them, one per id. Uploads are
/// tracked per city and detaches per document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InFlight(HashSet<String>);

impl InFlight {
    /// `false` when `id` is already in flight.
    pub fn begin(&mut self, id: &str) -> bool {
        self.0.insert(id.to_string())
    }

    pub fn finish(&mut self, id: &str) {
        self.0.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }
}

/// A file picked or dropped by the user.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn check_size(&self, max_bytes: u64) -> Result<(), TripError> {
        if self.size() > max_bytes {
            return Err(TripError::Storage(format!(
                "{} is larger than {} MB",
                self.name,
                max_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }
}

/// Editing session for one trip: owns the snapshot store and talks to the
/// collaborators. Owner and trip ids are explicit, never ambient.
#[derive(Clone)]
pub struct TripSession<S, R, U> {
    owner_id: String,
    trip_id: String,
    name: String,
    description: String,
    store: S,
    repo: R,
    uploader: U,
    saves: SaveQueue,
    detaching: Arc<Mutex<InFlight>>,
}

impl<S, R, U> TripSession<S, R, U>
where
    S: SnapshotStore,
    R: TripRepository,
    U: UploadAdapter,
{
    pub fn new(
        owner_id: &str,
        trip_id: &str,
        name: &str,
        description: &str,
        store: S,
        repo: R,
        uploader: U,
    ) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            trip_id: trip_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            store,
            repo,
            uploader,
            saves: SaveQueue::default(),
            detaching: Arc::default(),
        }
    }

    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    pub fn snapshot(&self) -> Itinerary {
        self.store.current()
    }

    pub fn is_saving(&self) -> bool {
        self.saves.is_saving()
    }

    fn detaching(&self) -> MutexGuard<'_, InFlight> {
        self.detaching.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, what: &str, op: impl FnOnce(&Itinerary) -> Option<Itinerary>) -> bool {
        match op(&self.store.current()) {
            Some(next) => {
                self.store.replace(next);
                true
            }
            None => {
                tracing::debug!(trip_id = %self.trip_id, "ignored {what}");
                false
            }
        }
    }

    pub fn select_country(&self, name: &str) -> bool {
        self.apply("select-country", |t| t.select_country(name))
    }

    pub fn delete_country(&self, index: usize) -> bool {
        self.apply("delete-country", |t| t.delete_country(index))
    }

    pub fn reorder_countries(&self, countries: Vec<Country>) -> bool {
        self.apply("reorder-countries", |t| t.reorder_countries(countries))
    }

    pub fn add_city(&self, country: usize, name: &str) -> bool {
        self.apply("add-city", |t| t.add_city(country, name))
    }

    pub fn delete_city(&self, country: usize, city: usize) -> bool {
        self.apply("delete-city", |t| t.delete_city(country, city))
    }

    pub fn reorder_cities(&self, country: usize, cities: Vec<City>) -> bool {
        self.apply("reorder-cities", |t| t.reorder_cities(country, cities))
    }

    pub fn add_place(&self, country: usize, city: usize, name: &str) -> bool {
        self.apply("add-place", |t| t.add_place(country, city, name))
    }

    pub fn delete_place(&self, country: usize, city: usize, place: usize) -> bool {
        self.apply("delete-place", |t| t.delete_place(country, city, place))
    }

    pub fn reorder_places(&self, country: usize, city: usize, places: Vec<Place>) -> bool {
        self.apply("reorder-places", |t| t.reorder_places(country, city, places))
    }

    pub fn attach_document(&self, country: usize, city: usize, doc: Document) -> bool {
        self.apply("attach-document", |t| t.attach_document(country, city, doc))
    }

    /// Ask for a city name, then append it to the country that was at
    /// `country` when the prompt opened.
    pub async fn prompt_city<P: Prompt>(&self, prompt: &P, country: usize) -> bool {
        let Some(country_id) = self.store.current().countries().get(country).map(|c| c.id.clone())
        else {
            return false;
        };
        let Some(name) = prompt.ask("Enter city name:").await else {
            return false;
        };

        self.apply("add-city", |t| {
            let country = t.locate_country(&country_id)?;
            t.add_city(country, &name)
        })
    }

    pub async fn prompt_place<P: Prompt>(&self, prompt: &P, country: usize, city: usize) -> bool {
        let Some(city_id) = self.store.current().city(country, city).map(|c| c.id.clone()) else {
            return false;
        };
        let Some(name) = prompt.ask("Enter place name:").await else {
            return false;
        };

        self.apply("add-place", |t| {
            let (country, city) = t.locate_city(&city_id)?;
            t.add_place(country, city, &name)
        })
    }

    /// Store the file, then attach a document record to the city with id
    /// `city_id`. Nothing is attached when the store fails. If the city
    /// disappeared while the upload ran, the stored object is released again.
    pub async fn upload_document_to(
        &self,
        city_id: &str,
        file: UploadFile,
    ) -> Result<Option<Document>, TripError> {
        if self.store.current().locate_city(city_id).is_none() {
            tracing::debug!(trip_id = %self.trip_id, %city_id, "ignored upload to missing city");
            return Ok(None);
        }

        let path = self
            .uploader
            .derive_path(&self.owner_id, &self.trip_id, city_id, &file.name);
        let size = file.size();
        let stored = match self.uploader.store(file.bytes, &file.media_type, &path).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(%path, error = %e, "upload failed");
                return Err(e);
            }
        };
        tracing::info!(%path, size, "uploaded document");

        let doc = Document::from_stored(&file.name, &file.media_type, size, stored);
        let attached = self.apply("attach-document", |t| {
            let (country, city) = t.locate_city(city_id)?;
            t.attach_document(country, city, doc.clone())
        });

        if attached {
            return Ok(Some(doc));
        }

        if let Err(e) = self.uploader.release(&doc.path).await {
            tracing::warn!(path = %doc.path, error = %e, "could not release orphaned upload");
        }
        Ok(None)
    }

    /// Release the stored object, then drop the record. On a failed release
    /// the record stays and the error is returned. A second request for a
    /// document whose release is still running is ignored.
    pub async fn detach_document(
        &self,
        country: usize,
        city: usize,
        document: usize,
    ) -> Result<bool, TripError> {
        let current = self.store.current();
        let (Some(city_ref), Some(doc)) = (
            current.city(country, city),
            current.document(country, city, document),
        ) else {
            return Ok(false);
        };
        let city_id = city_ref.id.clone();
        let doc = doc.clone();

        if !self.detaching().begin(&doc.id) {
            tracing::debug!(document_id = %doc.id, "detach already running");
            return Ok(false);
        }
        let released = self.uploader.release(&doc.path).await;
        self.detaching().finish(&doc.id);

        if let Err(e) = released {
            tracing::warn!(path = %doc.path, error = %e, "release failed, keeping document");
            return Err(e);
        }
        tracing::info!(path = %doc.path, "released document");

        Ok(self.apply("detach-document", |t| {
            let (country, city, document) = t.locate_document(&city_id, &doc.id)?;
            t.remove_document(country, city, document)
        }))
    }

    /// Push the whole tree to the repository. A request made while a save is
    /// running returns [`SaveOutcome::Coalesced`] and the running save writes
    /// once more with whatever snapshot is current at that point.
    pub async fn save(&self) -> Result<SaveOutcome, TripError> {
        if !self.saves.try_begin() {
            tracing::debug!(trip_id = %self.trip_id, "save coalesced");
            return Ok(SaveOutcome::Coalesced);
        }

        loop {
            let snapshot = self.store.current();
            let doc = snapshot.to_document(&self.name, &self.description);
            let res = self.repo.update(&self.trip_id, &doc).await;
            let again = self.saves.finish_round(res.is_ok());

            if let Err(e) = res {
                tracing::warn!(trip_id = %self.trip_id, error = %e, "save failed");
                return Err(e);
            }
            if !again {
                tracing::info!(trip_id = %self.trip_id, "trip saved");
                return Ok(SaveOutcome::Saved(snapshot));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StoredObject, Trip, TripDocument, TripDraft, TripSummary};
    use futures::channel::oneshot;
    use futures::executor::block_on;

    #[derive(Clone, Default)]
    struct MemStore(Arc<Mutex<Itinerary>>);

    impl SnapshotStore for MemStore {
        fn current(&self) -> Itinerary {
            self.0.lock().unwrap().clone()
        }

        fn replace(&self, next: Itinerary) {
            *self.0.lock().unwrap() = next;
        }
    }

    #[derive(Default)]
    struct RepoState {
        writes: Vec<TripDocument>,
        fail_next: bool,
        gate: Option<oneshot::Receiver<()>>,
    }

    #[derive(Clone, Default)]
    struct FakeRepo(Arc<Mutex<RepoState>>);

    impl FakeRepo {
        fn hold_next_update(&self, rx: oneshot::Receiver<()>) {
            self.0.lock().unwrap().gate = Some(rx);
        }

        fn writes(&self) -> Vec<TripDocument> {
            self.0.lock().unwrap().writes.clone()
        }
    }

    impl TripRepository for FakeRepo {
        async fn create(&self, _owner_id: &str, _draft: &TripDraft) -> Result<String, TripError> {
            Ok("t1".to_string())
        }

        async fn get(&self, trip_id: &str) -> Result<Trip, TripError> {
            Err(TripError::NotFound(trip_id.to_string()))
        }

        async fn update(&self, _trip_id: &str, doc: &TripDocument) -> Result<(), TripError> {
            let gate = self.0.lock().unwrap().gate.take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            let mut st = self.0.lock().unwrap();
            if st.fail_next {
                st.fail_next = false;
                return Err(TripError::Persistence("offline".to_string()));
            }
            st.writes.push(doc.clone());
            Ok(())
        }

        async fn delete(&self, _trip_id: &str) -> Result<(), TripError> {
            Ok(())
        }

        async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<TripSummary>, TripError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct UploaderState {
        stored: Vec<String>,
        released: Vec<String>,
        fail_store: bool,
        fail_release: bool,
    }

    #[derive(Clone, Default)]
    struct FakeUploader(Arc<Mutex<UploaderState>>);

    impl UploadAdapter for FakeUploader {
        async fn store(
            &self,
            _bytes: Vec<u8>,
            _media_type: &str,
            path: &str,
        ) -> Result<StoredObject, TripError> {
            let mut st = self.0.lock().unwrap();
            if st.fail_store {
                return Err(TripError::Storage("quota exceeded".to_string()));
            }
            st.stored.push(path.to_string());
            Ok(StoredObject {
                url: format!("https://cdn.test/{path}"),
                path: path.to_string(),
            })
        }

        async fn release(&self, path: &str) -> Result<(), TripError> {
            let mut st = self.0.lock().unwrap();
            if st.fail_release {
                return Err(TripError::Storage("permission denied".to_string()));
            }
            st.released.push(path.to_string());
            Ok(())
        }
    }

    struct FakePrompt(Option<&'static str>);

    impl Prompt for FakePrompt {
        async fn ask(&self, _message: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    type Session = TripSession<MemStore, FakeRepo, FakeUploader>;

    fn session() -> (Session, FakeRepo, FakeUploader) {
        let repo = FakeRepo::default();
        let uploader = FakeUploader::default();
        let s = TripSession::new(
            "u1",
            "t1",
            "Summer",
            "Two weeks",
            MemStore::default(),
            repo.clone(),
            uploader.clone(),
        );
        (s, repo, uploader)
    }

    fn with_paris(s: &Session) {
        assert!(s.select_country("France"));
        assert!(s.add_city(0, "Paris"));
    }

    fn pdf(name: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            media_type: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn paris_id(s: &Session) -> String {
        s.snapshot().city(0, 0).expect("paris").id.clone()
    }

    fn paris_docs(s: &Session) -> Vec<Document> {
        s.snapshot().city(0, 0).expect("paris").documents.clone()
    }

    #[test]
    fn test_ignored_operation_keeps_snapshot_identity() {
        let (s, _, _) = session();
        with_paris(&s);
        let before = s.snapshot();
        assert!(!s.select_country("France"));
        assert!(!s.delete_city(0, 3));
        assert!(s.snapshot().same_snapshot(&before));
        assert!(s.add_place(0, 0, "Louvre"));
        assert!(!s.snapshot().same_snapshot(&before));
    }

    #[test]
    fn test_prompt_city_adds_named_city() {
        let (s, _, _) = session();
        assert!(s.select_country("Italy"));
        assert!(block_on(s.prompt_city(&FakePrompt(Some("Rome")), 0)));
        assert_eq!(s.snapshot().countries()[0].cities[0].name, "Rome");
    }

    #[test]
    fn test_cancelled_or_empty_prompt_adds_nothing() {
        let (s, _, _) = session();
        with_paris(&s);
        let before = s.snapshot();
        assert!(!block_on(s.prompt_city(&FakePrompt(None), 0)));
        assert!(!block_on(s.prompt_city(&FakePrompt(Some("   ")), 0)));
        assert!(!block_on(s.prompt_place(&FakePrompt(None), 0, 0)));
        assert!(!block_on(s.prompt_place(&FakePrompt(Some("")), 0, 0)));
        assert!(s.snapshot().same_snapshot(&before));
    }

    #[test]
    fn test_prompt_place_on_missing_city_is_ignored() {
        let (s, _, _) = session();
        with_paris(&s);
        assert!(!block_on(s.prompt_place(&FakePrompt(Some("Louvre")), 0, 4)));
        assert!(block_on(s.prompt_place(&FakePrompt(Some("Louvre")), 0, 0)));
        assert_eq!(s.snapshot().city(0, 0).expect("paris").places[0].name, "Louvre");
    }

    #[test]
    fn test_upload_attaches_document_with_stored_reference() {
        let (s, _, uploader) = session();
        with_paris(&s);
        let doc = block_on(s.upload_document_to(&paris_id(&s), pdf("My Ticket.pdf")))
            .expect("upload")
            .expect("attached");

        assert_eq!(doc.name, "My Ticket.pdf");
        assert_eq!(doc.size, 3);
        let city_id = s.snapshot().city(0, 0).expect("paris").id.clone();
        assert!(doc
            .path
            .starts_with(&format!("users/u1/trips/t1/cities/{city_id}/")));
        assert!(doc.path.ends_with("_My_Ticket.pdf"));
        assert_eq!(doc.url, format!("https://cdn.test/{}", doc.path));
        assert_eq!(paris_docs(&s), vec![doc.clone()]);
        assert_eq!(uploader.0.lock().unwrap().stored, vec![doc.path]);
    }

    #[test]
    fn test_failed_upload_attaches_nothing() {
        let (s, _, uploader) = session();
        with_paris(&s);
        uploader.0.lock().unwrap().fail_store = true;
        let before = s.snapshot();
        let err = block_on(s.upload_document_to(&paris_id(&s), pdf("a.pdf"))).expect_err("must fail");
        assert!(matches!(err, TripError::Storage(_)));
        assert!(s.snapshot().same_snapshot(&before));
    }

    #[test]
    fn test_upload_into_removed_city_releases_object() {
        let (s, repo, uploader) = session();
        with_paris(&s);

        let (tx, rx) = oneshot::channel::<()>();
        let gated = GatedUploader {
            inner: uploader.clone(),
            gate: Arc::new(Mutex::new(Some(rx))),
            release_gate: Arc::default(),
        };
        let s2 = TripSession::new("u1", "t1", "Summer", "", s.store.clone(), repo, gated);
        let paris = paris_id(&s);

        let (res, _) = block_on(async {
            futures::join!(s2.upload_document_to(&paris, pdf("a.pdf")), async {
                assert!(s2.delete_city(0, 0));
                let _ = tx.send(());
            })
        });

        assert_eq!(res, Ok(None));
        let st = uploader.0.lock().unwrap();
        assert_eq!(st.stored.len(), 1);
        assert_eq!(st.released, st.stored);
    }

    /// Suspends `store` (and `release`) until the test opens the gate.
    #[derive(Clone)]
    struct GatedUploader {
        inner: FakeUploader,
        gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
        release_gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    }

    impl UploadAdapter for GatedUploader {
        async fn store(
            &self,
            bytes: Vec<u8>,
            media_type: &str,
            path: &str,
        ) -> Result<StoredObject, TripError> {
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.inner.store(bytes, media_type, path).await
        }

        async fn release(&self, path: &str) -> Result<(), TripError> {
            let gate = self.release_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.inner.release(path).await
        }
    }

    #[test]
    fn test_attach_then_detach_restores_documents() {
        let (s, _, uploader) = session();
        with_paris(&s);
        let before = paris_docs(&s);

        let doc = block_on(s.upload_document_to(&paris_id(&s), pdf("a.pdf")))
            .expect("upload")
            .expect("attached");
        assert_eq!(block_on(s.detach_document(0, 0, 0)), Ok(true));

        assert_eq!(paris_docs(&s), before);
        assert_eq!(uploader.0.lock().unwrap().released, vec![doc.path]);
    }

    #[test]
    fn test_failed_release_keeps_document() {
        let (s, _, uploader) = session();
        with_paris(&s);
        block_on(s.upload_document_to(&paris_id(&s), pdf("a.pdf"))).expect("upload");
        uploader.0.lock().unwrap().fail_release = true;
        let before = s.snapshot();

        let res = block_on(s.detach_document(0, 0, 0));
        assert!(matches!(res, Err(TripError::Storage(_))));
        assert!(s.snapshot().same_snapshot(&before));
        assert_eq!(paris_docs(&s).len(), 1);
    }

    #[test]
    fn test_detach_with_bad_index_is_ignored() {
        let (s, _, uploader) = session();
        with_paris(&s);
        assert_eq!(block_on(s.detach_document(0, 0, 0)), Ok(false));
        assert_eq!(block_on(s.detach_document(2, 0, 0)), Ok(false));
        assert!(uploader.0.lock().unwrap().released.is_empty());
    }

    #[test]
    fn test_save_writes_full_tree() {
        let (s, repo, _) = session();
        with_paris(&s);
        assert!(s.add_place(0, 0, "Louvre"));

        let outcome = block_on(s.save()).expect("save");
        assert_eq!(outcome, SaveOutcome::Saved(s.snapshot()));
        let writes = repo.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].name, "Summer");
        assert_eq!(writes[0].description, "Two weeks");
        assert_eq!(writes[0].countries, s.snapshot().countries().to_vec());
        assert!(!s.is_saving());
    }

    #[test]
    fn test_overlapping_saves_end_with_latest_snapshot() {
        let (s, repo, _) = session();
        assert!(s.select_country("France"));

        let (tx, rx) = oneshot::channel::<()>();
        repo.hold_next_update(rx);

        let (first, second) = block_on(async {
            futures::join!(s.save(), async {
                assert!(s.is_saving());
                assert!(s.select_country("Japan"));
                let r = s.save().await;
                let _ = tx.send(());
                r
            })
        });

        assert_eq!(second, Ok(SaveOutcome::Coalesced));
        assert_eq!(first, Ok(SaveOutcome::Saved(s.snapshot())));

        let writes = repo.writes();
        let last = writes.last().expect("written");
        let names: Vec<_> = last.countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["France", "Japan"]);
        assert!(writes.len() <= 2);
        assert!(!s.is_saving());
    }

    #[test]
    fn test_failed_save_leaves_tree_and_unblocks_queue() {
        let (s, repo, _) = session();
        with_paris(&s);
        repo.0.lock().unwrap().fail_next = true;
        let before = s.snapshot();

        let res = block_on(s.save());
        assert!(matches!(res, Err(TripError::Persistence(_))));
        assert!(s.snapshot().same_snapshot(&before));
        assert!(!s.is_saving());

        assert!(block_on(s.save()).is_ok());
        assert_eq!(repo.writes().len(), 1);
    }

    #[test]
    fn test_check_size() {
        let f = pdf("a.pdf");
        assert!(f.check_size(3).is_ok());
        assert!(matches!(f.check_size(2), Err(TripError::Storage(_))));
    }

    #[test]
    fn test_upload_follows_city_after_reorder() {
        let (s, _, uploader) = session();
        with_paris(&s);
        assert!(s.add_city(0, "Lyon"));
        let paris = paris_id(&s);

        // Paris moves from (0, 0) to (0, 1) while the file is being read.
        let reordered: Vec<City> = s.snapshot().countries()[0].cities.iter().rev().cloned().collect();
        assert!(s.reorder_cities(0, reordered));

        let doc = block_on(s.upload_document_to(&paris, pdf("paris-ticket.pdf")))
            .expect("upload")
            .expect("attached");

        let snap = s.snapshot();
        let lyon = snap.city(0, 0).expect("lyon");
        let moved_paris = snap.city(0, 1).expect("paris");
        assert_eq!(moved_paris.id, paris);
        assert_eq!(moved_paris.documents, vec![doc.clone()]);
        assert!(lyon.documents.is_empty());
        assert!(doc.path.contains(&format!("/cities/{paris}/")));
        assert_eq!(uploader.0.lock().unwrap().stored, vec![doc.path]);
    }

    #[test]
    fn test_upload_to_unknown_city_stores_nothing() {
        let (s, _, uploader) = session();
        with_paris(&s);
        assert_eq!(block_on(s.upload_document_to("gone", pdf("a.pdf"))), Ok(None));
        assert!(uploader.0.lock().unwrap().stored.is_empty());
    }

    #[test]
    fn test_repeated_detach_releases_once() {
        let (s, repo, uploader) = session();
        with_paris(&s);
        block_on(s.upload_document_to(&paris_id(&s), pdf("a.pdf"))).expect("upload");

        let (tx, rx) = oneshot::channel::<()>();
        let gated = GatedUploader {
            inner: uploader.clone(),
            gate: Arc::default(),
            release_gate: Arc::new(Mutex::new(Some(rx))),
        };
        let s2 = TripSession::new("u1", "t1", "Summer", "", s.store.clone(), repo, gated);

        let (first, second) = block_on(async {
            futures::join!(s2.detach_document(0, 0, 0), async {
                let second = s2.detach_document(0, 0, 0).await;
                let _ = tx.send(());
                second
            })
        });

        assert_eq!(first, Ok(true));
        assert_eq!(second, Ok(false));
        assert_eq!(uploader.0.lock().unwrap().released.len(), 1);
        assert!(paris_docs(&s).is_empty());
    }

    #[test]
    fn test_in_flight_tracks_ids_independently() {
        let mut uploads = InFlight::default();
        assert!(uploads.begin("paris"));
        assert!(uploads.begin("rome"));
        assert!(!uploads.begin("paris"));

        uploads.finish("paris");
        assert!(!uploads.contains("paris"));
        assert!(uploads.contains("rome"));

        uploads.finish("rome");
        assert_eq!(uploads, InFlight::default());
    }
}
