//! Study session coordinator.
//!
//! Owns the single mutable per-card progress cache and the session
//! lifecycle; the selector only ever sees a snapshot. All state lives
//! behind an `Arc` so the coordinator can be cloned across async
//! boundaries, mirroring the sync engine layout.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use kantan_core::{
    apply_feedback, select_card, CardProgress, Catalog, CatalogItem, Difficulty, SessionTracker,
    StudyProgress, StudySession, Tier,
};

use crate::provider::RecordStore;
use crate::store::ProgressStore;

struct CoordinatorState {
    learner_id: Option<String>,
    progress: StudyProgress,
    card_progress: HashMap<String, CardProgress>,
    tracker: SessionTracker,
    rng: StdRng,
}

struct CoordinatorInner<S: RecordStore> {
    store: ProgressStore<S>,
    catalog: Catalog,
    state: Mutex<CoordinatorState>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

/// Top-level owner of one learner's study flow.
pub struct StudyCoordinator<S: RecordStore> {
    inner: Arc<CoordinatorInner<S>>,
}

impl<S: RecordStore> Clone for StudyCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RecordStore + Send + Sync + 'static> StudyCoordinator<S> {
    pub fn new(store: ProgressStore<S>, catalog: Catalog) -> Self {
        Self::with_rng(store, catalog, StdRng::from_os_rng())
    }

    /// Deterministic selection for tests.
    pub fn with_seed(store: ProgressStore<S>, catalog: Catalog, seed: u64) -> Self {
        Self::with_rng(store, catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: ProgressStore<S>, catalog: Catalog, rng: StdRng) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                store,
                catalog,
                state: Mutex::new(CoordinatorState {
                    learner_id: None,
                    progress: StudyProgress::default(),
                    card_progress: HashMap::new(),
                    tracker: SessionTracker::new(),
                    rng,
                }),
                ticker: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &ProgressStore<S> {
        &self.inner.store
    }

    pub async fn learner_id(&self) -> Option<String> {
        self.inner.state.lock().await.learner_id.clone()
    }

    pub async fn progress(&self) -> StudyProgress {
        self.inner.state.lock().await.progress.clone()
    }

    pub async fn cached_card_progress(&self, card_id: &str) -> Option<CardProgress> {
        self.inner.state.lock().await.card_progress.get(card_id).cloned()
    }

    pub async fn session_cards_studied(&self) -> u32 {
        self.inner.state.lock().await.tracker.cards_studied()
    }

    /// Attach a learner and load their saved state. The cumulative
    /// fetch and the per-card fetch are independent, so they run
    /// concurrently and are joined before the session proceeds.
    pub async fn sign_in(&self, learner_id: &str) {
        let (progress, cards) = tokio::join!(
            self.inner.store.get_study_progress(learner_id),
            self.inner.store.get_all_card_progress(learner_id),
        );
        let mut state = self.inner.state.lock().await;
        state.learner_id = Some(learner_id.to_string());
        state.progress = progress.unwrap_or_default();
        state.card_progress = cards
            .into_iter()
            .map(|card| (card.card_id.clone(), card))
            .collect();
    }

    /// Begin a study session and start the once-per-second study-time
    /// tick.
    pub async fn start_session(&self, tier: Tier) {
        {
            let mut state = self.inner.state.lock().await;
            state.tracker.start(tier, Utc::now());
        }
        self.spawn_ticker().await;
    }

    /// Pick the next card for `tier` against a snapshot of the cache.
    pub async fn next_card(&self, tier: Tier) -> Option<CatalogItem> {
        let mut state = self.inner.state.lock().await;
        let CoordinatorState {
            card_progress, rng, ..
        } = &mut *state;
        select_card(tier, &self.inner.catalog, card_progress, rng).cloned()
    }

    /// Fold one difficulty report into local state, then persist.
    ///
    /// The cumulative write and the per-card write are issued
    /// concurrently; the cache is updated only from the per-card
    /// write's confirmed result. Anonymous learners skip persistence
    /// entirely.
    pub async fn record_feedback(&self, card: &CatalogItem, difficulty: Difficulty) {
        let (learner, snapshot) = {
            let mut state = self.inner.state.lock().await;
            state.tracker.record_card_studied();
            state.progress = apply_feedback(&state.progress, difficulty, Utc::now().date_naive());
            (state.learner_id.clone(), state.progress.clone())
        };

        let Some(learner_id) = learner else {
            return;
        };
        let (_, confirmed) = tokio::join!(
            self.inner.store.upsert_study_progress(&learner_id, &snapshot),
            self.inner.store.upsert_card_progress(
                &learner_id,
                &card.id,
                card.tier,
                card.category(),
                difficulty,
            ),
        );
        if let Some(card_progress) = confirmed {
            let mut state = self.inner.state.lock().await;
            state
                .card_progress
                .insert(card_progress.card_id.clone(), card_progress);
        }
    }

    /// Flush the session summary. At most one record per session is
    /// written: the tracker's idempotent `end` guards duplicate flush
    /// triggers, empty sessions and anonymous learners write nothing.
    pub async fn end_session(&self) -> Option<StudySession> {
        self.stop_ticker().await;
        let (summary, learner) = {
            let mut state = self.inner.state.lock().await;
            (state.tracker.end(Utc::now()), state.learner_id.clone())
        };
        match (summary, learner) {
            (Some(summary), Some(learner_id)) => {
                self.inner
                    .store
                    .create_study_session(
                        &learner_id,
                        summary.tier,
                        summary.cards_studied,
                        summary.duration_seconds,
                    )
                    .await
            }
            _ => None,
        }
    }

    /// Flush any open session, then clear learner state and cache.
    pub async fn sign_out(&self) {
        self.end_session().await;
        let mut state = self.inner.state.lock().await;
        state.learner_id = None;
        state.progress = StudyProgress::default();
        state.card_progress.clear();
        state.tracker = SessionTracker::new();
    }

    async fn spawn_ticker(&self) {
        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let mut state = inner.state.lock().await;
                if state.tracker.is_active() && state.learner_id.is_some() {
                    state.progress.study_time_seconds += 1;
                }
            }
        });
        if let Some(previous) = self.inner.ticker.lock().await.replace(handle) {
            previous.abort();
        }
    }

    async fn stop_ticker(&self) {
        if let Some(handle) = self.inner.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::MemoryStore;
    use kantan_core::Category;
    use pretty_assertions::assert_eq;

    const LEARNER: &str = "learner-1";

    fn coordinator() -> StudyCoordinator<MemoryStore> {
        StudyCoordinator::with_seed(
            ProgressStore::new(MemoryStore::new()),
            Catalog::builtin(),
            42,
        )
    }

    async fn tick(seconds: u64) {
        // Let a freshly spawned ticker register its first sleep before
        // the clock moves; otherwise the first advance is lost.
        tokio::task::yield_now().await;
        for _ in 0..seconds {
            tokio::time::advance(std::time::Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn authenticated_study_flow_persists_everything() {
        let coordinator = coordinator();
        coordinator.sign_in(LEARNER).await;
        coordinator.start_session(Tier::N5).await;

        let card = coordinator.next_card(Tier::N5).await.expect("card");
        assert_eq!(card.tier, Tier::N5);

        for difficulty in [Difficulty::Easy, Difficulty::Hard, Difficulty::Medium] {
            coordinator.record_feedback(&card, difficulty).await;
        }

        let progress = coordinator.progress().await;
        assert_eq!(progress.total_studied, 3);
        assert_eq!(progress.easy_count, 1);
        assert_eq!(progress.medium_count, 1);
        assert_eq!(progress.hard_count, 1);
        assert_eq!(progress.current_streak, 3);

        // Cache reflects the server-confirmed write.
        let cached = coordinator
            .cached_card_progress(&card.id)
            .await
            .expect("cached");
        assert_eq!(cached.times_studied, 3);
        assert_eq!(cached.difficulty, Difficulty::Medium);

        let session = coordinator.end_session().await.expect("flushed");
        assert_eq!(session.cards_studied, 3);
        assert_eq!(session.tier, Tier::N5);

        let history = coordinator.store().get_study_sessions(LEARNER, 10).await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn ending_twice_writes_a_single_session_record() {
        let coordinator = coordinator();
        coordinator.sign_in(LEARNER).await;
        coordinator.start_session(Tier::N4).await;

        let card = coordinator.next_card(Tier::N4).await.expect("card");
        coordinator.record_feedback(&card, Difficulty::Easy).await;

        assert!(coordinator.end_session().await.is_some());
        assert!(coordinator.end_session().await.is_none());
        let history = coordinator.store().get_study_sessions(LEARNER, 10).await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn empty_session_is_never_flushed() {
        let coordinator = coordinator();
        coordinator.sign_in(LEARNER).await;
        coordinator.start_session(Tier::N5).await;
        assert!(coordinator.end_session().await.is_none());
        assert!(coordinator
            .store()
            .get_study_sessions(LEARNER, 10)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn demo_mode_keeps_the_study_loop_usable() {
        let coordinator = StudyCoordinator::with_seed(
            ProgressStore::<MemoryStore>::unconfigured(),
            Catalog::builtin(),
            7,
        );
        coordinator.start_session(Tier::N5).await;

        let card = coordinator.next_card(Tier::N5).await.expect("card");
        coordinator.record_feedback(&card, Difficulty::Hard).await;

        // Local aggregation still works; nothing is cached or written.
        assert_eq!(coordinator.progress().await.total_studied, 1);
        assert!(coordinator.cached_card_progress(&card.id).await.is_none());
        assert!(coordinator.end_session().await.is_none());
    }

    #[tokio::test]
    async fn sign_in_loads_saved_state() {
        let store = ProgressStore::new(MemoryStore::new());
        let mut saved = StudyProgress::default();
        saved.total_studied = 5;
        saved.easy_count = 5;
        saved.current_streak = 5;
        store.upsert_study_progress(LEARNER, &saved).await;
        store
            .upsert_card_progress(LEARNER, "n5-w1", Tier::N5, Category::Word, Difficulty::Hard)
            .await;

        let coordinator = StudyCoordinator::with_seed(store, Catalog::builtin(), 1);
        coordinator.sign_in(LEARNER).await;

        assert_eq!(coordinator.progress().await.total_studied, 5);
        let cached = coordinator
            .cached_card_progress("n5-w1")
            .await
            .expect("loaded");
        assert_eq!(cached.difficulty, Difficulty::Hard);
    }

    #[tokio::test]
    async fn sign_out_clears_learner_state() {
        let coordinator = coordinator();
        coordinator.sign_in(LEARNER).await;
        coordinator.start_session(Tier::N5).await;
        let card = coordinator.next_card(Tier::N5).await.expect("card");
        coordinator.record_feedback(&card, Difficulty::Easy).await;

        coordinator.sign_out().await;

        assert!(coordinator.learner_id().await.is_none());
        assert_eq!(coordinator.progress().await, StudyProgress::default());
        assert!(coordinator.cached_card_progress(&card.id).await.is_none());
        // The flushed session survives in history.
        let history = coordinator.store().get_study_sessions(LEARNER, 10).await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn study_time_ticks_only_while_active_and_signed_in() {
        let coordinator = coordinator();
        coordinator.sign_in(LEARNER).await;
        coordinator.start_session(Tier::N5).await;

        tick(3).await;
        assert_eq!(coordinator.progress().await.study_time_seconds, 3);

        let card = coordinator.next_card(Tier::N5).await.expect("card");
        coordinator.record_feedback(&card, Difficulty::Easy).await;
        coordinator.end_session().await;

        tick(5).await;
        assert_eq!(coordinator.progress().await.study_time_seconds, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn anonymous_sessions_do_not_accumulate_study_time() {
        let coordinator = coordinator();
        coordinator.start_session(Tier::N5).await;
        tick(2).await;
        assert_eq!(coordinator.progress().await.study_time_seconds, 0);
    }
}
