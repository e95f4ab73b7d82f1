//! Game session orchestration.
//!
//! # Responsibility
//! - Own one player's aggregate state through an explicit handle.
//! - Sequence ledger, engine and evaluator for every user action.
//! - Write the snapshot through after every mutation.
//!
//! # Invariants
//! - A completion is applied as ledger -> award -> evaluate -> notify ->
//!   persist, so a written snapshot never holds an award without its task.
//! - A failed award leaves the ledger untouched.
//! - Validation failures and no-ops never reach the store.
//! - Store failures are reported after the in-memory mutation is kept.
//! - Nothing but onboarding is allowed before an identity exists.

use crate::model::achievement::AchievementId;
use crate::model::player::{Identity, PlayerClass, ProgressionState};
use crate::model::state::AggregateState;
use crate::model::task::{Difficulty, Task, TaskId};
use crate::model::validation::ValidationError;
use crate::policy::{reward_for, xp_fraction};
use crate::repo::state_repo::{StateStore, StoreError};
use crate::service::achievement::{AchievementCatalog, AchievementContext, AchievementEvaluator};
use crate::service::observer::SessionObserver;
use crate::service::progression::{LevelUpReport, ProgressionEngine, ProgressionError};
use crate::service::projection::{AchievementView, StateProjection};
use crate::service::task_ledger::TaskLedger;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SessionError {
    /// Invalid caller input; nothing was mutated.
    Validation(ValidationError),
    /// Leveling policy misbehaved.
    Progression(ProgressionError),
    /// Snapshot could not be read or written.
    Persistence(StoreError),
    /// An operation other than onboarding ran before onboarding.
    NotOnboarded,
    /// First-time onboarding ran twice; use re-onboarding instead.
    AlreadyOnboarded,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Progression(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "failed to persist progress: {err}"),
            Self::NotOnboarded => write!(f, "no hero profile yet; onboarding is required"),
            Self::AlreadyOnboarded => write!(f, "hero profile already exists"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Progression(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::NotOnboarded | Self::AlreadyOnboarded => None,
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ProgressionError> for SessionError {
    fn from(value: ProgressionError) -> Self {
        match value {
            ProgressionError::Validation(err) => Self::Validation(err),
            other => Self::Progression(other),
        }
    }
}

/// What one first-time completion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub task: Task,
    pub xp_awarded: u64,
    pub levels_reached: Vec<u32>,
    pub unlocked: Vec<AchievementId>,
}

/// One player's live game state bound to a store and an observer.
pub struct GameSession<S: StateStore, O: SessionObserver> {
    store: S,
    observer: O,
    identity: Option<Identity>,
    ledger: TaskLedger,
    progression: ProgressionEngine,
    achievements: AchievementEvaluator,
}

impl<S: StateStore, O: SessionObserver> GameSession<S, O> {
    /// Restores the stored snapshot, or starts an empty session that needs
    /// onboarding when nothing is stored yet.
    ///
    /// # Errors
    /// - `SessionError::Persistence` when the stored snapshot is unreadable.
    pub fn open(store: S, observer: O, catalog: AchievementCatalog) -> Result<Self, SessionError> {
        let Some(state) = store.load()? else {
            info!("event=session_open module=session status=ok onboarded=false");
            return Ok(Self {
                store,
                observer,
                identity: None,
                ledger: TaskLedger::new(),
                progression: ProgressionEngine::new(),
                achievements: AchievementEvaluator::new(catalog),
            });
        };

        let stored_progression = state.progression();
        let ledger = TaskLedger::from_tasks(state.tasks.clone())
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        let progression = ProgressionEngine::from_state(stored_progression)
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        if progression.state() != stored_progression {
            warn!(
                "event=session_open module=session status=normalized from_level={} to_level={}",
                stored_progression.level,
                progression.level()
            );
        }
        let achievements = AchievementEvaluator::with_unlocked(catalog, state.achievements.clone());

        info!(
            "event=session_open module=session status=ok onboarded=true level={} tasks={} achievements={}",
            progression.level(),
            ledger.len(),
            achievements.unlocked().len()
        );
        Ok(Self {
            store,
            observer,
            identity: Some(state.identity()),
            ledger,
            progression,
            achievements,
        })
    }

    pub fn needs_onboarding(&self) -> bool {
        self.identity.is_none()
    }

    /// First-time onboarding: records identity and writes the initial snapshot.
    ///
    /// # Errors
    /// - `SessionError::AlreadyOnboarded` when an identity already exists.
    /// - `SessionError::Validation` for a blank display name.
    pub fn onboard(&mut self, display_name: &str, class: PlayerClass) -> Result<(), SessionError> {
        if self.identity.is_some() {
            return Err(SessionError::AlreadyOnboarded);
        }
        let identity = Identity::new(display_name, class)?;
        self.identity = Some(identity);
        info!("event=onboard module=session status=ok class={class}");
        self.commit()
    }

    /// Explicit re-onboarding: replaces identity, keeps all progress.
    pub fn reonboard(&mut self, display_name: &str, class: PlayerClass) -> Result<(), SessionError> {
        self.require_onboarded()?;
        let identity = Identity::new(display_name, class)?;
        self.identity = Some(identity);
        info!("event=reonboard module=session status=ok class={class}");
        self.commit()
    }

    /// Adds an open task at the end of the quest log.
    pub fn add_task(&mut self, text: &str, difficulty: Difficulty) -> Result<Task, SessionError> {
        self.require_onboarded()?;
        let task = self.ledger.add_task(text, difficulty)?;
        info!(
            "event=task_add module=session status=ok task_id={} difficulty={}",
            task.id, task.difficulty
        );
        self.commit()?;
        Ok(task)
    }

    /// Completes a task and grants its rewards.
    ///
    /// Returns `None` without touching state or store when the id is unknown
    /// or the task is already done.
    pub fn complete_task(&mut self, id: &TaskId) -> Result<Option<CompletionOutcome>, SessionError> {
        self.require_onboarded()?;
        let Some(difficulty) = self
            .ledger
            .get(id)
            .filter(|task| !task.completed)
            .map(|task| task.difficulty)
        else {
            info!("event=task_complete module=session status=noop task_id={id}");
            return Ok(None);
        };

        // Award on a scratch engine so a policy failure leaves the task open.
        let xp_awarded = reward_for(difficulty);
        let mut progression = self.progression.clone();
        let report = progression.award(xp_awarded)?;
        let Some(task) = self.ledger.complete_task(id).cloned() else {
            return Ok(None);
        };
        self.progression = progression;
        let unlocked = self.achievements.evaluate(&AchievementContext {
            tasks: self.ledger.tasks(),
            progression: self.progression.state(),
        });

        info!(
            "event=task_complete module=session status=ok task_id={} xp_awarded={} level={} xp={} levels_gained={} unlocked={}",
            task.id,
            xp_awarded,
            self.progression.level(),
            self.progression.xp(),
            report.levels_reached.len(),
            unlocked.len()
        );
        self.announce_level_ups(&report);
        self.announce_unlocks(&unlocked);
        self.commit()?;

        Ok(Some(CompletionOutcome {
            task,
            xp_awarded,
            levels_reached: report.levels_reached,
            unlocked,
        }))
    }

    /// Removes a task. Rewards already earned are kept.
    pub fn delete_task(&mut self, id: &TaskId) -> Result<Option<Task>, SessionError> {
        self.require_onboarded()?;
        let Some(removed) = self.ledger.delete_task(id) else {
            info!("event=task_delete module=session status=noop task_id={id}");
            return Ok(None);
        };
        info!(
            "event=task_delete module=session status=ok task_id={} was_completed={}",
            removed.id, removed.completed
        );
        self.commit()?;
        Ok(Some(removed))
    }

    /// Grants experience outside of task completion.
    ///
    /// # Errors
    /// - `SessionError::Validation` for negative amounts; state is unchanged.
    pub fn award_xp(&mut self, amount: i64) -> Result<LevelUpReport, SessionError> {
        self.require_onboarded()?;
        let report = self.progression.award_xp(amount)?;
        info!(
            "event=award_xp module=session status=ok amount={} level={} xp={} levels_gained={}",
            amount,
            self.progression.level(),
            self.progression.xp(),
            report.levels_reached.len()
        );
        self.announce_level_ups(&report);
        self.commit()?;
        Ok(report)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn progression(&self) -> ProgressionState {
        self.progression.state()
    }

    pub fn tasks(&self) -> &[Task] {
        self.ledger.tasks()
    }

    pub fn unlocked(&self) -> &[AchievementId] {
        self.achievements.unlocked()
    }

    /// Whole catalog with lock state, in catalog order.
    pub fn achievement_views(&self) -> Vec<AchievementView> {
        self.achievements
            .catalog()
            .iter()
            .map(|definition| {
                AchievementView::from_definition(
                    definition,
                    self.achievements.is_unlocked(&definition.id),
                )
            })
            .collect()
    }

    /// Read model for renderers; `None` before onboarding.
    pub fn projection(&self) -> Option<StateProjection> {
        let identity = self.identity.clone()?;
        let ProgressionState { level, xp } = self.progression.state();
        Some(StateProjection {
            identity,
            level,
            xp,
            xp_to_next_level: self.progression.xp_to_next_level(),
            xp_fraction: xp_fraction(level, xp),
            tasks: self.ledger.tasks().to_vec(),
            achievements: self.achievement_views(),
        })
    }

    /// Serializable aggregate; `None` before onboarding.
    pub fn snapshot(&self) -> Option<AggregateState> {
        let identity = self.identity.as_ref()?;
        let progression = self.progression.state();
        Some(AggregateState {
            username: identity.display_name.clone(),
            player_class: identity.class,
            level: progression.level,
            xp: progression.xp,
            tasks: self.ledger.tasks().to_vec(),
            achievements: self.achievements.unlocked().to_vec(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    fn require_onboarded(&self) -> Result<(), SessionError> {
        if self.identity.is_none() {
            return Err(SessionError::NotOnboarded);
        }
        Ok(())
    }

    fn announce_level_ups(&mut self, report: &LevelUpReport) {
        for &level in &report.levels_reached {
            info!("event=level_up module=session status=ok level={level}");
            self.observer.on_level_up(level);
        }
    }

    fn announce_unlocks(&mut self, unlocked: &[AchievementId]) {
        for id in unlocked {
            let Some(definition) = self.achievements.catalog().get(id) else {
                continue;
            };
            info!("event=achievement_unlock module=session status=ok achievement_id={id}");
            let view = AchievementView::from_definition(definition, true);
            self.observer.on_achievement_unlocked(&view);
        }
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        let (Some(projection), Some(snapshot)) = (self.projection(), self.snapshot()) else {
            return Err(SessionError::NotOnboarded);
        };
        self.observer.on_state_changed(&projection);

        if let Err(err) = self.store.save(&snapshot) {
            error!(
                "event=snapshot_save module=session status=error error_code=save_failed error={}",
                err
            );
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{GameSession, SessionError};
    use crate::model::achievement::{AchievementId, BEGINNER_ADVENTURER};
    use crate::model::player::{Identity, PlayerClass, ProgressionState};
    use crate::model::state::AggregateState;
    use crate::model::task::{Difficulty, TaskId};
    use crate::model::validation::ValidationError;
    use crate::repo::state_repo::{MemoryStateStore, StateStore, StoreError, StoreResult};
    use crate::service::achievement::AchievementCatalog;
    use crate::service::observer::{NoopObserver, SessionObserver};
    use crate::policy::{threshold_for, xp_fraction};
    use crate::service::progression::ProgressionError;
    use crate::service::projection::{AchievementView, StateProjection};

    #[derive(Default)]
    struct Recorder {
        level_ups: Vec<u32>,
        unlocked: Vec<AchievementId>,
        state_changes: usize,
    }

    impl SessionObserver for Recorder {
        fn on_level_up(&mut self, level: u32) {
            self.level_ups.push(level);
        }

        fn on_achievement_unlocked(&mut self, achievement: &AchievementView) {
            self.unlocked.push(achievement.id.clone());
        }

        fn on_state_changed(&mut self, _projection: &StateProjection) {
            self.state_changes += 1;
        }
    }

    struct FailingStore;

    impl StateStore for FailingStore {
        fn load(&self) -> StoreResult<Option<AggregateState>> {
            Ok(None)
        }

        fn save(&self, _state: &AggregateState) -> StoreResult<()> {
            Err(StoreError::InvalidData("disk full".to_string()))
        }
    }

    fn onboarded() -> GameSession<MemoryStateStore, Recorder> {
        let mut session = GameSession::open(
            MemoryStateStore::new(),
            Recorder::default(),
            AchievementCatalog::builtin(),
        )
        .unwrap();
        session.onboard("Aria", PlayerClass::Mage).unwrap();
        session
    }

    #[test]
    fn fresh_store_requires_onboarding() {
        let mut session =
            GameSession::open(MemoryStateStore::new(), NoopObserver, AchievementCatalog::builtin())
                .unwrap();
        assert!(session.needs_onboarding());
        assert!(session.projection().is_none());

        let err = session.add_task("early", Difficulty::Low).unwrap_err();
        assert!(matches!(err, SessionError::NotOnboarded));
        assert_eq!(session.store().save_count(), 0);
    }

    #[test]
    fn onboarding_persists_initial_snapshot() {
        let session = onboarded();
        let stored = session.store().load().unwrap().unwrap();
        assert_eq!(stored.username, "Aria");
        assert_eq!(stored.player_class, PlayerClass::Mage);
        assert_eq!(stored.progression(), ProgressionState::default());
        assert_eq!(session.store().save_count(), 1);
    }

    #[test]
    fn onboarding_twice_is_rejected_but_reonboarding_keeps_progress() {
        let mut session = onboarded();
        session.award_xp(42).unwrap();

        assert!(matches!(
            session.onboard("Other", PlayerClass::Knight),
            Err(SessionError::AlreadyOnboarded)
        ));
        session.reonboard("Bran", PlayerClass::Knight).unwrap();

        let identity = session.identity().unwrap();
        assert_eq!(identity.display_name, "Bran");
        assert_eq!(identity.class, PlayerClass::Knight);
        assert_eq!(session.progression().xp, 42);
    }

    #[test]
    fn blank_task_is_rejected_without_persisting() {
        let mut session = onboarded();
        let saves = session.store().save_count();

        let err = session.add_task("", Difficulty::Low).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::EmptyTaskText)
        ));
        assert!(session.tasks().is_empty());
        assert_eq!(session.store().save_count(), saves);
    }

    #[test]
    fn completing_awards_difficulty_reward_once() {
        let mut session = onboarded();
        let task = session.add_task("slay goblin", Difficulty::High).unwrap();

        let outcome = session.complete_task(&task.id).unwrap().unwrap();
        assert_eq!(outcome.xp_awarded, 30);
        assert!(outcome.levels_reached.is_empty());
        let saves = session.store().save_count();

        assert!(session.complete_task(&task.id).unwrap().is_none());
        assert_eq!(session.progression(), ProgressionState { level: 1, xp: 30 });
        assert_eq!(session.store().save_count(), saves);
    }

    #[test]
    fn unknown_completion_is_a_silent_noop() {
        let mut session = onboarded();
        let saves = session.store().save_count();
        let before = session.snapshot();

        assert!(session
            .complete_task(&TaskId::from("unknown-id"))
            .unwrap()
            .is_none());
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.store().save_count(), saves);
    }

    #[test]
    fn cascading_award_notifies_each_level_in_order() {
        let mut session = onboarded();
        let report = session.award_xp(910).unwrap();

        assert_eq!(report.levels_reached, vec![2, 3, 4]);
        assert_eq!(session.observer().level_ups, vec![2, 3, 4]);
        assert_eq!(session.progression(), ProgressionState { level: 4, xp: 7 });
    }

    #[test]
    fn negative_award_is_a_validation_error() {
        let mut session = onboarded();
        let saves = session.store().save_count();
        let err = session.award_xp(-1).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::NegativeXpAward { amount: -1 })
        ));
        assert_eq!(session.store().save_count(), saves);
    }

    #[test]
    fn fifth_completion_unlocks_beginner_adventurer_once() {
        let mut session = onboarded();
        let mut ids = Vec::new();
        for index in 0..6 {
            ids.push(session.add_task(&format!("quest {index}"), Difficulty::Low).unwrap().id);
        }
        for id in &ids[..4] {
            let outcome = session.complete_task(id).unwrap().unwrap();
            assert!(outcome.unlocked.is_empty());
        }

        let fifth = session.complete_task(&ids[4]).unwrap().unwrap();
        assert_eq!(fifth.unlocked, vec![AchievementId::from(BEGINNER_ADVENTURER)]);
        let sixth = session.complete_task(&ids[5]).unwrap().unwrap();
        assert!(sixth.unlocked.is_empty());

        assert_eq!(
            session.observer().unlocked,
            vec![AchievementId::from(BEGINNER_ADVENTURER)]
        );
        assert_eq!(session.unlocked().len(), 1);
    }

    #[test]
    fn deleting_completed_task_keeps_rewards_and_achievements() {
        let mut session = onboarded();
        let mut ids = Vec::new();
        for index in 0..5 {
            let task = session.add_task(&format!("quest {index}"), Difficulty::Medium).unwrap();
            session.complete_task(&task.id).unwrap();
            ids.push(task.id);
        }
        let progression = session.progression();

        for id in &ids {
            assert!(session.delete_task(id).unwrap().is_some());
        }
        assert!(session.tasks().is_empty());
        assert_eq!(session.progression(), progression);
        assert!(session
            .unlocked()
            .contains(&AchievementId::from(BEGINNER_ADVENTURER)));
    }

    #[test]
    fn deleting_unknown_task_does_not_persist() {
        let mut session = onboarded();
        let saves = session.store().save_count();
        assert!(session.delete_task(&TaskId::from("nope")).unwrap().is_none());
        assert_eq!(session.store().save_count(), saves);
    }

    #[test]
    fn every_mutation_writes_through() {
        let mut session = onboarded();
        let task = session.add_task("write", Difficulty::Low).unwrap();
        session.complete_task(&task.id).unwrap();
        session.award_xp(5).unwrap();
        session.delete_task(&task.id).unwrap();

        assert_eq!(session.store().save_count(), 5);
        assert_eq!(session.observer().state_changes, 5);
        assert_eq!(session.store().load().unwrap(), session.snapshot());
    }

    #[test]
    fn persistence_failure_keeps_in_memory_progress() {
        let mut session =
            GameSession::open(FailingStore, NoopObserver, AchievementCatalog::builtin()).unwrap();
        let err = session.onboard("Aria", PlayerClass::Paladin).unwrap_err();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert!(!session.needs_onboarding());

        let err = session.award_xp(150).unwrap_err();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert_eq!(session.progression(), ProgressionState { level: 2, xp: 50 });
    }

    #[test]
    fn projection_reports_progress_fraction_and_catalog() {
        let mut session = onboarded();
        session.award_xp(250).unwrap();

        let projection = session.projection().unwrap();
        assert_eq!(projection.level, 2);
        assert_eq!(projection.xp, 150);
        assert_eq!(projection.xp_to_next_level, 283);
        assert!((projection.xp_fraction - 150.0 / 283.0).abs() < 1e-9);
        assert_eq!(projection.xp_fraction, xp_fraction(2, 150));
        assert_eq!(projection.achievements.len(), 1);
        assert!(!projection.achievements[0].unlocked);
    }

    #[test]
    fn failed_award_leaves_task_open_and_store_untouched() {
        let identity = Identity::new("Aria", PlayerClass::Mage).unwrap();
        let mut state = AggregateState::new(&identity);
        state.level = u32::MAX;
        state.xp = threshold_for(u32::MAX) - 10;
        let store = MemoryStateStore::with_snapshot(&state).unwrap();
        let mut session =
            GameSession::open(store, Recorder::default(), AchievementCatalog::builtin()).unwrap();
        let task = session.add_task("one step too far", Difficulty::High).unwrap();
        let saves_before = session.store().save_count();

        let err = session.complete_task(&task.id).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Progression(ProgressionError::LevelOverflow)
        ));
        assert!(!session.tasks()[0].completed);
        assert_eq!(session.progression().level, u32::MAX);
        assert_eq!(session.progression().xp, threshold_for(u32::MAX) - 10);
        assert_eq!(session.store().save_count(), saves_before);
        assert!(session.observer().level_ups.is_empty());
    }

    #[test]
    fn reopening_restores_the_same_snapshot() {
        let mut session = onboarded();
        let task = session.add_task("persist me", Difficulty::Medium).unwrap();
        session.complete_task(&task.id).unwrap();
        let payload = session.store().payload().unwrap();

        let store = MemoryStateStore::with_snapshot(&session.snapshot().unwrap()).unwrap();
        let reopened = GameSession::open(store, NoopObserver, AchievementCatalog::builtin()).unwrap();

        assert!(!reopened.needs_onboarding());
        assert_eq!(reopened.snapshot(), session.snapshot());
        assert_eq!(reopened.store().payload().unwrap(), payload);
    }
}
