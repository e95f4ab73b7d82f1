//! Achievement catalog and evaluator.
//!
//! # Responsibility
//! - Hold the static catalog of achievements and their unlock predicates.
//! - Grant achievements whose predicate holds for the current history.
//!
//! # Invariants
//! - The unlocked set only grows; nothing is ever re-locked.
//! - Predicates are pure; evaluation order is not observable beyond the
//!   order of the returned notifications.
//! - Unlocked ids unknown to the catalog are kept as-is.

use crate::model::achievement::{AchievementId, BEGINNER_ADVENTURER};
use crate::model::player::ProgressionState;
use crate::model::task::Task;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Read-only history handed to unlock predicates.
#[derive(Debug, Clone, Copy)]
pub struct AchievementContext<'a> {
    pub tasks: &'a [Task],
    pub progression: ProgressionState,
}

impl AchievementContext<'_> {
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }
}

pub type UnlockPredicate = Box<dyn Fn(&AchievementContext<'_>) -> bool + Send + Sync>;

/// One catalog entry.
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub icon: String,
    pub title: String,
    pub description: String,
    predicate: UnlockPredicate,
}

impl AchievementDefinition {
    pub fn new(
        id: impl Into<String>,
        icon: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        predicate: impl Fn(&AchievementContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: AchievementId::new(id),
            icon: icon.into(),
            title: title.into(),
            description: description.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Entry that unlocks once at least `count` tasks are completed.
    pub fn completed_tasks_at_least(
        id: impl Into<String>,
        icon: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        count: usize,
    ) -> Self {
        Self::new(id, icon, title, description, move |ctx| {
            ctx.completed_count() >= count
        })
    }

    pub fn is_satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

impl Debug for AchievementDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AchievementDefinition")
            .field("id", &self.id)
            .field("icon", &self.icon)
            .field("title", &self.title)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyAchievementId,
    DuplicateAchievementId(AchievementId),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAchievementId => write!(f, "achievement id must not be empty"),
            Self::DuplicateAchievementId(id) => write!(f, "duplicate achievement id: {id}"),
        }
    }
}

impl Error for CatalogError {}

/// Open registry of achievements keyed by id.
#[derive(Debug, Default)]
pub struct AchievementCatalog {
    entries: BTreeMap<AchievementId, AchievementDefinition>,
}

impl AchievementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog shipped with the game.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.entries.insert(
            AchievementId::from(BEGINNER_ADVENTURER),
            AchievementDefinition::completed_tasks_at_least(
                BEGINNER_ADVENTURER,
                "🏆",
                "Beginner Adventurer",
                "Complete 5 quests.",
                5,
            ),
        );
        catalog
    }

    pub fn register(&mut self, definition: AchievementDefinition) -> Result<(), CatalogError> {
        if definition.id.as_str().trim().is_empty() {
            return Err(CatalogError::EmptyAchievementId);
        }
        if self.entries.contains_key(&definition.id) {
            return Err(CatalogError::DuplicateAchievementId(definition.id));
        }
        self.entries.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &AchievementId) -> Option<&AchievementDefinition> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owns the unlocked set and grants new achievements.
#[derive(Debug)]
pub struct AchievementEvaluator {
    catalog: AchievementCatalog,
    unlocked: Vec<AchievementId>,
    unlocked_index: HashSet<AchievementId>,
}

impl AchievementEvaluator {
    pub fn new(catalog: AchievementCatalog) -> Self {
        Self::with_unlocked(catalog, Vec::new())
    }

    /// Restores an evaluator with previously granted ids.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn with_unlocked(catalog: AchievementCatalog, unlocked: Vec<AchievementId>) -> Self {
        let mut evaluator = Self {
            catalog,
            unlocked: Vec::with_capacity(unlocked.len()),
            unlocked_index: HashSet::with_capacity(unlocked.len()),
        };
        for id in unlocked {
            evaluator.grant(id);
        }
        evaluator
    }

    /// Grants every not-yet-unlocked achievement whose predicate holds.
    ///
    /// Returns only the ids unlocked by this call.
    pub fn evaluate(&mut self, ctx: &AchievementContext<'_>) -> Vec<AchievementId> {
        let newly_unlocked: Vec<AchievementId> = self
            .catalog
            .iter()
            .filter(|definition| !self.unlocked_index.contains(&definition.id))
            .filter(|definition| definition.is_satisfied(ctx))
            .map(|definition| definition.id.clone())
            .collect();

        for id in &newly_unlocked {
            self.grant(id.clone());
        }
        newly_unlocked
    }

    pub fn is_unlocked(&self, id: &AchievementId) -> bool {
        self.unlocked_index.contains(id)
    }

    /// Unlocked ids in grant order.
    pub fn unlocked(&self) -> &[AchievementId] {
        &self.unlocked
    }

    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    fn grant(&mut self, id: AchievementId) {
        if self.unlocked_index.insert(id.clone()) {
            self.unlocked.push(id);
        }
    }
}
