//! In-memory reminder collection and identity assignment
//!
//! The store is the only place reminder and group ids are minted. The
//! expansion step stays pure; the store turns templates and expansions
//! into owned `Reminder` records and keeps the list sorted.

use chrono::{NaiveDateTime, Utc};

use crate::error::{Result, TanbihError};
use crate::models::{Reminder, ReminderTemplate};
use crate::recurrence::Expansion;

/// Monotonic id source seeded from the wall clock.
///
/// Ids are millisecond timestamps when the clock permits, and previous id
/// plus one otherwise, so rapid allocations within one millisecond and
/// ids loaded from an existing bundle never collide.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: i64,
}

impl IdAllocator {
    /// Allocator with no prior ids
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator that will only hand out ids above `max_seen`
    #[must_use]
    pub fn seeded(max_seen: i64) -> Self {
        Self { last: max_seen }
    }

    /// Next unique id, strictly greater than every id handed out before
    pub fn next(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last
    }
}

/// Reminder collection ordered by due time.
///
/// Ordering ties (identical due times) keep insertion order; the sort is
/// stable.
#[derive(Debug, Default)]
pub struct ReminderStore {
    reminders: Vec<Reminder>,
    allocator: IdAllocator,
}

impl ReminderStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store over reminders loaded from a bundle.
    ///
    /// The allocator is seeded past every id and group id already present
    /// so new allocations cannot collide with loaded records.
    #[must_use]
    pub fn from_reminders(mut reminders: Vec<Reminder>) -> Self {
        let max_seen = reminders
            .iter()
            .flat_map(|r| [Some(r.id), r.group_id])
            .flatten()
            .max()
            .unwrap_or(0);
        reminders.sort_by_key(|r| r.date_time);
        Self {
            reminders,
            allocator: IdAllocator::seeded(max_seen),
        }
    }

    /// Add a one-off reminder due at `date_time`; returns its id.
    ///
    /// # Errors
    /// `InvalidInput` when the template text is blank.
    pub fn add_single(
        &mut self,
        template: &ReminderTemplate,
        date_time: NaiveDateTime,
    ) -> Result<i64> {
        if template.text.trim().is_empty() {
            return Err(TanbihError::invalid_input("reminder text is required"));
        }
        let id = self.allocator.next();
        self.insert(Reminder {
            id,
            text: template.text.clone(),
            date_time,
            sound: template.sound,
            vibration: template.vibration,
            completed: false,
            group_id: None,
        });
        Ok(id)
    }

    /// Add every occurrence of an expansion under one fresh group id.
    ///
    /// Returns the group id, or `None` when the expansion is empty and
    /// nothing was added.
    pub fn add_expansion(
        &mut self,
        template: &ReminderTemplate,
        expansion: &Expansion,
    ) -> Option<i64> {
        if expansion.occurrences.is_empty() {
            return None;
        }
        let group_id = self.allocator.next();
        for occurrence in &expansion.occurrences {
            let id = self.allocator.next();
            self.insert(Reminder {
                id,
                text: template.text.clone(),
                date_time: *occurrence,
                sound: template.sound,
                vibration: template.vibration,
                completed: false,
                group_id: Some(group_id),
            });
        }
        Some(group_id)
    }

    /// Flip a reminder's completed flag; returns false when the id is unknown
    pub fn toggle_done(&mut self, id: i64) -> bool {
        match self.reminders.iter_mut().find(|r| r.id == id) {
            Some(reminder) => {
                reminder.completed = !reminder.completed;
                true
            }
            None => false,
        }
    }

    /// Remove one reminder; returns false when the id is unknown.
    ///
    /// Removal is always individual. Siblings of a recurring group keep
    /// their records and their shared group id.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.reminders.len();
        self.reminders.retain(|r| r.id != id);
        self.reminders.len() < before
    }

    /// All reminders, earliest due first
    #[must_use]
    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    /// Reminder by id
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    /// Uncompleted reminders strictly after `now`, earliest due first
    pub fn pending(&self, now: NaiveDateTime) -> impl Iterator<Item = &Reminder> {
        self.reminders.iter().filter(move |r| r.is_pending(now))
    }

    /// Number of reminders held
    #[must_use]
    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    /// True when no reminders are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    /// Consume the store, yielding the sorted reminders for persistence
    #[must_use]
    pub fn into_reminders(self) -> Vec<Reminder> {
        self.reminders
    }

    fn insert(&mut self, reminder: Reminder) {
        self.reminders.push(reminder);
        self.reminders.sort_by_key(|r| r.date_time);
    }
}
