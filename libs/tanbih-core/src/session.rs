//! A logged-in user's working state
//!
//! The session owns the reminder store, the timetable and the theme, and
//! writes the whole bundle back through the vault after every mutation.
//! Persistence is best-effort: a failed save is logged and the in-memory
//! state stands. When a scheduler is attached, every mutation also
//! rebuilds the armed timers so they mirror the store.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::TanbihConfig;
use crate::error::{Result, TanbihError};
use crate::models::{Reminder, ReminderTemplate, Theme, UserData};
use crate::notify::Notifier;
use crate::recurrence::{self, RecurrenceConfig};
use crate::scheduler::NotificationScheduler;
use crate::storage::{AccountStore, UserVault};
use crate::store::ReminderStore;
use crate::timetable::{subject_reminder, ChildSchedule, ReminderKind, SchoolDay};

/// What came out of adding a recurring reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringOutcome {
    /// Group id shared by the added instances; `None` when the recurrence
    /// produced no occurrences and nothing was added
    pub group_id: Option<i64>,
    /// Number of reminder instances added
    pub added: usize,
    /// True when an expansion cap cut the series short of the end date
    pub truncated: bool,
}

/// One user's loaded bundle plus the operations the app offers on it
pub struct Session {
    username: String,
    vault: UserVault,
    store: ReminderStore,
    schedules: Vec<ChildSchedule>,
    theme: Theme,
    scheduler: Option<NotificationScheduler>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Verify credentials and load the user's bundle.
    ///
    /// # Errors
    /// `InvalidCredentials` on a bad pair, plus storage errors.
    pub fn login(config: &TanbihConfig, username: &str, password: &str) -> Result<Self> {
        let accounts = AccountStore::open(config)?;
        accounts.verify(username, password)?;
        debug!(username, "login accepted");
        Self::open(config, username)
    }

    /// Create an account, then open an empty session for it.
    ///
    /// # Errors
    /// `AccountExists` or `InvalidUsername` on rejection, plus storage
    /// errors.
    pub fn register(config: &TanbihConfig, username: &str, password: &str) -> Result<Self> {
        let mut accounts = AccountStore::open(config)?;
        accounts.register(username, password)?;
        Self::open(config, username)
    }

    fn open(config: &TanbihConfig, username: &str) -> Result<Self> {
        let vault = UserVault::new(config);
        let data = vault.load(username)?;
        Ok(Self {
            username: username.to_string(),
            vault,
            store: ReminderStore::from_reminders(data.reminders),
            schedules: data.schedules,
            theme: data.theme,
            scheduler: None,
        })
    }

    /// Logged-in username
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Active color theme
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// All reminders, earliest due first
    #[must_use]
    pub fn reminders(&self) -> &[Reminder] {
        self.store.reminders()
    }

    /// Uncompleted reminders strictly after `now`
    pub fn pending(&self, now: NaiveDateTime) -> impl Iterator<Item = &Reminder> {
        self.store.pending(now)
    }

    /// Children with timetables, in the order they were added
    #[must_use]
    pub fn children(&self) -> &[ChildSchedule] {
        &self.schedules
    }

    /// One child's timetable.
    ///
    /// # Errors
    /// `UnknownChild` when no timetable carries that name.
    pub fn child(&self, name: &str) -> Result<&ChildSchedule> {
        self.schedules
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TanbihError::UnknownChild {
                name: name.to_string(),
            })
    }

    /// Start delivering notifications for pending reminders through
    /// `notifier`. Timers are armed relative to `now` and re-armed after
    /// every mutation.
    pub fn attach_scheduler(&mut self, notifier: Arc<dyn Notifier>, now: NaiveDateTime) {
        let scheduler = NotificationScheduler::new(notifier);
        scheduler.reschedule(self.store.reminders(), now);
        self.scheduler = Some(scheduler);
    }

    /// Number of timers currently armed; zero without a scheduler
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.scheduler.as_ref().map_or(0, NotificationScheduler::armed_count)
    }

    /// Add a one-off reminder; returns its id.
    ///
    /// # Errors
    /// `InvalidInput` on blank text.
    pub fn add_reminder(
        &mut self,
        template: &ReminderTemplate,
        date_time: NaiveDateTime,
    ) -> Result<i64> {
        let id = self.store.add_single(template, date_time)?;
        self.commit();
        Ok(id)
    }

    /// Expand a recurrence and add every occurrence under one group.
    ///
    /// # Errors
    /// Validation errors from the expansion.
    pub fn add_recurring(
        &mut self,
        template: &ReminderTemplate,
        config: &RecurrenceConfig,
    ) -> Result<RecurringOutcome> {
        let expansion = recurrence::expand(template, config)?;
        let group_id = self.store.add_expansion(template, &expansion);
        if group_id.is_some() {
            self.commit();
        }
        Ok(RecurringOutcome {
            group_id,
            added: expansion.occurrences.len(),
            truncated: expansion.truncated,
        })
    }

    /// Flip a reminder between done and pending.
    ///
    /// # Errors
    /// `UnknownReminder` for an unknown id.
    pub fn toggle_done(&mut self, id: i64) -> Result<()> {
        if !self.store.toggle_done(id) {
            return Err(TanbihError::UnknownReminder { id });
        }
        self.commit();
        Ok(())
    }

    /// Delete one reminder. Siblings of a recurring group are untouched.
    ///
    /// # Errors
    /// `UnknownReminder` for an unknown id.
    pub fn remove_reminder(&mut self, id: i64) -> Result<()> {
        if !self.store.remove(id) {
            return Err(TanbihError::UnknownReminder { id });
        }
        self.commit();
        Ok(())
    }

    /// Switch the color theme
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.commit();
    }

    /// Add a child with an all-free timetable.
    ///
    /// # Errors
    /// `InvalidInput` on a blank or duplicate name.
    pub fn add_child(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TanbihError::invalid_input("child name is required"));
        }
        if self.schedules.iter().any(|c| c.name == name) {
            return Err(TanbihError::invalid_input(format!(
                "a schedule for {name} already exists"
            )));
        }
        self.schedules.push(ChildSchedule::new(name));
        self.commit();
        Ok(())
    }

    /// Remove a child and their timetable.
    ///
    /// # Errors
    /// `UnknownChild` when no timetable carries that name.
    pub fn remove_child(&mut self, name: &str) -> Result<()> {
        let before = self.schedules.len();
        self.schedules.retain(|c| c.name != name);
        if self.schedules.len() == before {
            return Err(TanbihError::UnknownChild {
                name: name.to_string(),
            });
        }
        self.commit();
        Ok(())
    }

    /// Write a subject into a child's timetable slot.
    ///
    /// # Errors
    /// `UnknownChild` or `InvalidPeriod`.
    pub fn set_subject(
        &mut self,
        child: &str,
        day: SchoolDay,
        period: usize,
        subject: &str,
    ) -> Result<()> {
        let schedule = self
            .schedules
            .iter_mut()
            .find(|c| c.name == child)
            .ok_or_else(|| TanbihError::UnknownChild {
                name: child.to_string(),
            })?;
        schedule.week.set_subject(day, period, subject)?;
        self.commit();
        Ok(())
    }

    /// Add a homework or exam reminder for a subject already on a child's
    /// timetable; returns the new reminder's id.
    ///
    /// # Errors
    /// `UnknownChild`, `InvalidPeriod`, or `InvalidInput` when the slot is
    /// a free period.
    pub fn add_subject_reminder(
        &mut self,
        child: &str,
        day: SchoolDay,
        period: usize,
        kind: ReminderKind,
        date_time: NaiveDateTime,
    ) -> Result<i64> {
        let text = {
            let schedule = self.child(child)?;
            let subject = schedule.week.subject(day, period)?;
            if subject.is_empty() {
                return Err(TanbihError::invalid_input(
                    "that period is free, nothing to remind about",
                ));
            }
            subject_reminder(kind, subject, child)
        };
        let id = self.store.add_single(&ReminderTemplate::new(text), date_time)?;
        self.commit();
        Ok(id)
    }

    fn to_user_data(&self) -> UserData {
        UserData {
            reminders: self.store.reminders().to_vec(),
            schedules: self.schedules.clone(),
            theme: self.theme,
        }
    }

    // Side effects never undo the in-memory change. A failed save is
    // logged and the next successful commit writes the full bundle anyway.
    fn commit(&mut self) {
        if let Err(error) = self.vault.save(&self.username, &self.to_user_data()) {
            warn!(username = %self.username, %error, "failed to persist user bundle");
        }
        if let Some(scheduler) = &self.scheduler {
            scheduler.reschedule(self.store.reminders(), Local::now().naive_local());
        }
    }
}
