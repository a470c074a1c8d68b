//! Delivery scheduling for pending reminders
//!
//! One timer task per pending reminder. Rescheduling tears every armed
//! timer down and rebuilds from the current list, so the task set always
//! mirrors the store and edits never leave stale timers behind.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::Reminder;
use crate::notify::{Notifier, Permission};

/// Arms one tokio timer per pending reminder and delivers through the
/// injected [`Notifier`] when a timer elapses.
///
/// The notification permission is read at fire time, not at arm time, so
/// changing it between the two takes effect without a reschedule.
pub struct NotificationScheduler {
    notifier: Arc<dyn Notifier>,
    tasks: Mutex<HashMap<i64, JoinHandle<()>>>,
}

impl NotificationScheduler {
    /// Scheduler delivering through `notifier`
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every armed timer and arm one per reminder still pending at
    /// `now`. Completed and already-due reminders are not armed.
    pub fn reschedule(&self, reminders: &[Reminder], now: NaiveDateTime) {
        let mut tasks = self.tasks.lock();
        for (_, task) in tasks.drain() {
            task.abort();
        }

        for reminder in reminders.iter().filter(|r| r.is_pending(now)) {
            let Ok(delay) = (reminder.date_time - now).to_std() else {
                continue;
            };
            let notifier = Arc::clone(&self.notifier);
            let text = reminder.text.clone();
            let sound = reminder.sound;
            let vibration = reminder.vibration;
            let id = reminder.id;

            let task = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if notifier.permission() == Permission::Granted {
                    notifier.deliver(sound, &text, vibration);
                } else {
                    debug!(id, "notification suppressed, permission not granted");
                }
            });
            tasks.insert(id, task);
        }
        debug!(armed = tasks.len(), "reminder timers rescheduled");
    }

    /// Drop every armed timer
    pub fn cancel_all(&self) {
        let mut tasks = self.tasks.lock();
        for (_, task) in tasks.drain() {
            task.abort();
        }
    }

    /// Number of timers armed by the last reschedule, fired or not
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
