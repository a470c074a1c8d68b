//! Test utilities and mock data for reminder scenarios

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;

use crate::models::{Reminder, UserData};
use crate::notify::{Notifier, Permission, SoundCue, VibrationPattern};

/// One recorded [`MockNotifier`] delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredNote {
    /// Reminder text as handed to the notifier
    pub text: String,
    /// Sound cue requested
    pub sound: SoundCue,
    /// Vibration pattern requested
    pub vibration: VibrationPattern,
}

/// Notifier that records deliveries instead of producing output.
///
/// The permission is mutable after construction so tests can flip it
/// between arming a timer and its fire time.
#[derive(Debug, Default)]
pub struct MockNotifier {
    permission: Mutex<Permission>,
    deliveries: Mutex<Vec<DeliveredNote>>,
}

impl MockNotifier {
    /// Mock with notification permission granted
    #[must_use]
    pub fn granted() -> Arc<Self> {
        Self::with_permission(Permission::Granted)
    }

    /// Mock with notification permission denied
    #[must_use]
    pub fn denied() -> Arc<Self> {
        Self::with_permission(Permission::Denied)
    }

    /// Mock with an arbitrary starting permission
    #[must_use]
    pub fn with_permission(permission: Permission) -> Arc<Self> {
        Arc::new(Self {
            permission: Mutex::new(permission),
            deliveries: Mutex::new(Vec::new()),
        })
    }

    /// Change the permission reported to callers
    pub fn set_permission(&self, permission: Permission) {
        *self.permission.lock() = permission;
    }

    /// Snapshot of every delivery recorded so far
    #[must_use]
    pub fn deliveries(&self) -> Vec<DeliveredNote> {
        self.deliveries.lock().clone()
    }

    /// Number of deliveries recorded so far
    #[must_use]
    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().len()
    }
}

impl Notifier for MockNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock()
    }

    fn deliver(&self, sound: SoundCue, text: &str, vibration: VibrationPattern) {
        self.deliveries.lock().push(DeliveredNote {
            text: text.to_string(),
            sound,
            vibration,
        });
    }
}

/// A due timestamp helper for fixture data
#[must_use]
pub fn sample_time(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .unwrap_or_default()
}

/// A reminder fixture with defaults for everything but id, text and time
#[must_use]
pub fn sample_reminder(id: i64, text: &str, date_time: NaiveDateTime) -> Reminder {
    Reminder {
        id,
        text: text.to_string(),
        date_time,
        sound: SoundCue::Default,
        vibration: VibrationPattern::Default,
        completed: false,
        group_id: None,
    }
}

/// A small populated bundle: two pending reminders and one completed
#[must_use]
pub fn sample_user_data() -> UserData {
    let mut completed = sample_reminder(3, "تم الدفع", sample_time(2024, 1, 5, 10, 0));
    completed.completed = true;
    UserData {
        reminders: vec![
            sample_reminder(1, "دواء الضغط", sample_time(2024, 2, 1, 8, 0)),
            sample_reminder(2, "اجتماع المدرسة", sample_time(2024, 2, 3, 17, 30)),
            completed,
        ],
        ..UserData::default()
    }
}
