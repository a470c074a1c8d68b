//! Notification side effects: cue catalogs, the permission capability, and
//! the delivery seam the scheduler fires through

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Host notification permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Permission {
    /// Not yet decided; delivery is not attempted
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "granted")]
    Granted,
    #[serde(rename = "denied")]
    Denied,
}

/// Audio cue catalog; each key maps to a bundled audio asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SoundCue {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "bell")]
    Bell,
    #[serde(rename = "chime")]
    Chime,
}

impl SoundCue {
    /// Every catalog entry, in display order
    pub const ALL: [Self; 3] = [Self::Default, Self::Bell, Self::Chime];

    /// Stable key used in the bundle and on the CLI
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Bell => "bell",
            Self::Chime => "chime",
        }
    }

    /// Bundled audio asset played when the cue fires
    #[must_use]
    pub fn asset(self) -> &'static str {
        match self {
            Self::Default => "sounds/default.mp3",
            Self::Bell => "sounds/bell.mp3",
            Self::Chime => "sounds/chime.mp3",
        }
    }
}

/// Vibration pattern catalog; each key maps to a pulse sequence in
/// milliseconds (alternating on/off)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VibrationPattern {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "double")]
    Double,
}

impl VibrationPattern {
    /// Every catalog entry, in display order
    pub const ALL: [Self; 4] = [Self::Default, Self::Short, Self::Long, Self::Double];

    /// Stable key used in the bundle and on the CLI
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Short => "short",
            Self::Long => "long",
            Self::Double => "double",
        }
    }

    /// Pulse sequence in milliseconds
    #[must_use]
    pub fn pulses(self) -> &'static [u64] {
        match self {
            Self::Default => &[200],
            Self::Short => &[100],
            Self::Long => &[600],
            Self::Double => &[150, 100, 150],
        }
    }
}

/// Capability for raising notification side effects.
///
/// The scheduler consults `permission()` at fire time and only then calls
/// `deliver`; implementations may assume the gate was applied.
pub trait Notifier: Send + Sync {
    /// Current host permission state
    fn permission(&self) -> Permission;

    /// Play the audio cue and raise a notification carrying `text` and the
    /// vibration pattern
    fn deliver(&self, sound: SoundCue, text: &str, vibration: VibrationPattern);
}

/// Terminal-backed notifier: prints an alert line and rings the terminal
/// bell once per pulse in the pattern
pub struct TerminalNotifier {
    permission: Permission,
    // Concurrent firings must not interleave their alert lines
    out: Mutex<()>,
}

impl TerminalNotifier {
    /// Create a notifier with the given permission state
    #[must_use]
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            out: Mutex::new(()),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn deliver(&self, sound: SoundCue, text: &str, vibration: VibrationPattern) {
        let _guard = self.out.lock();
        let bells = "\u{7}".repeat(vibration.pulses().len());
        println!("{bells}تذكير! {text}");
        debug!(
            sound = sound.key(),
            vibration = vibration.key(),
            "delivered terminal notification"
        );
    }
}
