//! Tanbih CLI library
//! Command definitions, argument conversions and output formatting for the
//! `tanbih` binary

pub mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

use tanbih_common::{
    format_countdown, format_reminder_datetime, truncate_string, PERIODS_PER_DAY,
};
use tanbih_core::{
    Cadence, ChildSchedule, ConvertedDate, MonthlyMode, NaiveDate, NaiveDateTime, Permission,
    Reminder, ReminderKind, Result, SchoolDay, SoundCue, TanbihError, Theme, VibrationPattern,
    WeekRank, Weekday,
};

#[derive(Parser, Debug)]
#[command(name = "tanbih")]
#[command(about = "Family reminders with school timetables and Hijri date conversion")]
#[command(version)]
pub struct Cli {
    /// Account username
    #[arg(long, short, env = "TANBIH_USER")]
    pub user: Option<String>,

    /// Account password
    #[arg(long, env = "TANBIH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Data directory (defaults to the platform data dir)
    #[arg(long, short, env = "TANBIH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "TANBIH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Write file logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create a new account
    Register,
    /// Add a one-off reminder
    Add {
        /// Reminder text
        text: String,
        /// Due date and time, YYYY-MM-DDTHH:MM
        #[arg(long)]
        at: String,
        /// Audio cue played when the reminder fires
        #[arg(long, value_enum, default_value = "default")]
        sound: SoundArg,
        /// Vibration pattern used when the reminder fires
        #[arg(long, value_enum, default_value = "default")]
        vibration: VibrationArg,
    },
    /// Add a recurring reminder series
    Recur {
        /// Reminder text
        text: String,
        /// First occurrence, YYYY-MM-DDTHH:MM
        #[arg(long)]
        start: String,
        /// Last calendar day of the series, YYYY-MM-DD (inclusive)
        #[arg(long)]
        end: String,
        /// Repeat cadence
        #[arg(long, value_enum)]
        every: CadenceArg,
        /// Day of month for monthly series, 1-31 (clamped to month length)
        #[arg(long)]
        day: Option<u8>,
        /// Week rank for monthly series, paired with --weekday
        #[arg(long, value_enum)]
        rank: Option<RankArg>,
        /// Weekday for monthly series, paired with --rank
        #[arg(long, value_enum)]
        weekday: Option<WeekdayArg>,
        /// Audio cue played when a reminder fires
        #[arg(long, value_enum, default_value = "default")]
        sound: SoundArg,
        /// Vibration pattern used when a reminder fires
        #[arg(long, value_enum, default_value = "default")]
        vibration: VibrationArg,
    },
    /// List reminders
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Only reminders still due
        #[arg(long)]
        pending: bool,
    },
    /// Toggle a reminder between done and pending
    Done {
        /// Reminder id
        id: i64,
    },
    /// Remove one reminder; other instances of a series stay
    Rm {
        /// Reminder id
        id: i64,
    },
    /// Show or set the colour theme
    Theme {
        /// New theme; omit to show the current one
        #[arg(value_enum)]
        theme: Option<ThemeArg>,
    },
    /// Manage the children's school timetables
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
    /// Convert dates between the Gregorian and Hijri calendars
    Convert {
        #[command(subcommand)]
        direction: ConvertAction,
    },
    /// Arm pending reminders and alert in the terminal when they fire
    Watch {
        /// Notification permission to run with
        #[arg(long, value_enum, default_value = "granted")]
        permission: PermissionArg,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ScheduleAction {
    /// Add a child with a blank school week
    AddChild {
        /// Child's name
        name: String,
    },
    /// Remove a child and their timetable
    RmChild {
        /// Child's name
        name: String,
    },
    /// Set the subject for one period; an empty subject frees the slot
    Set {
        /// Child's name
        child: String,
        /// School day
        #[arg(long, value_enum)]
        day: DayArg,
        /// Period number, 1-7
        #[arg(long)]
        period: usize,
        /// Subject name
        #[arg(long)]
        subject: String,
    },
    /// Print a child's school week
    Show {
        /// Child's name
        child: String,
    },
    /// Add a homework or exam reminder for one period's subject
    Remind {
        /// Child's name
        child: String,
        /// School day
        #[arg(long, value_enum)]
        day: DayArg,
        /// Period number, 1-7
        #[arg(long)]
        period: usize,
        /// Reminder kind
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Due date and time, YYYY-MM-DDTHH:MM
        #[arg(long)]
        at: String,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConvertAction {
    /// Today's date in the Hijri calendar
    Today,
    /// Convert a Gregorian date, YYYY-MM-DD, to Hijri
    ToHijri {
        /// Gregorian date
        date: String,
    },
    /// Convert a Hijri date to Gregorian
    ToGregorian {
        /// Hijri year
        year: i32,
        /// Hijri month, 1-12
        month: u32,
        /// Hijri day, 1-30
        day: u32,
    },
}

/// Audio cue choices on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundArg {
    Default,
    Bell,
    Chime,
}

impl From<SoundArg> for SoundCue {
    fn from(arg: SoundArg) -> Self {
        match arg {
            SoundArg::Default => Self::Default,
            SoundArg::Bell => Self::Bell,
            SoundArg::Chime => Self::Chime,
        }
    }
}

/// Vibration pattern choices on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VibrationArg {
    Default,
    Short,
    Long,
    Double,
}

impl From<VibrationArg> for VibrationPattern {
    fn from(arg: VibrationArg) -> Self {
        match arg {
            VibrationArg::Default => Self::Default,
            VibrationArg::Short => Self::Short,
            VibrationArg::Long => Self::Long,
            VibrationArg::Double => Self::Double,
        }
    }
}

/// Repeat cadence choices on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CadenceArg {
    Daily,
    Weekly,
    Monthly,
}

/// Week rank choices for monthly series
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankArg {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl From<RankArg> for WeekRank {
    fn from(arg: RankArg) -> Self {
        match arg {
            RankArg::First => Self::First,
            RankArg::Second => Self::Second,
            RankArg::Third => Self::Third,
            RankArg::Fourth => Self::Fourth,
            RankArg::Last => Self::Last,
        }
    }
}

/// Weekday choices for monthly series
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeekdayArg {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl From<WeekdayArg> for Weekday {
    fn from(arg: WeekdayArg) -> Self {
        match arg {
            WeekdayArg::Sunday => Self::Sun,
            WeekdayArg::Monday => Self::Mon,
            WeekdayArg::Tuesday => Self::Tue,
            WeekdayArg::Wednesday => Self::Wed,
            WeekdayArg::Thursday => Self::Thu,
            WeekdayArg::Friday => Self::Fri,
            WeekdayArg::Saturday => Self::Sat,
        }
    }
}

/// School day choices on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayArg {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
}

impl From<DayArg> for SchoolDay {
    fn from(arg: DayArg) -> Self {
        match arg {
            DayArg::Sunday => Self::Sunday,
            DayArg::Monday => Self::Monday,
            DayArg::Tuesday => Self::Tuesday,
            DayArg::Wednesday => Self::Wednesday,
            DayArg::Thursday => Self::Thursday,
        }
    }
}

/// Reminder kind choices for schedule reminders
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Homework,
    Exam,
}

impl From<KindArg> for ReminderKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Homework => Self::Homework,
            KindArg::Exam => Self::Exam,
        }
    }
}

/// Theme choices on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeArg {
    Sky,
    Emerald,
    Rose,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Sky => Self::Sky,
            ThemeArg::Emerald => Self::Emerald,
            ThemeArg::Rose => Self::Rose,
        }
    }
}

/// Notification permission choices for `watch`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionArg {
    Default,
    Granted,
    Denied,
}

impl From<PermissionArg> for Permission {
    fn from(arg: PermissionArg) -> Self {
        match arg {
            PermissionArg::Default => Self::Default,
            PermissionArg::Granted => Self::Granted,
            PermissionArg::Denied => Self::Denied,
        }
    }
}

/// Resolve the username and password from flags or environment
///
/// # Errors
/// Returns an error naming the missing credential
pub fn credentials(user: Option<String>, password: Option<String>) -> Result<(String, String)> {
    let user = user.ok_or_else(|| {
        TanbihError::configuration("username is required; pass --user or set TANBIH_USER")
    })?;
    let password = password.ok_or_else(|| {
        TanbihError::configuration("password is required; pass --password or set TANBIH_PASSWORD")
    })?;
    Ok((user, password))
}

/// Parse a reminder due time from the command line
///
/// # Errors
/// Returns an error if `value` is not in YYYY-MM-DDTHH:MM form
pub fn parse_at(value: &str) -> Result<NaiveDateTime> {
    tanbih_common::parse_reminder_datetime(value).map_err(|_| {
        TanbihError::invalid_input(format!(
            "invalid date-time {value:?}, expected YYYY-MM-DDTHH:MM"
        ))
    })
}

/// Parse a calendar date from the command line
///
/// # Errors
/// Returns an error if `value` is not in YYYY-MM-DD form
pub fn parse_end(value: &str) -> Result<NaiveDate> {
    tanbih_common::parse_date(value).map_err(|_| {
        TanbihError::invalid_input(format!("invalid date {value:?}, expected YYYY-MM-DD"))
    })
}

/// Build the recurrence cadence from the `recur` flags
///
/// # Errors
/// Returns an error if the monthly flags are missing or mixed, or if a
/// monthly-only flag is given for a daily or weekly series
pub fn cadence(
    every: CadenceArg,
    day: Option<u8>,
    rank: Option<RankArg>,
    weekday: Option<WeekdayArg>,
) -> Result<Cadence> {
    if every != CadenceArg::Monthly && (day.is_some() || rank.is_some() || weekday.is_some()) {
        return Err(TanbihError::invalid_input(
            "--day, --rank and --weekday only apply to --every monthly",
        ));
    }
    match every {
        CadenceArg::Daily => Ok(Cadence::Daily),
        CadenceArg::Weekly => Ok(Cadence::Weekly),
        CadenceArg::Monthly => monthly_mode(day, rank, weekday).map(Cadence::Monthly),
    }
}

fn monthly_mode(
    day: Option<u8>,
    rank: Option<RankArg>,
    weekday: Option<WeekdayArg>,
) -> Result<MonthlyMode> {
    match (day, rank, weekday) {
        (Some(day), None, None) => Ok(MonthlyMode::SpecificDate { day }),
        (None, Some(rank), Some(weekday)) => Ok(MonthlyMode::RelativeWeekday {
            rank: rank.into(),
            weekday: weekday.into(),
        }),
        _ => Err(TanbihError::invalid_input(
            "monthly cadence needs either --day, or --rank with --weekday",
        )),
    }
}

/// Print reminders to the given writer
///
/// # Examples
///
/// ```
/// use tanbih_cli::print_reminders;
/// use std::io;
///
/// # fn example() -> tanbih_core::Result<()> {
/// let now = chrono::Local::now().naive_local();
/// print_reminders(&[], now, &mut io::stdout())?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns an error if writing fails
pub fn print_reminders<W: Write>(
    reminders: &[Reminder],
    now: NaiveDateTime,
    writer: &mut W,
) -> Result<()> {
    if reminders.is_empty() {
        writeln!(writer, "No reminders")?;
        return Ok(());
    }

    writeln!(writer, "Found {} reminders:", reminders.len())?;
    for reminder in reminders {
        let marker = if reminder.completed { "x" } else { " " };
        writeln!(
            writer,
            "  • [{marker}] {} {}",
            format_reminder_datetime(&reminder.date_time),
            truncate_string(&reminder.text, 60)
        )?;
        writeln!(writer, "    id: {}", reminder.id)?;
        if let Some(group_id) = reminder.group_id {
            writeln!(writer, "    group: {group_id}")?;
        }
        if !reminder.completed {
            let seconds = (reminder.date_time - now).num_seconds();
            writeln!(writer, "    due: {}", format_countdown(seconds))?;
        }
    }
    Ok(())
}

/// Print reminders as pretty JSON to the given writer
///
/// # Errors
/// Returns an error if serialization or writing fails
pub fn print_reminders_json<W: Write>(reminders: &[Reminder], writer: &mut W) -> Result<()> {
    let json = serde_json::to_string_pretty(reminders)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Print a child's school week to the given writer, one line per day with
/// `-` marking free periods
///
/// # Examples
///
/// ```
/// use tanbih_cli::print_schedule;
/// use tanbih_core::ChildSchedule;
/// use std::io;
///
/// # fn example() -> tanbih_core::Result<()> {
/// let child = ChildSchedule::new("سارة");
/// print_schedule(&child, &mut io::stdout())?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns an error if writing fails
pub fn print_schedule<W: Write>(child: &ChildSchedule, writer: &mut W) -> Result<()> {
    writeln!(writer, "Week for {}:", child.name)?;
    for day in SchoolDay::ALL {
        let subjects = (1..=PERIODS_PER_DAY)
            .map(|period| child.week.subject(day, period))
            .collect::<Result<Vec<_>>>()?;
        let line = subjects
            .iter()
            .map(|subject| if subject.is_empty() { "-" } else { subject })
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(writer, "  {}: {line}", day.label())?;
    }
    Ok(())
}

/// Print a converted calendar date to the given writer
///
/// # Errors
/// Returns an error if writing fails
pub fn print_converted<W: Write>(date: &ConvertedDate, writer: &mut W) -> Result<()> {
    writeln!(writer, "{date}")?;
    writeln!(writer, "  {}-{:02}-{:02}", date.year, date.month, date.day)?;
    Ok(())
}
