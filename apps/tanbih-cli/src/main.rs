//! Tanbih CLI - family reminders, school timetables and Hijri dates from
//! the terminal

use std::io;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tanbih_cli::{
    cadence, credentials, logging, parse_at, parse_end, print_converted, print_reminders,
    print_reminders_json, print_schedule, Cli, Commands, ConvertAction, ScheduleAction,
};
use tanbih_core::{
    CalendarConverter, GeminiConverter, RecurrenceConfig, ReminderTemplate, Session, TanbihConfig,
    TerminalNotifier,
};
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so file logs flush on exit
    let _log_guard = match cli.log_file.as_deref() {
        Some(path) => Some(logging::init_file_logging(
            path,
            if cli.verbose { "debug" } else { "info" },
            cli.log_json,
        )?),
        None => {
            logging::init(cli.verbose)?;
            None
        }
    };

    let config = cli
        .data_dir
        .map_or_else(TanbihConfig::from_env, TanbihConfig::new);

    match cli.command {
        Commands::Register => {
            let (username, password) = credentials(cli.user, cli.password)?;
            let session = Session::register(&config, &username, &password)?;
            println!("Account created for {}", session.username());
        }
        Commands::Add {
            text,
            at,
            sound,
            vibration,
        } => {
            let mut session = open_session(&config, cli.user, cli.password)?;
            let due = parse_at(&at)?;
            let template = ReminderTemplate::with_cues(text, sound.into(), vibration.into());
            let id = session.add_reminder(&template, due)?;
            println!("Added reminder {id}");
        }
        Commands::Recur {
            text,
            start,
            end,
            every,
            day,
            rank,
            weekday,
            sound,
            vibration,
        } => {
            let mut session = open_session(&config, cli.user, cli.password)?;
            let recurrence = RecurrenceConfig {
                cadence: cadence(every, day, rank, weekday)?,
                start: Some(parse_at(&start)?),
                end_date: Some(parse_end(&end)?),
            };
            let template = ReminderTemplate::with_cues(text, sound.into(), vibration.into());
            let outcome = session.add_recurring(&template, &recurrence)?;
            match outcome.group_id {
                Some(group_id) => {
                    println!("Added {} reminders (group {group_id})", outcome.added);
                }
                None => println!("No occurrences fall inside the range"),
            }
            if outcome.truncated {
                println!("Series stopped at the occurrence cap; later dates were not added");
            }
        }
        Commands::List { json, pending } => {
            let session = open_session(&config, cli.user, cli.password)?;
            let now = Local::now().naive_local();
            let reminders: Vec<_> = if pending {
                session.pending(now).cloned().collect()
            } else {
                session.reminders().to_vec()
            };
            if json {
                print_reminders_json(&reminders, &mut io::stdout())?;
            } else {
                print_reminders(&reminders, now, &mut io::stdout())?;
            }
        }
        Commands::Done { id } => {
            let mut session = open_session(&config, cli.user, cli.password)?;
            session.toggle_done(id)?;
            println!("Toggled reminder {id}");
        }
        Commands::Rm { id } => {
            let mut session = open_session(&config, cli.user, cli.password)?;
            session.remove_reminder(id)?;
            println!("Removed reminder {id}");
        }
        Commands::Theme { theme } => {
            let mut session = open_session(&config, cli.user, cli.password)?;
            match theme {
                Some(theme) => {
                    session.set_theme(theme.into());
                    println!("Theme set to {}", session.theme().name());
                }
                None => println!("Theme: {}", session.theme().name()),
            }
        }
        Commands::Schedule { action } => {
            let mut session = open_session(&config, cli.user, cli.password)?;
            run_schedule_action(&mut session, action)?;
        }
        Commands::Convert { direction } => {
            let converter = GeminiConverter::from_env()?;
            let converted = match direction {
                ConvertAction::Today => converter.today_hijri().await?,
                ConvertAction::ToHijri { date } => converter.to_hijri(parse_end(&date)?).await?,
                ConvertAction::ToGregorian { year, month, day } => {
                    converter.to_gregorian(year, month, day).await?
                }
            };
            print_converted(&converted, &mut io::stdout())?;
        }
        Commands::Watch { permission } => {
            let mut session = open_session(&config, cli.user, cli.password)?;
            let notifier = Arc::new(TerminalNotifier::new(permission.into()));
            session.attach_scheduler(notifier, Local::now().naive_local());
            println!(
                "Watching {} pending reminders for {}. Press Ctrl-C to stop.",
                session.armed_count(),
                session.username()
            );
            tokio::signal::ctrl_c().await?;
            println!("Stopped");
        }
    }

    Ok(())
}

fn open_session(
    config: &TanbihConfig,
    user: Option<String>,
    password: Option<String>,
) -> anyhow::Result<Session> {
    let (username, password) = credentials(user, password)?;
    let session = Session::login(config, &username, &password)?;
    debug!("Opened session for {}", session.username());
    Ok(session)
}

fn run_schedule_action(session: &mut Session, action: ScheduleAction) -> anyhow::Result<()> {
    match action {
        ScheduleAction::AddChild { name } => {
            session.add_child(&name)?;
            println!("Added schedule for {name}");
        }
        ScheduleAction::RmChild { name } => {
            session.remove_child(&name)?;
            println!("Removed schedule for {name}");
        }
        ScheduleAction::Set {
            child,
            day,
            period,
            subject,
        } => {
            session.set_subject(&child, day.into(), period, &subject)?;
            if subject.trim().is_empty() {
                println!("Cleared period {period}");
            } else {
                println!("Set period {period} to {}", subject.trim());
            }
        }
        ScheduleAction::Show { child } => {
            let schedule = session.child(&child)?;
            print_schedule(schedule, &mut io::stdout())?;
        }
        ScheduleAction::Remind {
            child,
            day,
            period,
            kind,
            at,
        } => {
            let due = parse_at(&at)?;
            let id = session.add_subject_reminder(&child, day.into(), period, kind.into(), due)?;
            println!("Added reminder {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tanbih_cli::{CadenceArg, DayArg, KindArg, PermissionArg, SoundArg, ThemeArg};
    use tanbih_core::SchoolDay;
    use tempfile::TempDir;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["tanbih"]).is_err());
    }

    #[test]
    fn test_global_flags_parse() {
        let cli = Cli::try_parse_from([
            "tanbih",
            "--user",
            "fatima",
            "--password",
            "secret",
            "--data-dir",
            "/tmp/tanbih",
            "--verbose",
            "list",
        ])
        .unwrap();

        assert_eq!(cli.user.as_deref(), Some("fatima"));
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/tanbih")));
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Commands::List {
                json: false,
                pending: false
            }
        );
    }

    #[test]
    fn test_add_command_parses_and_executes() {
        let dir = TempDir::new().unwrap();
        let config = TanbihConfig::new(dir.path());
        let mut session = Session::register(&config, "fatima", "pw").unwrap();

        let cli = Cli::try_parse_from([
            "tanbih",
            "add",
            "تذكير الدواء",
            "--at",
            "2030-09-01T07:30",
            "--sound",
            "bell",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                text,
                at,
                sound,
                vibration,
            } => {
                assert_eq!(sound, SoundArg::Bell);
                let due = parse_at(&at).unwrap();
                let template =
                    ReminderTemplate::with_cues(text, sound.into(), vibration.into());
                let id = session.add_reminder(&template, due).unwrap();
                assert!(id > 0);
            }
            _ => panic!("Expected add command"),
        }

        let now = parse_at("2030-09-01T07:00").unwrap();
        let mut output = Cursor::new(Vec::new());
        print_reminders(session.reminders(), now, &mut output).unwrap();
        let text = String::from_utf8(output.into_inner()).unwrap();
        assert!(text.contains("تذكير الدواء"));
    }

    #[test]
    fn test_recur_command_expands_series() {
        let dir = TempDir::new().unwrap();
        let config = TanbihConfig::new(dir.path());
        let mut session = Session::register(&config, "fatima", "pw").unwrap();

        let cli = Cli::try_parse_from([
            "tanbih",
            "recur",
            "درس القرآن",
            "--start",
            "2030-09-01T16:00",
            "--end",
            "2030-09-07",
            "--every",
            "daily",
        ])
        .unwrap();

        match cli.command {
            Commands::Recur {
                text,
                start,
                end,
                every,
                day,
                rank,
                weekday,
                sound,
                vibration,
            } => {
                assert_eq!(every, CadenceArg::Daily);
                let recurrence = RecurrenceConfig {
                    cadence: cadence(every, day, rank, weekday).unwrap(),
                    start: Some(parse_at(&start).unwrap()),
                    end_date: Some(parse_end(&end).unwrap()),
                };
                let template =
                    ReminderTemplate::with_cues(text, sound.into(), vibration.into());
                let outcome = session.add_recurring(&template, &recurrence).unwrap();
                assert_eq!(outcome.added, 7);
                assert!(outcome.group_id.is_some());
                assert!(!outcome.truncated);
            }
            _ => panic!("Expected recur command"),
        }

        assert_eq!(session.reminders().len(), 7);
    }

    #[test]
    fn test_recur_command_parses_monthly_relative() {
        let cli = Cli::try_parse_from([
            "tanbih",
            "recur",
            "اجتماع الأسرة",
            "--start",
            "2030-01-01T20:00",
            "--end",
            "2030-12-31",
            "--every",
            "monthly",
            "--rank",
            "last",
            "--weekday",
            "friday",
        ])
        .unwrap();

        match cli.command {
            Commands::Recur {
                every,
                day,
                rank,
                weekday,
                ..
            } => {
                let built = cadence(every, day, rank, weekday).unwrap();
                assert!(matches!(
                    built,
                    tanbih_core::Cadence::Monthly(tanbih_core::MonthlyMode::RelativeWeekday { .. })
                ));
            }
            _ => panic!("Expected recur command"),
        }
    }

    #[test]
    fn test_list_json_flag_round_trips() {
        let dir = TempDir::new().unwrap();
        let config = TanbihConfig::new(dir.path());
        let mut session = Session::register(&config, "fatima", "pw").unwrap();
        let due = parse_at("2030-09-01T07:30").unwrap();
        session
            .add_reminder(&ReminderTemplate::new("موعد الطبيب"), due)
            .unwrap();

        let cli = Cli::try_parse_from(["tanbih", "list", "--json"]).unwrap();
        match cli.command {
            Commands::List { json, pending } => {
                assert!(json);
                assert!(!pending);
                let mut output = Cursor::new(Vec::new());
                print_reminders_json(session.reminders(), &mut output).unwrap();
                let text = String::from_utf8(output.into_inner()).unwrap();
                let back: Vec<tanbih_core::Reminder> = serde_json::from_str(&text).unwrap();
                assert_eq!(back.len(), 1);
                assert_eq!(back[0].text, "موعد الطبيب");
            }
            _ => panic!("Expected list command"),
        }
    }

    #[test]
    fn test_done_and_rm_commands_parse() {
        let cli = Cli::try_parse_from(["tanbih", "done", "42"]).unwrap();
        assert_eq!(cli.command, Commands::Done { id: 42 });

        let cli = Cli::try_parse_from(["tanbih", "rm", "42"]).unwrap();
        assert_eq!(cli.command, Commands::Rm { id: 42 });

        // The id is mandatory
        assert!(Cli::try_parse_from(["tanbih", "rm"]).is_err());
    }

    #[test]
    fn test_theme_show_and_set_parse() {
        let cli = Cli::try_parse_from(["tanbih", "theme"]).unwrap();
        assert_eq!(cli.command, Commands::Theme { theme: None });

        let cli = Cli::try_parse_from(["tanbih", "theme", "rose"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Theme {
                theme: Some(ThemeArg::Rose)
            }
        );
    }

    #[test]
    fn test_schedule_subcommands_parse() {
        let cli = Cli::try_parse_from(["tanbih", "schedule", "add-child", "سارة"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Schedule {
                action: ScheduleAction::AddChild {
                    name: "سارة".to_string()
                }
            }
        );

        let cli = Cli::try_parse_from([
            "tanbih", "schedule", "set", "سارة", "--day", "sunday", "--period", "2", "--subject",
            "علوم",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Schedule {
                action: ScheduleAction::Set {
                    child: "سارة".to_string(),
                    day: DayArg::Sunday,
                    period: 2,
                    subject: "علوم".to_string()
                }
            }
        );

        let cli = Cli::try_parse_from([
            "tanbih",
            "schedule",
            "remind",
            "سارة",
            "--day",
            "monday",
            "--period",
            "1",
            "--kind",
            "exam",
            "--at",
            "2030-09-02T17:00",
        ])
        .unwrap();
        match cli.command {
            Commands::Schedule {
                action: ScheduleAction::Remind { kind, .. },
            } => assert_eq!(kind, KindArg::Exam),
            _ => panic!("Expected schedule remind command"),
        }
    }

    #[test]
    fn test_schedule_actions_execute() {
        let dir = TempDir::new().unwrap();
        let config = TanbihConfig::new(dir.path());
        let mut session = Session::register(&config, "fatima", "pw").unwrap();

        run_schedule_action(
            &mut session,
            ScheduleAction::AddChild {
                name: "عمر".to_string(),
            },
        )
        .unwrap();
        run_schedule_action(
            &mut session,
            ScheduleAction::Set {
                child: "عمر".to_string(),
                day: DayArg::Monday,
                period: 3,
                subject: "رياضيات".to_string(),
            },
        )
        .unwrap();

        let child = session.child("عمر").unwrap();
        assert_eq!(child.week.subject(SchoolDay::Monday, 3).unwrap(), "رياضيات");

        run_schedule_action(
            &mut session,
            ScheduleAction::Remind {
                child: "عمر".to_string(),
                day: DayArg::Monday,
                period: 3,
                kind: KindArg::Homework,
                at: "2030-09-02T17:00".to_string(),
            },
        )
        .unwrap();
        assert_eq!(session.reminders().len(), 1);
        assert_eq!(session.reminders()[0].text, "واجب: رياضيات (عمر)");

        run_schedule_action(
            &mut session,
            ScheduleAction::RmChild {
                name: "عمر".to_string(),
            },
        )
        .unwrap();
        assert!(session.child("عمر").is_err());
    }

    #[test]
    fn test_convert_subcommands_parse() {
        let cli = Cli::try_parse_from(["tanbih", "convert", "today"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Convert {
                direction: ConvertAction::Today
            }
        );

        let cli = Cli::try_parse_from(["tanbih", "convert", "to-hijri", "2030-09-01"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Convert {
                direction: ConvertAction::ToHijri {
                    date: "2030-09-01".to_string()
                }
            }
        );

        let cli =
            Cli::try_parse_from(["tanbih", "convert", "to-gregorian", "1446", "9", "14"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Convert {
                direction: ConvertAction::ToGregorian {
                    year: 1446,
                    month: 9,
                    day: 14
                }
            }
        );
    }

    #[test]
    fn test_watch_defaults_to_granted() {
        let cli = Cli::try_parse_from(["tanbih", "watch"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Watch {
                permission: PermissionArg::Granted
            }
        );

        let cli = Cli::try_parse_from(["tanbih", "watch", "--permission", "denied"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Watch {
                permission: PermissionArg::Denied
            }
        );
    }

    #[test]
    fn test_open_session_requires_credentials() {
        let dir = TempDir::new().unwrap();
        let config = TanbihConfig::new(dir.path());
        let err = open_session(&config, None, None).unwrap_err();
        assert!(err.to_string().contains("TANBIH_USER"));
    }

    #[test]
    fn test_open_session_rejects_wrong_password() {
        let dir = TempDir::new().unwrap();
        let config = TanbihConfig::new(dir.path());
        Session::register(&config, "fatima", "pw").unwrap();

        let err = open_session(
            &config,
            Some("fatima".to_string()),
            Some("wrong".to_string()),
        )
        .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("password"));
    }
}
