//! Interactive timer host.
//!
//! Owns the only engine instance for the lifetime of the process. A single
//! task multiplexes the tick interval and stdin, so engine calls never
//! interleave.

use std::io::Write;
use std::time::Duration;

use clap::Args;
use timebox_core::timer::{format_clock, Clock, Mode, SystemClock, TimerEngine, WorkDuration};
use timebox_core::{Config, Database, Event, SessionRecorder};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

type Engine<'db> = TimerEngine<SystemClock, SessionRecorder<&'db Database>>;

#[derive(Args)]
pub struct RunArgs {
    /// Activity label for work intervals (default: timer.default_activity)
    #[arg(long)]
    activity: Option<String>,
    /// Work interval length in minutes (default: timer.work_minutes)
    #[arg(long)]
    work_minutes: Option<u32>,
    /// Note attached to the next completed work interval
    #[arg(long)]
    note: Option<String>,
    /// Start counting immediately
    #[arg(long)]
    start: bool,
}

/// A line typed at the interactive prompt.
#[derive(Debug, PartialEq)]
enum HostCommand {
    Start,
    Pause,
    Reset,
    Mode(Mode),
    Activity(String),
    Work(WorkDuration),
    Note(Option<String>),
    Status,
    Help,
    Quit,
}

impl HostCommand {
    /// `Ok(None)` for a blank line.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word {
            "start" | "s" => HostCommand::Start,
            "pause" | "p" => HostCommand::Pause,
            "reset" | "r" => HostCommand::Reset,
            "status" => HostCommand::Status,
            "help" | "?" => HostCommand::Help,
            "quit" | "exit" | "q" => HostCommand::Quit,
            "mode" => HostCommand::Mode(rest.parse().map_err(|e| format!("{e}"))?),
            "activity" if !rest.is_empty() => HostCommand::Activity(rest.to_string()),
            "activity" => return Err("usage: activity <label>".into()),
            "note" => HostCommand::Note((!rest.is_empty()).then(|| rest.to_string())),
            "work" => {
                let minutes: u32 = rest
                    .parse()
                    .map_err(|_| format!("usage: work <minutes> (presets: {:?})", WorkDuration::PRESETS_MIN))?;
                HostCommand::Work(WorkDuration::from_minutes(minutes).map_err(|e| e.to_string())?)
            }
            other => return Err(format!("unknown command '{other}', type 'help'")),
        };
        Ok(Some(command))
    }
}

/// What the host should call on a wake-up.
#[derive(Debug, PartialEq)]
enum Wake {
    Tick,
    Resume,
}

/// Detects that the process was suspended between two wake-ups.
///
/// The tokio interval is driven by a monotonic clock that stops while the
/// machine sleeps, so a wall-clock jump is the signal that time passed
/// without us.
struct Heartbeat {
    last_ms: u64,
    gap_ms: u64,
}

impl Heartbeat {
    fn new(now_ms: u64, gap_ms: u64) -> Self {
        Self { last_ms: now_ms, gap_ms }
    }

    fn wake(&mut self, now_ms: u64) -> Wake {
        let gap = now_ms.saturating_sub(self.last_ms);
        self.last_ms = now_ms;
        if gap > self.gap_ms {
            Wake::Resume
        } else {
            Wake::Tick
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop(args))
}

async fn run_loop(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut policy = config.policy()?;
    if let Some(minutes) = args.work_minutes {
        policy.set_work(WorkDuration::from_minutes(minutes)?);
    }

    let db = Database::open()?;
    let label = args
        .activity
        .unwrap_or_else(|| config.timer.default_activity.clone());
    if db.find_activity(&label)?.is_none() {
        tracing::warn!(activity = %label, "activity is not in the activity list");
    }

    let mut engine: Engine<'_> = TimerEngine::new(policy, SystemClock, SessionRecorder::new(&db));
    engine.set_activity_label(label);
    engine.set_note(args.note);
    tracing::debug!(tick_interval_ms = config.host.tick_interval_ms, "timer host ready");

    println!("type 'help' for commands");
    if args.start {
        apply(&mut engine, HostCommand::Start)?;
    }
    render(&engine)?;

    let mut ticker = tokio::time::interval(Duration::from_millis(config.host.tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut heartbeat = Heartbeat::new(SystemClock.now_ms(), config.host.resume_gap_ms);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let event = match heartbeat.wake(SystemClock.now_ms()) {
                    Wake::Tick => engine.tick(),
                    Wake::Resume => engine.resume(),
                };
                report(&mut engine, event)?;
                if engine.is_running() {
                    render(&engine)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match HostCommand::parse(&line) {
                    Ok(Some(HostCommand::Quit)) => break,
                    Ok(Some(command)) => apply(&mut engine, command)?,
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    println!();
    Ok(())
}

fn apply(engine: &mut Engine<'_>, command: HostCommand) -> Result<(), Box<dyn std::error::Error>> {
    let event = match command {
        HostCommand::Start => engine.start(),
        HostCommand::Pause => engine.pause(),
        HostCommand::Reset => engine.reset(),
        HostCommand::Mode(mode) => engine.switch_mode(mode),
        HostCommand::Work(work) => engine.set_work_duration(work),
        HostCommand::Activity(label) => {
            engine.set_activity_label(label);
            None
        }
        HostCommand::Note(note) => {
            engine.set_note(note);
            None
        }
        HostCommand::Status => Some(engine.snapshot_event()),
        HostCommand::Help => {
            print_help();
            None
        }
        HostCommand::Quit => None,
    };
    if let Some(event) = event {
        println!();
        println!("{}", serde_json::to_string(&event)?);
    }
    render(engine)?;
    Ok(())
}

/// Print a completion and hand the session outcome back to the user.
fn report(engine: &mut Engine<'_>, event: Option<Event>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(event) = event else {
        return Ok(());
    };
    println!();
    println!("{}", serde_json::to_string(&event)?);

    let saved = engine.sink_mut().take_saved();
    for record in &saved {
        println!(
            "saved session #{} ({}, {})",
            record.id,
            record.activity_type,
            format_clock(record.duration_secs)
        );
    }
    if !saved.is_empty() {
        engine.set_note(None);
    }
    for notice in engine.sink_mut().take_notices() {
        eprintln!("notice: {notice}");
    }
    render(engine)?;
    Ok(())
}

fn render(engine: &Engine<'_>) -> std::io::Result<()> {
    let snap = engine.snapshot();
    let state = if snap.running { "running" } else { "paused" };
    let mut out = std::io::stdout().lock();
    write!(
        out,
        "\r[{}] {} {}",
        snap.mode.label(),
        format_clock(snap.remaining_secs),
        state
    )?;
    if snap.mode == Mode::Work && !snap.activity_label.is_empty() {
        write!(out, " - {}", snap.activity_label)?;
    }
    write!(out, "   ")?;
    out.flush()
}

fn print_help() {
    println!();
    println!("commands:");
    println!("  start | pause | reset");
    println!("  mode <work|shortBreak|longBreak>");
    println!("  activity <label>");
    println!("  work <minutes>     presets: {:?}", WorkDuration::PRESETS_MIN);
    println!("  note [text]        empty clears the note");
    println!("  status | help | quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(HostCommand::parse("start"), Ok(Some(HostCommand::Start)));
        assert_eq!(HostCommand::parse("  p "), Ok(Some(HostCommand::Pause)));
        assert_eq!(HostCommand::parse(""), Ok(None));
        assert_eq!(HostCommand::parse("quit"), Ok(Some(HostCommand::Quit)));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(
            HostCommand::parse("mode short"),
            Ok(Some(HostCommand::Mode(Mode::ShortBreak)))
        );
        assert_eq!(
            HostCommand::parse("activity Deep reading"),
            Ok(Some(HostCommand::Activity("Deep reading".into())))
        );
        assert_eq!(
            HostCommand::parse("work 45"),
            Ok(Some(HostCommand::Work(WorkDuration::from_minutes(45).unwrap())))
        );
        assert_eq!(HostCommand::parse("note"), Ok(Some(HostCommand::Note(None))));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(HostCommand::parse("mode nap").is_err());
        assert!(HostCommand::parse("work 0").is_err());
        assert!(HostCommand::parse("work soon").is_err());
        assert!(HostCommand::parse("activity").is_err());
        assert!(HostCommand::parse("dance").is_err());
    }

    #[test]
    fn heartbeat_detects_suspension() {
        let mut heartbeat = Heartbeat::new(10_000, 3_000);
        assert_eq!(heartbeat.wake(11_000), Wake::Tick);
        assert_eq!(heartbeat.wake(14_000), Wake::Tick);
        assert_eq!(heartbeat.wake(600_000), Wake::Resume);
        assert_eq!(heartbeat.wake(601_000), Wake::Tick);
    }
}
