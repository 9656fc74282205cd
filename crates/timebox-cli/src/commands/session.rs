use chrono::Local;
use clap::Subcommand;
use timebox_core::storage::Database;
use timebox_core::timer::format_clock;

#[derive(Subcommand)]
pub enum SessionAction {
    /// List recorded sessions
    List {
        /// Only sessions for this activity
        #[arg(long)]
        activity: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Total focused time per activity
    Totals {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SessionAction::List { activity, json } => {
            let sessions = match activity {
                Some(activity) => db.sessions_by_activity(&activity)?,
                None => db.list_sessions()?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }
            for s in sessions {
                let when = s.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M");
                print!("{when}  {:>6}  {}", format_clock(s.duration_secs), s.activity_type);
                if s.comment.is_empty() {
                    println!();
                } else {
                    println!("  -- {}", s.comment);
                }
            }
        }
        SessionAction::Totals { json } => {
            let totals = db.totals_by_activity()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
                return Ok(());
            }
            for t in totals {
                println!(
                    "{:<16} {:>4} sessions  {}h {:02}m",
                    t.activity_type,
                    t.sessions,
                    t.total_secs / 3600,
                    (t.total_secs % 3600) / 60
                );
            }
        }
    }
    Ok(())
}
