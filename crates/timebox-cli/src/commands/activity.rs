use clap::Subcommand;
use timebox_core::storage::Database;

#[derive(Subcommand)]
pub enum ActivityAction {
    /// List activity labels
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an activity label
    Add {
        /// Activity name
        name: String,
    },
    /// Remove an activity label
    Remove {
        /// Activity ID
        id: i64,
    },
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ActivityAction::List { json } => {
            let activities = db.list_activities()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&activities)?);
            } else {
                for activity in activities {
                    println!("{:>4}  {}", activity.id, activity.name);
                }
            }
        }
        ActivityAction::Add { name } => {
            let activity = db.create_activity(&name)?;
            println!("Activity created: {} ({})", activity.name, activity.id);
        }
        ActivityAction::Remove { id } => {
            if !db.delete_activity(id)? {
                return Err(format!("activity not found: {id}").into());
            }
            println!("Activity removed: {id}");
        }
    }
    Ok(())
}
