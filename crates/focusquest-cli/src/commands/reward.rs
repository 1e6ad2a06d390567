use clap::Subcommand;
use focusquest_core::{Config, RewardEngine, RewardState};
use serde::Serialize;

#[derive(Subcommand)]
pub enum RewardAction {
    /// Show what a break would pay after the given history
    Preview {
        /// Focus sprints completed so far
        #[arg(long, default_value_t = 0)]
        sprints: u32,
        /// Length of the last focus session in minutes
        #[arg(long, default_value_t = 25)]
        last_focus: u32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the active reward rules
    Rules,
}

#[derive(Serialize)]
struct Preview {
    sprints: u32,
    last_focus_minutes: u32,
    break_points: u32,
}

pub fn run(action: RewardAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    match action {
        RewardAction::Preview {
            sprints,
            last_focus,
            json,
        } => {
            let engine = RewardEngine::with_state(
                config.rewards,
                RewardState {
                    focus_sprints_completed: sprints,
                    last_focus_duration_minutes: last_focus,
                    ..RewardState::default()
                },
            );
            let preview = Preview {
                sprints,
                last_focus_minutes: last_focus,
                break_points: engine.compute_break_reward(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                println!("+{} points", preview.break_points);
            }
        }
        RewardAction::Rules => {
            print!("{}", toml::to_string_pretty(&config.rewards)?);
        }
    }
    Ok(())
}
