use std::io::{BufRead, Write};

fn read_goal(default_goal: &str) -> std::io::Result<String> {
    print!("Enter the goal for the robot: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let goal = line.trim();
    Ok(if goal.is_empty() {
        default_goal.to_string()
    } else {
        goal.to_string()
    })
}

#[tokio::main]
async fn main() {
    seerover::init_tracing();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let config = seerover::load_config_or_default();
    let goal = match read_goal(&config.agent.default_goal) {
        Ok(goal) => goal,
        Err(e) => {
            tracing::error!(error = %e, "could not read goal");
            std::process::exit(1);
        }
    };

    match seerover::run(&config, &goal).await {
        Ok(summary) => tracing::info!(
            outcome = ?summary.outcome,
            iterations = summary.iterations,
            "run complete"
        ),
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            std::process::exit(1);
        }
    }
}
