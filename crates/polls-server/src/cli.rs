use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "polls-server", about = "Polls web service", version)]
pub struct Args {
    /// Path to the TOML config file. A missing file means defaults.
    #[arg(short, long, default_value = "polls.toml")]
    pub config: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Insert a question and its choices, then exit.
    CreateQuestion {
        #[arg(long)]
        text: String,
        /// Publication offset from now in days; negative is in the past.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        days: i64,
        /// Choice text; repeat for each choice.
        #[arg(long = "choice")]
        choices: Vec<String>,
    },
}
