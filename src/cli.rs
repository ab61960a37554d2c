use clap::{Parser, Subcommand};

/// Personal job-application tracker API
#[derive(Parser, Debug)]
#[command(name = "job-tracker", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Print a bearer token for a user id
    IssueToken {
        /// Identity the token resolves to
        #[arg(long = "user")]
        user: String,
    },
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}
