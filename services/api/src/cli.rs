use crate::report::{run_score_report, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use workforce_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "workforce-ai",
    about = "Serve workforce productivity analytics or score a task export from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score every employee in a task CSV export and print a ranking
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Task CSV export loaded into the in-memory repository at startup
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
    /// Organization the seed export belongs to
    #[arg(long, default_value = "default")]
    pub(crate) organization: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| {
        Command::Serve(ServeArgs {
            organization: "default".to_string(),
            ..ServeArgs::default()
        })
    });

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score_report(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_command_parses_paths() {
        let cli = Cli::try_parse_from([
            "workforce-ai",
            "score",
            "--tasks-csv",
            "tasks.csv",
            "--organization",
            "acme",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.tasks_csv, PathBuf::from("tasks.csv"));
                assert_eq!(args.organization, "acme");
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn serve_defaults_to_the_default_organization() {
        let cli = Cli::try_parse_from(["workforce-ai", "serve", "--port", "8080"])
            .expect("arguments parse");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.organization, "default");
                assert!(args.seed_csv.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
