use crate::demo::{run_demo, run_funnel_report, DemoArgs, FunnelReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};

use admissions::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "School Admissions Service",
    about = "Run and demonstrate the school admissions service from the command line",
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
    /// Admissions reporting utilities
    Admissions {
        #[command(subcommand)]
        command: AdmissionsCommand,
    },
    /// Run an end-to-end CLI demo over a seeded admissions pipeline
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum AdmissionsCommand {
    /// Print the funnel report for a seeded pipeline
    Report(FunnelReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Admissions {
            command: AdmissionsCommand::Report(args),
        } => run_funnel_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
