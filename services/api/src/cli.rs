use crate::demo::{run_cooldown, run_demo, CooldownArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use visa_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "visa-desk",
    about = "Run the client application review service or inspect review timing",
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
    /// Walk a client through submission, rejection, cooldown and validation
    Demo(DemoArgs),
    /// Show how long a rejected track stays locked
    Cooldown(CooldownArgs),
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
        Command::Demo(args) => run_demo(args),
        Command::Cooldown(args) => {
            run_cooldown(args);
            Ok(())
        }
    }
}
