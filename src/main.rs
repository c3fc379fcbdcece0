use clap::Parser;
use credvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG wins when set.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Register => credvault::cli::commands::register::execute(&cli),
        Commands::Login => credvault::cli::commands::login::execute(&cli),
        Commands::Add { ref app, ref value } => {
            credvault::cli::commands::add::execute(&cli, app, value.as_deref())
        }
        Commands::Get { ref app } => credvault::cli::commands::get::execute(&cli, app),
        Commands::List { show } => credvault::cli::commands::list::execute(&cli, show),
        Commands::Modify { ref app, ref value } => {
            credvault::cli::commands::modify::execute(&cli, app, value.as_deref())
        }
        Commands::Remove { ref app, force } => {
            credvault::cli::commands::remove::execute(&cli, app, force)
        }
        Commands::Generate {
            ref app,
            length,
            print,
        } => credvault::cli::commands::generate::execute(&cli, app, length, print),
        Commands::DeleteAccount { force } => {
            credvault::cli::commands::delete_account::execute(&cli, force)
        }
    };

    if let Err(e) = result {
        credvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
