use clap::Parser;
use obvious::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `get --print` output stays clean.
    let filter = if cli.verbose {
        EnvFilter::new("obvious=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Init { legacy } => obvious::cli::commands::init::execute(&cli, legacy),
        Commands::List => obvious::cli::commands::list::execute(&cli),
        Commands::Put { ref name } => obvious::cli::commands::put::execute(&cli, name),
        Commands::Get { ref name, print } => obvious::cli::commands::get::execute(&cli, name, print),
        Commands::Delete { ref name, force } => {
            obvious::cli::commands::delete::execute(&cli, name, force)
        }
        Commands::Migrate => obvious::cli::commands::migrate::execute(&cli),
        Commands::Rekey => obvious::cli::commands::rekey::execute(&cli),
    };

    if let Err(e) = result {
        obvious::cli::output::error(&e.to_string());
        std::process::exit(e.kind().exit_code());
    }
}
