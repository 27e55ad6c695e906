use clap::Parser;
use passvault::cli::{commands, output, Cli, Commands};

fn main() {
    passvault::logging::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::List => commands::list::execute(&cli),
        Commands::New { ref description } => {
            commands::new::execute(&cli, description.as_deref())
        }
        Commands::Edit {
            id,
            ref description,
            password,
        } => commands::edit::execute(&cli, id, description.as_deref(), password),
        Commands::Delete { id, force } => commands::delete::execute(&cli, id, force),
        Commands::Reveal { id, copy } => commands::reveal::execute(&cli, id, copy),
        Commands::Version => commands::version::execute(),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
