mod cli;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config = run::resolve_config(&cli.run)?;
    match cli.command {
        Some(Command::Config) => run::print_config(&config),
        None => {
            let outputs = run::run(&config)?;
            println!("{}", outputs.backing.display());
            if let Some(display) = &outputs.display {
                println!("{}", display.display());
            }
            Ok(())
        }
    }
}
