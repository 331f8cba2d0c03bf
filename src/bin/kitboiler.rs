use clap::error::ErrorKind;
use clap::Parser;
use kitboiler::cli::{run, Cli, USAGE};
use kitboiler::logging::init_logging;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::MissingRequiredArgument => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
        Err(err) => err.exit(),
    };

    if let Err(err) = init_logging() {
        eprintln!("kitboiler: {err:#}");
    }

    let stdout = std::io::stdout();
    if let Err(err) = run(&cli, &mut stdout.lock()) {
        eprintln!("kitboiler: {err:#}");
        std::process::exit(1);
    }
}
