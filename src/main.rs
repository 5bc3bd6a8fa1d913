#[cfg(not(feature = "cli"))]
compile_error!("The `ssdb` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use db2::cli;
use db2::cli::app::{Cli, ColorMode, Commands};
use db2::Db2Error;

fn main() {
    let cli = Cli::parse();

    cli::init_logging(cli.verbose);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, Db2Error> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| Db2Error::Io(format!("Cannot create {}: {}", path, e))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Unpack { tables, tree, json } => cli::unpack::execute(
            &cli::unpack::UnpackOptions { tables, tree, json },
            &mut writer,
        ),

        Commands::Pack {
            tree,
            tables,
            fragment_len,
            json,
        } => cli::pack::execute(
            &cli::pack::PackOptions {
                tree,
                tables,
                fragment_len,
                json,
            },
            &mut writer,
        ),

        Commands::Info { file, json } => {
            cli::info::execute(&cli::info::InfoOptions { file, json }, &mut writer)
        }

        Commands::Dump { file, kind, json } => {
            cli::dump::execute(&cli::dump::DumpOptions { file, kind, json }, &mut writer)
        }

        Commands::Check { tables, json } => {
            cli::check::execute(&cli::check::CheckOptions { tables, json }, &mut writer)
        }

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "ssdb", &mut writer);
            Ok(())
        }
    };

    if let Err(e) = result.and_then(|()| writer.flush().map_err(|e| Db2Error::Io(e.to_string())))
    {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
