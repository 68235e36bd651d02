mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tangle", version, about = "TNGL compiler and Tangle wire tools")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "TANGLE_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compile_subcommand() {
        let cli = Cli::try_parse_from(["tangle", "compile", "show.tngl", "--max-size", "512"])
            .expect("compile args should parse");
        assert!(matches!(cli.command, Command::Compile(_)));
    }

    #[test]
    fn rejects_conflicting_event_values() {
        let err = Cli::try_parse_from([
            "tangle",
            "emit",
            "--label",
            "evt1",
            "--percentage",
            "10",
            "--color",
            "#ff0000",
        ])
        .expect_err("conflicting values should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn emit_requires_a_label() {
        let err = Cli::try_parse_from(["tangle", "emit", "--percentage", "10"])
            .expect_err("label is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
