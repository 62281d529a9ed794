use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use logmerge::cli::{Cli, ColorMode};
use logmerge::config::Config;
use logmerge::source::{self, JAMF_PREFIXES, SourceSpec};
use logmerge::{MergeError, check_source_count, merge_sources};

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior so `logmerge -o - | head` exits
    // quietly instead of failing with a BrokenPipe write error.
    reset_sigpipe();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "logmerge", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("logmerge: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), MergeError> {
    let config = Config::from_cli(cli)?;
    let rule = config.timestamp_rule()?;

    let mut sources = match cli.jamf {
        Some(ref root) => source::read_jamf_sources(root)?,
        None => {
            check_source_count(cli.logfiles.len())?;
            cli.logfiles
                .iter()
                .map(|path| SourceSpec::read(path))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    let default_prefixes: &[&str] = if cli.jamf.is_some() {
        &JAMF_PREFIXES
    } else {
        &[]
    };

    let to_stdout = config.writes_to_stdout();
    let use_color = resolve_color_mode(config.color_mode, to_stdout);
    // Colored output without explicit prefixes identifies sources by color alone.
    let show_prefix = !config.no_prefix && !(use_color && config.prefixes.is_empty());

    source::assign_labels(
        &mut sources,
        &config.prefixes,
        default_prefixes,
        show_prefix,
        &config.palette,
    );

    let lines = merge_sources(&sources, &rule, use_color)?;

    if to_stdout {
        let stdout = io::stdout();
        match write_lines(BufWriter::new(stdout.lock()), &lines) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other.map_err(MergeError::from),
        }
    } else {
        let path = source::unique_output_path(&config.output);
        let file = File::create_new(&path).map_err(|e| {
            io::Error::new(e.kind(), format!("cannot create {}: {e}", path.display()))
        })?;
        write_lines(BufWriter::new(file), &lines)?;
        println!("Merged logs saved to {}", path.display());
        Ok(())
    }
}

fn write_lines<W: Write>(mut writer: W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_color_mode(mode: ColorMode, to_stdout: bool) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            if !to_stdout || !io::stdout().is_terminal() {
                return false;
            }
            if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                return false;
            }
            if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
                return false;
            }
            true
        }
    }
}

/// Reset SIGPIPE to the default (terminate) behavior.
///
/// By default, Rust ignores SIGPIPE to surface `BrokenPipe` I/O errors.
/// Restoring `SIG_DFL` lets a downstream reader that exits early (`head`)
/// end `logmerge` the way it ends any other Unix filter.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
