// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for md2gdoc.
//!
//! This binary provides the `md2gdoc` command for converting markdown notes
//! into Google Docs `documents.batchUpdate` request bodies.

use lexopt::prelude::*;
use md2gdoc::{parser, requests};
use snafu::{OptionExt, ensure, prelude::*};
use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Environment variable that overrides the log filter.
const LOG_ENV: &str = "MD2GDOC_LOG";

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each file to the specified directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

/// A markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// Read from stdin (`-`).
    Stdin,
    /// Read from a file.
    File(PathBuf),
}

impl Input {
    fn label(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// What to emit for each input.
#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// The `documents.batchUpdate` JSON body.
    Batch,
    /// The plain text the document will contain.
    Text,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Batch => "json",
            Self::Text => "txt",
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: Vec<PathBuf>,
    output: OutputTarget,
    format: OutputFormat,
    compact: bool,
    indent_width: usize,
    nest_indent: f64,
    footer_prefixes: Option<Vec<String>>,
    strike_checked: bool,
    quiet: bool,
    verbose: u8,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("no markdown input files found"))]
    NoInputFiles,

    #[snafu(display("cannot output multiple files to stdout"))]
    MultipleFilesToStdout,

    #[snafu(display("stdin input requires --output -"))]
    StdinToDirectory,

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to read stdin: {source}"))]
    ReadStdin { source: std::io::Error },

    #[snafu(display("failed to convert {name}: {source}"))]
    Convert {
        name: String,
        source: requests::RequestError,
    },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display(
        "{} and {} would both be written to {}",
        first.display(),
        second.display(),
        path.display()
    ))]
    DuplicateOutput {
        path: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write to stdout: {source}"))]
    WriteStdout { source: std::io::Error },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert markdown notes to Google Docs batch-update requests

Usage: {name} [OPTIONS] -o <OUTPUT> <INPUT>...

Arguments:
  <INPUT>...  Markdown files, directories containing them, or - for stdin

Options:
  -o, --output <OUTPUT>     Output directory, or - for stdout
      --format <FORMAT>     batch (request JSON, default) or text (plain text preview)
      --compact             Write single-line JSON

Formatting:
      --indent-width <N>    Indentation columns per list level (1-8, default: 2)
      --nest-indent <PT>    Extra indent per nested list level in points (default: 18)
      --footer-prefix <S>   Treat lines starting with S as footers (repeatable,
                            default: \"Meeting recorded by:\" and \"Duration:\")
      --strike-checked      Strike through checked checklist items

Other options:
  -q, --quiet               Only report warnings and errors
  -v, --verbose             More log output (repeat for trace; {log_env} overrides)
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output: Option<OutputTarget> = None;
    let mut format = OutputFormat::Batch;
    let mut compact = false;
    let mut indent_width: usize = 2;
    let mut nest_indent: f64 = 18.0;
    let mut footer_prefixes: Option<Vec<String>> = None;
    let mut strike_checked = false;
    let mut quiet = false;
    let mut verbose: u8 = 0;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                });
            }
            Long("format") => {
                format = match parser.value()?.string()?.as_str() {
                    "batch" => OutputFormat::Batch,
                    "text" => OutputFormat::Text,
                    _ => return Err("format must be batch or text".into()),
                };
            }
            Long("compact") => compact = true,
            Long("indent-width") => {
                let val: usize = parser
                    .value()?
                    .parse()
                    .map_err(|_| "indent-width must be a number 1-8")?;
                if !(1..=8).contains(&val) {
                    return Err("indent-width must be 1-8".into());
                }
                indent_width = val;
            }
            Long("nest-indent") => {
                let val: f64 = parser
                    .value()?
                    .parse()
                    .map_err(|_| "nest-indent must be a number of points")?;
                if !val.is_finite() || val < 0.0 {
                    return Err("nest-indent must be a non-negative number".into());
                }
                nest_indent = val;
            }
            // First use replaces the defaults
            Long("footer-prefix") => footer_prefixes
                .get_or_insert_with(Vec::new)
                .push(parser.value()?.string()?),
            Long("strike-checked") => strike_checked = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = verbose.saturating_add(1),
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        output: output.ok_or("missing required option: --output")?,
        format,
        compact,
        indent_width,
        nest_indent,
        footer_prefixes,
        strike_checked,
        quiet,
        verbose,
        dry_run,
        force,
    })
}

/// Maps `-q` / `-v` flags to a tracing filter directive.
const fn log_directive(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Installs the stderr log subscriber. `MD2GDOC_LOG` takes precedence over flags.
fn init_logging(quiet: bool, verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(log_directive(quiet, verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbose >= 2)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(cli.quiet, cli.verbose);

    // Collect all inputs first
    let inputs = collect_inputs(&cli.input);
    ensure!(!inputs.is_empty(), NoInputFilesSnafu);

    match &cli.output {
        OutputTarget::Stdout => {
            ensure!(inputs.len() == 1, MultipleFilesToStdoutSnafu);
            process_to_stdout(&inputs[0], &cli)?;
        }
        OutputTarget::Directory(dir) => {
            ensure!(!inputs.contains(&Input::Stdin), StdinToDirectorySnafu);
            // Resolve every output path before writing anything
            let jobs = plan_outputs(&inputs, dir, cli.format)?;
            if !cli.dry_run {
                std::fs::create_dir_all(dir).context(CreateOutputDirSnafu)?;
            }
            for (input, out_path) in &jobs {
                process_file(input, out_path, &cli)?;
            }
        }
    }

    Ok(())
}

/// Expands directories into the markdown files they contain.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<Input> {
    let mut files = Vec::new();
    for input in inputs {
        if input == Path::new("-") {
            files.push(Input::Stdin);
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| {
                    entry
                        .inspect_err(|err| warn!("Skipping unreadable entry: {err}"))
                        .ok()
                })
                // path().is_file() follows symlinks
                .filter(|e| e.path().is_file() && is_markdown(e.path()))
                .map(walkdir::DirEntry::into_path)
                .collect();
            found.sort();
            debug!(dir = %input.display(), count = found.len(), "collected markdown files");
            files.extend(found.into_iter().map(Input::File));
        } else {
            files.push(Input::File(input.clone()));
        }
    }
    files
}

/// Pairs each input file with its output path, rejecting two inputs that
/// would be written to the same file.
fn plan_outputs(
    inputs: &[Input],
    out_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<(PathBuf, PathBuf)>, Error> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(inputs.len());

    for input in inputs {
        let Input::File(path) = input else {
            continue;
        };
        let out_path = output_path(path, out_dir, format)?;
        if let Some(first) = seen.insert(out_path.clone(), path) {
            return DuplicateOutputSnafu {
                path: out_path,
                first,
                second: path,
            }
            .fail();
        }
        jobs.push((path.clone(), out_path));
    }

    Ok(jobs)
}

/// Names the output after the input's file stem.
fn output_path(input: &Path, out_dir: &Path, format: OutputFormat) -> Result<PathBuf, Error> {
    let out_name = input.file_stem().context(InvalidFilenameSnafu)?;
    Ok(out_dir.join(format!(
        "{}.{}",
        out_name.to_string_lossy(),
        format.extension()
    )))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "md" || ext == "markdown")
}

/// Creates parse options from CLI arguments.
fn make_parse_options(cli: &Cli) -> parser::ParseOptions {
    let defaults = parser::ParseOptions::default();
    parser::ParseOptions {
        indent_width: cli.indent_width,
        footer_prefixes: cli
            .footer_prefixes
            .clone()
            .unwrap_or(defaults.footer_prefixes),
    }
}

/// Creates build options from CLI arguments.
fn make_build_options(cli: &Cli) -> requests::BuildOptions {
    requests::BuildOptions {
        nest_indent_pt: cli.nest_indent,
        strike_checked: cli.strike_checked,
        ..Default::default()
    }
}

fn read_input(input: &Input) -> Result<String, Error> {
    trace!(input = %input.label(), "reading input");
    match input {
        Input::Stdin => std::io::read_to_string(std::io::stdin()).context(ReadStdinSnafu),
        Input::File(path) => std::fs::read_to_string(path).context(ReadFileSnafu { path }),
    }
}

/// Converts markdown source into the selected output format.
fn convert(source: &str, name: &str, cli: &Cli) -> Result<String, Error> {
    let blocks = parser::parse_markdown(source, &make_parse_options(cli));

    match cli.format {
        OutputFormat::Text => Ok(requests::plain_text(&blocks)),
        OutputFormat::Batch => {
            let batch = requests::build_requests(&blocks, &make_build_options(cli));
            debug!(
                input = name,
                blocks = blocks.len(),
                requests = batch.requests.len(),
                "built batch update"
            );
            let mut json = batch.to_json(!cli.compact).context(ConvertSnafu { name })?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Processes a single input and outputs to stdout.
fn process_to_stdout(input: &Input, cli: &Cli) -> Result<(), Error> {
    if cli.dry_run {
        info!("Would output {}", input.label());
        return Ok(());
    }

    let source = read_input(input)?;
    let output = convert(&source, &input.label(), cli)?;

    std::io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .context(WriteStdoutSnafu)
}

/// Processes a single file and writes it to `out_path`.
fn process_file(input: &Path, out_path: &Path, cli: &Cli) -> Result<(), Error> {
    // Handle dry-run mode
    if cli.dry_run {
        info!("Would write {}", out_path.display());
        return Ok(());
    }

    // Check if output exists and handle overwrite
    if out_path.exists() && !cli.force {
        warn!(
            "Skipping {} (already exists, use --force to overwrite)",
            out_path.display()
        );
        return Ok(());
    }

    let input = Input::File(input.to_path_buf());
    let source = read_input(&input)?;
    let output = convert(&source, &input.label(), cli)?;

    std::fs::write(out_path, &output).context(WriteFileSnafu { path: out_path })?;

    info!("Wrote {}", out_path.display());
    Ok(())
}
