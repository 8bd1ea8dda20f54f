use std::{
    io::Write,
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use ariadne::{ColorGenerator, Config, IndexType, Label, Report, ReportKind, Source};
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use log::{debug, warn};
use loopcore::{
    BuildTask, Limits, Loop, minimum_segment_length,
    classify::{is_even, is_finite},
    parser::{parse_multiplier_with, parse_segments},
};
use termcolor::StandardStream;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod conf;
mod error;
mod render;

use conf::{CliConfig, ColorMode};
use error::{CliError, CliResult};

/// How long a build may run before the pending notice is shown.
const PENDING_NOTICE: Duration = Duration::from_millis(250);

#[derive(ClapParser)]
#[command(version, about = "Build generalized Collatz loops from a multiplier and even segments")]
pub struct Arguments {
    /// Path to a TOML configuration file (defaults to ./loopcli.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to color the output
    #[arg(long, global = true, value_enum)]
    color: Option<ColorMode>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the loop for a multiplier and a list of even-segment lengths
    Build {
        /// The multiplier applied to odd numbers
        #[arg(short, long, allow_hyphen_values = true)]
        multiplier: String,

        /// Segment lengths, separated by commas and/or spaces (e.g. "3,2" or "[4 6 5]")
        #[arg(short, long)]
        segments: String,

        /// Raise segments shorter than the multiplier's minimum instead of failing
        #[arg(long)]
        raise: bool,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Only print the rule and the starting number
        #[arg(long)]
        no_sequence: bool,

        /// Override the configured maximum number of segments
        #[arg(long)]
        max_segments: Option<usize>,

        /// Override the configured maximum total of segment lengths
        #[arg(long)]
        max_total_decrease: Option<u64>,
    },
    /// Print the minimum segment length allowed for a multiplier
    Minimum {
        #[arg(short, long, allow_hyphen_values = true)]
        multiplier: String,
    },
    /// Report whether a value is a finite number and whether it is even
    Classify {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn build(
    config: &CliConfig,
    multiplier: &str,
    segments: &str,
    raise: bool,
    format: Format,
    show_sequence: bool,
) -> CliResult<()> {
    let multiplier_value = parse_multiplier_with(multiplier, &config.limits)
        .map_err(|e| CliError::from_input("multiplier", multiplier, e))?;
    let mut segment_list =
        parse_segments(segments).map_err(|e| CliError::from_input("segments", segments, e))?;

    if raise {
        let minimum = minimum_segment_length(&multiplier_value);
        let (raised, changed) = segment_list.raised_to(minimum);
        if changed > 0 {
            warn!("Building with segments {} instead of {}", raised, segment_list);
        }
        segment_list = raised;
    }

    let mut task = BuildTask::spawn(multiplier_value, segment_list, config.limits);
    let lp: Loop = match task.wait_timeout(PENDING_NOTICE) {
        Some(result) => result?,
        None => {
            eprintln!("Calculating...");
            task.wait()?
        }
    };

    let mut stdout = StandardStream::stdout(config.output.color.choice());
    match format {
        Format::Text => {
            let width = config
                .output
                .wrap
                .then(render::terminal_width)
                .flatten();
            render::write_loop(&mut stdout, &lp, width, show_sequence)?;
        }
        Format::Json => {
            let mut value = serde_json::to_value(&lp)?;
            if !show_sequence {
                if let Some(object) = value.as_object_mut() {
                    object.remove("sequence");
                }
            }
            serde_json::to_writer_pretty(&mut stdout, &value)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn minimum(config: &CliConfig, multiplier: &str) -> CliResult<()> {
    let value = parse_multiplier_with(multiplier, &config.limits)
        .map_err(|e| CliError::from_input("multiplier", multiplier, e))?;
    let minimum = minimum_segment_length(&value).get();

    println!("{minimum}");
    if minimum > 1 {
        println!("With this multiplier, every segment will need to have at least {minimum} even numbers.");
    }
    Ok(())
}

fn classify(value: &str) -> CliResult<()> {
    println!("finite: {}", is_finite(value));
    println!("even: {}", is_even(value));
    Ok(())
}

fn run(args: Arguments) -> CliResult<()> {
    let mut config = CliConfig::locate(args.config.as_deref())?;
    if let Some(color) = args.color {
        config.output.color = color;
    }

    match args.command {
        Command::Build {
            multiplier,
            segments,
            raise,
            format,
            no_sequence,
            max_segments,
            max_total_decrease,
        } => {
            config.limits = Limits {
                max_segments: max_segments.unwrap_or(config.limits.max_segments),
                max_total_decrease: max_total_decrease
                    .unwrap_or(config.limits.max_total_decrease),
                ..config.limits
            };
            debug!("Building with limits {:?}", config.limits);
            build(&config, &multiplier, &segments, raise, format, !no_sequence)
        }
        Command::Minimum { multiplier } => minimum(&config, &multiplier),
        Command::Classify { value } => classify(&value),
    }
}

fn report(error: &CliError) {
    match error {
        CliError::InvalidInput {
            input,
            text,
            messages,
        } => {
            eprintln!("Failed to parse {input}:");
            let mut colors = ColorGenerator::new();
            let color = colors.next();

            for message in messages {
                let span = (input.to_string(), message.span.clone());
                let printed = Report::build(ReportKind::Error, span.clone())
                    .with_config(Config::default().with_index_type(IndexType::Byte))
                    .with_message(&message.message)
                    .with_label(
                        Label::new(span)
                            .with_message("The error occurred here")
                            .with_color(color),
                    )
                    .finish()
                    .eprint((input.to_string(), Source::from(text.as_str())));
                if printed.is_err() {
                    eprintln!("{}", message.message);
                }
            }
        }
        other => eprintln!("Error: {other}"),
    }
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose, args.quiet);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}
