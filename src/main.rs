//! Purpose: `marquee` CLI entry point and command parsing.
//! Role: Binary crate root; parses args, runs commands, emits output on stdout.
//! Invariants: Commands emit stable stdout formats (human or JSON by command/flags).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All catalog traffic goes through `api::CatalogSession` (reload-after-write).
#![allow(clippy::result_large_err)]
use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use marquee::api::{
    CatalogClient, CatalogSession, Error, ErrorKind, Movie, MovieForm, Query, to_exit_code,
};
use marquee::notice::{Notice, notice_json};
use marquee::render::{colorize_json, movies_json, render_html, render_table};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    init_tracing();

    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;

    let result = command_dispatch::dispatch_command(cli.command, cli.url, color_mode);

    result
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let replacement = arg.to_str().and_then(|value| match value {
                "---help" => Some("--help"),
                "---version" => Some("--version"),
                _ => None,
            });
            replacement.map(OsString::from).unwrap_or_else(|| arg)
        })
        .collect()
}

#[derive(Debug, Parser)]
#[command(
    name = "marquee",
    version,
    about = "Command-line client for JSON movie-catalog APIs",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Talks plain HTTP+JSON CRUD to a catalog server (e.g. json-server).

Mental model:
  - `list` fetches records and filters them locally
  - `add` / `update` / `delete` change server state, then re-fetch
"#,
    after_help = r#"EXAMPLES
  $ marquee list
  $ marquee list horror
  $ marquee add "Alien" --year 1979 --genre Horror
  $ marquee update 3 --year 1980
  $ marquee delete 3 --yes

LEARN MORE
  $ marquee <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        default_value = "http://localhost:3000",
        help = "Base URL of the catalog API server",
        value_hint = ValueHint::Url
    )]
    url: String,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    Table,
    Json,
    Html,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Fetch the catalog and print it, optionally filtered",
        long_about = r#"Fetch the full record collection and print it.

The query filters locally after the fetch: a record matches when its title
or genre contains the query as a case-insensitive substring."#,
        after_help = r#"EXAMPLES
  $ marquee list                        # everything, as a table
  $ marquee list hor                    # matches "Horror" genres
  $ marquee list --format json          # machine output
  $ marquee list --format html          # the list-view fragment

NOTES
  - An empty result prints a "No movies found." placeholder
  - Filtering never issues its own request"#
    )]
    List {
        #[arg(help = "Free-text filter over title and genre (optional)")]
        query: Option<String>,
        #[arg(
            long,
            default_value = "table",
            value_enum,
            help = "Output format: table|json|html"
        )]
        format: ListFormat,
    },
    #[command(
        about = "Add a record to the catalog",
        after_help = r#"EXAMPLES
  $ marquee add "Alien" --year 1979 --genre Horror
  $ marquee add "Heat" --year 1995                  # genre defaults to ""

NOTES
  - Title must be non-empty and year must be a whole number; invalid
    input fails before any request is sent
  - On success the catalog is re-fetched (the server assigns the id)"#
    )]
    Add {
        #[arg(help = "Title of the new record")]
        title: String,
        #[arg(long, help = "Release year (whole number, required)")]
        year: Option<String>,
        #[arg(long, help = "Genre label (optional)")]
        genre: Option<String>,
        #[arg(long, help = "Emit the JSON receipt even on a terminal")]
        json: bool,
    },
    #[command(
        about = "Replace fields of a record by id",
        long_about = r#"Replace a record by id.

Flags you omit keep the record's current values; the server always receives
a full replacement."#,
        after_help = r#"EXAMPLES
  $ marquee update 3 --year 1980
  $ marquee update 3 --title "Aliens" --genre Sci-Fi

NOTES
  - The id must exist in the fetched catalog
  - Validation failures abort before any write is sent"#
    )]
    Update {
        #[arg(help = "Id of the record to update")]
        id: u64,
        #[arg(long, help = "New title")]
        title: Option<String>,
        #[arg(long, help = "New release year (whole number)")]
        year: Option<String>,
        #[arg(long, help = "New genre label")]
        genre: Option<String>,
        #[arg(long, help = "Emit the JSON receipt even on a terminal")]
        json: bool,
    },
    #[command(
        about = "Delete a record by id",
        after_help = r#"EXAMPLES
  $ marquee delete 3                   # asks for confirmation on a terminal
  $ marquee delete 3 --yes             # no prompt

NOTES
  - Without a terminal on stdin, --yes is required
  - Declining the prompt sends no request and exits 0"#
    )]
    Delete {
        #[arg(help = "Id of the record to delete")]
        id: u64,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
        #[arg(long, help = "Emit the JSON receipt even on a terminal")]
        json: bool,
    },
    #[command(about = "Print version information")]
    Version,
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum, help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn open_session(url: &str) -> Result<CatalogSession, Error> {
    let client = CatalogClient::new(url)?;
    Ok(CatalogSession::new(client))
}

fn movie_json(movie: &Movie) -> Value {
    json!({
        "id": movie.id,
        "title": movie.title,
        "year": movie.year,
        "genre": movie.genre,
    })
}

fn movie_summary(movie: &Movie) -> String {
    if movie.genre.is_empty() {
        format!("{} ({})", movie.title, movie.year)
    } else {
        format!("{} ({}) - {}", movie.title, movie.year, movie.genre)
    }
}

fn emit_list(movies: &[&Movie], format: ListFormat, color_mode: ColorMode) {
    match format {
        ListFormat::Table => println!("{}", render_table(movies)),
        ListFormat::Html => println!("{}", render_html(movies)),
        ListFormat::Json => emit_json(movies_json(movies), color_mode),
    }
}

fn emit_receipt(human: String, value: Value, as_json: bool, color_mode: ColorMode) {
    if !as_json && io::stdout().is_terminal() {
        println!("{human}");
    } else {
        emit_json(value, color_mode);
    }
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("marquee {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "marquee",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

/// Confirm a delete before anything is sent. On a terminal this asks;
/// otherwise --yes is mandatory.
fn confirm_delete(id: u64, yes: bool) -> Result<bool, Error> {
    if yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("delete requires confirmation")
            .with_id(id)
            .with_hint("Pass --yes to confirm without a prompt."));
    }
    eprint!("Delete record #{id}? [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read confirmation")
            .with_source(err)
    })?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn delete_cancelled_notice(id: u64) -> Notice {
    let mut details = Map::new();
    details.insert("id".to_string(), json!(id));
    Notice {
        kind: "cancelled".to_string(),
        time: notice_time_now().unwrap_or_else(|| "unknown".to_string()),
        cmd: "delete".to_string(),
        message: "delete cancelled, no request sent".to_string(),
        details,
    }
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() == ErrorKind::Io && err.hint().is_none() {
        return err.with_hint(
            "Ensure the catalog API server is running and reachable (try `marquee list`).",
        );
    }
    err
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() == ErrorKind::Internal && err.hint().is_none() {
        return err.with_hint("The server sent a response marquee could not understand.");
    }
    err
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let pretty = is_tty || use_color;
    let json = if pretty {
        if use_color {
            colorize_json(&value, true)
        } else {
            serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
        }
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {}", notice.message);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Validation => "invalid input".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Remote => "server error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    use std::error::Error as StdError;
    let mut causes = Vec::new();
    let mut cur = StdError::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(url) = err.url() {
        inner.insert("url".to_string(), json!(url));
    }
    if let Some(id) = err.id() {
        inner.insert("id".to_string(), json!(id));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(url) = err.url() {
        lines.push(format!(
            "{} {url}",
            colorize_label("url:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(id) = err.id() {
        lines.push(format!(
            "{} {id}",
            colorize_label("id:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(status) = err.status() {
        lines.push(format!(
            "{} {status}",
            colorize_label("status:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let missing_required = rendered.contains("required arguments were not provided")
        || rendered.contains("required argument was not provided");
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `marquee --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "marquee") else {
        return "Try `marquee --help`.".to_string();
    };

    let mut parts = Vec::new();
    for token in tokens.iter().skip(pos + 1) {
        if token.starts_with('-') || token.starts_with('<') || token.starts_with('[') {
            break;
        }
        parts.push(*token);
    }

    if parts.is_empty() {
        return "Try `marquee --help`.".to_string();
    }

    if missing_required && parts.as_slice() == ["add"] {
        return "Provide a title, for example: `marquee add \"Alien\" --year 1979`.".to_string();
    }

    format!("Try `marquee {} --help`.", parts.join(" "))
}
