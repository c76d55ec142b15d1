//! Purpose: Hold top-level CLI command dispatch for `marquee`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command behavior, output envelopes, and exit code semantics stay unchanged.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    url: String,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "marquee", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::List { query, format } => {
            let mut session = open_session(&url)?;
            session.load()?;
            let query = Query::parse(query.as_deref().unwrap_or_default());
            let movies = session.filtered(&query);
            emit_list(&movies, format, color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Add {
            title,
            year,
            genre,
            json,
        } => {
            let mut form = MovieForm::new().with_title(title);
            if let Some(year) = year {
                form = form.with_year(year);
            }
            if let Some(genre) = genre {
                form = form.with_genre(genre);
            }

            let mut session = open_session(&url)?;
            let added = session.create(&form)?;
            emit_receipt(
                format!(
                    "Added #{}: {} ({} records total)",
                    added.id,
                    movie_summary(&added),
                    session.catalog().len()
                ),
                json!({ "added": movie_json(&added) }),
                json,
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        Command::Update {
            id,
            title,
            year,
            genre,
            json,
        } => {
            let mut form = MovieForm::new();
            if let Some(title) = title {
                form = form.with_title(title);
            }
            if let Some(year) = year {
                form = form.with_year(year);
            }
            if let Some(genre) = genre {
                form = form.with_genre(genre);
            }

            let mut session = open_session(&url)?;
            session.load()?;
            let updated = session.update(id, &form)?;
            emit_receipt(
                format!("Updated #{}: {}", updated.id, movie_summary(&updated)),
                json!({ "updated": movie_json(&updated) }),
                json,
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        Command::Delete { id, yes, json } => {
            if !confirm_delete(id, yes)? {
                emit_notice(&delete_cancelled_notice(id), color_mode);
                return Ok(RunOutcome::ok());
            }

            let mut session = open_session(&url)?;
            session.delete(id)?;
            emit_receipt(
                format!("Deleted #{id} ({} records left)", session.catalog().len()),
                json!({ "deleted": { "id": id } }),
                json,
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
    }
}
