//! Purpose: Build view descriptions of a movie list for each output surface.
//! Exports: `render_table`, `render_html`, `movies_json`, `colorize_json`, `escape_html`, `NO_RECORDS`.
//! Role: Pure (records) -> text functions; no transport and no terminal probing.
//! Invariants: An empty record set always yields the literal no-records placeholder.
//! Invariants: Title and genre text is escaped in the HTML view; stored values never parse as markup.
//! Invariants: With color disabled, `colorize_json` output equals `serde_json::to_string_pretty`.

use crate::core::movie::Movie;
use serde_json::{Map, Value, json};

pub const NO_RECORDS: &str = "No movies found.";

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

/// Space-aligned table with an `ID TITLE YEAR GENRE` header row.
pub fn render_table(movies: &[&Movie]) -> String {
    if movies.is_empty() {
        return NO_RECORDS.to_string();
    }
    let headers = ["ID", "TITLE", "YEAR", "GENRE"];
    let rows = movies
        .iter()
        .map(|movie| {
            vec![
                movie.id.to_string(),
                sanitize_table_cell(&movie.title),
                movie.year.to_string(),
                sanitize_table_cell(&movie.genre),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_table_line(
        &headers.map(str::to_string),
        &widths,
    ));
    for row in &rows {
        lines.push(format_table_line(row, &widths));
    }
    lines.join("\n")
}

fn sanitize_table_cell(value: &str) -> String {
    value.replace('\n', "\\n").replace('\r', "\\r")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let cell_len = cell.chars().count();
        if *width > cell_len && idx + 1 < cells.len() {
            line.push_str(&" ".repeat(*width - cell_len));
        }
    }
    line
}

/// The list view as an HTML fragment, one `div.movie-item` per row.
pub fn render_html(movies: &[&Movie]) -> String {
    if movies.is_empty() {
        return format!("<p>{NO_RECORDS}</p>");
    }
    let mut out = String::new();
    for (idx, movie) in movies.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "<div class=\"movie-item\"><p><strong>{}</strong> ({}) - {}</p></div>",
            escape_html(&movie.title),
            movie.year,
            escape_html(&movie.genre),
        ));
    }
    out
}

/// Escape text for embedding in HTML. `&` goes first so escapes are not re-escaped.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// The record array as a JSON value for machine output.
pub fn movies_json(movies: &[&Movie]) -> Value {
    Value::Array(
        movies
            .iter()
            .map(|movie| {
                json!({
                    "id": movie.id,
                    "title": movie.title,
                    "year": movie.year,
                    "genre": movie.genre,
                })
            })
            .collect(),
    )
}

pub fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, use_color, &mut out);
    out
}

fn write_value(value: &Value, indent: usize, use_color: bool, out: &mut String) {
    match value {
        Value::Null => push_colored("null", COLOR_NULL, use_color, out),
        Value::Bool(val) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        Value::Number(num) => push_colored(&num.to_string(), COLOR_NUMBER, use_color, out),
        Value::String(text) => {
            let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
            push_colored(&encoded, COLOR_STRING, use_color, out);
        }
        Value::Array(items) => write_array(items, indent, use_color, out),
        Value::Object(map) => write_object(map, indent, use_color, out),
    }
}

fn write_array(items: &[Value], indent: usize, use_color: bool, out: &mut String) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(indent + 1, out);
        write_value(item, indent + 1, use_color, out);
        if idx + 1 < items.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_object(map: &Map<String, Value>, indent: usize, use_color: bool, out: &mut String) {
    if map.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    let len = map.len();
    for (idx, (key, value)) in map.iter().enumerate() {
        push_indent(indent + 1, out);
        let encoded = serde_json::to_string(key).unwrap_or_else(|_| "\"\"".to_string());
        push_colored(&encoded, COLOR_KEY, use_color, out);
        push_colored(":", COLOR_PUNCT, use_color, out);
        out.push(' ');
        write_value(value, indent + 1, use_color, out);
        if idx + 1 < len {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
