//! Table output
//!
//! Renders a finished posts table to one of four textual formats and writes
//! the result to stdout or a file. The CSV rendering includes the reaction
//! columns only when at least one row carries tallies, so the header shape
//! follows what was actually fetched.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::SecondsFormat;

use crate::error::{Error, Result};
use crate::record::PostRecord;

/// Render one JSON object per line
pub fn render_jsonl(records: &[PostRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Render the whole table as a single indented JSON document
pub fn render_json(records: &[PostRecord]) -> Result<String> {
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    Ok(out)
}

/// Render comma-separated values with a header row
pub fn render_csv(records: &[PostRecord]) -> String {
    let with_reactions = records.iter().any(|r| r.reactions.is_some());

    let mut out = String::with_capacity(records.len() * 160);
    out.push_str(
        "id,author_name,author_id,message,created_time,updated_time,type,link,story,\
         comments_count,likes_count,shares_count",
    );
    if with_reactions {
        out.push_str(",love_count,haha_count,wow_count,sad_count,angry_count");
    }
    out.push('\n');

    for record in records {
        let fields = [
            csv_field(&record.id),
            csv_field(record.author_name.as_deref().unwrap_or_default()),
            csv_field(record.author_id.as_deref().unwrap_or_default()),
            csv_field(record.message.as_deref().unwrap_or_default()),
            record
                .created_time
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            record
                .updated_time
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            csv_field(record.post_type.as_deref().unwrap_or_default()),
            csv_field(record.link.as_deref().unwrap_or_default()),
            csv_field(record.story.as_deref().unwrap_or_default()),
            count_field(record.comments_count),
            count_field(record.likes_count),
            count_field(record.shares_count),
        ];
        out.push_str(&fields.join(","));

        if with_reactions {
            let tally = record.reactions.as_ref();
            for count in [
                tally.and_then(|t| t.love_count),
                tally.and_then(|t| t.haha_count),
                tally.and_then(|t| t.wow_count),
                tally.and_then(|t| t.sad_count),
                tally.and_then(|t| t.angry_count),
            ] {
                out.push(',');
                out.push_str(&count_field(count));
            }
        }
        out.push('\n');
    }

    out
}

/// Render a fixed-width listing for terminals
pub fn render_pretty(records: &[PostRecord]) -> String {
    if records.is_empty() {
        return "No posts.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<19}  {:<9}  {:>7}  {:>8}  {:>6}  {}",
        "CREATED", "TYPE", "LIKES", "COMMENTS", "SHARES", "MESSAGE"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:<19}  {:<9}  {:>7}  {:>8}  {:>6}  {}",
            record.created_time.format("%Y-%m-%d %H:%M:%S"),
            record.post_type.as_deref().unwrap_or("-"),
            count_cell(record.likes_count),
            count_cell(record.comments_count),
            count_cell(record.shares_count),
            excerpt(record.message.as_deref(), 48),
        );
    }
    let _ = writeln!(out, "\n{} posts", records.len());
    out
}

/// Write rendered output to a file, or stdout when no path is given
pub fn write_rendered(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content).map_err(|e| {
            Error::output(format!("Failed to write {}: {e}", path.display()))
        }),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

/// Quote a field when it contains the delimiter, a quote, or a line break
fn csv_field(value: &str) -> String {
    let needs_quoting = value.contains(|c| matches!(c, '"' | ',' | '\n' | '\r'));
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn count_field(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

fn count_cell(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// First line of the message, cut to the column width
fn excerpt(message: Option<&str>, width: usize) -> String {
    let text = message.unwrap_or_default().lines().next().unwrap_or_default();
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
