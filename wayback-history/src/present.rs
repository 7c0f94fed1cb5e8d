use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::capture::Capture;

/// Render captures as a table, each archive URL on its own indented line
pub fn write_table<W: Write>(out: &mut W, captures: &[Capture]) -> io::Result<()> {
    writeln!(out, "{} snapshots found:\n", captures.len())?;
    writeln!(out, "{:<20} {:<10} {:<20}", "Date", "Status", "MIME Type")?;
    writeln!(out, "{}", "-".repeat(60))?;

    for capture in captures {
        let status = if capture.status.is_empty() {
            "-"
        } else {
            capture.status.as_str()
        };
        writeln!(
            out,
            "{:<20} {:<10} {:<20}",
            capture.display_date(),
            status,
            capture.mime_type
        )?;
        writeln!(out, "  {}\n", capture.url)?;
    }

    Ok(())
}

pub fn print_table(captures: &[Capture]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_table(&mut out, captures).context("Failed to write snapshot table")
}

pub fn to_json(captures: &[Capture]) -> Result<String> {
    serde_json::to_string_pretty(captures).context("Failed to serialize snapshots")
}

pub fn save_json<P: AsRef<Path>>(path: P, captures: &[Capture]) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(captures)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::DEFAULT_ARCHIVE_BASE;

    #[test]
    fn test_table_layout() {
        let captures = vec![
            Capture::new(
                DEFAULT_ARCHIVE_BASE,
                "20100601123000",
                "http://example.com/",
                "text/html",
                "200",
                "AAAA",
            ),
            Capture::new(
                DEFAULT_ARCHIVE_BASE,
                "20150301000000",
                "http://example.com/",
                "warc/revisit",
                "",
                "BBBB",
            ),
        ];

        let mut out = Vec::new();
        write_table(&mut out, &captures).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "2 snapshots found:");
        assert!(lines[2].starts_with("Date"));
        assert!(lines[4].starts_with("2010-06-01 12:30:00  200        text/html"));
        assert_eq!(
            lines[5],
            "  http://web.archive.org/web/20100601123000/http://example.com/"
        );
        assert!(lines[7].starts_with("2015-03-01 00:00:00  -          warc/revisit"));
    }

    #[test]
    fn test_json_keeps_fields() {
        let captures = vec![Capture::new(
            DEFAULT_ARCHIVE_BASE,
            "20100601123000",
            "http://example.com/",
            "text/html",
            "200",
            "AAAA",
        )];
        let json = to_json(&captures).unwrap();
        let parsed: Vec<Capture> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, captures);
        assert!(json.contains("\"mime_type\": \"text/html\""));
    }
}
