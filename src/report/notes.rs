use std::fmt::Write;

use super::changelog::ChangelogEntry;
use crate::manifest::Version;

/// Markdown release notes: title, recent changes and the SHA-256 listing.
pub fn format_release_notes(
    version: &Version,
    checksums: &[String],
    entries: &[ChangelogEntry],
) -> String {
    let mut notes = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(notes, "# Release {}\n", version);

    let _ = writeln!(notes, "## What's changed\n");
    if entries.is_empty() {
        let _ = writeln!(notes, "No changelog entries.\n");
    }
    for entry in entries {
        let _ = writeln!(notes, "### {}\n", entry.version);
        if !entry.content.is_empty() {
            let _ = writeln!(notes, "{}\n", entry.content);
        }
    }

    let _ = writeln!(notes, "## SHA-256 checksums\n");
    let _ = writeln!(notes, "```");
    for line in checksums {
        let _ = writeln!(notes, "{}", line);
    }
    let _ = writeln!(notes, "```");
    notes
}
