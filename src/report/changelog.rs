use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub version: String,
    pub content: String,
}

fn heading_version(heading: &str) -> String {
    let token = heading.split_whitespace().next().unwrap_or_default();
    let token = token.trim_start_matches('[').trim_end_matches(']');
    token.strip_prefix('v').unwrap_or(token).to_string()
}

/// Splits a markdown changelog on `## ` headings, newest first as written.
/// Anything above the first heading is a preamble and dropped.
pub fn parse(text: &str) -> Vec<ChangelogEntry> {
    let mut entries = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((version, body)) = current.take() {
                entries.push(ChangelogEntry {
                    version,
                    content: body.join("\n").trim().to_string(),
                });
            }
            current = Some((heading_version(heading), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((version, body)) = current {
        entries.push(ChangelogEntry {
            version,
            content: body.join("\n").trim().to_string(),
        });
    }
    entries
}

pub fn recent(entries: &[ChangelogEntry], n: usize) -> &[ChangelogEntry] {
    &entries[..n.min(entries.len())]
}

pub async fn read_changelog(path: &Path) -> io::Result<Vec<ChangelogEntry>> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(parse(&text))
}
