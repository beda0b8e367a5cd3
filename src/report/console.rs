//! Human-facing progress lines. Diagnostics go through `tracing`; this is
//! what a user watching the terminal reads.

use crate::downloader::outcome::AggregateResult;
use crate::manifest::Manifest;
use crate::manifest::platform::output_filename;

const RULE_WIDTH: usize = 70;

pub fn print_step(message: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}\n  {}\n{}", rule, message, rule);
}

pub fn print_success(message: &str) {
    println!("  ✓ {}", message);
}

pub fn print_error(message: &str) {
    eprintln!("  ✗ {}", message);
}

/// Binary units with two decimals, `1536` → `"1.50 KB"`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}

pub fn manifest_summary(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec![
        format!("Version: {}", manifest.version),
        format!("Build date: {}", manifest.build_date),
        format!("Platforms: {}", manifest.platforms.len()),
    ];
    for (platform, spec) in &manifest.platforms {
        lines.push(format!(
            "  • {:30} {}",
            output_filename(platform),
            format_size(spec.size)
        ));
    }
    lines.push(format!("Total: {}", format_size(manifest.total_size())));
    lines
}

pub fn print_manifest_summary(manifest: &Manifest) {
    for line in manifest_summary(manifest) {
        match line.strip_prefix("  ") {
            Some(row) => println!("    {}", row),
            None => print_success(&line),
        }
    }
}

pub fn print_outcomes(result: &AggregateResult) {
    for outcome in result.outcomes.iter().filter(|o| o.is_success()) {
        print_success(&outcome.to_string());
    }
    for failure in result.failures() {
        print_error(&failure.to_string());
    }
    println!(
        "\n  Completed: {}/{} platforms",
        result.success_count, result.total_count
    );
    if !result.is_success() {
        print_error("Some platforms failed, see the log above");
    }
}
