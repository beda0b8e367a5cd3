//! Platform key to file name mapping.

/// Local file name for every platform the release is known to ship.
pub const PLATFORM_FILENAMES: [(&str, &str); 7] = [
    ("darwin-arm64", "claude-darwin-arm64"),
    ("darwin-x64", "claude-darwin-x64"),
    ("linux-arm64", "claude-linux-arm64"),
    ("linux-x64", "claude-linux-x64"),
    ("linux-arm64-musl", "claude-linux-arm64-musl"),
    ("linux-x64-musl", "claude-linux-x64-musl"),
    ("win32-x64", "claude-win32-x64.exe"),
];

pub fn is_windows(platform: &str) -> bool {
    platform.contains("win32")
}

/// Name of the artifact inside the remote `{version}/{platform}/` directory.
pub fn binary_name(platform: &str) -> &'static str {
    if is_windows(platform) {
        "claude.exe"
    } else {
        "claude"
    }
}

/// Local file name under `releases/{version}/`. Unknown keys get
/// `claude-{key}` so two unknown platforms never write the same file.
pub fn output_filename(platform: &str) -> String {
    PLATFORM_FILENAMES
        .iter()
        .find(|(key, _)| *key == platform)
        .map(|(_, filename)| filename.to_string())
        .unwrap_or_else(|| {
            if is_windows(platform) {
                format!("claude-{}.exe", platform)
            } else {
                format!("claude-{}", platform)
            }
        })
}
