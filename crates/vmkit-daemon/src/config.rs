use std::path::PathBuf;

/// Environment variable overriding the daemon state directory.
pub const DATA_DIR_ENV: &str = "VMKIT_DATA_DIR";

/// Resolve the daemon state directory.
/// Priority: `VMKIT_DATA_DIR` env var > `$HOME/.local/share/vmkit`.
pub fn data_dir() -> PathBuf {
    resolve_data_dir(
        std::env::var(DATA_DIR_ENV).ok(),
        std::env::var("HOME").ok(),
    )
}

fn resolve_data_dir(override_dir: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = home.unwrap_or_else(|| ".".to_string());
    PathBuf::from(home).join(".local/share/vmkit")
}
