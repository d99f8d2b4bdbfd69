use chrono::Utc;
use std::path::PathBuf;

const APP_DIR: &str = "event-board";

/// Per-user configuration directory, or the working directory when the
/// platform has none.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Milliseconds since the Unix epoch, used as the cache-busting stamp.
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Appends `v=<stamp>` so browsers and proxies cannot serve a stale copy.
/// A `#fragment` stays at the end.
pub fn with_cache_bust(url: &str, stamp: u64) -> String {
    let (base, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}v={stamp}{fragment}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_bust_picks_separator() {
        assert_eq!(
            with_cache_bust("https://cdn.test/a.png", 42),
            "https://cdn.test/a.png?v=42"
        );
        assert_eq!(
            with_cache_bust("https://cdn.test/a.png?size=2", 42),
            "https://cdn.test/a.png?size=2&v=42"
        );
    }

    #[test]
    fn cache_bust_goes_before_fragment() {
        assert_eq!(with_cache_bust("a.png#x", 42), "a.png?v=42#x");
        assert_eq!(
            with_cache_bust("https://cdn.test/a.png?size=2#crop", 7),
            "https://cdn.test/a.png?size=2&v=7#crop"
        );
        assert_eq!(with_cache_bust("a.png#?odd", 1), "a.png?v=1#?odd");
    }

    #[test]
    fn config_lives_in_app_dir() {
        assert_eq!(config_path().file_name().and_then(|n| n.to_str()), Some("config.json"));
        assert!(config_path().starts_with(config_dir()));
        if dirs::config_dir().is_some() {
            assert!(config_dir().ends_with(APP_DIR));
        }
    }
}
