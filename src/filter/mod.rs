//! Allow-list filtering of M3U playlist text.
//!
//! This is the core of the service: a single forward pass over the raw
//! playlist lines that keeps only the `#EXTINF` metadata lines whose
//! `tvg-id` attribute is on the allow-list, each immediately followed by
//! its stream URL line. Blank lines and player option directives are
//! dropped, as are entries for any channel not on the list. The transform
//! is pure text-to-text and never fails; malformed input degrades to a
//! header-only document.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Header marker emitted as the first line of every filtered document.
pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// Metadata line prefix for channel entries.
pub const EXTINF_PREFIX: &str = "#EXTINF";

/// Player-directive prefixes that are dropped entirely, never re-emitted.
const OPTION_PREFIXES: [&str; 2] = ["#EXTVLCOPT", "#KODIPROP"];

fn tvg_id_regex() -> &'static Regex {
    static TVG_ID: OnceLock<Regex> = OnceLock::new();
    TVG_ID.get_or_init(|| Regex::new(r#"(?i)tvg-id="([^"]*)""#).expect("tvg-id pattern is valid"))
}

/// Case-insensitive set of `tvg-id` values to retain.
///
/// Built once from configuration at startup; identifiers are normalized to
/// lowercase here so each lookup is a plain set membership test.
#[derive(Debug, Clone)]
pub struct AllowList {
    ids: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(|id| id.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Exact match against the allow-list, ignoring letter case.
    pub fn contains(&self, tvg_id: &str) -> bool {
        self.ids.contains(&tvg_id.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Filter raw playlist text down to the entries whose `tvg-id` is on the
/// allow-list.
///
/// The pairing of metadata and URL lines is positional: after a retained
/// `#EXTINF` line, the very next non-blank, non-option line is taken as its
/// stream URL. A non-matching `#EXTINF` line drops both itself and its URL.
/// Option lines and blank lines are skipped without touching that state, so
/// they may sit between a metadata line and its URL.
///
/// Output lines are joined with `\n` and always start with the
/// [`PLAYLIST_HEADER`]; an input with no retained entries produces the
/// header alone. A retained metadata line at the very end of the input is
/// emitted without a URL line.
pub fn filter_playlist(content: &str, allow: &AllowList) -> String {
    let mut output = vec![PLAYLIST_HEADER];
    let mut awaiting_url = false;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if line.is_empty() || is_option_line(line) {
            continue;
        }

        if line.starts_with(EXTINF_PREFIX) {
            // Only the most recent metadata line's match decision governs
            // the next URL line.
            awaiting_url = extract_tvg_id(line).is_some_and(|id| allow.contains(id));
            if awaiting_url {
                output.push(line);
            }
        } else if awaiting_url {
            output.push(line);
            awaiting_url = false;
        }
    }

    output.join("\n")
}

/// Extract the `tvg-id` attribute value from an `#EXTINF` line, if present.
/// The attribute name is matched case-insensitively; the value is returned
/// as written.
pub fn extract_tvg_id(line: &str) -> Option<&str> {
    tvg_id_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn is_option_line(line: &str) -> bool {
    OPTION_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}
