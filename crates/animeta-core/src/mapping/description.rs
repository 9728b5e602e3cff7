use std::sync::LazyLock;

use regex::Regex;

/// `http://anidb.net/ch123 [Spike Spiegel]` style inline links.
static RE_ANIDB_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://anidb\.net/\S+\s*\[([^\]]*)\]").unwrap());

/// Trailing attribution lines AniDB appends to synopses.
static RE_TRAILER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:\*\s*)?(?:source|note|summary)\s*:").unwrap());

/// Choose the series overview.
///
/// With `use_anidb` the AniDB text is used when present, else TVDB's.
/// Otherwise TVDB's text wins when present. AniDB text is cleaned first;
/// text that is blank after cleaning counts as absent.
pub fn select_description(
    anidb: Option<&str>,
    tvdb: Option<&str>,
    use_anidb: bool,
) -> Option<String> {
    let anidb = anidb.map(clean_anidb_description).filter(|s| !s.is_empty());
    let tvdb = tvdb.map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    if use_anidb {
        anidb.or(tvdb)
    } else {
        tvdb.or(anidb)
    }
}

/// Strip AniDB markup: inline links become their label and attribution
/// lines are dropped.
pub fn clean_anidb_description(text: &str) -> String {
    let text = RE_ANIDB_LINK.replace_all(text, "$1");
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !RE_TRAILER_LINE.is_match(line))
        .collect();
    kept.join("\n").trim().to_string()
}
