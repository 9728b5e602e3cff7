use crate::models::{TitleRecord, TitleType};

/// Pick the series title for `language`.
///
/// Fallback chain: best-ranked title in `language` (official before
/// synonym before short, ties broken by catalog order), then the first
/// official title in any language, then the first title at all. Blank
/// titles never qualify.
pub fn select_title<'a, I>(titles: I, language: &str) -> Option<&'a TitleRecord>
where
    I: IntoIterator<Item = &'a TitleRecord>,
{
    let usable: Vec<&TitleRecord> = titles
        .into_iter()
        .filter(|t| !t.title.trim().is_empty())
        .collect();

    usable
        .iter()
        .enumerate()
        .filter(|(_, t)| t.language.eq_ignore_ascii_case(language))
        .min_by_key(|(i, t)| (t.kind.rank(), *i))
        .map(|(_, t)| *t)
        .or_else(|| usable.iter().find(|t| t.kind.is_official()).copied())
        .or_else(|| usable.first().copied())
}

/// The official Japanese title, used as the host's "original title".
pub fn japanese_title<'a, I>(titles: I) -> Option<&'a TitleRecord>
where
    I: IntoIterator<Item = &'a TitleRecord>,
{
    titles
        .into_iter()
        .find(|t| t.language == "ja" && t.kind.is_official() && !t.title.trim().is_empty())
}

/// The romanized main title, used as the host's sort name.
pub fn romaji_title<'a, I>(titles: I) -> Option<&'a TitleRecord>
where
    I: IntoIterator<Item = &'a TitleRecord>,
{
    titles
        .into_iter()
        .find(|t| t.language == "x-jat" && t.kind == TitleType::Main && !t.title.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bebop() -> Vec<TitleRecord> {
        vec![
            TitleRecord::new("x-jat", "Cowboy Bebop", TitleType::Main),
            TitleRecord::new("ja", "カウボーイビバップ", TitleType::Official),
            TitleRecord::new("en", "CB", TitleType::Short),
            TitleRecord::new("en", "Cowboy Bebop (EN)", TitleType::Official),
            TitleRecord::new("de", "Cowboy Bebop DE", TitleType::Synonym),
        ]
    }

    #[test]
    fn test_preferred_language_wins() {
        let titles = bebop();
        assert_eq!(select_title(&titles, "ja").unwrap().title, "カウボーイビバップ");
        assert_eq!(select_title(&titles, "x-jat").unwrap().title, "Cowboy Bebop");
    }

    #[test]
    fn test_official_beats_short_in_same_language() {
        let titles = bebop();
        assert_eq!(select_title(&titles, "en").unwrap().title, "Cowboy Bebop (EN)");
    }

    #[test]
    fn test_synonym_used_when_only_language_match() {
        let titles = bebop();
        assert_eq!(select_title(&titles, "de").unwrap().title, "Cowboy Bebop DE");
    }

    #[test]
    fn test_falls_back_to_official() {
        let titles = vec![TitleRecord::new("en", "Cowboy Bebop", TitleType::Official)];
        assert_eq!(select_title(&titles, "ja").unwrap().title, "Cowboy Bebop");
    }

    #[test]
    fn test_falls_back_to_first_in_order() {
        let titles = vec![
            TitleRecord::new("fr", "Premier", TitleType::Synonym),
            TitleRecord::new("it", "Secondo", TitleType::Short),
        ];
        assert_eq!(select_title(&titles, "ja").unwrap().title, "Premier");
    }

    #[test]
    fn test_blank_titles_skipped() {
        let titles = vec![
            TitleRecord::new("ja", "  ", TitleType::Official),
            TitleRecord::new("en", "Real", TitleType::Synonym),
        ];
        assert_eq!(select_title(&titles, "ja").unwrap().title, "Real");
    }

    #[test]
    fn test_empty_list_has_no_title() {
        let titles: Vec<TitleRecord> = Vec::new();
        assert!(select_title(&titles, "en").is_none());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let titles = bebop();
        for lang in ["en", "ja", "x-jat", "de", "ko"] {
            assert_eq!(select_title(&titles, lang), select_title(&titles, lang));
        }
    }

    #[test]
    fn test_romaji_sort_title() {
        let titles = bebop();
        assert_eq!(romaji_title(&titles).unwrap().title, "Cowboy Bebop");
        assert!(romaji_title(&titles[1..]).is_none());
    }

    #[test]
    fn test_japanese_original_title() {
        let titles = bebop();
        assert_eq!(japanese_title(&titles).unwrap().title, "カウボーイビバップ");
        assert!(japanese_title(&titles[..1]).is_none());
    }
}
