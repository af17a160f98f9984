//! Best-effort parsing of model replies

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static STORYLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)### Storyline\s*(.*?)\s*### Arrangement").expect("valid regex"));
static ARRANGEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)### Arrangement\s*(.*?)\s*### Songtext").expect("valid regex"));
static SONGTEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)### Songtext\s*(.*)").expect("valid regex"));
static NUMBERED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+").expect("valid regex"));

/// A generation reply split into its sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSong {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storyline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrangement: Option<String>,
    pub songtext: String,
    /// All three section markers were found
    pub structured: bool,
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Split a reply at `### Storyline`, `### Arrangement` and `### Songtext`
///
/// If any section is missing, the whole reply is returned as the songtext.
pub fn split_song_response(text: &str) -> GeneratedSong {
    match (
        capture(&STORYLINE_RE, text),
        capture(&ARRANGEMENT_RE, text),
        capture(&SONGTEXT_RE, text),
    ) {
        (Some(storyline), Some(arrangement), Some(songtext)) => GeneratedSong {
            storyline: Some(storyline),
            arrangement: Some(arrangement),
            songtext,
            structured: true,
        },
        _ => GeneratedSong {
            storyline: None,
            arrangement: None,
            songtext: text.to_string(),
            structured: false,
        },
    }
}

/// One idea per non-blank line
pub fn parse_ideas(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-separated rhymes; blank entries dropped
pub fn parse_rhymes(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lines of the form `1. item`, returned without the number
pub fn parse_numbered_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| NUMBERED_ITEM_RE.is_match(l))
        .map(|l| NUMBERED_ITEM_RE.replace(l, "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPLY: &str = "Hier ist dein Song:\n\n### Storyline\n  Zwei Freunde treffen sich.  \n\n### Arrangement\nLangsamer Beat, Piano.\n\n### Songtext\n[Strophe 1]\nWir stehn am Gleis\n";

    #[test]
    fn test_full_reply_splits_into_three_trimmed_sections() {
        let song = split_song_response(FULL_REPLY);

        assert!(song.structured);
        assert_eq!(song.storyline.as_deref(), Some("Zwei Freunde treffen sich."));
        assert_eq!(song.arrangement.as_deref(), Some("Langsamer Beat, Piano."));
        assert_eq!(song.songtext, "[Strophe 1]\nWir stehn am Gleis");
    }

    #[test]
    fn test_sections_do_not_overlap() {
        let song = split_song_response(FULL_REPLY);
        let storyline = song.storyline.unwrap();
        let arrangement = song.arrangement.unwrap();

        assert!(!storyline.contains("###"));
        assert!(!arrangement.contains("###"));
        assert!(!song.songtext.contains("###"));
        assert!(!storyline.contains("Piano"));
        assert!(!arrangement.contains("Gleis"));
    }

    #[test]
    fn test_missing_marker_returns_whole_reply() {
        let reply = "### Storyline\nEtwas\n### Songtext\nText ohne Arrangement";
        let song = split_song_response(reply);

        assert!(!song.structured);
        assert_eq!(song.storyline, None);
        assert_eq!(song.arrangement, None);
        assert_eq!(song.songtext, reply);
    }

    #[test]
    fn test_plain_reply_is_unstructured() {
        let song = split_song_response("Nur ein Text");
        assert!(!song.structured);
        assert_eq!(song.songtext, "Nur ein Text");
    }

    #[test]
    fn test_unstructured_song_serializes_without_sections() {
        let json = serde_json::to_value(split_song_response("x")).unwrap();
        assert!(json.get("storyline").is_none());
        assert_eq!(json["structured"], false);
    }

    #[test]
    fn test_parse_ideas_skips_blank_lines() {
        let ideas = parse_ideas("Idee eins\n\n  Idee zwei  \n   \nIdee drei");
        assert_eq!(ideas, vec!["Idee eins", "Idee zwei", "Idee drei"]);
    }

    #[test]
    fn test_parse_rhymes_trims_and_drops_blanks() {
        let rhymes = parse_rhymes(" Schmerz, Herz ,März,, Kommerz,");
        assert_eq!(rhymes, vec!["Schmerz", "Herz", "März", "Kommerz"]);
    }

    #[test]
    fn test_parse_numbered_list_keeps_only_items() {
        let list = parse_numbered_list(
            "Hier sind Vorschläge:\n1. Die Stadt atmet Neon\n2.  Mein Herz ist ein Bahnhof\nFazit\n10. Zehn",
        );
        assert_eq!(
            list,
            vec!["Die Stadt atmet Neon", "Mein Herz ist ein Bahnhof", "Zehn"]
        );
    }

    #[test]
    fn test_parse_numbered_list_requires_space_after_dot() {
        assert!(parse_numbered_list("1.5 Liter\n2024.").is_empty());
    }
}
