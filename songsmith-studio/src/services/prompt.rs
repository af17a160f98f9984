//! Prompt construction
//!
//! Pure, deterministic string templates. The prompts are German because the
//! generated lyrics are German.

use serde::{Deserialize, Serialize};
use songsmith_common::db::{Draft, ReferenceLyric};

/// Words the model is told to avoid when a request names none
pub const DEFAULT_AVOIDED_WORDS: [&str; 7] =
    ["Schatten", "Echo", "Kälte", "Glanz", "zerbricht", "rast", "kalt"];

/// Placeholder for an empty side of the corpus
const NO_CORPUS_PLACEHOLDER: &str = "Keine vorhanden.";

/// Separator between corpus documents
const CORPUS_SEPARATOR: &str = "\n\n---\n\n";

/// Mood of the song
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    /// Let the model combine all moods
    #[default]
    Unspecified,
    Melancholic,
    Euphoric,
    Aggressive,
    Relaxing,
    Romantic,
}

impl Genre {
    const ALL: [Genre; 5] = [
        Genre::Melancholic,
        Genre::Euphoric,
        Genre::Aggressive,
        Genre::Relaxing,
        Genre::Romantic,
    ];

    fn label(self) -> String {
        match self {
            Genre::Unspecified => Self::ALL
                .iter()
                .map(|g| g.label())
                .collect::<Vec<_>>()
                .join(", "),
            Genre::Melancholic => "Melancholische Songs".to_string(),
            Genre::Euphoric => "Euphorische und fröhliche Songs".to_string(),
            Genre::Aggressive => "Aggressive oder wütende Songs".to_string(),
            Genre::Relaxing => "Entspannende und beruhigende Songs".to_string(),
            Genre::Romantic => "Romantische Songs".to_string(),
        }
    }
}

/// Narrative perspective
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    #[default]
    None,
    FirstPerson,
    SecondPerson,
    ThirdPerson,
}

impl Perspective {
    fn label(self) -> &'static str {
        match self {
            Perspective::None => "Nicht spezifiziert, wähle die passendste.",
            Perspective::FirstPerson => "Ich",
            Perspective::SecondPerson => "Du",
            Perspective::ThirdPerson => "3. Person",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStyle {
    #[default]
    Unspecified,
    Sung,
    Rap,
    Mixed,
}

impl PerformanceStyle {
    fn label(self) -> &'static str {
        match self {
            PerformanceStyle::Unspecified => "Nicht spezifiziert, wähle den passendsten.",
            PerformanceStyle::Sung => "Gesungen",
            PerformanceStyle::Rap => "Gerappt",
            PerformanceStyle::Mixed => "Gemischt (gesungene Hooks, gerappte Strophen)",
        }
    }
}

/// User choices for one song generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRequest {
    pub idea: String,
    #[serde(default)]
    pub genre: Genre,
    #[serde(default)]
    pub perspective: Perspective,
    #[serde(default)]
    pub performance_style: PerformanceStyle,
    #[serde(default)]
    pub instructions: String,
    /// Negative constraints; empty means [`DEFAULT_AVOIDED_WORDS`]
    #[serde(default)]
    pub avoided_words: Vec<String>,
}

/// Prior lyrics passed to the model as style reference
#[derive(Debug, Clone, Copy)]
pub struct LyricCorpus<'a> {
    pub drafts: &'a [Draft],
    pub references: &'a [ReferenceLyric],
}

impl<'a> LyricCorpus<'a> {
    pub fn new(drafts: &'a [Draft], references: &'a [ReferenceLyric]) -> Self {
        Self { drafts, references }
    }

    fn render_drafts(&self) -> String {
        if self.drafts.is_empty() {
            return NO_CORPUS_PLACEHOLDER.to_string();
        }
        self.drafts
            .iter()
            .map(|d| format!("Titel: {}\nText:\n{}", d.title, d.content))
            .collect::<Vec<_>>()
            .join(CORPUS_SEPARATOR)
    }

    fn render_references(&self) -> String {
        if self.references.is_empty() {
            return NO_CORPUS_PLACEHOLDER.to_string();
        }
        self.references
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join(CORPUS_SEPARATOR)
    }
}

/// Creative helper tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeTool {
    MetaphorGenerator,
    LineVariations,
    SentenceCompleter,
}

fn render_avoided_words(words: &[String]) -> String {
    let quoted: Vec<String> = if words.iter().all(|w| w.trim().is_empty()) {
        DEFAULT_AVOIDED_WORDS
            .iter()
            .map(|w| format!("\"{}\"", w))
            .collect()
    } else {
        words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(|w| format!("\"{}\"", w))
            .collect()
    };
    quoted.join(", ")
}

/// Assemble the song generation prompt
pub fn build_song_prompt(request: &SongRequest, corpus: &LyricCorpus<'_>) -> String {
    let instructions = match request.instructions.trim() {
        "" => "Keine.",
        text => text,
    };

    format!(
        r#"Du bist ein hochkreativer Songwriting-Assistent. Schreibe einen anspruchsvollen Songtext in der Stimmung: {genre}. Halte dich strikt an die folgenden Regeln.

**BENUTZEREINGABEN:**
- **Song-Idee:** {idea}
- **Perspektive:** {perspective}
- **Vortragsstil:** {style}
- **Zusätzliche Anweisungen:** {instructions}

**REGELWERK (STRIKT EINZUHALTEN):**

**1. Wortwahl und Stil:**
- VERMEIDE UNBEDINGT die folgenden Wörter: {avoided}.
- Keine Klischees und keine abgedroschenen Phrasen. Jede Zeile soll überraschen.
- Zeige Gefühle über Handlungen, Sinneseindrücke und Bilder, statt sie zu benennen.
- Orientiere dich am modernen deutschen Pop- und Rap-Stil. Umgangssprache authentisch, Anglizismen sparsam.
- Jede Zeile muss auf Deutsch Sinn ergeben. Vermeide Wiederholungen und typische KI-Floskeln.
- Wird dieselbe Idee mehrmals angefragt, soll jedes Ergebnis anders sein.

**2. Storytelling:**
- Ein klarer roter Faden durch den ganzen Song.
- Ein wiederkehrendes, bildhaftes Motiv.
- Lebendige, multisensorische Schauplätze.
- Verse, die wie ein Dialog klingen, und mindestens ein Paradoxon.

**3. Metrik und Reime:**
- Setze Reimschemata (AABB, ABAB, ABBA, ABCA, ABAC) präzise um.
- Bei Assonanzen müssen Vokale und Silbenanzahl übereinstimmen.
- Nutze Kettenreime und Mehrfachreime in den Strophen, nicht im Refrain.
- Variiere die Silbenzahl pro Zeile für einen lebendigen Flow.

**STILISTISCHE REFERENZTEXTE (ALS INSPIRATION NUTZEN, NICHT KOPIEREN):**
--- EIGENE TEXTE DES NUTZERS ---
{drafts}
--- EXTERNE REFERENZTEXTE (ÖFFENTLICH) ---
{references}

**AUSGABEFORMAT (EXAKT EINZUHALTEN):**
Gib deine Antwort in drei klar getrennten Abschnitten zurück: ### Storyline, ### Arrangement, ### Songtext."#,
        genre = request.genre.label(),
        idea = request.idea.trim(),
        perspective = request.perspective.label(),
        style = request.performance_style.label(),
        instructions = instructions,
        avoided = render_avoided_words(&request.avoided_words),
        drafts = corpus.render_drafts(),
        references = corpus.render_references(),
    )
}

/// Prompt asking for five one-sentence song ideas, one per line
pub fn build_idea_prompt() -> String {
    "Erstelle 5 kreative und unterschiedliche Song-Ideen für einen modernen deutschen Pop- oder \
     Rap-Song. Jede Idee ist nur ein kurzer Satz. Gib nur die 5 Sätze zurück, getrennt durch einen \
     Zeilenumbruch, ohne Nummerierung oder zusätzliche Erklärungen."
        .to_string()
}

/// Prompt asking for rhymes as a comma-separated list
pub fn build_rhyme_prompt(word: &str) -> String {
    format!(
        "Finde eine Liste von 10-15 kreativen Reimen (Endreime und Assonanzen, für Rap geeignet) \
         für das deutsche Wort \"{}\". Gib nur die Wörter als kommagetrennte Liste zurück.",
        word.trim()
    )
}

/// Prompt for one of the creative tools; every variant asks for a numbered list
pub fn build_creative_prompt(tool: CreativeTool, input: &str) -> String {
    let input = input.trim();
    let task = match tool {
        CreativeTool::MetaphorGenerator => format!(
            "Erfinde 5 originelle, unverbrauchte Metaphern für \"{}\", passend für einen modernen \
             deutschen Songtext.",
            input
        ),
        CreativeTool::LineVariations => format!(
            "Schreibe 5 Variationen der folgenden Songzeile. Behalte Bedeutung und Silbenanzahl \
             ungefähr bei, verändere Wortwahl und Bilder: \"{}\"",
            input
        ),
        CreativeTool::SentenceCompleter => format!(
            "Vervollständige den folgenden Satzanfang auf 5 verschiedene, bildhafte Arten für \
             einen Songtext: \"{}\"",
            input
        ),
    };

    format!(
        "{} Gib das Ergebnis als nummerierte Liste zurück (1. ..., 2. ...), ohne weitere \
         Erklärungen.",
        task
    )
}
