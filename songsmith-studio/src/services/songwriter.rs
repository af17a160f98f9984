//! Songwriter workflow
//!
//! Ties prompts, the text generator and the document store together.
//! Generation replies carrying the error marker are surfaced as messages and
//! never parsed.

use crate::db;
use crate::services::generation_client::{is_error_reply, TextGenerator};
use crate::services::prompt::{self, CreativeTool, LyricCorpus, SongRequest};
use crate::services::response_parser::{self, GeneratedSong};
use serde::Serialize;
use songsmith_common::db::Draft;
use songsmith_common::events::{ChangeKind, Collection, EventBus, SongsmithEvent};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

const UNSTRUCTURED_NOTICE: &str =
    "Die KI-Antwort konnte nicht vollständig strukturiert werden, hier ist das Ergebnis.";
const SAVED_NOTICE: &str = "Song erfolgreich gespeichert!";

/// Workflow errors
///
/// Display strings are user-facing.
#[derive(Debug, Error)]
pub enum SongwriterError {
    #[error("Bitte gib eine Song-Idee ein.")]
    EmptyIdea,

    #[error("Bitte gib einen Text ein.")]
    EmptyInput,

    #[error("Für diese Sitzung läuft bereits eine Generierung.")]
    AlreadyGenerating,

    /// The reply carried the error marker or contained nothing usable
    #[error("{0}")]
    GenerationFailed(String),

    #[error(transparent)]
    Store(#[from] songsmith_common::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Error,
    Info,
    Success,
}

/// Message shown next to a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Result of one song generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<GeneratedSong>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<StatusMessage>,
}

/// Removes the user from the in-flight set when the generation ends
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
    user_id: Uuid,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<Uuid>>>, user_id: Uuid) -> Option<Self> {
        let mut set = in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if !set.insert(user_id) {
            return None;
        }
        Some(Self {
            in_flight: Arc::clone(in_flight),
            user_id,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        set.remove(&self.user_id);
    }
}

#[derive(Clone)]
pub struct Songwriter {
    db: SqlitePool,
    event_bus: EventBus,
    generator: Arc<dyn TextGenerator>,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl Songwriter {
    pub fn new(db: SqlitePool, event_bus: EventBus, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            db,
            event_bus,
            generator,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a generation is running for this user
    pub fn is_generating(&self, user_id: Uuid) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(&user_id)
    }

    /// Generate a song from the user's choices and stored lyrics
    pub async fn generate_song(
        &self,
        user_id: Uuid,
        request: &SongRequest,
    ) -> Result<GenerationOutcome, SongwriterError> {
        if request.idea.trim().is_empty() {
            return Err(SongwriterError::EmptyIdea);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight, user_id)
            .ok_or(SongwriterError::AlreadyGenerating)?;

        self.event_bus.emit_lossy(SongsmithEvent::GenerationStarted {
            user_id,
            timestamp: songsmith_common::time::now(),
        });

        // Every Started is paired with a Finished, including store failures
        let result = self.compose_song(user_id, request).await;
        let song = result.as_ref().ok().and_then(|o| o.song.as_ref());
        self.event_bus.emit_lossy(SongsmithEvent::GenerationFinished {
            user_id,
            structured: song.is_some_and(|s| s.structured),
            failed: song.is_none(),
            timestamp: songsmith_common::time::now(),
        });

        result
    }

    async fn compose_song(
        &self,
        user_id: Uuid,
        request: &SongRequest,
    ) -> Result<GenerationOutcome, SongwriterError> {
        let drafts = db::drafts::list_drafts(&self.db, user_id).await?;
        let references = db::references::list_references(&self.db).await?;
        let prompt = prompt::build_song_prompt(request, &LyricCorpus::new(&drafts, &references));

        info!(
            user_id = %user_id,
            drafts = drafts.len(),
            references = references.len(),
            "Generating song"
        );
        let reply = self.generator.generate(&prompt).await;

        if is_error_reply(&reply) {
            warn!(user_id = %user_id, "Song generation failed");
            return Ok(GenerationOutcome {
                song: None,
                message: Some(StatusMessage::new(StatusKind::Error, reply)),
            });
        }

        let song = response_parser::split_song_response(&reply);
        let message = (!song.structured)
            .then(|| StatusMessage::new(StatusKind::Info, UNSTRUCTURED_NOTICE));
        Ok(GenerationOutcome {
            song: Some(song),
            message,
        })
    }

    /// Store a generated songtext as a draft titled with the idea
    pub async fn save_song(
        &self,
        user_id: Uuid,
        idea: &str,
        songtext: &str,
    ) -> Result<(Draft, StatusMessage), SongwriterError> {
        if idea.trim().is_empty() {
            return Err(SongwriterError::EmptyIdea);
        }
        if songtext.trim().is_empty() {
            return Err(SongwriterError::EmptyInput);
        }

        let draft = db::drafts::create_draft(&self.db, user_id, idea, songtext).await?;
        self.event_bus.emit_lossy(SongsmithEvent::collection_changed(
            Collection::Drafts,
            Some(user_id),
            draft.id.to_string(),
            ChangeKind::Added,
        ));
        info!(user_id = %user_id, draft_id = %draft.id, "Generated song saved");

        Ok((draft, StatusMessage::new(StatusKind::Success, SAVED_NOTICE)))
    }

    /// First of five generated song ideas
    pub async fn random_idea(&self) -> Result<String, SongwriterError> {
        let reply = self.checked_generate(&prompt::build_idea_prompt()).await?;
        response_parser::parse_ideas(&reply)
            .into_iter()
            .next()
            .ok_or_else(|| SongwriterError::GenerationFailed("Keine Idee erhalten.".to_string()))
    }

    pub async fn find_rhymes(&self, word: &str) -> Result<Vec<String>, SongwriterError> {
        if word.trim().is_empty() {
            return Err(SongwriterError::EmptyInput);
        }
        let reply = self.checked_generate(&prompt::build_rhyme_prompt(word)).await?;
        Ok(response_parser::parse_rhymes(&reply))
    }

    pub async fn run_creative_tool(
        &self,
        tool: CreativeTool,
        input: &str,
    ) -> Result<Vec<String>, SongwriterError> {
        if input.trim().is_empty() {
            return Err(SongwriterError::EmptyInput);
        }
        let reply = self
            .checked_generate(&prompt::build_creative_prompt(tool, input))
            .await?;
        Ok(response_parser::parse_numbered_list(&reply))
    }

    async fn checked_generate(&self, prompt: &str) -> Result<String, SongwriterError> {
        let reply = self.generator.generate(prompt).await;
        if is_error_reply(&reply) {
            return Err(SongwriterError::GenerationFailed(reply));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generation_client::error_reply;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Returns a fixed reply, optionally after a delay
    struct FixedGenerator {
        reply: String,
        delay: Duration,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Self::delayed(reply, Duration::ZERO)
        }

        fn delayed(reply: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                delay,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, prompt: &str) -> String {
            self.prompts.lock().unwrap().push(prompt.to_string());
            tokio::time::sleep(self.delay).await;
            self.reply.clone()
        }
    }

    async fn songwriter(generator: Arc<FixedGenerator>) -> Songwriter {
        Songwriter::new(db::test_pool().await, EventBus::new(16), generator)
    }

    fn request(idea: &str) -> SongRequest {
        SongRequest {
            idea: idea.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_idea_rejected_before_generation() {
        let generator = FixedGenerator::new("egal");
        let sw = songwriter(generator.clone()).await;

        let err = sw.generate_song(Uuid::new_v4(), &request("  ")).await.unwrap_err();
        assert!(matches!(err, SongwriterError::EmptyIdea));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_structured_reply_has_no_message() {
        let sw = songwriter(FixedGenerator::new(
            "### Storyline\nS\n### Arrangement\nA\n### Songtext\nT",
        ))
        .await;

        let outcome = sw.generate_song(Uuid::new_v4(), &request("Idee")).await.unwrap();
        let song = outcome.song.unwrap();
        assert!(song.structured);
        assert_eq!(song.songtext, "T");
        assert!(outcome.message.is_none());
    }

    #[tokio::test]
    async fn test_unstructured_reply_gets_info_notice() {
        let sw = songwriter(FixedGenerator::new("Einfach nur Text")).await;

        let outcome = sw.generate_song(Uuid::new_v4(), &request("Idee")).await.unwrap();
        assert_eq!(outcome.song.unwrap().songtext, "Einfach nur Text");
        assert_eq!(outcome.message.unwrap().kind, StatusKind::Info);
    }

    #[tokio::test]
    async fn test_error_reply_is_not_parsed() {
        let reply = error_reply("API-Fehler: 503 Service Unavailable");
        let sw = songwriter(FixedGenerator::new(&reply)).await;

        let outcome = sw.generate_song(Uuid::new_v4(), &request("Idee")).await.unwrap();
        assert!(outcome.song.is_none());
        let message = outcome.message.unwrap();
        assert_eq!(message.kind, StatusKind::Error);
        assert_eq!(message.text, reply);
    }

    #[tokio::test]
    async fn test_corpus_includes_own_drafts_only() {
        let generator = FixedGenerator::new("x");
        let sw = songwriter(generator.clone()).await;
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        db::drafts::create_draft(&sw.db, me, "Mein Lied", "meine Zeilen").await.unwrap();
        db::drafts::create_draft(&sw.db, other, "Fremdes Lied", "fremde Zeilen").await.unwrap();
        db::references::submit_reference(&sw.db, "öffentliche Zeilen").await.unwrap();

        sw.generate_song(me, &request("Idee")).await.unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Titel: Mein Lied\nText:\nmeine Zeilen"));
        assert!(prompts[0].contains("öffentliche Zeilen"));
        assert!(!prompts[0].contains("fremde Zeilen"));
    }

    #[tokio::test]
    async fn test_second_generation_for_same_user_conflicts() {
        let sw = songwriter(FixedGenerator::delayed("x", Duration::from_millis(300))).await;
        let user = Uuid::new_v4();

        let running = {
            let sw = sw.clone();
            tokio::spawn(async move { sw.generate_song(user, &request("Eins")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sw.is_generating(user));

        let err = sw.generate_song(user, &request("Zwei")).await.unwrap_err();
        assert!(matches!(err, SongwriterError::AlreadyGenerating));

        // Other users are not blocked
        assert!(sw.generate_song(Uuid::new_v4(), &request("Drei")).await.is_ok());

        assert!(running.await.unwrap().is_ok());
        assert!(!sw.is_generating(user));
    }

    #[tokio::test]
    async fn test_generation_events_emitted() {
        let sw = songwriter(FixedGenerator::new("unstrukturiert")).await;
        let mut rx = sw.event_bus.subscribe();
        let user = Uuid::new_v4();

        sw.generate_song(user, &request("Idee")).await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            SongsmithEvent::GenerationStarted { .. }
        ));
        match rx.recv().await.unwrap() {
            SongsmithEvent::GenerationFinished {
                structured, failed, ..
            } => {
                assert!(!structured);
                assert!(!failed);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_failure_still_finishes_generation() {
        let generator = FixedGenerator::new("x");
        let sw = songwriter(generator.clone()).await;
        let mut rx = sw.event_bus.subscribe();
        let user = Uuid::new_v4();
        sw.db.close().await;

        let err = sw.generate_song(user, &request("Idee")).await.unwrap_err();
        assert!(matches!(err, SongwriterError::Store(_)));
        assert!(generator.prompts.lock().unwrap().is_empty());
        assert!(!sw.is_generating(user));

        assert!(matches!(
            rx.recv().await.unwrap(),
            SongsmithEvent::GenerationStarted { .. }
        ));
        match rx.recv().await.unwrap() {
            SongsmithEvent::GenerationFinished {
                user_id,
                structured,
                failed,
                ..
            } => {
                assert_eq!(user_id, user);
                assert!(!structured);
                assert!(failed);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_song_creates_draft_titled_with_idea() {
        let sw = songwriter(FixedGenerator::new("x")).await;
        let user = Uuid::new_v4();

        let (draft, message) = sw.save_song(user, "Nachtzug", "Zeile 1\nZeile 2").await.unwrap();
        assert_eq!(draft.title, "Nachtzug");
        assert_eq!(message.kind, StatusKind::Success);
        assert_eq!(db::drafts::list_drafts(&sw.db, user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_random_idea_takes_first_line() {
        let sw = songwriter(FixedGenerator::new("\nErste Idee\nZweite Idee\n")).await;
        assert_eq!(sw.random_idea().await.unwrap(), "Erste Idee");
    }

    #[tokio::test]
    async fn test_tools_check_error_marker() {
        let sw = songwriter(FixedGenerator::new(&error_reply("Netzwerkfehler: timeout"))).await;

        assert!(matches!(
            sw.find_rhymes("Herz").await,
            Err(SongwriterError::GenerationFailed(_))
        ));
        assert!(matches!(
            sw.run_creative_tool(CreativeTool::LineVariations, "Zeile").await,
            Err(SongwriterError::GenerationFailed(_))
        ));
        assert!(matches!(
            sw.random_idea().await,
            Err(SongwriterError::GenerationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_creative_tool_parses_numbered_items() {
        let sw = songwriter(FixedGenerator::new("Gern:\n1. Erste\n2. Zweite")).await;
        let items = sw
            .run_creative_tool(CreativeTool::MetaphorGenerator, "Liebe")
            .await
            .unwrap();
        assert_eq!(items, vec!["Erste", "Zweite"]);
    }
}
