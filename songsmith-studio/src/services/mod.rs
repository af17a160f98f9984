//! Business logic services

pub mod generation_client;
pub mod prompt;
pub mod response_parser;
pub mod songwriter;
pub mod teleprompter;
pub mod thesaurus_client;

pub use generation_client::{GenerationClient, GenerationConfig, GenerationError, SharedApiKey, TextGenerator};
pub use songwriter::{GenerationOutcome, Songwriter, SongwriterError, StatusKind, StatusMessage};
pub use teleprompter::{Teleprompter, TeleprompterFrame, TeleprompterStatus};
pub use thesaurus_client::{ThesaurusClient, ThesaurusError};
