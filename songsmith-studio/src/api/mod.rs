//! HTTP API handlers for songsmith-studio

pub mod drafts;
pub mod extract;
pub mod generator;
pub mod health;
pub mod lines;
pub mod references;
pub mod session;
pub mod settings;
pub mod sse;
pub mod teleprompter;
pub mod tools;

pub use drafts::draft_routes;
pub use generator::generator_routes;
pub use health::health_routes;
pub use lines::line_routes;
pub use references::reference_routes;
pub use session::session_routes;
pub use settings::settings_routes;
pub use sse::{event_stream, user_event_stream};
pub use teleprompter::teleprompter_routes;
pub use tools::tool_routes;
