//! Timed auto-scroll over the lines of a draft
//!
//! Position is measured in display units, [`LINE_HEIGHT_UNITS`] per line.
//! While scrolling, every frame at [`FRAMES_PER_SECOND`] advances the
//! position by `(speed / 100) * 1.5` units. Reaching the last line stops
//! scrolling.

use serde::Serialize;
use songsmith_common::db::Draft;
use std::time::Duration;
use uuid::Uuid;

/// Display units per text line
pub const LINE_HEIGHT_UNITS: f64 = 48.0;

pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Units per frame at speed 100
const UNITS_PER_FRAME_AT_FULL_SPEED: f64 = 1.5;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 100;
pub const DEFAULT_SPEED: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleprompterStatus {
    Idle,
    Scrolling,
    Paused,
    Finished,
}

/// What a display shows at one moment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeleprompterFrame {
    pub line_index: usize,
    pub line: String,
    /// 0.0 at the top, 1.0 at the last line
    pub progress: f64,
    pub status: TeleprompterStatus,
}

#[derive(Debug, Clone)]
pub struct Teleprompter {
    draft_id: Option<Uuid>,
    lines: Vec<String>,
    speed: u8,
    offset: f64,
    status: TeleprompterStatus,
}

impl Default for Teleprompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Teleprompter {
    pub fn new() -> Self {
        Self {
            draft_id: None,
            lines: Vec::new(),
            speed: DEFAULT_SPEED,
            offset: 0.0,
            status: TeleprompterStatus::Idle,
        }
    }

    /// Select a draft; a different draft resets position and status
    pub fn load(&mut self, draft: &Draft) {
        if self.draft_id == Some(draft.id) {
            return;
        }
        self.draft_id = Some(draft.id);
        self.lines = draft.content.lines().map(str::to_string).collect();
        self.reset();
    }

    pub fn has_content(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty())
    }

    /// Back to the first line, not scrolling
    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.status = TeleprompterStatus::Idle;
    }

    /// Start scrolling
    ///
    /// No-op without content or while already scrolling. Playing a finished
    /// teleprompter starts over from the top. Returns whether it is scrolling.
    pub fn play(&mut self) -> bool {
        match self.status {
            _ if !self.has_content() => false,
            TeleprompterStatus::Scrolling => true,
            TeleprompterStatus::Finished => {
                self.offset = 0.0;
                self.status = TeleprompterStatus::Scrolling;
                true
            }
            TeleprompterStatus::Idle | TeleprompterStatus::Paused => {
                self.status = TeleprompterStatus::Scrolling;
                true
            }
        }
    }

    pub fn pause(&mut self) {
        if self.status == TeleprompterStatus::Scrolling {
            self.status = TeleprompterStatus::Paused;
        }
    }

    /// Set speed, clamped to `1..=100`
    pub fn set_speed(&mut self, speed: i64) {
        self.speed = speed.clamp(MIN_SPEED as i64, MAX_SPEED as i64) as u8;
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn status(&self) -> TeleprompterStatus {
        self.status
    }

    fn max_offset(&self) -> f64 {
        self.lines.len().saturating_sub(1) as f64 * LINE_HEIGHT_UNITS
    }

    fn units_per_frame(&self) -> f64 {
        (self.speed as f64 / 100.0) * UNITS_PER_FRAME_AT_FULL_SPEED
    }

    /// Advance by the frames that fit into `elapsed`
    pub fn tick(&mut self, elapsed: Duration) -> TeleprompterStatus {
        if self.status != TeleprompterStatus::Scrolling {
            return self.status;
        }

        let frames = elapsed.as_secs_f64() * FRAMES_PER_SECOND;
        self.offset += frames * self.units_per_frame();

        let max = self.max_offset();
        if self.offset >= max {
            self.offset = max;
            self.status = TeleprompterStatus::Finished;
        }
        self.status
    }

    pub fn line_index(&self) -> usize {
        let index = (self.offset / LINE_HEIGHT_UNITS).floor() as usize;
        index.min(self.lines.len().saturating_sub(1))
    }

    pub fn frame(&self) -> TeleprompterFrame {
        let max = self.max_offset();
        let progress = if max > 0.0 { self.offset / max } else { 1.0 };
        let line_index = self.line_index();

        TeleprompterFrame {
            line_index,
            line: self.lines.get(line_index).cloned().unwrap_or_default(),
            progress,
            status: self.status,
        }
    }

    /// Time needed to scroll from the top to the last line
    pub fn full_scroll_duration(&self) -> Duration {
        let frames = self.max_offset() / self.units_per_frame();
        Duration::from_secs_f64(frames / FRAMES_PER_SECOND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn draft(content: &str) -> Draft {
        Draft {
            id: Uuid::new_v4(),
            title: "Probe".to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    fn loaded(content: &str) -> Teleprompter {
        let mut t = Teleprompter::new();
        t.load(&draft(content));
        t
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut t = Teleprompter::new();
        assert_eq!(t.speed(), DEFAULT_SPEED);

        t.set_speed(0);
        assert_eq!(t.speed(), 1);
        t.set_speed(-20);
        assert_eq!(t.speed(), 1);
        t.set_speed(250);
        assert_eq!(t.speed(), 100);
        t.set_speed(42);
        assert_eq!(t.speed(), 42);
    }

    #[test]
    fn test_play_without_content_is_noop() {
        let mut t = loaded("  \n\n ");
        assert!(!t.play());
        assert_eq!(t.status(), TeleprompterStatus::Idle);

        let mut empty = Teleprompter::new();
        assert!(!empty.play());
    }

    #[test]
    fn test_one_second_at_full_speed_advances_ninety_units() {
        let mut t = loaded("a\nb\nc\nd\ne");
        t.set_speed(100);
        t.play();
        t.tick(Duration::from_secs(1));

        // 60 frames * 1.5 units
        assert_eq!(t.line_index(), 1);
        assert!((t.frame().progress - 90.0 / (4.0 * LINE_HEIGHT_UNITS)).abs() < 1e-9);
    }

    #[test]
    fn test_stops_at_last_line() {
        let mut t = loaded("eins\nzwei\ndrei");
        t.set_speed(100);
        t.play();

        assert_eq!(t.tick(Duration::from_secs(60)), TeleprompterStatus::Finished);
        let frame = t.frame();
        assert_eq!(frame.line_index, 2);
        assert_eq!(frame.line, "drei");
        assert_eq!(frame.progress, 1.0);

        // Further ticks do not move past the end
        t.tick(Duration::from_secs(5));
        assert_eq!(t.line_index(), 2);
    }

    #[test]
    fn test_pause_freezes_position() {
        let mut t = loaded("a\nb\nc");
        t.play();
        t.tick(Duration::from_millis(500));
        let before = t.frame().progress;

        t.pause();
        assert_eq!(t.status(), TeleprompterStatus::Paused);
        t.tick(Duration::from_secs(10));
        assert_eq!(t.frame().progress, before);

        assert!(t.play());
        t.tick(Duration::from_millis(100));
        assert!(t.frame().progress > before);
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut t = loaded("a\nb\nc");
        t.set_speed(100);
        t.play();
        t.tick(Duration::from_secs(60));

        t.reset();
        assert_eq!(t.status(), TeleprompterStatus::Idle);
        assert_eq!(t.line_index(), 0);
        assert_eq!(t.frame().progress, 0.0);
    }

    #[test]
    fn test_selecting_other_draft_resets() {
        let mut t = loaded("a\nb\nc");
        t.play();
        t.tick(Duration::from_secs(3));

        t.load(&draft("x\ny"));
        assert_eq!(t.status(), TeleprompterStatus::Idle);
        assert_eq!(t.frame().line, "x");
    }

    #[test]
    fn test_reloading_same_draft_keeps_position() {
        let d = draft("a\nb\nc");
        let mut t = Teleprompter::new();
        t.load(&d);
        t.play();
        t.tick(Duration::from_secs(2));
        let before = t.frame();

        t.load(&d);
        assert_eq!(t.frame(), before);
    }

    #[test]
    fn test_play_after_finish_starts_over() {
        let mut t = loaded("a\nb");
        t.set_speed(100);
        t.play();
        t.tick(Duration::from_secs(60));
        assert_eq!(t.status(), TeleprompterStatus::Finished);

        assert!(t.play());
        assert_eq!(t.line_index(), 0);
    }

    #[test]
    fn test_single_line_finishes_on_first_tick() {
        let mut t = loaded("nur eine Zeile");
        t.play();
        assert_eq!(t.tick(Duration::from_millis(16)), TeleprompterStatus::Finished);
        assert_eq!(t.frame().progress, 1.0);
    }

    #[test]
    fn test_full_scroll_duration() {
        let mut t = loaded("a\nb\nc");
        t.set_speed(100);
        // 96 units / 1.5 per frame = 64 frames
        let expected = Duration::from_secs_f64(64.0 / 60.0);
        assert!((t.full_scroll_duration().as_secs_f64() - expected.as_secs_f64()).abs() < 1e-9);
    }
}
