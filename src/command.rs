//! Admin command text and the boundary to the remote server.
//!
//! Building command text is local; sending it is delegated to a
//! [`CommandSubmitter`], which owns the session protocol.

use crate::error::SubmitError;
use std::fmt;

/// What the server said about a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Server status code; zero means success.
    pub code: i32,
    /// Human-readable result.
    pub message: String,
}

/// Sends one command to the remote server on behalf of a player.
pub trait CommandSubmitter {
    /// Submit `command` targeting `target_uid` and wait for the answer.
    fn submit(&self, command: &str, target_uid: &str) -> Result<CommandResponse, SubmitError>;
}

/// Submitter used when no session client is linked in.
#[derive(Debug, Clone)]
pub struct OfflineSubmitter {
    dispatch_url: String,
}

impl OfflineSubmitter {
    /// Create a submitter that reports `dispatch_url` as unreachable.
    pub fn new(dispatch_url: impl Into<String>) -> Self {
        Self {
            dispatch_url: dispatch_url.into(),
        }
    }
}

impl CommandSubmitter for OfflineSubmitter {
    fn submit(&self, command: &str, target_uid: &str) -> Result<CommandResponse, SubmitError> {
        tracing::warn!(command, target_uid, "no session client, command not sent");
        Err(SubmitError::Offline(self.dispatch_url.clone()))
    }
}

/// `give <item> x<count>`
pub fn give_command(item_id: &str, count: u32) -> String {
    format!("give {item_id} x{count}")
}

/// Relic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RelicKind {
    /// Cavern relic.
    Tunnel = 1,
    /// Planar ornament.
    Plane = 3,
}

/// A relic with explicit stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relic {
    /// Relic family.
    pub kind: RelicKind,
    /// Star rank; the quality digit is one higher.
    pub star_rank: u8,
    /// Two-digit set id, e.g. `"01"`.
    pub relic_id: String,
    /// Slot: 1-4 for tunnel relics, 5-6 for planar ornaments.
    pub part_id: u8,
    /// Main stat id.
    pub main_tag: String,
    /// Sub stats, if any.
    pub sub_tag: Option<String>,
    /// Enhancement level, e.g. `"l0"`.
    pub level: String,
}

impl Relic {
    /// Create a level-0 relic without sub stats.
    pub fn new(
        kind: RelicKind,
        star_rank: u8,
        relic_id: impl Into<String>,
        part_id: u8,
        main_tag: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            star_rank,
            relic_id: relic_id.into(),
            part_id,
            main_tag: main_tag.into(),
            sub_tag: None,
            level: "l0".to_string(),
        }
    }

    /// Set the sub stats.
    #[must_use]
    pub fn with_sub_tag(mut self, sub_tag: impl Into<String>) -> Self {
        self.sub_tag = Some(sub_tag.into());
        self
    }

    /// Set the enhancement level.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Full item id: quality digit, family code, set id, slot.
    pub fn item_id(&self) -> String {
        format!(
            "{}{}{}{}",
            u16::from(self.star_rank) + 1,
            self.kind as u8,
            self.relic_id,
            self.part_id
        )
    }

    /// `relic <id> <main>[ <sub>] <level> x<count>`
    pub fn command(&self, count: u32) -> String {
        let sub = self
            .sub_tag
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!(" {s}"))
            .unwrap_or_default();
        format!(
            "relic {} {}{sub} {} x{count}",
            self.item_id(),
            self.main_tag,
            self.level
        )
    }
}

impl fmt::Display for Relic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.item_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_give_command() {
        assert_eq!(give_command("1001", 5), "give 1001 x5");
    }

    #[test]
    fn test_relic_item_id() {
        let relic = Relic::new(RelicKind::Tunnel, 5, "01", 3, "4");
        assert_eq!(relic.item_id(), "61013");

        let ornament = Relic::new(RelicKind::Plane, 4, "12", 6, "2");
        assert_eq!(ornament.to_string(), "53126");
    }

    #[test]
    fn test_relic_command() {
        let relic = Relic::new(RelicKind::Tunnel, 5, "01", 1, "1");
        assert_eq!(relic.command(1), "relic 61011 1 l0 x1");

        let relic = relic.with_sub_tag("5:2 7:1").with_level("l15");
        assert_eq!(relic.command(2), "relic 61011 1 5:2 7:1 l15 x2");
    }

    #[test]
    fn test_offline_submitter() {
        let err = OfflineSubmitter::new("http://127.0.0.1:443")
            .submit("give 1 x1", "10001")
            .unwrap_err();
        assert_eq!(err.to_string(), "No session client for http://127.0.0.1:443");
    }
}
