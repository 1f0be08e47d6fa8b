//! Interactive main menu.

use crate::actor::{Console, MessageKind};
use crate::command::{give_command, CommandSubmitter};

/// Menu line shown before every choice.
pub const MENU_TEXT: &str = "a. give item  b. server status  c. player info  d. quit";

/// The console as seen by the menu: print something, read a line.
pub trait ConsoleIo {
    /// Queue a message for display.
    fn publish(&self, content: String, kind: MessageKind);

    /// Block for the next line; `None` once input is closed.
    fn read_line(&self) -> Option<String>;
}

impl ConsoleIo for Console {
    fn publish(&self, content: String, kind: MessageKind) {
        Self::publish(self, content, kind);
    }

    fn read_line(&self) -> Option<String> {
        Self::read_line(self)
    }
}

/// A parsed menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// `a`
    GiveItem,
    /// `b`
    ServerStatus,
    /// `c`
    PlayerInfo,
    /// `d`
    Quit,
    /// Anything else, including an empty line.
    Invalid,
}

impl MenuChoice {
    /// Parse the first character of a line, ignoring case.
    pub fn parse(line: &str) -> Self {
        match line.trim_start().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('a') => Self::GiveItem,
            Some('b') => Self::ServerStatus,
            Some('c') => Self::PlayerInfo,
            Some('d') => Self::Quit,
            _ => Self::Invalid,
        }
    }
}

/// Whether the menu loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Run the menu until the user quits or input closes.
pub fn run_menu(io: &dyn ConsoleIo, submitter: &dyn CommandSubmitter, player_uid: &str) {
    loop {
        io.publish(MENU_TEXT.to_string(), MessageKind::Command);
        let Some(line) = io.read_line() else {
            break;
        };

        let flow = match MenuChoice::parse(&line) {
            MenuChoice::GiveItem => give_item(io, submitter, player_uid),
            MenuChoice::ServerStatus | MenuChoice::PlayerInfo => {
                io.publish("feature not available yet".to_string(), MessageKind::Warning);
                Flow::Continue
            }
            MenuChoice::Quit => Flow::Exit,
            MenuChoice::Invalid => {
                io.publish("please enter a valid option".to_string(), MessageKind::Warning);
                Flow::Continue
            }
        };
        if flow == Flow::Exit {
            break;
        }
    }
    tracing::debug!("menu loop finished");
}

fn prompt(io: &dyn ConsoleIo, question: &str) -> Option<String> {
    io.publish(question.to_string(), MessageKind::Info);
    io.read_line().map(|line| line.trim().to_string())
}

fn give_item(io: &dyn ConsoleIo, submitter: &dyn CommandSubmitter, player_uid: &str) -> Flow {
    let Some(item_id) = prompt(io, "item id:") else {
        return Flow::Exit;
    };
    if item_id.is_empty() {
        io.publish("item id cannot be empty".to_string(), MessageKind::Warning);
        return Flow::Continue;
    }

    let Some(count) = prompt(io, "count:") else {
        return Flow::Exit;
    };
    let count = match count.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            io.publish(
                format!("count must be a positive number, got {count:?}"),
                MessageKind::Warning,
            );
            return Flow::Continue;
        }
    };

    let command = give_command(&item_id, count);
    io.publish(command.clone(), MessageKind::Command);

    match submitter.submit(&command, player_uid) {
        Ok(response) if response.code == 0 => {
            io.publish(response.message, MessageKind::Success);
        }
        Ok(response) => {
            io.publish(
                format!("server returned {}: {}", response.code, response.message),
                MessageKind::Error,
            );
        }
        Err(e) => io.publish(e.to_string(), MessageKind::Error),
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandResponse;
    use crate::error::SubmitError;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedIo {
        lines: RefCell<VecDeque<String>>,
        published: RefCell<Vec<(String, MessageKind)>>,
    }

    impl ScriptedIo {
        fn with_lines(lines: &[&str]) -> Self {
            let io = Self::default();
            io.lines
                .borrow_mut()
                .extend(lines.iter().map(ToString::to_string));
            io
        }

        fn kinds_of(&self, kind: MessageKind) -> Vec<String> {
            self.published
                .borrow()
                .iter()
                .filter(|(_, k)| *k == kind)
                .map(|(c, _)| c.clone())
                .collect()
        }
    }

    impl ConsoleIo for ScriptedIo {
        fn publish(&self, content: String, kind: MessageKind) {
            self.published.borrow_mut().push((content, kind));
        }

        fn read_line(&self) -> Option<String> {
            self.lines.borrow_mut().pop_front()
        }
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        sent: RefCell<Vec<(String, String)>>,
        code: i32,
    }

    impl CommandSubmitter for RecordingSubmitter {
        fn submit(&self, command: &str, target_uid: &str) -> Result<CommandResponse, SubmitError> {
            self.sent
                .borrow_mut()
                .push((command.to_string(), target_uid.to_string()));
            Ok(CommandResponse {
                code: self.code,
                message: "done".to_string(),
            })
        }
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(MenuChoice::parse("a"), MenuChoice::GiveItem);
        assert_eq!(MenuChoice::parse("B"), MenuChoice::ServerStatus);
        assert_eq!(MenuChoice::parse(" c please"), MenuChoice::PlayerInfo);
        assert_eq!(MenuChoice::parse("D"), MenuChoice::Quit);
        assert_eq!(MenuChoice::parse(""), MenuChoice::Invalid);
        assert_eq!(MenuChoice::parse("z"), MenuChoice::Invalid);
    }

    #[test]
    fn test_give_item_submits() {
        let io = ScriptedIo::with_lines(&["a", "1001", "5", "d"]);
        let submitter = RecordingSubmitter::default();
        run_menu(&io, &submitter, "10001");

        assert_eq!(
            *submitter.sent.borrow(),
            vec![("give 1001 x5".to_string(), "10001".to_string())]
        );
        assert!(io.kinds_of(MessageKind::Command).contains(&"give 1001 x5".to_string()));
        assert_eq!(io.kinds_of(MessageKind::Success), vec!["done".to_string()]);
    }

    #[test]
    fn test_rejected_command_is_error() {
        let io = ScriptedIo::with_lines(&["a", "1001", "1", "d"]);
        let submitter = RecordingSubmitter {
            code: 3,
            ..RecordingSubmitter::default()
        };
        run_menu(&io, &submitter, "10001");

        assert_eq!(io.kinds_of(MessageKind::Error), vec!["server returned 3: done".to_string()]);
    }

    #[test]
    fn test_bad_count_is_warning() {
        let io = ScriptedIo::with_lines(&["a", "1001", "lots", "d"]);
        let submitter = RecordingSubmitter::default();
        run_menu(&io, &submitter, "10001");

        assert!(submitter.sent.borrow().is_empty());
        assert_eq!(io.kinds_of(MessageKind::Warning).len(), 1);
    }

    #[test]
    fn test_unavailable_and_invalid_choices() {
        let io = ScriptedIo::with_lines(&["b", "c", "", "x", "d"]);
        run_menu(&io, &RecordingSubmitter::default(), "10001");

        let warnings = io.kinds_of(MessageKind::Warning);
        assert_eq!(
            warnings,
            vec![
                "feature not available yet",
                "feature not available yet",
                "please enter a valid option",
                "please enter a valid option",
            ]
        );
        // Menu shown before each of the five choices.
        assert_eq!(io.kinds_of(MessageKind::Command).len(), 5);
    }

    #[test]
    fn test_closed_input_ends_loop() {
        let io = ScriptedIo::with_lines(&["a", "1001"]);
        run_menu(&io, &RecordingSubmitter::default(), "10001");
        assert_eq!(io.kinds_of(MessageKind::Info), vec!["item id:", "count:"]);
    }

    struct UnreachableSubmitter;

    impl CommandSubmitter for UnreachableSubmitter {
        fn submit(&self, _command: &str, _target_uid: &str) -> Result<CommandResponse, SubmitError> {
            Err(SubmitError::Transport("connection reset".to_string()))
        }
    }

    #[test]
    fn test_transport_failure_reports_error_and_continues() {
        let io = ScriptedIo::with_lines(&["a", "1001", "2", "b", "d"]);
        run_menu(&io, &UnreachableSubmitter, "10001");

        assert_eq!(
            io.kinds_of(MessageKind::Error),
            vec!["Transport error: connection reset".to_string()]
        );
        assert_eq!(io.kinds_of(MessageKind::Warning), vec!["feature not available yet"]);
    }

    #[test]
    fn test_offline_submit_reports_error() {
        let io = ScriptedIo::with_lines(&["a", "1001", "2", "d"]);
        let submitter = crate::command::OfflineSubmitter::new("http://srv");
        run_menu(&io, &submitter, "10001");
        assert_eq!(
            io.kinds_of(MessageKind::Error),
            vec!["No session client for http://srv".to_string()]
        );
    }
}
