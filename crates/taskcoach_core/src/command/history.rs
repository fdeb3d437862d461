//! Undoable command contract and the undo/redo history.
//!
//! # Responsibility
//! - Define the `Command` trait every undoable operation implements.
//! - Keep the history (done) and future (undone) stacks.
//!
//! # Invariants
//! - A command enters the history only if `can_do()` held when executed.
//! - Executing a command clears the future stack.
//! - `undo` moves exactly one command from history to future; `redo` moves
//!   it back.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub type CommandResult<T> = Result<T, CommandError>;

/// Error for history operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// `can_do()` returned false; nothing was changed.
    Rejected { name: String },
    NothingToUndo,
    NothingToRedo,
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { name } => write!(f, "command `{name}` cannot be executed"),
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
        }
    }
}

impl Error for CommandError {}

/// One undoable user operation.
///
/// Each of `do_command`, `undo_command` and `redo_command` sends its changes
/// as a single coalesced event.
pub trait Command {
    /// Short label for menus, e.g. "Delete".
    fn name(&self) -> &str;

    fn can_do(&self) -> bool {
        true
    }

    fn do_command(&mut self);

    fn undo_command(&mut self);

    fn redo_command(&mut self) {
        self.do_command();
    }
}

/// Stack of executed commands plus the stack of undone ones.
#[derive(Default)]
pub struct CommandHistory {
    history: Vec<Box<dyn Command>>,
    future: Vec<Box<dyn Command>>,
}

impl Debug for CommandHistory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("history", &self.history.len())
            .field("future", &self.future.len())
            .finish()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `command` and records it for undo.
    ///
    /// # Errors
    /// - `CommandError::Rejected` when `can_do()` is false; the history is
    ///   left untouched.
    pub fn execute(&mut self, command: impl Command + 'static) -> CommandResult<()> {
        self.execute_boxed(Box::new(command))
    }

    pub fn execute_boxed(&mut self, mut command: Box<dyn Command>) -> CommandResult<()> {
        if !command.can_do() {
            warn!(
                "event=command_do module=command status=rejected name={}",
                command.name()
            );
            return Err(CommandError::Rejected {
                name: command.name().to_string(),
            });
        }
        command.do_command();
        info!(
            "event=command_do module=command status=ok name={} depth={}",
            command.name(),
            self.history.len() + 1
        );
        self.history.push(command);
        self.future.clear();
        Ok(())
    }

    pub fn undo(&mut self) -> CommandResult<()> {
        let mut command = self.history.pop().ok_or(CommandError::NothingToUndo)?;
        command.undo_command();
        info!(
            "event=command_undo module=command status=ok name={}",
            command.name()
        );
        self.future.push(command);
        Ok(())
    }

    pub fn redo(&mut self) -> CommandResult<()> {
        let mut command = self.future.pop().ok_or(CommandError::NothingToRedo)?;
        command.redo_command();
        info!(
            "event=command_redo module=command status=ok name={}",
            command.name()
        );
        self.history.push(command);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_name(&self) -> Option<&str> {
        self.history.last().map(|command| command.name())
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.future.last().map(|command| command.name())
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandError, CommandHistory};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recording {
        log: Rc<RefCell<Vec<&'static str>>>,
        allowed: bool,
    }

    impl Command for Recording {
        fn name(&self) -> &str {
            "Record"
        }

        fn can_do(&self) -> bool {
            self.allowed
        }

        fn do_command(&mut self) {
            self.log.borrow_mut().push("do");
        }

        fn undo_command(&mut self) {
            self.log.borrow_mut().push("undo");
        }
    }

    #[test]
    fn undo_and_redo_move_between_stacks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut history = CommandHistory::new();
        history
            .execute(Recording {
                log: Rc::clone(&log),
                allowed: true,
            })
            .expect("execute");

        assert_eq!(history.undo_name(), Some("Record"));
        history.undo().expect("undo");
        assert!(!history.can_undo());
        assert_eq!(history.redo_name(), Some("Record"));
        history.redo().expect("redo");

        assert_eq!(*log.borrow(), vec!["do", "undo", "do"]);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn rejected_command_leaves_history_untouched() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut history = CommandHistory::new();
        let result = history.execute(Recording {
            log: Rc::clone(&log),
            allowed: false,
        });

        assert_eq!(
            result,
            Err(CommandError::Rejected {
                name: "Record".to_string()
            })
        );
        assert!(log.borrow().is_empty());
        assert!(!history.can_undo());
    }

    #[test]
    fn executing_clears_future() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut history = CommandHistory::new();
        for _ in 0..2 {
            history
                .execute(Recording {
                    log: Rc::clone(&log),
                    allowed: true,
                })
                .expect("execute");
        }
        history.undo().expect("undo");
        assert!(history.can_redo());
        history
            .execute(Recording {
                log: Rc::clone(&log),
                allowed: true,
            })
            .expect("execute");
        assert!(!history.can_redo());
        assert_eq!(history.redo(), Err(CommandError::NothingToRedo));
    }

    #[test]
    fn empty_history_reports_nothing_to_undo() {
        let mut history = CommandHistory::new();
        assert_eq!(history.undo(), Err(CommandError::NothingToUndo));
        assert_eq!(history.undo_name(), None);
    }
}
