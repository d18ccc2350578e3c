pub mod check;
pub mod info;
pub mod kill;
pub mod list;
pub mod suggest;
pub mod watch;

#[cfg(test)]
pub(crate) mod testing;

pub use check::CheckCommand;
pub use info::InfoCommand;
pub use kill::{AssumeYes, Confirmation, KillCommand, TerminalConfirmation};
pub use list::ListCommand;
pub use suggest::{SuggestCommand, DEFAULT_SUGGESTION_COUNT};
pub use watch::{WatchCommand, DEFAULT_WATCH_INTERVAL};
