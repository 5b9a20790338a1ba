/// Password restore
///
/// One-time restore codes, the session table that holds them, the sweeper
/// that expires them, and the orchestrator that drives both restore paths.

mod code;
mod orchestrator;
mod session_table;
mod sweeper;

pub use code::generate_restore_code;
pub use orchestrator::{RestoreOrchestrator, RestoreOutcome, RestoreRequest, RESTORE_MAIL_SUBJECT};
pub use session_table::{RestoreRecord, RestoreSessionTable};
pub use sweeper::{SessionSweeper, SweeperHandle};
