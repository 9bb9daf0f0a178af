//! CLI Commands

pub mod eval;
pub mod games;
pub mod init;
pub mod memory;
pub mod play;
pub mod watch;

pub use eval::EvalCommand;
pub use games::GamesCommand;
pub use init::InitCommand;
pub use memory::MemoryCommand;
pub use play::PlayCommand;
pub use watch::WatchCommand;
