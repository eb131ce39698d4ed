pub mod cli;
pub mod command;
pub mod comparison;
pub mod config;
pub mod continuous;
pub mod geometry;
pub mod host;
pub mod sim;
pub mod sync_once;
pub mod view;
pub mod view_box;

pub use command::{CommandOutcome, SyncCommand, ViewSyncApp};
pub use continuous::{ContinuousSync, SyncSession, TickOutcome};
pub use host::{HostError, ViewHost};
pub use view::{ViewId, ViewKind};
pub use view_box::ViewBox;
