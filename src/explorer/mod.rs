//! Remote filesystem browsing over an agent session

pub mod decoder;
mod dispatcher;
pub mod error;
mod navigator;
pub mod path;
pub mod transport;
pub mod types;

pub use dispatcher::CommandDispatcher;
pub use error::ExplorerError;
pub use navigator::NavigationController;
pub use transport::{HttpOptions, HttpTransport};
pub use types::{ApplyOutcome, DirectoryListing, FileEntry, NavStatus, NavTicket};
