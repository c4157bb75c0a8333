//! Runs quarry files: reads sources, resolves imports and executes statements in a [Session].

mod fs;
mod options;
pub mod paths;
mod render_reports;
mod result;
mod session;

pub use fs::*;
pub use options::*;
pub use render_reports::*;
pub use result::*;
pub use session::Session;
