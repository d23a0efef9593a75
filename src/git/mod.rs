pub mod history;
pub mod repository;
#[cfg(test)]
pub(crate) mod testutil;
pub mod types;

pub use history::eligible_commits;
pub use repository::{discover_clones, CloneDir};
