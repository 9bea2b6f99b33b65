//! Git operations: workspace discovery, change collection, and committing.

pub mod collect;
pub mod commit;
pub mod executor;
pub mod workspace;

pub use collect::{ChangeSet, DiffScope, collect_changes};
pub use commit::{commit_args, commit_changes};
pub use executor::{GitExecutor, GitOutput, SystemGit};
pub use workspace::Workspace;
