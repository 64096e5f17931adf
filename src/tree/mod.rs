//! Loading, editing and saving one scope's family tree.

mod context;
mod layout;
mod loader;
mod mutations;
#[cfg(test)]
pub(crate) mod test_support;

pub use context::TreeContext;
pub use layout::{SaveReport, save_layout};
pub use loader::{LoadedTree, load_tree, refresh_status};
pub use mutations::{add_member, add_relationship, candidate_profiles, record_member};
