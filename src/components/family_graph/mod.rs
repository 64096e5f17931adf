mod builder;
mod component;
mod render;
mod state;
mod types;

pub use builder::{build_graph, link_for, node_for};
pub use component::{FamilyGraphCanvas, GraphHandle};
pub use state::LayoutPhase;
pub use types::GraphData;
