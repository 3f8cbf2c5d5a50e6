mod component;
mod render;
mod simulation;
mod state;
mod types;

pub use component::NeuralGraph;
pub use types::DocumentSummary;
