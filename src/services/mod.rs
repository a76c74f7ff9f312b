pub mod import;
pub mod remote;
pub mod state;
pub mod synthesizer;
pub mod terms;
