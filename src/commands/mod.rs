// Kind listing and schema output
pub mod resources;

// Lifecycle operations against plan/state files
pub mod lifecycle;
