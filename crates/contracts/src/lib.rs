//! Access to the compiled contract artifacts a deployment is built from.
pub mod artifacts;

pub use artifacts::{ArgumentError, Artifact, ArtifactError, Artifacts};
