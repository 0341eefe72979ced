//! Domain models for cognit
//!
//! Pure domain objects: content units, install requests, targets and results.

pub mod cognitive;
pub mod target;

pub use cognitive::{CognitiveType, InstallRequest, LocalCognitive, RemoteCognitive};
pub use target::{InstallMode, InstallOptions, InstallResult, InstallScope, InstallTarget};
