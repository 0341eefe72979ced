//! Configuration handling for cognit
//!
//! Settings live in `config.yaml` under the global store root. Environment
//! overrides (`COGNIT_CACHE_DIR`, `COGNIT_TMPDIR`) are read by the modules
//! they affect through an injected [`EnvReader`](crate::env::EnvReader).

pub mod settings;

pub use settings::{RetrySettings, SETTINGS_FILE, Settings};
