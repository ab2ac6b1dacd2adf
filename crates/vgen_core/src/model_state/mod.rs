//! Model state: which model artifact is loaded and where it lives.
//!
//! A model is either a single weights file or a directory. Directories are
//! expected to carry a `model_index.json` manifest; a missing manifest only
//! produces a warning since partial checkouts can still be usable.
//!
//! # Example
//!
//! ```no_run
//! use vgen_core::model_state::{ModelManager, ModelProvider};
//!
//! let models = ModelManager::new();
//! if models.load("/models/LTX-Video".as_ref()) {
//!     println!("Using {}", models.model_path().unwrap().display());
//! }
//! ```

mod errors;
mod manager;

pub use errors::{ModelError, ModelResult};
pub use manager::{ModelManager, ModelProvider, MODEL_MANIFEST};
