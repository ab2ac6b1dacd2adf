//! External generator process runner.
//!
//! A run goes through these stages:
//!
//! ```text
//! resolve script ─► write request file ─► spawn ─┬─ stdout ─► ProgressParser ─► listener
//!                                               └─ stderr ─► buffer
//!                 wait for exit or cancellation ─► kill (if cancelled) ─► remove request file
//! ```

mod config;
mod python;
mod request;
mod request_file;
mod script;

pub use config::{OutputMirror, RunnerConfig};
pub use python::{ProcessRunner, PythonRunner};
pub use request::{GenerationMode, ProcessRequest};
pub use request_file::RequestFile;
pub use script::{default_script_path, resolve_script, DEFAULT_SCRIPT_RELATIVE};
