use std::path::{Path, PathBuf};

use crate::pipeline::{GenerationError, RunnerResult};

/// Default generator script location relative to the executable directory.
pub const DEFAULT_SCRIPT_RELATIVE: &str = "python/ltx_video_generator.py";

/// Default script path: `<exe dir>/python/ltx_video_generator.py`.
pub fn default_script_path() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(DEFAULT_SCRIPT_RELATIVE)
}

/// Check that the script and its directory exist.
///
/// Returns the absolute script path; the generator runs from the script
/// directory, so a relative path would no longer resolve there.
pub fn resolve_script(script: &Path) -> RunnerResult<PathBuf> {
    let script = std::path::absolute(script)
        .map_err(|e| GenerationError::io("resolving script path", e))?;
    let dir = match script.parent() {
        Some(dir) => dir.to_path_buf(),
        None => return Err(GenerationError::ScriptNotFound(script)),
    };
    if !dir.is_dir() {
        return Err(GenerationError::DirectoryNotFound(dir));
    }
    if !script.is_file() {
        return Err(GenerationError::ScriptNotFound(script));
    }
    Ok(script)
}
