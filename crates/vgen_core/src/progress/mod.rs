//! Line-oriented progress protocol spoken by the generation script.
//!
//! The script's stdout mixes free-form log text with progress markers.
//! Recognized shapes, checked in this order (first match wins):
//!
//! 1. `PROGRESS: Step <n> of <m>` - explicit step counter
//! 2. `STATUS: <text>` - phase text, mapped to an estimated step
//! 3. `... Step <n> of <m> ...` - older scripts, anywhere in the line
//! 4. lines containing `Generating video`, `Loading model` or `Saving video`
//!
//! Anything else is log-only and produces no event.
//!
//! # Example
//!
//! ```
//! use vgen_core::progress::{parse_line, ProgressParser};
//!
//! let event = parse_line("PROGRESS: Step 12 of 50", 50).unwrap();
//! assert_eq!((event.current_step, event.total_steps), (12, 50));
//!
//! let mut parser = ProgressParser::new(50);
//! parser.parse_line("STATUS: Loading model...");
//! let event = parser.parse_line("PROGRESS: Step 1 of 53").unwrap();
//! assert_eq!(event.message, "Loading model...");
//! ```

mod channel;
mod heuristic;
mod parser;

pub use channel::{channel, ProgressReceiver};
pub use heuristic::{estimate_from_status, PHASE_SLOTS};
pub use parser::{
    classify_line, parse_line, ProgressParser, ProtocolLine, DEFAULT_STATUS, PROGRESS_PREFIX,
    STATUS_PREFIX,
};
