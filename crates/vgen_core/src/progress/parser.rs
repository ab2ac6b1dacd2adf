//! Progress line decoding.

use crate::models::ProgressEvent;

use super::heuristic::estimate_from_status;

/// Prefix of explicit step lines (`PROGRESS: Step 3 of 53`).
pub const PROGRESS_PREFIX: &str = "PROGRESS:";
/// Prefix of phase status lines (`STATUS: Loading model...`).
pub const STATUS_PREFIX: &str = "STATUS:";
/// Message used for explicit steps before any status has been seen.
pub const DEFAULT_STATUS: &str = "Processing...";

const LEGACY_KEYWORDS: [&str; 3] = ["Generating video", "Loading model", "Saving video"];

/// A recognized line shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolLine {
    /// `PROGRESS: Step n of m`.
    Progress { current: u32, total: u32 },
    /// `STATUS: text`, with the trimmed text.
    Status(String),
    /// Free text containing `Step n of m`.
    LegacyStep { current: u32, total: u32 },
    /// Free text containing one of the legacy phase keywords.
    LegacyKeyword,
}

/// Classify a line without interpreting it.
///
/// Returns `None` for log-only lines.
pub fn classify_line(line: &str) -> Option<ProtocolLine> {
    let trimmed = line.trim();

    if let Some(rest) = strip_prefix_ignore_case(trimmed, PROGRESS_PREFIX) {
        let tokens: Vec<&str> = rest.trim().split(' ').collect();
        if let Some((current, total)) = match_step_tokens(&tokens) {
            if tokens.len() == 4 {
                return Some(ProtocolLine::Progress { current, total });
            }
        }
    }

    if let Some(rest) = strip_prefix_ignore_case(trimmed, STATUS_PREFIX) {
        return Some(ProtocolLine::Status(rest.trim().to_string()));
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("step") && lower.contains("of") {
        let tokens: Vec<&str> = trimmed.split(' ').collect();
        if let Some((current, total)) = tokens.windows(4).find_map(match_step_tokens) {
            return Some(ProtocolLine::LegacyStep { current, total });
        }
    }

    if LEGACY_KEYWORDS.iter().any(|keyword| line.contains(keyword)) {
        return Some(ProtocolLine::LegacyKeyword);
    }

    None
}

/// Decode one line into a progress event.
///
/// Pure: the same line and hint always give the same answer. Explicit step
/// lines carry [`DEFAULT_STATUS`] since no earlier status is known; use
/// [`ProgressParser`] to carry status text across lines.
pub fn parse_line(line: &str, total_steps_hint: u32) -> Option<ProgressEvent> {
    interpret(line, total_steps_hint, None).map(|(event, _)| event)
}

/// Stateful decoder for one process run.
///
/// Remembers the last `STATUS:` text so following `PROGRESS:` lines can
/// reuse it as their message.
#[derive(Debug, Clone)]
pub struct ProgressParser {
    total_steps_hint: u32,
    last_status: Option<String>,
}

impl ProgressParser {
    /// Create a parser for a run configured with `total_steps_hint` steps.
    pub fn new(total_steps_hint: u32) -> Self {
        Self {
            total_steps_hint,
            last_status: None,
        }
    }

    /// Decode a line, updating the remembered status.
    pub fn parse_line(&mut self, line: &str) -> Option<ProgressEvent> {
        let (event, status) = interpret(line, self.total_steps_hint, self.last_status.as_deref())?;
        if status.is_some() {
            self.last_status = status;
        }
        Some(event)
    }

    /// Most recent status text, if any.
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }
}

/// Shared decoding; the second element is the new status for `STATUS:` lines.
fn interpret(
    line: &str,
    total_steps_hint: u32,
    last_status: Option<&str>,
) -> Option<(ProgressEvent, Option<String>)> {
    let event = match classify_line(line)? {
        ProtocolLine::Progress { current, total } => {
            ProgressEvent::new(current, total, last_status.unwrap_or(DEFAULT_STATUS))
        }
        ProtocolLine::Status(status) => {
            let (current, total) = estimate_from_status(&status, total_steps_hint);
            let event = ProgressEvent::new(current, total, status.clone());
            return Some((event, Some(status)));
        }
        ProtocolLine::LegacyStep { current, total } => {
            ProgressEvent::new(current, total, line.trim())
        }
        ProtocolLine::LegacyKeyword => ProgressEvent::new(0, total_steps_hint, line.trim()),
    };
    Some((event, None))
}

/// Match `Step <int> of <int>` with case-insensitive keywords.
fn match_step_tokens(tokens: &[&str]) -> Option<(u32, u32)> {
    match tokens {
        [step, current, of, total, ..]
            if step.eq_ignore_ascii_case("step") && of.eq_ignore_ascii_case("of") =>
        {
            Some((current.parse().ok()?, total.parse().ok()?))
        }
        _ => None,
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}
