//! Confirmation hook consulted when a table or download crosses its soft threshold.
//!
//! A refusal is treated exactly like crossing the hard limit. The library never
//! prompts on its own; the CLI supplies an interactive policy.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    /// Fetching the whole sample-to-chunk table
    StscTable,
    /// Fetching the byte span of the target samples
    DownloadSize,
}

impl fmt::Display for ConfirmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmKind::StscTable => write!(f, "stsc_table"),
            ConfirmKind::DownloadSize => write!(f, "download_size"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub kind: ConfirmKind,
    pub byte_count: u64,
    pub source_description: Option<String>,
}

pub trait ConfirmationPolicy {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}

impl<F> ConfirmationPolicy for F
where
    F: FnMut(&ConfirmRequest) -> bool,
{
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// Accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmationPolicy for AlwaysConfirm {
    fn confirm(&mut self, _request: &ConfirmRequest) -> bool {
        true
    }
}

/// Refuses every request, so the soft thresholds act as hard limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl ConfirmationPolicy for RejectAll {
    fn confirm(&mut self, _request: &ConfirmRequest) -> bool {
        false
    }
}
