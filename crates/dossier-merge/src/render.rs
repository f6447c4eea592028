//! Strategy dispatch.

use dossier_analyze::Strategy;

use crate::source::SourceDocument;
use crate::{comprehensive, simple, structured};

/// Inputs shared by every strategy.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Title of the merged document.
    pub title: &'a str,
    /// Topic label the merge was requested for.
    pub topic: &'a str,
    /// Generation date, as printed.
    pub generated: &'a str,
}

/// Merged text plus what the strategy dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Sentences dropped because an earlier source already had them.
    pub duplicates_removed: usize,
}

/// Merge `sources` with the given strategy.
pub fn render(strategy: Strategy, ctx: &RenderContext<'_>, sources: &[SourceDocument]) -> Rendered {
    match strategy {
        Strategy::Simple => simple::render(ctx, sources),
        Strategy::Structured => structured::render(ctx, sources),
        Strategy::Comprehensive => comprehensive::render(ctx, sources),
    }
}
