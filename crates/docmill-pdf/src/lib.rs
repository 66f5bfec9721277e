//! PDF text extraction via a cascade of independent strategies.
//!
//! Real-world PDFs are frequently malformed, image-only, or encoded in
//! ways a single parser cannot handle. Rather than a waterfall of
//! try/else branches, four strategies all run against the unmodified
//! buffer; each raw output is cleaned and quality-checked, and the
//! aggregator picks the accepted attempt with the highest priority —
//! never the one that merely finished first.
//!
//! Strategies, highest priority first:
//! 1. [`alt_structured`] — full content-operator walk with per-object
//!    text callbacks
//! 2. [`page_tree`] — page-tree rendering via `pdf-extract`
//! 3. [`object_scan`] — text-showing operands from each page's content
//!    stream
//! 4. [`raw_scan`] — encoding sweep plus pattern matching over the raw
//!    bytes, ignoring structure entirely

pub mod alt_structured;
pub mod chain;
pub mod object_scan;
pub mod page_tree;
pub mod raw_scan;

pub use chain::{default_strategies, run_chain, ChainOutcome, StrategyDescriptor};
pub use docmill_core::{RawExtraction, StrategyFailure};
