//! Strategy chain aggregator.
//!
//! The chain is an ordered list of strategy descriptors rather than
//! hard-coded branching: adding or removing a strategy is a data change.
//! Every descriptor runs against the same unmodified buffer; each raw
//! output is cleaned and validated with the lenient extraction policy,
//! and once all attempts have settled the highest-priority accepted
//! attempt wins. Completion order never matters.

use std::panic::{catch_unwind, AssertUnwindSafe};

use docmill_clean::clean_extracted_text;
use docmill_core::{
    assess, AcceptedExtraction, ExtractionMethod, QualityPolicy, RawExtraction, StrategyAttempt,
    StrategyFailure,
};

use crate::{alt_structured, object_scan, page_tree, raw_scan};

/// One entry in the chain: what the strategy is called, how strongly the
/// aggregator should prefer it, and how to run it.
pub struct StrategyDescriptor {
    pub method: ExtractionMethod,
    pub priority: u8,
    pub run: fn(&[u8]) -> Result<RawExtraction, StrategyFailure>,
}

/// The default PDF chain. Priority reflects typical output richness:
/// the alternate structured walk most often recovers well-formed text
/// even from quirky documents, while the raw scanner recovers only
/// fragments and is kept last as a guaranteed-something fallback.
pub fn default_strategies() -> &'static [StrategyDescriptor] {
    static STRATEGIES: [StrategyDescriptor; 4] = [
        StrategyDescriptor {
            method: ExtractionMethod::AltStructured,
            priority: 4,
            run: alt_structured::extract,
        },
        StrategyDescriptor {
            method: ExtractionMethod::PageTree,
            priority: 3,
            run: page_tree::extract,
        },
        StrategyDescriptor {
            method: ExtractionMethod::ObjectScan,
            priority: 2,
            run: object_scan::extract,
        },
        StrategyDescriptor {
            method: ExtractionMethod::RawScan,
            priority: 1,
            run: raw_scan::extract,
        },
    ];
    &STRATEGIES
}

/// Everything the aggregator decided, returned to the caller so failure
/// reasons can feed the fallback diagnostic.
pub struct ChainOutcome {
    /// The winning attempt, if any strategy was accepted.
    pub winner: Option<(ExtractionMethod, AcceptedExtraction)>,
    /// Every settled attempt, in descriptor order.
    pub attempts: Vec<StrategyAttempt>,
}

impl ChainOutcome {
    /// Failure reasons from every non-winning attempt, formatted for the
    /// fallback diagnostic.
    pub fn failure_reasons(&self) -> Vec<String> {
        self.attempts
            .iter()
            .filter_map(|attempt| {
                attempt
                    .outcome
                    .as_ref()
                    .err()
                    .map(|failure| format!("{}: {failure}", attempt.method))
            })
            .collect()
    }
}

/// Run every strategy to completion, then select by priority.
pub fn run_chain(buffer: &[u8], strategies: &[StrategyDescriptor]) -> ChainOutcome {
    let policy = QualityPolicy::extraction();
    let mut attempts = Vec::with_capacity(strategies.len());

    for descriptor in strategies {
        let outcome = settle_strategy(descriptor, buffer, &policy);
        if let Err(failure) = &outcome {
            tracing::debug!(method = %descriptor.method, %failure, "strategy failed");
        }
        attempts.push(StrategyAttempt {
            method: descriptor.method,
            priority: descriptor.priority,
            outcome,
        });
    }

    let winner = attempts
        .iter()
        .filter_map(|attempt| {
            attempt
                .outcome
                .as_ref()
                .ok()
                .map(|accepted| (attempt.priority, attempt.method, accepted.clone()))
        })
        .max_by_key(|(priority, _, _)| *priority)
        .map(|(_, method, accepted)| (method, accepted));

    if let Some((method, _)) = &winner {
        tracing::debug!(method = %method, "strategy chain selected winner");
    }

    ChainOutcome { winner, attempts }
}

/// Run one strategy inside its error boundary, then clean and validate
/// its output. A panic, an extraction error, or a quality rejection all
/// settle as failures; nothing propagates.
fn settle_strategy(
    descriptor: &StrategyDescriptor,
    buffer: &[u8],
    policy: &QualityPolicy,
) -> Result<AcceptedExtraction, StrategyFailure> {
    let raw = match catch_unwind(AssertUnwindSafe(|| (descriptor.run)(buffer))) {
        Ok(result) => result?,
        Err(_) => {
            return Err(StrategyFailure::Panicked(format!(
                "{} strategy panicked",
                descriptor.method
            )))
        }
    };

    let content = clean_extracted_text(&raw.text);
    let verdict = assess(&content, policy);
    if !verdict.accepted {
        return Err(StrategyFailure::QualityRejected(
            verdict.word_count,
            verdict.readable_ratio,
        ));
    }

    Ok(AcceptedExtraction {
        content,
        pages: raw.pages,
        verdict,
        warnings: raw.warnings,
    })
}
