//! Capacity prober: the largest input size whose token still fits a budget.
//!
//! Size 0 first, then doubling from `start_chars` until a probe fails or the
//! ceiling is reached, then binary search between the last fit and the first
//! failure. Every probe builds a fresh input of exactly the probed size.

use serde::Serialize;

use crate::error::CapacityError;
use crate::symbol::Verdict;
use crate::types::ProbeConfig;

/// One evaluated input size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub size_chars: usize,
    pub input_bytes: usize,
    pub token_chars: usize,
    pub symbol_version: Option<u8>,
    pub fits: bool,
}

/// Result of a capacity search.
///
/// `max_input_chars` is the largest probed size that fit and `first_failing`
/// the smallest probed size that did not; nothing tighter is claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityResult {
    pub max_input_chars: Option<usize>,
    pub max_input_bytes: Option<usize>,
    pub at_max: Option<Probe>,
    pub first_failing: Option<Probe>,
    /// The ceiling itself fit, so the true capacity may be larger.
    pub reached_search_ceiling: bool,
    pub probes: usize,
}

impl CapacityResult {
    fn nothing_fits(zero: Probe) -> Self {
        Self {
            max_input_chars: None,
            max_input_bytes: None,
            at_max: None,
            first_failing: Some(zero),
            reached_search_ceiling: false,
            probes: 1,
        }
    }

    fn bounded(best: Probe, first_failing: Option<Probe>, reached: bool, probes: usize) -> Self {
        Self {
            max_input_chars: Some(best.size_chars),
            max_input_bytes: Some(best.input_bytes),
            at_max: Some(best),
            first_failing,
            reached_search_ceiling: reached,
            probes,
        }
    }
}

/// Find the largest input size whose token text the judge accepts.
///
/// `make_input` must return a text of exactly the requested number of
/// characters. Errors from `make_input` or `make_token_text` abort the search.
pub fn find_max_capacity<I, T, J>(
    mut make_input: I,
    mut make_token_text: T,
    mut judge: J,
    config: &ProbeConfig,
) -> Result<CapacityResult, CapacityError>
where
    I: FnMut(usize) -> Result<String, CapacityError>,
    T: FnMut(&str) -> Result<String, CapacityError>,
    J: FnMut(&str) -> Verdict,
{
    let mut probes = 0usize;
    let mut evaluate = |size: usize| -> Result<Probe, CapacityError> {
        let input = make_input(size)?;
        let token = make_token_text(&input)?;
        let verdict = judge(&token);
        probes += 1;
        tracing::debug!(
            size_chars = size,
            token_chars = token.len(),
            symbol_version = ?verdict.symbol_version,
            fits = verdict.fits,
            "prober::probe"
        );
        Ok(Probe {
            size_chars: size,
            input_bytes: input.len(),
            token_chars: token.chars().count(),
            symbol_version: verdict.symbol_version,
            fits: verdict.fits,
        })
    };

    let zero = evaluate(0)?;
    if !zero.fits {
        return Ok(CapacityResult::nothing_fits(zero));
    }

    let ceiling = config.ceiling_chars;
    if ceiling == 0 {
        return Ok(CapacityResult::bounded(zero, None, true, 1));
    }

    // exponential phase
    let mut low = zero;
    let mut size = config.start_chars.clamp(1, ceiling);
    let mut high = None;
    loop {
        let probe = evaluate(size)?;
        if !probe.fits {
            high = Some(probe);
            break;
        }
        low = probe;
        if size == ceiling {
            break;
        }
        size = size.saturating_mul(2).max(size + 1).min(ceiling);
    }

    let Some(mut high) = high else {
        let result = CapacityResult::bounded(low, None, true, probes);
        log_result(&result);
        return Ok(result);
    };

    // binary search on (low, high)
    while low.size_chars + 1 < high.size_chars {
        let mid = low.size_chars + (high.size_chars - low.size_chars) / 2;
        let probe = evaluate(mid)?;
        if probe.fits {
            low = probe;
        } else {
            high = probe;
        }
    }

    let result = CapacityResult::bounded(low, Some(high), false, probes);
    log_result(&result);
    Ok(result)
}

fn log_result(result: &CapacityResult) {
    tracing::info!(
        max_input_chars = ?result.max_input_chars,
        first_failing = ?result.first_failing.as_ref().map(|p| p.size_chars),
        reached_search_ceiling = result.reached_search_ceiling,
        probes = result.probes,
        "capacity search finished"
    );
}
