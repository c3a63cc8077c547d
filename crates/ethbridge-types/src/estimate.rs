//! Minimal gas limit search
//!
//! [`bin_search`] finds the smallest gas limit at which a caller supplied
//! probe succeeds, assuming success is monotone in gas. [`estimate_gas`]
//! wraps it with the window selection and final checks an
//! `eth_estimateGas` handler needs.

use ethbridge_primitives::Gas;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::GasEstimateError;
use crate::result::{ExecutionResult, VM_ERROR_OUT_OF_GAS};

/// Result of executing a transaction at one candidate gas limit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Execution succeeded at this gas limit
    Success(ExecutionResult),
    /// Execution needs more gas; the result is kept when the VM produced one
    Failure(Option<ExecutionResult>),
}

impl ProbeOutcome {
    /// Whether the probed gas limit was too low
    pub fn is_insufficient(&self) -> bool {
        matches!(self, ProbeOutcome::Failure(_))
    }

    /// Execution result, if any
    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            ProbeOutcome::Success(res) => Some(res),
            ProbeOutcome::Failure(res) => res.as_ref(),
        }
    }
}

/// Binary search for the smallest gas limit in `[lo, hi]` at which `probe`
/// succeeds.
///
/// `probe` must be monotone: success at `g` implies success at every gas
/// above `g`. Each step probes the midpoint of the window, so the number of
/// probes is about `log2(hi - lo)`. `lo` is only probed once the window
/// has narrowed to `[lo, lo + 1]`. A probe error ends the search at once
/// and is returned unchanged.
///
/// If no probe succeeds the window collapses onto `hi`, which is returned
/// without an error. Callers that need to know whether `hi` itself is
/// viable must check it, as [`estimate_gas`] does. `lo >= hi` returns `lo`
/// without probing.
pub fn bin_search<F, E>(mut lo: Gas, mut hi: Gas, mut probe: F) -> Result<Gas, E>
where
    F: FnMut(Gas) -> Result<ProbeOutcome, E>,
{
    let mut probes = 0u32;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        probes += 1;
        trace!(lo, hi, gas = mid, "probing gas limit");
        match probe(mid) {
            Err(err) => {
                debug!(gas = mid, probes, "gas probe failed, aborting search");
                return Err(err);
            }
            Ok(outcome) if outcome.is_insufficient() => lo = mid + 1,
            Ok(_) => hi = mid,
        }
    }
    debug!(gas = lo, probes, "gas search converged");
    Ok(lo)
}

/// Gas estimation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimateConfig {
    /// Upper bound applied to every estimate, 0 disables it
    #[serde(default = "default_gas_cap")]
    pub gas_cap: Gas,
    /// Intrinsic gas of a plain value transfer
    #[serde(default = "default_tx_gas")]
    pub tx_gas: Gas,
}

fn default_gas_cap() -> Gas {
    25_000_000
}

fn default_tx_gas() -> Gas {
    21_000
}

impl Default for GasEstimateConfig {
    fn default() -> Self {
        Self {
            gas_cap: default_gas_cap(),
            tx_gas: default_tx_gas(),
        }
    }
}

impl GasEstimateConfig {
    /// Highest gas limit to try for a request
    ///
    /// A requested gas below the intrinsic cost is ignored in favour of the
    /// block gas limit. The cap applies either way.
    pub fn upper_bound(&self, requested_gas: Option<Gas>, block_gas_limit: Gas) -> Gas {
        let hi = match requested_gas {
            Some(gas) if gas >= self.tx_gas => gas,
            _ => block_gas_limit,
        };
        if self.gas_cap == 0 {
            hi
        } else {
            hi.min(self.gas_cap)
        }
    }
}

/// Estimate the gas limit a transaction needs.
///
/// The search runs over `[tx_gas, hi]` where `hi` comes from
/// [`GasEstimateConfig::upper_bound`]. When the search lands on `hi`, `hi`
/// is probed once more so that a transaction which cannot succeed at any
/// allowed gas reports why instead of returning `hi`.
pub fn estimate_gas<F, E>(
    requested_gas: Option<Gas>,
    block_gas_limit: Gas,
    config: &GasEstimateConfig,
    mut probe: F,
) -> Result<Gas, GasEstimateError<E>>
where
    F: FnMut(Gas) -> Result<ProbeOutcome, E>,
{
    let hi = config.upper_bound(requested_gas, block_gas_limit);
    if hi < config.tx_gas {
        return Err(GasEstimateError::GasExceedsAllowance(hi));
    }
    let lo = config.tx_gas;
    debug!(lo, hi, "estimating gas");

    let gas = bin_search(lo, hi, &mut probe).map_err(GasEstimateError::Probe)?;
    if gas != hi {
        return Ok(gas);
    }

    match probe(hi).map_err(GasEstimateError::Probe)? {
        ProbeOutcome::Success(_) => Ok(hi),
        ProbeOutcome::Failure(Some(res)) if res.is_reverted() => {
            Err(GasEstimateError::Reverted {
                reason: res.revert_reason(),
                data: res.ret,
            })
        }
        ProbeOutcome::Failure(Some(ExecutionResult {
            vm_error: Some(vm_error),
            ..
        })) if vm_error != VM_ERROR_OUT_OF_GAS => Err(GasEstimateError::VmError(vm_error)),
        ProbeOutcome::Failure(_) => Err(GasEstimateError::GasExceedsAllowance(hi)),
    }
}
