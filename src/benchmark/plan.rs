//! Per-repetition operation plan
//!
//! Yields the fixed operation sequence in order, skipping operations whose
//! inputs an earlier step did not produce.

use crate::chain::{CallOutput, ChainCall};
use crate::models::{normalize_address, ChainMethod, Pool, Token};

/// Fixed operation order within one repetition
pub const SEQUENCE: [ChainMethod; 8] = [
    ChainMethod::ListAllTokens,
    ChainMethod::GetPrices,
    ChainMethod::ListPools,
    ChainMethod::ListPoolsForSwaps,
    ChainMethod::GetPoolByAddress,
    ChainMethod::ListLatestPoolEpochs,
    ChainMethod::GetPoolEpochs,
    ChainMethod::GetQuote,
];

/// Epoch page requested for the first pool
pub const POOL_EPOCHS_OFFSET: usize = 0;
pub const POOL_EPOCHS_LIMIT: usize = 5;

/// Amount quoted from the first token
pub const QUOTE_AMOUNT: f64 = 1.0;

/// How many tokens after the first are scanned for a quote counterpart
const QUOTE_SCAN: usize = 4;

/// State of one repetition; data lives only as long as the repetition
#[derive(Debug, Default)]
pub struct RepetitionPlan {
    cursor: usize,
    tokens: Option<Vec<Token>>,
    pools: Option<Vec<Pool>>,
    aborted: bool,
}

impl RepetitionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next operation to attempt, or None when the repetition is over
    pub fn next_call(&mut self) -> Option<ChainCall<'_>> {
        if self.aborted {
            return None;
        }
        let method = loop {
            let method = *SEQUENCE.get(self.cursor)?;
            self.cursor += 1;
            if self.call_for(method).is_some() {
                break method;
            }
        };
        self.call_for(method)
    }

    /// Feed back the outcome of an attempted operation; failures pass None
    pub fn record(&mut self, method: ChainMethod, output: Option<CallOutput>) {
        match (method, output) {
            (ChainMethod::ListAllTokens, Some(CallOutput::Tokens(tokens))) => {
                self.tokens = Some(tokens)
            }
            (ChainMethod::ListAllTokens, _) => self.tokens = None,
            (ChainMethod::ListPools, Some(CallOutput::Pools(pools))) => self.pools = Some(pools),
            (ChainMethod::ListPools, _) => self.pools = None,
            _ => {}
        }
    }

    /// Skip every remaining operation
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    fn first_pool(&self) -> Option<&Pool> {
        self.pools.as_ref().and_then(|pools| pools.first())
    }

    fn quote_pair(&self) -> Option<(&Token, &Token)> {
        let tokens = self.tokens.as_ref()?;
        if tokens.len() < 2 {
            return None;
        }
        let from = &tokens[0];
        let from_address = normalize_address(from.address());
        let to = tokens[1..]
            .iter()
            .take(QUOTE_SCAN)
            .find(|t| normalize_address(t.address()) != from_address)?;
        Some((from, to))
    }

    fn call_for(&self, method: ChainMethod) -> Option<ChainCall<'_>> {
        match method {
            ChainMethod::ListAllTokens => Some(ChainCall::ListAllTokens),
            ChainMethod::GetPrices => self
                .tokens
                .as_deref()
                .filter(|tokens| !tokens.is_empty())
                .map(|tokens| ChainCall::GetPrices { tokens }),
            ChainMethod::ListPools => Some(ChainCall::ListPools),
            ChainMethod::ListPoolsForSwaps => Some(ChainCall::ListPoolsForSwaps),
            ChainMethod::GetPoolByAddress => self.first_pool().map(|pool| {
                ChainCall::GetPoolByAddress {
                    address: pool.address(),
                }
            }),
            ChainMethod::ListLatestPoolEpochs => Some(ChainCall::ListLatestPoolEpochs),
            ChainMethod::GetPoolEpochs => self.first_pool().map(|pool| ChainCall::GetPoolEpochs {
                address: pool.address(),
                offset: POOL_EPOCHS_OFFSET,
                limit: POOL_EPOCHS_LIMIT,
            }),
            ChainMethod::GetQuote => self.quote_pair().map(|(from, to)| ChainCall::GetQuote {
                from,
                to,
                amount: QUOTE_AMOUNT,
            }),
        }
    }
}
