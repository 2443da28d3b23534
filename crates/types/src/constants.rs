//! Shared constants for the network controller

/// Largest chain id accepted from user input.
///
/// Chain ids above 2^53 - 1 cannot round-trip through consumers that store
/// them as IEEE-754 doubles, so they are rejected at validation time.
pub const MAX_SAFE_CHAIN_ID: u64 = 9_007_199_254_740_991;

/// Sentinel carried in the error body of a geo-blocked hosted endpoint.
pub const BLOCKED_REGION_SENTINEL: &str = "countryBlocked";

/// JSON-RPC "internal error" code.
pub const RPC_INTERNAL_ERROR_CODE: i64 = -32603;

/// JSON-RPC "parse error" code, used for unparseable response bodies.
pub const RPC_PARSE_ERROR_CODE: i64 = -32700;

/// Cadence of the block tracker's `eth_blockNumber` poll.
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 20_000;

/// Ticker applied to built-in networks that do not define their own.
pub const DEFAULT_TICKER: &str = "ETH";
