//! Canonical token ordering.
//!
//! Pools are keyed by `(token0, token1, fee)` with `token0 < token1` compared
//! as unsigned 160-bit integers. Addresses are big-endian byte arrays, so the
//! derived byte-wise ordering on `Address` is exactly that numeric order.

use alloy::primitives::Address;

/// Return `true` if `a` must be token0 when paired with `b`.
#[inline]
pub fn sorts_before(a: Address, b: Address) -> bool {
    a < b
}

/// Order a token pair as `(token0, token1)`.
///
/// Pure and total; applied before any pool lookup or creation because a
/// lookup with reversed order is a different query, not an absent pool.
#[inline]
pub fn canonicalize(a: Address, b: Address) -> (Address, Address) {
    if sorts_before(b, a) {
        (b, a)
    } else {
        (a, b)
    }
}
