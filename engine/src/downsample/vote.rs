//! Label voting resolver
//!
//! Chooses the label that represents a 2x2 neighborhood at the next coarser
//! pyramid level. This is a sequential override rule, not a plurality vote: a
//! candidate that matches any previously seen value confirms and replaces the
//! running value, and only a still-background running value is replaced
//! unconditionally. Ties are therefore order-sensitive by contract.

use crate::cuboid::Label;

/// Resolve a 2x2 neighborhood `[v00, v01, v10, v11]` to a single label.
///
/// Returns background only when every candidate is background; a lone
/// non-background candidate wins regardless of position.
pub fn vote_quad<T: Label>(candidates: [T; 4]) -> T {
    let [v00, v01, v10, v11] = candidates;

    let mut value = v00;
    if value.is_background() {
        value = v01;
    }

    if !v10.is_background() && (value.is_background() || v10 == v00 || v10 == v01) {
        value = v10;
    }

    if !v11.is_background()
        && (value.is_background() || v11 == v00 || v11 == v01 || v11 == v10)
    {
        value = v11;
    }

    value
}
