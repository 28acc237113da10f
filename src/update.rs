//! Sum-product updates of check nodes and bit nodes
//!
//! Bit-to-check messages and check messages live in the tanh-half domain, where a message with
//! LLR value `L` is represented as `tanh(L / 2)`, so that combining the messages at a parity check
//! becomes a product. Every message sent along an edge excludes what the receiving node sent along
//! the same edge.

use crate::{MessageStore, TannerGraph};

/// Default magnitude returned by [`saturating_atanh`] for arguments outside `(-1, 1)`
pub const DEFAULT_ATANH_SATURATION: f64 = 19.07;

/// Returns inverse hyperbolic tangent, saturated for arguments outside `(-1, 1)`.
///
/// # Parameters
///
/// - `x`: Argument.
///
/// - `saturation`: Value returned for `x >= 1` (its negative is returned for `x <= -1`).
///
/// # Examples
///
/// ```
/// use mpdec::update::saturating_atanh;
///
/// assert_eq!(saturating_atanh(1.0, 19.07), 19.07);
/// assert_eq!(saturating_atanh(-3.0, 19.07), -19.07);
/// assert!((saturating_atanh(0.5, 19.07) - 0.5f64.atanh()).abs() < 1e-12);
/// ```
#[must_use]
pub fn saturating_atanh(x: f64, saturation: f64) -> f64 {
    if x <= -1.0 {
        -saturation
    } else if x >= 1.0 {
        saturation
    } else {
        // Log form rather than `f64::atanh`, whose rounding differs in the last place.
        0.5 * ((1.0 + x) / (1.0 - x)).ln()
    }
}

/// Updates bit-to-check messages of all edges, and then messages of all check nodes.
pub(crate) fn update_check_nodes(graph: &TannerGraph, store: &mut MessageStore) {
    let (bit, check_to_bit, bit_to_check, check) = store.check_update_buffers();
    for (edge, msg) in bit_to_check.iter_mut().enumerate() {
        *msg = ((bit[graph.bit_of_edge(edge)] - check_to_bit[edge]) / 2.0).tanh();
    }
    for (c, msg) in check.iter_mut().enumerate() {
        *msg = graph
            .edges_of_check(c)
            .iter()
            .fold(1.0, |prod, &edge| prod * bit_to_check[edge]);
    }
}

/// Updates check-to-bit messages of all edges, and then total LLR values of all bit nodes.
pub(crate) fn update_bit_nodes(graph: &TannerGraph, store: &mut MessageStore, saturation: f64) {
    let (channel, check, bit_to_check, check_to_bit, bit) = store.bit_update_buffers();
    for (edge, msg) in check_to_bit.iter_mut().enumerate() {
        let c = graph.check_of_edge(edge);
        let extrinsic = if bit_to_check[edge] == 0.0 {
            extrinsic_product(graph, bit_to_check, c, edge)
        } else {
            check[c] / bit_to_check[edge]
        };
        *msg = 2.0 * saturating_atanh(extrinsic, saturation);
    }
    for (b, msg) in bit.iter_mut().enumerate() {
        *msg = graph
            .edges_of_bit(b)
            .iter()
            .fold(channel[b], |sum, &edge| sum + check_to_bit[edge]);
    }
}

/// Returns product of bit-to-check messages into a check node over all edges but one.
fn extrinsic_product(
    graph: &TannerGraph,
    bit_to_check: &[f64],
    check: usize,
    excluded_edge: usize,
) -> f64 {
    graph
        .edges_of_check(check)
        .iter()
        .filter(|&&edge| edge != excluded_edge)
        .fold(1.0, |prod, &edge| prod * bit_to_check[edge])
}
