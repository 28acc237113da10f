//! This crate implements a message-passing decoder for binary low-density parity-check (LDPC)
//! codes. The decoder runs the sum-product algorithm, also known as belief propagation, with a
//! flooding schedule over the Tanner graph of the code: starting from the channel log-likelihood
//! ratio (LLR) values of the code bits, check nodes and bit nodes alternately exchange extrinsic
//! messages until the hard decisions on the bits satisfy every parity check, or until a maximum
//! number of iterations is reached.
//!
//! The Tanner graph is specified by its numbers of bit nodes and check nodes, and by the linear
//! index `num_checks * bit + check` of each of its edges (that is, of each `1` in the parity-check
//! matrix), counting from `0`.
//!
//! # Examples
//!
//! ```
//! use mpdec::{Bit, Decoder};
//!
//! // (3, 1) repetition code, with parity-check matrix [[1, 1, 0], [1, 0, 1]]
//! let mut decoder = Decoder::new(3, 2, &[0, 1, 2, 5])?;
//! let output = decoder.decode(&[4.0, 4.0, -4.0], 10)?;
//! assert_eq!(output.code_bits_hat, [Bit::Zero, Bit::Zero, Bit::Zero]);
//! assert_eq!(output.num_iter, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

mod common;
mod decoder;
pub mod graph;
mod messages;
pub mod sim;
pub mod update;
pub mod utils;

pub use common::{Bit, Error};
pub use decoder::{Decoder, DecoderConfig, DecoderOutput};
pub use graph::TannerGraph;
pub use messages::MessageStore;
