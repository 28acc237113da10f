//! Message-passing decoder for binary LDPC codes
//!
//! The decoder runs the sum-product algorithm with a flooding schedule: in every iteration all
//! check nodes are updated, then all bit nodes. After the channel LLR values are loaded and after
//! every iteration, the bits are decided by sign and checked against all parity checks; decoding
//! stops as soon as they form a codeword, or once the maximum number of iterations is reached.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::update::{self, DEFAULT_ATANH_SATURATION};
use crate::{utils, Bit, Error, MessageStore, TannerGraph};

/// Numerical settings for the decoder
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct DecoderConfig {
    /// Magnitude substituted for the inverse hyperbolic tangent of values outside `(-1, 1)`
    pub atanh_saturation: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            atanh_saturation: DEFAULT_ATANH_SATURATION,
        }
    }
}

/// Result of decoding one received word
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DecoderOutput {
    /// Decisions on all code bits
    pub code_bits_hat: Vec<Bit>,
    /// Number of iterations executed (`0` if the channel decisions already form a codeword)
    pub num_iter: u32,
}

/// Message-passing decoder for the code defined by a Tanner graph
#[derive(Clone, PartialEq, Debug)]
pub struct Decoder {
    /// Tanner graph of the code
    graph: TannerGraph,
    /// Messages for all nodes and edges
    store: MessageStore,
    /// Numerical settings
    config: DecoderConfig,
}

impl Decoder {
    /// Returns decoder with default settings for the code with given Tanner graph edges.
    ///
    /// # Parameters
    ///
    /// - `num_bits`: Number of bit nodes (columns of the parity-check matrix).
    ///
    /// - `num_checks`: Number of check nodes (rows of the parity-check matrix).
    ///
    /// - `edge_indices`: Linear index `num_checks * bit + check` of each edge, counting from `0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_bits` or `num_checks` is `0`, or if any edge index is not in the
    /// range `[0, num_bits * num_checks)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdec::Decoder;
    ///
    /// let decoder = Decoder::new(3, 2, &[0, 1, 2, 5])?;
    /// assert_eq!(decoder.graph().num_edges(), 4);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        num_bits: usize,
        num_checks: usize,
        edge_indices: &[usize],
    ) -> Result<Self, Error> {
        Self::with_config(
            TannerGraph::new(num_bits, num_checks, edge_indices)?,
            DecoderConfig::default(),
        )
    }

    /// Returns decoder with given settings for the code with given Tanner graph.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.atanh_saturation` is not a finite positive number.
    pub fn with_config(graph: TannerGraph, config: DecoderConfig) -> Result<Self, Error> {
        if !(config.atanh_saturation.is_finite() && config.atanh_saturation > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Saturation value for inverse hyperbolic tangent must be finite and positive \
                (found {})",
                config.atanh_saturation
            )));
        }
        Ok(Self::from_valid_config(graph, config))
    }

    /// Returns decoder with given settings, which must already have been checked.
    fn from_valid_config(graph: TannerGraph, config: DecoderConfig) -> Self {
        let store = MessageStore::new(graph.num_bits(), graph.num_checks(), graph.num_edges());
        Self {
            graph,
            store,
            config,
        }
    }

    /// Returns Tanner graph of the code.
    #[must_use]
    pub fn graph(&self) -> &TannerGraph {
        &self.graph
    }

    /// Returns messages left by the latest decoding.
    #[must_use]
    pub fn messages(&self) -> &MessageStore {
        &self.store
    }

    /// Returns numerical settings.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns decisions on code bits, and number of iterations executed, for given LLR values.
    ///
    /// # Parameters
    ///
    /// - `code_bits_llr`: Log-likelihood-ratio (LLR) values for the code bits, with positive
    ///   values indicating that `Zero` is more likely.
    ///
    /// - `max_iter`: Maximum number of iterations.
    ///
    /// # Returns
    ///
    /// - `output`: Decisions on the code bits, and number of iterations executed. Decoding has
    ///   failed if the decisions do not satisfy every parity check, which can only happen if the
    ///   number of iterations equals `max_iter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of LLR values is not equal to the number of bit nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdec::{Bit, Decoder};
    ///
    /// // (3, 1) repetition code, third bit received in error
    /// let mut decoder = Decoder::new(3, 2, &[0, 1, 2, 5])?;
    /// let output = decoder.decode(&[4.0, 4.0, -4.0], 10)?;
    /// assert_eq!(output.code_bits_hat, [Bit::Zero; 3]);
    /// assert_eq!(output.num_iter, 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode(
        &mut self,
        code_bits_llr: &[f64],
        max_iter: u32,
    ) -> Result<DecoderOutput, Error> {
        let mut code_bits_hat = Vec::with_capacity(self.graph.num_bits());
        let num_iter = self.decode_into(code_bits_llr, max_iter, &mut code_bits_hat)?;
        Ok(DecoderOutput {
            code_bits_hat,
            num_iter,
        })
    }

    /// Computes decisions on code bits for given LLR values, and returns number of iterations
    /// executed.
    ///
    /// # Parameters
    ///
    /// - `code_bits_llr`: Log-likelihood-ratio (LLR) values for the code bits, with positive
    ///   values indicating that `Zero` is more likely.
    ///
    /// - `max_iter`: Maximum number of iterations.
    ///
    /// - `code_bits_hat`: Buffer for decisions on the code bits (any pre-existing contents will be
    ///   cleared). Holds exactly `self.graph().num_bits()` decisions on return.
    ///
    /// # Returns
    ///
    /// - `num_iter`: Number of iterations executed.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of LLR values is not equal to the number of bit nodes.
    pub fn decode_into(
        &mut self,
        code_bits_llr: &[f64],
        max_iter: u32,
        code_bits_hat: &mut Vec<Bit>,
    ) -> Result<u32, Error> {
        self.check_decoder_inputs(code_bits_llr)?;
        self.store.load_channel(code_bits_llr);
        if self.decide_and_validate(code_bits_hat) {
            debug!(num_iter = 0, "channel decisions form a codeword");
            return Ok(0);
        }
        self.store.clear_check_to_bit();
        for i_iter in 1 ..= max_iter {
            update::update_check_nodes(&self.graph, &mut self.store);
            update::update_bit_nodes(&self.graph, &mut self.store, self.config.atanh_saturation);
            if self.decide_and_validate(code_bits_hat) {
                debug!(num_iter = i_iter, "decoding converged");
                return Ok(i_iter);
            }
            trace!(i_iter, "iteration completed without a codeword");
        }
        debug!(
            num_iter = max_iter,
            num_unsatisfied_checks = self.graph.num_unsatisfied_checks(code_bits_hat),
            "maximum number of iterations reached"
        );
        Ok(max_iter)
    }

    /// Checks validity of decoder inputs.
    fn check_decoder_inputs(&self, code_bits_llr: &[f64]) -> Result<(), Error> {
        if code_bits_llr.len() == self.graph.num_bits() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Expected {} code bit LLR values (found {})",
                self.graph.num_bits(),
                code_bits_llr.len()
            )))
        }
    }

    /// Decides code bits from current bit LLR values, and returns `true` if they form a codeword.
    fn decide_and_validate(&self, code_bits_hat: &mut Vec<Bit>) -> bool {
        utils::hard_decision(self.store.bit(), code_bits_hat);
        self.graph.satisfies_all_checks(code_bits_hat)
    }
}

impl From<TannerGraph> for Decoder {
    fn from(graph: TannerGraph) -> Self {
        Self::from_valid_config(graph, DecoderConfig::default())
    }
}

#[cfg(test)]
mod tests_of_decoder {
    use super::*;
    use Bit::{One, Zero};

    fn repetition_decoder() -> Decoder {
        Decoder::new(3, 2, &[0, 1, 2, 5]).unwrap()
    }

    fn hamming_decoder() -> Decoder {
        Decoder::new(7, 3, &[0, 1, 2, 3, 4, 6, 8, 10, 11, 12, 16, 20]).unwrap()
    }

    #[test]
    fn test_new() {
        // Invalid inputs
        assert!(Decoder::new(0, 2, &[]).is_err());
        assert!(Decoder::new(3, 2, &[6]).is_err());
        // Valid inputs
        let decoder = repetition_decoder();
        assert_eq!(decoder.config(), &DecoderConfig::default());
        assert_eq!(decoder.messages().check_to_bit(), [0.0; 4]);
        assert_eq!(decoder.messages().check(), [0.0; 2]);
    }

    #[test]
    fn test_with_config() {
        let graph = TannerGraph::new(3, 2, &[0, 1, 2, 5]).unwrap();
        // Invalid inputs
        for atanh_saturation in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = DecoderConfig { atanh_saturation };
            assert!(Decoder::with_config(graph.clone(), config).is_err());
        }
        // Valid inputs
        let config = DecoderConfig {
            atanh_saturation: 10.0,
        };
        let decoder = Decoder::with_config(graph.clone(), config).unwrap();
        assert_eq!(decoder.config(), &config);
        assert_eq!(decoder.graph(), &graph);
    }

    #[test]
    fn test_from_graph() {
        let graph = TannerGraph::new(3, 2, &[0, 1, 2, 5]).unwrap();
        assert_eq!(Decoder::from(graph.clone()), repetition_decoder());
        assert_eq!(
            Decoder::from(graph.clone()),
            Decoder::with_config(graph, DecoderConfig::default()).unwrap()
        );
    }

    #[test]
    fn test_decode_invalid_input() {
        let mut decoder = repetition_decoder();
        assert!(decoder.decode(&[1.0, 1.0], 10).is_err());
        assert!(decoder.decode(&[1.0, 1.0, 1.0, 1.0], 10).is_err());
    }

    #[test]
    fn test_decode_repetition_code() {
        let mut decoder = repetition_decoder();
        let output = decoder.decode(&[4.0, 4.0, -4.0], 10).unwrap();
        assert_eq!(output.code_bits_hat, [Zero, Zero, Zero]);
        assert_eq!(output.num_iter, 1);
        let output = decoder.decode(&[-1.0, 4.0, 4.0], 10).unwrap();
        assert_eq!(output.code_bits_hat, [Zero, Zero, Zero]);
        assert_eq!(output.num_iter, 1);
        let output = decoder.decode(&[1.0, -2.0, -3.0], 10).unwrap();
        assert_eq!(output.code_bits_hat, [One, One, One]);
        assert_eq!(output.num_iter, 1);
    }

    #[test]
    fn test_decode_without_iterations() {
        let mut decoder = repetition_decoder();
        for max_iter in [0, 1, 100] {
            let output = decoder.decode(&[-3.0, -0.5, -2.0], max_iter).unwrap();
            assert_eq!(output.code_bits_hat, [One, One, One]);
            assert_eq!(output.num_iter, 0);
        }
        // All-zero LLR values decide `Zero`, which forms a codeword
        let output = decoder.decode(&[0.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(output.code_bits_hat, [Zero, Zero, Zero]);
        assert_eq!(output.num_iter, 0);
    }

    #[test]
    fn test_decode_with_zero_llr_values() {
        let mut decoder = repetition_decoder();
        let output = decoder.decode(&[0.0, 0.0, -1.0], 10).unwrap();
        assert_eq!(output.code_bits_hat, [One, One, One]);
        assert_eq!(output.num_iter, 2);
        assert!(decoder.messages().bit().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_decode_with_zero_max_iter() {
        let mut decoder = repetition_decoder();
        let output = decoder.decode(&[4.0, 4.0, -4.0], 0).unwrap();
        assert_eq!(output.code_bits_hat, [Zero, Zero, One]);
        assert_eq!(output.num_iter, 0);
    }

    #[test]
    fn test_decode_single_edge() {
        let mut decoder = Decoder::new(1, 1, &[0]).unwrap();
        let output = decoder.decode(&[-1.0], 10).unwrap();
        assert_eq!(output.code_bits_hat, [Zero]);
        assert_eq!(output.num_iter, 1);
        let output = decoder.decode(&[0.0], 10).unwrap();
        assert_eq!(output.code_bits_hat, [Zero]);
        assert_eq!(output.num_iter, 0);
    }

    #[test]
    fn test_decode_hamming_code() {
        let mut decoder = hamming_decoder();
        // Single error in bit 2
        let output = decoder
            .decode(&[2.0, 2.5, -0.5, 3.0, 1.5, 2.0, 2.2], 20)
            .unwrap();
        assert_eq!(output.code_bits_hat, [Zero; 7]);
        assert_eq!(output.num_iter, 1);
        // Errors that the decoder cannot correct
        let output = decoder
            .decode(&[-2.0, 2.5, 0.5, 3.0, 1.5, 2.0, 2.2], 20)
            .unwrap();
        assert_eq!(output.num_iter, 20);
        assert!(!decoder.graph().satisfies_all_checks(&output.code_bits_hat));
    }

    #[test]
    fn test_decode_is_repeatable() {
        let llr = [-2.0, 2.5, 0.5, 3.0, 1.5, 2.0, 2.2];
        let mut decoder = hamming_decoder();
        let first_output = decoder.decode(&llr, 5).unwrap();
        decoder.decode(&[2.0, 2.5, -0.5, 3.0, 1.5, 2.0, 2.2], 20).unwrap();
        assert_eq!(decoder.decode(&llr, 5).unwrap(), first_output);
        assert_eq!(hamming_decoder().decode(&llr, 5).unwrap(), first_output);
    }

    #[test]
    fn test_decode_into() {
        let mut decoder = repetition_decoder();
        let mut code_bits_hat = vec![One; 8];
        // Invalid input
        assert!(decoder
            .decode_into(&[4.0, 4.0], 10, &mut code_bits_hat)
            .is_err());
        // Valid input
        let num_iter = decoder
            .decode_into(&[4.0, 4.0, -4.0], 10, &mut code_bits_hat)
            .unwrap();
        assert_eq!(num_iter, 1);
        assert_eq!(code_bits_hat, [Zero, Zero, Zero]);
    }

    #[test]
    fn test_check_decoder_inputs() {
        let decoder = repetition_decoder();
        assert!(decoder.check_decoder_inputs(&[]).is_err());
        assert!(decoder.check_decoder_inputs(&[0.0; 4]).is_err());
        assert!(decoder.check_decoder_inputs(&[0.0; 3]).is_ok());
    }
}
