//! Simulator to evaluate performance of an LDPC code over BPSK-AWGN channel
//!
//! Since every binary linear code contains the all-zero codeword, the simulator transmits that
//! codeword in every block, so that no encoder is needed. Blocks are simulated in runs; the blocks
//! of a run are decoded in parallel, each worker thread using its own copy of the decoder. Every
//! block draws its noise from a random number generator seeded with the simulation seed and the
//! run and block indices, so results do not depend on thread scheduling.
//!
//! # Examples
//!
//! ```
//! use mpdec::sim::{self, SimParams};
//! use mpdec::Decoder;
//!
//! let decoder = Decoder::new(3, 2, &[0, 1, 2, 5])?;
//! let params = SimParams {
//!     es_over_n0_db: 0.0,
//!     max_iter: 10,
//!     num_block_errors_min: 10,
//!     num_blocks_per_run: 100,
//!     num_runs_min: 1,
//!     num_runs_max: 5,
//! };
//! let results = sim::run_bpsk_awgn_sim(&decoder, &params, 1)?;
//! assert!(results.num_blocks >= 100);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::BufWriter;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{utils, Bit, Decoder, DecoderConfig, Error};

/// Parameters for LDPC code simulation over BPSK-AWGN channel
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimParams {
    /// Ratio (dB) of symbol energy to noise power spectral density at BPSK-AWGN channel output
    pub es_over_n0_db: f64,
    /// Maximum number of decoder iterations
    pub max_iter: u32,
    /// Desired minimum number of block errors
    pub num_block_errors_min: u32,
    /// Number of blocks to be transmitted per run
    pub num_blocks_per_run: u32,
    /// Minimum number of runs of blocks to be simulated
    pub num_runs_min: u32,
    /// Maximum number of runs of blocks to be simulated
    pub num_runs_max: u32,
}

/// Results from LDPC code simulation over BPSK-AWGN channel
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct SimResults {
    /// Simulation parameters
    pub params: SimParams,
    /// Decoder settings
    pub decoder_config: DecoderConfig,
    /// Number of code bits per block
    pub num_bits_per_block: usize,
    /// Number of blocks transmitted
    pub num_blocks: u64,
    /// Number of code bits in error
    pub num_bit_errors: u64,
    /// Number of blocks with at least one code bit in error
    pub num_block_errors: u64,
    /// Number of blocks whose decisions do not satisfy every parity check
    pub num_decoder_failures: u64,
    /// Total number of decoder iterations over all blocks
    pub num_iter: u64,
}

impl SimResults {
    /// Returns initialized simulation results.
    fn new(params: &SimParams, decoder: &Decoder) -> Self {
        Self {
            params: *params,
            decoder_config: *decoder.config(),
            num_bits_per_block: decoder.graph().num_bits(),
            num_blocks: 0,
            num_bit_errors: 0,
            num_block_errors: 0,
            num_decoder_failures: 0,
            num_iter: 0,
        }
    }

    /// Returns code bit error rate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ber(&self) -> f64 {
        if self.num_blocks == 0 {
            return 0.0;
        }
        self.num_bit_errors as f64 / (self.num_bits_per_block as f64 * self.num_blocks as f64)
    }

    /// Returns block error rate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bler(&self) -> f64 {
        if self.num_blocks == 0 {
            return 0.0;
        }
        self.num_block_errors as f64 / self.num_blocks as f64
    }

    /// Returns mean number of decoder iterations per block.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_num_iter(&self) -> f64 {
        if self.num_blocks == 0 {
            return 0.0;
        }
        self.num_iter as f64 / self.num_blocks as f64
    }

    /// Returns `true` iff desired minimum numbers of block errors and runs have been reached.
    fn run_complete(&self, num_runs: u32) -> bool {
        num_runs >= self.params.num_runs_min
            && self.num_block_errors >= u64::from(self.params.num_block_errors_min)
    }

    /// Updates simulation results after a block.
    fn update_after_block(&mut self, outcome: BlockOutcome) {
        self.num_blocks += 1;
        self.num_iter += u64::from(outcome.num_iter);
        if outcome.num_bit_errors > 0 {
            self.num_bit_errors += outcome.num_bit_errors as u64;
            self.num_block_errors += 1;
        }
        if outcome.decoder_failed {
            self.num_decoder_failures += 1;
        }
    }
}

impl std::fmt::Display for SimResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Es/N0 = {:.2} dB: BER = {:.3e}, BLER = {:.3e} ({}/{} blocks), mean iterations = {:.2}",
            self.params.es_over_n0_db,
            self.ber(),
            self.bler(),
            self.num_block_errors,
            self.num_blocks,
            self.mean_num_iter()
        )
    }
}

/// Outcome of decoding a single block
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
struct BlockOutcome {
    /// Number of code bits in error
    num_bit_errors: usize,
    /// Number of decoder iterations executed
    num_iter: u32,
    /// Whether the decisions fail to satisfy every parity check
    decoder_failed: bool,
}

/// Runs simulations of an LDPC code over a BPSK-AWGN channel and saves results to a JSON file.
///
/// # Parameters
///
/// - `decoder`: Decoder for the code (copied for every worker thread).
///
/// - `all_params`: Parameters for each simulation.
///
/// - `seed`: Seed from which the noise of every block is derived.
///
/// - `json_filename`: Name of the JSON file to which the results of all simulations are saved.
///
/// # Returns
///
/// - `all_results`: Results of each simulation.
///
/// # Errors
///
/// Returns an error if any simulation parameters are invalid, or if the results cannot be saved.
pub fn run_bpsk_awgn_sims(
    decoder: &Decoder,
    all_params: &[SimParams],
    seed: u64,
    json_filename: &str,
) -> Result<Vec<SimResults>, Error> {
    all_params.iter().try_for_each(check_sim_params)?;
    let mut all_results = Vec::with_capacity(all_params.len());
    for params in all_params {
        let results = run_bpsk_awgn_sim(decoder, params, seed)?;
        info!(
            es_over_n0_db = params.es_over_n0_db,
            ber = results.ber(),
            bler = results.bler(),
            num_blocks = results.num_blocks,
            "simulation complete"
        );
        all_results.push(results);
    }
    let writer = BufWriter::new(File::create(json_filename)?);
    serde_json::to_writer_pretty(writer, &all_results)?;
    Ok(all_results)
}

/// Runs simulation of an LDPC code over a BPSK-AWGN channel.
///
/// # Parameters
///
/// - `decoder`: Decoder for the code (copied for every worker thread).
///
/// - `params`: Simulation parameters.
///
/// - `seed`: Seed from which the noise of every block is derived.
///
/// # Returns
///
/// - `results`: Simulation results.
///
/// # Errors
///
/// Returns an error if the simulation parameters are invalid.
pub fn run_bpsk_awgn_sim(
    decoder: &Decoder,
    params: &SimParams,
    seed: u64,
) -> Result<SimResults, Error> {
    check_sim_params(params)?;
    let mut results = SimResults::new(params, decoder);
    for i_run in 0 .. params.num_runs_max {
        if results.run_complete(i_run) {
            break;
        }
        let all_outcomes = (0 .. params.num_blocks_per_run)
            .into_par_iter()
            .map_init(
                || (decoder.clone(), Vec::new()),
                |(decoder, code_bits_hat), i_block| {
                    let mut rng = StdRng::seed_from_u64(block_seed(seed, i_run, i_block));
                    simulate_block(decoder, params, &mut rng, code_bits_hat)
                },
            )
            .collect::<Result<Vec<BlockOutcome>, Error>>()?;
        for outcome in all_outcomes {
            results.update_after_block(outcome);
        }
    }
    Ok(results)
}

/// Transmits the all-zero codeword over the BPSK-AWGN channel, and decodes the channel output.
fn simulate_block(
    decoder: &mut Decoder,
    params: &SimParams,
    rng: &mut StdRng,
    code_bits_hat: &mut Vec<Bit>,
) -> Result<BlockOutcome, Error> {
    let code_bits = vec![Bit::Zero; decoder.graph().num_bits()];
    let code_bits_llr = utils::bpsk_awgn_channel(&code_bits, params.es_over_n0_db, rng);
    let num_iter = decoder.decode_into(&code_bits_llr, params.max_iter, code_bits_hat)?;
    Ok(BlockOutcome {
        num_bit_errors: utils::error_count(code_bits_hat, &code_bits),
        num_iter,
        decoder_failed: !decoder.graph().satisfies_all_checks(code_bits_hat),
    })
}

/// Returns seed for the random number generator of a block.
fn block_seed(seed: u64, i_run: u32, i_block: u32) -> u64 {
    let run_seed = splitmix64(splitmix64(seed) ^ u64::from(i_run));
    splitmix64(run_seed ^ u64::from(i_block))
}

/// Returns output of one SplitMix64 step from given state (a bijection on `u64`).
fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Checks validity of simulation parameters.
fn check_sim_params(params: &SimParams) -> Result<(), Error> {
    if params.num_blocks_per_run == 0 {
        return Err(Error::InvalidInput(
            "Number of blocks per run cannot be zero".to_string(),
        ));
    }
    if params.num_runs_max == 0 {
        return Err(Error::InvalidInput(
            "Maximum number of runs cannot be zero".to_string(),
        ));
    }
    if params.num_runs_min > params.num_runs_max {
        return Err(Error::InvalidInput(format!(
            "Minimum number of runs ({}) exceeds maximum number of runs ({})",
            params.num_runs_min, params.num_runs_max
        )));
    }
    Ok(())
}
