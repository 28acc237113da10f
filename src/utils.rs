//! # Some useful functions for decoding and simulating code performance
//!
//! The [`random_bits`] function returns a given number of random bits; the [`bpsk_awgn_channel`]
//! function returns the LLR values at the output of a BPSK-AWGN channel corresponding to given
//! input bits; the [`hard_decision`] function maps LLR values to bits; and the [`error_count`]
//! function returns the number of errors in a sequence with respect to a reference sequence.
//!
//! Functions that need randomness take the random number generator as a parameter, so that
//! results can be reproduced from a seed.
//!
//! # Examples
//!
//! The code below illustrates the usage of the functions in this module.
//! ```
//! use mpdec::utils;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let bits = utils::random_bits(40, &mut rng);
//! let bits_llr = utils::bpsk_awgn_channel(&bits, 10.0, &mut rng);
//! let mut bits_hat = Vec::new();
//! utils::hard_decision(&bits_llr, &mut bits_hat);
//! let err_count = utils::error_count(&bits_hat, &bits);
//! ```

use rand::Rng;
use rand_distr::StandardNormal;

use crate::Bit;

/// Returns given number of random bits.
///
/// # Parameters
///
/// - `num_bits`: Number of random bits to be generated.
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bits`: Random bits.
pub fn random_bits<R: Rng>(num_bits: usize, rng: &mut R) -> Vec<Bit> {
    (0 .. num_bits)
        .map(|_| {
            if rng.random_bool(0.5) {
                Bit::One
            } else {
                Bit::Zero
            }
        })
        .collect()
}

/// Returns LLR values at BPSK-AWGN channel output corresponding to given input bits.
///
/// # Parameters
///
/// - `bits`: Bits to be transmitted over the BPSK-AWGN channel.
///
/// - `es_over_n0_db`: Ratio (dB) of symbol energy to noise power spectral density at the BPSK-AWGN
///   channel output (if the BPSK symbols are `+1.0` and `-1.0`, then the noise variance is
///   `0.5 / 10f64.powf(0.1 * es_over_n0_db)`).
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bits_llr`: Log-likelihood-ratio (LLR) values at the BPSK-AWGN channel output corresponding
///   to the transmitted bits, with positive values indicating that `Zero` is more likely.
pub fn bpsk_awgn_channel<R: Rng>(
    bits: &[Bit],
    es_over_n0_db: f64,
    rng: &mut R,
) -> Vec<f64> {
    let es_over_n0 = 10f64.powf(0.1 * es_over_n0_db);
    let noise_std = (0.5 / es_over_n0).sqrt();
    bits.iter()
        .map(|b| match b {
            Bit::Zero => 1f64,
            Bit::One => -1f64,
        })
        .map(|x| 4.0 * es_over_n0 * (x + noise_std * rng.sample::<f64, _>(StandardNormal)))
        .collect()
}

/// Computes hard decisions on bits from their LLR values.
///
/// # Parameters
///
/// - `bits_llr`: LLR values for the bits. Negative values are mapped to `One`, and all other
///   values (including `0.0`) to `Zero`.
///
/// - `bits_hat`: Buffer for the bit decisions (any pre-existing contents will be cleared).
///
/// # Examples
///
/// ```
/// use mpdec::{utils, Bit};
/// use Bit::{One, Zero};
///
/// let mut bits_hat = Vec::new();
/// utils::hard_decision(&[0.0, 0.01, -0.01], &mut bits_hat);
/// assert_eq!(bits_hat, [Zero, Zero, One]);
/// ```
pub fn hard_decision(bits_llr: &[f64], bits_hat: &mut Vec<Bit>) {
    bits_hat.clear();
    bits_hat.extend(
        bits_llr
            .iter()
            .map(|&x| if x < 0.0 { Bit::One } else { Bit::Zero }),
    );
}

/// Returns number of errors in a sequence with respect to a reference sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared.
///
/// # Returns
///
/// - `err_count`: Number of positions in which the two sequences differ. If they are of different
///   lengths, then the longer sequence is effectively truncated to the length of the shorter one.
pub fn error_count<T: PartialEq>(seq: &[T], ref_seq: &[T]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count()
}
