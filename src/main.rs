//! Command-line front end for the LDPC message-passing decoder.
//!
//! The `decode` subcommand repeatedly reads channel LLR values and a maximum number of iterations
//! from standard input, and prints the decoded codeword and the number of iterations executed. The
//! `simulate` subcommand evaluates the BER-versus-SNR and BLER-versus-SNR performance of the code
//! over a BPSK-AWGN channel, and saves the results to a JSON file. In both cases the code is given
//! by its numbers of bit nodes and check nodes and the linear indices of its Tanner graph edges.
//!
//! Build the executable with `cargo build --release` and then run `./target/release/mpdec -h` for
//! help on the command-line interface. Set `RUST_LOG` (e.g., `RUST_LOG=debug`) to see log output.

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

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{crate_name, crate_version, value_parser, Arg, ArgMatches, Command};
use itertools::Itertools;
use mpdec::{sim, Decoder, DecoderConfig, TannerGraph};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main function
fn main() -> Result<()> {
    init_tracing();
    let timer = Instant::now();
    let matches = command_line_parser().get_matches();
    match matches.subcommand() {
        Some(("decode", sub_matches)) => {
            let mut decoder = decoder_from_matches(sub_matches)?;
            run_decode_loop(&mut decoder, std::io::stdin().lock(), &mut std::io::stdout())?;
        }
        Some(("simulate", sub_matches)) => {
            let decoder = decoder_from_matches(sub_matches)?;
            let all_results = sim::run_bpsk_awgn_sims(
                &decoder,
                &all_sim_params(sub_matches),
                seed_from_matches(sub_matches),
                &json_filename_from_matches(sub_matches),
            )?;
            for results in all_results {
                println!("{results}");
            }
        }
        _ => unreachable!("A subcommand is required"),
    }
    eprintln!("Elapsed time: {:.3?}", timer.elapsed());
    Ok(())
}

/// Installs log subscriber writing to standard error, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Returns command line parser.
fn command_line_parser() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Decodes binary LDPC codes with the message-passing (sum-product) algorithm")
        .subcommand_required(true)
        .subcommand(
            Command::new("decode")
                .about("Decodes LLR values read from standard input")
                .args(code_args()),
        )
        .subcommand(
            Command::new("simulate")
                .about("Evaluates the performance of the code over a BPSK-AWGN channel")
                .args(code_args())
                .arg(max_iter())
                .arg(first_snr_db())
                .arg(snr_step_db())
                .arg(num_snr())
                .arg(num_block_errors_min())
                .arg(num_blocks_per_run())
                .arg(num_runs_min())
                .arg(num_runs_max())
                .arg(seed())
                .arg(json_filename()),
        )
}

/// Returns arguments defining the code and the decoder settings.
fn code_args() -> [Arg; 4] {
    [num_bits(), num_checks(), edge_indices(), atanh_saturation()]
}

/// Returns argument for number of bit nodes.
fn num_bits() -> Arg {
    Arg::new("num_bits")
        .short('B')
        .value_parser(value_parser!(usize))
        .default_value("3")
        .help("Number of bit nodes (columns of the parity-check matrix)")
}

/// Returns argument for number of check nodes.
fn num_checks() -> Arg {
    Arg::new("num_checks")
        .short('C')
        .value_parser(value_parser!(usize))
        .default_value("2")
        .help("Number of check nodes (rows of the parity-check matrix)")
}

/// Returns argument for linear indices of edges.
fn edge_indices() -> Arg {
    Arg::new("edge_indices")
        .short('E')
        .num_args(1 ..)
        .value_parser(value_parser!(usize))
        .default_values(["0", "1", "2", "5"])
        .help("Linear indices (num_checks * bit + check, from 0) of Tanner graph edges")
}

/// Returns argument for saturation value of inverse hyperbolic tangent.
fn atanh_saturation() -> Arg {
    Arg::new("atanh_saturation")
        .short('S')
        .value_parser(value_parser!(f64))
        .default_value("19.07")
        .help("Value of atanh(x) used for x >= 1 (its negative is used for x <= -1)")
}

/// Returns argument for maximum number of decoder iterations.
fn max_iter() -> Arg {
    Arg::new("max_iter")
        .short('t')
        .value_parser(value_parser!(u32))
        .default_value("50")
        .help("Maximum number of decoder iterations")
}

/// Returns argument for first Es/N0 (dB).
fn first_snr_db() -> Arg {
    Arg::new("first_snr_db")
        .short('r')
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .default_value("-2.0")
        .help("First Es/N0 (dB)")
}

/// Returns argument for Es/N0 step (dB).
fn snr_step_db() -> Arg {
    Arg::new("snr_step_db")
        .short('p')
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .default_value("1.0")
        .help("Es/N0 step (dB)")
}

/// Returns argument for number of Es/N0 values.
fn num_snr() -> Arg {
    Arg::new("num_snr")
        .short('s')
        .value_parser(value_parser!(u32))
        .default_value("4")
        .help("Number of Es/N0 values")
}

/// Returns argument for desired minimum number of block errors.
fn num_block_errors_min() -> Arg {
    Arg::new("num_block_errors_min")
        .short('e')
        .value_parser(value_parser!(u32))
        .default_value("500")
        .help("Desired minimum number of block errors")
}

/// Returns argument for number of blocks to be transmitted per run.
fn num_blocks_per_run() -> Arg {
    Arg::new("num_blocks_per_run")
        .short('b')
        .value_parser(value_parser!(u32))
        .default_value("1000")
        .help("Number of blocks to be transmitted per run")
}

/// Returns argument for minimum number of runs of blocks to be simulated.
fn num_runs_min() -> Arg {
    Arg::new("num_runs_min")
        .short('n')
        .value_parser(value_parser!(u32))
        .default_value("10")
        .help("Minimum number of runs of blocks to be simulated")
}

/// Returns argument for maximum number of runs of blocks to be simulated.
fn num_runs_max() -> Arg {
    Arg::new("num_runs_max")
        .short('x')
        .value_parser(value_parser!(u32))
        .default_value("100")
        .help("Maximum number of runs of blocks to be simulated")
}

/// Returns argument for seed of random number generators.
fn seed() -> Arg {
    Arg::new("seed")
        .short('z')
        .value_parser(value_parser!(u64))
        .default_value("0")
        .help("Seed from which the channel noise of every block is derived")
}

/// Returns argument for name of JSON file to which results must be saved.
fn json_filename() -> Arg {
    Arg::new("json_filename")
        .short('f')
        .default_value("results.json")
        .help("Name of JSON file to which results must be saved")
}

/// Returns decoder based on command-line arguments.
fn decoder_from_matches(matches: &ArgMatches) -> Result<Decoder> {
    // OK to unwrap: All code arguments have default values.
    let num_bits: usize = *matches.get_one("num_bits").unwrap();
    let num_checks: usize = *matches.get_one("num_checks").unwrap();
    let edge_indices: Vec<usize> = matches
        .get_many::<usize>("edge_indices")
        .unwrap()
        .copied()
        .collect();
    let config = DecoderConfig {
        atanh_saturation: *matches.get_one("atanh_saturation").unwrap(),
    };
    let graph = TannerGraph::new(num_bits, num_checks, &edge_indices)
        .context("Invalid code structure")?;
    Ok(Decoder::with_config(graph, config)?)
}

/// Reads LLR values and maximum numbers of iterations, and writes decoding results, until the
/// input ends or the user declines to continue.
fn run_decode_loop<R: BufRead, W: Write>(
    decoder: &mut Decoder,
    input: R,
    output: &mut W,
) -> Result<()> {
    writeln!(output, "----Message Passing Decoding Algorithm----")?;
    writeln!(output, "Received LLR values: rxLLR[i] = ln(p(rx[i]|0) / p(rx[i]|1))")?;
    let mut lines = input.lines();
    loop {
        prompt(output, "rxLLR = ")?;
        let Some(line) = lines.next() else {
            break;
        };
        let code_bits_llr = match parse_llr_values(&line?) {
            Ok(values) => values,
            Err(err) => {
                warn!(%err, "invalid LLR values");
                writeln!(output, "Invalid LLR values: {err}")?;
                continue;
            }
        };
        prompt(output, "nIterationMax = ")?;
        let Some(line) = lines.next() else {
            break;
        };
        let max_iter = match line?.trim().parse::<u32>() {
            Ok(max_iter) => max_iter,
            Err(err) => {
                warn!(%err, "invalid maximum number of iterations");
                writeln!(output, "Invalid maximum number of iterations: {err}")?;
                continue;
            }
        };
        match decoder.decode(&code_bits_llr, max_iter) {
            Ok(result) => {
                writeln!(output, "cHat = {}", result.code_bits_hat.iter().join(" "))?;
                writeln!(output, "nIteration = {}", result.num_iter)?;
                writeln!(output)?;
            }
            Err(err) => {
                writeln!(output, "{err}")?;
                continue;
            }
        }
        prompt(output, "Press ENTER to continue, or enter any other key to exit: ")?;
        match lines.next().transpose()? {
            Some(line) if line.is_empty() => {}
            _ => break,
        }
    }
    writeln!(output)?;
    Ok(())
}

/// Writes prompt without a trailing newline.
fn prompt<W: Write>(output: &mut W, text: &str) -> Result<()> {
    write!(output, "{text}")?;
    output.flush()?;
    Ok(())
}

/// Returns LLR values in a line, all of which must be finite.
fn parse_llr_values(line: &str) -> Result<Vec<f64>> {
    let values = parse_values::<f64>(line)?;
    if let Some(value) = values.iter().find(|x| !x.is_finite()) {
        anyhow::bail!("LLR values must be finite (found {value})");
    }
    Ok(values)
}

/// Returns values in a line, separated by whitespace and/or commas.
fn parse_values<T: FromStr>(line: &str) -> Result<Vec<T>, T::Err> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Returns simulation parameters based on command-line arguments.
fn all_sim_params(matches: &ArgMatches) -> Vec<sim::SimParams> {
    let mut num_runs_min = num_runs_min_from_matches(matches);
    let mut num_runs_max = num_runs_max_from_matches(matches);
    if num_runs_min > num_runs_max {
        if let Some(ValueSource::DefaultValue) = matches.value_source("num_runs_min") {
            num_runs_min = num_runs_max;
        }
        if let Some(ValueSource::DefaultValue) = matches.value_source("num_runs_max") {
            num_runs_max = num_runs_min;
        }
    }
    all_es_over_n0_db_from_matches(matches)
        .into_iter()
        .map(|es_over_n0_db| sim::SimParams {
            es_over_n0_db,
            max_iter: max_iter_from_matches(matches),
            num_block_errors_min: num_block_errors_min_from_matches(matches),
            num_blocks_per_run: num_blocks_per_run_from_matches(matches),
            num_runs_min,
            num_runs_max,
        })
        .collect()
}

// OK to unwrap in the functions below: All simulation arguments have default values.

/// Returns maximum number of decoder iterations.
fn max_iter_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("max_iter").unwrap()
}

/// Returns all Es/N0 (dB) values.
fn all_es_over_n0_db_from_matches(matches: &ArgMatches) -> Vec<f64> {
    let first_snr_db: f64 = *matches.get_one("first_snr_db").unwrap();
    let snr_step_db: f64 = *matches.get_one("snr_step_db").unwrap();
    let num_snr: u32 = *matches.get_one("num_snr").unwrap();
    (0 .. num_snr)
        .map(|n| first_snr_db + snr_step_db * f64::from(n))
        .collect()
}

/// Returns desired minimum number of block errors.
fn num_block_errors_min_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_block_errors_min").unwrap()
}

/// Returns number of blocks to be transmitted per run.
fn num_blocks_per_run_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_blocks_per_run").unwrap()
}

/// Returns minimum number of runs of blocks to be simulated.
fn num_runs_min_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_runs_min").unwrap()
}

/// Returns maximum number of runs of blocks to be simulated.
fn num_runs_max_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_runs_max").unwrap()
}

/// Returns seed of random number generators.
fn seed_from_matches(matches: &ArgMatches) -> u64 {
    *matches.get_one("seed").unwrap()
}

/// Returns name of JSON file to which simulation results must be saved.
fn json_filename_from_matches(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("json_filename")
        .unwrap()
        .to_string()
}
