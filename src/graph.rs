//! Tanner graph of a binary LDPC code
//!
//! The graph is built from a flat list of edges, each given by its linear index
//! `num_checks * bit + check` into a virtual `num_bits x num_checks` matrix (0-based). Every edge
//! is decoded into the bit node and check node it connects, and the edges incident to each node are
//! stored in a compressed sparse row (CSR) layout, in increasing order of edge index.
//!
//! # Examples
//!
//! ```
//! use mpdec::TannerGraph;
//!
//! // (3, 1) repetition code: checks `c0 + c1 = 0` and `c0 + c2 = 0`
//! let graph = TannerGraph::new(3, 2, &[0, 1, 2, 5])?;
//! assert_eq!(graph.num_edges(), 4);
//! assert_eq!(graph.edges_of_bit(0), [0, 1]);
//! assert_eq!(graph.edges_of_check(1), [1, 3]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::debug;

use crate::{Bit, Error};

/// Edge indices incident to each node of one category, in CSR layout
#[derive(Clone, Eq, PartialEq, Debug)]
struct Adjacency {
    /// Position in `edges` of the first edge of each node, followed by `edges.len()`
    offsets: Vec<usize>,
    /// Edge indices, grouped by node
    edges: Vec<usize>,
}

impl Adjacency {
    /// Returns adjacency for `num_nodes` nodes, given the node incident to each edge.
    fn new(num_nodes: usize, node_of_edge: &[usize]) -> Self {
        let mut offsets = vec![0; num_nodes + 1];
        for &node in node_of_edge {
            offsets[node + 1] += 1;
        }
        for node in 0 .. num_nodes {
            offsets[node + 1] += offsets[node];
        }
        let mut next_slot = offsets[.. num_nodes].to_vec();
        let mut edges = vec![0; node_of_edge.len()];
        for (edge, &node) in node_of_edge.iter().enumerate() {
            edges[next_slot[node]] = edge;
            next_slot[node] += 1;
        }
        Self { offsets, edges }
    }

    /// Returns number of edges incident to a node.
    fn degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    /// Returns edges incident to a node.
    fn edges_of(&self, node: usize) -> &[usize] {
        &self.edges[self.offsets[node] .. self.offsets[node + 1]]
    }
}

/// Bipartite graph between the bit nodes and check nodes of a binary LDPC code
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TannerGraph {
    /// Number of bit nodes (columns of the parity-check matrix)
    num_bits: usize,
    /// Number of check nodes (rows of the parity-check matrix)
    num_checks: usize,
    /// Bit node incident to each edge
    bit_of_edge: Vec<usize>,
    /// Check node incident to each edge
    check_of_edge: Vec<usize>,
    /// Edges incident to each bit node
    bit_adjacency: Adjacency,
    /// Edges incident to each check node
    check_adjacency: Adjacency,
}

impl TannerGraph {
    /// Returns Tanner graph with given numbers of nodes and given edges.
    ///
    /// # Parameters
    ///
    /// - `num_bits`: Number of bit nodes (columns of the parity-check matrix).
    ///
    /// - `num_checks`: Number of check nodes (rows of the parity-check matrix).
    ///
    /// - `edge_indices`: Linear index `num_checks * bit + check` of each edge, counting from `0`.
    ///   Duplicate edges and nodes without edges are not rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_bits` or `num_checks` is `0`, or if any edge index is not in the
    /// range `[0, num_bits * num_checks)`.
    pub fn new(
        num_bits: usize,
        num_checks: usize,
        edge_indices: &[usize],
    ) -> Result<Self, Error> {
        let num_nodes_product = check_num_nodes(num_bits, num_checks)?;
        if let Some((edge, &index)) = edge_indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index >= num_nodes_product)
        {
            return Err(Error::InvalidGraphStructure(format!(
                "Index {index} of edge {edge} is not in the range [0, {num_nodes_product})"
            )));
        }
        let bit_of_edge: Vec<usize> = edge_indices.iter().map(|&x| x / num_checks).collect();
        let check_of_edge: Vec<usize> = edge_indices.iter().map(|&x| x % num_checks).collect();
        let bit_adjacency = Adjacency::new(num_bits, &bit_of_edge);
        let check_adjacency = Adjacency::new(num_checks, &check_of_edge);
        debug!(
            num_bits,
            num_checks,
            num_edges = edge_indices.len(),
            "built Tanner graph"
        );
        Ok(Self {
            num_bits,
            num_checks,
            bit_of_edge,
            check_of_edge,
            bit_adjacency,
            check_adjacency,
        })
    }

    /// Returns Tanner graph for edge indices given as floating-point values.
    ///
    /// # Parameters
    ///
    /// - `num_bits`: Number of bit nodes.
    ///
    /// - `num_checks`: Number of check nodes.
    ///
    /// - `edge_indices`: Linear index `num_checks * bit + check` of each edge, counting from `0`.
    ///   Each value must be a finite, nonnegative integer.
    ///
    /// # Errors
    ///
    /// Returns an error if any edge index is not a finite nonnegative integer, or under the
    /// conditions listed for [`TannerGraph::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdec::TannerGraph;
    ///
    /// let graph = TannerGraph::from_float_indices(3, 2, &[0.0, 1.0, 2.0, 5.0])?;
    /// assert_eq!(graph.check_of_edge(3), 1);
    /// assert!(TannerGraph::from_float_indices(3, 2, &[0.5]).is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_float_indices(
        num_bits: usize,
        num_checks: usize,
        edge_indices: &[f64],
    ) -> Result<Self, Error> {
        let mut int_edge_indices = Vec::with_capacity(edge_indices.len());
        for (edge, &index) in edge_indices.iter().enumerate() {
            // `2^53` bounds the range in which every integer is exactly representable.
            if !index.is_finite() || index < 0.0 || index.fract() != 0.0 || index > 2f64.powi(53) {
                return Err(Error::InvalidGraphStructure(format!(
                    "Index {index} of edge {edge} is not an exactly representable nonnegative \
                    integer"
                )));
            }
            // OK to cast: `index` is a nonnegative integer no larger than `2^53`.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let int_index = index as usize;
            int_edge_indices.push(int_index);
        }
        Self::new(num_bits, num_checks, &int_edge_indices)
    }

    /// Returns Tanner graph corresponding to a dense parity-check matrix.
    ///
    /// # Parameters
    ///
    /// - `rows`: Rows of the parity-check matrix, one per check node. All rows must have the same
    ///   positive length, namely the number of bit nodes. Edges are numbered in increasing order of
    ///   linear index, i.e., bit by bit and, within a bit, check by check.
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` is empty, or if the rows are empty or of different lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdec::{Bit, TannerGraph};
    /// use Bit::{One, Zero};
    ///
    /// let graph = TannerGraph::from_parity_check_matrix(&[
    ///     vec![One, One, Zero],
    ///     vec![One, Zero, One],
    /// ])?;
    /// assert_eq!(graph, TannerGraph::new(3, 2, &[0, 1, 2, 5])?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_parity_check_matrix(rows: &[Vec<Bit>]) -> Result<Self, Error> {
        let num_checks = rows.len();
        let num_bits = rows.first().map_or(0, Vec::len);
        if num_checks == 0 || num_bits == 0 {
            return Err(Error::InvalidInput(
                "Parity-check matrix must have at least one row and one column".to_string(),
            ));
        }
        if let Some(check) = rows.iter().position(|row| row.len() != num_bits) {
            return Err(Error::InvalidInput(format!(
                "Row {check} of parity-check matrix has length {} (expected {num_bits})",
                rows[check].len()
            )));
        }
        let edge_indices: Vec<usize> = (0 .. num_bits)
            .flat_map(|bit| {
                (0 .. num_checks)
                    .filter(move |&check| rows[check][bit] == Bit::One)
                    .map(move |check| linear_index(num_checks, bit, check))
            })
            .collect();
        Self::new(num_bits, num_checks, &edge_indices)
    }

    /// Returns number of bit nodes.
    #[must_use]
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Returns number of check nodes.
    #[must_use]
    pub fn num_checks(&self) -> usize {
        self.num_checks
    }

    /// Returns number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.bit_of_edge.len()
    }

    /// Returns bit node incident to an edge.
    ///
    /// # Panics
    ///
    /// Panics if `edge >= self.num_edges()`.
    #[must_use]
    pub fn bit_of_edge(&self, edge: usize) -> usize {
        self.bit_of_edge[edge]
    }

    /// Returns check node incident to an edge.
    ///
    /// # Panics
    ///
    /// Panics if `edge >= self.num_edges()`.
    #[must_use]
    pub fn check_of_edge(&self, edge: usize) -> usize {
        self.check_of_edge[edge]
    }

    /// Returns degree of a bit node.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= self.num_bits()`.
    #[must_use]
    pub fn bit_degree(&self, bit: usize) -> usize {
        self.bit_adjacency.degree(bit)
    }

    /// Returns degree of a check node.
    ///
    /// # Panics
    ///
    /// Panics if `check >= self.num_checks()`.
    #[must_use]
    pub fn check_degree(&self, check: usize) -> usize {
        self.check_adjacency.degree(check)
    }

    /// Returns edges incident to a bit node, in increasing order.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= self.num_bits()`.
    #[must_use]
    pub fn edges_of_bit(&self, bit: usize) -> &[usize] {
        self.bit_adjacency.edges_of(bit)
    }

    /// Returns edges incident to a check node, in increasing order.
    ///
    /// # Panics
    ///
    /// Panics if `check >= self.num_checks()`.
    #[must_use]
    pub fn edges_of_check(&self, check: usize) -> &[usize] {
        self.check_adjacency.edges_of(check)
    }

    /// Returns `true` if given bits satisfy every parity check.
    ///
    /// # Parameters
    ///
    /// - `bits`: Bits to be checked. Must have length `self.num_bits()`.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is shorter than `self.num_bits()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdec::{Bit, TannerGraph};
    /// use Bit::{One, Zero};
    ///
    /// let graph = TannerGraph::new(3, 2, &[0, 1, 2, 5])?;
    /// assert!(graph.satisfies_all_checks(&[One, One, One]));
    /// assert!(!graph.satisfies_all_checks(&[Zero, Zero, One]));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn satisfies_all_checks(&self, bits: &[Bit]) -> bool {
        (0 .. self.num_checks).all(|check| self.check_parity(check, bits) == Bit::Zero)
    }

    /// Returns number of parity checks not satisfied by given bits.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is shorter than `self.num_bits()`.
    #[must_use]
    pub fn num_unsatisfied_checks(&self, bits: &[Bit]) -> usize {
        (0 .. self.num_checks)
            .filter(|&check| self.check_parity(check, bits) == Bit::One)
            .count()
    }

    /// Returns XOR of the bits connected to a check node.
    fn check_parity(&self, check: usize, bits: &[Bit]) -> Bit {
        let num_ones = self
            .edges_of_check(check)
            .iter()
            .filter(|&&edge| bits[self.bit_of_edge[edge]] == Bit::One)
            .count();
        if num_ones % 2 == 0 {
            Bit::Zero
        } else {
            Bit::One
        }
    }
}

/// Returns linear index of the edge between a bit node and a check node.
///
/// # Examples
///
/// ```
/// use mpdec::graph::linear_index;
///
/// assert_eq!(linear_index(2, 2, 1), 5);
/// ```
#[must_use]
pub fn linear_index(num_checks: usize, bit: usize, check: usize) -> usize {
    num_checks * bit + check
}

/// Checks numbers of nodes, and returns their product.
fn check_num_nodes(num_bits: usize, num_checks: usize) -> Result<usize, Error> {
    if num_bits == 0 || num_checks == 0 {
        return Err(Error::InvalidInput(format!(
            "Numbers of bit and check nodes must be positive (found {num_bits} and {num_checks})"
        )));
    }
    num_bits.checked_mul(num_checks).ok_or_else(|| {
        Error::InvalidGraphStructure(format!(
            "Product of numbers of bit and check nodes ({num_bits} x {num_checks}) overflows"
        ))
    })
}

#[cfg(test)]
mod tests_of_tanner_graph {
    use super::*;
    use Bit::{One, Zero};

    fn hamming_graph() -> TannerGraph {
        TannerGraph::from_parity_check_matrix(&[
            vec![One, One, One, Zero, One, Zero, Zero],
            vec![One, One, Zero, One, Zero, One, Zero],
            vec![One, Zero, One, One, Zero, Zero, One],
        ])
        .unwrap()
    }

    #[test]
    fn test_new() {
        // Invalid input
        assert!(TannerGraph::new(0, 2, &[]).is_err());
        assert!(TannerGraph::new(3, 0, &[]).is_err());
        assert!(matches!(
            TannerGraph::new(3, 2, &[0, 1, 6]),
            Err(Error::InvalidGraphStructure(_))
        ));
        assert!(matches!(
            TannerGraph::new(usize::MAX, 2, &[]),
            Err(Error::InvalidGraphStructure(_))
        ));
        // Valid input
        let graph = TannerGraph::new(3, 2, &[0, 1, 2, 5]).unwrap();
        assert_eq!(graph.num_bits(), 3);
        assert_eq!(graph.num_checks(), 2);
        assert_eq!(graph.num_edges(), 4);
        assert_eq!(graph.bit_of_edge, [0, 0, 1, 2]);
        assert_eq!(graph.check_of_edge, [0, 1, 0, 1]);
        assert_eq!(graph.bit_adjacency.offsets, [0, 2, 3, 4]);
        assert_eq!(graph.bit_adjacency.edges, [0, 1, 2, 3]);
        assert_eq!(graph.check_adjacency.offsets, [0, 2, 4]);
        assert_eq!(graph.check_adjacency.edges, [0, 2, 1, 3]);
    }

    #[test]
    fn test_new_keeps_edge_order() {
        let graph = TannerGraph::new(3, 2, &[5, 2, 1, 0]).unwrap();
        assert_eq!(graph.edges_of_bit(0), [2, 3]);
        assert_eq!(graph.edges_of_bit(2), [0]);
        assert_eq!(graph.edges_of_check(0), [1, 3]);
        assert_eq!(graph.edges_of_check(1), [0, 2]);
    }

    #[test]
    fn test_new_accepts_degenerate_structure() {
        // Duplicate edge, and bit node 1 without edges
        let graph = TannerGraph::new(2, 1, &[0, 0]).unwrap();
        assert_eq!(graph.bit_degree(0), 2);
        assert_eq!(graph.bit_degree(1), 0);
        assert!(graph.edges_of_bit(1).is_empty());
        assert_eq!(graph.check_degree(0), 2);
        // No edges at all
        let graph = TannerGraph::new(2, 2, &[]).unwrap();
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.satisfies_all_checks(&[One, One]));
    }

    #[test]
    fn test_from_float_indices() {
        // Invalid input
        assert!(TannerGraph::from_float_indices(3, 2, &[-1.0]).is_err());
        assert!(TannerGraph::from_float_indices(3, 2, &[1.5]).is_err());
        assert!(TannerGraph::from_float_indices(3, 2, &[f64::NAN]).is_err());
        assert!(TannerGraph::from_float_indices(3, 2, &[f64::INFINITY]).is_err());
        assert!(TannerGraph::from_float_indices(3, 2, &[6.0]).is_err());
        // Valid input
        assert_eq!(
            TannerGraph::from_float_indices(3, 2, &[0.0, 1.0, 2.0, 5.0]).unwrap(),
            TannerGraph::new(3, 2, &[0, 1, 2, 5]).unwrap()
        );
    }

    #[test]
    fn test_from_parity_check_matrix() {
        // Invalid input
        assert!(TannerGraph::from_parity_check_matrix(&[]).is_err());
        assert!(TannerGraph::from_parity_check_matrix(&[vec![]]).is_err());
        assert!(TannerGraph::from_parity_check_matrix(&[vec![One, One], vec![One]]).is_err());
        // Valid input
        let graph = hamming_graph();
        assert_eq!(graph.num_bits(), 7);
        assert_eq!(graph.num_checks(), 3);
        assert_eq!(graph.num_edges(), 12);
        assert_eq!(
            (0 .. 7).map(|b| graph.bit_degree(b)).collect::<Vec<_>>(),
            [3, 2, 2, 2, 1, 1, 1]
        );
        assert_eq!(
            (0 .. 3).map(|c| graph.check_degree(c)).collect::<Vec<_>>(),
            [4, 4, 4]
        );
        assert_eq!(
            graph,
            TannerGraph::new(7, 3, &[0, 1, 2, 3, 4, 6, 8, 10, 11, 12, 16, 20]).unwrap()
        );
    }

    #[test]
    fn test_every_edge_in_one_list_per_category() {
        let graph = hamming_graph();
        let mut bit_edges: Vec<usize> = (0 .. graph.num_bits())
            .flat_map(|b| graph.edges_of_bit(b).to_vec())
            .collect();
        let mut check_edges: Vec<usize> = (0 .. graph.num_checks())
            .flat_map(|c| graph.edges_of_check(c).to_vec())
            .collect();
        bit_edges.sort_unstable();
        check_edges.sort_unstable();
        assert_eq!(bit_edges, (0 .. graph.num_edges()).collect::<Vec<_>>());
        assert_eq!(check_edges, (0 .. graph.num_edges()).collect::<Vec<_>>());
        for edge in 0 .. graph.num_edges() {
            assert!(graph
                .edges_of_bit(graph.bit_of_edge(edge))
                .contains(&edge));
            assert!(graph
                .edges_of_check(graph.check_of_edge(edge))
                .contains(&edge));
        }
    }

    #[test]
    fn test_satisfies_all_checks() {
        let graph = hamming_graph();
        assert!(graph.satisfies_all_checks(&[Zero; 7]));
        assert!(graph.satisfies_all_checks(&[One, Zero, Zero, Zero, One, One, One]));
        assert!(!graph.satisfies_all_checks(&[One, Zero, Zero, Zero, One, One, Zero]));
    }

    #[test]
    fn test_num_unsatisfied_checks() {
        let graph = hamming_graph();
        assert_eq!(graph.num_unsatisfied_checks(&[Zero; 7]), 0);
        assert_eq!(
            graph.num_unsatisfied_checks(&[One, Zero, Zero, Zero, Zero, Zero, Zero]),
            3
        );
        assert_eq!(
            graph.num_unsatisfied_checks(&[Zero, Zero, Zero, Zero, One, Zero, Zero]),
            1
        );
    }

    #[test]
    fn test_linear_index() {
        assert_eq!(linear_index(2, 0, 0), 0);
        assert_eq!(linear_index(2, 0, 1), 1);
        assert_eq!(linear_index(2, 1, 0), 2);
        assert_eq!(linear_index(3, 6, 2), 20);
    }

    #[test]
    fn test_check_num_nodes() {
        assert!(check_num_nodes(0, 1).is_err());
        assert!(check_num_nodes(1, 0).is_err());
        assert!(check_num_nodes(usize::MAX, usize::MAX).is_err());
        assert_eq!(check_num_nodes(3, 2).unwrap(), 6);
    }
}
