//! Messages exchanged between the bit nodes and check nodes of a Tanner graph

/// Storage for all messages used by the decoder
///
/// All buffers are allocated once, zero-initialized, and sized by the numbers of bit nodes, check
/// nodes and edges of the graph. Per-edge buffers are indexed by edge index.
#[derive(Clone, PartialEq, Debug)]
pub struct MessageStore {
    /// Channel LLR value for each bit node
    channel: Vec<f64>,
    /// Total LLR value for each bit node
    bit: Vec<f64>,
    /// Product of incoming bit-to-check messages for each check node (tanh-half domain)
    check: Vec<f64>,
    /// Bit-to-check message for each edge (tanh-half domain)
    bit_to_check: Vec<f64>,
    /// Check-to-bit message for each edge (LLR domain)
    check_to_bit: Vec<f64>,
}

impl MessageStore {
    /// Returns zero-initialized message store.
    pub(crate) fn new(num_bits: usize, num_checks: usize, num_edges: usize) -> Self {
        Self {
            channel: vec![0.0; num_bits],
            bit: vec![0.0; num_bits],
            check: vec![0.0; num_checks],
            bit_to_check: vec![0.0; num_edges],
            check_to_bit: vec![0.0; num_edges],
        }
    }

    /// Saves channel LLR values, and uses them as the initial bit LLR values.
    pub(crate) fn load_channel(&mut self, channel_llr: &[f64]) {
        self.channel.copy_from_slice(channel_llr);
        self.bit.copy_from_slice(channel_llr);
    }

    /// Resets all check-to-bit messages to zero.
    pub(crate) fn clear_check_to_bit(&mut self) {
        self.check_to_bit.fill(0.0);
    }

    /// Returns channel LLR values.
    #[must_use]
    pub fn channel(&self) -> &[f64] {
        &self.channel
    }

    /// Returns total LLR values of all bit nodes.
    #[must_use]
    pub fn bit(&self) -> &[f64] {
        &self.bit
    }

    /// Returns messages of all check nodes, in the tanh-half domain.
    #[must_use]
    pub fn check(&self) -> &[f64] {
        &self.check
    }

    /// Returns bit-to-check messages of all edges, in the tanh-half domain.
    #[must_use]
    pub fn bit_to_check(&self) -> &[f64] {
        &self.bit_to_check
    }

    /// Returns check-to-bit messages of all edges.
    #[must_use]
    pub fn check_to_bit(&self) -> &[f64] {
        &self.check_to_bit
    }

    /// Returns buffers read and written by the check node update.
    pub(crate) fn check_update_buffers(&mut self) -> (&[f64], &[f64], &mut [f64], &mut [f64]) {
        (
            &self.bit,
            &self.check_to_bit,
            &mut self.bit_to_check,
            &mut self.check,
        )
    }

    /// Returns buffers read and written by the bit node update.
    pub(crate) fn bit_update_buffers(
        &mut self,
    ) -> (&[f64], &[f64], &[f64], &mut [f64], &mut [f64]) {
        (
            &self.channel,
            &self.check,
            &self.bit_to_check,
            &mut self.check_to_bit,
            &mut self.bit,
        )
    }
}
