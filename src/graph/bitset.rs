use std::fmt;
use std::fmt::{Debug, Formatter};

use bitvec::prelude::*;

use super::{Node, NumNodes};

/// Fixed-size bit set with a cached cardinality. Rows of the K-hop reach
/// matrix are stored as one `BitSet` per source vertex, so `tree_size`
/// queries reduce to a cardinality lookup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    cardinality: NumNodes,
    bits: BitVec,
}

impl Debug for BitSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let values: Vec<_> = self.iter_set_bits().map(|i| i.to_string()).collect();
        write!(
            f,
            "BitSet {{ cardinality: {}, bits: [{}] }}",
            self.cardinality,
            values.join(", ")
        )
    }
}

impl BitSet {
    pub fn new(size: NumNodes) -> Self {
        Self {
            cardinality: 0,
            bits: bitvec![0; size as usize],
        }
    }

    pub fn len(&self) -> NumNodes {
        self.bits.len() as NumNodes
    }

    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    pub fn cardinality(&self) -> NumNodes {
        self.cardinality
    }

    /// Sets the bit and returns *true* if it was previously unset.
    pub fn set_bit(&mut self, idx: Node) -> bool {
        let newly_set = !self.bits.replace(idx as usize, true);
        self.cardinality += newly_set as NumNodes;
        newly_set
    }

    /// Unsets the bit and returns *true* if it was previously set.
    pub fn unset_bit(&mut self, idx: Node) -> bool {
        let was_set = self.bits.replace(idx as usize, false);
        self.cardinality -= was_set as NumNodes;
        was_set
    }

    #[inline(always)]
    pub fn get_bit(&self, idx: Node) -> bool {
        self.bits[idx as usize]
    }

    pub fn unset_all(&mut self) {
        self.bits.fill(false);
        self.cardinality = 0;
    }

    pub fn iter_set_bits(&self) -> impl Iterator<Item = Node> + '_ {
        self.bits.iter_ones().map(|i| i as Node)
    }
}

impl FromIterator<Node> for BitSet {
    /// Collects indices into a bit set sized to the largest index + 1.
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let indices: Vec<Node> = iter.into_iter().collect();
        let size = indices.iter().max().map_or(0, |&m| m + 1);
        let mut set = Self::new(size);
        for idx in indices {
            set.set_bit(idx);
        }
        set
    }
}
