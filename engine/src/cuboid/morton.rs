//! Morton-order (Z-curve) block identifiers
//!
//! Cuboids within one resolution level are addressed by the Morton encoding of
//! their 3-D block coordinate: 21 interleaved triads of one bit per axis, X in
//! the lowest bit of each triad.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bits encoded per axis; coordinates above `2^21 - 1` do not round-trip
const TRIADS: u32 = 21;

/// Space-filling-curve identifier of a cuboid's block coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct MortonId(pub u64);

impl MortonId {
    /// Interleave an `[x, y, z]` block coordinate into a Morton id
    pub fn from_xyz(xyz: [u64; 3]) -> Self {
        let [x, y, z] = xyz;
        let mut morton = 0u64;
        let mut mask = 1u64;
        for i in 0..TRIADS {
            morton |= (x & mask) << (2 * i);
            morton |= (y & mask) << (2 * i + 1);
            morton |= (z & mask) << (2 * i + 2);
            mask <<= 1;
        }
        MortonId(morton)
    }

    /// De-interleave back to the `[x, y, z]` block coordinate
    pub fn xyz(self) -> [u64; 3] {
        let mut xyz = [0u64; 3];
        let mut morton = self.0;
        for i in 0..TRIADS {
            xyz[0] |= (morton & 0x1) << i;
            xyz[1] |= ((morton & 0x2) >> 1) << i;
            xyz[2] |= ((morton & 0x4) >> 2) << i;
            morton >>= 3;
        }
        xyz
    }
}

impl fmt::Display for MortonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_zero() {
        assert_eq!(MortonId::from_xyz([0, 0, 0]), MortonId(0));
    }

    #[test]
    fn test_axis_bit_order() {
        // x occupies bit 0 of each triad, then y, then z
        assert_eq!(MortonId::from_xyz([1, 0, 0]), MortonId(1));
        assert_eq!(MortonId::from_xyz([0, 1, 0]), MortonId(2));
        assert_eq!(MortonId::from_xyz([0, 0, 1]), MortonId(4));
        assert_eq!(MortonId::from_xyz([1, 1, 1]), MortonId(7));
    }

    #[test]
    fn test_round_trip() {
        for xyz in [[3, 5, 7], [1024, 0, 33], [0x1F_FFFF, 0x1F_FFFF, 0x1F_FFFF]] {
            assert_eq!(MortonId::from_xyz(xyz).xyz(), xyz);
        }
    }

    #[test]
    fn test_locality_of_siblings() {
        // The eight children of a 2x2x2 block group are contiguous
        let mut ids: Vec<u64> = Vec::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    ids.push(MortonId::from_xyz([x, y, z]).0);
                }
            }
        }
        ids.sort_unstable();
        assert_eq!(ids, (0..8).collect::<Vec<u64>>());
    }
}
