//! Symmetries of the background, as subgroups of the
//! [dihedral group _D_<sub>8</sub>](https://en.wikipedia.org/wiki/Examples_of_groups#dihedral_group_of_order_8).
//!
//! A symmetric background is searched by replicating every assignment
//! over the orbit of the assigned cell.

use crate::cells::Coord;
use educe::Educe;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transformations (rotations and reflections) of the world.
///
/// `R` means rotations around the center of the world.
/// The number after it is the counterclockwise rotation angle in degrees.
///
/// `F` means reflections (flips).
/// The symbol after it is the axis of reflection.
///
/// Rotations by 90° and diagonal flips are only valid when the world
/// is square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    /// `R90`.
    Rotate90,
    /// `R180`.
    Rotate180,
    /// `R270`.
    Rotate270,
    /// `F-`.
    ///
    /// Reflection across the middle row.
    FlipRow,
    /// `F|`.
    ///
    /// Reflection across the middle column.
    FlipCol,
    /// `F\`.
    ///
    /// Reflection across the diagonal.
    FlipDiag,
    /// `F/`.
    ///
    /// Reflection across the antidiagonal.
    FlipAntidiag,
}

impl Display for Transform {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        let s = match self {
            Transform::Rotate90 => "R90",
            Transform::Rotate180 => "R180",
            Transform::Rotate270 => "R270",
            Transform::FlipRow => "F-",
            Transform::FlipCol => "F|",
            Transform::FlipDiag => "F\\",
            Transform::FlipAntidiag => "F/",
        };
        write!(f, "{}", s)?;
        Ok(())
    }
}

impl Transform {
    /// Applies the transformation on a coordinate of a world
    /// with the given height and width.
    pub fn act_on(self, (row, col): Coord, height: i32, width: i32) -> Coord {
        match self {
            Transform::Rotate90 => (width - 1 - col, row),
            Transform::Rotate180 => (height - 1 - row, width - 1 - col),
            Transform::Rotate270 => (col, height - 1 - row),
            Transform::FlipRow => (height - 1 - row, col),
            Transform::FlipCol => (row, width - 1 - col),
            Transform::FlipDiag => (col, row),
            Transform::FlipAntidiag => (width - 1 - col, height - 1 - row),
        }
    }
}

/// Symmetries of the background.
///
/// The notations are stolen from Oscar Cunningham's
/// [Logic Life Search](https://github.com/OscarCunningham/logic-life-search).
/// Please see the [Life Wiki](https://conwaylife.com/wiki/Symmetry) for details.
///
/// Some of the symmetries are only valid when the world is square.
#[derive(Clone, Copy, Debug, Educe, PartialEq, Eq, Hash)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symmetry {
    /// `C1`.
    ///
    /// No symmetry at all.
    #[educe(Default)]
    C1,
    /// `C2`.
    ///
    /// Symmetry under 180° rotation.
    C2,
    /// `C4`.
    ///
    /// Symmetry under 90° rotation.
    C4,
    /// `D2-`.
    ///
    /// Symmetry under reflection across the middle row.
    #[cfg_attr(feature = "serde", serde(rename = "D2-"))]
    D2Row,
    /// `D2|`.
    ///
    /// Symmetry under reflection across the middle column.
    #[cfg_attr(feature = "serde", serde(rename = "D2|"))]
    D2Col,
    /// `D2\`.
    ///
    /// Symmetry under reflection across the diagonal.
    #[cfg_attr(feature = "serde", serde(rename = "D2\\"))]
    D2Diag,
    /// `D4+`.
    ///
    /// Symmetry under reflections across the middle row
    /// and the middle column.
    #[cfg_attr(feature = "serde", serde(rename = "D4+"))]
    D4Ortho,
    /// `D4X`.
    ///
    /// Symmetry under reflections across both diagonals.
    #[cfg_attr(feature = "serde", serde(rename = "D4X"))]
    D4Diag,
    /// `D8`.
    ///
    /// Symmetry under all 8 transformations.
    D8,
}

impl FromStr for Symmetry {
    type Err = String;

    /// Besides the usual notations, accepts the names `horsymm`, `versymm`,
    /// `diagsymm`, `rot2symm`, `rot4symm`, `plussymm`, `xsymm` and
    /// `fullsymm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C1" | "nosymm" => Ok(Symmetry::C1),
            "C2" | "rot2symm" => Ok(Symmetry::C2),
            "C4" | "rot4symm" => Ok(Symmetry::C4),
            "D2-" | "horsymm" => Ok(Symmetry::D2Row),
            "D2|" | "versymm" => Ok(Symmetry::D2Col),
            "D2\\" | "diagsymm" => Ok(Symmetry::D2Diag),
            "D4+" | "plussymm" => Ok(Symmetry::D4Ortho),
            "D4X" | "xsymm" => Ok(Symmetry::D4Diag),
            "D8" | "fullsymm" => Ok(Symmetry::D8),
            _ => Err(String::from("invalid symmetry")),
        }
    }
}

impl Display for Symmetry {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        let s = match self {
            Symmetry::C1 => "C1",
            Symmetry::C2 => "C2",
            Symmetry::C4 => "C4",
            Symmetry::D2Row => "D2-",
            Symmetry::D2Col => "D2|",
            Symmetry::D2Diag => "D2\\",
            Symmetry::D4Ortho => "D4+",
            Symmetry::D4Diag => "D4X",
            Symmetry::D8 => "D8",
        };
        write!(f, "{}", s)?;
        Ok(())
    }
}

impl Symmetry {
    /// Whether this symmetry requires the world to be square.
    ///
    /// Returns `true` for `C4`, `D2\`, `D4X` and `D8`.
    pub fn square_world(self) -> bool {
        matches!(
            self,
            Symmetry::C4 | Symmetry::D2Diag | Symmetry::D4Diag | Symmetry::D8
        )
    }

    /// Whether the symmetry may be combined with day/night replication,
    /// where the image of a cell takes the opposite state.
    ///
    /// Returns `true` for `D2-`, `D2|` and `C2`.
    pub fn day_night(self) -> bool {
        matches!(self, Symmetry::D2Row | Symmetry::D2Col | Symmetry::C2)
    }

    /// Non-identity transformations of the symmetry group,
    /// in the order assignments are replicated.
    pub fn images(self) -> &'static [Transform] {
        use Transform::*;
        match self {
            Symmetry::C1 => &[],
            Symmetry::C2 => &[Rotate180],
            Symmetry::C4 => &[Rotate90, Rotate180, Rotate270],
            Symmetry::D2Row => &[FlipRow],
            Symmetry::D2Col => &[FlipCol],
            Symmetry::D2Diag => &[FlipDiag],
            Symmetry::D4Ortho => &[FlipRow, Rotate180, FlipCol],
            Symmetry::D4Diag => &[FlipDiag, Rotate180, FlipAntidiag],
            Symmetry::D8 => &[
                FlipCol,
                FlipRow,
                Rotate180,
                FlipDiag,
                Rotate270,
                Rotate90,
                FlipAntidiag,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbits_are_closed() {
        // Square world, so every group acts.
        let n = 9;
        for sym in [
            Symmetry::C2,
            Symmetry::C4,
            Symmetry::D2Row,
            Symmetry::D2Col,
            Symmetry::D2Diag,
            Symmetry::D4Ortho,
            Symmetry::D4Diag,
            Symmetry::D8,
        ] {
            let coord = (2, 5);
            let mut orbit = vec![coord];
            orbit.extend(sym.images().iter().map(|t| t.act_on(coord, n, n)));
            for &image in &orbit {
                for t in sym.images() {
                    assert!(orbit.contains(&t.act_on(image, n, n)), "{}", sym);
                }
            }
        }
    }

    #[test]
    fn rotations() {
        assert_eq!(Transform::Rotate90.act_on((0, 1), 5, 5), (3, 0));
        assert_eq!(Transform::Rotate270.act_on((3, 0), 5, 5), (0, 1));
        assert_eq!(Transform::Rotate180.act_on((0, 1), 5, 7), (4, 5));
        assert_eq!(Transform::FlipRow.act_on((1, 2), 6, 9), (4, 2));
    }

    #[test]
    fn parse() {
        assert_eq!("D2-".parse::<Symmetry>(), Ok(Symmetry::D2Row));
        assert_eq!("horsymm".parse::<Symmetry>(), Ok(Symmetry::D2Row));
        assert_eq!("fullsymm".parse::<Symmetry>(), Ok(Symmetry::D8));
        assert!("D2/".parse::<Symmetry>().is_err());
        assert_eq!(Symmetry::D4Ortho.to_string(), "D4+");
    }
}
