//! Life-like rules.
//!
//! For the notations of rule strings, please see
//! [this article on LifeWiki](https://conwaylife.com/wiki/Rulestring).

mod table;

use crate::error::Error;
use ca_rules::ParseLife;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

pub use table::{Implication, RuleTables};

/// A totalistic Life-like rule, `Bx/Sy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    /// `birth[n]`: a dead cell with `n` alive neighbors becomes alive.
    birth: [bool; 9],
    /// `survival[n]`: an alive cell with `n` alive neighbors stays alive.
    survival: [bool; 9],
}

impl Rule {
    /// Constructs a new rule from the `b` and `s` data.
    pub fn new(b: &[u8], s: &[u8]) -> Self {
        let mut birth = [false; 9];
        let mut survival = [false; 9];
        for &n in b.iter().filter(|&&n| n <= 8) {
            birth[n as usize] = true;
        }
        for &n in s.iter().filter(|&&n| n <= 8) {
            survival[n as usize] = true;
        }
        Rule { birth, survival }
    }

    /// Whether a dead cell with `n` alive neighbors is born.
    #[inline]
    pub fn birth(&self, n: usize) -> bool {
        self.birth[n]
    }

    /// Whether an alive cell with `n` alive neighbors survives.
    #[inline]
    pub fn survival(&self, n: usize) -> bool {
        self.survival[n]
    }

    /// Whether the rule contains `B0`.
    pub fn has_b0(&self) -> bool {
        self.birth[0]
    }
}

/// A parser for the rule.
impl ParseLife for Rule {
    fn from_bs(b: Vec<u8>, s: Vec<u8>) -> Self {
        Self::new(&b, &s)
    }
}

impl FromStr for Rule {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let rule: Rule = ParseLife::parse_rule(input).map_err(Error::ParseRule)?;
        if rule.has_b0() {
            Err(Error::B0Rule)
        } else {
            Ok(rule)
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        write!(f, "B")?;
        for n in (0..=8).filter(|&n| self.birth[n]) {
            write!(f, "{}", n)?;
        }
        write!(f, "/S")?;
        for n in (0..=8).filter(|&n| self.survival[n]) {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() -> Result<(), Error> {
        let rule: Rule = "S23/B3".parse()?;
        assert_eq!(rule.to_string(), "B3/S23");
        assert!(rule.birth(3));
        assert!(!rule.survival(4));
        assert_eq!("B36/S23".parse::<Rule>()?.to_string(), "B36/S23");
        Ok(())
    }

    #[test]
    fn reject_b0() {
        assert_eq!("B0/S8".parse::<Rule>(), Err(Error::B0Rule));
        assert!(matches!(
            "Q3/X23".parse::<Rule>(),
            Err(Error::ParseRule(_))
        ));
    }
}
