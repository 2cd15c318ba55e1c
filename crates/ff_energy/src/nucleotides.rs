//! The RNA alphabet.
//!
//! Sequences are parsed case-insensitively, but the case is not thrown
//! away: lowercase positions are marked as unable to pair, which is the
//! customary way to exclude regions (e.g. primer sites) from folding.

use std::fmt;
use std::ops::Deref;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Base {
    A = 0,
    C = 1,
    G = 2,
    U = 3,
}

/// Size of the alphabet; every parameter table dimension has this extent.
pub const NBASES: usize = 4;

impl Base {
    pub const ALL: [Base; NBASES] = [Base::A, Base::C, Base::G, Base::U];

    /// Index into parameter tables.
    #[inline]
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn from_idx(i: usize) -> Base {
        Self::ALL[i]
    }
}

impl TryFrom<char> for Base {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Base::A),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            'U' | 'T' => Ok(Base::U),
            _ => Err(c),
        }
    }
}

impl From<Base> for char {
    fn from(b: Base) -> char {
        match b {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::U => 'U',
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Watson-Crick or GU wobble pair.
#[inline]
pub fn is_canonical_pair(a: Base, b: Base) -> bool {
    use Base::*;
    matches!((a, b), (A, U) | (U, A) | (G, C) | (C, G) | (G, U) | (U, G))
}

/// AU/UA/GU/UG, the pairs that carry a terminal penalty.
#[inline]
pub fn is_weak_pair(a: Base, b: Base) -> bool {
    is_canonical_pair(a, b) && (a == Base::U || b == Base::U)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("invalid nucleotide '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
}

/// A parsed RNA sequence plus a per-position pairing mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NucleotideVec {
    bases: Vec<Base>,
    pairable: Vec<bool>,
}

impl NucleotideVec {
    pub fn new(bases: Vec<Base>) -> Self {
        let pairable = vec![true; bases.len()];
        NucleotideVec { bases, pairable }
    }

    /// False for positions given in lowercase.
    pub fn is_pairable(&self, i: usize) -> bool {
        self.pairable[i]
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }
}

impl Deref for NucleotideVec {
    type Target = [Base];

    fn deref(&self) -> &[Base] {
        &self.bases
    }
}

impl TryFrom<&str> for NucleotideVec {
    type Error = SequenceError;

    fn try_from(seq: &str) -> Result<Self, Self::Error> {
        let mut bases = Vec::with_capacity(seq.len());
        let mut pairable = Vec::with_capacity(seq.len());
        for (position, symbol) in seq.trim().chars().enumerate() {
            let b = Base::try_from(symbol)
                .map_err(|symbol| SequenceError::InvalidSymbol { symbol, position })?;
            bases.push(b);
            pairable.push(!symbol.is_ascii_lowercase());
        }
        Ok(NucleotideVec { bases, pairable })
    }
}

impl fmt::Display for NucleotideVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (b, &p) in self.bases.iter().zip(&self.pairable) {
            let c = char::from(*b);
            write!(f, "{}", if p { c } else { c.to_ascii_lowercase() })?;
        }
        Ok(())
    }
}
