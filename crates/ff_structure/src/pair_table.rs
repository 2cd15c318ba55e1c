//! PairTable: the partner-array representation of a secondary structure.
//!
//! Position `i` holds `Some(j)` if `i` is paired with `j`, `None` otherwise.
//! Unlike plain dot-bracket strings, a PairTable can hold crossing pairs
//! (pseudoknots), which is what greedy probability-based extraction tends
//! to produce. Dot-bracket conversion therefore uses up to four bracket
//! levels: `()`, `[]`, `{}` and `<>`.
//!

use std::fmt;
use std::ops::Index;

use crate::NAIDX;
use crate::StructureError;

const BRACKETS: [(char, char); 4] = [('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairTable(Vec<Option<NAIDX>>);

impl PairTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<NAIDX>> {
        self.0.iter()
    }

    pub fn partner(&self, i: usize) -> Option<usize> {
        self.0[i].map(|j| j as usize)
    }

    /// Number of base pairs (not paired positions).
    pub fn pair_count(&self) -> usize {
        self.0.iter().filter(|p| p.is_some()).count() / 2
    }

    /// Partner array where an unpaired position points to itself.
    pub fn to_partners(&self) -> Vec<usize> {
        self.0.iter()
            .enumerate()
            .map(|(i, p)| p.map_or(i, |j| j as usize))
            .collect()
    }

    fn first_crossing(&self) -> Option<(usize, usize, usize, usize)> {
        let pairs: Vec<(usize, usize)> = self.0.iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|j| (i, j as usize)))
            .filter(|&(i, j)| i < j)
            .collect();
        for (a, &(i, j)) in pairs.iter().enumerate() {
            for &(k, l) in &pairs[a + 1..] {
                if i < k && k < j && j < l {
                    return Some((i, j, k, l));
                }
            }
        }
        None
    }

    /// Dot-bracket string, assigning crossing pairs to higher bracket levels.
    pub fn to_dotbracket(&self) -> Result<String, StructureError> {
        let n = self.len();
        let mut chars = vec!['.'; n];
        // Open pairs per level, innermost last.
        let mut levels: Vec<Vec<usize>> = vec![Vec::new(); BRACKETS.len()];
        let mut level_of = vec![usize::MAX; n];

        for i in 0..n {
            let Some(j) = self.partner(i) else { continue };
            if j > i {
                // A pair fits on a level if it nests inside that level's top pair.
                let lvl = levels.iter().position(|open| {
                    open.last().is_none_or(|&top| {
                        self.partner(top).is_some_and(|tj| j < tj)
                    })
                });
                let Some(lvl) = lvl else {
                    let (a, b, c, d) = self.first_crossing().unwrap_or((i, j, i, j));
                    return Err(StructureError::Pseudoknot(a, b, c, d));
                };
                levels[lvl].push(i);
                level_of[i] = lvl;
                chars[i] = BRACKETS[lvl].0;
            } else {
                let lvl = level_of[j];
                if levels[lvl].last() != Some(&j) {
                    let (a, b, c, d) = self.first_crossing().unwrap_or((j, i, j, i));
                    return Err(StructureError::Pseudoknot(a, b, c, d));
                }
                levels[lvl].pop();
                chars[i] = BRACKETS[lvl].1;
            }
        }
        Ok(chars.into_iter().collect())
    }
}

impl Index<usize> for PairTable {
    type Output = Option<NAIDX>;

    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(db: &str) -> Result<Self, Self::Error> {
        let n = db.chars().count();
        if n >= NAIDX::MAX as usize {
            return Err(StructureError::TooLong(n));
        }
        let mut table = vec![None; n];
        let mut stacks: Vec<Vec<usize>> = vec![Vec::new(); BRACKETS.len()];

        for (i, c) in db.chars().enumerate() {
            if c == '.' {
                continue;
            }
            if let Some(lvl) = BRACKETS.iter().position(|&(o, _)| o == c) {
                stacks[lvl].push(i);
            } else if let Some(lvl) = BRACKETS.iter().position(|&(_, cl)| cl == c) {
                let j = stacks[lvl].pop().ok_or(StructureError::UnmatchedBracket(c, i))?;
                table[i] = Some(j as NAIDX);
                table[j] = Some(i as NAIDX);
            } else {
                return Err(StructureError::InvalidToken(c));
            }
        }
        for (lvl, open) in stacks.iter().enumerate() {
            if let Some(&i) = open.last() {
                return Err(StructureError::UnmatchedBracket(BRACKETS[lvl].0, i));
            }
        }
        Ok(PairTable(table))
    }
}

impl TryFrom<&[usize]> for PairTable {
    type Error = StructureError;

    /// From a partner array where `partners[i] == i` means unpaired.
    fn try_from(partners: &[usize]) -> Result<Self, Self::Error> {
        let n = partners.len();
        if n >= NAIDX::MAX as usize {
            return Err(StructureError::TooLong(n));
        }
        let mut table = vec![None; n];
        for (i, &j) in partners.iter().enumerate() {
            if j >= n {
                return Err(StructureError::OutOfRange(j, n));
            }
            if j == i {
                continue;
            }
            if partners[j] != i {
                return Err(StructureError::Asymmetric(i));
            }
            table[i] = Some(j as NAIDX);
        }
        Ok(PairTable(table))
    }
}

impl fmt::Display for PairTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_dotbracket() {
            Ok(db) => write!(f, "{db}"),
            Err(_) => write!(f, "<pseudoknotted structure of length {}>", self.len()),
        }
    }
}
