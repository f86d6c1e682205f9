use crate::rope::{Iter, Rope};
use crate::symbol::{Base, InvalidSymbol};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Failure while loading a textual program file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program file")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] InvalidSymbol),
}

/// An immutable symbol sequence backed by a persistent rope.
///
/// `Dna` is value-like: every operation returns a new sequence and never
/// disturbs existing ones, so the VM, capture blocks and emitted quanta can
/// all share structure freely.
#[derive(Clone)]
pub struct Dna {
    pub(crate) rope: Rope<Base>,
}

impl Dna {
    pub fn empty() -> Dna {
        Dna {
            rope: Rope::empty(),
        }
    }

    pub fn from_symbols(symbols: Vec<Base>) -> Dna {
        Dna {
            rope: Rope::new(symbols),
        }
    }

    /// Reads a program file and prepends a loader prefix, both in the
    /// four-character textual alphabet. A trailing newline in the file is
    /// tolerated.
    pub fn load(prefix: &str, path: impl AsRef<Path>) -> Result<Dna, LoadError> {
        let body = std::fs::read_to_string(path)?;
        let prefix: Dna = prefix.parse()?;
        let body: Dna = body.trim_end().parse()?;
        Ok(prefix.concat(&body))
    }

    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// Rope height, exposed for progress diagnostics.
    pub fn height(&self) -> usize {
        self.rope.height()
    }

    /// Symbol at `index`; panics when out of range.
    pub fn get(&self, index: usize) -> Base {
        self.rope.get(index)
    }

    /// End-exclusive substring, clamped: `end` is capped at the sequence
    /// length and an empty range yields the empty sequence. This is the call
    /// pattern every consumer outside the rope relies on.
    pub fn substring(&self, start: usize, end: usize) -> Dna {
        let end = end.min(self.len());
        if start >= end {
            return Dna::empty();
        }
        Dna {
            rope: self.rope.substring(start, end - start),
        }
    }

    /// Everything from `start` to the end of the sequence.
    pub fn suffix(&self, start: usize) -> Dna {
        self.substring(start, self.len())
    }

    pub fn concat(&self, other: &Dna) -> Dna {
        Dna {
            rope: self.rope.concat(&other.rope),
        }
    }

    pub fn iter(&self) -> Iter<'_, Base> {
        self.rope.iter()
    }

    /// Iterates from `start` without touching the skipped prefix.
    pub fn iter_from(&self, start: usize) -> Iter<'_, Base> {
        self.rope.iter_from(start)
    }

    pub fn to_symbols(&self) -> Vec<Base> {
        self.rope.to_vec()
    }

    /// Quotes the sequence one level: I→C, C→F, F→P, P→IC.
    pub fn quote(&self) -> Dna {
        let mut out = Vec::with_capacity(self.len());
        for b in self.iter() {
            out.extend_from_slice(b.quoted());
        }
        Dna::from_symbols(out)
    }

    /// Applies [`quote`](Dna::quote) `level` times, short-circuiting once the
    /// sequence is empty.
    pub fn protect(&self, level: usize) -> Dna {
        let mut dna = self.clone();
        for _ in 0..level {
            if dna.is_empty() {
                break;
            }
            dna = dna.quote();
        }
        dna
    }

    /// Encodes a number as little-endian I(0)/C(1) bits terminated by P.
    /// Zero encodes as just "P".
    pub fn encode_nat(mut n: usize) -> Dna {
        let mut out = Vec::new();
        while n != 0 {
            out.push(if n % 2 == 0 { Base::I } else { Base::C });
            n /= 2;
        }
        out.push(Base::P);
        Dna::from_symbols(out)
    }

    /// Knuth-Morris-Pratt search for `needle` at or after `start`.
    ///
    /// Returns the offset relative to `start` of one past the end of the
    /// first occurrence, or `None` if the needle does not occur. The empty
    /// needle matches immediately at `start`.
    pub fn find_end_index(&self, start: usize, needle: &[Base]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        let pi = prefix_function(needle);
        let mut matched = 0;
        let mut scanned = 0;
        for b in self.iter_from(start) {
            if b == needle[matched] {
                matched += 1;
            } else {
                while matched > 0 && b != needle[matched] {
                    matched = pi[matched - 1];
                }
                if b == needle[matched] {
                    matched += 1;
                }
            }
            scanned += 1;
            if matched == needle.len() {
                return Some(scanned);
            }
        }
        None
    }
}

/// KMP failure table: pi[i] is the length of the longest proper prefix of
/// needle[..=i] that is also a suffix of it.
fn prefix_function(needle: &[Base]) -> Vec<usize> {
    let mut pi = vec![0; needle.len()];
    for i in 1..needle.len() {
        let mut j = pi[i - 1];
        while j > 0 && needle[i] != needle[j] {
            j = pi[j - 1];
        }
        if needle[i] == needle[j] {
            j += 1;
        }
        pi[i] = j;
    }
    pi
}

impl FromStr for Dna {
    type Err = InvalidSymbol;

    fn from_str(s: &str) -> Result<Dna, InvalidSymbol> {
        let symbols = s
            .chars()
            .map(Base::from_char)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dna::from_symbols(symbols))
    }
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.iter() {
            write!(f, "{}", b.to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dna(\"{self}\")")
    }
}

impl PartialEq for Dna {
    fn eq(&self, other: &Dna) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Dna {}
