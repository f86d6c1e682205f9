use thiserror::Error;

/// The four-letter alphabet every sequence, pattern and template is built
/// from.
///
/// Replaces raw byte constants with a closed enum so the decode grammar can
/// be matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    I,
    C,
    F,
    P,
}

/// A character outside the `I`/`C`/`F`/`P` source alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid symbol {0:?}, expected one of I, C, F, P")]
pub struct InvalidSymbol(pub char);

impl Base {
    /// Parses one character of the textual program format.
    pub fn from_char(c: char) -> Result<Base, InvalidSymbol> {
        match c {
            'I' => Ok(Base::I),
            'C' => Ok(Base::C),
            'F' => Ok(Base::F),
            'P' => Ok(Base::P),
            other => Err(InvalidSymbol(other)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Base::I => 'I',
            Base::C => 'C',
            Base::F => 'F',
            Base::P => 'P',
        }
    }

    /// The quote expansion of a single symbol: I→C, C→F, F→P, P→IC.
    ///
    /// P is the only symbol that grows under quoting.
    pub fn quoted(self) -> &'static [Base] {
        match self {
            Base::I => &[Base::C],
            Base::C => &[Base::F],
            Base::F => &[Base::P],
            Base::P => &[Base::I, Base::C],
        }
    }

    /// The single-symbol unquote used by constant runs: C→I, F→C, P→F.
    ///
    /// `I` has no single-symbol unquote (it opens the two-symbol escape), so
    /// callers must branch on it before calling this.
    pub(crate) fn unquoted(self) -> Base {
        match self {
            Base::C => Base::I,
            Base::F => Base::C,
            Base::P => Base::F,
            Base::I => unreachable!("I starts a two-symbol escape in constant runs"),
        }
    }
}
