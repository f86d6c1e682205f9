use crate::dna::Dna;
use crate::rope::Iter;
use crate::symbol::Base;

/// Maximum push-back depth. The constant-run decoder undoes at most one
/// two-symbol escape, so deeper nesting never occurs.
const MAX_PUSH_BACK: usize = 2;

/// Forward-only decoder over a sequence.
///
/// Tracks how many symbols were consumed so the caller can split the decoded
/// head from the remaining tail. Pushed-back symbols were already counted on
/// their first read and are not recounted when re-read; symbols still in the
/// push-back buffer at finalize time therefore count as consumed.
pub struct Reader<'a> {
    iter: Iter<'a, Base>,
    consumed: usize,
    back: [Base; MAX_PUSH_BACK],
    back_len: usize,
}

impl<'a> Reader<'a> {
    pub fn new(dna: &'a Dna) -> Reader<'a> {
        Reader {
            iter: dna.iter(),
            consumed: 0,
            back: [Base::I; MAX_PUSH_BACK],
            back_len: 0,
        }
    }

    /// Next symbol, or `None` once the sequence is exhausted.
    pub fn read(&mut self) -> Option<Base> {
        if self.back_len > 0 {
            self.back_len -= 1;
            return Some(self.back[self.back_len]);
        }
        let b = self.iter.next()?;
        self.consumed += 1;
        Some(b)
    }

    /// Undoes a read; the symbol will be returned by the next [`read`](Reader::read).
    ///
    /// Panics beyond two pending symbols, which no decode rule requires.
    pub fn push_back(&mut self, b: Base) {
        assert!(
            self.back_len < MAX_PUSH_BACK,
            "push-back buffer holds at most {MAX_PUSH_BACK} symbols"
        );
        self.back[self.back_len] = b;
        self.back_len += 1;
    }

    /// Count of symbols consumed from the underlying sequence.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Decodes a number: P terminates, C adds the current multiplier, any
    /// other symbol adds nothing; the multiplier doubles after every symbol.
    ///
    /// `None` means the sequence ran out before the terminating P, which
    /// halts the machine; the partial accumulator is deliberately not
    /// surfaced since every caller discards it.
    pub fn read_nat(&mut self) -> Option<usize> {
        let mut multiplier = 1usize;
        let mut acc = 0usize;
        loop {
            match self.read()? {
                Base::P => return Some(acc),
                Base::C => acc = acc.saturating_add(multiplier),
                Base::I | Base::F => {}
            }
            // Saturate rather than overflow: a run of 64+ digits cannot
            // represent a meaningful count anyway and must not abort the VM.
            multiplier = multiplier.saturating_mul(2);
        }
    }

    /// Decodes a quoted constant run, the exact inverse of [`Dna::quote`].
    ///
    /// Single symbols unquote as C→I, F→C, P→F; the pair IC unquotes as P.
    /// An I followed by anything other than C ends the run, and both symbols
    /// are pushed back for the caller to re-read. End of input also ends the
    /// run, returning the partial result.
    pub fn read_const(&mut self) -> Vec<Base> {
        let mut out = Vec::new();
        let mut got_i = false;
        while let Some(b) = self.read() {
            if !got_i {
                if b == Base::I {
                    got_i = true;
                } else {
                    out.push(b.unquoted());
                }
            } else if b == Base::C {
                got_i = false;
                out.push(Base::P);
            } else {
                self.push_back(b);
                self.push_back(Base::I);
                break;
            }
        }
        out
    }

    /// Reads up to `n` symbols, short when the sequence ends first.
    pub fn read_chunk(&mut self, n: usize) -> Dna {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.read() {
                Some(b) => out.push(b),
                None => break,
            }
        }
        Dna::from_symbols(out)
    }
}
