use crate::dna::Dna;
use crate::reader::Reader;
use crate::symbol::Base;

/// One item of a decoded pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternItem {
    /// Match one literal symbol at the cursor.
    Sym(Base),
    /// Open a capture group at the cursor.
    Open,
    /// Close the innermost open group, capturing it as a block.
    Close,
    /// Advance the cursor by a fixed count.
    Skip(usize),
    /// Advance the cursor past the first occurrence of a literal.
    Search(Vec<Base>),
}

/// The match half of a rewrite rule, decoded fresh each iteration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    pub items: Vec<PatternItem>,
}

impl Pattern {
    pub fn new(items: Vec<PatternItem>) -> Pattern {
        Pattern { items }
    }

    /// Decodes a pattern from the sequence head.
    ///
    /// RNA quanta embedded in the encoding are appended to `rna` as they are
    /// seen; they are a side channel, not part of the pattern. Returns `None`
    /// when the sequence runs out mid-decode, which is the machine's halting
    /// condition; quanta already emitted stay in `rna`.
    pub fn decode(reader: &mut Reader<'_>, rna: &mut Vec<Dna>) -> Option<Pattern> {
        let mut items = Vec::new();
        let mut level = 0usize;
        loop {
            match reader.read()? {
                Base::C => items.push(PatternItem::Sym(Base::I)),
                Base::F => items.push(PatternItem::Sym(Base::C)),
                Base::P => items.push(PatternItem::Sym(Base::F)),
                Base::I => match reader.read()? {
                    Base::C => items.push(PatternItem::Sym(Base::P)),
                    Base::P => items.push(PatternItem::Skip(reader.read_nat()?)),
                    Base::F => {
                        // One symbol is discarded before the literal; end of
                        // input here is discovered on the next read.
                        let _ = reader.read();
                        items.push(PatternItem::Search(reader.read_const()));
                    }
                    Base::I => match reader.read()? {
                        Base::P => {
                            level += 1;
                            items.push(PatternItem::Open);
                        }
                        Base::C | Base::F => {
                            if level == 0 {
                                return Some(Pattern { items });
                            }
                            level -= 1;
                            items.push(PatternItem::Close);
                        }
                        Base::I => rna.push(reader.read_chunk(7)),
                    },
                },
            }
        }
    }

    /// Encodes the pattern back into wire form, terminator included.
    ///
    /// A search literal is delimited by the leading I of whatever follows it,
    /// so a bare symbol item directly after a search would be absorbed into
    /// the literal on re-decode, the same ambiguity the wire format itself
    /// has.
    pub fn encode(&self) -> Dna {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                PatternItem::Sym(b) => out.extend_from_slice(b.quoted()),
                PatternItem::Open => out.extend_from_slice(&[Base::I, Base::I, Base::P]),
                PatternItem::Close => out.extend_from_slice(&[Base::I, Base::I, Base::C]),
                PatternItem::Skip(n) => {
                    out.extend_from_slice(&[Base::I, Base::P]);
                    out.extend(Dna::encode_nat(*n).iter());
                }
                PatternItem::Search(literal) => {
                    // F fills the discarded slot after the IF marker.
                    out.extend_from_slice(&[Base::I, Base::F, Base::F]);
                    for b in literal {
                        out.extend_from_slice(b.quoted());
                    }
                }
            }
        }
        out.extend_from_slice(&[Base::I, Base::I, Base::C]);
        Dna::from_symbols(out)
    }
}
