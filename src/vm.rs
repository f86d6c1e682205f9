use crate::dna::{Dna, LoadError};
use crate::pattern::{Pattern, PatternItem};
use crate::reader::Reader;
use crate::template::Template;
use std::path::Path;

/// Result of one machine iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A pattern and template were decoded and applied (or failed to match,
    /// which is a no-op rewrite, not an error).
    Continued,
    /// The sequence ran out mid-decode; the machine has stopped for good.
    Halted,
}

/// The string-rewriting machine.
///
/// Holds the current sequence, the iteration counter and the append-only
/// list of RNA quanta emitted during decoding.
pub struct Vm {
    dna: Dna,
    iterations: usize,
    rna: Vec<Dna>,
}

impl Vm {
    pub fn new(dna: Dna) -> Vm {
        Vm {
            dna,
            iterations: 0,
            rna: Vec::new(),
        }
    }

    /// Loads a program file with a loader prefix prepended.
    pub fn load(prefix: &str, path: impl AsRef<Path>) -> Result<Vm, LoadError> {
        Ok(Vm::new(Dna::load(prefix, path)?))
    }

    pub fn dna(&self) -> &Dna {
        &self.dna
    }

    /// Completed iterations so far, for progress reporting.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// All RNA quanta emitted so far. Callers driving [`step`](Vm::step)
    /// manually can drain this incrementally between steps.
    pub fn rna(&self) -> &[Dna] {
        &self.rna
    }

    /// Advances the machine one iteration: decode a pattern and template
    /// from the sequence head, drop the decoded head, then match and
    /// rewrite the tail.
    ///
    /// On exhaustion mid-decode the machine halts with the sequence
    /// untouched; quanta emitted before the input ran out stay in the
    /// output.
    pub fn step(&mut self) -> StepOutcome {
        let mut reader = Reader::new(&self.dna);
        let Some(pattern) = Pattern::decode(&mut reader, &mut self.rna) else {
            return StepOutcome::Halted;
        };
        let Some(template) = Template::decode(&mut reader, &mut self.rna) else {
            return StepOutcome::Halted;
        };
        let consumed = reader.consumed();
        self.dna = self.dna.suffix(consumed);
        self.match_replace(&pattern, &template);
        self.iterations += 1;
        StepOutcome::Continued
    }

    /// Matches `pattern` against the current sequence and, on success,
    /// splices in the template-generated replacement. Returns whether the
    /// match succeeded; on failure the sequence is left as it was.
    ///
    /// Capture blocks are indexed in group-close order, so the innermost
    /// group closed first gets index 0. Panics if the pattern closes a group
    /// that was never opened; decoded patterns are always well-formed, so
    /// this can only happen with a malformed hand-built pattern.
    pub fn match_replace(&mut self, pattern: &Pattern, template: &Template) -> bool {
        let mut cursor = 0usize;
        let mut open_offsets: Vec<usize> = Vec::new();
        let mut blocks: Vec<Dna> = Vec::new();
        for item in &pattern.items {
            match item {
                PatternItem::Sym(s) => {
                    if cursor < self.dna.len() && self.dna.get(cursor) == *s {
                        cursor += 1;
                    } else {
                        return false;
                    }
                }
                PatternItem::Open => open_offsets.push(cursor),
                PatternItem::Close => {
                    let start = open_offsets
                        .pop()
                        .expect("pattern closes a group that was never opened");
                    blocks.push(self.dna.substring(start, cursor));
                }
                PatternItem::Skip(count) => {
                    cursor = cursor.saturating_add(*count);
                    if cursor > self.dna.len() {
                        return false;
                    }
                }
                PatternItem::Search(literal) => match self.dna.find_end_index(cursor, literal) {
                    Some(end) => cursor += end,
                    None => return false,
                },
            }
        }
        self.dna = template
            .substitute(&blocks)
            .concat(&self.dna.suffix(cursor));
        true
    }

    /// Runs the machine to completion, yielding RNA quanta as they are
    /// emitted. Single-pass and destructive: the iterator advances the VM.
    pub fn execute(&mut self) -> RnaIter<'_> {
        RnaIter {
            vm: self,
            drained: 0,
            halted: false,
        }
    }
}

/// Lazy stream of emitted RNA quanta; see [`Vm::execute`].
pub struct RnaIter<'a> {
    vm: &'a mut Vm,
    drained: usize,
    halted: bool,
}

impl Iterator for RnaIter<'_> {
    type Item = Dna;

    fn next(&mut self) -> Option<Dna> {
        loop {
            if self.drained < self.vm.rna.len() {
                let quantum = self.vm.rna[self.drained].clone();
                self.drained += 1;
                return Some(quantum);
            }
            if self.halted {
                return None;
            }
            if self.vm.step() == StepOutcome::Halted {
                self.halted = true;
            }
        }
    }
}
