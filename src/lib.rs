//! # Endo VM - Self-Modifying String Rewriting
//!
//! A virtual machine for a self-modifying string-rewriting language over the
//! four-symbol alphabet I, C, F, P.
//!
//! Each iteration the machine decodes a pattern and a template from the
//! front of its sequence, matches the pattern against the remainder, and
//! splices in a template-generated replacement. Decoding emits fixed-size
//! "RNA" quanta as a side channel for an external renderer; running out of
//! input mid-decode halts the machine.
//!
//! ## Example
//!
//! ```
//! use endo_vm::{Dna, StepOutcome, Vm};
//!
//! let dna: Dna = "IIPIPICPIICICIIFICCIFPPIICCFPC".parse().unwrap();
//! let mut vm = Vm::new(dna);
//!
//! assert_eq!(vm.step(), StepOutcome::Continued);
//! assert_eq!(vm.dna().to_string(), "PICFC");
//! ```
//!
//! ## Performance
//!
//! - The sequence is a persistent rope: concatenation is cheap and
//!   substrings share structure, so the per-iteration splice stays viable
//!   for sequences of millions of symbols.
//! - Periodic rebalancing keeps the rope height bounded regardless of how
//!   many iterations have run.
//! - Literal search uses Knuth-Morris-Pratt over the rope's skip iterator.

mod dna;
mod pattern;
mod reader;
mod rope;
mod symbol;
mod template;
mod vm;

#[cfg(test)]
mod tests;

pub use dna::{Dna, LoadError};
pub use pattern::{Pattern, PatternItem};
pub use reader::Reader;
pub use rope::{Iter, Rope};
pub use symbol::{Base, InvalidSymbol};
pub use template::{Template, TemplateItem};
pub use vm::{RnaIter, StepOutcome, Vm};
