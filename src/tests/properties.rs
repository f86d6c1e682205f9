use crate::dna::Dna;
use crate::reader::Reader;
use crate::rope::Rope;
use crate::symbol::Base;
use crate::vm::{StepOutcome, Vm};
use proptest::prelude::*;

/// Maps arbitrary bytes onto the four-symbol alphabet.
fn bases(bytes: &[u8]) -> Vec<Base> {
    bytes
        .iter()
        .map(|b| match b % 4 {
            0 => Base::I,
            1 => Base::C,
            2 => Base::F,
            3 => Base::P,
            _ => unreachable!(),
        })
        .collect()
}

fn dna_from_bytes(bytes: &[u8]) -> Dna {
    Dna::from_symbols(bases(bytes))
}

/// Reference implementation of the search used to cross-check KMP.
fn naive_find_end(text: &[Base], start: usize, needle: &[Base]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let tail = &text[start.min(text.len())..];
    tail.windows(needle.len())
        .position(|window| window == needle)
        .map(|j| j + needle.len())
}

proptest! {
    /// Building a rope from a vector and reading it back is the identity.
    #[test]
    fn prop_rope_roundtrip(input: Vec<u8>) {
        let rope = Rope::new(input.clone());
        prop_assert_eq!(rope.to_vec(), input);
        prop_assert_eq!(rope.len(), rope.iter().count());
    }

    /// substring(concat(a, b), s, l) equals the same slice of a ++ b.
    #[test]
    fn prop_substring_of_concat(a: Vec<u8>, b: Vec<u8>, s: usize, l: usize) {
        let joined: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
        let start = s % (joined.len() + 1);
        let len = l % (joined.len() - start + 1);

        let rope = Rope::new(a).concat(&Rope::new(b));
        let sub = rope.substring(start, len);
        prop_assert_eq!(sub.to_vec(), joined[start..start + len].to_vec());
    }

    /// The skip iterator agrees with slicing, wherever it starts.
    #[test]
    fn prop_iter_from_matches_suffix(pieces in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..6), 0..30), k: usize) {
        let mut rope = Rope::empty();
        let mut flat = Vec::new();
        for piece in pieces {
            rope = rope.concat(&Rope::new(piece.clone()));
            flat.extend_from_slice(&piece);
        }
        let start = k % (flat.len() + 1);
        let tail: Vec<u8> = rope.iter_from(start).collect();
        prop_assert_eq!(tail, flat[start..].to_vec());
    }

    /// Long concat chains stay shallow: height is bounded by the rebalance
    /// threshold, never linear in the number of concatenations.
    #[test]
    fn prop_concat_chain_height_bounded(pieces in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..5), 1..300)) {
        let mut rope = Rope::empty();
        let mut flat = Vec::new();
        for piece in pieces {
            rope = rope.concat(&Rope::new(piece.clone()));
            flat.extend_from_slice(&piece);
            prop_assert!(rope.height() <= 80, "height {} after {} symbols", rope.height(), flat.len());
        }
        prop_assert_eq!(rope.to_vec(), flat);
    }

    /// Decoding the nat encoding of any number returns that number with no
    /// exhaustion and nothing left over.
    #[test]
    fn prop_nat_roundtrip(n: usize) {
        let encoded = Dna::encode_nat(n);
        let mut reader = Reader::new(&encoded);
        prop_assert_eq!(reader.read_nat(), Some(n));
        prop_assert_eq!(reader.consumed(), encoded.len());
        prop_assert_eq!(reader.read(), None);
    }

    /// A constant run decodes the quoted form back to the original sequence.
    #[test]
    fn prop_quote_const_inverse(bytes: Vec<u8>) {
        let original = dna_from_bytes(&bytes);
        let quoted = original.quote();
        let mut reader = Reader::new(&quoted);
        let run = Dna::from_symbols(reader.read_const());
        prop_assert_eq!(run, original);
    }

    /// The run stops cleanly at an I-escape boundary and pushes both symbols
    /// back for the caller.
    #[test]
    fn prop_const_run_stops_at_boundary(bytes: Vec<u8>) {
        let original = dna_from_bytes(&bytes);
        let quoted = original.quote().concat(&"IP".parse().unwrap());
        let mut reader = Reader::new(&quoted);
        let run = Dna::from_symbols(reader.read_const());
        prop_assert_eq!(run, original);
        prop_assert_eq!(reader.read(), Some(Base::I));
        prop_assert_eq!(reader.read(), Some(Base::P));
    }

    /// KMP agrees with a naive scan on every text, needle and start offset.
    #[test]
    fn prop_kmp_matches_naive(
        text in prop::collection::vec(any::<u8>(), 0..120),
        needle in prop::collection::vec(any::<u8>(), 0..8),
        start: usize,
    ) {
        let text_syms = bases(&text);
        let needle_syms = bases(&needle);
        let dna = Dna::from_symbols(text_syms.clone());
        let start = start % (text_syms.len() + 1);
        prop_assert_eq!(
            dna.find_end_index(start, &needle_syms),
            naive_find_end(&text_syms, start, &needle_syms)
        );
    }

    /// Clamped substring never panics, whatever the range.
    #[test]
    fn prop_substring_clamps(bytes: Vec<u8>, start: usize, end: usize) {
        let dna = dna_from_bytes(&bytes);
        let sub = dna.substring(start, end);
        let expected_len = end.min(dna.len()).saturating_sub(start);
        prop_assert_eq!(sub.len(), expected_len);
    }
}

/// Bolero fuzz test: arbitrary programs never panic the machine.
#[test]
fn fuzz_no_panic() {
    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        let mut vm = Vm::new(dna_from_bytes(input));
        for _ in 0..50 {
            if vm.step() == StepOutcome::Halted {
                break;
            }
        }
        let _ = vm.iterations();
        let _ = vm.rna().len();
        let _ = vm.dna().height();
    });
}

/// Bolero fuzz test: decoding an arbitrary head never panics, re-encoding
/// what was decoded never panics, and emitted quanta are at most 7 symbols.
#[test]
fn fuzz_decode_encode() {
    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        let dna = dna_from_bytes(input);
        let mut rna = Vec::new();
        let mut reader = Reader::new(&dna);
        if let Some(pattern) = crate::pattern::Pattern::decode(&mut reader, &mut rna) {
            let _ = pattern.encode();
        }
        for quantum in &rna {
            assert!(quantum.len() <= 7);
        }
    });
}
