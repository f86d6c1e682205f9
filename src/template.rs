use crate::dna::Dna;
use crate::reader::Reader;
use crate::symbol::Base;

/// One item of a decoded template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateItem {
    /// Emit one literal symbol.
    Sym(Base),
    /// Substitute a captured block, quoted `level` times.
    Ref { block: usize, level: usize },
    /// Substitute the nat-encoded length of a captured block.
    Len(usize),
}

/// The replacement half of a rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pub items: Vec<TemplateItem>,
}

impl Template {
    pub fn new(items: Vec<TemplateItem>) -> Template {
        Template { items }
    }

    /// Decodes a template from the same reader the pattern came from.
    ///
    /// `None` on exhaustion, as for [`Pattern::decode`](crate::Pattern::decode);
    /// RNA quanta go to `rna` as they are seen.
    pub fn decode(reader: &mut Reader<'_>, rna: &mut Vec<Dna>) -> Option<Template> {
        let mut items = Vec::new();
        loop {
            match reader.read()? {
                Base::C => items.push(TemplateItem::Sym(Base::I)),
                Base::F => items.push(TemplateItem::Sym(Base::C)),
                Base::P => items.push(TemplateItem::Sym(Base::F)),
                Base::I => match reader.read()? {
                    Base::C => items.push(TemplateItem::Sym(Base::P)),
                    // Protection level first, then block index.
                    Base::P | Base::F => {
                        let level = reader.read_nat()?;
                        let block = reader.read_nat()?;
                        items.push(TemplateItem::Ref { block, level });
                    }
                    Base::I => match reader.read()? {
                        Base::C | Base::F => return Some(Template { items }),
                        Base::P => items.push(TemplateItem::Len(reader.read_nat()?)),
                        Base::I => rna.push(reader.read_chunk(7)),
                    },
                },
            }
        }
    }

    /// Encodes the template back into wire form, terminator included.
    pub fn encode(&self) -> Dna {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                TemplateItem::Sym(b) => out.extend_from_slice(b.quoted()),
                TemplateItem::Ref { block, level } => {
                    out.extend_from_slice(&[Base::I, Base::F]);
                    out.extend(Dna::encode_nat(*level).iter());
                    out.extend(Dna::encode_nat(*block).iter());
                }
                TemplateItem::Len(block) => {
                    out.extend_from_slice(&[Base::I, Base::I, Base::P]);
                    out.extend(Dna::encode_nat(*block).iter());
                }
            }
        }
        out.extend_from_slice(&[Base::I, Base::I, Base::C]);
        Dna::from_symbols(out)
    }

    /// Builds the replacement sequence from the captured blocks.
    ///
    /// Literal runs are batched into single leaves before splicing; a block
    /// index past the end of `blocks` substitutes the empty sequence (or a
    /// zero length for [`TemplateItem::Len`]).
    pub fn substitute(&self, blocks: &[Dna]) -> Dna {
        let mut res = Dna::empty();
        let mut word: Vec<Base> = Vec::new();
        for item in &self.items {
            if let TemplateItem::Sym(b) = item {
                word.push(*b);
                continue;
            }
            if !word.is_empty() {
                res = res.concat(&Dna::from_symbols(std::mem::take(&mut word)));
            }
            let piece = match item {
                TemplateItem::Ref { block, level } => blocks
                    .get(*block)
                    .cloned()
                    .unwrap_or_else(Dna::empty)
                    .protect(*level),
                TemplateItem::Len(block) => Dna::encode_nat(blocks.get(*block).map_or(0, Dna::len)),
                TemplateItem::Sym(_) => unreachable!("literal runs are batched above"),
            };
            res = res.concat(&piece);
        }
        if !word.is_empty() {
            res = res.concat(&Dna::from_symbols(word));
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dna(s: &str) -> Dna {
        s.parse().expect("test input should be valid")
    }

    fn decode(input: &str) -> (Option<Template>, Vec<Dna>) {
        let d = dna(input);
        let mut rna = Vec::new();
        let template = Template::decode(&mut Reader::new(&d), &mut rna);
        (template, rna)
    }

    fn sym(c: char) -> TemplateItem {
        TemplateItem::Sym(Base::from_char(c).unwrap())
    }

    #[test]
    fn test_decode_symbols() {
        let cases = [
            ("IIC", vec![]),
            ("CIIC", vec![sym('I')]),
            ("FIIC", vec![sym('C')]),
            ("PIIC", vec![sym('F')]),
            ("ICIIC", vec![sym('P')]),
            ("ICIIF", vec![sym('P')]),
        ];
        for (input, items) in cases {
            let (template, _) = decode(input);
            assert_eq!(template, Some(Template::new(items)), "{input}");
        }
    }

    #[test]
    fn test_decode_ref() {
        // Both IF and IP introduce a reference; level comes first on the
        // wire.
        for input in ["IFCPICPIIC", "IPCPICPIIC"] {
            let (template, _) = decode(input);
            assert_eq!(
                template,
                Some(Template::new(vec![TemplateItem::Ref { block: 2, level: 1 }])),
                "{input}"
            );
        }
    }

    #[test]
    fn test_decode_len() {
        let (template, _) = decode("IIPICPIIC");
        assert_eq!(template, Some(Template::new(vec![TemplateItem::Len(2)])));
    }

    #[test]
    fn test_decode_mixed() {
        let (template, _) = decode("IIPICPIPCPICPICIIF");
        assert_eq!(
            template,
            Some(Template::new(vec![
                TemplateItem::Len(2),
                TemplateItem::Ref { block: 2, level: 1 },
                sym('P'),
            ]))
        );
    }

    #[test]
    fn test_decode_emits_rna() {
        let (template, rna) = decode("IIICCCCCCIIIC");
        assert_eq!(template, Some(Template::default()));
        assert_eq!(rna, vec![dna("CCCCCCI")]);
    }

    #[test]
    fn test_decode_exhausted() {
        for input in ["", "I", "II", "IFCP", "IIP"] {
            let (template, _) = decode(input);
            assert_eq!(template, None, "{input}");
        }
    }

    #[test]
    fn test_substitute_literals() {
        let template = Template::new(vec![sym('I'), sym('C')]);
        assert_eq!(template.substitute(&[]), dna("IC"));
    }

    #[test]
    fn test_substitute_ref_protects() {
        let template = Template::new(vec![TemplateItem::Ref { block: 0, level: 1 }]);
        assert_eq!(template.substitute(&[dna("ICFP")]), dna("CFPIC"));
    }

    #[test]
    fn test_substitute_len() {
        let template = Template::new(vec![TemplateItem::Len(0)]);
        assert_eq!(template.substitute(&[dna("ICFP")]), dna("IICP"));
    }

    #[test]
    fn test_substitute_all_kinds() {
        let template = Template::new(vec![
            sym('I'),
            TemplateItem::Ref { block: 1, level: 1 },
            TemplateItem::Len(2),
        ]);
        let blocks = [dna("F"), dna("ICFP"), dna("CP")];
        assert_eq!(template.substitute(&blocks), dna("ICFPICICP"));
    }

    #[test]
    fn test_substitute_out_of_range_block() {
        let template = Template::new(vec![
            TemplateItem::Ref { block: 5, level: 3 },
            TemplateItem::Len(5),
        ]);
        assert_eq!(template.substitute(&[]), dna("P"));
    }

    #[test]
    fn test_encode_roundtrip() {
        let templates = [
            Template::default(),
            Template::new(vec![sym('I'), sym('P'), sym('F')]),
            Template::new(vec![
                TemplateItem::Len(0),
                TemplateItem::Ref { block: 3, level: 2 },
                sym('C'),
            ]),
        ];
        for template in templates {
            let encoded = template.encode();
            let mut rna = Vec::new();
            let decoded = Template::decode(&mut Reader::new(&encoded), &mut rna);
            assert_eq!(decoded, Some(template));
            assert!(rna.is_empty());
        }
    }
}
