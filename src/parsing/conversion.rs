//! Resolution of conversion blocks into self-contained [`ConversionRule`]s.

use super::{BlockReader, reader::ByteRangeReader};
use crate::{
    Error, Result,
    blocks::{BlockParse, ConversionBlock, MetadataBlock, TextBlock, v3},
    conversion::{
        ConversionRule, Formula, MAX_CONVERSION_DEPTH, TextFallback, TextRange, ValueRange,
    },
};
use std::collections::BTreeSet;

/// What a `cc_ref` link resolved to.
enum Reference {
    None,
    Text(String),
    Rule(ConversionRule),
}

/// Resolve the 4.x conversion at `address` (0 = identity) with all its
/// referenced texts and nested conversions.
pub fn resolve_v4<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    address: u64,
) -> Result<ConversionRule> {
    if address == 0 {
        return Ok(ConversionRule::Identity);
    }
    let mut visited = BTreeSet::new();
    resolve_at(reader, address, 0, &mut visited)
}

fn resolve_at<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    address: u64,
    depth: usize,
    visited: &mut BTreeSet<u64>,
) -> Result<ConversionRule> {
    if depth >= MAX_CONVERSION_DEPTH {
        return Err(Error::ConversionChainTooDeep {
            max_depth: MAX_CONVERSION_DEPTH,
        });
    }
    if !visited.insert(address) {
        return Err(Error::ConversionChainCycle { address });
    }
    let block: ConversionBlock = reader.read(address)?;
    let rule = build_v4(reader, &block, address, depth, visited)?;
    visited.remove(&address);
    Ok(rule)
}

fn resolve_ref<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    link: u64,
    depth: usize,
    visited: &mut BTreeSet<u64>,
) -> Result<Reference> {
    if link == 0 {
        return Ok(Reference::None);
    }
    let raw = reader.read_block(link)?;
    match raw.id.as_str() {
        "##TX" => Ok(Reference::Text(TextBlock::from_raw(&raw)?.text)),
        "##MD" => Ok(Reference::Text(MetadataBlock::from_raw(&raw)?.xml)),
        "##CC" => Ok(Reference::Rule(resolve_at(reader, link, depth + 1, visited)?)),
        other => Err(Error::corrupt(format!(
            "conversion reference at {link:#x} points to a {other} block"
        ))),
    }
}

fn build_v4<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    block: &ConversionBlock,
    address: u64,
    depth: usize,
    visited: &mut BTreeSet<u64>,
) -> Result<ConversionRule> {
    let vals = &block.values;
    let rule = match block.conversion_type {
        0 => ConversionRule::Identity,
        1 if vals.len() >= 2 => linear(vals[0], vals[1]),
        2 if vals.len() >= 6 => ConversionRule::Rational {
            coefficients: [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]],
        },
        3 => {
            let formula = match resolve_ref(reader, block.refs.first().copied().unwrap_or(0), depth, visited)? {
                Reference::Text(text) => text,
                _ => String::new(),
            };
            algebraic(&formula, address)
        }
        4 | 5 => ConversionRule::ValueTable {
            entries: vals.chunks_exact(2).map(|c| (c[0], c[1])).collect(),
            interpolate: block.conversion_type == 4,
        },
        6 if !vals.is_empty() => {
            let n = (vals.len() - 1) / 3;
            ConversionRule::ValueRangeTable {
                ranges: vals[..n * 3]
                    .chunks_exact(3)
                    .map(|c| ValueRange {
                        min: c[0],
                        max: c[1],
                        value: c[2],
                    })
                    .collect(),
                default: vals[vals.len() - 1],
            }
        }
        7 => {
            let n = vals.len();
            let mut entries = Vec::with_capacity(n);
            for (i, key) in vals.iter().enumerate() {
                let text = entry_text(reader, link_at(&block.refs, i), depth, visited, address)?;
                entries.push((*key, text));
            }
            let default = fallback(reader, link_at(&block.refs, n), depth, visited)?;
            ConversionRule::TextTable { entries, default }
        }
        8 => {
            let n = vals.len() / 2;
            let mut ranges = Vec::with_capacity(n);
            for i in 0..n {
                let text = entry_text(reader, link_at(&block.refs, i), depth, visited, address)?;
                ranges.push(TextRange {
                    min: vals[2 * i],
                    max: vals[2 * i + 1],
                    text,
                });
            }
            let default = fallback(reader, link_at(&block.refs, n), depth, visited)?;
            ConversionRule::TextRangeTable { ranges, default }
        }
        other => {
            log::warn!(
                "conversion type {other} at {address:#x} is not supported; using raw values"
            );
            ConversionRule::Identity
        }
    };
    Ok(rule)
}

fn link_at(refs: &[u64], index: usize) -> u64 {
    refs.get(index).copied().unwrap_or(0)
}

fn linear(offset: f64, factor: f64) -> ConversionRule {
    if offset == 0.0 && factor == 1.0 {
        ConversionRule::Identity
    } else {
        ConversionRule::Linear { offset, factor }
    }
}

fn algebraic(formula: &str, address: u64) -> ConversionRule {
    match Formula::parse(formula.trim()) {
        Ok(formula) => ConversionRule::Algebraic { formula },
        Err(e) => {
            log::warn!("unsupported formula at {address:#x} ({e}); using raw values");
            ConversionRule::Identity
        }
    }
}

fn entry_text<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    link: u64,
    depth: usize,
    visited: &mut BTreeSet<u64>,
    address: u64,
) -> Result<String> {
    Ok(match resolve_ref(reader, link, depth, visited)? {
        Reference::Text(text) => text,
        Reference::None => String::new(),
        Reference::Rule(_) => {
            log::warn!("conversion at {address:#x} nests a conversion per table entry; using empty text");
            String::new()
        }
    })
}

fn fallback<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    link: u64,
    depth: usize,
    visited: &mut BTreeSet<u64>,
) -> Result<Option<TextFallback>> {
    Ok(match resolve_ref(reader, link, depth, visited)? {
        Reference::None => None,
        Reference::Text(text) => Some(TextFallback::Text(text)),
        Reference::Rule(rule) => Some(TextFallback::Rule(Box::new(rule))),
    })
}

/// Build the rule of a 3.x `CC` block. Text range entries reference TX blocks.
pub fn resolve_v3<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    block: &v3::ConversionBlock,
    address: u64,
) -> Result<ConversionRule> {
    use v3::ConversionParams as P;

    let rule = match (block.conversion_type, &block.params) {
        (0, P::Numbers(p)) if p.len() >= 2 => linear(p[0], p[1]),
        (1 | 2, P::Numbers(p)) => ConversionRule::ValueTable {
            entries: p.chunks_exact(2).map(|c| (c[0], c[1])).collect(),
            interpolate: block.conversion_type == 1,
        },
        (9, P::Numbers(p)) if p.len() >= 6 => ConversionRule::Rational {
            coefficients: [p[0], p[1], p[2], p[3], p[4], p[5]],
        },
        (10, P::Formula(text)) => algebraic(text, address),
        (11, P::TextTable(entries)) => ConversionRule::TextTable {
            entries: entries.clone(),
            default: None,
        },
        (12, P::TextRange(entries)) => {
            let mut iter = entries.iter();
            let default = match iter.next() {
                Some(first) => reader.read_text(first.text_addr as u64)?.map(TextFallback::Text),
                None => None,
            };
            let mut ranges = Vec::with_capacity(entries.len().saturating_sub(1));
            for entry in iter {
                ranges.push(TextRange {
                    min: entry.lower,
                    max: entry.upper,
                    text: reader.read_text(entry.text_addr as u64)?.unwrap_or_default(),
                });
            }
            ConversionRule::TextRangeTable { ranges, default }
        }
        (65535, _) => ConversionRule::Identity,
        (other, _) => {
            log::warn!(
                "conversion type {other} at {address:#x} is not supported; using raw values"
            );
            ConversionRule::Identity
        }
    };
    Ok(rule)
}
