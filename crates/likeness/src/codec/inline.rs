//! Self-describing inline values used for record state.

use likeness_buffers::{Reader, Writer};

use super::constants::*;
use crate::error::{Error, Result};

/// Nested lists deeper than this are rejected while decoding.
const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Plain inline data.
    List(Vec<Inline>),
    /// A list that is itself a value record, e.g. a boxed primitive.
    RecordList(Vec<Inline>),
}

impl Inline {
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(s.into())
    }

    pub fn optional_text(s: Option<&str>) -> Self {
        s.map_or(Inline::Undefined, Inline::text)
    }

    pub fn count(n: usize) -> Self {
        Inline::Number(n as f64)
    }
}

// ── Encoding ──

pub fn write_inline(writer: &mut Writer, value: &Inline) {
    match value {
        Inline::Undefined => writer.u8(CODE_UNDEFINED),
        Inline::Null => writer.u8(CODE_NULL),
        Inline::Bool(true) => writer.u8(CODE_TRUE),
        Inline::Bool(false) => writer.u8(CODE_FALSE),
        Inline::Number(n) => write_number(writer, *n),
        Inline::Text(s) => {
            writer.u8(CODE_TEXT);
            writer.vu(s.len() as u64);
            writer.utf8(s);
        }
        Inline::Bytes(b) => {
            writer.u8(CODE_BYTES);
            writer.vu(b.len() as u64);
            writer.buf(b);
        }
        Inline::List(items) | Inline::RecordList(items) => {
            let code = if matches!(value, Inline::List(_)) {
                CODE_LIST
            } else {
                CODE_RECORD_LIST
            };
            writer.u8(code);
            writer.vu(items.len() as u64);
            for item in items {
                write_inline(writer, item);
            }
        }
    }
}

fn write_number(writer: &mut Writer, n: f64) {
    if n.is_nan() {
        return writer.u8(CODE_NAN);
    }
    if n == 0.0 {
        return writer.u8(if n.is_sign_negative() {
            CODE_NEGATIVE_ZERO
        } else {
            CODE_ZERO
        });
    }
    if n.is_infinite() {
        return writer.u8(if n > 0.0 {
            CODE_INFINITY
        } else {
            CODE_NEGATIVE_INFINITY
        });
    }
    if n.fract() == 0.0 && n.abs() < (1u64 << 47) as f64 {
        let int = n as i64;
        let width = int_width(int);
        writer.u8(CODE_INT_BASE + width as u8 - 1);
        writer.int(int, width);
        return;
    }
    if n.fract() != 0.0 && (n as f32) as f64 == n {
        writer.u8(CODE_FLOAT32);
        writer.f32(n as f32);
        return;
    }
    let decimal = n.to_string();
    writer.u8(CODE_DECIMAL);
    writer.vu(decimal.len() as u64);
    writer.utf8(&decimal);
}

/// Smallest byte width that holds `int` as a signed integer.
fn int_width(int: i64) -> usize {
    (1..CODE_INT_MAX_WIDTH)
        .find(|&w| {
            let bits = (w * 8 - 1) as u32;
            int >= -(1i64 << bits) && int < (1i64 << bits)
        })
        .unwrap_or(CODE_INT_MAX_WIDTH)
}

// ── Decoding ──

fn read_len(reader: &mut Reader<'_>) -> Result<usize> {
    let at = reader.x;
    let len = reader.vu()?;
    if len > reader.remaining() as u64 {
        return Err(Error::malformed(at, format!("length {len} exceeds buffer")));
    }
    Ok(len as usize)
}

pub fn read_inline(reader: &mut Reader<'_>) -> Result<Inline> {
    read_nested(reader, 0)
}

fn read_nested(reader: &mut Reader<'_>, depth: usize) -> Result<Inline> {
    let at = reader.x;
    let code = reader.u8()?;
    Ok(match code {
        CODE_ZERO => Inline::Number(0.0),
        CODE_NEGATIVE_ZERO => Inline::Number(-0.0),
        CODE_NAN => Inline::Number(f64::NAN),
        CODE_INFINITY => Inline::Number(f64::INFINITY),
        CODE_NEGATIVE_INFINITY => Inline::Number(f64::NEG_INFINITY),
        CODE_UNDEFINED => Inline::Undefined,
        CODE_NULL => Inline::Null,
        CODE_TRUE => Inline::Bool(true),
        CODE_FALSE => Inline::Bool(false),
        c if (CODE_INT_BASE..CODE_INT_BASE + CODE_INT_MAX_WIDTH as u8).contains(&c) => {
            let width = (c - CODE_INT_BASE) as usize + 1;
            Inline::Number(reader.int(width)? as f64)
        }
        CODE_FLOAT32 => Inline::Number(reader.f32()? as f64),
        CODE_DECIMAL => {
            let len = read_len(reader)?;
            let text = reader.utf8(len)?;
            let n = text
                .parse::<f64>()
                .map_err(|_| Error::malformed(at, format!("bad decimal {text:?}")))?;
            Inline::Number(n)
        }
        CODE_TEXT => {
            let len = read_len(reader)?;
            Inline::text(reader.utf8(len)?)
        }
        CODE_BYTES => {
            let len = read_len(reader)?;
            Inline::Bytes(reader.buf(len)?.to_vec())
        }
        CODE_LIST | CODE_RECORD_LIST => {
            if depth >= MAX_NESTING {
                return Err(Error::malformed(at, "inline list nested too deeply"));
            }
            let len = read_len(reader)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(read_nested(reader, depth + 1)?);
            }
            if code == CODE_LIST {
                Inline::List(items)
            } else {
                Inline::RecordList(items)
            }
        }
        other => return Err(Error::malformed(at, format!("unknown inline code 0x{other:02x}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: &Inline) -> Vec<u8> {
        let mut writer = Writer::new();
        write_inline(&mut writer, value);
        writer.flush()
    }

    fn decoded(bytes: &[u8]) -> Result<Inline> {
        read_inline(&mut Reader::new(bytes))
    }

    #[test]
    fn singleton_codes() {
        assert_eq!(encoded(&Inline::Number(0.0)), vec![CODE_ZERO]);
        assert_eq!(encoded(&Inline::Number(-0.0)), vec![CODE_NEGATIVE_ZERO]);
        assert_eq!(encoded(&Inline::Number(f64::NAN)), vec![CODE_NAN]);
        assert_eq!(encoded(&Inline::Number(f64::NEG_INFINITY)), vec![CODE_NEGATIVE_INFINITY]);
        assert_eq!(encoded(&Inline::Null), vec![CODE_NULL]);
        assert_eq!(encoded(&Inline::Bool(false)), vec![CODE_FALSE]);
    }

    #[test]
    fn integers_use_minimal_width() {
        assert_eq!(encoded(&Inline::Number(5.0)), vec![CODE_INT_BASE, 5]);
        assert_eq!(encoded(&Inline::Number(-128.0)), vec![CODE_INT_BASE, 0x80]);
        assert_eq!(encoded(&Inline::Number(128.0)), vec![CODE_INT_BASE + 1, 0x80, 0x00]);
        let big = encoded(&Inline::Number(((1u64 << 47) - 1) as f64));
        assert_eq!(big[0], CODE_INT_BASE + 5);
        assert_eq!(big.len(), 7);
    }

    #[test]
    fn large_and_fractional_numbers() {
        let huge = 2f64.powi(60);
        assert_eq!(encoded(&Inline::Number(huge))[0], CODE_DECIMAL);
        assert_eq!(decoded(&encoded(&Inline::Number(huge))).unwrap(), Inline::Number(huge));
        assert_eq!(encoded(&Inline::Number(0.5))[0], CODE_FLOAT32);
        assert_eq!(encoded(&Inline::Number(0.1))[0], CODE_DECIMAL);
        assert_eq!(decoded(&encoded(&Inline::Number(0.1))).unwrap(), Inline::Number(0.1));
    }

    #[test]
    fn negative_zero_survives() {
        match decoded(&[CODE_NEGATIVE_ZERO]).unwrap() {
            Inline::Number(n) => assert!(n == 0.0 && n.is_sign_negative()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nested_lists_keep_their_flag() {
        let value = Inline::List(vec![
            Inline::text("a"),
            Inline::RecordList(vec![Inline::text("Number"), Inline::Number(1.0)]),
            Inline::Bytes(vec![1, 2]),
        ]);
        assert_eq!(decoded(&encoded(&value)).unwrap(), value);
    }

    #[test]
    fn rejects_unknown_codes_and_truncation() {
        assert!(matches!(decoded(&[0x7f]), Err(Error::MalformedRecord { .. })));
        assert!(matches!(decoded(&[CODE_TEXT, 5, b'a']), Err(Error::MalformedRecord { .. })));
        assert!(matches!(decoded(&[CODE_INT_BASE + 2, 1]), Err(Error::MalformedRecord { .. })));
        assert!(matches!(decoded(&[]), Err(Error::MalformedRecord { .. })));
    }
}
