//! Line parser
//!
//! Reads back a single line produced by the encoder. Tags come back as text,
//! fields come back typed.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use contracts::{FieldValue, ValueMap};

use crate::error::ParseError;
use crate::escape;

/// One parsed line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: ValueMap,
    pub timestamp: Option<i64>,
}

/// Parse one line protocol record
pub fn parse_line(line: &str) -> Result<ParsedLine, ParseError> {
    let mut cursor = Cursor {
        chars: line.chars().peekable(),
    };

    let measurement = cursor.read_until(&[',', ' '], escape::MEASUREMENT);
    if measurement.is_empty() {
        return Err(ParseError::MissingMeasurement);
    }

    let mut tags = BTreeMap::new();
    while cursor.eat(',') {
        let key = cursor.read_until(&['=', ',', ' '], escape::KEY);
        if !cursor.eat('=') {
            return Err(ParseError::MissingTagValue { key });
        }
        let value = cursor.read_until(&[',', ' '], escape::KEY);
        tags.insert(key, value);
    }

    if !cursor.eat(' ') {
        return Err(ParseError::MissingFields);
    }

    let mut fields = ValueMap::new();
    loop {
        let key = cursor.read_until(&['=', ',', ' '], escape::KEY);
        if key.is_empty() || !cursor.eat('=') {
            return Err(ParseError::MissingFields);
        }
        let value = if cursor.eat('"') {
            FieldValue::String(cursor.read_quoted(&key)?)
        } else {
            let raw = cursor.read_until(&[',', ' '], &[]);
            parse_scalar(&key, &raw)?
        };
        fields.insert(key, value);

        if !cursor.eat(',') {
            break;
        }
    }

    let timestamp = if cursor.eat(' ') {
        let raw: String = cursor.chars.by_ref().collect();
        Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidTimestamp(raw.clone()))?,
        )
    } else {
        None
    };

    Ok(ParsedLine {
        measurement,
        tags,
        fields,
        timestamp,
    })
}

fn parse_scalar(key: &str, raw: &str) -> Result<FieldValue, ParseError> {
    let invalid = || ParseError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    };

    match raw {
        "t" | "T" | "true" | "True" | "TRUE" => return Ok(FieldValue::Boolean(true)),
        "f" | "F" | "false" | "False" | "FALSE" => return Ok(FieldValue::Boolean(false)),
        _ => {}
    }

    if let Some(int) = raw.strip_suffix('i') {
        return int.parse().map(FieldValue::Integer).map_err(|_| invalid());
    }

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(FieldValue::Float)
        .ok_or_else(invalid)
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Cursor<'_> {
    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if_eq(&expected).is_some()
    }

    /// Read up to (not including) the first unescaped stop character
    fn read_until(&mut self, stops: &[char], escapable: &[char]) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if stops.contains(&c) {
                break;
            }
            self.chars.next();
            if c == '\\' {
                if let Some(next) = self.chars.next_if(|n| escapable.contains(n)) {
                    out.push(next);
                    continue;
                }
            }
            out.push(c);
        }
        out
    }

    /// Read a string body after its opening quote, consuming the closing quote
    fn read_quoted(&mut self, key: &str) -> Result<String, ParseError> {
        let mut out = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '"' => return Ok(out),
                '\\' => match self.chars.next_if(|n| escape::STRING_FIELD.contains(n)) {
                    Some(next) => out.push(next),
                    None => out.push(c),
                },
                _ => out.push(c),
            }
        }
        Err(ParseError::UnterminatedString {
            key: key.to_string(),
        })
    }
}
