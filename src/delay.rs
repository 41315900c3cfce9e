//! Delay tables.
//!
//! A delay table maps the current activity level(s) of a reaction's
//! operands to the time the reaction needs before it fires, or to
//! [`Delay::Never`] when the reaction cannot fire at that level.
//!
//! Degradation reactions use a vector indexed by the target level.
//! Catalyzed transitions use a square matrix indexed by
//! `(catalyst level, target level)`.

use std::fmt;
use std::iter::Peekable;

use logos::{Logos, SpannedIter};
use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// A discrete activity level.
pub type Level = u32;

/// Raw value meaning "never" in flat times lists.
pub const RAW_NEVER: i64 = -1;

/// A firing delay.
///
/// # Examples
///
/// ```
/// use levelnet::Delay;
///
/// assert_eq!(Delay::Finite(3).ticks(), Some(3));
/// assert!(Delay::Never.is_never());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delay {
    /// The reaction fires after this many time units.
    Finite(u32),
    /// The reaction never fires at this level combination.
    Never,
}

impl Delay {
    /// True for [`Delay::Never`].
    #[must_use]
    pub const fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// The finite delay, if any.
    #[must_use]
    pub const fn ticks(&self) -> Option<u32> {
        match self {
            Self::Finite(t) => Some(*t),
            Self::Never => None,
        }
    }

    /// Encodes this delay as an integer, using `sentinel` for `Never`.
    ///
    /// `sentinel` must be negative so it cannot be mistaken for a delay.
    #[must_use]
    pub fn encode(self, sentinel: i64) -> i64 {
        match self {
            Self::Finite(t) => i64::from(t),
            Self::Never => sentinel,
        }
    }

    /// Decodes an integer produced by [`Delay::encode`].
    ///
    /// Returns `None` for negative values other than `sentinel` and for
    /// values that do not fit a delay.
    #[must_use]
    pub fn decode(raw: i64, sentinel: i64) -> Option<Self> {
        if raw == sentinel {
            return Some(Self::Never);
        }
        u32::try_from(raw).ok().map(Self::Finite)
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(t) => write!(f, "{t}"),
            Self::Never => write!(f, "never"),
        }
    }
}

impl From<u32> for Delay {
    fn from(ticks: u32) -> Self {
        Self::Finite(ticks)
    }
}

/// A dense delay table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayTable {
    /// Indexed by the target level.
    Vector(Vec<Delay>),
    /// Indexed by `[catalyst level][target level]`.
    Matrix(Vec<Vec<Delay>>),
}

impl DelayTable {
    /// Creates a one-dimensional table.
    #[must_use]
    pub fn vector(delays: impl IntoIterator<Item = Delay>) -> Self {
        Self::Vector(delays.into_iter().collect())
    }

    /// Creates a two-dimensional table from rows indexed by catalyst level.
    #[must_use]
    pub fn matrix<R>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = Delay>,
    {
        Self::Matrix(rows.into_iter().map(|r| r.into_iter().collect()).collect())
    }

    /// Builds a table from a flat list of raw times, as produced by the
    /// authoring layer.
    ///
    /// `-1` means "never". A vector needs `levels + 1` entries; a matrix needs
    /// `(levels + 1)^2` entries in row-major order, rows indexed by catalyst
    /// level.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::InvalidTimesList` if the list has the wrong
    /// length or holds a value that is neither a delay nor `-1`.
    pub fn from_times(
        reaction: &str,
        levels: u32,
        times: &[i64],
        binary: bool,
    ) -> Result<Self, StructuralError> {
        let side = (levels as usize).saturating_add(1);
        let expected = if binary { side.checked_mul(side) } else { Some(side) };
        let Some(expected) = expected else {
            return Err(StructuralError::InvalidTimesList {
                reaction: reaction.to_string(),
                reason: format!("{side}x{side} table does not fit in memory"),
            });
        };
        if times.len() != expected {
            return Err(StructuralError::InvalidTimesList {
                reaction: reaction.to_string(),
                reason: format!("expected {expected} entries, got {}", times.len()),
            });
        }

        let delays = times
            .iter()
            .map(|&raw| {
                Delay::decode(raw, RAW_NEVER).ok_or_else(|| StructuralError::InvalidTimesList {
                    reaction: reaction.to_string(),
                    reason: format!("{raw} is not a delay"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if binary {
            Ok(Self::Matrix(delays.chunks(side).map(<[Delay]>::to_vec).collect()))
        } else {
            Ok(Self::Vector(delays))
        }
    }

    /// True for catalyzed-transition tables.
    #[must_use]
    pub const fn is_matrix(&self) -> bool {
        matches!(self, Self::Matrix(_))
    }

    /// Human-readable shape, e.g. `3` or `3x3`.
    #[must_use]
    pub fn shape(&self) -> String {
        match self {
            Self::Vector(v) => v.len().to_string(),
            Self::Matrix(rows) => {
                let mut widths: Vec<usize> = rows.iter().map(Vec::len).collect();
                widths.dedup();
                match widths.as_slice() {
                    [] => "0x0".to_string(),
                    [w] => format!("{}x{w}", rows.len()),
                    _ => format!("{} ragged rows", rows.len()),
                }
            }
        }
    }

    /// Checks that every axis has exactly `side` entries.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::TableDimensionMismatch` otherwise.
    pub fn check_side(&self, reaction: &str, side: usize) -> Result<(), StructuralError> {
        let ok = match self {
            Self::Vector(v) => v.len() == side,
            Self::Matrix(rows) => rows.len() == side && rows.iter().all(|r| r.len() == side),
        };
        if ok {
            return Ok(());
        }
        let expected = if self.is_matrix() {
            format!("{side}x{side}")
        } else {
            side.to_string()
        };
        Err(StructuralError::TableDimensionMismatch {
            reaction: reaction.to_string(),
            expected,
            found: self.shape(),
        })
    }

    /// Looks up a degradation delay by target level.
    #[must_use]
    pub fn unary(&self, target: Level) -> Option<Delay> {
        match self {
            Self::Vector(v) => v.get(target as usize).copied(),
            Self::Matrix(_) => None,
        }
    }

    /// Looks up a catalyzed-transition delay.
    #[must_use]
    pub fn binary(&self, catalyst: Level, target: Level) -> Option<Delay> {
        match self {
            Self::Matrix(rows) => rows
                .get(catalyst as usize)
                .and_then(|row| row.get(target as usize))
                .copied(),
            Self::Vector(_) => None,
        }
    }

    /// Iterates over every entry in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = Delay> + '_ {
        let (head, tail): (&[Delay], &[Vec<Delay>]) = match self {
            Self::Vector(v) => (v.as_slice(), &[]),
            Self::Matrix(rows) => (&[], rows.as_slice()),
        };
        head.iter().copied().chain(tail.iter().flatten().copied())
    }

    /// Renders the table as a brace-delimited array literal.
    ///
    /// `never` is the constant name written for [`Delay::Never`].
    #[must_use]
    pub fn to_literal(&self, never: &str) -> String {
        fn row(delays: &[Delay], never: &str) -> String {
            let cells: Vec<String> = delays
                .iter()
                .map(|d| match d {
                    Delay::Finite(t) => t.to_string(),
                    Delay::Never => never.to_string(),
                })
                .collect();
            format!("{{{}}}", cells.join(", "))
        }

        match self {
            Self::Vector(v) => row(v, never),
            Self::Matrix(rows) => {
                let rows: Vec<String> = rows.iter().map(|r| format!("\t{}", row(r, never))).collect();
                format!("{{\n{}\n}}", rows.join(",\n"))
            }
        }
    }

    /// Parses an array literal produced by [`DelayTable::to_literal`].
    ///
    /// Cells may hold a non-negative integer, the `never` constant name, or
    /// the raw `sentinel` value. Matrix rows must all have the same length.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::MalformedTableLiteral` on any syntax error.
    pub fn parse_literal(text: &str, never: &str, sentinel: i64) -> Result<Self, StructuralError> {
        let mut parser = LiteralParser {
            tokens: Token::lexer(text).spanned().peekable(),
            text,
            never,
            sentinel,
        };
        let table = parser.table()?;
        if let Some(extra) = parser.next()? {
            return Err(malformed(format!("trailing {extra:?} after table")));
        }
        Ok(table)
    }
}

fn malformed(reason: impl Into<String>) -> StructuralError {
    StructuralError::MalformedTableLiteral {
        reason: reason.into(),
    }
}

/// Table literal token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token<'s> {
    #[token("{")]
    Open,
    #[token("}")]
    Close,
    #[token(",")]
    Comma,
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Ident(&'s str),
}

struct LiteralParser<'s, 'n> {
    tokens: Peekable<SpannedIter<'s, Token<'s>>>,
    text: &'s str,
    never: &'n str,
    sentinel: i64,
}

impl<'s> LiteralParser<'s, '_> {
    fn next(&mut self) -> Result<Option<Token<'s>>, StructuralError> {
        match self.tokens.next() {
            None => Ok(None),
            Some((Ok(token), _)) => Ok(Some(token)),
            Some((Err(()), span)) => {
                let bad = self.text.get(span).unwrap_or_default();
                Err(malformed(format!("unexpected '{bad}'")))
            }
        }
    }

    fn expect_open(&mut self) -> Result<(), StructuralError> {
        match self.next()? {
            Some(Token::Open) => Ok(()),
            _ => Err(malformed("expected '{'")),
        }
    }

    /// Either `{cell, ...}` or `{{cell, ...}, ...}`.
    fn table(&mut self) -> Result<DelayTable, StructuralError> {
        self.expect_open()?;
        if !matches!(self.tokens.peek(), Some((Ok(Token::Open), _))) {
            return self.cells().map(DelayTable::Vector);
        }

        let mut rows: Vec<Vec<Delay>> = Vec::new();
        loop {
            self.expect_open()?;
            let row = self.cells()?;
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(malformed(format!(
                        "row {} has {} cells, row 0 has {}",
                        rows.len(),
                        row.len(),
                        first.len()
                    )));
                }
            }
            rows.push(row);
            match self.next()? {
                Some(Token::Comma) => {}
                Some(Token::Close) => return Ok(DelayTable::Matrix(rows)),
                _ => return Err(malformed("expected ',' or '}' after row")),
            }
        }
    }

    /// Cells up to and including the closing brace.
    fn cells(&mut self) -> Result<Vec<Delay>, StructuralError> {
        let mut cells = Vec::new();
        loop {
            cells.push(self.cell()?);
            match self.next()? {
                Some(Token::Comma) => {}
                Some(Token::Close) => return Ok(cells),
                _ => return Err(malformed("expected ',' or '}'")),
            }
        }
    }

    fn cell(&mut self) -> Result<Delay, StructuralError> {
        match self.next()? {
            Some(Token::Ident(name)) if name == self.never => Ok(Delay::Never),
            Some(Token::Ident(name)) => Err(malformed(format!("'{name}' is not a delay"))),
            Some(Token::Integer(raw)) => {
                Delay::decode(raw, self.sentinel).ok_or_else(|| malformed(format!("{raw} is not a delay")))
            }
            Some(Token::Open) => Err(malformed("tables nest at most two levels")),
            _ => Err(malformed("expected a value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_encode_decode_sentinel() {
        assert_eq!(Delay::Finite(7).encode(-1), 7);
        assert_eq!(Delay::Never.encode(-1), -1);
        assert_eq!(Delay::decode(-1, -1), Some(Delay::Never));
        assert_eq!(Delay::decode(0, -1), Some(Delay::Finite(0)));
        assert_eq!(Delay::decode(-5, -1), None);
    }

    #[test]
    fn test_from_times_vector() {
        let table = DelayTable::from_times("r", 2, &[5, 3, -1], false).unwrap();
        assert_eq!(
            table,
            DelayTable::vector([Delay::Finite(5), Delay::Finite(3), Delay::Never])
        );
    }

    #[test]
    fn test_from_times_matrix_is_row_major_by_catalyst() {
        let table = DelayTable::from_times("r", 1, &[-1, 4, 2, 1], true).unwrap();
        assert_eq!(table.binary(0, 0), Some(Delay::Never));
        assert_eq!(table.binary(0, 1), Some(Delay::Finite(4)));
        assert_eq!(table.binary(1, 0), Some(Delay::Finite(2)));
        assert_eq!(table.binary(1, 1), Some(Delay::Finite(1)));
    }

    #[test]
    fn test_from_times_wrong_length() {
        let err = DelayTable::from_times("r", 2, &[1, 2], false).unwrap_err();
        assert!(matches!(err, StructuralError::InvalidTimesList { .. }));

        let err = DelayTable::from_times("r", 1, &[1, 2, -3, 4], true).unwrap_err();
        assert!(format!("{err}").contains("-3"));
    }

    #[test]
    fn test_check_side() {
        let v = DelayTable::vector([Delay::Finite(1), Delay::Finite(2)]);
        assert!(v.check_side("r", 2).is_ok());
        assert!(v.check_side("r", 3).is_err());

        let ragged = DelayTable::Matrix(vec![vec![Delay::Never, Delay::Never], vec![Delay::Never]]);
        let err = ragged.check_side("r", 2).unwrap_err();
        assert!(format!("{err}").contains("ragged"));
    }

    #[test]
    fn test_lookup_wrong_kind_is_none() {
        let v = DelayTable::vector([Delay::Finite(1)]);
        assert_eq!(v.binary(0, 0), None);
        assert_eq!(v.unary(1), None);
    }

    #[test]
    fn test_vector_literal() {
        let v = DelayTable::vector([Delay::Finite(5), Delay::Never, Delay::Finite(0)]);
        assert_eq!(v.to_literal("INFINITE_TIME"), "{5, INFINITE_TIME, 0}");
    }

    #[test]
    fn test_matrix_literal_parses_back() {
        let m = DelayTable::matrix([
            [Delay::Never, Delay::Finite(2)],
            [Delay::Finite(10), Delay::Finite(1)],
        ]);
        let text = m.to_literal("INFINITE_TIME");
        assert!(text.starts_with("{\n\t{INFINITE_TIME, 2},"));
        let parsed = DelayTable::parse_literal(&text, "INFINITE_TIME", -1).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn test_parse_literal_accepts_raw_sentinel() {
        let parsed = DelayTable::parse_literal("{-1, 3}", "INFINITE_TIME", -1).unwrap();
        assert_eq!(parsed, DelayTable::vector([Delay::Never, Delay::Finite(3)]));
    }

    #[test]
    fn test_parse_literal_rejects_garbage() {
        assert!(DelayTable::parse_literal("{1, 2", "N", -1).is_err());
        assert!(DelayTable::parse_literal("{1, {2}}", "N", -1).is_err());
        assert!(DelayTable::parse_literal("{1, -2}", "N", -1).is_err());
        assert!(DelayTable::parse_literal("{1} 2", "N", -1).is_err());
        assert!(DelayTable::parse_literal("3", "N", -1).is_err());
        assert!(DelayTable::parse_literal("{1; 2}", "N", -1).is_err());
        assert!(DelayTable::parse_literal("{1, M}", "N", -1).is_err());
        assert!(DelayTable::parse_literal("{{{1}}}", "N", -1).is_err());
    }

    #[test]
    fn test_parse_literal_rejects_ragged_rows() {
        let err = DelayTable::parse_literal("{{1,2},{3}}", "INFINITE_TIME", -1).unwrap_err();
        assert!(matches!(err, StructuralError::MalformedTableLiteral { .. }));
        assert!(format!("{err}").contains("row 1 has 1 cells"));

        let square = DelayTable::parse_literal("{{0,1},{2,3}}", "INFINITE_TIME", -1).unwrap();
        assert!(square.check_side("r", 2).is_ok());
    }

    #[test]
    fn test_from_times_huge_levels_is_an_error() {
        let err = DelayTable::from_times("r", u32::MAX, &[], true).unwrap_err();
        assert!(matches!(err, StructuralError::InvalidTimesList { .. }));
    }

    #[test]
    fn test_entries_row_major() {
        let m = DelayTable::matrix([[Delay::Finite(1), Delay::Finite(2)], [Delay::Finite(3), Delay::Never]]);
        let all: Vec<Delay> = m.entries().collect();
        assert_eq!(
            all,
            vec![Delay::Finite(1), Delay::Finite(2), Delay::Finite(3), Delay::Never]
        );
    }
}
