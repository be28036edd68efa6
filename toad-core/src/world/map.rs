//! The level grid and its `.map` text format.
//!
//! A `.map` file is a bracketed list of rows of tile ids:
//!
//! ```text
//! [
//!     [ -1, -1, 21, ],
//!     [  0,  1,  2, ],
//! ]
//! ```
//!
//! Negative ids are empty cells. Trailing commas are optional and `#` starts
//! a comment that runs to the end of the line.
use std::convert::TryFrom;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use super::{PixelPoint, TilePoint};
use crate::error::{Result, ToadError};
use crate::tileset::{TileId, TileRules};

pub struct TileMap {
    rows: Vec<Vec<Option<TileId>>>,
    width: i32,
    height: i32,
    tile_size: i32,
    rules: TileRules,
}

impl TileMap {
    /// Build a map from raw rows. The width is that of the shortest row.
    pub fn from_rows(raw: Vec<Vec<i32>>, tile_size: i32, rules: TileRules) -> Result<TileMap> {
        if tile_size <= 0 {
            return Err(ToadError::config("map tile size must be positive"));
        }
        let first_len = match raw.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => {
                return Err(ToadError::MapParse {
                    line: 1,
                    column: 1,
                    message: "map has no tiles".to_owned(),
                })
            }
        };
        let mut width = first_len;
        for (i, row) in raw.iter().enumerate() {
            if row.len() != width {
                warn!("row {} has {} tiles, expected {}", i, row.len(), width);
                width = width.min(row.len());
            }
        }
        if width == 0 {
            return Err(ToadError::MapParse {
                line: 1,
                column: 1,
                message: "map has an empty row".to_owned(),
            });
        }
        let rows = raw
            .into_iter()
            .enumerate()
            .map(|(y, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(x, n)| to_tile(n, y, x))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TileMap {
            width: width as i32,
            height: rows.len() as i32,
            rows,
            tile_size,
            rules,
        })
    }
    pub fn parse(src: &str, tile_size: i32, rules: TileRules) -> Result<TileMap> {
        Self::from_rows(parse_rows(src)?, tile_size, rules)
    }
    pub fn load<P: AsRef<Path>>(path: P, tile_size: i32, rules: TileRules) -> Result<TileMap> {
        let path = path.as_ref();
        let src = fs::read_to_string(path)?;
        let map = Self::parse(&src, tile_size, rules)?;
        info!(
            "loaded map {} ({}x{} tiles)",
            path.display(),
            map.width,
            map.height
        );
        Ok(map)
    }

    /// (width, height) in tiles
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
    /// (width, height) in pixels
    pub fn pixel_size(&self) -> (i32, i32) {
        (self.width * self.tile_size, self.height * self.tile_size)
    }
    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }
    pub fn rules(&self) -> &TileRules {
        &self.rules
    }

    /// Tile at a grid coordinate, `None` when empty or outside the map.
    pub fn tile(&self, p: TilePoint) -> Option<TileId> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        self.rows[p.y as usize][p.x as usize]
    }
    pub fn to_tile_point(&self, p: PixelPoint) -> TilePoint {
        TilePoint::new(p.x.div_euclid(self.tile_size), p.y.div_euclid(self.tile_size))
    }
    pub fn tile_at(&self, p: PixelPoint) -> Option<TileId> {
        self.tile(self.to_tile_point(p))
    }
    /// Tile to draw at a grid coordinate: below the map the bottom row
    /// repeats downward.
    pub fn draw_tile(&self, mut p: TilePoint) -> Option<TileId> {
        if p.y >= self.height && 0 <= p.x && p.x < self.width {
            p.y = self.height - 1;
        }
        self.tile(p)
    }

    pub fn is_solid_at(&self, p: PixelPoint) -> bool {
        self.rules.is_solid(self.tile_at(p))
    }
    pub fn is_top_solid_at(&self, p: PixelPoint) -> bool {
        self.rules.is_top_solid(self.tile_at(p))
    }
    pub fn is_non_solid_at(&self, p: PixelPoint) -> bool {
        self.rules.is_non_solid(self.tile_at(p))
    }
}

/// `row` and `col` are 0-based; errors report them 1-based.
fn to_tile(n: i32, row: usize, col: usize) -> Result<Option<TileId>> {
    if n < 0 {
        return Ok(None);
    }
    TileId::try_from(n).map(Some).map_err(|_| ToadError::MapParse {
        line: row + 1,
        column: col + 1,
        message: format!("tile id {} is too large", n),
    })
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor {
            chars: src.chars().peekable(),
            line: 1,
            column: 1,
        }
    }
    fn error(&self, message: impl Into<String>) -> ToadError {
        ToadError::MapParse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
    /// skip whitespace and comments, then peek
    fn peek(&mut self) -> Option<char> {
        loop {
            match self.chars.peek().cloned() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                other => return other,
            }
        }
    }
    fn expect(&mut self, want: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", want, c))),
            None => Err(self.error(format!("expected '{}', found end of file", want))),
        }
    }
    fn number(&mut self) -> Result<i32> {
        let mut digits = String::new();
        if self.peek() == Some('-') {
            digits.push('-');
            self.bump();
        }
        while let Some(c) = self.chars.peek().cloned() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.bump();
        }
        let n: i32 = digits
            .parse()
            .map_err(|_| self.error(format!("invalid tile id '{}'", digits)))?;
        if n > i32::from(TileId::max_value()) {
            return Err(self.error(format!("tile id {} is too large", n)));
        }
        Ok(n)
    }
    /// after an item: either a comma or the closing bracket
    fn separator(&mut self) -> Result<()> {
        match self.peek() {
            Some(',') => {
                self.bump();
                Ok(())
            }
            Some(']') => Ok(()),
            Some(c) => Err(self.error(format!("expected ',' or ']', found '{}'", c))),
            None => Err(self.error("unexpected end of file")),
        }
    }
}

/// Parse the `.map` text format into raw rows.
pub fn parse_rows(src: &str) -> Result<Vec<Vec<i32>>> {
    let mut cur = Cursor::new(src);
    cur.expect('[')?;
    let mut rows = vec![];
    while cur.peek() != Some(']') {
        cur.expect('[')?;
        let mut row = vec![];
        while cur.peek() != Some(']') {
            if cur.peek().is_none() {
                return Err(cur.error("unexpected end of file"));
            }
            row.push(cur.number()?);
            cur.separator()?;
        }
        cur.expect(']')?;
        rows.push(row);
        cur.separator()?;
    }
    cur.expect(']')?;
    if let Some(c) = cur.peek() {
        return Err(cur.error(format!("trailing '{}' after the map", c)));
    }
    Ok(rows)
}

/// Write raw rows in the `.map` text format.
pub fn format_rows(rows: &[Vec<i32>]) -> String {
    let mut out = String::from("[\n");
    for row in rows {
        out.push_str("    [");
        for n in row {
            // writing into a String can't fail
            let _ = write!(out, "{:3},", n);
        }
        out.push_str(" ],\n");
    }
    out.push_str("]\n");
    out
}

#[cfg(test)]
mod map_test {
    use super::*;
    use crate::testutils::rules;
    use euclid::point2;

    const SMALL: &str = "
    # two rows
    [
        [ -1, 21,  0, ],
        [  3,  4,  5  ]
    ]";

    #[test]
    fn parse_small_map() {
        let map = TileMap::parse(SMALL, 16, rules()).unwrap();
        assert_eq!(map.size(), (3, 2));
        assert_eq!(map.pixel_size(), (48, 32));
        assert_eq!(map.tile(point2(0, 0)), None);
        assert_eq!(map.tile(point2(1, 0)), Some(21));
        assert_eq!(map.tile(point2(2, 1)), Some(5));
        assert_eq!(map.tile(point2(3, 0)), None);
        assert_eq!(map.tile(point2(-1, 0)), None);
    }

    #[test]
    fn pixel_lookup_floors() {
        let map = TileMap::parse(SMALL, 16, rules()).unwrap();
        assert_eq!(map.tile_at(point2(47, 31)), Some(5));
        assert_eq!(map.tile_at(point2(32, 15)), Some(0));
        // -1 / 16 floors to -1, outside the map
        assert_eq!(map.tile_at(point2(-1, 0)), None);
        assert!(map.is_solid_at(point2(40, 0)));
        assert!(map.is_top_solid_at(point2(0, 16)));
        assert!(map.is_non_solid_at(point2(0, 0)));
        assert!(map.is_non_solid_at(point2(1000, 1000)));
    }

    #[test]
    fn ragged_rows_use_shortest_width() {
        let map = TileMap::parse("[[1,2,3],[1,2],[1,2,3,4]]", 16, rules()).unwrap();
        assert_eq!(map.size(), (2, 3));
        assert_eq!(map.tile(point2(2, 0)), None);
    }

    #[test]
    fn ground_extends_below_map() {
        let map = TileMap::parse(SMALL, 16, rules()).unwrap();
        assert_eq!(map.draw_tile(point2(1, 7)), Some(4));
        assert_eq!(map.draw_tile(point2(5, 7)), None);
        assert_eq!(map.tile(point2(1, 7)), None);
    }

    #[test]
    fn parse_errors_carry_position() {
        match parse_rows("[\n  [1, x]\n]") {
            Err(ToadError::MapParse { line, column, .. }) => {
                assert_eq!((line, column), (2, 7));
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
        assert!(parse_rows("[[1, 2]").is_err());
        assert!(parse_rows("[[1 2]]").is_err());
        assert!(parse_rows("[[1]] 3").is_err());
        assert!(parse_rows("[[70000]]").is_err());
        assert!(TileMap::parse("[]", 16, rules()).is_err());
        assert!(TileMap::parse("[[]]", 16, rules()).is_err());
    }

    #[test]
    fn oversized_ids_are_rejected_in_rows() {
        match TileMap::from_rows(vec![vec![0, 1], vec![2, 70000]], 16, rules()) {
            Err(ToadError::MapParse { line, column, .. }) => {
                assert_eq!((line, column), (2, 2));
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
        let map = TileMap::from_rows(vec![vec![-1, 65535]], 16, rules()).unwrap();
        assert_eq!(map.tile(point2(1, 0)), Some(65535));
    }

    #[test]
    fn format_matches_converter_layout() {
        let out = format_rows(&[vec![-1, 5], vec![120, 0]]);
        assert_eq!(out, "[\n    [ -1,  5, ],\n    [120,  0, ],\n]\n");
        assert_eq!(parse_rows(&out).unwrap(), vec![vec![-1, 5], vec![120, 0]]);
    }
}
