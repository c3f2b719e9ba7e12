//! BOXCSV: line-oriented text format for shapes built out of axis-aligned boxes.
//!
//! - One box instance per line: local position followed by local scale.
//! - Plain ASCII, no header, no quoting.
//! - Shapes and their generated walls share the same format.
//!
//! Line layout:
//!   x, y, z, sx, sy, sz[,] [/ comment]
//!
//!   - whitespace anywhere on the line is ignored
//!   - `,` ends a field; end of line ends the last field
//!   - `/` ends the line at once; a field in progress is discarded
//!   - parsing stops once six fields are read; anything after is ignored
//!   - a line with fewer than six fields is malformed and dropped
//!   - blank and comment-only lines carry no box
//!
//! Writers emit `x,y,z,sx,sy,sz,` (trailing comma included), which reads back
//! unchanged.

pub mod wall;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use thiserror::Error;

pub use wall::{
    build_wall, footprint_issues, is_wall_file, wall_path_for, FootprintIssue, WallLayout,
    GRID_OFFSET, GRID_SIZE, WALL_SUFFIX,
};

/// Number of numeric fields carried by one line.
pub const FIELDS_PER_LINE: usize = 6;

/// Marker that terminates a line early.
pub const COMMENT_MARKER: char = '/';

/// One axis-aligned box inside a composite shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxInstance {
    /// Offset of the box centre from the shape origin, in shape units.
    pub position: [f32; 3],
    /// Per-axis size of the box before the owning model's scale is applied.
    pub scale: [f32; 3],
}

impl BoxInstance {
    #[inline]
    pub const fn new(position: [f32; 3], scale: [f32; 3]) -> Self {
        Self { position, scale }
    }

    /// A 1×1×1 box centred on the shape origin.
    #[inline]
    pub const fn unit() -> Self {
        Self::new([0.0; 3], [1.0; 3])
    }

    /// A 1×1×1 box at the given position.
    #[inline]
    pub const fn unit_at(x: f32, y: f32, z: f32) -> Self {
        Self::new([x, y, z], [1.0; 3])
    }
}

impl Default for BoxInstance {
    fn default() -> Self {
        Self::unit()
    }
}

/// Why a single line could not produce a box.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("not enough values: expected 6, found {found}")]
    TooFewFields { found: usize },
    #[error("invalid number {value:?}")]
    InvalidNumber { value: String },
}

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("cannot access shape file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShapeError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn complete_field(
    pending: &mut String,
    fields: &mut [f32; FIELDS_PER_LINE],
    found: &mut usize,
) -> Result<(), LineError> {
    let value = pending
        .parse::<f32>()
        .map_err(|_| LineError::InvalidNumber {
            value: pending.clone(),
        })?;
    fields[*found] = value;
    *found += 1;
    pending.clear();
    Ok(())
}

/// Parse one line. `Ok(None)` means the line is blank or only a comment.
pub fn parse_line(line: &str) -> Result<Option<BoxInstance>, LineError> {
    let mut fields = [0.0f32; FIELDS_PER_LINE];
    let mut found = 0usize;
    let mut pending = String::new();
    let mut chars = line.chars();

    while found < FIELDS_PER_LINE {
        match chars.next() {
            Some(c) if c.is_whitespace() => {}
            Some(',') => complete_field(&mut pending, &mut fields, &mut found)?,
            Some(COMMENT_MARKER) => break,
            None => {
                if !pending.is_empty() {
                    complete_field(&mut pending, &mut fields, &mut found)?;
                }
                break;
            }
            Some(c) => pending.push(c),
        }
    }

    match found {
        0 => Ok(None),
        FIELDS_PER_LINE => Ok(Some(BoxInstance::new(
            [fields[0], fields[1], fields[2]],
            [fields[3], fields[4], fields[5]],
        ))),
        found => Err(LineError::TooFewFields { found }),
    }
}

/// Parse a whole document. Malformed lines are logged and dropped.
pub fn parse_shape_str(text: &str) -> Vec<BoxInstance> {
    let mut boxes = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(b)) => boxes.push(b),
            Ok(None) => debug!("line {}: no box", idx + 1),
            Err(err) => warn!("line {}: {} (skipped)", idx + 1, err),
        }
    }

    boxes
}

/// Read every box from a shape file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<BoxInstance>, ShapeError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ShapeError::io(path, e))?;
    Ok(parse_shape_str(&text))
}

/// Read a shape file; an unreadable file is logged and yields no boxes.
pub fn load_shape<P: AsRef<Path>>(path: P) -> Vec<BoxInstance> {
    match read_file(path) {
        Ok(boxes) => boxes,
        Err(err) => {
            error!("{}", err);
            Vec::new()
        }
    }
}

/// Encode one box as a single line (without the newline).
pub fn format_box(b: &BoxInstance) -> String {
    let [x, y, z] = b.position;
    let [sx, sy, sz] = b.scale;
    format!("{x},{y},{z},{sx},{sy},{sz},")
}

/// Encode a list of boxes as a complete document.
pub fn to_shape_string(boxes: &[BoxInstance]) -> String {
    let mut out = String::with_capacity(boxes.len() * 16);
    for b in boxes {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", format_box(b));
    }
    out
}

/// Write boxes to `path`, replacing any existing file.
pub fn write_file<P: AsRef<Path>>(path: P, boxes: &[BoxInstance]) -> Result<(), ShapeError> {
    let path = path.as_ref();
    fs::write(path, to_shape_string(boxes)).map_err(|e| ShapeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_line() {
        let b = parse_line("1,2,3,4,5,6").unwrap().unwrap();
        assert_eq!(b.position, [1.0, 2.0, 3.0]);
        assert_eq!(b.scale, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_ignores_whitespace() {
        let b = parse_line("  -1 ,\t0.5, 2 ,1 , 1,  1 ,").unwrap().unwrap();
        assert_eq!(b.position, [-1.0, 0.5, 2.0]);
        assert_eq!(b.scale, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_values_after_sixth_are_ignored() {
        let b = parse_line("0,0,0,1,1,1,9,9,oops").unwrap().unwrap();
        assert_eq!(b, BoxInstance::unit());
    }

    #[test]
    fn test_comment_cuts_field_in_progress() {
        assert_eq!(
            parse_line("1,1,0,1,1,1/ top right"),
            Err(LineError::TooFewFields { found: 5 })
        );
        let b = parse_line("1,1,0,1,1,1, / top right").unwrap().unwrap();
        assert_eq!(b.position, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_comment_truncates_short_line() {
        assert_eq!(
            parse_line("1,2,3 / rest, 1, 1"),
            Err(LineError::TooFewFields { found: 2 })
        );
    }

    #[test]
    fn test_blank_and_comment_lines_carry_nothing() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t"), Ok(None));
        assert_eq!(parse_line("// a comment"), Ok(None));
    }

    #[test]
    fn test_invalid_number() {
        assert_eq!(
            parse_line("1,x,3,1,1,1"),
            Err(LineError::InvalidNumber { value: "x".into() })
        );
        assert_eq!(
            parse_line("1,,3,1,1,1"),
            Err(LineError::InvalidNumber { value: String::new() })
        );
    }

    #[test]
    fn test_document_drops_malformed_lines() {
        let text = "// tee\n0,0,0,1,1,1,\n1,0,0,1,1,1,\nbroken\n0,1,0,\n\n-1,0,0,1,1,1,\n";
        let boxes = parse_shape_str(text);
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(boxes[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(boxes[2].position, [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l.csv");
        let boxes = vec![
            BoxInstance::new([0.0, -1.0, 0.0], [1.0, 1.0, 1.0]),
            BoxInstance::new([0.5, 2.25, -3.0], [2.0, 0.5, 1.0]),
            BoxInstance::unit_at(4.0, 4.0, 0.0),
        ];

        write_file(&path, &boxes).unwrap();
        assert_eq!(read_file(&path).unwrap(), boxes);
    }

    #[test]
    fn test_format_box() {
        assert_eq!(format_box(&BoxInstance::unit_at(-4.0, 3.0, 0.0)), "-4,3,0,1,1,1,");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        assert!(matches!(read_file(&path), Err(ShapeError::Io { .. })));
        assert!(load_shape(&path).is_empty());
    }
}
