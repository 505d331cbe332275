//! Helpers to make writing nested text blocks less unpleasant.

use std::fmt;
use std::io::{self, Write};

/// Writes tab-indented lines. `open` and `close` bracket a block and move
/// the indentation.
pub struct Text<W: Write> {
    w: W,
    depth: usize,
}

impl<W: Write> Text<W> {
    pub fn new(w: W) -> Text<W> {
        Text { w, depth: 0 }
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    pub fn line(&mut self, args: fmt::Arguments) -> io::Result<()> {
        for _ in 0..self.depth {
            self.w.write_all(b"\t")?;
        }
        self.w.write_fmt(args)?;
        self.w.write_all(b"\n")
    }

    /// An empty line. Never indented.
    pub fn blank(&mut self) -> io::Result<()> {
        self.w.write_all(b"\n")
    }

    /// `<header> {`
    pub fn open(&mut self, header: fmt::Arguments) -> io::Result<()> {
        self.line(format_args!("{} {{", header))?;
        self.depth += 1;
        Ok(())
    }

    /// `}`
    pub fn close(&mut self) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.line(format_args!("}}"))
    }

    /// One comma-terminated line per item, then an empty line after the
    /// last one.
    pub fn rows<T, F>(&mut self, items: &[T], mut fmt_row: F) -> io::Result<()>
    where F: FnMut(&mut Vec<u8>, &T) -> io::Result<()> {
        let mut row = Vec::with_capacity(64);
        for item in items {
            row.clear();
            fmt_row(&mut row, item)?;
            for _ in 0..self.depth {
                self.w.write_all(b"\t")?;
            }
            self.w.write_all(&row)?;
            self.w.write_all(b",\n")?;
        }
        if !items.is_empty() {
            self.blank()?;
        }
        Ok(())
    }
}

#[test]
fn test_blocks() {
    let mut t = Text::new(vec![]);
    t.open(format_args!("SI_Visibility")).unwrap();
    t.line(format_args!("{},", 1)).unwrap();
    t.open(format_args!("SI_Null {}", "x")).unwrap();
    t.rows(&[1, 2], |w, &x| write!(w, "{}.0", x)).unwrap();
    t.close().unwrap();
    t.close().unwrap();
    t.blank().unwrap();
    let s = String::from_utf8(t.into_inner()).unwrap();
    assert_eq!(s, "SI_Visibility {\n\t1,\n\tSI_Null x {\n\t\t1.0,\n\t\t2.0,\n\n\t}\n}\n\n");
}
