//! Device tree source emitter
//!
//! Writes DTS text for consumption by `dtc`/`mkimage`. Nodes are opened through
//! [`DtsBuilder::node`], which returns a [`NodeGuard`]; the node is closed when
//! the guard is dropped, so every opened node is closed exactly once and the
//! indentation always matches the nesting depth.
//!
//! ```
//! use boot_artifacts::core::dts::{CellFormat, DtsBuilder};
//!
//! let mut out = String::new();
//! let mut dts = DtsBuilder::new(&mut out);
//! dts.header();
//! {
//!     let mut root = dts.node("/");
//!     root.cells_prop("#address-cells", &[1], CellFormat::Decimal);
//! }
//! assert_eq!(out, "/dts-v1/;\n/ {\n    #address-cells = <1>;\n};\n");
//! ```

use std::ops::{Deref, DerefMut};

use crate::config::defaults::DTS_INDENT;

/// Rendering of integer cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    /// Lowercase hexadecimal with `0x` prefix
    Hex,
    /// Plain decimal
    Decimal,
}

impl CellFormat {
    fn render(self, value: u64) -> String {
        match self {
            Self::Hex => format!("{value:#x}"),
            Self::Decimal => value.to_string(),
        }
    }
}

/// Escape a value for use inside a DTS string literal
pub fn escape(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Stateful DTS writer over a string sink
#[derive(Debug)]
pub struct DtsBuilder<'a> {
    out: &'a mut String,
    nesting: usize,
}

impl<'a> DtsBuilder<'a> {
    /// Create a builder appending to `out`
    pub fn new(out: &'a mut String) -> Self {
        Self { out, nesting: 0 }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.nesting
    }

    /// Write the version preamble
    pub fn header(&mut self) {
        debug_assert!(self.out.is_empty(), "header must be the first line");
        self.write_line("/dts-v1/;");
    }

    /// Open a node that stays open until the returned guard is dropped
    pub fn node(&mut self, name: &str) -> NodeGuard<'_, 'a> {
        self.open_node(name);
        NodeGuard { builder: self }
    }

    /// Write `name = "value";`
    pub fn string_prop(&mut self, name: &str, value: &str) {
        self.write_line(&format!("{name} = \"{}\";", escape(value)));
    }

    /// Write `name = <v0, v1, ...>;`
    pub fn cells_prop(&mut self, name: &str, cells: &[u64], format: CellFormat) {
        let values: Vec<String> = cells.iter().map(|&c| format.render(c)).collect();
        self.write_line(&format!("{name} = <{}>;", values.join(", ")));
    }

    /// Write `name = /incbin/("path");`
    pub fn incbin_prop(&mut self, name: &str, path: &str) {
        self.write_line(&format!("{name} = /incbin/(\"{}\");", escape(path)));
    }

    fn open_node(&mut self, name: &str) {
        self.write_line(&format!("{name} {{"));
        self.nesting += 1;
    }

    fn close_node(&mut self) {
        assert!(self.nesting > 0, "close_node() without a matching open_node()");
        self.nesting -= 1;
        self.write_line("};");
    }

    fn write_line(&mut self, line: &str) {
        self.out.push_str(&" ".repeat(DTS_INDENT * self.nesting));
        self.out.push_str(line);
        self.out.push('\n');
    }
}

/// An open node; closes it on drop
///
/// Derefs to the builder, so properties and child nodes are written through
/// the guard of their parent.
#[derive(Debug)]
pub struct NodeGuard<'b, 'a> {
    builder: &'b mut DtsBuilder<'a>,
}

impl<'a> Deref for NodeGuard<'_, 'a> {
    type Target = DtsBuilder<'a>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl<'a> DerefMut for NodeGuard<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl Drop for NodeGuard<'_, '_> {
    fn drop(&mut self) {
        self.builder.close_node();
    }
}
