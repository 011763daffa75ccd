//! Callout detection for `AsciiDoc` sources.
//!
//! Finds `[source]` blocks, pulls the `<N>` markers out of their code lines and
//! locates the explanations that follow each block, either as `<N> text` list
//! lines or as a callout table (possibly split by `ifdef::`/`ifndef::`
//! conditionals). Everything here is a read-only view over one pass of the
//! document lines.
//!
//! ```
//! use callout_parser::scan_document;
//!
//! let lines = [
//!     "[source,python]",
//!     "----",
//!     "x = 1 <1>",
//!     "----",
//!     "<1> Sets x",
//! ];
//! let scan = scan_document(&lines);
//! assert!(scan.rejected.is_empty());
//! assert_eq!(scan.blocks.len(), 1);
//! assert!(scan.blocks[0].validation.is_valid());
//! ```

mod conditional;
mod detector;
mod error;
mod explanations;
mod model;
mod patterns;
mod scan;
mod table;

pub use detector::{
    CalloutValidation, extract_callouts_from_code, find_code_blocks, remove_callouts_from_code,
    validate_callouts,
};
pub use error::Error;
pub use explanations::{ExplanationSource, Explanations, extract_callout_explanations};
pub use model::{
    AsciiDocTable, Callout, CalloutGroup, CalloutMap, CalloutVariant, CalloutVariants, CodeBlock,
    Fence, Guard, Operation, Polarity, TableCell, TableRow, select_preferred,
};
pub use scan::{AnnotatedBlock, Scan, scan_document};
pub use table::{
    callout_rows, extract_callout_explanations_from_table, extract_callout_variants_from_table,
    find_tables, is_callout_table, table_at,
};
