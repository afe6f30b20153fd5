//! Reads C header text into `endiancraft` struct declarations and constants.
//!
//! This is a pragmatic extractor, not a C parser: it understands comments,
//! object-like `#define`s with integer values and `typedef struct` blocks of
//! primitive, struct and array fields. Anything else is skipped.
//!
//! ```
//! let header = endiancraft_header::parse_header(
//!     "#define MAX 4\n\
//!      typedef struct { uint16_t a; uint8_t b[MAX]; } PACKED_STRUCT msg_type;",
//! )
//! .unwrap();
//!
//! assert_eq!(header.structs[0].struct_name, "msg_type");
//! assert_eq!(header.defines.constants.get("MAX"), Some(4));
//! ```

pub mod defines;
pub mod errors;
pub mod structs;

use std::sync::LazyLock;

use endiancraft::schema::StructDecl;
use regex::{Captures, Regex};

pub use crate::{
    defines::{Defines, OpaqueDefine, parse_c_integer},
    errors::HeaderError,
};

static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//[^\n]*").unwrap());

/// Everything extracted from one or more headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Structs in source order.
    pub structs: Vec<StructDecl>,
    pub defines: Defines,
}

impl Header {
    /// Appends another header's structs and defines. Constants defined in
    /// both keep the value from `other`.
    pub fn merge(&mut self, other: Header) {
        self.structs.extend(other.structs);
        self.defines.constants.extend(other.defines.constants.iter());
        self.defines.opaque.extend(other.defines.opaque);
    }
}

/// Removes `/* */` and `//` comments. Block comments keep their line breaks
/// so line numbers in errors still match the source.
pub fn strip_comments(text: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(text, |caps: &Captures| {
        let newlines = caps[0].matches('\n').count();
        if newlines == 0 {
            " ".to_string()
        } else {
            "\n".repeat(newlines)
        }
    });

    LINE_COMMENT.replace_all(&without_blocks, "").into_owned()
}

#[tracing::instrument(level = "trace", name = "parse_header", skip_all)]
pub fn parse_header(text: &str) -> Result<Header, HeaderError> {
    let text = strip_comments(text);
    let defines = defines::parse_defines(&text);
    let structs = structs::parse_structs(&text)?;

    tracing::debug!(
        structs = structs.len(),
        constants = defines.constants.len(),
        "parsed header"
    );

    Ok(Header { structs, defines })
}
