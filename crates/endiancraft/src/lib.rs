//! # endiancraft
//!
//! Builds test vectors for endian-conversion routines from declarative C
//! struct layouts.
//!
//! Describe structs as ordered fields (primitive or nested struct types,
//! optionally multi-dimensional arrays with literal or symbolic extents),
//! collect them in a [schema::Catalogue], then synthesize the big- and
//! little-endian memory images of any struct. The two images hold the same
//! marker bytes and differ only in the byte order inside each multi-byte
//! field, so converting one into the other must reproduce it exactly.
//!
//! ## Example
//!
//! ```
//! use endiancraft::constants::ResolvedConstants;
//! use endiancraft::field::FieldDecl;
//! use endiancraft::primitive::ByteOrder;
//! use endiancraft::schema::{Catalogue, StructDecl};
//! use endiancraft::synth::synthesize;
//!
//! let catalogue = Catalogue::new(vec![StructDecl::new(
//!     "msg_type",
//!     vec![
//!         FieldDecl::scalar("uint16_t", "a"),
//!         FieldDecl::scalar("uint8_t", "b"),
//!     ],
//! )])
//! .unwrap();
//! let constants = ResolvedConstants::new();
//!
//! let big = synthesize(&catalogue, "msg_type", &constants, ByteOrder::Big).unwrap();
//! let little = synthesize(&catalogue, "msg_type", &constants, ByteOrder::Little).unwrap();
//! assert_eq!(big.bytes, vec![0xA1, 0xB2, 0xA1]);
//! assert_eq!(little.bytes, vec![0xB2, 0xA1, 0xA1]);
//! ```

pub mod constants;
pub mod errors;
pub mod field;
pub mod pattern;
pub mod primitive;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod synth;
