//! Renders [`TestVector`]s as GoogleTest C++ source.
//!
//! Each struct becomes one `TEST` that declares its big- and little-endian
//! byte images, checks both against `sizeof` of the native struct, runs the
//! conversion routine on the big-endian image and compares the result with
//! the little-endian one.

use endiancraft::{
    primitive::ByteOrder,
    synth::{Annotation, AnnotationKind, Image, TestVector},
};
use serde::{Deserialize, Serialize};

const INDENT: &str = "    ";
const BYTE_INDENT: &str = "        ";

/// Message header whose id field is stamped into both images before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageHeader {
    /// C type the raw buffers are cast to, e.g. `messageHdr_type`.
    pub type_name: String,
    /// 16-bit id field, e.g. `msgType`.
    pub id_field: String,
}

impl Default for MessageHeader {
    fn default() -> Self {
        MessageHeader {
            type_name: "messageHdr_type".to_string(),
            id_field: "msgType".to_string(),
        }
    }
}

/// Naming and layout of the generated test file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// First argument of every `TEST(...)`.
    pub suite: String,
    /// Conversion routine called as `fn(buffer, size)`.
    pub convert_fn: String,
    /// `None` leaves the images untouched before conversion.
    pub message_header: Option<MessageHeader>,
    pub bytes_per_line: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            suite: "TestCaseName".to_string(),
            convert_fn: "EndianConvertFunc".to_string(),
            message_header: Some(MessageHeader::default()),
            bytes_per_line: 16,
        }
    }
}

/// Id macro for a struct: a trailing `_type` becomes `_id`, otherwise `_id` is appended.
pub fn message_id(struct_name: &str) -> String {
    let name = struct_name.trim();
    match name.strip_suffix("_type") {
        Some(stem) => format!("{stem}_id"),
        None => format!("{name}_id"),
    }
}

fn raw_name(order: ByteOrder, id: &str) -> String {
    format!("{}_raw_{id}", order.name())
}

/// Renders a complete source file including `headers` inside `extern "C"`.
pub fn render_suite(headers: &[&str], vectors: &[TestVector], config: &RenderConfig) -> String {
    let mut lines = vec!["#include <gtest/gtest.h>".to_string(), String::new()];

    lines.push("extern \"C\" {".to_string());
    lines.extend(headers.iter().map(|header| format!("#include \"{header}\"")));
    lines.push("}".to_string());
    lines.push(String::new());

    for vector in vectors {
        lines.push(render_test(vector, config));
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Renders one `TEST(...) { ... }` block.
pub fn render_test(vector: &TestVector, config: &RenderConfig) -> String {
    let id = message_id(&vector.struct_name);
    let struct_name = &vector.struct_name;
    let big = raw_name(ByteOrder::Big, &id);
    let little = raw_name(ByteOrder::Little, &id);

    let mut lines = vec![
        format!("TEST({}, {id}_endian_converter)", config.suite),
        "{".to_string(),
        render_image(&id, &vector.big, config),
        String::new(),
        render_image(&id, &vector.little, config),
        String::new(),
    ];

    for raw in [&big, &little] {
        lines.push(format!("{INDENT}EXPECT_EQ(sizeof({raw}),"));
        lines.push(format!("{INDENT}          sizeof({struct_name}));"));
    }
    lines.push(String::new());

    if let Some(header) = &config.message_header {
        let MessageHeader { type_name, id_field } = header;
        lines.push(format!(
            "{INDENT}{type_name} *pBigEndianMsgHdr = ({type_name} *){big};"
        ));
        lines.push(format!(
            "{INDENT}{type_name} *pLittleEndianMsgHdr = ({type_name} *){little};"
        ));
        lines.push(format!("{INDENT}pBigEndianMsgHdr->{id_field} = htons({id});"));
        lines.push(format!("{INDENT}pLittleEndianMsgHdr->{id_field} = ({id});"));
        lines.push(String::new());
    }

    lines.push(format!(
        "{INDENT}{}({big}, sizeof({struct_name}));",
        config.convert_fn
    ));
    lines.push(String::new());

    lines.push(format!("{INDENT}EXPECT_EQ(0, memcmp({big},"));
    lines.push(format!("{INDENT}                    {little},"));
    lines.push(format!("{INDENT}                    sizeof({little})));"));
    lines.push("}".to_string());

    lines.join("\n")
}

/// Renders the `uint8_t <order>_raw_<id>[] = { ... };` declaration of one image.
///
/// Primitive fields get a `//type name[extents];` comment on their first
/// line; composite elements are bracketed by `// Start:` and `// End:` lines.
pub fn render_image(id: &str, image: &Image, config: &RenderConfig) -> String {
    let mut lines = vec![
        format!("{INDENT}uint8_t {}[] =", raw_name(image.order, id)),
        format!("{INDENT}{{"),
    ];
    let mut open: Vec<&Annotation> = Vec::new();

    for annotation in &image.annotations {
        while open.last().is_some_and(|top| top.depth >= annotation.depth) {
            if let Some(closed) = open.pop() {
                lines.push(composite_marker("End", closed));
            }
        }

        match &annotation.kind {
            AnnotationKind::Composite { .. } => {
                lines.push(composite_marker("Start", annotation));
                open.push(annotation);
            }
            AnnotationKind::Primitive { .. } => {
                let comment = format!(
                    "//{} {}{};",
                    annotation.type_name,
                    annotation.field_name,
                    annotation.subscript()
                );
                push_wrapped(
                    &mut lines,
                    &image.bytes[annotation.range.clone()],
                    &comment,
                    config.bytes_per_line,
                );
            }
        }
    }

    while let Some(closed) = open.pop() {
        lines.push(composite_marker("End", closed));
    }

    lines.push(format!("{INDENT}}};"));
    lines.join("\n")
}

fn composite_marker(label: &str, annotation: &Annotation) -> String {
    format!(
        "{BYTE_INDENT}// {label}: {} {}{}",
        annotation.type_name,
        annotation.field_name,
        annotation.subscript()
    )
}

/// Emits `bytes` at most `per_line` to a line, with `comment` on the first line only.
fn push_wrapped(lines: &mut Vec<String>, bytes: &[u8], comment: &str, per_line: usize) {
    for (i, chunk) in bytes.chunks(per_line.max(1)).enumerate() {
        let joined = chunk
            .iter()
            .map(|byte| format!("0x{byte:02X}"))
            .collect::<Vec<_>>()
            .join(", ");

        if i == 0 {
            lines.push(format!("{BYTE_INDENT}{joined}, {comment}"));
        } else {
            lines.push(format!("{BYTE_INDENT}{joined},"));
        }
    }
}
