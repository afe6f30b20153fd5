//! `typedef struct` extraction.

use std::sync::LazyLock;

use endiancraft::{
    field::{Dimension, FieldDecl},
    schema::StructDecl,
};
use regex::Regex;

use crate::{defines::parse_c_integer, errors::HeaderError};

static TYPEDEF_STRUCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"typedef\s+struct\s*(?:[A-Za-z_]\w*\s*)?\{").unwrap());

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"__attribute__\s*\(\((?:[^()]|\([^()]*\))*\)\)|[A-Za-z_]\w*\s*\([^()]*\)").unwrap()
});

static IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z_]\w*").unwrap());

static DECLARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)\s*((?:\[[^\]]*\]\s*)*)$").unwrap()
});

static DIMENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());

const QUALIFIERS: &[&str] = &["const", "volatile"];

/// Extracts every `typedef struct { ... } name;` block from comment-free text.
pub fn parse_structs(text: &str) -> Result<Vec<StructDecl>, HeaderError> {
    let mut structs = Vec::new();

    for m in TYPEDEF_STRUCT.find_iter(text) {
        let open = m.end() - 1;
        let line = line_of(text, m.start());
        let close = matching_brace(text, open).ok_or(HeaderError::UnterminatedStruct { line })?;
        let semicolon = text[close..]
            .find(';')
            .map(|offset| close + offset)
            .ok_or(HeaderError::UnterminatedStruct { line })?;

        let Some(name) = typedef_name(&text[close + 1..semicolon]) else {
            tracing::warn!(line, "skipping struct without a typedef name");
            continue;
        };

        let fields = parse_body(&text[open + 1..close], &name);
        structs.push(StructDecl::new(name, fields));
    }

    Ok(structs)
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Picks the struct name out of the text between `}` and `;`.
///
/// Attributes (`__attribute__((packed))`, `ALIGNED_STRUCT(8)`) are removed
/// first. Of the remaining identifiers the last one that is not written in
/// all caps wins, so `PACKED_STRUCT s1_type` and `s1_type PACKED_STRUCT`
/// both name `s1_type`. Only the first declarator of `} a_t, *a_ptr;` counts.
fn typedef_name(tail: &str) -> Option<String> {
    let first = tail.split(',').next().unwrap_or(tail);
    let stripped = ATTRIBUTE.replace_all(first, " ");
    let idents: Vec<&str> = IDENT.find_iter(&stripped).map(|m| m.as_str()).collect();

    idents
        .iter()
        .rev()
        .find(|ident| ident.chars().any(|c| c.is_ascii_lowercase()))
        .or(idents.last())
        .map(|ident| ident.to_string())
}

/// Splits `body` on top-level `;` and parses each declaration.
fn parse_body(body: &str, struct_name: &str) -> Vec<FieldDecl> {
    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (offset, byte) in body.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => {
                let statement = body[start..offset].trim();
                start = offset + 1;
                if statement.is_empty() {
                    continue;
                }

                let parsed = parse_declaration(statement);
                if parsed.is_empty() {
                    tracing::debug!(struct_name, statement, "skipping unsupported declaration");
                }
                fields.extend(parsed);
            }
            _ => {}
        }
    }

    fields
}

/// Parses `type a[2], b;` into one field per declarator. Pointers, bit-fields,
/// nested aggregates and flexible arrays produce no fields.
pub fn parse_declaration(statement: &str) -> Vec<FieldDecl> {
    if statement.contains(['{', '}', '*', ':', '(']) {
        return Vec::new();
    }

    let mut declarators = statement.split(',');
    let Some(first) = declarators.next() else {
        return Vec::new();
    };

    // Before the first `[`: type words, then the name.
    let first = first.trim();
    let head_end = first.find('[').unwrap_or(first.len());
    let words: Vec<&str> = first[..head_end]
        .split_whitespace()
        .filter(|word| !QUALIFIERS.contains(word))
        .collect();
    let Some((name, type_words)) = words.split_last() else {
        return Vec::new();
    };
    if type_words.is_empty() {
        return Vec::new();
    }
    let type_name = type_words.join(" ");

    let mut fields = Vec::new();
    let first_declarator = format!("{name}{}", &first[head_end..]);
    for declarator in std::iter::once(first_declarator.as_str()).chain(declarators) {
        match parse_declarator(&type_name, declarator.trim()) {
            Some(field) => fields.push(field),
            None => return Vec::new(),
        }
    }

    fields
}

fn parse_declarator(type_name: &str, declarator: &str) -> Option<FieldDecl> {
    let caps = DECLARATOR.captures(declarator)?;
    let dimensions = DIMENSION
        .captures_iter(&caps[2])
        .map(|dim| parse_dimension(&dim[1]))
        .collect::<Option<Vec<_>>>()?;

    Some(FieldDecl::new(type_name, &caps[1], dimensions))
}

/// Integer tokens become literals, anything else a symbol. An empty `[]` or a
/// negative literal is rejected.
fn parse_dimension(token: &str) -> Option<Dimension> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    match parse_c_integer(token) {
        Some(value) => u64::try_from(value).ok().map(Dimension::Literal),
        None => Some(Dimension::Symbol(token.split_whitespace().collect::<Vec<_>>().join(" "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declaration() {
        assert_eq!(
            parse_declaration("uint8_t value"),
            vec![FieldDecl::scalar("uint8_t", "value")]
        );
        assert_eq!(
            parse_declaration("uint8_t buf [MAX_SIZE][ 4 ]"),
            vec![FieldDecl::new(
                "uint8_t",
                "buf",
                vec![Dimension::symbol("MAX_SIZE"), Dimension::Literal(4)]
            )]
        );
        assert_eq!(
            parse_declaration("unsigned   int  flags"),
            vec![FieldDecl::scalar("unsigned int", "flags")]
        );
        assert_eq!(
            parse_declaration("const uint16_t a, b[0x2]"),
            vec![
                FieldDecl::scalar("uint16_t", "a"),
                FieldDecl::array("uint16_t", "b", [2u64]),
            ]
        );
    }

    #[test]
    fn test_parse_declaration_unsupported() {
        assert!(parse_declaration("uint8_t *ptr").is_empty());
        assert!(parse_declaration("uint8_t flag : 1").is_empty());
        assert!(parse_declaration("uint8_t data[]").is_empty());
        assert!(parse_declaration("void (*cb)(int)").is_empty());
        assert!(parse_declaration("lonely").is_empty());
        assert!(parse_declaration("uint8_t bad[-1]").is_empty());
        assert!(parse_declaration("uint8_t ok[2], bad[ -0x4 ]").is_empty());
    }

    #[test]
    fn test_negative_dimension_is_skipped() {
        let text = "typedef struct {
    uint8_t head;
    uint16_t bad[-1];
    uint8_t tail[2];
} neg_t;";
        let structs = parse_structs(text).unwrap();
        assert_eq!(
            structs[0].fields,
            vec![
                FieldDecl::scalar("uint8_t", "head"),
                FieldDecl::array("uint8_t", "tail", [2u64]),
            ]
        );
    }

    #[test]
    fn test_typedef_name() {
        assert_eq!(typedef_name(" PACKED_STRUCT s1_type"), Some("s1_type".to_string()));
        assert_eq!(
            typedef_name(" __attribute__((packed)) device_config_t"),
            Some("device_config_t".to_string())
        );
        assert_eq!(
            typedef_name(" ALIGNED_STRUCT(8) memory_info_t"),
            Some("memory_info_t".to_string())
        );
        assert_eq!(typedef_name(" s1_type PACKED_STRUCT"), Some("s1_type".to_string()));
        assert_eq!(typedef_name(" HDR_T"), Some("HDR_T".to_string()));
        assert_eq!(typedef_name(" a_t, *a_ptr"), Some("a_t".to_string()));
        assert_eq!(typedef_name("  "), None);
    }

    #[test]
    fn test_parse_structs() {
        let text = "
typedef struct
{
  uint32_t config_id;
  uint16_t config_version;
} __attribute__((packed)) device_config_t;

typedef union { uint8_t a; uint16_t b; } skipped_t;

typedef struct tagged {
\tuint8_t port[10];  uint16_t protocol[MAX_20];
\ts1_type nested_address[2];
\tuint8_t *ptr;
} PACKED_STRUCT s2_type;
";
        let structs = parse_structs(text).unwrap();
        assert_eq!(structs.len(), 2);

        assert_eq!(
            structs[0],
            StructDecl::new(
                "device_config_t",
                vec![
                    FieldDecl::scalar("uint32_t", "config_id"),
                    FieldDecl::scalar("uint16_t", "config_version"),
                ]
            )
        );
        assert_eq!(
            structs[1],
            StructDecl::new(
                "s2_type",
                vec![
                    FieldDecl::array("uint8_t", "port", [10u64]),
                    FieldDecl::array("uint16_t", "protocol", ["MAX_20"]),
                    FieldDecl::array("s1_type", "nested_address", [2u64]),
                ]
            )
        );
    }

    #[test]
    fn test_nested_block_is_skipped() {
        let text = "typedef struct {
    uint8_t kind;
    union { uint8_t a; uint16_t b; } u;
    uint16_t tail;
} outer_t;";
        let structs = parse_structs(text).unwrap();
        let names: Vec<&str> = structs[0]
            .fields
            .iter()
            .map(|field| field.field_name.as_str())
            .collect();
        assert_eq!(names, vec!["kind", "tail"]);
    }

    #[test]
    fn test_unterminated_struct() {
        let text = "\n\ntypedef struct {\n uint8_t a;\n";
        assert_eq!(
            parse_structs(text),
            Err(HeaderError::UnterminatedStruct { line: 3 })
        );
    }
}
