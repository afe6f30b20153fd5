use std::{
    fs,
    io::{BufRead, Write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use endiancraft::{
    constants::{ResolvedConstants, UnresolvedPolicy},
    schema::{Catalogue, StructDecl},
    serde::CatalogueDef,
    synth::{Synthesizer, TestVector},
};
use endiancraft_header::{Header, parse_c_integer, parse_header};

use crate::config::Settings;

/// Reads every input into one header. Later inputs override earlier constants.
pub fn load_inputs(paths: &[impl AsRef<Path>]) -> Result<Header> {
    let mut merged = Header::default();

    for path in paths {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let header = if path.extension().is_some_and(|ext| ext == "json") {
            let def: CatalogueDef = serde_json::from_str(&text)
                .with_context(|| format!("invalid catalogue {}", path.display()))?;
            let mut header = Header {
                structs: def.structs.into_iter().map(StructDecl::from).collect(),
                ..Default::default()
            };
            header.defines.constants.extend(def.constants);
            header
        } else {
            parse_header(&text).with_context(|| format!("failed to parse {}", path.display()))?
        };

        tracing::info!(
            path = %path.display(),
            structs = header.structs.len(),
            constants = header.defines.constants.len(),
            "loaded input"
        );
        merged.merge(header);
    }

    Ok(merged)
}

/// Header constants, then configured defines, then prompted answers.
pub fn resolve_constants<R: BufRead, W: Write>(
    catalogue: &Catalogue,
    header: &Header,
    settings: &Settings,
    input: &mut R,
    output: &mut W,
) -> Result<ResolvedConstants> {
    let mut constants = header.defines.constants.clone();
    constants.extend(settings.defines.iter().cloned());

    let missing: Vec<&str> = catalogue
        .symbols()
        .into_iter()
        .filter(|symbol| !constants.contains(symbol))
        .collect();

    for symbol in &missing {
        if let Some(opaque) = header.defines.opaque.iter().find(|d| d.name == *symbol) {
            tracing::warn!(symbol, value = %opaque.value, "constant is not an integer literal");
        }
    }

    if settings.prompt {
        for symbol in missing {
            let value = prompt_value(symbol, input, output)?;
            constants.insert(symbol, value);
        }
    } else if settings.synth.unresolved == UnresolvedPolicy::Zero {
        for symbol in missing {
            tracing::warn!(symbol, "unresolved constant treated as 0");
        }
    }

    Ok(constants)
}

/// Asks for `symbol` until the answer is an integer. An empty answer means 0.
fn prompt_value<R: BufRead, W: Write>(symbol: &str, input: &mut R, output: &mut W) -> Result<i64> {
    loop {
        write!(output, "Enter the value of {symbol} (empty for 0): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no value given for `{symbol}`");
        }

        let answer = line.trim();
        if answer.is_empty() {
            return Ok(0);
        }
        match parse_c_integer(answer) {
            Some(value) => return Ok(value),
            None => writeln!(output, "`{answer}` is not an integer")?,
        }
    }
}

/// Synthesizes every non-empty struct. With `keep_going` failing structs
/// are logged and skipped, otherwise the first failure is returned.
pub fn synthesize_all(
    catalogue: &Catalogue,
    constants: &ResolvedConstants,
    settings: &Settings,
    keep_going: bool,
) -> Result<Vec<TestVector>> {
    let synthesizer = Synthesizer::new(catalogue, constants)
        .with_options(settings.synth)
        .with_generator(settings.pattern);

    let mut vectors = Vec::new();
    for (decl, result) in synthesizer.vectors() {
        match result {
            Ok(vector) => {
                tracing::debug!(struct_name = %decl.struct_name, len = vector.len(), "synthesized");
                vectors.push(vector);
            }
            Err(error) if keep_going => {
                tracing::warn!(struct_name = %decl.struct_name, %error, "skipping struct");
            }
            Err(error) => {
                return Err(error).with_context(|| format!("failed to synthesize {}", decl.struct_name));
            }
        }
    }

    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use endiancraft::constants::SynthOptions;
    use endiancraft_gtest::RenderConfig;

    use super::*;

    const HEADER: &str = "
#define COUNT 2
typedef struct { uint16_t a[COUNT]; uint8_t b[WIDTH]; } PACKED_STRUCT first_type;
typedef struct { uint32_t c[DEPTH]; } second_type;
typedef struct { } empty_type;
";

    fn settings(synth: SynthOptions, prompt: bool) -> Settings {
        Settings {
            render: RenderConfig::default(),
            synth,
            prompt,
            pattern: Default::default(),
            defines: vec![("WIDTH".to_string(), 3)],
        }
    }

    fn parsed() -> (Header, Catalogue) {
        let header = parse_header(HEADER).unwrap();
        let catalogue = Catalogue::new(header.structs.clone()).unwrap();
        (header, catalogue)
    }

    #[test]
    fn test_prompt_for_missing_constants() {
        let (header, catalogue) = parsed();
        let mut input = Cursor::new("abc\n0x4\n");
        let mut output = Vec::new();

        let constants = resolve_constants(
            &catalogue,
            &header,
            &settings(SynthOptions::default(), true),
            &mut input,
            &mut output,
        )
        .unwrap();

        assert_eq!(constants.get("COUNT"), Some(2));
        assert_eq!(constants.get("WIDTH"), Some(3));
        assert_eq!(constants.get("DEPTH"), Some(4));

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Enter the value of DEPTH").count(), 2);
        assert!(output.contains("`abc` is not an integer"));
    }

    #[test]
    fn test_prompt_empty_answer_is_zero() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        assert_eq!(prompt_value("N", &mut input, &mut output).unwrap(), 0);
    }

    #[test]
    fn test_prompt_end_of_input() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(prompt_value("N", &mut input, &mut output).is_err());
    }

    #[test]
    fn test_synthesize_all() {
        let (header, catalogue) = parsed();
        let strict = settings(SynthOptions::default(), false);
        let constants = resolve_constants(
            &catalogue,
            &header,
            &strict,
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .unwrap();

        assert!(synthesize_all(&catalogue, &constants, &strict, false).is_err());

        let vectors = synthesize_all(&catalogue, &constants, &strict, true).unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].struct_name, "first_type");
        assert_eq!(vectors[0].len(), 2 * 2 + 3);

        let permissive = settings(SynthOptions::permissive(), false);
        let vectors = synthesize_all(&catalogue, &constants, &permissive, false).unwrap();
        let names: Vec<&str> = vectors.iter().map(|v| v.struct_name.as_str()).collect();
        assert_eq!(names, vec!["first_type", "second_type"]);
        assert!(vectors[1].is_empty());
    }
}
