use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Generate GoogleTest endian converter tests from C struct headers.
#[derive(Debug, Parser)]
#[command(name = "endiancraft", version)]
#[command(about = "Generate endian converter unit tests from C struct headers")]
pub struct Cli {
    /// C headers to read. Files ending in `.json` are read as catalogue descriptions.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (if omitted, prints to stdout).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Set or override a constant, e.g. `-D MAX_20=20`.
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, i64)>,

    /// What to do with array sizes that name an unknown constant.
    #[arg(long, value_enum)]
    pub unresolved: Option<UnresolvedMode>,

    /// Fail on arrays whose size is zero.
    #[arg(long)]
    pub reject_zero: bool,

    /// Four marker bytes, e.g. `A1,B2,C3,D4`.
    #[arg(long)]
    pub pattern: Option<String>,

    /// GoogleTest suite name.
    #[arg(long)]
    pub suite: Option<String>,

    /// Conversion routine under test.
    #[arg(long)]
    pub convert_fn: Option<String>,

    /// Header names for the `#include` block (defaults to the input file names).
    #[arg(long = "include", value_name = "HEADER")]
    pub includes: Vec<String>,

    /// Skip structs that fail to synthesize instead of aborting.
    #[arg(long)]
    pub keep_going: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Gtest)]
    pub format: OutputFormat,

    /// JSON file with render and synthesis settings. Flags take precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// More output on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnresolvedMode {
    /// Fail on the first unresolved size.
    Strict,
    /// Treat unresolved sizes as 0.
    Zero,
    /// Ask for each unresolved constant on stdin.
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Gtest,
    Json,
}

/// Parses `NAME=VALUE` where VALUE is any C integer literal.
fn parse_define(text: &str) -> Result<(String, i64), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{text}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{text}`"));
    }

    let value = endiancraft_header::parse_c_integer(value)
        .ok_or_else(|| format!("`{}` is not an integer", value.trim()))?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_define() {
        assert_eq!(parse_define("MAX_20=20"), Ok(("MAX_20".to_string(), 20)));
        assert_eq!(parse_define(" SIZE = 0x10 "), Ok(("SIZE".to_string(), 16)));
        assert!(parse_define("MAX_20").is_err());
        assert!(parse_define("=4").is_err());
        assert!(parse_define("N=four").is_err());
    }

    #[test]
    fn test_cli_args() {
        let cli = Cli::try_parse_from([
            "endiancraft",
            "a.h",
            "b.h",
            "-D",
            "N=3",
            "--unresolved",
            "prompt",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.defines, vec![("N".to_string(), 3)]);
        assert_eq!(cli.unresolved, Some(UnresolvedMode::Prompt));
        assert_eq!(cli.format, OutputFormat::Gtest);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_inputs_required() {
        assert!(Cli::try_parse_from(["endiancraft"]).is_err());
    }
}
