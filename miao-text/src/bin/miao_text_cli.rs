use clap::{Parser, ValueEnum};
use miao_text::{DEFAULT_PASSAGE_CHARS, chunk_paragraphs, normalize, tokenize};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};

/// A CLI tool to inspect how miao normalizes, tokenizes and chunks text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input text file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// What to do with the input.
    #[arg(short, long, value_enum, default_value_t = Mode::Tokenize)]
    mode: Mode,

    /// Maximum passage length in characters (chunk mode only).
    #[arg(long, default_value_t = DEFAULT_PASSAGE_CHARS)]
    max_chars: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Print the normalized form of the input
    Normalize,
    /// Print the normalized form and its tokens
    Tokenize,
    /// Split the input into paragraph passages
    Chunk,
}

#[derive(Serialize)]
struct TokenizeOutput<'a> {
    normalized: &'a str,
    tokens: Vec<String>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let content = if let Some(input_path) = args.input {
        fs::read_to_string(input_path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let json_output = match args.mode {
        Mode::Normalize => serde_json::to_string_pretty(&normalize(&content))?,
        Mode::Tokenize => {
            let normalized = normalize(&content);
            serde_json::to_string_pretty(&TokenizeOutput {
                normalized: &normalized,
                tokens: tokenize(&content),
            })?
        }
        Mode::Chunk => serde_json::to_string_pretty(&chunk_paragraphs(&content, args.max_chars))?,
    };
    println!("{json_output}");

    Ok(())
}
