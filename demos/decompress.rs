//! Decompress a `.lzma` file to disk.
//!
//! Usage:
//!   cargo run --release --example decompress -- input.lzma output.bin [--mode decompress]

use lzma_stream::{CompressionMode, LzmaReader};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const USAGE: &str = "Usage: decompress <input.lzma> <output> [--mode compress|decompress]";

struct Args {
    input: String,
    output: String,
    mode: CompressionMode,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut mode = CompressionMode::Decompress;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--mode" {
            mode = match iter.next().map(String::as_str) {
                Some("compress") => CompressionMode::Compress,
                Some("decompress") => CompressionMode::Decompress,
                Some(other) => return Err(format!("unknown mode: {}", other)),
                None => return Err("--mode needs a value".to_string()),
            };
        } else {
            positional.push(arg.clone());
        }
    }
    match <[String; 2]>::try_from(positional) {
        Ok([input, output]) => Ok(Args {
            input,
            output,
            mode,
        }),
        Err(_) => Err(USAGE.to_string()),
    }
}

fn run(args: &Args) -> Result<u64, Box<dyn std::error::Error>> {
    let input = Path::new(&args.input);
    let output = Path::new(&args.output);
    if !input.is_file() {
        return Err(format!("input file not found: {}", input.display()).into());
    }

    // Fails before the output is touched when the mode is unsupported.
    let mut reader = LzmaReader::with_mode(BufReader::new(File::open(input)?), args.mode)?;

    if output.exists() {
        eprintln!("warning: overwriting {}", output.display());
    }
    let mut writer = BufWriter::new(File::create(output)?);
    let written = std::io::copy(&mut reader, &mut writer)?;
    writer.flush()?;

    if let Some(header) = reader.header() {
        println!(
            "lc={} lp={} pb={} dict={} bytes",
            header.properties.lc, header.properties.lp, header.properties.pb, header.dict_size
        );
    }
    Ok(written)
}

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("  decompress ./data.lzma ./data.bin");
            std::process::exit(1);
        }
    };

    match run(&args) {
        Ok(written) => println!(
            "Decompressed {} -> {} ({} bytes)",
            args.input, args.output, written
        ),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_mode() {
        let args = parse_args(&argv(&["in.lzma", "out", "--mode", "compress"])).unwrap();
        assert_eq!(args.mode, CompressionMode::Compress);
        let args = parse_args(&argv(&["--mode", "decompress", "in.lzma", "out"])).unwrap();
        assert_eq!(args.mode, CompressionMode::Decompress);
        assert_eq!(parse_args(&argv(&["in.lzma", "out"])).unwrap().mode, CompressionMode::Decompress);
        assert!(parse_args(&argv(&["in.lzma", "out", "--mode", "zip"])).is_err());
        assert!(parse_args(&argv(&["in.lzma"])).is_err());
    }

    #[test]
    fn test_compress_mode_is_rejected() {
        let input = std::env::temp_dir().join(format!("lzma-demo-{}.lzma", std::process::id()));
        std::fs::write(&input, [0x5D, 0, 0, 1, 0]).unwrap();
        let output = input.with_extension("out");
        let args = Args {
            input: input.to_string_lossy().into_owned(),
            output: output.to_string_lossy().into_owned(),
            mode: CompressionMode::Compress,
        };
        let err = run(&args).unwrap_err();
        assert_eq!(err.to_string(), "Compression is not supported");
        assert!(!output.exists());
        std::fs::remove_file(input).unwrap();
    }
}
