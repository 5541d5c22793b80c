use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use bencode_btih::{
    decode_from_with, decode_with, verify_round_trip, Btih, DecoderConfig, TorrentFile, Value,
};
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, about = "Decode bencoded files and verify their info hash", long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a .torrent file, self-check it and print its BTIH
    Check {
        torrent: PathBuf,

        /// Fail unless the computed BTIH equals this hex string
        #[arg(long)]
        expect_btih: Option<String>,
    },
    /// Print the decoded value tree of a file, or of stdin when the path is "-"
    Dump {
        input: PathBuf,

        /// Reject negative zero and leading zeros
        #[arg(long)]
        strict: bool,

        /// Maximum nesting of lists and dictionaries
        #[arg(long, default_value_t = bencode_btih::config::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match args.command {
        Command::Check {
            torrent,
            expect_btih,
        } => {
            let object = TorrentFile::new(&torrent)
                .parse()
                .with_context(|| format!("parse {}", torrent.display()))?;
            let btih = object.btih().context("info hash was not computed")?;
            println!("Info Hash: {}", btih);

            if let Some(expected) = expect_btih {
                let expected = Btih::from_hex(&expected).context("parse expected info hash")?;
                if expected.bytes != btih.bytes {
                    bail!("BTIH mismatch. Expected: {}. Got: {}.", expected, btih);
                }
                println!("OK");
            }
        }
        Command::Dump {
            input,
            strict,
            max_depth,
        } => {
            let config = DecoderConfig::default()
                .with_strict_integers(strict)
                .with_max_depth(max_depth);
            let value = if input.as_os_str() == "-" {
                decode_from_with(io::stdin().lock(), config).context("decode stdin")?
            } else {
                let contents = std::fs::read(&input)
                    .with_context(|| format!("open {}", input.display()))?;
                let value = decode_with(&contents, config)
                    .with_context(|| format!("decode {}", input.display()))?;
                if let Err(e) = verify_round_trip(&contents, &value) {
                    tracing::warn!("{}", e);
                }
                tracing::info!(len = contents.len(), "decoded file");
                value
            };

            let mut out = io::stdout().lock();
            render(&value, 0, &mut out)?;
        }
    }
    Ok(())
}

fn render<W: Write>(value: &Value, indent: usize, out: &mut W) -> io::Result<()> {
    let pad = "  ".repeat(indent);
    match value {
        Value::Integer(i) => writeln!(out, "{}{}", pad, i),
        Value::ByteString(bs) => match bs.as_str() {
            Some(s) if !s.chars().any(char::is_control) => writeln!(out, "{}{:?}", pad, s),
            _ => writeln!(out, "{}<{} bytes> {}", pad, bs.len(), preview_hex(bs)),
        },
        Value::List(list) => {
            writeln!(out, "{}[", pad)?;
            for item in list {
                render(item, indent + 1, out)?;
            }
            writeln!(out, "{}]", pad)
        }
        Value::Dictionary(items) => {
            writeln!(out, "{}{{", pad)?;
            for item in items {
                writeln!(out, "{}  {:?}:", pad, item.key_str())?;
                render(&item.value, indent + 2, out)?;
            }
            writeln!(out, "{}}}", pad)
        }
    }
}

// Long binary strings (piece hashes) are cut to their first 20 bytes.
fn preview_hex(bytes: &[u8]) -> String {
    let shown = &bytes[..bytes.len().min(20)];
    if shown.len() < bytes.len() {
        format!("{}...", hex::encode(shown))
    } else {
        hex::encode(shown)
    }
}
