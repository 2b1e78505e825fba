//! Trust Check CLI
//!
//! Command-line front end for the trust filter engine and the public key
//! codec: check a name against a policy file, or inspect a key blob.

use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use ndn_trust_core::{logging, Name, Packet, PacketKind, TrustConfig};
use ndn_trust_crypto::{DigestAlgorithm, KeyBlobCodec};
use ndn_trust_filter::{FilterCompiler, FilterSet};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};

/// JSON output for the filter command
#[derive(Debug, Serialize)]
struct FilterOutput {
    name: String,
    kind: PacketKind,
    filters: Vec<FilterMatch>,
    matched: bool,
}

#[derive(Debug, Serialize)]
struct FilterMatch {
    index: usize,
    filter: String,
    matches: bool,
}

/// JSON output for the key command
#[derive(Debug, Serialize)]
struct KeyOutput {
    key_type: String,
    size: usize,
    sha256: String,
    base64: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct FilterArgs {
    policy: Option<PathBuf>,
    name: Option<String>,
    interest: bool,
    json: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct KeyArgs {
    input: Option<PathBuf>,
    base64: bool,
    json: bool,
}

fn cmd_filter(args: FilterArgs, config: &TrustConfig) -> Result<()> {
    let policy_path = args
        .policy
        .or_else(|| config.policy.path.clone())
        .ok_or_else(|| anyhow!("Missing --policy argument"))?;
    let uri = args.name.ok_or_else(|| anyhow!("Missing --name argument"))?;

    let text = fs::read_to_string(&policy_path)
        .with_context(|| format!("Failed to read policy {}", policy_path.display()))?;
    let policy = FilterCompiler::compile_policy(&text)
        .with_context(|| format!("Failed to compile policy {}", policy_path.display()))?;
    info!(policy = %policy_path.display(), filters = policy.len(), "policy loaded");

    let name = Name::from_uri(&uri).with_context(|| format!("Invalid name {}", uri))?;
    let packet = if args.interest {
        Packet::Interest(&name)
    } else {
        Packet::Data(&name)
    };

    let (filters, matched) = evaluate(&policy, packet);

    if args.json {
        let output = FilterOutput {
            name: name.to_uri(),
            kind: packet.kind(),
            filters,
            matched,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} {}", packet.kind(), name);
        for f in &filters {
            let mark = if f.matches { "match" } else { "-" };
            println!("  [{}] {:<6} {}", f.index, mark, f.filter);
        }
        if filters.is_empty() {
            println!("  (no filters, every packet passes)");
        }
    }

    Ok(())
}

/// Per-filter results plus the policy's overall decision.
fn evaluate(policy: &FilterSet, packet: Packet<'_>) -> (Vec<FilterMatch>, bool) {
    let filters = policy
        .filters()
        .iter()
        .enumerate()
        .map(|(index, filter)| FilterMatch {
            index,
            filter: filter.matcher().to_string(),
            matches: filter.matches(packet),
        })
        .collect();

    (filters, policy.matches(packet))
}

fn cmd_key(args: KeyArgs) -> Result<()> {
    let input = args.input.ok_or_else(|| anyhow!("Missing --input argument"))?;
    let raw = fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;

    let der = if args.base64 {
        decode_base64_text(&raw)?
    } else {
        raw
    };
    debug!(bytes = der.len(), "loaded key input");

    let key = KeyBlobCodec::decode(&der)?;
    let output = KeyOutput {
        key_type: format!("{:?}", key.key_type()),
        size: key.as_bytes().len(),
        sha256: hex::encode(key.digest(DigestAlgorithm::Sha256)),
        base64: KeyBlobCodec::render(&key),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Key type: {}", output.key_type);
        println!("Size: {} bytes", output.size);
        println!("SHA-256: {}", output.sha256);
        print!("{}", output.base64);
    }

    Ok(())
}

/// Base64 text with arbitrary line breaks.
fn decode_base64_text(text: &[u8]) -> Result<Vec<u8>> {
    let compact: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    general_purpose::STANDARD
        .decode(compact)
        .context("Input is not valid base64")
}

/// Value following a flag, or an error naming the flag.
fn take_value<'a, I>(flag: &str, args: &mut I) -> Result<&'a String>
where
    I: Iterator<Item = &'a String>,
{
    args.next()
        .ok_or_else(|| anyhow!("{} was provided without a value", flag))
}

fn parse_filter_args(args: &[String]) -> Result<FilterArgs> {
    let mut parsed = FilterArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--policy" | "-p" => parsed.policy = Some(PathBuf::from(take_value(arg, &mut iter)?)),
            "--name" | "-n" => parsed.name = Some(take_value(arg, &mut iter)?.clone()),
            "--interest" => parsed.interest = true,
            "--json" => parsed.json = true,
            other => bail!("Unknown option {}", other),
        }
    }

    Ok(parsed)
}

fn parse_key_args(args: &[String]) -> Result<KeyArgs> {
    let mut parsed = KeyArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" | "-i" => parsed.input = Some(PathBuf::from(take_value(arg, &mut iter)?)),
            "--base64" => parsed.base64 = true,
            "--json" => parsed.json = true,
            other => bail!("Unknown option {}", other),
        }
    }

    Ok(parsed)
}

/// Remove `--config <path>` from anywhere in the argument list.
fn split_config(args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut config = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-c" {
            let path = iter
                .next()
                .ok_or_else(|| anyhow!("--config was provided without a path"))?;
            config = Some(PathBuf::from(path));
        } else {
            rest.push(arg);
        }
    }

    Ok((config, rest))
}

fn load_config(path: Option<PathBuf>) -> Result<TrustConfig> {
    match path {
        Some(path) => TrustConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(TrustConfig::default()),
    }
}

fn print_usage() {
    println!("Trust Check - Evaluate NDN trust filters and public keys");
    println!();
    println!("USAGE:");
    println!("    trust-check [--config <toml>] filter --policy <file> --name <uri> [--interest] [--json]");
    println!("    trust-check [--config <toml>] key --input <file> [--base64] [--json]");
    println!();
    println!("COMMANDS:");
    println!("    filter    Show which policy filters match a Data or signed Interest name");
    println!("    key       Decode an RSA SubjectPublicKeyInfo and print its fingerprint");
    println!();
    println!("EXAMPLES:");
    println!("    trust-check filter --policy trust.info --name /ndn/site/KEY/1");
    println!("    trust-check filter --policy trust.info --name /ndn/site/cmd/sig/val --interest");
    println!("    trust-check key --input anchor.b64 --base64 --json");
}

fn run(args: Vec<String>) -> Result<()> {
    let (config_path, args) = split_config(args)?;
    let config = load_config(config_path)?;
    logging::init_from_config(&config.logging);

    let Some((command, rest)) = args.split_first() else {
        print_usage();
        bail!("Missing command");
    };

    match command.as_str() {
        "filter" => cmd_filter(parse_filter_args(rest)?, &config),
        "key" => cmd_key(parse_key_args(rest)?),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command {}", other)
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_config_anywhere() {
        let (config, rest) =
            split_config(strings(&["filter", "--config", "t.toml", "--json"])).unwrap();
        assert_eq!(config, Some(PathBuf::from("t.toml")));
        assert_eq!(rest, strings(&["filter", "--json"]));

        assert!(split_config(strings(&["key", "--config"])).is_err());
    }

    #[test]
    fn test_parse_filter_args() {
        let parsed =
            parse_filter_args(&strings(&["--policy", "p.info", "-n", "/a/b", "--interest"]))
                .unwrap();
        assert_eq!(
            parsed,
            FilterArgs {
                policy: Some(PathBuf::from("p.info")),
                name: Some("/a/b".to_string()),
                interest: true,
                json: false,
            }
        );

        assert!(parse_filter_args(&strings(&["--name"])).is_err());
        assert!(parse_filter_args(&strings(&["--relation", "equal"])).is_err());
    }

    #[test]
    fn test_parse_key_args() {
        let parsed = parse_key_args(&strings(&["-i", "k.der", "--json"])).unwrap();
        assert_eq!(parsed.input, Some(PathBuf::from("k.der")));
        assert!(parsed.json);
        assert!(!parsed.base64);
    }

    #[test]
    fn test_empty_policy_passes_every_packet() {
        let name = Name::from_uri("/a/b").unwrap();
        let (filters, matched) = evaluate(&FilterSet::default(), Packet::Data(&name));
        assert!(filters.is_empty());
        assert!(matched);

        let policy = FilterCompiler::compile_policy(
            "filter\n{\n  type name\n  name /x\n  relation equal\n}\n",
        )
        .unwrap();
        let (filters, matched) = evaluate(&policy, Packet::Data(&name));
        assert_eq!(filters.len(), 1);
        assert!(!filters[0].matches);
        assert!(!matched);
    }

    #[test]
    fn test_decode_base64_text_ignores_line_breaks() {
        let der = decode_base64_text(b"MBwwDQYJKoZIhvcNAQEB\nBQADCwAwCAIDAMNbAgED\n").unwrap();
        assert_eq!(der.len(), 30);
        assert!(KeyBlobCodec::decode(&der).is_ok());

        assert!(decode_base64_text(b"not base64!").is_err());
    }
}
