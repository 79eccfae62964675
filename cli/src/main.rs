//! NttWatch CLI.
//!
//! # Commands
//! ```text
//! nttwatch decode     --hex <bytes> [--format account|wire|outbox]
//! nttwatch message-id make  --chain <id> --block <n> --emitter <hex> --sequence <n>
//! nttwatch message-id parse <id>
//! nttwatch resume     --config <file> --chain <name> [--ntt]
//! nttwatch info
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::{debug, info};

use nttwatch_codec::{
    NativeTokenTransfer, NttManagerMessage, OutboxItem, TransceiverMessage, TrimmedAmount,
    ValidatedTransceiverMessage,
};
use nttwatch_core::keys::{make_message_id, parse_message_id};
use nttwatch_core::{
    chain_id_to_name, Chain, ChainWatchConfig, LogConfig, MonitorConfig, ResumeTracker, RetryConfig,
    WatchMode,
};

mod logging;

#[derive(Parser)]
#[command(
    name = "nttwatch",
    about = "NttWatch CLI: cross-chain message watcher tooling",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PayloadFormat {
    /// Solana `ValidatedTransceiverMessage` account
    Account,
    /// Wire-format `TransceiverMessage`
    Wire,
    /// Solana outbox item account
    Outbox,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an NTT payload carrying a token transfer
    Decode {
        /// Payload bytes (hex, optional 0x prefix)
        #[arg(long)]
        hex: String,
        #[arg(long, value_enum, default_value = "account")]
        format: PayloadFormat,
        /// Also print the amount normalized to this many decimals
        #[arg(long)]
        decimals: Option<u8>,
    },

    /// Build or parse order-preserving message ids
    #[command(name = "message-id", subcommand)]
    MessageId(MessageIdCommand),

    /// Print the block a chain's watcher would resume from
    Resume {
        /// Monitor config file (JSON)
        #[arg(long)]
        config: PathBuf,
        /// Chain name or numeric id
        #[arg(long)]
        chain: String,
        /// Use the NTT cursor and deployment table
        #[arg(long)]
        ntt: bool,
    },

    /// Show defaults and supported backends
    Info,
}

#[derive(Subcommand)]
enum MessageIdCommand {
    Make {
        #[arg(long)]
        chain: u16,
        #[arg(long)]
        block: u64,
        #[arg(long)]
        emitter: String,
        #[arg(long)]
        sequence: u64,
    },
    Parse {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log = LogConfig::default();
    if cli.verbose {
        log.level = "debug".into();
    }

    match cli.command {
        Commands::Decode { hex, format, decimals } => {
            logging::init_tracing(&log);
            cmd_decode(&hex, format, decimals)
        }
        Commands::MessageId(cmd) => cmd_message_id(cmd),
        Commands::Resume { config, chain, ntt } => cmd_resume(config, &chain, ntt, cli.verbose).await,
        Commands::Info => {
            cmd_info();
            Ok(())
        }
    }
}

// ─── decode ──────────────────────────────────────────────────────────────────

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let s = input.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).with_context(|| format!("invalid hex input ({} chars)", s.len()))
}

fn amount_json(amount: &TrimmedAmount, decimals: Option<u8>) -> Value {
    let mut v = json!({ "amount": amount.amount.to_string(), "decimals": amount.decimals });
    if let Some(target) = decimals {
        v["normalized"] = match amount.normalize(target) {
            Some(n) => json!(n.to_string()),
            None => Value::Null,
        };
    }
    v
}

fn transfer_json(t: &NativeTokenTransfer, decimals: Option<u8>) -> Value {
    json!({
        "trimmedAmount": amount_json(&t.trimmed_amount, decimals),
        "sourceToken": hex::encode(t.source_token),
        "recipientAddress": hex::encode(t.recipient_address),
        "recipientChain": t.recipient_chain,
    })
}

fn manager_json(m: &NttManagerMessage<NativeTokenTransfer>, decimals: Option<u8>) -> Value {
    json!({
        "id": hex::encode(m.id),
        "sender": hex::encode(m.sender),
        "payload": transfer_json(&m.payload, decimals),
    })
}

fn cmd_decode(input: &str, format: PayloadFormat, decimals: Option<u8>) -> Result<()> {
    let bytes = parse_hex(input)?;
    debug!(len = bytes.len(), ?format, "decoding payload");
    let out = match format {
        PayloadFormat::Account => {
            let msg = ValidatedTransceiverMessage::<NativeTokenTransfer>::try_decode(&bytes)?;
            json!({
                "fromChain": msg.from_chain,
                "fromChainName": chain_id_to_name(msg.from_chain),
                "sourceNttManager": hex::encode(msg.source_ntt_manager),
                "recipientNttManager": hex::encode(msg.recipient_ntt_manager),
                "nttManagerPayload": manager_json(&msg.ntt_manager_payload, decimals),
            })
        }
        PayloadFormat::Wire => {
            let msg = TransceiverMessage::<NativeTokenTransfer>::decode(&bytes)?;
            json!({
                "transceiver": msg.format.to_string(),
                "sourceNttManager": hex::encode(msg.source_ntt_manager),
                "recipientNttManager": hex::encode(msg.recipient_ntt_manager),
                "nttManagerPayload": manager_json(&msg.ntt_manager_payload, decimals),
                "transceiverPayload": hex::encode(&msg.transceiver_payload),
            })
        }
        PayloadFormat::Outbox => {
            let item = OutboxItem::decode_account(&bytes)?;
            json!({
                "amount": amount_json(&item.amount, decimals),
                "sender": hex::encode(item.sender),
                "recipientChain": item.recipient_chain,
                "recipientNttManager": hex::encode(item.recipient_ntt_manager),
                "recipientAddress": hex::encode(item.recipient_address),
                "releaseTimestamp": item.release_timestamp,
                "released": item.released,
            })
        }
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

// ─── message-id ──────────────────────────────────────────────────────────────

fn cmd_message_id(cmd: MessageIdCommand) -> Result<()> {
    match cmd {
        MessageIdCommand::Make {
            chain,
            block,
            emitter,
            sequence,
        } => {
            println!("{}", make_message_id(chain, block, &emitter, sequence));
        }
        MessageIdCommand::Parse { id } => {
            let parsed = parse_message_id(&id)?;
            let out = json!({
                "chain": parsed.chain,
                "chainName": chain_id_to_name(parsed.chain),
                "block": parsed.block.to_string(),
                "emitter": parsed.emitter,
                "sequence": parsed.sequence.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

// ─── resume ──────────────────────────────────────────────────────────────────

async fn cmd_resume(path: PathBuf, chain: &str, ntt: bool, verbose: bool) -> Result<()> {
    let config = MonitorConfig::load(&path)?;
    let mut log = config.log.clone();
    if verbose {
        log.level = "debug".into();
    }
    logging::init_tracing(&log);

    let chain: Chain = chain.parse()?;
    let mode = if ntt { WatchMode::Ntt } else { WatchMode::Vaa };
    let block = resume_block(&config, chain, mode).await?;
    println!("{block}");
    Ok(())
}

async fn resume_block(config: &MonitorConfig, chain: Chain, mode: WatchMode) -> Result<u64> {
    debug!(storage = ?config.storage, "opening store");
    let store = nttwatch_storage::open(&config.storage).await?;
    let tracker = ResumeTracker::new(store, Arc::new(config.deployments.clone()), config.network);
    match tracker.resume_block(chain, mode).await? {
        Some(block) => {
            info!(%chain, %mode, network = %config.network, block, "resume point");
            Ok(block)
        }
        None => Err(anyhow!(
            "no resume point for {chain} ({mode}) on {}: nothing persisted and no deployment block configured",
            config.network
        )),
    }
}

// ─── info ────────────────────────────────────────────────────────────────────

fn cmd_info() {
    let defaults = ChainWatchConfig::new(Chain::Ethereum);
    let retry = RetryConfig::default();
    println!("NttWatch v{}", env!("CARGO_PKG_VERSION"));
    println!("  Default poll interval: {} ms", defaults.poll_interval_ms);
    println!("  Default max block range: {} blocks/cycle", defaults.max_block_range);
    println!("  Default request timeout: {} ms", defaults.request_timeout_ms);
    println!(
        "  Default retry: {} retries, {} to {} ms backoff (x{})",
        retry.max_retries, retry.initial_backoff_ms, retry.max_backoff_ms, retry.multiplier
    );
    let sqlite = if cfg!(feature = "sqlite") { "enabled" } else { "disabled" };
    println!("  Storage backends: memory, json, sqlite ({sqlite})");
    println!("  Known chains: {}", Chain::ALL.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_decode() {
        let cli = Cli::try_parse_from(["nttwatch", "decode", "--hex", "0x00", "--format", "wire"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Decode { format: PayloadFormat::Wire, .. }
        ));
    }

    #[test]
    fn cli_parses_message_id_parse() {
        let cli = Cli::try_parse_from(["nttwatch", "message-id", "parse", "00002/1/e/2"]).unwrap();
        assert!(matches!(cli.command, Commands::MessageId(MessageIdCommand::Parse { .. })));
    }

    #[test]
    fn hex_prefix_optional() {
        assert_eq!(parse_hex("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(parse_hex("beef\n").unwrap(), vec![0xbe, 0xef]);
        assert!(parse_hex("xyz").is_err());
    }

    #[test]
    fn normalized_amount_is_stringified() {
        let v = amount_json(&TrimmedAmount::new(1000, 6), Some(8));
        assert_eq!(v["normalized"], "100000");
        assert_eq!(v["amount"], "1000");
    }

    #[test]
    fn decode_rejects_short_account() {
        assert!(cmd_decode("00", PayloadFormat::Account, None).is_err());
    }

    #[tokio::test]
    async fn resume_uses_deployment_block_then_gap() {
        let config = MonitorConfig::from_json(
            r#"{
                "network": "Mainnet",
                "deployments": { "ntt": { "Mainnet": { "Solana": 260508723 } } }
            }"#,
        )
        .unwrap();
        assert_eq!(
            resume_block(&config, Chain::Solana, WatchMode::Ntt).await.unwrap(),
            260_508_723
        );
        let err = resume_block(&config, Chain::Solana, WatchMode::Vaa).await.unwrap_err();
        assert!(err.to_string().contains("no resume point"));
    }
}
