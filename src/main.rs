//! soroban-lifecycle: command-line front end for the lifecycle client.
//!
//! ```text
//! config (TOML, optional) + flags
//!     → ClientContext (JSON-RPC endpoint, network)
//!     → LocalKeypairSigner (secret seed from the environment)
//!     → Lifecycle::execute / contract helpers
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use soroban_lifecycle::config::{load_config, ClientConfig};
use soroban_lifecycle::decode::{
    contract_id_from_address, fetch_contract_instance, fetch_contract_spec, restore_footprint,
};
use soroban_lifecycle::lifecycle::signals::cancel_on_ctrl_c;
use soroban_lifecycle::observability::{logging, metrics};
use soroban_lifecycle::rpc::types::{EventFilter, GetEventsRequest, Pagination};
use soroban_lifecycle::rpc::types::hash_from_hex;
use soroban_lifecycle::strkey;
use soroban_lifecycle::xdr::{
    self, ContractExecutable, ContractIdPreimage, ContractIdPreimageFromAddress, ScAddress,
    ScSpecEntry, ScSpecTypeDef, ScString, ScSymbol, ScVal, ScVec, Uint256,
};
use soroban_lifecycle::{
    Cancellation, ClientContext, DecodedOutcome, Error, ExecuteRequest, Lifecycle,
    LocalKeypairSigner, Operation, PollPolicy, Timeout,
};

#[derive(Parser)]
#[command(name = "soroban-lifecycle")]
#[command(about = "Build, sign, submit and decode Soroban transactions", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the RPC URL.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override the network preset (testnet, futurenet, mainnet, standalone).
    #[arg(long)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check endpoint health and network
    Health,
    /// Show an account's sequence number
    Account { address: String },
    /// Invoke a contract function
    Invoke {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        function: String,
        /// Typed argument, e.g. `u32:5`, `i128:-7`, `sym:hello`, `addr:G…`
        #[arg(long = "arg")]
        args: Vec<String>,
    },
    /// Upload contract WASM
    Upload { wasm: PathBuf },
    /// Create a contract from uploaded WASM
    Deploy {
        /// Hex hash of the uploaded WASM
        #[arg(long)]
        wasm_hash: String,
        /// Hex 32-byte salt; random when omitted
        #[arg(long)]
        salt: Option<String>,
    },
    /// Print a contract's interface
    Spec {
        #[arg(long)]
        contract: String,
    },
    /// List contract events
    Events {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        start_ledger: Option<u32>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Restore an archived contract instance and its code
    Restore {
        #[arg(long)]
        contract: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.rpc_url {
        config.rpc.url = url;
    }
    if let Some(network) = cli.network {
        config.network.name = network;
        config.network.passphrase = None;
    }

    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let ctx = ClientContext::from_config(&config)?;
    tracing::info!(network = %ctx.network.name, rpc = %config.rpc.url, "Client ready");

    match cli.command {
        Commands::Health => {
            let health = ctx.endpoint.get_health().await?;
            let network = ctx.endpoint.get_network().await?;
            let latest = ctx.endpoint.get_latest_ledger().await?;
            println!("status:           {}", health.status);
            println!("passphrase:       {}", network.passphrase);
            println!("protocol version: {}", network.protocol_version);
            println!("latest ledger:    {}", latest.sequence);
            if network.passphrase != ctx.network.passphrase {
                eprintln!("warning: endpoint serves a different network than configured");
            }
        }
        Commands::Account { address } => {
            let account = ctx.accounts.get_account(&address).await?;
            println!("{} sequence {}", account.account_id, account.sequence);
        }
        Commands::Spec { contract } => {
            let id = strkey::decode_contract(&contract)?;
            for entry in fetch_contract_spec(&ctx, &id).await? {
                println!("{}", describe_entry(&entry));
            }
        }
        Commands::Events {
            contract,
            start_ledger,
            limit,
        } => {
            let start_ledger = match start_ledger {
                Some(ledger) => ledger,
                None => ctx.endpoint.get_latest_ledger().await?.sequence.saturating_sub(1000),
            };
            let request = GetEventsRequest {
                start_ledger: Some(start_ledger),
                filters: vec![EventFilter {
                    event_type: Some("contract".into()),
                    contract_ids: vec![contract],
                    topics: Vec::new(),
                }],
                pagination: Some(Pagination {
                    cursor: None,
                    limit: Some(limit),
                }),
            };
            let response = ctx.endpoint.get_events(&request).await?;
            for event in &response.events {
                let topics: Vec<String> = event.decoded_topics()?.iter().map(render).collect();
                println!(
                    "ledger {} [{}] {}",
                    event.ledger,
                    topics.join(", "),
                    render(&event.decoded_value()?)
                );
            }
            println!("{} events up to ledger {}", response.events.len(), response.latest_ledger);
        }
        command => run_transaction(command, &config, ctx).await?,
    }

    Ok(())
}

/// Commands that build, sign and submit an envelope.
async fn run_transaction(
    command: Commands,
    config: &ClientConfig,
    ctx: ClientContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let signer = LocalKeypairSigner::from_env(&config.signer.secret_key_env)?;
    let source = signer.address().to_string();

    let (operations, soroban_data) = match command {
        Commands::Invoke {
            contract,
            function,
            args,
        } => {
            let args = args.iter().map(|a| parse_arg(a)).collect::<Result<Vec<_>, _>>()?;
            let op = Operation::Invoke {
                contract: strkey::decode_contract(&contract)?,
                function,
                args,
            };
            (vec![op], None)
        }
        Commands::Upload { wasm } => {
            let wasm = std::fs::read(&wasm)?;
            (vec![Operation::UploadCode { wasm }], None)
        }
        Commands::Deploy { wasm_hash, salt } => {
            let wasm_hash = hash_from_hex(&wasm_hash)?;
            let salt = match salt {
                Some(hex) => hash_from_hex(&hex)?.0,
                None => rand::random::<[u8; 32]>(),
            };
            let deployer = ScAddress::Account(signer.account_id());
            let predicted = contract_id_from_address(&ctx.network, &deployer, salt)?;
            tracing::info!(contract = %strkey::encode_contract(&predicted), "Deploying contract");
            let op = Operation::CreateContract {
                preimage: ContractIdPreimage::Address(ContractIdPreimageFromAddress {
                    address: deployer,
                    salt: Uint256(salt),
                }),
                executable: ContractExecutable::Wasm(wasm_hash),
            };
            (vec![op], None)
        }
        Commands::Restore { contract } => {
            let id = strkey::decode_contract(&contract)?;
            let wasm_hash = match fetch_contract_instance(&ctx, &id).await?.executable {
                ContractExecutable::Wasm(hash) => hash,
                ContractExecutable::StellarAsset => {
                    return Err("asset contracts have no code to restore".into())
                }
            };
            let data = restore_footprint(&id, &wasm_hash)?;
            (vec![Operation::RestoreFootprint], Some(data))
        }
        Commands::Health | Commands::Account { .. } | Commands::Spec { .. } | Commands::Events { .. } => {
            return Err("not a transaction command".into())
        }
    };

    let cancellation = Cancellation::new();
    let _ctrl_c = cancel_on_ctrl_c(cancellation.clone());

    let lifecycle = Lifecycle::new(ctx, Arc::new(signer))
        .with_policy(PollPolicy::from_config(&config.polling))
        .with_cancellation(cancellation);

    let mut request = ExecuteRequest::new(source, operations)
        .fee(config.transaction.base_fee)
        .timeout(Timeout::from_secs(config.transaction.timeout_secs));
    if let Some(data) = soroban_data {
        request = request.soroban_data(data);
    }

    match lifecycle.execute(request).await {
        Ok(execution) => {
            println!("hash:   {}", execution.hash);
            println!("ledger: {}", execution.ledger);
            match execution.outcome {
                DecodedOutcome::Value(v) => println!("result: {}", render(&v)),
                DecodedOutcome::WasmHash(h) => println!("wasm hash: {}", h),
                DecodedOutcome::ContractId(id) => {
                    println!("contract: {}", strkey::encode_contract(&id))
                }
                DecodedOutcome::Applied => println!("applied"),
            }
            Ok(())
        }
        Err(Error::PollingTimeout { hash, attempts }) => {
            eprintln!("still pending after {} polls; check {} later", attempts, hash);
            Err(Error::PollingTimeout { hash, attempts }.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse a `type:value` argument into a contract value.
fn parse_arg(arg: &str) -> Result<ScVal, Error> {
    let (kind, value) = arg
        .split_once(':')
        .ok_or_else(|| Error::InvalidInput(format!("argument '{}' is not type:value", arg)))?;
    let bad = |e: &dyn std::fmt::Display| Error::InvalidInput(format!("argument '{}': {}", arg, e));
    Ok(match kind {
        "bool" => ScVal::Bool(value.parse().map_err(|e| bad(&e))?),
        "u32" => ScVal::U32(value.parse().map_err(|e| bad(&e))?),
        "i32" => ScVal::I32(value.parse().map_err(|e| bad(&e))?),
        "u64" => ScVal::U64(value.parse().map_err(|e| bad(&e))?),
        "i64" => ScVal::I64(value.parse().map_err(|e| bad(&e))?),
        "u128" => xdr::u128_val(value.parse().map_err(|e| bad(&e))?),
        "i128" => xdr::i128_val(value.parse().map_err(|e| bad(&e))?),
        "sym" => xdr::symbol(value).map_err(|e| bad(&e))?,
        "str" => ScVal::String(ScString(value.try_into().map_err(|e| bad(&e))?)),
        "addr" => ScVal::Address(strkey::decode_address(value)?),
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown argument type '{}'",
                other
            )))
        }
    })
}

fn render(value: &ScVal) -> String {
    if let Some(n) = xdr::as_integer(value) {
        return n.to_string();
    }
    match value {
        ScVal::Bool(b) => b.to_string(),
        ScVal::Void => "()".into(),
        ScVal::Symbol(ScSymbol(s)) => s.to_utf8_string_lossy(),
        ScVal::String(ScString(s)) => s.to_utf8_string_lossy(),
        ScVal::Address(a) => strkey::encode_address(a),
        ScVal::Vec(Some(ScVec(items))) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        other => format!("{:?}", other),
    }
}

fn type_name(def: &ScSpecTypeDef) -> String {
    match def {
        ScSpecTypeDef::Udt(udt) => udt.name.to_utf8_string_lossy(),
        other => other.name().to_lowercase(),
    }
}

fn describe_entry(entry: &ScSpecEntry) -> String {
    match entry {
        ScSpecEntry::FunctionV0(f) => {
            let inputs: Vec<String> = f
                .inputs
                .iter()
                .map(|i| format!("{}: {}", i.name.to_utf8_string_lossy(), type_name(&i.type_)))
                .collect();
            let output = f
                .outputs
                .first()
                .map(|o| format!(" -> {}", type_name(o)))
                .unwrap_or_default();
            format!("fn {}({}){}", f.name.0.to_utf8_string_lossy(), inputs.join(", "), output)
        }
        ScSpecEntry::UdtStructV0(s) => format!("struct {}", s.name.to_utf8_string_lossy()),
        ScSpecEntry::UdtUnionV0(u) => format!("union {}", u.name.to_utf8_string_lossy()),
        ScSpecEntry::UdtEnumV0(e) => format!("enum {}", e.name.to_utf8_string_lossy()),
        ScSpecEntry::UdtErrorEnumV0(e) => format!("error {}", e.name.to_utf8_string_lossy()),
        ScSpecEntry::EventV0(e) => format!("event {}", e.name.0.to_utf8_string_lossy()),
    }
}
