use std::collections::BTreeMap;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use dexswap::prelude::*;
use dexswap::service::{SwapParams, SwapService};

fn trade_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name("chain")
            .long("chain")
            .value_name("CHAIN_ID")
            .help("Chain id to trade on")
            .required(true)
            .takes_value(true),
        Arg::with_name("from")
            .long("from")
            .value_name("TOKEN")
            .help("Token to sell, 0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE for the native token")
            .required(true)
            .takes_value(true),
        Arg::with_name("amount")
            .long("amount")
            .value_name("AMOUNT")
            .help("Human readable amount to sell, e.g. 1.5")
            .required(true)
            .takes_value(true),
        Arg::with_name("wallet")
            .short("w")
            .long("wallet")
            .value_name("NAME")
            .help("Configured wallet to use")
            .default_value("default")
            .takes_value(true),
        Arg::with_name("yes")
            .short("y")
            .long("yes")
            .help("Skip the confirmation prompt"),
    ]
}

fn quote_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name("to")
            .long("to")
            .value_name("TOKEN")
            .help("Token to buy")
            .required(true)
            .takes_value(true),
        Arg::with_name("slippage")
            .long("slippage")
            .value_name("FRACTION")
            .help("Maximum slippage as a fraction, e.g. 0.03")
            .takes_value(true),
        Arg::with_name("recipient")
            .long("recipient")
            .value_name("ADDRESS")
            .help("Address receiving the bought tokens")
            .takes_value(true),
        Arg::with_name("param")
            .long("param")
            .value_name("KEY=VALUE")
            .help("Extra query parameter forwarded to the aggregator")
            .multiple(true)
            .number_of_values(1)
            .takes_value(true),
    ]
}

fn parse_address(matches: &ArgMatches, name: &str) -> Result<Address> {
    let value = matches
        .value_of(name)
        .ok_or_else(|| anyhow!("--{} must be specified", name))?;
    value
        .parse::<Address>()
        .with_context(|| format!("Invalid --{} address {}", name, value))
}

fn parse_params(matches: &ArgMatches) -> Result<SwapParams> {
    let chain_id = matches
        .value_of("chain")
        .unwrap_or_default()
        .parse::<u64>()
        .context("Invalid --chain")?;
    let from_token = parse_address(matches, "from")?;
    let to_token = match matches.value_of("to") {
        Some(_) => parse_address(matches, "to")?,
        None => Address::ZERO,
    };
    let amount = matches.value_of("amount").unwrap_or_default();

    let mut params = SwapParams::new(chain_id, from_token, to_token, amount);
    params.wallet = matches.value_of("wallet").unwrap_or("default").to_string();
    params.slippage = matches.value_of("slippage").map(str::to_string);
    params.recipient = match matches.value_of("recipient") {
        Some(_) => Some(parse_address(matches, "recipient")?),
        None => None,
    };

    let mut extra = BTreeMap::new();
    for param in matches.values_of("param").into_iter().flatten() {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid --param {}, expected KEY=VALUE", param))?;
        extra.insert(key.to_string(), value.to_string());
    }
    params.extra = extra;
    Ok(params)
}

fn confirm(matches: &ArgMatches) -> Result<()> {
    if matches.is_present("yes") {
        return Ok(());
    }
    info!("\nPress Enter to continue or Ctrl+C to cancel...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    if input.trim() != "" {
        error!("Aborted");
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    // Parse command-line arguments
    let matches = App::new("dexswap")
        .about("Swap tokens through the OKX DEX aggregator")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .default_value("config.yml")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("swap")
                .about("Approve if needed, then sign and broadcast the swap")
                .args(&trade_args())
                .args(&quote_args()),
        )
        .subcommand(
            SubCommand::with_name("approve")
                .about("Approve the aggregator to spend the token if the allowance is short")
                .args(&trade_args()),
        )
        .subcommand(
            SubCommand::with_name("quote")
                .about("Print the aggregator's swap transaction without sending it")
                .args(&trade_args())
                .args(&quote_args()),
        )
        .get_matches();

    // Read config file
    let config_file = matches.value_of("config").unwrap_or("config.yml");
    let config = read_config_file::<UnifiedConfig>(config_file)?;

    if config.chains.is_empty() {
        error!("At least one chain must be specified in config");
        std::process::exit(1);
    }

    let service = SwapService::from_config(&config)?;

    match matches.subcommand() {
        ("swap", Some(sub)) => {
            let params = parse_params(sub)?;
            let wallet = service.wallet(&params.wallet)?;
            info!("Chain ID: {}", params.chain_id);
            info!("Wallet: {} ({})", wallet.name, wallet.address);
            info!("Selling {} of {}", params.amount, params.from_token);
            info!("Buying {}", params.to_token);
            info!(
                "Slippage: {}",
                params
                    .slippage
                    .as_deref()
                    .unwrap_or(&config.swap.default_slippage)
            );
            if let Some(recipient) = params.recipient {
                info!("Recipient: {}", recipient);
            }
            confirm(sub)?;

            let tx_hash = service.execute_swap(&params).await?;
            info!("Swap completed: {}", tx_hash);
            println!("{}", tx_hash);
        }
        ("approve", Some(sub)) => {
            let params = parse_params(sub)?;
            let wallet = service.wallet(&params.wallet)?;
            let amount = service
                .amount_in_base_units(params.chain_id, params.from_token, &params.amount)
                .await?;
            info!(
                "Approving {} base units of {} for {}",
                amount, params.from_token, wallet.address
            );
            confirm(sub)?;

            match service
                .check_and_approve(params.chain_id, params.from_token, wallet, amount)
                .await?
            {
                Some(tx_hash) => println!("{}", tx_hash),
                None => info!("Allowance already sufficient, nothing to approve"),
            }
        }
        ("quote", Some(sub)) => {
            let params = parse_params(sub)?;
            let wallet = service.wallet(&params.wallet)?;
            let quote = service.create_swap_transaction(&params, wallet.address).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        _ => unreachable!("clap enforces a subcommand"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexswap::tokens::parse_token_amount;

    fn app<'a, 'b>() -> App<'a, 'b> {
        App::new("test").args(&trade_args()).args(&quote_args())
    }

    #[test]
    fn parses_swap_arguments() {
        let matches = app().get_matches_from(vec![
            "test",
            "--chain",
            "56",
            "--from",
            "0x55d398326f99059fF775485246999027B3197955",
            "--to",
            "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
            "--amount",
            "12.5",
            "--slippage",
            "0.01",
            "--param",
            "dexIds=1,2",
            "--param",
            "autoSlippage=false",
        ]);
        let params = parse_params(&matches).unwrap();
        assert_eq!(params.chain_id, 56);
        assert_eq!(params.amount, "12.5");
        assert_eq!(params.wallet, "default");
        assert_eq!(params.slippage.as_deref(), Some("0.01"));
        assert!(params.recipient.is_none());
        assert_eq!(params.extra.len(), 2);
        assert_eq!(params.extra["dexIds"], "1,2");
        assert!(dexswap::tokens::is_native(&params.to_token));
        assert_eq!(parse_token_amount(&params.amount, 6).unwrap(), U256::from(12_500_000));
    }

    #[test]
    fn approve_arguments_need_no_target() {
        let matches = App::new("test").args(&trade_args()).get_matches_from(vec![
            "test",
            "--chain",
            "1",
            "--from",
            "0x55d398326f99059fF775485246999027B3197955",
            "--amount",
            "3",
            "--wallet",
            "trading",
            "-y",
        ]);
        let params = parse_params(&matches).unwrap();
        assert_eq!(params.to_token, Address::ZERO);
        assert_eq!(params.wallet, "trading");
        assert!(params.slippage.is_none());
        assert!(params.extra.is_empty());
        assert!(matches.is_present("yes"));

        let rejected = App::new("test")
            .args(&trade_args())
            .get_matches_from_safe(vec![
                "test",
                "--chain",
                "1",
                "--from",
                "0x55d398326f99059fF775485246999027B3197955",
                "--amount",
                "3",
                "--to",
                "0x55d398326f99059fF775485246999027B3197955",
            ]);
        assert!(rejected.is_err());
    }

    #[test]
    fn rejects_malformed_param() {
        let matches = app().get_matches_from(vec![
            "test",
            "--chain",
            "1",
            "--from",
            "0x55d398326f99059fF775485246999027B3197955",
            "--to",
            "0x55d398326f99059fF775485246999027B3197955",
            "--amount",
            "1",
            "--param",
            "novalue",
        ]);
        assert!(parse_params(&matches).is_err());
    }
}
