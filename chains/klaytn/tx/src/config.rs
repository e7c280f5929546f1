use anyhow::Result;

/// Network preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlaytnConfig {
    pub network: &'static str,
    pub chain_id: u64,
    pub node_uri: &'static str,
    pub currency_unit: &'static str,
    pub currency_symbol: &'static str,
    pub currency_decimals: u32,
}

pub fn config(network: &str) -> Result<KlaytnConfig> {
    let (network, chain_id, node_uri) = match network {
        "mainnet" | "cypress" => ("cypress", 8217, "https://public-en-cypress.klaytn.net"),
        "testnet" | "baobab" => ("baobab", 1001, "https://public-en-baobab.klaytn.net"),
        _ => anyhow::bail!("unsupported network: {network}"),
    };
    Ok(KlaytnConfig {
        network,
        chain_id,
        node_uri,
        currency_unit: "peb",
        currency_symbol: "KLAY",
        currency_decimals: 18,
    })
}
