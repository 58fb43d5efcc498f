use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
pub use stellar_base::Network;

const HORIZON_URL: &str = "https://horizon.stellar.org";
const HORIZON_TEST_URL: &str = "https://horizon-testnet.stellar.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StellarNetwork {
    #[default]
    Testnet,
    Mainnet,
}

impl StellarNetwork {
    pub fn to_network_url(self) -> &'static str {
        match self {
            StellarNetwork::Testnet => HORIZON_TEST_URL,
            StellarNetwork::Mainnet => HORIZON_URL,
        }
    }

    pub fn to_stellar_network(self) -> Network {
        match self {
            StellarNetwork::Mainnet => Network::new_public(),
            StellarNetwork::Testnet => Network::new_test(),
        }
    }
}

impl fmt::Display for StellarNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StellarNetwork::Testnet => write!(f, "testnet"),
            StellarNetwork::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl FromStr for StellarNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" | "test" => Ok(StellarNetwork::Testnet),
            "mainnet" | "public" => Ok(StellarNetwork::Mainnet),
            other => Err(format!("unknown stellar network '{}'", other)),
        }
    }
}
