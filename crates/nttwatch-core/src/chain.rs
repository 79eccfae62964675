//! Network and chain identity.
//!
//! Chain ids are the `u16` values shared by every Wormhole contract. The
//! id ↔ name mapping is one-to-one; Mainnet and Testnet chains simply use
//! disjoint ids (e.g. `Sepolia` = 10002).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WatcherError;

/// Deployment environment. Resume tables are keyed per network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "Mainnet"),
            Self::Testnet => write!(f, "Testnet"),
            Self::Devnet => write!(f, "Devnet"),
        }
    }
}

impl FromStr for Network {
    type Err = WatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            other => Err(WatcherError::Config(format!("unknown network: {other}"))),
        }
    }
}

macro_rules! chains {
    ($($variant:ident = $id:literal),+ $(,)?) => {
        /// A Wormhole chain, represented by its universal `u16` chain id.
        #[repr(u16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Chain {
            $($variant = $id,)+
        }

        impl Chain {
            /// Every known chain, in id order.
            pub const ALL: &'static [Chain] = &[$(Chain::$variant,)+];

            /// Human-readable chain name (e.g. `"Solana"`).
            pub fn name(self) -> &'static str {
                match self {
                    $(Chain::$variant => stringify!($variant),)+
                }
            }
        }

        impl TryFrom<u16> for Chain {
            type Error = WatcherError;

            fn try_from(id: u16) -> Result<Self, Self::Error> {
                match id {
                    $($id => Ok(Chain::$variant),)+
                    other => Err(WatcherError::Config(format!("unknown chain id: {other}"))),
                }
            }
        }
    };
}

chains! {
    Solana = 1,
    Ethereum = 2,
    Terra = 3,
    Bsc = 4,
    Polygon = 5,
    Avalanche = 6,
    Oasis = 7,
    Algorand = 8,
    Aurora = 9,
    Fantom = 10,
    Karura = 11,
    Acala = 12,
    Klaytn = 13,
    Celo = 14,
    Near = 15,
    Moonbeam = 16,
    Neon = 17,
    Terra2 = 18,
    Injective = 19,
    Osmosis = 20,
    Sui = 21,
    Aptos = 22,
    Arbitrum = 23,
    Optimism = 24,
    Gnosis = 25,
    Pythnet = 26,
    Xpla = 28,
    Btc = 29,
    Base = 30,
    Sei = 32,
    Rootstock = 33,
    Scroll = 34,
    Mantle = 35,
    Blast = 36,
    Xlayer = 37,
    Linea = 38,
    Berachain = 39,
    Wormchain = 3104,
    Cosmoshub = 4000,
    Evmos = 4001,
    Kujira = 4002,
    Neutron = 4003,
    Celestia = 4004,
    Sepolia = 10002,
    ArbitrumSepolia = 10003,
    BaseSepolia = 10004,
    OptimismSepolia = 10005,
    Holesky = 10006,
    PolygonSepolia = 10007,
}

impl Chain {
    /// The universal Wormhole chain id.
    pub fn id(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chain {
    type Err = WatcherError;

    /// Accepts a chain name (case-insensitive) or a numeric chain id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<u16>() {
            return Chain::try_from(id);
        }
        Chain::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| WatcherError::Config(format!("unknown chain: {s}")))
    }
}

/// Display name for a raw chain id; `"Unknown"` when the id is not known.
pub fn chain_id_to_name(id: u16) -> &'static str {
    Chain::try_from(id).map(Chain::name).unwrap_or("Unknown")
}
