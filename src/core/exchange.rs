use crate::core::message::Envelope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of exchanges this crate speaks to.
///
/// Each variant selects the signing scheme, the endpoint roots and the
/// response envelope shape used when decomposing a native message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    BitFlyer,
    Bitbank,
    Coincheck,
    GmoCoin,
    Binance,
    Upbit,
}

/// Whether an endpoint needs authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Base URL plus the version stub that precedes every resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiRoot {
    pub base_url: &'static str,
    pub stub: &'static [&'static str],
}

impl ApiRoot {
    pub const fn new(base_url: &'static str, stub: &'static [&'static str]) -> Self {
        Self { base_url, stub }
    }
}

impl Exchange {
    pub const ALL: [Self; 6] = [
        Self::BitFlyer,
        Self::Bitbank,
        Self::Coincheck,
        Self::GmoCoin,
        Self::Binance,
        Self::Upbit,
    ];

    /// Lowercase identifier used in rate-limit keys and environment prefixes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BitFlyer => "bitflyer",
            Self::Bitbank => "bitbank",
            Self::Coincheck => "coincheck",
            Self::GmoCoin => "gmocoin",
            Self::Binance => "binance",
            Self::Upbit => "upbit",
        }
    }

    /// Human-readable name used in error messages.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::BitFlyer => "bitFlyer",
            Self::Bitbank => "bitbank",
            Self::Coincheck => "Coincheck",
            Self::GmoCoin => "GMO Coin",
            Self::Binance => "BINANCE",
            Self::Upbit => "Upbit",
        }
    }

    /// Default endpoint root for the given visibility.
    pub const fn api_root(self, visibility: Visibility) -> ApiRoot {
        match (self, visibility) {
            (Self::BitFlyer, _) => ApiRoot::new("https://api.bitflyer.com", &["v1"]),
            (Self::Bitbank, Visibility::Public) => ApiRoot::new("https://public.bitbank.cc", &[]),
            (Self::Bitbank, Visibility::Private) => ApiRoot::new("https://api.bitbank.cc", &["v1"]),
            (Self::Coincheck, _) => ApiRoot::new("https://coincheck.com", &["api"]),
            (Self::GmoCoin, Visibility::Public) => {
                ApiRoot::new("https://api.coin.z.com", &["public", "v1"])
            }
            (Self::GmoCoin, Visibility::Private) => {
                ApiRoot::new("https://api.coin.z.com", &["private", "v1"])
            }
            (Self::Binance, _) => ApiRoot::new("https://api.binance.com", &["api", "v3"]),
            (Self::Upbit, _) => ApiRoot::new("https://api.upbit.com", &["v1"]),
        }
    }

    /// Shape of the wrapper each exchange puts around entity data.
    pub const fn envelope(self) -> Envelope {
        match self {
            Self::BitFlyer | Self::Binance | Self::Upbit => Envelope::Bare,
            Self::Bitbank => Envelope::SuccessData,
            Self::GmoCoin => Envelope::StatusData,
            Self::Coincheck => Envelope::InlineSuccess,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|exchange| exchange.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown exchange: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_round_trips_through_identifier() {
        for exchange in Exchange::ALL {
            assert_eq!(exchange.as_str().parse::<Exchange>(), Ok(exchange));
        }
        assert!("kraken".parse::<Exchange>().is_err());
    }

    #[test]
    fn test_bitbank_roots_differ_by_visibility() {
        let public = Exchange::Bitbank.api_root(Visibility::Public);
        let private = Exchange::Bitbank.api_root(Visibility::Private);
        assert_eq!(public.base_url, "https://public.bitbank.cc");
        assert!(public.stub.is_empty());
        assert_eq!(private.stub, &["v1"]);
    }
}
