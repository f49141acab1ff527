//! Symbol grammar value objects: the exchange tag and the parsed shape of
//! a `vt_symbol`, shared by [`crate::domain_service::expiry_calendar`],
//! [`crate::domain_service::symbol_generator`] and
//! [`crate::domain_service::contract_factory`].

use serde::{Deserialize, Serialize};

use super::contract::OptionType;

/// The exchange suffix of a `vt_symbol`. `Other` preserves whatever string
/// was actually seen, so round-tripping an unrecognized suffix is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    Shfe,
    Dce,
    Czce,
    Cffex,
    Ine,
    Other(String),
}

impl Exchange {
    pub fn as_str(&self) -> &str {
        match self {
            Exchange::Shfe => "SHFE",
            Exchange::Dce => "DCE",
            Exchange::Czce => "CZCE",
            Exchange::Cffex => "CFFEX",
            Exchange::Ine => "INE",
            Exchange::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Exchange {
        match s.to_ascii_uppercase().as_str() {
            "SHFE" => Exchange::Shfe,
            "DCE" => Exchange::Dce,
            "CZCE" => Exchange::Czce,
            "CFFEX" => Exchange::Cffex,
            "INE" => Exchange::Ine,
            other => Exchange::Other(other.to_string()),
        }
    }
}

/// The futures product code to exchange table. Covers the product codes
/// this runtime is specified against (§6); unrecognized codes return
/// `None` and callers fall back to their own default behavior.
pub fn product_exchange(product_code: &str) -> Option<Exchange> {
    const SHFE: &[&str] = &["rb", "hc", "ru", "bu", "fu", "sp", "ag", "au", "cu", "al", "zn", "pb", "ni", "sn", "ss"];
    const INE: &[&str] = &["sc", "lu", "nr", "bc"];
    const DCE: &[&str] = &[
        "a", "b", "c", "cs", "m", "y", "p", "jd", "l", "v", "pp", "eg", "rr", "j", "jm", "i", "eb", "pg", "fb", "lh",
    ];
    const CZCE: &[&str] = &[
        "SA", "MA", "CF", "TA", "FG", "SR", "OI", "RM", "CY", "AP", "UR", "PF", "SF", "SM", "CJ", "PK", "ZC",
    ];
    const CFFEX: &[&str] = &["IF", "IH", "IC", "IM", "IO", "MO", "HO", "TF", "TS", "T"];

    if SHFE.contains(&product_code) {
        Some(Exchange::Shfe)
    } else if INE.contains(&product_code) {
        Some(Exchange::Ine)
    } else if DCE.contains(&product_code) {
        Some(Exchange::Dce)
    } else if CZCE.contains(&product_code) {
        Some(Exchange::Czce)
    } else if CFFEX.contains(&product_code) {
        Some(Exchange::Cffex)
    } else {
        None
    }
}

/// A parsed futures leg: `<product><year_suffix><month>.<exchange>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureSymbol {
    pub vt_symbol: String,
    pub product_code: String,
    pub year: i32,
    pub month: u32,
    pub exchange: Exchange,
}

/// A parsed option leg: `<future_symbol>[-]?[CP][-]?<strike>.<exchange>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSymbol {
    pub vt_symbol: String,
    pub underlying_symbol: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub exchange: Exchange,
}

/// Result of [`crate::domain_service::contract_factory::ContractFactory::create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedSymbol {
    Future(FutureSymbol),
    Option(OptionSymbol),
}

/// The dominant contract chosen by
/// [`crate::domain_service::future_selection_service::FutureSelectionService`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedContract {
    pub vt_symbol: String,
    pub days_to_expiry: i64,
    pub rolled_over: bool,
}
