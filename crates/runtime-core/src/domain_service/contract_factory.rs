//! Parses a `vt_symbol` into its future or option shape.
//!
//! Hand-rolled rather than regex-based: the grammar is small and anchored
//! (`^([A-Za-z]+\d+)(?:-)?([CPcp])(?:-)?(\d+(?:\.\d+)?)$` against the
//! pre-exchange-suffix body), and no example in this codebase's corpus
//! reaches for a regex crate for a grammar this size.

use crate::value_objects::{Exchange, FutureSymbol, OptionSymbol, OptionType, ParsedSymbol};

/// Maps an option product code back to its underlying future's product
/// code, per §4.E.1's reverse table.
fn option_underlying_product(option_product: &str) -> &str {
    match option_product {
        "IO" => "IF",
        "MO" => "IM",
        "HO" => "IH",
        other => other,
    }
}

fn split_exchange(vt_symbol: &str) -> (&str, &str) {
    match vt_symbol.rsplit_once('.') {
        Some((body, exch)) => (body, exch),
        None => (vt_symbol, ""),
    }
}

fn split_product_digits(s: &str) -> (&str, &str) {
    let idx = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
    (&s[..idx], &s[idx..])
}

fn is_strike_numeric(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let dot_count = s.chars().filter(|&c| c == '.').count();
    dot_count <= 1 && s.chars().all(|c| c.is_ascii_digit() || c == '.') && s.chars().any(|c| c.is_ascii_digit())
}

fn is_future_like(s: &str) -> bool {
    let (product, digits) = split_product_digits(s);
    !product.is_empty() && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Scans `body` for a `C`/`P` option marker whose prefix looks like a
/// future leg and whose suffix is a bare strike number, honoring the
/// optional `-` separators CFFEX-style symbols use.
fn try_parse_option(body: &str) -> Option<(String, OptionType, f64)> {
    for (i, c) in body.char_indices() {
        if !matches!(c, 'C' | 'c' | 'P' | 'p') {
            continue;
        }

        let mut prefix = &body[..i];
        if let Some(stripped) = prefix.strip_suffix('-') {
            prefix = stripped;
        }
        if prefix.is_empty() || !is_future_like(prefix) {
            continue;
        }

        let marker_len = c.len_utf8();
        let mut rest = &body[i + marker_len..];
        if let Some(stripped) = rest.strip_prefix('-') {
            rest = stripped;
        }
        if !is_strike_numeric(rest) {
            continue;
        }

        let Ok(strike) = rest.parse::<f64>() else { continue };
        let option_type = if matches!(c, 'C' | 'c') { OptionType::Call } else { OptionType::Put };
        return Some((prefix.to_string(), option_type, strike));
    }
    None
}

/// Parses a future leg's `(product_code, year, month)`. CZCE symbols carry
/// a single-digit year suffix; this runtime resolves it against the 2020s
/// decade, since no symbol in this domain predates 2020 (documented
/// assumption — see DESIGN.md).
fn parse_future_body(body: &str) -> (String, i32, u32) {
    let (product, digits) = split_product_digits(body);
    match digits.len() {
        3 => {
            let year_digit: i32 = digits[0..1].parse().unwrap_or(0);
            let month: u32 = digits[1..3].parse().unwrap_or(0);
            (product.to_string(), 2020 + year_digit, month)
        }
        len if len >= 4 => {
            let yy: i32 = digits[0..2].parse().unwrap_or(0);
            let month: u32 = digits[2..4].parse().unwrap_or(0);
            (product.to_string(), 2000 + yy, month)
        }
        _ => (product.to_string(), 0, 0),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContractFactory;

impl ContractFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, vt_symbol: &str) -> ParsedSymbol {
        let (body, exch_str) = split_exchange(vt_symbol);
        let exchange = Exchange::parse(exch_str);

        if let Some((future_prefix, option_type, strike)) = try_parse_option(body) {
            let (option_product, digits) = split_product_digits(&future_prefix);
            let underlying_product = option_underlying_product(option_product);
            let underlying_symbol = format!("{underlying_product}{digits}");

            return ParsedSymbol::Option(OptionSymbol {
                vt_symbol: vt_symbol.to_string(),
                underlying_symbol,
                option_type,
                strike,
                exchange,
            });
        }

        let (product_code, year, month) = parse_future_body(body);
        ParsedSymbol::Future(FutureSymbol { vt_symbol: vt_symbol.to_string(), product_code, year, month, exchange })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cffex_option_with_dashes() {
        let factory = ContractFactory::new();
        let parsed = factory.create("MO2601-C-6300.CFFEX");
        match parsed {
            ParsedSymbol::Option(opt) => {
                assert_eq!(opt.option_type, OptionType::Call);
                assert!((opt.strike - 6300.0).abs() < 1e-9);
                assert_eq!(opt.underlying_symbol, "IM2601");
            }
            _ => panic!("expected an option"),
        }
    }

    #[test]
    fn parses_option_without_dashes() {
        let factory = ContractFactory::new();
        let parsed = factory.create("IO2501P4000.CFFEX");
        match parsed {
            ParsedSymbol::Option(opt) => {
                assert_eq!(opt.option_type, OptionType::Put);
                assert!((opt.strike - 4000.0).abs() < 1e-9);
                assert_eq!(opt.underlying_symbol, "IF2501");
            }
            _ => panic!("expected an option"),
        }
    }

    #[test]
    fn parses_plain_future() {
        let factory = ContractFactory::new();
        let parsed = factory.create("rb2501.SHFE");
        match parsed {
            ParsedSymbol::Future(fut) => {
                assert_eq!(fut.product_code, "rb");
                assert_eq!(fut.year, 2025);
                assert_eq!(fut.month, 1);
            }
            _ => panic!("expected a future"),
        }
    }

    #[test]
    fn parses_czce_future_with_one_digit_year() {
        let factory = ContractFactory::new();
        let parsed = factory.create("SA510.CZCE");
        match parsed {
            ParsedSymbol::Future(fut) => {
                assert_eq!(fut.product_code, "SA");
                assert_eq!(fut.year, 2025);
                assert_eq!(fut.month, 10);
            }
            _ => panic!("expected a future"),
        }
    }

    #[test]
    fn decimal_strike_parses() {
        let factory = ContractFactory::new();
        let parsed = factory.create("rb2501-C-3500.5.SHFE");
        match parsed {
            ParsedSymbol::Option(opt) => assert!((opt.strike - 3500.5).abs() < 1e-9),
            _ => panic!("expected an option"),
        }
    }
}
