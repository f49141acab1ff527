//! Generates `vt_symbol` strings for a contiguous range of contract months.

use crate::value_objects::{product_exchange, Exchange};

#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolGenerator;

impl SymbolGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates one `vt_symbol` per contract month from `(start_y, start_m)`
    /// through `(end_y, end_m)` inclusive. A `product` that already contains
    /// a dot is assumed to be a fully-qualified symbol and is returned
    /// unchanged, as a single-element vector.
    pub fn generate_for_range(&self, product: &str, start_y: i32, start_m: u32, end_y: i32, end_m: u32) -> Vec<String> {
        if product.contains('.') {
            return vec![product.to_string()];
        }

        let exchange = product_exchange(product).unwrap_or_else(|| Exchange::Other("UNKNOWN".to_string()));
        let mut symbols = Vec::new();
        let (mut y, mut m) = (start_y, start_m);

        while (y, m) <= (end_y, end_m) {
            symbols.push(self.symbol_for(product, y, m, &exchange));
            m += 1;
            if m > 12 {
                m = 1;
                y += 1;
            }
        }

        symbols
    }

    fn symbol_for(&self, product: &str, year: i32, month: u32, exchange: &Exchange) -> String {
        if matches!(exchange, Exchange::Czce) {
            format!("{product}{}{month:02}.{}", year % 10, exchange.as_str())
        } else {
            format!("{product}{:02}{month:02}.{}", year % 100, exchange.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_shfe_range_across_year_boundary() {
        let gen = SymbolGenerator::new();
        let symbols = gen.generate_for_range("rb", 2025, 12, 2026, 2);
        assert_eq!(symbols, vec!["rb2512.SHFE", "rb2601.SHFE", "rb2602.SHFE"]);
    }

    #[test]
    fn generates_czce_range_with_one_digit_year() {
        let gen = SymbolGenerator::new();
        let symbols = gen.generate_for_range("SA", 2025, 10, 2025, 12);
        assert_eq!(symbols, vec!["SA510.CZCE", "SA511.CZCE", "SA512.CZCE"]);
    }

    #[test]
    fn dotted_product_passes_through() {
        let gen = SymbolGenerator::new();
        let symbols = gen.generate_for_range("rb2501.SHFE", 2025, 1, 2025, 3);
        assert_eq!(symbols, vec!["rb2501.SHFE"]);
    }
}
