// src/currency.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    /// Symbol shown in the settings picker.
    pub symbol: &'static str,
    /// Prefix used when formatting amounts (en-US conventions).
    pub display: &'static str,
}

pub const SUPPORTED: &[Currency] = &[
    Currency { code: "USD", name: "US Dollar", symbol: "$", display: "$" },
    Currency { code: "EUR", name: "Euro", symbol: "€", display: "€" },
    Currency { code: "GBP", name: "British Pound", symbol: "£", display: "£" },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥", display: "¥" },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "C$", display: "CA$" },
    Currency { code: "AUD", name: "Australian Dollar", symbol: "A$", display: "A$" },
    Currency { code: "CNY", name: "Chinese Yuan", symbol: "¥", display: "CN¥" },
    Currency { code: "INR", name: "Indian Rupee", symbol: "₹", display: "₹" },
    Currency { code: "BRL", name: "Brazilian Real", symbol: "R$", display: "R$" },
    Currency { code: "MXN", name: "Mexican Peso", symbol: "Mex$", display: "MX$" },
];

pub fn find(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    SUPPORTED.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Prefix placed before an amount. Unknown codes render as `"XYZ "`.
pub fn display_prefix(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        return "$".to_string();
    }
    match find(code) {
        Some(c) => c.display.to_string(),
        None => format!("{} ", code.to_uppercase()),
    }
}
