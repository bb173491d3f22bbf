// src/company.rs
use rand::seq::SliceRandom;
use rand::Rng;

const SECTORS: [&str; 11] = [
    "Technology",
    "Healthcare",
    "Financial Services",
    "Consumer Cyclical",
    "Energy",
    "Industrials",
    "Communication Services",
    "Consumer Defensive",
    "Real Estate",
    "Utilities",
    "Basic Materials",
];

fn industries(sector: &str) -> [&'static str; 5] {
    match sector {
        "Healthcare" => ["Biotechnology", "Pharmaceuticals", "Medical Devices", "Healthcare Services", "Health Insurance"],
        "Financial Services" => ["Banks", "Insurance", "Asset Management", "Credit Services", "Capital Markets"],
        "Consumer Cyclical" => ["Retail", "Automotive", "Entertainment", "Restaurants", "Travel & Leisure"],
        "Energy" => ["Oil & Gas", "Renewable Energy", "Coal", "Natural Gas", "Energy Equipment & Services"],
        "Industrials" => ["Aerospace & Defense", "Construction", "Machinery", "Transportation", "Business Services"],
        "Communication Services" => ["Telecom", "Media", "Social Media", "Entertainment", "Advertising"],
        "Consumer Defensive" => ["Food & Beverages", "Household Products", "Personal Products", "Tobacco", "Discount Stores"],
        "Real Estate" => ["REITs", "Real Estate Services", "Development", "Property Management", "Real Estate Holding"],
        "Utilities" => ["Electric Utilities", "Gas Utilities", "Water Utilities", "Renewable Utilities", "Multi-Utilities"],
        "Basic Materials" => ["Chemicals", "Metals & Mining", "Paper & Forest Products", "Construction Materials", "Agriculture"],
        _ => ["Software", "Semiconductors", "Hardware", "IT Services", "Consumer Electronics"],
    }
}

const FIRST_NAMES: [&str; 10] = [
    "John", "Sarah", "Michael", "Emily", "David", "Jennifer", "Robert", "Linda", "William", "Elizabeth",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Garcia", "Rodriguez", "Martinez",
];
const CITIES: [&str; 12] = [
    "New York, NY",
    "San Francisco, CA",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "Chicago, IL",
    "Los Angeles, CA",
    "Denver, CO",
    "Atlanta, GA",
    "Miami, FL",
    "Dallas, TX",
    "Phoenix, AZ",
];

/// Sector picked from the first character of the symbol.
pub fn sector_for_symbol(symbol: &str) -> &'static str {
    let first = symbol.chars().next().map(|c| c as usize).unwrap_or(0);
    SECTORS[first % SECTORS.len()]
}

/// Industry within the symbol's sector, picked from its last character.
pub fn industry_for_symbol(symbol: &str) -> &'static str {
    let list = industries(sector_for_symbol(symbol));
    let last = symbol.chars().last().map(|c| c as usize).unwrap_or(0);
    list[last % list.len()]
}

/// Placeholder company details for the stock info panel; no company data API exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    pub description: String,
    pub sector: &'static str,
    pub industry: &'static str,
    pub employees: u32,
    pub ceo: String,
    pub founded: u32,
    pub headquarters: &'static str,
    pub website: String,
}

impl CompanyProfile {
    pub fn mock<R: Rng>(symbol: &str, name: &str, rng: &mut R) -> Self {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("John");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
        Self {
            description: format!(
                "{} is a fictional company used for demonstration purposes. \
                 Real company details would come from a financial data provider.",
                name
            ),
            sector: sector_for_symbol(symbol),
            industry: industry_for_symbol(symbol),
            employees: rng.gen_range(1_000..101_000),
            ceo: format!("{} {}", first, last),
            founded: rng.gen_range(1950..2020),
            headquarters: CITIES.choose(rng).copied().unwrap_or("New York, NY"),
            website: format!("https://www.{}.com", symbol.to_lowercase()),
        }
    }
}
