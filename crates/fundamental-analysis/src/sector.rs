/// Sector PE benchmarks used for relative valuation
pub const SECTOR_PE_BENCHMARKS: [(&str, f64); 11] = [
    ("Technology", 30.0),
    ("Financial Services", 15.0),
    ("Healthcare", 25.0),
    ("Consumer Cyclical", 22.0),
    ("Consumer Defensive", 20.0),
    ("Communication Services", 20.0),
    ("Industrials", 20.0),
    ("Energy", 12.0),
    ("Basic Materials", 15.0),
    ("Real Estate", 18.0),
    ("Utilities", 16.0),
];

pub const DEFAULT_PE_BENCHMARK: f64 = 20.0;

pub fn pe_benchmark(sector: Option<&str>) -> f64 {
    sector
        .and_then(|name| {
            SECTOR_PE_BENCHMARKS
                .iter()
                .find(|(sector, _)| *sector == name)
                .map(|(_, pe)| *pe)
        })
        .unwrap_or(DEFAULT_PE_BENCHMARK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sectors() {
        assert_eq!(pe_benchmark(Some("Technology")), 30.0);
        assert_eq!(pe_benchmark(Some("Energy")), 12.0);
    }

    #[test]
    fn test_unknown_sector_uses_default() {
        assert_eq!(pe_benchmark(Some("Crypto Mining")), DEFAULT_PE_BENCHMARK);
        assert_eq!(pe_benchmark(None), DEFAULT_PE_BENCHMARK);
        // matching is exact
        assert_eq!(pe_benchmark(Some("technology")), DEFAULT_PE_BENCHMARK);
    }
}
