use crate::models::FareQuote;

pub const DEFAULT_FARE: f64 = 38_000.0;
pub const DEFAULT_AIRLINE: &str = "EVA Air";

/// Typical one-way economy fares in THB, keyed by an unordered airport pair.
const ROUTES: &[(&str, &str, f64, &str)] = &[
    ("BKK", "YVR", 38_000.0, "EVA Air"),
    ("BKK", "NRT", 15_000.0, "Thai Airways"),
    ("BKK", "ICN", 12_000.0, "Korean Air"),
    ("BKK", "SIN", 5_000.0, "Singapore Airlines"),
    ("BKK", "HKG", 6_000.0, "Cathay Pacific"),
    ("BKK", "TPE", 8_000.0, "EVA Air"),
    ("BKK", "KUL", 4_000.0, "AirAsia"),
    ("BKK", "CGK", 7_000.0, "Thai Lion Air"),
    ("BKK", "SYD", 35_000.0, "Qantas"),
    ("BKK", "LHR", 45_000.0, "British Airways"),
    ("BKK", "CDG", 42_000.0, "Air France"),
    ("BKK", "FRA", 40_000.0, "Lufthansa"),
    ("BKK", "LAX", 50_000.0, "United Airlines"),
    ("BKK", "JFK", 52_000.0, "American Airlines"),
    ("BKK", "DXB", 25_000.0, "Emirates"),
];

pub fn estimate_fare(from: &str, to: &str) -> FareQuote {
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();

    ROUTES
        .iter()
        .find(|(a, b, _, _)| (*a == from && *b == to) || (*a == to && *b == from))
        .map(|(_, _, price, airline)| FareQuote {
            price: *price,
            airline: (*airline).to_string(),
        })
        .unwrap_or_else(|| FareQuote {
            price: DEFAULT_FARE,
            airline: DEFAULT_AIRLINE.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_symmetric_and_case_insensitive() {
        let outbound = estimate_fare("bkk", "yvr");
        let inbound = estimate_fare("YVR", "BKK");
        assert_eq!(outbound, inbound);
        assert_eq!(outbound.price, 38_000.0);
    }

    #[test]
    fn every_known_route_is_symmetric() {
        for (a, b, price, airline) in ROUTES {
            let forward = estimate_fare(a, b);
            assert_eq!(forward, estimate_fare(b, a));
            assert_eq!(forward.price, *price);
            assert_eq!(forward.airline, *airline);
        }
    }

    #[test]
    fn unknown_pair_uses_default() {
        let quote = estimate_fare("CNX", "HKT");
        assert_eq!(quote.price, DEFAULT_FARE);
        assert_eq!(quote.airline, DEFAULT_AIRLINE);
    }

    #[test]
    fn known_route_details() {
        let quote = estimate_fare(" bkk ", "nrt");
        assert_eq!(quote.price, 15_000.0);
        assert_eq!(quote.airline, "Thai Airways");
    }
}
