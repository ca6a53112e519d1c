use crate::lookup::resolve_place;

pub const DEFAULT_AIRPORT: &str = "SIN";
pub const HOME_AIRPORT: &str = "BKK";

/// Destination keyword to primary IATA code. Order matters for substring
/// matches, so specific cities sit before the countries that contain them.
const AIRPORTS: &[(&str, &str)] = &[
    ("vancouver", "YVR"),
    ("canada", "YVR"),
    ("tokyo", "NRT"),
    ("japan", "NRT"),
    ("seoul", "ICN"),
    ("korea", "ICN"),
    ("singapore", "SIN"),
    ("hong kong", "HKG"),
    ("taipei", "TPE"),
    ("taiwan", "TPE"),
    ("kuala lumpur", "KUL"),
    ("malaysia", "KUL"),
    ("jakarta", "CGK"),
    ("indonesia", "CGK"),
    ("sydney", "SYD"),
    ("australia", "SYD"),
    ("london", "LHR"),
    ("england", "LHR"),
    ("paris", "CDG"),
    ("france", "CDG"),
    ("frankfurt", "FRA"),
    ("germany", "FRA"),
    ("los angeles", "LAX"),
    ("new york", "JFK"),
    ("america", "LAX"),
    ("dubai", "DXB"),
    ("phuket", "HKT"),
    ("chiang mai", "CNX"),
    ("bangkok", "BKK"),
    ("thailand", "BKK"),
    ("hanoi", "HAN"),
    ("ho chi minh", "SGN"),
    ("vietnam", "SGN"),
    ("manila", "MNL"),
    ("philippines", "MNL"),
    ("delhi", "DEL"),
    ("india", "DEL"),
    ("beijing", "PEK"),
    ("shanghai", "PVG"),
    ("china", "PEK"),
    // short codes last so they never shadow a longer name
    ("uk", "LHR"),
    ("usa", "LAX"),
    ("uae", "DXB"),
];

pub fn airport_code(destination: &str) -> &'static str {
    resolve_place(AIRPORTS, destination)
        .copied()
        .unwrap_or(DEFAULT_AIRPORT)
}
