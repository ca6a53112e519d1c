use rand::seq::SliceRandom;
use rand::Rng;

use crate::lookup::resolve_place;
use crate::text::title_case;

pub const DEFAULT_NIGHTLY_RATE: f64 = 2_500.0;
pub const FALLBACK_HOTEL_NAME: &str = "Budget Hotel";

const NIGHTLY_RATES: &[(&str, f64)] = &[
    ("vancouver", 2_500.0),
    ("tokyo", 2_000.0),
    ("seoul", 1_800.0),
    ("singapore", 2_200.0),
    ("hong kong", 2_400.0),
    ("taipei", 1_600.0),
    ("kuala lumpur", 1_200.0),
    ("jakarta", 1_000.0),
    ("sydney", 3_000.0),
    ("london", 4_000.0),
    ("paris", 3_500.0),
    ("frankfurt", 3_200.0),
    ("los angeles", 3_800.0),
    ("new york", 4_500.0),
    ("dubai", 2_800.0),
    ("bangkok", 1_000.0),
    ("phuket", 1_500.0),
    ("chiang mai", 800.0),
    ("pattaya", 1_200.0),
    ("krabi", 1_400.0),
    ("osaka", 2_200.0),
    ("kyoto", 2_400.0),
    ("busan", 1_600.0),
    ("bali", 1_300.0),
    ("hanoi", 900.0),
    ("ho chi minh", 1_100.0),
    ("phnom penh", 700.0),
    ("vientiane", 600.0),
    ("yangon", 800.0),
    ("manila", 1_000.0),
    ("cebu", 900.0),
];

const HOTEL_NAMES: &[(&str, [&str; 3])] = &[
    ("vancouver", ["Comfort Inn Downtown", "Budget Hotel Vancouver", "City Center Inn"]),
    ("tokyo", ["Tokyo Budget Hotel", "Shinjuku Comfort Inn", "Asakusa Guesthouse"]),
    ("seoul", ["Seoul Budget Hotel", "Gangnam Inn", "Myeongdong Guesthouse"]),
    ("singapore", ["Budget Hotel Singapore", "Chinatown Inn", "Little India Hotel"]),
    ("hong kong", ["Hong Kong Budget Inn", "Tsim Sha Tsui Hotel", "Kowloon Guesthouse"]),
    ("taipei", ["Taipei Budget Hotel", "Ximending Inn", "Da'an Guesthouse"]),
    ("kuala lumpur", ["KL Budget Hotel", "Bukit Bintang Inn", "KLCC Guesthouse"]),
    ("bangkok", ["Bangkok Budget Inn", "Sukhumvit Hotel", "Silom Guesthouse"]),
    ("phuket", ["Patong Beach Hotel", "Phuket Budget Inn", "Kata Guesthouse"]),
    ("london", ["London Budget Hotel", "Westminster Inn", "Camden Guesthouse"]),
    ("paris", ["Paris Budget Hotel", "Marais Inn", "Montmartre Guesthouse"]),
    ("new york", ["NYC Budget Hotel", "Manhattan Inn", "Brooklyn Guesthouse"]),
    ("sydney", ["Sydney Budget Inn", "Darling Harbour Hotel", "Bondi Guesthouse"]),
    ("dubai", ["Dubai Budget Hotel", "Deira Inn", "Downtown Guesthouse"]),
];

/// Typical nightly rate in THB for a city.
pub fn estimate_nightly_rate(city: &str) -> f64 {
    resolve_place(NIGHTLY_RATES, city)
        .copied()
        .unwrap_or(DEFAULT_NIGHTLY_RATE)
}

/// Picks one of the known hotels for `city`, or synthesizes a name.
pub fn pick_hotel_name<R: Rng + ?Sized>(city: &str, rng: &mut R) -> String {
    resolve_place(HOTEL_NAMES, city)
        .and_then(|names| names.choose(rng))
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| format!("{} Budget Hotel", title_case(city.trim())))
}
