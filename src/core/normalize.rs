//! Maps free-text country/city input to the external site's expected
//! canonical values and derives a timezone. Pure functions over static
//! read-only tables; no I/O, fully deterministic.

use crate::domain::model::NormalizedLocation;

/// Lowercased input key to the site's canonical country spelling.
const COUNTRIES: &[(&str, &str)] = &[
    ("afghanistan", "Afghanistan"),
    ("argentina", "Argentina"),
    ("australia", "Australia"),
    ("bangladesh", "Bangladesh"),
    ("brazil", "Brazil"),
    ("canada", "Canada"),
    ("china", "China"),
    ("egypt", "Egypt"),
    ("france", "France"),
    ("germany", "Germany"),
    ("india", "India"),
    ("indonesia", "Indonesia"),
    ("iran", "Iran"),
    ("italy", "Italy"),
    ("japan", "Japan"),
    ("malaysia", "Malaysia"),
    ("mexico", "Mexico"),
    ("netherlands", "Netherlands"),
    ("nigeria", "Nigeria"),
    ("pakistan", "Pakistan"),
    ("philippines", "Philippines"),
    ("russia", "Russia"),
    ("saudi arabia", "Saudi Arabia"),
    ("south africa", "South Africa"),
    ("south korea", "South Korea"),
    ("spain", "Spain"),
    ("sri lanka", "Sri Lanka"),
    ("turkey", "Turkey"),
    ("uae", "United Arab Emirates"),
    ("united arab emirates", "United Arab Emirates"),
    ("uk", "United Kingdom"),
    ("united kingdom", "United Kingdom"),
    ("usa", "United States"),
    ("united states", "United States"),
];

/// Per-country city tables: lowercased input key to the site's canonical
/// city label (the site encodes the administrative region in the label).
const CITIES: &[(&str, &[(&str, &str)])] = &[
    (
        "Pakistan",
        &[
            ("peshawar", "Peshawar (Khyber Pakhtunkhwa)"),
            ("karachi", "Karachi (Sindh)"),
            ("lahore", "Lahore (Punjab)"),
            ("islamabad", "Islamabad (Islamabad Capital Territory)"),
            ("rawalpindi", "Rawalpindi (Punjab)"),
            ("faisalabad", "Faisalabad (Punjab)"),
            ("multan", "Multan (Punjab)"),
            ("quetta", "Quetta (Balochistan)"),
        ],
    ),
    (
        "India",
        &[
            ("delhi", "Delhi (National Capital Territory)"),
            ("new delhi", "New Delhi (National Capital Territory)"),
            ("mumbai", "Mumbai (Maharashtra)"),
            ("kolkata", "Kolkata (West Bengal)"),
            ("chennai", "Chennai (Tamil Nadu)"),
            ("bangalore", "Bengaluru (Karnataka)"),
            ("hyderabad", "Hyderabad (Telangana)"),
        ],
    ),
    (
        "United States",
        &[
            ("new york", "New York (New York)"),
            ("los angeles", "Los Angeles (California)"),
            ("chicago", "Chicago (Illinois)"),
            ("houston", "Houston (Texas)"),
            ("phoenix", "Phoenix (Arizona)"),
        ],
    ),
    (
        "United Kingdom",
        &[
            ("london", "London (England)"),
            ("manchester", "Manchester (England)"),
            ("birmingham", "Birmingham (England)"),
            ("glasgow", "Glasgow (Scotland)"),
            ("cardiff", "Cardiff (Wales)"),
        ],
    ),
    (
        "Germany",
        &[
            ("berlin", "Berlin (Berlin)"),
            ("hamburg", "Hamburg (Hamburg)"),
            ("munich", "Munich (Bavaria)"),
            ("frankfurt", "Frankfurt am Main (Hesse)"),
        ],
    ),
    (
        "Australia",
        &[
            ("sydney", "Sydney (New South Wales)"),
            ("melbourne", "Melbourne (Victoria)"),
            ("brisbane", "Brisbane (Queensland)"),
            ("perth", "Perth (Western Australia)"),
        ],
    ),
];

/// Needle (matched case-insensitively against resolved city, then country)
/// to IANA timezone. First match wins.
const TIMEZONES: &[(&str, &str)] = &[
    ("pakistan", "Asia/Karachi"),
    ("karachi", "Asia/Karachi"),
    ("peshawar", "Asia/Karachi"),
    ("lahore", "Asia/Karachi"),
    ("islamabad", "Asia/Karachi"),
    ("india", "Asia/Kolkata"),
    ("delhi", "Asia/Kolkata"),
    ("mumbai", "Asia/Kolkata"),
    ("kolkata", "Asia/Kolkata"),
    ("bangladesh", "Asia/Dhaka"),
    ("sri lanka", "Asia/Colombo"),
    ("afghanistan", "Asia/Kabul"),
    ("iran", "Asia/Tehran"),
    ("saudi arabia", "Asia/Riyadh"),
    ("united arab emirates", "Asia/Dubai"),
    ("turkey", "Europe/Istanbul"),
    ("egypt", "Africa/Cairo"),
    ("nigeria", "Africa/Lagos"),
    ("south africa", "Africa/Johannesburg"),
    ("united kingdom", "Europe/London"),
    ("london", "Europe/London"),
    ("france", "Europe/Paris"),
    ("germany", "Europe/Berlin"),
    ("berlin", "Europe/Berlin"),
    ("netherlands", "Europe/Amsterdam"),
    ("italy", "Europe/Rome"),
    ("spain", "Europe/Madrid"),
    ("russia", "Europe/Moscow"),
    ("china", "Asia/Shanghai"),
    ("japan", "Asia/Tokyo"),
    ("south korea", "Asia/Seoul"),
    ("indonesia", "Asia/Jakarta"),
    ("malaysia", "Asia/Kuala_Lumpur"),
    ("philippines", "Asia/Manila"),
    ("sydney", "Australia/Sydney"),
    ("melbourne", "Australia/Melbourne"),
    ("australia", "Australia/Sydney"),
    ("new york", "America/New_York"),
    ("chicago", "America/Chicago"),
    ("houston", "America/Chicago"),
    ("phoenix", "America/Phoenix"),
    ("los angeles", "America/Los_Angeles"),
    ("united states", "America/New_York"),
    ("canada", "America/Toronto"),
    ("mexico", "America/Mexico_City"),
    ("brazil", "America/Sao_Paulo"),
    ("argentina", "America/Argentina/Buenos_Aires"),
];

/// Resolve free-text country/city to the site's canonical values plus a
/// timezone. Unmapped values pass through unchanged (the external site may
/// still resolve them); the timezone falls back to UTC.
pub fn normalize(country: &str, city: &str) -> NormalizedLocation {
    let resolved_country = resolve_country(country);
    let resolved_city = resolve_city(&resolved_country, city);
    let timezone = resolve_timezone(&resolved_city, &resolved_country);

    NormalizedLocation {
        country: resolved_country,
        city: resolved_city,
        timezone,
    }
}

fn resolve_country(input: &str) -> String {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return input.to_string();
    }

    for (key, canonical) in COUNTRIES {
        if *key == needle {
            return (*canonical).to_string();
        }
    }
    for (key, canonical) in COUNTRIES {
        if key.starts_with(&needle) || needle.starts_with(key) {
            return (*canonical).to_string();
        }
    }

    tracing::warn!("Unmapped country '{}', passing through as-is", input);
    input.trim().to_string()
}

fn resolve_city(country: &str, input: &str) -> String {
    let needle = input.trim().to_lowercase();
    let Some((_, cities)) = CITIES.iter().find(|(c, _)| *c == country) else {
        return input.trim().to_string();
    };

    for (key, canonical) in *cities {
        if *key == needle {
            return (*canonical).to_string();
        }
    }
    for (key, canonical) in *cities {
        if key.contains(&needle) || needle.contains(key) {
            return (*canonical).to_string();
        }
    }

    tracing::warn!("Unmapped city '{}' for {}, passing through as-is", input, country);
    input.trim().to_string()
}

fn resolve_timezone(city: &str, country: &str) -> String {
    let city = city.to_lowercase();
    let country = country.to_lowercase();

    for (needle, tz) in TIMEZONES {
        if city.contains(needle) {
            return (*tz).to_string();
        }
    }
    for (needle, tz) in TIMEZONES {
        if country.contains(needle) {
            return (*tz).to_string();
        }
    }

    "UTC".to_string()
}
