//! Fixed lookup tables mapping the calculation API's numeric enum codes to
//! the human-readable labels the HTML site renders.

/// Energy type codes as returned by the calculation API.
const TYPES: &[(u32, &str)] = &[
    (1, "Manifestor"),
    (2, "Generator"),
    (3, "Projector"),
    (4, "Manifesting Generator"),
    (5, "Reflector"),
];

const AUTHORITIES: &[(u32, &str)] = &[
    (1, "Emotional"),
    (2, "Sacral"),
    (3, "Splenic"),
    (4, "Ego"),
    (5, "Self-Projected"),
    (6, "Mental"),
    (7, "Lunar"),
];

const DEFINITIONS: &[(u32, &str)] = &[
    (0, "No Definition"),
    (1, "Single Definition"),
    (2, "Split Definition"),
    (3, "Triple Split Definition"),
    (4, "Quadruple Split Definition"),
];

/// Planet codes in the calculation API's activation records.
const PLANETS: &[(u32, &str)] = &[
    (1, "Sun"),
    (2, "Earth"),
    (3, "Moon"),
    (4, "North Node"),
    (5, "South Node"),
    (6, "Mercury"),
    (7, "Venus"),
    (8, "Mars"),
    (9, "Jupiter"),
    (10, "Saturn"),
    (11, "Uranus"),
    (12, "Neptune"),
    (13, "Pluto"),
];

fn label_for(table: &[(u32, &'static str)], code: u32) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code).map(|(_, label)| *label)
}

pub fn type_label(code: u32) -> Option<&'static str> {
    label_for(TYPES, code)
}

pub fn authority_label(code: u32) -> Option<&'static str> {
    label_for(AUTHORITIES, code)
}

pub fn definition_label(code: u32) -> Option<&'static str> {
    label_for(DEFINITIONS, code)
}

pub fn planet_label(code: u32) -> Option<&'static str> {
    label_for(PLANETS, code)
}

/// The API encodes the profile as a two-digit number, e.g. 24 for 2/4.
pub fn format_profile(code: u32) -> String {
    format!("{}/{}", code / 10, code % 10)
}
