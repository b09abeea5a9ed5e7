//! Values computed from other answers.

/// Sentinel stored as the obstetric formula when every counter is zero.
pub const NULLIGRAVIDA: &str = "Nulligravida";

/// Largest value written with Roman numerals; above it digits are used.
const ROMAN_MAX: usize = 3999;

const ROMAN_TABLE: [(usize, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Body-mass index: `mass / height²`, rounded to two decimals.
///
/// Returns `None` unless both inputs are positive.
pub fn body_mass_index(mass_kg: f64, height_m: f64) -> Option<f64> {
    if mass_kg <= 0.0 || height_m <= 0.0 {
        return None;
    }
    Some(round2(mass_kg / (height_m * height_m)))
}

/// Standard Roman-numeral encoding. Zero yields an empty string.
pub fn to_roman(mut n: usize) -> String {
    if n > ROMAN_MAX {
        return n.to_string();
    }
    let mut out = String::new();
    for (value, symbol) in ROMAN_TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Gestation, birth, cesarean and abortion counts of a patient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObstetricCounts {
    pub gestations: usize,
    pub births: usize,
    pub cesareans: usize,
    pub abortions: usize,
}

impl ObstetricCounts {
    /// The compact obstetric formula, e.g. `2,1,1,0 -> "IIG IP IC"`.
    ///
    /// Zero counters are left out; all zeros yield [`NULLIGRAVIDA`].
    pub fn formula(&self) -> String {
        let parts: Vec<String> = [
            (self.gestations, 'G'),
            (self.births, 'P'),
            (self.cesareans, 'C'),
            (self.abortions, 'A'),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, letter)| format!("{}{}", to_roman(count), letter))
        .collect();

        if parts.is_empty() {
            NULLIGRAVIDA.to_string()
        } else {
            parts.join(" ")
        }
    }
}
