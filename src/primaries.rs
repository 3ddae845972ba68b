//! Standard color primaries table, exact lookup and nearest-match search
//!
//! Chromaticities are CIE 1931 xy in the order
//! `[red x, red y, green x, green y, blue x, blue y, white x, white y]`.

use crate::image::ColorPrimaries;

/// Eight xy chromaticity values describing a set of primaries and white point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimariesSet(pub [f32; 8]);

impl PrimariesSet {
    pub fn red(&self) -> (f32, f32) {
        (self.0[0], self.0[1])
    }

    pub fn green(&self) -> (f32, f32) {
        (self.0[2], self.0[3])
    }

    pub fn blue(&self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }

    pub fn white(&self) -> (f32, f32) {
        (self.0[6], self.0[7])
    }

    /// Sum of squared differences over all eight coordinates
    pub fn distance(&self, other: &PrimariesSet) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Luma weights `(kr, kb)` implied by these primaries, for the
    /// chromaticity-derived non-constant-luminance matrix.
    pub fn luma_coefficients(&self) -> (f32, f32) {
        let xyz = |(x, y): (f32, f32)| -> [f64; 3] {
            let (x, y) = (f64::from(x), f64::from(y));
            [x / y, 1.0, (1.0 - x - y) / y]
        };
        let r = xyz(self.red());
        let g = xyz(self.green());
        let b = xyz(self.blue());
        let w = xyz(self.white());

        // Solve [r g b] * s = w for the per-primary scale (Cramer's rule);
        // the middle row of the scaled matrix gives the luma weights.
        let det3 = |a: [f64; 3], b: [f64; 3], c: [f64; 3]| -> f64 {
            a[0] * (b[1] * c[2] - b[2] * c[1]) - b[0] * (a[1] * c[2] - a[2] * c[1])
                + c[0] * (a[1] * b[2] - a[2] * b[1])
        };
        let det = det3(r, g, b);
        if det.abs() < f64::EPSILON {
            return (0.2126, 0.0722);
        }
        let kr = det3(w, g, b) / det;
        let kb = det3(r, g, w) / det;
        (kr as f32, kb as f32)
    }
}

/// One entry of the standard primaries table
#[derive(Debug, Clone, Copy)]
pub struct NamedPrimaries {
    pub code: ColorPrimaries,
    pub name: &'static str,
    pub values: PrimariesSet,
}

const fn entry(code: u8, name: &'static str, values: [f32; 8]) -> NamedPrimaries {
    NamedPrimaries {
        code: ColorPrimaries(code),
        name,
        values: PrimariesSet(values),
    }
}

const BT709_VALUES: [f32; 8] = [0.64, 0.33, 0.30, 0.60, 0.15, 0.06, 0.3127, 0.3290];

/// Every primaries code with defined chromaticities, in lookup order
pub const KNOWN_PRIMARIES: &[NamedPrimaries] = &[
    entry(1, "BT.709", BT709_VALUES),
    entry(2, "Unspecified", BT709_VALUES),
    entry(4, "BT.470-6 System M", [0.67, 0.33, 0.21, 0.71, 0.14, 0.08, 0.310, 0.316]),
    entry(5, "BT.470-6 System BG", [0.64, 0.33, 0.29, 0.60, 0.15, 0.06, 0.3127, 0.3290]),
    entry(6, "BT.601", [0.630, 0.340, 0.310, 0.595, 0.155, 0.070, 0.3127, 0.3290]),
    entry(7, "SMPTE 240M", [0.630, 0.340, 0.310, 0.595, 0.155, 0.070, 0.3127, 0.3290]),
    entry(8, "Generic film", [0.681, 0.319, 0.243, 0.692, 0.145, 0.049, 0.310, 0.316]),
    entry(9, "BT.2020", [0.708, 0.292, 0.170, 0.797, 0.131, 0.046, 0.3127, 0.3290]),
    entry(10, "XYZ", [1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.3333, 0.3333]),
    entry(11, "SMPTE RP 431-2", [0.680, 0.320, 0.265, 0.690, 0.150, 0.060, 0.314, 0.351]),
    entry(12, "SMPTE EG 432-1 (DCI P3)", [0.680, 0.320, 0.265, 0.690, 0.150, 0.060, 0.3127, 0.3290]),
    entry(22, "EBU Tech. 3213-E", [0.630, 0.340, 0.295, 0.605, 0.155, 0.077, 0.3127, 0.3290]),
];

/// Candidates considered when no exact match exists, in tie-break order
const BEST_MATCH_CANDIDATES: [ColorPrimaries; 3] = [
    ColorPrimaries::BT709,
    ColorPrimaries::BT2020,
    ColorPrimaries::SMPTE432,
];

/// Chromaticities for a primaries code.
///
/// Codes without defined chromaticities (including 0) resolve to BT.709.
pub fn values(code: ColorPrimaries) -> PrimariesSet {
    lookup(code).map_or(PrimariesSet(BT709_VALUES), |p| p.values)
}

/// Table entry for a code, if the code has defined chromaticities
pub fn lookup(code: ColorPrimaries) -> Option<&'static NamedPrimaries> {
    KNOWN_PRIMARIES.iter().find(|p| p.code == code)
}

/// Human-readable name for a primaries code, empty if unknown
pub fn name(code: ColorPrimaries) -> &'static str {
    lookup(code).map_or("", |p| p.name)
}

/// Exact match of chromaticities against the table (to three decimal places)
pub fn find(set: &PrimariesSet) -> Option<&'static NamedPrimaries> {
    KNOWN_PRIMARIES
        .iter()
        .find(|p| p.values.0.iter().zip(set.0.iter()).all(|(a, b)| matches_3_places(*a, *b)))
}

fn matches_3_places(a: f32, b: f32) -> bool {
    ((a * 1000.0).round() - (b * 1000.0).round()).abs() < 0.5
}

/// Primaries code for chromaticities: an exact match if one exists,
/// otherwise the closest of BT.709, BT.2020 and SMPTE 432.
pub fn best_match(set: &PrimariesSet) -> ColorPrimaries {
    if let Some(found) = find(set) {
        return found.code;
    }
    let mut winner = BEST_MATCH_CANDIDATES[0];
    let mut best = set.distance(&values(winner));
    for &candidate in &BEST_MATCH_CANDIDATES[1..] {
        let d = set.distance(&values(candidate));
        if d < best {
            best = d;
            winner = candidate;
        }
    }
    winner
}
