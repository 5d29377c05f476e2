//! Material-dependent complex refractive index lookup. The tracer
//! consumes two opaque flat arrays: an index table with the offsets of
//! each element's data block, and a value table holding the blocks
//! themselves. The first 92 blocks carry measured (energy, n, k)
//! triples, the next 92 carry (energy, f1, f2) scattering factors from
//! which n and k are derived with the built-in atomic constants.

// std
use std::collections::BTreeMap;
// others
use num::complex::Complex64;
// rayx
use crate::core::rayx::Float;

pub const NUM_MATERIALS: usize = 92;

/// material key of vacuum; the refractive index is exactly (1, 0)
pub const MATERIAL_VACUUM: i32 = -1;
/// material key of an ideal mirror; surface physics is skipped entirely
pub const MATERIAL_REFLECTIVE: i32 = -2;

/// One line of a measured optical constants table.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PalikEntry {
    pub energy: Float,
    pub n: Float,
    pub k: Float,
}

/// One line of an atomic scattering factor table.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NffEntry {
    pub energy: Float,
    pub f1: Float,
    pub f2: Float,
}

/// The two flat arrays, exactly as they are handed to the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTables {
    /// 2 * 92 + 1 offsets into `table`; measured blocks for element
    /// 1..=92, then scattering factor blocks, then one past-the-end
    pub indices: Vec<i32>,
    /// concatenated triples
    pub table: Vec<Float>,
}

impl Default for MaterialTables {
    fn default() -> Self {
        MaterialTables::empty()
    }
}

impl MaterialTables {
    /// Tables with no data for any material. Lookups on real materials
    /// fail, vacuum still works.
    pub fn empty() -> Self {
        MaterialTables {
            indices: vec![0; 2 * NUM_MATERIALS + 1],
            table: Vec::new(),
        }
    }
}

/// Assembles the flat arrays from per-material entry lists. The input
/// adapter (or a test) feeds this with whatever table data it has.
#[derive(Debug, Default)]
pub struct MaterialTablesBuilder {
    palik: BTreeMap<i32, Vec<PalikEntry>>,
    nff: BTreeMap<i32, Vec<NffEntry>>,
}

impl MaterialTablesBuilder {
    pub fn new() -> Self {
        MaterialTablesBuilder::default()
    }
    pub fn palik(&mut self, material: i32, entries: Vec<PalikEntry>) -> &mut Self {
        assert!((1..=NUM_MATERIALS as i32).contains(&material));
        self.palik.insert(material, entries);
        self
    }
    pub fn nff(&mut self, material: i32, entries: Vec<NffEntry>) -> &mut Self {
        assert!((1..=NUM_MATERIALS as i32).contains(&material));
        self.nff.insert(material, entries);
        self
    }
    pub fn build(&self) -> MaterialTables {
        let mut tables = MaterialTables {
            indices: Vec::with_capacity(2 * NUM_MATERIALS + 1),
            table: Vec::new(),
        };
        for m in 1..=NUM_MATERIALS as i32 {
            tables.indices.push(tables.table.len() as i32);
            if let Some(entries) = self.palik.get(&m) {
                for e in entries {
                    tables.table.push(e.energy);
                    tables.table.push(e.n);
                    tables.table.push(e.k);
                }
            }
        }
        for m in 1..=NUM_MATERIALS as i32 {
            tables.indices.push(tables.table.len() as i32);
            if let Some(entries) = self.nff.get(&m) {
                for e in entries {
                    tables.table.push(e.energy);
                    tables.table.push(e.f1);
                    tables.table.push(e.f2);
                }
            }
        }
        // this extra offset simplifies the entry count computation
        tables.indices.push(tables.table.len() as i32);
        tables
    }
}

pub fn get_palik_entry_count(material: i32, indices: &[i32]) -> i32 {
    let m = (material - 1) as usize; // in [0, 91]
    // each entry occupies 3 values
    (indices[m + 1] - indices[m]) / 3
}

pub fn get_nff_entry_count(material: i32, indices: &[i32]) -> i32 {
    let m = (material - 1) as usize; // in [0, 91]
    // the offset of 92 skips past all measured blocks
    (indices[NUM_MATERIALS + m + 1] - indices[NUM_MATERIALS + m]) / 3
}

pub fn get_palik_entry(index: i32, material: i32, indices: &[i32], table: &[Float]) -> PalikEntry {
    let m = (material - 1) as usize;
    let i = (indices[m] + 3 * index) as usize;
    PalikEntry {
        energy: table[i],
        n: table[i + 1],
        k: table[i + 2],
    }
}

pub fn get_nff_entry(index: i32, material: i32, indices: &[i32], table: &[Float]) -> NffEntry {
    let m = (material - 1) as usize;
    let i = (indices[NUM_MATERIALS + m] + 3 * index) as usize;
    NffEntry {
        energy: table[i],
        f1: table[i + 1],
        f2: table[i + 2],
    }
}

/// The complex refractive index of `material` at `energy` (eV), or
/// `None` when the material key or the energy is outside of the data.
/// The measured table wins when it covers the energy; the value of the
/// containing bin is used directly, without interpolation. Otherwise
/// the scattering factor table is consulted and n, k are derived from
/// the bin's f1, f2.
pub fn get_refractive_index(
    energy: Float,
    material: i32,
    indices: &[i32],
    table: &[Float],
) -> Option<Complex64> {
    if material == MATERIAL_VACUUM {
        return Some(Complex64::new(1.0, 0.0));
    }

    // out of range check
    if !(1..=NUM_MATERIALS as i32).contains(&material) {
        return None;
    }

    // don't binary search blocks with 0 entries
    let palik_count = get_palik_entry_count(material, indices);
    if palik_count > 0 {
        let mut low: i32 = 0;
        let mut high: i32 = palik_count - 1;

        let low_entry = get_palik_entry(low, material, indices, table);
        let high_entry = get_palik_entry(high, material, indices, table);

        if low_entry.energy <= energy && energy <= high_entry.energy {
            while high - low > 1 {
                let center = (low + high) / 2;
                let center_entry = get_palik_entry(center, material, indices, table);
                if energy < center_entry.energy {
                    high = center;
                } else {
                    low = center;
                }
            }

            let entry = get_palik_entry(low, material, indices, table);
            return Some(Complex64::new(entry.n, entry.k));
        }
    }

    let nff_count = get_nff_entry_count(material, indices);
    if nff_count > 0 {
        let mut low: i32 = 0;
        let mut high: i32 = nff_count - 1;

        let low_entry = get_nff_entry(low, material, indices, table);
        let high_entry = get_nff_entry(high, material, indices, table);

        if low_entry.energy <= energy && energy <= high_entry.energy {
            while high - low > 1 {
                let center = (low + high) / 2;
                let center_entry = get_nff_entry(center, material, indices, table);
                if energy < center_entry.energy {
                    high = center;
                } else {
                    low = center;
                }
            }

            let (mass, rho) = get_atomic_mass_and_rho(material)?;
            let entry = get_nff_entry(low, material, indices, table);
            let e = entry.energy;
            let n = 1.0 - (415.252 * rho * entry.f1) / (e * e * mass);
            let k = (415.252 * rho * entry.f2) / (e * e * mass);
            return Some(Complex64::new(n, k));
        }
    }

    // no matching entry found
    None
}

/// (atomic mass, density in g/cm^3) per atomic number. Light gases use
/// their liquid density, matching the convention of the scattering
/// factor compilations.
#[rustfmt::skip]
const ATOMIC_MASS_AND_RHO: [(Float, Float); NUM_MATERIALS] = [
    (1.00794, 0.0708),   // H
    (4.0026, 0.122),     // He
    (6.941, 0.533),      // Li
    (9.01218, 1.845),    // Be
    (10.81, 2.34),       // B
    (12.011, 2.26),      // C
    (14.0067, 0.808),    // N
    (15.9994, 1.14),     // O
    (18.9984, 1.108),    // F
    (20.179, 1.207),     // Ne
    (22.98977, 0.969),   // Na
    (24.305, 1.735),     // Mg
    (26.98154, 2.6941),  // Al
    (28.0855, 2.32),     // Si
    (30.97376, 1.82),    // P
    (32.066, 2.07),      // S
    (35.4527, 1.56),     // Cl
    (39.948, 1.40),      // Ar
    (39.0983, 0.862),    // K
    (40.078, 1.55),      // Ca
    (44.95591, 2.989),   // Sc
    (47.88, 4.54),       // Ti
    (50.9415, 6.11),     // V
    (51.9961, 7.19),     // Cr
    (54.93805, 7.33),    // Mn
    (55.847, 7.874),     // Fe
    (58.9332, 8.9),      // Co
    (58.6934, 8.902),    // Ni
    (63.546, 8.94),      // Cu
    (65.39, 7.133),      // Zn
    (69.723, 5.904),     // Ga
    (72.61, 5.323),      // Ge
    (74.92159, 5.73),    // As
    (78.96, 4.79),       // Se
    (79.904, 3.12),      // Br
    (83.8, 2.16),        // Kr
    (85.4678, 1.532),    // Rb
    (87.62, 2.54),       // Sr
    (88.90585, 4.469),   // Y
    (91.224, 6.506),     // Zr
    (92.90638, 8.57),    // Nb
    (95.94, 10.22),      // Mo
    (98.0, 11.5),        // Tc
    (101.07, 12.41),     // Ru
    (102.9055, 12.41),   // Rh
    (106.42, 12.02),     // Pd
    (107.8682, 10.5),    // Ag
    (112.411, 8.65),     // Cd
    (114.82, 7.31),      // In
    (118.71, 7.31),      // Sn
    (121.757, 6.691),    // Sb
    (127.6, 6.24),       // Te
    (126.90447, 4.93),   // I
    (131.29, 3.52),      // Xe
    (132.90543, 1.873),  // Cs
    (137.327, 3.5),      // Ba
    (138.9055, 6.145),   // La
    (140.115, 6.77),     // Ce
    (140.90765, 6.773),  // Pr
    (144.24, 7.008),     // Nd
    (145.0, 7.264),      // Pm
    (150.36, 7.52),      // Sm
    (151.965, 5.244),    // Eu
    (157.25, 7.901),     // Gd
    (158.92534, 8.23),   // Tb
    (162.5, 8.551),      // Dy
    (164.93032, 8.795),  // Ho
    (167.26, 9.066),     // Er
    (168.93421, 9.321),  // Tm
    (173.04, 6.966),     // Yb
    (174.967, 9.841),    // Lu
    (178.49, 13.31),     // Hf
    (180.9479, 16.654),  // Ta
    (183.85, 19.3),      // W
    (186.207, 21.02),    // Re
    (190.2, 22.57),      // Os
    (192.22, 22.42),     // Ir
    (195.08, 21.45),     // Pt
    (196.96654, 19.3),   // Au
    (200.59, 13.546),    // Hg
    (204.3833, 11.72),   // Tl
    (207.2, 11.35),      // Pb
    (208.98037, 9.747),  // Bi
    (209.0, 9.32),       // Po
    (210.0, 7.0),        // At
    (222.0, 4.4),        // Rn
    (223.0, 2.48),       // Fr
    (226.025, 5.0),      // Ra
    (227.028, 10.07),    // Ac
    (232.0381, 11.72),   // Th
    (231.03588, 15.37),  // Pa
    (238.0289, 18.92),   // U
];

#[rustfmt::skip]
const SYMBOLS: [&str; NUM_MATERIALS] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U",
];

lazy_static! {
    static ref SYMBOL_TO_NUMBER: std::collections::HashMap<String, i32> = {
        let mut map = std::collections::HashMap::new();
        for (i, s) in SYMBOLS.iter().enumerate() {
            map.insert(s.to_uppercase(), i as i32 + 1);
        }
        map.insert("VACUUM".to_string(), MATERIAL_VACUUM);
        map.insert("REFLECTIVE".to_string(), MATERIAL_REFLECTIVE);
        map
    };
}

/// returns (atomic mass, density) for an atomic number in [1, 92]
pub fn get_atomic_mass_and_rho(material: i32) -> Option<(Float, Float)> {
    if !(1..=NUM_MATERIALS as i32).contains(&material) {
        return None;
    }
    Some(ATOMIC_MASS_AND_RHO[(material - 1) as usize])
}

/// Case-insensitive element symbol to material key, e.g. "Cu" -> 29.
pub fn material_from_symbol(symbol: &str) -> Option<i32> {
    SYMBOL_TO_NUMBER.get(&symbol.to_uppercase()).copied()
}

pub fn material_symbol(material: i32) -> Option<&'static str> {
    match material {
        MATERIAL_VACUUM => Some("VACUUM"),
        MATERIAL_REFLECTIVE => Some("REFLECTIVE"),
        1..=92 => Some(SYMBOLS[(material - 1) as usize]),
        _ => None,
    }
}
