//! Echocardiography measurement tables.
//!
//! Every field is a [`FieldSpec`]: an output key plus an ordered synonym list
//! covering Portuguese report wording and the abbreviations printed by
//! ultrasound machines (Philips, GE, ...). Tables are compiled once into
//! [`LabelValueExtractor`]s and shared by all callers.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::label_value::{flatten_lines, LabelValueExtractor, DEFAULT_UNIT_SUFFIX, GRADIENT_UNIT_SUFFIX};
use super::types::MeasurementGroup;

/// One measurement field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Key in the output group.
    pub key: &'static str,
    /// Synonyms, highest priority first.
    pub labels: &'static [&'static str],
    /// Allowed unit suffix regex.
    pub units: &'static str,
}

const fn field(key: &'static str, labels: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        key,
        labels,
        units: DEFAULT_UNIT_SUFFIX,
    }
}

/// Output groups, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementCategory {
    /// LV dimensions and walls, left atrium, aorta, FS/EF (Teichholz).
    Ventricular,
    DiastolicFunction,
    SystolicFunction,
    RightVentricle,
    TdiSeptal,
    TdiFreeWall,
    ValveDoppler,
}

impl MeasurementCategory {
    pub const ALL: [MeasurementCategory; 7] = [
        MeasurementCategory::Ventricular,
        MeasurementCategory::DiastolicFunction,
        MeasurementCategory::SystolicFunction,
        MeasurementCategory::RightVentricle,
        MeasurementCategory::TdiSeptal,
        MeasurementCategory::TdiFreeWall,
        MeasurementCategory::ValveDoppler,
    ];

    /// Wire name of the group.
    pub fn key(self) -> &'static str {
        match self {
            MeasurementCategory::Ventricular => "measurementsData",
            MeasurementCategory::DiastolicFunction => "funcaoDiastolica",
            MeasurementCategory::SystolicFunction => "funcaoSistolica",
            MeasurementCategory::RightVentricle => "ventriculoDireito",
            MeasurementCategory::TdiSeptal => "tdiSeptal",
            MeasurementCategory::TdiFreeWall => "tdiLivre",
            MeasurementCategory::ValveDoppler => "valvasDoppler",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            MeasurementCategory::Ventricular => VENTRICULAR_FIELDS,
            MeasurementCategory::DiastolicFunction => DIASTOLIC_FIELDS,
            MeasurementCategory::SystolicFunction => SYSTOLIC_FIELDS,
            MeasurementCategory::RightVentricle => RIGHT_VENTRICLE_FIELDS,
            MeasurementCategory::TdiSeptal => TDI_SEPTAL_FIELDS,
            MeasurementCategory::TdiFreeWall => TDI_FREE_WALL_FIELDS,
            MeasurementCategory::ValveDoppler => VALVE_FIELDS,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Synonym tables
// ═══════════════════════════════════════════════════════════

const VENTRICULAR_FIELDS: &[FieldSpec] = &[
    field(
        "dvedDiastole",
        &[
            "LVIDd", "LVID d", "VED", "VEd", "DVED", "ventrículo esquerdo diástole", "LVEDd",
            "VEDd", "Left Ventricular Internal Dimension in diastole",
        ],
    ),
    field(
        "dvedSistole",
        &[
            "LVIDs", "LVID s", "VES", "VEs", "DVES", "ventrículo esquerdo sístole", "LVEDs",
            "VEDs", "Left Ventricular Internal Dimension in systole",
        ],
    ),
    field(
        "septoIVd",
        &["IVSd", "IVS d", "SIVd", "septo interventricular diástole", "I VSd"],
    ),
    field(
        "septoIVs",
        &["IVSs", "IVS s", "SIVs", "septo interventricular sístole", "I VSs"],
    ),
    field(
        "paredeLVd",
        &[
            "LVPWd", "PLVEd", "PLVED", "parede livre diástole", "LVFWd", "PWVd",
            "Left Ventricular Posterior Wall thickness in diastole",
        ],
    ),
    field(
        "paredeLVs",
        &[
            "LVPWs", "PLVEs", "PLVES", "parede livre sístole", "LVFWs", "PWVs",
            "Left Ventricular Posterior Wall thickness in systole",
        ],
    ),
    field(
        "atrioEsquerdo",
        &[
            "Atrial Area", "Atrial Length", "Atrial Volume", "atrio esquerdo", "AE",
            "átrio esquerdo", "LA", "left atrium", "LA A4Cs",
        ],
    ),
    field("aorta", &["Ao", "aorta", "aortic"]),
    field(
        "fracaoEncurtamento",
        &[
            "FS (MM-Teich)", "FS(MM-Teich)", "FS", "fração encurtamento",
            "fração de encurtamento", "shortening fraction", "Fractional Shortening",
        ],
    ),
    field(
        "fracaoEjecaoTeicholz",
        &[
            "EF (MM-Teich)", "EF(MM-Teich)", "FE", "fração de ejeção", "fração ejection",
            "ejection fraction", "FE Teicholz", "FET", "Ejection Fraction",
        ],
    ),
];

const DIASTOLIC_FIELDS: &[FieldSpec] = &[
    field("ondaE", &["onda E", "E wave", "E:", "E =", "velocidade E"]),
    field("ondaA", &["onda A", "A wave", "A:", "A =", "velocidade A"]),
    field("triv", &["TRIV", "TRI V", "tempo relaxamento"]),
    field("tempoDesaceleracao", &["DT", "tempo desaceleração", "deceleration time"]),
];

const SYSTOLIC_FIELDS: &[FieldSpec] = &[
    field("epss", &["EPSS", "E-point septal separation"]),
    field("mapse", &["MAPSE", "mitral annular plane"]),
    field(
        "simpson",
        &["EF (Simpson)", "EF(Simpson)", "Simpson", "FE Simpson", "fração de ejeção Simpson"],
    ),
];

const RIGHT_VENTRICLE_FIELDS: &[FieldSpec] = &[
    field("tapse", &["TAPSE"]),
    field("fac", &["FAC", "fractional area change"]),
    field("tdiS", &["TDI S'", "TDI S", "S'", "s prime"]),
    // RAP distance from the machine first, then report wording.
    field(
        "atrioDireito",
        &[
            "RAP M max", "Dist. RAP M max", "RAP max", "Dist RAP M max", "atrio direito",
            "átrio direito", "atrium right", "AD",
        ],
    ),
];

const TDI_SEPTAL_FIELDS: &[FieldSpec] = &[
    field("e", &["septal e'", "septal e prime", "septal e’", "septal Em"]),
    field("a", &["septal a'", "septal a prime", "septal a’", "septal Am"]),
    field("s", &["septal S'", "septal S"]),
];

const TDI_FREE_WALL_FIELDS: &[FieldSpec] = &[
    field(
        "e",
        &[
            "livre e'", "livre e prime", "livre e’", "livre Em", "free wall e'",
            "parede livre e'",
        ],
    ),
    field("a", &["livre a'", "livre a prime", "livre a’", "livre Am"]),
    field("s", &["livre S'", "free wall S'"]),
];

const VALVE_FIELDS: &[FieldSpec] = &[
    field(
        "mitralVelocidade",
        &["* Vel", "MV Vmax", "mitral Vmax", "mitral", "MV", "valva mitral", "+ Vel"],
    ),
    field(
        "tricuspideVelocidade",
        &["TV Vmax", "tricúspide", "tricuspide", "TV", "valva tricúspide"],
    ),
    field(
        "pulmonarVelocidade",
        &["+ PV Vmax", "PV Vmax", "Vmax", "pulmonar", "PV", "valva pulmonar"],
    ),
    field(
        "aorticaVelocidade",
        &["x2 + Vel", "+ Vel", "AV Vmax", "aórtica", "aortica", "AV", "valva aórtica"],
    ),
    FieldSpec {
        key: "pulmonarGradiente",
        labels: &["Max PG", "PV Vmax", "PV"],
        units: GRADIENT_UNIT_SUFFIX,
    },
];

// ═══════════════════════════════════════════════════════════
// Compiled tables
// ═══════════════════════════════════════════════════════════

struct CompiledField {
    key: &'static str,
    extractor: LabelValueExtractor,
}

struct CompiledCategory {
    fields: Vec<CompiledField>,
}

static COMPILED: LazyLock<Vec<CompiledCategory>> = LazyLock::new(|| {
    MeasurementCategory::ALL
        .iter()
        .map(|&category| CompiledCategory {
            fields: category
                .fields()
                .iter()
                .map(|spec| CompiledField {
                    key: spec.key,
                    extractor: LabelValueExtractor::with_units(spec.labels, spec.units)
                        .expect("Invalid measurement label pattern"),
                })
                .collect(),
        })
        .collect()
});

/// `COMPILED` follows `MeasurementCategory::ALL`, which is declaration order.
fn compiled(category: MeasurementCategory) -> &'static CompiledCategory {
    &COMPILED[category as usize]
}

/// Extract one group. `None` when none of its fields was found.
pub fn extract_category(text: &str, category: MeasurementCategory) -> Option<MeasurementGroup> {
    if text.trim().is_empty() {
        return None;
    }
    extract_category_flat(&flatten_lines(text), category)
}

fn extract_category_flat(flat: &str, category: MeasurementCategory) -> Option<MeasurementGroup> {
    let mut group = MeasurementGroup::default();
    for field in &compiled(category).fields {
        group.insert_non_empty(field.key, field.extractor.extract_flat(flat));
    }
    (!group.is_empty()).then_some(group)
}

/// Extract every group that has at least one value, in report order.
pub fn extract_all(text: &str) -> Vec<(MeasurementCategory, MeasurementGroup)> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let flat = flatten_lines(text);
    MeasurementCategory::ALL
        .iter()
        .filter_map(|&category| extract_category_flat(&flat, category).map(|g| (category, g)))
        .collect()
}
