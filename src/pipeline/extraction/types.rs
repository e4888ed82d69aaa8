use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::measurements::MeasurementCategory;

/// Patient identity extracted from a form or an instrument header.
/// Every field is an empty string when not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "responsavel", default)]
    pub guardian: String,
    #[serde(rename = "responsavelTelefone", default)]
    pub guardian_phone: String,
    #[serde(rename = "responsavelEmail", default)]
    pub guardian_email: String,
    #[serde(rename = "especie", default)]
    pub species: String,
    #[serde(rename = "raca", default)]
    pub breed: String,
    #[serde(rename = "sexo", default)]
    pub sex: String,
    #[serde(rename = "idade", default)]
    pub age: String,
    #[serde(rename = "peso", default)]
    pub weight: String,
}

impl PatientRecord {
    fn fields(&self) -> [&str; 9] {
        [
            self.name.as_str(),
            self.guardian.as_str(),
            self.guardian_phone.as_str(),
            self.guardian_email.as_str(),
            self.species.as_str(),
            self.breed.as_str(),
            self.sex.as_str(),
            self.age.as_str(),
            self.weight.as_str(),
        ]
    }

    /// Number of non-empty fields.
    pub fn filled_count(&self) -> usize {
        self.fields().iter().filter(|f| !f.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }
}

/// Sparse key → value map for one measurement category.
/// Only non-empty values are ever stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementGroup(BTreeMap<String, String>);

impl MeasurementGroup {
    /// Store `value` under `key` unless it is empty.
    pub fn insert_non_empty(&mut self, key: &str, value: String) {
        if !value.is_empty() {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Exam metadata read from the instrument overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamInfo {
    /// ISO-8601 date (`YYYY-MM-DD`).
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "frequenciaCardiaca", default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<String>,
}

impl ExamInfo {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.heart_rate.is_none()
    }
}

/// Full exam extraction. Absent members are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    #[serde(rename = "measurementsData", default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<MeasurementGroup>,
    #[serde(rename = "funcaoDiastolica", default, skip_serializing_if = "Option::is_none")]
    pub diastolic_function: Option<MeasurementGroup>,
    #[serde(rename = "funcaoSistolica", default, skip_serializing_if = "Option::is_none")]
    pub systolic_function: Option<MeasurementGroup>,
    #[serde(rename = "ventriculoDireito", default, skip_serializing_if = "Option::is_none")]
    pub right_ventricle: Option<MeasurementGroup>,
    #[serde(rename = "tdiSeptal", default, skip_serializing_if = "Option::is_none")]
    pub tdi_septal: Option<MeasurementGroup>,
    #[serde(rename = "tdiLivre", default, skip_serializing_if = "Option::is_none")]
    pub tdi_free_wall: Option<MeasurementGroup>,
    #[serde(rename = "valvasDoppler", default, skip_serializing_if = "Option::is_none")]
    pub valve_doppler: Option<MeasurementGroup>,
    #[serde(rename = "achados", default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(rename = "conclusoes", default, skip_serializing_if = "Option::is_none")]
    pub conclusions: Option<String>,
    #[serde(rename = "examInfo", default, skip_serializing_if = "Option::is_none")]
    pub exam_info: Option<ExamInfo>,
    #[serde(rename = "patientData", default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientRecord>,
}

impl ExamRecord {
    pub fn is_empty(&self) -> bool {
        *self == ExamRecord::default()
    }

    pub fn group(&self, category: MeasurementCategory) -> Option<&MeasurementGroup> {
        match category {
            MeasurementCategory::Ventricular => self.measurements.as_ref(),
            MeasurementCategory::DiastolicFunction => self.diastolic_function.as_ref(),
            MeasurementCategory::SystolicFunction => self.systolic_function.as_ref(),
            MeasurementCategory::RightVentricle => self.right_ventricle.as_ref(),
            MeasurementCategory::TdiSeptal => self.tdi_septal.as_ref(),
            MeasurementCategory::TdiFreeWall => self.tdi_free_wall.as_ref(),
            MeasurementCategory::ValveDoppler => self.valve_doppler.as_ref(),
        }
    }

    pub fn group_mut(&mut self, category: MeasurementCategory) -> &mut Option<MeasurementGroup> {
        match category {
            MeasurementCategory::Ventricular => &mut self.measurements,
            MeasurementCategory::DiastolicFunction => &mut self.diastolic_function,
            MeasurementCategory::SystolicFunction => &mut self.systolic_function,
            MeasurementCategory::RightVentricle => &mut self.right_ventricle,
            MeasurementCategory::TdiSeptal => &mut self.tdi_septal,
            MeasurementCategory::TdiFreeWall => &mut self.tdi_free_wall,
            MeasurementCategory::ValveDoppler => &mut self.valve_doppler,
        }
    }

    /// Number of measurement groups present.
    pub fn group_count(&self) -> usize {
        MeasurementCategory::ALL
            .iter()
            .filter(|&&c| self.group(c).is_some())
            .count()
    }
}
