use std::sync::LazyLock;

use super::exam_info::extract_exam_info;
use super::measurements::extract_all;
use super::patient::PatientFieldExtractor;
use super::sections::extract_sections;
use super::types::{ExamRecord, PatientRecord};
use crate::config::ExtractionConfig;

/// Entry point for both record kinds. Holds only immutable configuration,
/// so one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    config: ExtractionConfig,
    patient: PatientFieldExtractor,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl RecordExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let patient = PatientFieldExtractor::new(&config);
        Self { config, patient }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// All nine patient fields; missing ones are empty strings.
    pub fn extract_patient(&self, text: &str) -> PatientRecord {
        let record = self.patient.extract(text);
        tracing::debug!(
            input_chars = text.len(),
            filled = record.filled_count(),
            "Patient extraction complete"
        );
        record
    }

    /// Measurement groups, narrative sections, exam metadata and patient
    /// identity. Members with nothing found are left out.
    pub fn extract_exam(&self, text: &str) -> ExamRecord {
        let mut exam = ExamRecord::default();
        if text.trim().is_empty() {
            return exam;
        }

        for (category, group) in extract_all(text) {
            *exam.group_mut(category) = Some(group);
        }

        let sections = extract_sections(text, self.config.section_max_chars);
        exam.findings = sections.findings;
        exam.conclusions = sections.conclusions;

        let info = extract_exam_info(text);
        if !info.is_empty() {
            exam.exam_info = Some(info);
        }

        let patient = self.patient.extract(text);
        if !patient.is_empty() {
            exam.patient = Some(patient);
        }

        tracing::debug!(
            input_chars = text.len(),
            groups = exam.group_count(),
            findings = exam.findings.is_some(),
            conclusions = exam.conclusions.is_some(),
            exam_info = exam.exam_info.is_some(),
            patient = exam.patient.is_some(),
            "Exam extraction complete"
        );

        exam
    }
}

static DEFAULT_EXTRACTOR: LazyLock<RecordExtractor> = LazyLock::new(RecordExtractor::default);

/// [`RecordExtractor::extract_patient`] with the default configuration.
pub fn extract_patient(text: &str) -> PatientRecord {
    DEFAULT_EXTRACTOR.extract_patient(text)
}

/// [`RecordExtractor::extract_exam`] with the default configuration.
pub fn extract_exam(text: &str) -> ExamRecord {
    DEFAULT_EXTRACTOR.extract_exam(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::measurements::MeasurementCategory;
    use crate::pipeline::extraction::types::ExamInfo;

    const FORM: &str = "Paciente: Rex\nResponsável: João Silva\nTelefone: (11) 98765-4321\n\
                        Espécie: canino\nSexo: macho\nIdade: 3 anos\nPeso: 12,5 kg";

    #[test]
    fn patient_form_end_to_end() {
        let record = extract_patient(FORM);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "nome": "Rex",
                "responsavel": "João Silva",
                "responsavelTelefone": "(11) 98765-4321",
                "responsavelEmail": "",
                "especie": "canino",
                "raca": "",
                "sexo": "macho",
                "idade": "3 anos",
                "peso": "12.5",
            })
        );
    }

    #[test]
    fn measurement_line_end_to_end() {
        let exam = extract_exam("LVIDd 3,21 cm LVIDs 1 98 cm IVSd 0.45cm");
        let json = serde_json::to_value(&exam).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "measurementsData": {
                    "dvedDiastole": "3.21",
                    "dvedSistole": "1.98",
                    "septoIVd": "0.45",
                }
            })
        );
    }

    #[test]
    fn exam_info_end_to_end() {
        let exam = extract_exam("Exame 05/03/2024 ... 143bpm");
        assert_eq!(
            exam,
            ExamRecord {
                exam_info: Some(ExamInfo {
                    date: Some("2024-03-05".into()),
                    heart_rate: Some("143".into()),
                }),
                ..ExamRecord::default()
            }
        );
    }

    #[test]
    fn full_report_fills_every_part() {
        let text = "Paciente: Nina\nEspécie: felino\n\
                    IVSd 0,52 cm LVPWd 0,48 cm\n\
                    onda E 0,72 m/s onda A 0,55 m/s\n\
                    TAPSE 0,9 cm\n\
                    Data 12/08/2024 FC 180 bpm\n\n\
                    Achados: ventrículo esquerdo com paredes preservadas.\n\n\
                    Conclusão: exame dentro da normalidade.";
        let exam = extract_exam(text);

        let ventricular = exam.group(MeasurementCategory::Ventricular).unwrap();
        assert_eq!(ventricular.get("septoIVd"), Some("0.52"));
        assert_eq!(ventricular.get("paredeLVd"), Some("0.48"));

        let diastolic = exam.group(MeasurementCategory::DiastolicFunction).unwrap();
        assert_eq!(diastolic.get("ondaE"), Some("0.72"));
        assert_eq!(diastolic.get("ondaA"), Some("0.55"));

        let right = exam.group(MeasurementCategory::RightVentricle).unwrap();
        assert_eq!(right.get("tapse"), Some("0.9"));

        assert_eq!(
            exam.findings.as_deref(),
            Some("ventrículo esquerdo com paredes preservadas.")
        );
        assert_eq!(exam.conclusions.as_deref(), Some("exame dentro da normalidade."));

        let info = exam.exam_info.as_ref().unwrap();
        assert_eq!(info.date.as_deref(), Some("2024-08-12"));
        assert_eq!(info.heart_rate.as_deref(), Some("180"));

        let patient = exam.patient.as_ref().unwrap();
        assert_eq!(patient.name, "Nina");
        assert_eq!(patient.species, "felino");
    }

    #[test]
    fn groups_without_values_are_omitted() {
        let exam = extract_exam("TAPSE 1,2 cm");
        assert!(exam.right_ventricle.is_some());
        assert!(exam.tdi_septal.is_none());
        assert!(exam.tdi_free_wall.is_none());

        let json = serde_json::to_string(&exam).unwrap();
        assert!(!json.contains("tdiSeptal"));
        assert!(!json.contains("tdiLivre"));
    }

    #[test]
    fn empty_input_yields_empty_records() {
        for text in ["", "   ", "\n\n\t"] {
            assert!(extract_patient(text).is_empty());
            assert!(extract_exam(text).is_empty());
            assert_eq!(serde_json::to_string(&extract_exam(text)).unwrap(), "{}");
        }
    }

    #[test]
    fn section_cap_comes_from_config() {
        let config = ExtractionConfig {
            section_max_chars: 5,
            ..ExtractionConfig::default()
        };
        let exam = RecordExtractor::new(config).extract_exam("Conclusão: cardiopatia congênita");
        assert_eq!(exam.conclusions.as_deref(), Some("cardi"));
    }

    #[test]
    fn zero_section_cap_omits_sections() {
        let config = ExtractionConfig {
            section_max_chars: 0,
            ..ExtractionConfig::default()
        };
        let exam = RecordExtractor::new(config).extract_exam("Conclusão: exame normal");
        assert_eq!(exam.conclusions, None);
        assert_eq!(serde_json::to_string(&exam).unwrap(), "{}");
    }

    #[test]
    fn measurement_only_text_has_no_patient() {
        for text in [
            "Septo interventricular diástole: 0,62 cm",
            "Onda E 0.8",
            "Aorta 1.2 cm",
            "DVED 4.2 cm",
            "TDI S' 10.2 cm/s",
            "Left Ventricular Internal Dimension in diastole 3.5 cm",
        ] {
            let exam = extract_exam(text);
            assert!(exam.patient.is_none(), "{text:?}");
            assert!(exam.group_count() > 0, "{text:?}");
        }
    }

    #[test]
    fn extractor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecordExtractor>();

        let extractor = RecordExtractor::default();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| extractor.extract_patient(FORM)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().name, "Rex");
            }
        });
    }
}
