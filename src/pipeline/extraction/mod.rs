//! Rule-based field extraction from recognized text.
//!
//! Every operation here is infallible: a field that cannot be found is an
//! empty string (patient record) or an absent member (exam record).

pub mod types;
pub mod normalize;
pub mod label_value;
pub mod patient;
pub mod measurements;
pub mod sections;
pub mod exam_info;
pub mod orchestrator;

pub use types::*;
pub use normalize::{collapse_whitespace, normalize_number, title_case};
pub use label_value::{extract_number_after_labels, LabelValueExtractor};
pub use patient::PatientFieldExtractor;
pub use measurements::{extract_all, extract_category, FieldSpec, MeasurementCategory};
pub use sections::{extract_sections, NarrativeSection, Sections};
pub use exam_info::extract_exam_info;
pub use orchestrator::*;
