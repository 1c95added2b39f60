//! The normalized candidate profile (World Bank FORM TECH-6 shape).
//!
//! Every struct defaults each field to its empty value, so a profile built
//! from a partial JSON object still serializes every declared field.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    #[serde(rename = "expert_contact_information")]
    pub contact: ContactInformation,
    pub proposed_position: String,
    pub employer: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub education: Vec<EducationEntry>,
    /// One association per line.
    pub membership_in_professional_associations: String,
    /// One publication per line.
    pub publications: String,
    pub other_training: String,
    /// Comma-separated country names.
    pub countries_experience: String,
    pub languages: Vec<LanguageEntry>,
    pub employment_record: Vec<EmploymentEntry>,
    pub detailed_tasks: Vec<String>,
    pub work_undertaken: Vec<WorkEntry>,
    pub worked_for_world_bank: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInformation {
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub school_university: String,
    pub degree: String,
    pub date_obtained: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageEntry {
    pub language: String,
    pub speaking: String,
    pub reading: String,
    pub writing: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentEntry {
    pub from: String,
    pub to: String,
    pub employer: String,
    pub position: String,
    pub location: String,
    pub summary_of_activities: String,
    pub for_references: String,
    /// Reference contact, not the candidate.
    pub name: String,
    pub designation: String,
    pub telephone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkEntry {
    pub name: String,
    pub year: String,
    pub location: String,
    pub client: String,
    pub main_features: String,
    pub position_held: String,
    pub activities: String,
}

impl CandidateProfile {
    /// Builds a profile from untrusted JSON (model replies, client payloads).
    /// `null`s are dropped first so they fall back to the empty value instead
    /// of failing deserialization.
    pub fn from_json_lenient(mut value: serde_json::Value) -> Result<Self, serde_json::Error> {
        strip_nulls(&mut value);
        serde_json::from_value(value)
    }
}

fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_object_yields_all_sentinels() {
        let profile = CandidateProfile::from_json_lenient(json!({})).unwrap();
        assert_eq!(profile, CandidateProfile::default());
    }

    #[test]
    fn test_nulls_become_empty_values() {
        let profile = CandidateProfile::from_json_lenient(json!({
            "name": null,
            "expert_contact_information": {"phone": null, "email": "a@b.c"},
            "education": null,
            "detailed_tasks": ["Survey design", null],
            "employment_record": [{"from": "2020", "employer": null}]
        }))
        .unwrap();

        assert_eq!(profile.name, "");
        assert_eq!(profile.contact.phone, "");
        assert_eq!(profile.contact.email, "a@b.c");
        assert!(profile.education.is_empty());
        assert_eq!(profile.detailed_tasks, vec!["Survey design".to_string()]);
        assert_eq!(profile.employment_record[0].from, "2020");
        assert_eq!(profile.employment_record[0].employer, "");
        assert_eq!(profile.employment_record[0].telephone, "");
    }

    #[test]
    fn test_contact_serializes_under_schema_key() {
        let value = serde_json::to_value(CandidateProfile::default()).unwrap();
        assert!(value.get("expert_contact_information").is_some());
        assert!(value.get("contact").is_none());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(CandidateProfile::from_json_lenient(json!("not a profile")).is_err());
    }
}
