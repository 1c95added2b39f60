//! Renders a `CandidateProfile` into a FORM TECH-6 style `.docx`.
//!
//! Section order follows the output schema. Empty sections keep their heading.

use thiserror::Error;

use crate::profile::models::CandidateProfile;

pub mod docx;

use docx::{package_document, BodyBuilder};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn render_profile_docx(profile: &CandidateProfile) -> Result<Vec<u8>, RenderError> {
    let mut body = BodyBuilder::new();

    body.title("FORM TECH-6 CURRICULUM VITAE (CV)");
    body.key_value_table(&[
        ("Name", &profile.name),
        ("Proposed Position", &profile.proposed_position),
        ("Employer", &profile.employer),
        ("Date of Birth", &profile.date_of_birth),
        ("Nationality", &profile.nationality),
        ("Phone", &profile.contact.phone),
        ("Email", &profile.contact.email),
    ]);

    body.heading("Education");
    if !profile.education.is_empty() {
        let rows: Vec<Vec<&str>> = profile
            .education
            .iter()
            .map(|e| {
                vec![
                    e.school_university.as_str(),
                    e.degree.as_str(),
                    e.date_obtained.as_str(),
                ]
            })
            .collect();
        body.grid_table(&["School/University", "Degree", "Date Obtained"], &rows);
    }

    body.heading("Membership in Professional Associations")
        .paragraph(&profile.membership_in_professional_associations);
    body.heading("Publications").paragraph(&profile.publications);
    body.heading("Other Training").paragraph(&profile.other_training);
    body.heading("Countries of Work Experience")
        .paragraph(&profile.countries_experience);

    body.heading("Language Skills");
    if !profile.languages.is_empty() {
        let rows: Vec<Vec<&str>> = profile
            .languages
            .iter()
            .map(|l| {
                vec![
                    l.language.as_str(),
                    l.speaking.as_str(),
                    l.reading.as_str(),
                    l.writing.as_str(),
                ]
            })
            .collect();
        body.grid_table(&["Language", "Speaking", "Reading", "Writing"], &rows);
    }

    body.heading("Employment Record");
    for job in &profile.employment_record {
        body.key_value_table(&[
            ("From", &job.from),
            ("To", &job.to),
            ("Employer", &job.employer),
            ("Position", &job.position),
            ("Location", &job.location),
            ("Summary of Activities", &job.summary_of_activities),
            ("For References", &job.for_references),
            ("Name", &job.name),
            ("Designation", &job.designation),
            ("Telephone", &job.telephone),
            ("Email", &job.email),
        ]);
    }

    body.heading("Detailed Tasks Assigned");
    for task in &profile.detailed_tasks {
        body.bullet(task);
    }

    body.heading("Work Undertaken that Best Illustrates Capability to Handle the Tasks Assigned");
    for project in &profile.work_undertaken {
        body.key_value_table(&[
            ("Name of Assignment or Project", &project.name),
            ("Year", &project.year),
            ("Location", &project.location),
            ("Client", &project.client),
            ("Main Project Features", &project.main_features),
            ("Positions Held", &project.position_held),
            ("Activities Performed", &project.activities),
        ]);
    }

    body.heading("Worked for the World Bank")
        .paragraph(&profile.worked_for_world_bank);

    package_document(&body.into_xml())
}

/// `Formatted_WB_CV_<name>.docx`, with spaces as `_` and anything outside
/// ASCII alphanumerics, `_`, `-`, `.` dropped so the name is header-safe.
pub fn download_filename(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let safe = if safe.trim_matches(['_', '.']).is_empty() {
        "Document".to_string()
    } else {
        safe
    };
    format!("Formatted_WB_CV_{safe}.docx")
}
