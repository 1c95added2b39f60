// CV extraction prompt. Fixed; callers only supply the CV text.

pub const CV_EXTRACTION_PROMPT: &str = r#"You are an expert in extracting data from CVs strictly according to the World Bank FORM TECH-6 template.

Your sole task is to parse the provided CV text and extract ONLY the information that is explicitly stated. Do NOT invent, assume, infer, modify, or add any data. If a value or section is not present, missing, or unclear, you MUST return an empty string ('') for strings, and an empty array ([]) for lists or arrays in the output.

Every field listed in the JSON schema below must be present in your output, even if the corresponding data is missing from the CV. If data is not found for a particular field, provide the exact required empty value for that field ('' or []). Under NO circumstances should you omit any fields or return a partial/malformed object.

Preserve original wording, phrasing, capitalization, and formatting as much as possible. Normalize dates only to 'YYYY', 'YYYY-MM', or 'YYYY-MM-DD' formats if they are clearly dates; otherwise, leave as-is.

The CV text may contain:
- Plain paragraphs: e.g., 'Name: John Doe'
- Table rows separated by ' | ', e.g., 'University X | MSc | 2020'
- Bullet points starting with '*', '-', or '•'

Identify sections by number (1., 2., etc.) or headings (Education, Languages, etc.). Extract all required information as arrays in the order they appear, sorting employment_record in reverse chronological order if dates can be parsed.

Fields to extract (all must be present in output, always fill with either actual data or empty as instructed above):
1. name: Extract full name after 'Name' or similar; '' if not found.
2. expert_contact_information: Object with phone (extract phone/mobile, '' if missing) and email (extract email, '' if missing).
3. proposed_position: Extract after 'Proposed Position' or similar; '' if not found.
4. employer: Extract current/primary employer; '' if not found.
5. date_of_birth: Extract birth date exactly; '' if not found.
6. nationality: Extract nationality; '' if not found.
7. education: Array of objects from education section/table, or [] if not found. For each: school_university, degree, date_obtained (all fields '' if missing).
8. membership_in_professional_associations: Multi-line string; '' if not found.
9. publications: Multi-line string; '' if not found.
10. other_training: Training text, combine lines as needed; '' if not found.
11. countries_experience: Comma-separated string; '' if not found.
12. languages: Array of objects from languages section, or [] if not found. For each: language, speaking, reading, writing (all fields '' if missing).
13. employment_record: Array of objects, or [] if not found. See schema for required subfields; use '' for any missing string field.
14. detailed_tasks: Array of strings; [] if not found.
15. work_undertaken: Array of project objects, or [] if not found. All subfields as above.
16. worked_for_world_bank: Extract answer to World Bank work question; '' if not found.

Below is the required JSON schema. Output ONLY a JSON object with EVERY field as described; do not output any additional explanation, text, or formatting.
CV text:
{cv_text}"#;

pub fn build_extraction_prompt(cv_text: &str) -> String {
    CV_EXTRACTION_PROMPT.replace("{cv_text}", cv_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_ends_with_cv_text() {
        let prompt = build_extraction_prompt("Name: Jane Doe");
        assert!(prompt.ends_with("CV text:\nName: Jane Doe"));
        assert!(!prompt.contains("{cv_text}"));
    }

    #[test]
    fn test_prompt_states_sentinel_and_date_rules() {
        assert!(CV_EXTRACTION_PROMPT.contains("Do NOT invent"));
        assert!(CV_EXTRACTION_PROMPT.contains("empty array ([])"));
        assert!(CV_EXTRACTION_PROMPT.contains("'YYYY-MM-DD'"));
        assert!(CV_EXTRACTION_PROMPT.contains("reverse chronological"));
    }

    #[test]
    fn test_world_bank_answer_defaults_to_empty() {
        assert!(CV_EXTRACTION_PROMPT
            .contains("worked_for_world_bank: Extract answer to World Bank work question; '' if not found."));
        assert!(!CV_EXTRACTION_PROMPT.contains("'No'"));
    }
}
