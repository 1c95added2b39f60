//! Output schema sent to the model as its structured-output constraint.
//!
//! Existing callers depend on these field names and descriptions, so the
//! schema is written out literally rather than derived from the Rust types.

use std::sync::OnceLock;

use serde_json::{json, Value};

pub fn wb_cv_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(build_schema)
}

fn build_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "Full name of the expert"
            },
            "expert_contact_information": {
                "type": "object",
                "properties": {
                    "phone": {"type": "string", "description": "Phone or mobile number of the expert"},
                    "email": {"type": "string", "description": "Email address of the expert"}
                },
                "required": ["phone", "email"]
            },
            "proposed_position": {
                "type": "string",
                "description": "Position title and number"
            },
            "employer": {
                "type": "string",
                "description": "Current employer"
            },
            "date_of_birth": {
                "type": "string",
                "description": "Date of birth"
            },
            "nationality": {
                "type": "string",
                "description": "Country of citizenship/residence"
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "school_university": {"type": "string"},
                        "degree": {"type": "string"},
                        "date_obtained": {"type": "string"}
                    },
                    "required": ["school_university", "degree", "date_obtained"]
                }
            },
            "membership_in_professional_associations": {
                "type": "string",
                "description": "Memberships in professional associations as a multi-line string (e.g., join with '\n'). Empty if not found."
            },
            "publications": {
                "type": "string",
                "description": "Publications as a multi-line string (e.g., join with '\n'). Empty if not found."
            },
            "other_training": {
                "type": "string",
                "description": "All relevant training information copied exactly as in CV and must be given result by listing of all trainings. Empty string if not present."
            },
            "countries_experience": {
                "type": "string",
                "description": "List of countries with experience, comma-separated. Empty if not found."
            },
            "languages": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "language": {"type": "string"},
                        "speaking": {"type": "string"},
                        "reading": {"type": "string"},
                        "writing": {"type": "string"}
                    },
                    "required": ["language", "speaking", "reading", "writing"]
                }
            },
            "employment_record": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "from": {"type": "string"},
                        "to": {"type": "string"},
                        "employer": {"type": "string", "description": "Name of the employer (mandatory)"},
                        "position": {"type": "string", "description": "Title of the position held just title of the position nothing else exactly in cv (mandatory)"},
                        "location": {"type": "string", "description": "City and country of the employer"},
                        "summary_of_activities": {"type": "string", "description": "Brief description of the main activities and responsibilities"},
                        "for_references": {"type": "string", "description": "Whether the employer can be contacted for references just find the reference and no give answer"},
                        "name": {"type": "string", "description": "Name of the person which is the reference in cv for spacific company or project (mandatory)"},
                        "designation": {"type": "string", "description": "Designation of the expert in this project find it important data or position held (mandatory)"},
                        "telephone": {"type": "string", "description": "find the reference contact Phone number, mobile number, contact number (mandatory)"},
                        "email": {"type": "string", "description": "Email address of the expert or mail address (mandatory)"}
                    },
                    "required": [
                        "from", "to", "employer", "position", "for_references",
                        "name", "designation", "telephone", "email", "location",
                        "summary_of_activities"
                    ]
                }
            },
            "detailed_tasks": {
                "type": "array",
                "items": {"type": "string"},
                "description": "no need any result send empty "
            },
            "work_undertaken": {
                "type": "array",
                "items": {
                    "type": "object",
                    "description": "Find project by Project name/date/Details of each assignment/project undertaken, Mainly find Name of project and put all projects one by one with all project details/date/main features/position held/activities undertaken exactly as in cv. Check cv very well for all projects no miss any project.",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the assignment/project find from the CV and copy exactly as in cv. must be given full project name by any change not found in cv then give empty string"},
                        "year": {"type": "string", "description": "Date of the assignment/project mention start date to end date or Present/till date. Given result must be exactly as in cv"},
                        "location": {"type": "string"},
                        "client": {"type": "string"},
                        "main_features": {"type": "string", "description": "Main features of the project, try to find this from the cv and copy exactly as in cv every project must have main features."},
                        "position_held": {"type": "string", "description": "Position held during the project. this must be given exactly as in cv."},
                        "activities": {"type": "string", "description": "Description of the main activities undertaken, responsibilities carried out during the project. Try to find this from the CV and copy exactly as in CV."}
                    },
                    "required": [
                        "name", "year", "location", "client", "main_features",
                        "position_held", "activities"
                    ]
                }
            },
            "worked_for_world_bank": {
                "type": "string",
                "description": "Details of World Bank work experience or 'No'"
            }
        },
        "required": [
            "name", "expert_contact_information", "proposed_position", "employer", "date_of_birth", "nationality",
            "education", "membership_in_professional_associations", "publications", "other_training", "countries_experience",
            "languages", "employment_record", "detailed_tasks", "work_undertaken",
            "worked_for_world_bank"
        ]
    })
}
