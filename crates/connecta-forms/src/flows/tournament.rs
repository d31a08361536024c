//! Tournament registration with a returning-user shortcut.
//!
//! Step 0 asks whether the player registered before. New players go through
//! name, contact and profile steps and a user record is created. Returning
//! players enter their phone number, the account is looked up, and only the
//! tournament selection is written back to the existing record.

use serde_json::{json, Value};

use super::{full_name, options, placeholder_password, sanitized_phone, to_json};
use crate::application::submission::RecordMapping;
use crate::domain::{AgeRange, Condition, FieldValue, FormState, Rule};
use crate::wizard::{Branch, Discriminator, FieldKind, FieldSpec, FlowDefinition, StepPlan, StepSpec};

pub const KEY: &str = "tournament";
pub const COLLECTION: &str = "users";
pub const AGE_RANGE: AgeRange = AgeRange::new(7, 80);

pub const NEW_USER: &str = "new";
pub const RETURNING_USER: &str = "returning";

/// Remote field holding the selected tournaments. The spelling is part of
/// the backend schema.
pub const TOURNAMENTS_FIELD: &str = "tourments_interested_in";

/// Students below this age may name their school or university.
const SCHOOL_AGE_LIMIT: i32 = 27;

fn school_eligible() -> Condition {
    Condition::All(vec![
        Condition::one_of("educationDegree", &["high-school", "bachelor"]),
        Condition::age_below("birthDate", SCHOOL_AGE_LIMIT),
    ])
}

fn school_rule() -> Rule {
    let case = |degree: &str, message: &str| {
        (
            Condition::All(vec![school_eligible(), Condition::equals("educationDegree", degree)]),
            message.to_string(),
        )
    };
    Rule::RequiredCases(vec![
        case("high-school", "School name is required"),
        case("bachelor", "University name is required"),
    ])
}

pub fn definition() -> FlowDefinition {
    FlowDefinition {
        key: KEY.into(),
        title: "Tournament Registration".into(),
        collection: COLLECTION.into(),
        draft_key: "connecta2025_tournament_draft".into(),
        fields: vec![
            FieldSpec::new("firstName", "First Name", FieldKind::Text, Rule::person_name("First")),
            FieldSpec::new("lastName", "Last Name", FieldKind::Text, Rule::person_name("Last")),
            FieldSpec::new("phoneNumber", "Phone Number", FieldKind::Phone, Rule::Phone)
                .with_placeholder("+20 123 456 7890"),
            FieldSpec::new("birthDate", "Birth Date", FieldKind::Date, Rule::BirthDate(AGE_RANGE)),
            FieldSpec::new(
                "educationDegree",
                "Education Degree",
                FieldKind::Select,
                Rule::required_choice("Please select your education degree"),
            )
            .with_options(options::tournament_degrees()),
            FieldSpec::new("schoolName", "School / University Name", FieldKind::Autocomplete, school_rule())
                .visible_when(school_eligible())
                .with_placeholder("Start typing to search"),
            FieldSpec::new("areaOfInterest", "Area of Interest", FieldKind::Select, Rule::Optional)
                .with_default(FieldValue::text("gaming")),
            FieldSpec::new(
                "favoriteGame",
                "Favorite Games",
                FieldKind::MultiSelect,
                Rule::required_many("Please select at least one favorite game"),
            )
            .with_options(options::tournament_games()),
        ],
        plan: StepPlan::Branching(Discriminator {
            question: "Have you registered with us before?".into(),
            branches: vec![
                Branch {
                    value: RETURNING_USER.into(),
                    label: "Yes, I have an account".into(),
                    steps: vec![
                        StepSpec::new("Enter your phone number", &["phoneNumber"]).with_lookup(),
                        StepSpec::new("Select Tournaments", &["favoriteGame"]),
                    ],
                },
                Branch {
                    value: NEW_USER.into(),
                    label: "No, I'm new here".into(),
                    steps: vec![
                        StepSpec::new("Let's start with your name", &["firstName", "lastName"]),
                        StepSpec::new("Your contact information", &["phoneNumber", "birthDate"]),
                        StepSpec::new(
                            "Tell us about yourself",
                            &["educationDegree", "schoolName", "favoriteGame"],
                        ),
                    ],
                },
            ],
        }),
        age_range: AGE_RANGE,
        success_message: "Join me at Connecta Gaming Event!".into(),
    }
}

pub struct TournamentMapping;

impl RecordMapping for TournamentMapping {
    fn create_payload(&self, form: &FormState) -> Value {
        let phone = sanitized_phone(form);
        let password = placeholder_password(&phone);
        let games = to_json(form.get("favoriteGame"));
        let school = match form.text("schoolName").trim() {
            "" => Value::Null,
            name => Value::String(name.to_string()),
        };
        json!({
            "name": full_name(form),
            "phoneNumber": phone,
            "birthDate": to_json(form.get("birthDate")),
            "educationDegree": to_json(form.get("educationDegree")),
            "areaOfInterest": to_json(form.get("areaOfInterest")),
            "favoriteGame": games,
            TOURNAMENTS_FIELD: games,
            "schoolName": school,
            "password": password,
            "passwordConfirm": password,
        })
    }

    fn update_payload(&self, form: &FormState) -> Option<Value> {
        Some(json!({ TOURNAMENTS_FIELD: to_json(form.get("favoriteGame")) }))
    }

    fn local_field(&self, remote: &str) -> String {
        match remote {
            "name" => "firstName".into(),
            TOURNAMENTS_FIELD => "favoriteGame".into(),
            "password" | "passwordConfirm" => "phoneNumber".into(),
            other => other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_player() -> FormState {
        let mut form = definition().defaults();
        form.set("firstName", FieldValue::text("Omar"));
        form.set("lastName", FieldValue::text("Nabil"));
        form.set("phoneNumber", FieldValue::text("+20 100 000 0001"));
        form.set("birthDate", FieldValue::text("2008-03-03"));
        form.set("educationDegree", FieldValue::text("high-school"));
        form.set("favoriteGame", FieldValue::many(["valorant", "fc26"]));
        form
    }

    #[test]
    fn test_create_payload_keeps_remote_spelling() {
        let payload = TournamentMapping.create_payload(&new_player());
        assert_eq!(payload["name"], "Omar Nabil");
        assert_eq!(payload["phoneNumber"], "201000000001");
        assert_eq!(payload["areaOfInterest"], "gaming");
        assert_eq!(payload["favoriteGame"], json!(["valorant", "fc26"]));
        assert_eq!(payload[TOURNAMENTS_FIELD], json!(["valorant", "fc26"]));
        assert!(payload["schoolName"].is_null());
        assert_eq!(payload["password"], "201000000001TempPassword123!");
    }

    #[test]
    fn test_update_payload_only_tournaments() {
        let payload = TournamentMapping.update_payload(&new_player()).unwrap();
        assert_eq!(payload, json!({ "tourments_interested_in": ["valorant", "fc26"] }));
    }

    #[test]
    fn test_remote_errors_map_to_local_fields() {
        assert_eq!(TournamentMapping.local_field(TOURNAMENTS_FIELD), "favoriteGame");
        assert_eq!(TournamentMapping.local_field("name"), "firstName");
        assert_eq!(TournamentMapping.local_field("birthDate"), "birthDate");
    }
}
