//! General attendee registration: name, contact, about you.

use serde_json::{json, Value};

use super::{full_name, options, placeholder_password, sanitized_phone, to_json};
use crate::application::submission::RecordMapping;
use crate::domain::{AgeRange, Condition, FormState, Rule};
use crate::wizard::{FieldKind, FieldSpec, FlowDefinition, StepPlan, StepSpec};

pub const KEY: &str = "attendee";
pub const COLLECTION: &str = "users";
pub const AGE_RANGE: AgeRange = AgeRange::new(16, 100);

pub fn definition() -> FlowDefinition {
    let gaming = Condition::equals("areaOfInterest", "gaming");
    FlowDefinition {
        key: KEY.into(),
        title: "Event Registration".into(),
        collection: COLLECTION.into(),
        draft_key: "connecta2025_attendee_draft".into(),
        fields: vec![
            FieldSpec::new("firstName", "First Name", FieldKind::Text, Rule::person_name("First"))
                .with_placeholder("Enter your first name"),
            FieldSpec::new("lastName", "Last Name", FieldKind::Text, Rule::person_name("Last"))
                .with_placeholder("Enter your last name"),
            FieldSpec::new("phoneNumber", "Phone Number", FieldKind::Phone, Rule::Phone)
                .with_placeholder("+20 123 456 7890"),
            FieldSpec::new("birthDate", "Birth Date", FieldKind::Date, Rule::BirthDate(AGE_RANGE)),
            FieldSpec::new(
                "educationDegree",
                "Education Degree",
                FieldKind::Select,
                Rule::required_choice("Please select your education degree"),
            )
            .with_options(options::education_degrees()),
            FieldSpec::new(
                "areaOfInterest",
                "Area of Interest",
                FieldKind::Select,
                Rule::required_choice("Please select your area of interest"),
            )
            .with_options(options::interests()),
            FieldSpec::new(
                "favoriteGame",
                "Favorite Game",
                FieldKind::Text,
                Rule::required_when(gaming.clone(), "Please tell us your favorite game"),
            )
            .visible_when(gaming)
            .with_placeholder("What do you love to play?"),
        ],
        plan: StepPlan::Linear(vec![
            StepSpec::new("Let's start with your name", &["firstName", "lastName"]),
            StepSpec::new("Your contact information", &["phoneNumber", "birthDate"]),
            StepSpec::new(
                "Tell us about yourself",
                &["educationDegree", "areaOfInterest", "favoriteGame"],
            ),
        ]),
        age_range: AGE_RANGE,
        success_message: "Application submitted successfully!".into(),
    }
}

pub struct AttendeeMapping;

impl RecordMapping for AttendeeMapping {
    fn create_payload(&self, form: &FormState) -> Value {
        let phone = sanitized_phone(form);
        let password = placeholder_password(&phone);
        let favorite = match form.text("favoriteGame").trim() {
            "" => Value::Null,
            game => Value::String(game.to_string()),
        };
        json!({
            "name": full_name(form),
            "phoneNumber": phone,
            "birthDate": to_json(form.get("birthDate")),
            "educationDegree": to_json(form.get("educationDegree")),
            "areaOfInterest": to_json(form.get("areaOfInterest")),
            "favoriteGame": favorite,
            "password": password,
            "passwordConfirm": password,
        })
    }

    fn local_field(&self, remote: &str) -> String {
        match remote {
            "name" => "firstName".into(),
            "password" | "passwordConfirm" => "phoneNumber".into(),
            other => other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    #[test]
    fn test_create_payload() {
        let form = FormState::from_pairs([
            ("firstName", FieldValue::text("Mona ")),
            ("lastName", FieldValue::text("Adel")),
            ("phoneNumber", FieldValue::text("+20 101-234-5678")),
            ("birthDate", FieldValue::text("2000-02-02")),
            ("educationDegree", FieldValue::text("bachelor")),
            ("areaOfInterest", FieldValue::text("design")),
            ("favoriteGame", FieldValue::text("")),
        ]);
        let payload = AttendeeMapping.create_payload(&form);
        assert_eq!(payload["name"], "Mona Adel");
        assert_eq!(payload["phoneNumber"], "201012345678");
        assert_eq!(payload["password"], "201012345678TempPassword123!");
        assert_eq!(payload["passwordConfirm"], payload["password"]);
        assert!(payload["favoriteGame"].is_null());
        assert!(AttendeeMapping.update_payload(&form).is_none());
    }
}
