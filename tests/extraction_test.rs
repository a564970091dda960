//! Extraction engine over the example requests the agents are built for

use quickcheck_macros::quickcheck;
use taskrouter::extraction::{
    extract_fetch_command, extract_update_command, ExtractionError, ExtractionStage, Field,
    Identifier,
};

#[test]
fn test_fetch_examples() {
    let cases = [
        ("What is the address of Sujoy?", Field::Address),
        ("What is the skill set of Sunita?", Field::SkillSet),
        ("experience of employee id 3", Field::Experience),
        ("ph no of id 2", Field::PhoneNumber),
    ];

    for (text, field) in cases {
        assert_eq!(extract_fetch_command(text).unwrap().field, field, "{}", text);
    }
}

#[test]
fn test_employee_id_cue_without_digits_is_identifier_error() {
    let err = extract_fetch_command("What is the employee id of Sujoy?").unwrap_err();
    assert_eq!(err.stage(), ExtractionStage::Identifier);
}

#[test]
fn test_digit_concatenation_is_preserved() {
    let cmd = extract_fetch_command("phone of id 2 ... id 3").unwrap();
    assert_eq!(cmd.identifier, Identifier::id("23"));
}

#[test]
fn test_update_examples() {
    let cases = [
        (
            "Update employee id = 2 phone number to 462347382",
            Field::PhoneNumber,
            Identifier::id("2"),
            "462347382",
        ),
        (
            "Update Sujoy address to Kolkata",
            Field::Address,
            Identifier::name("Sujoy"),
            "Kolkata",
        ),
        (
            "Update Raktim skill set to C, Java, Python",
            Field::SkillSet,
            Identifier::name("Raktim"),
            "C, Java, Python",
        ),
        (
            "Change office for John Doe to New York.",
            Field::Office,
            Identifier::name("John Doe"),
            "New York",
        ),
    ];

    for (text, field, identifier, value) in cases {
        let cmd = extract_update_command(text).unwrap();
        assert_eq!(cmd.field, field, "{}", text);
        assert_eq!(cmd.identifier, identifier, "{}", text);
        assert_eq!(cmd.new_value.as_deref(), Some(value), "{}", text);
    }
}

#[test]
fn test_update_stage_order() {
    assert_eq!(
        extract_update_command("make it so").unwrap_err().stage(),
        ExtractionStage::Field
    );
    assert_eq!(
        extract_update_command("change the office to Pune").unwrap_err().stage(),
        ExtractionStage::Identifier
    );
    assert_eq!(
        extract_update_command("Update Sujoy office").unwrap_err().stage(),
        ExtractionStage::Value
    );
}

#[quickcheck]
fn prop_extraction_is_deterministic(text: String) -> bool {
    extract_fetch_command(&text) == extract_fetch_command(&text)
        && extract_update_command(&text) == extract_update_command(&text)
}

#[quickcheck]
fn prop_update_value_is_trimmed(text: String) -> bool {
    match extract_update_command(&text) {
        Ok(cmd) => cmd
            .new_value
            .map(|v| !v.is_empty() && v.trim() == v)
            .unwrap_or(false),
        Err(_) => true,
    }
}
