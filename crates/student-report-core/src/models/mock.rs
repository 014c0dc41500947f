use super::Student;

/// Fixed sample record for the test report endpoint.
pub fn mock_student() -> Student {
    Student {
        id: 1,
        name: "John Doe".to_string(),
        email: "john.doe@school.com".to_string(),
        system_access: true,
        phone: Some("+1234567890".to_string()),
        gender: Some("Male".to_string()),
        dob: Some("1995-05-15".to_string()),
        class: Some("Grade 10".to_string()),
        section: Some("A".to_string()),
        roll: Some(15),
        father_name: Some("Robert Doe".to_string()),
        father_phone: Some("+1234567891".to_string()),
        mother_name: Some("Jane Doe".to_string()),
        mother_phone: Some("+1234567892".to_string()),
        guardian_name: Some("Robert Doe".to_string()),
        guardian_phone: Some("+1234567891".to_string()),
        relation_of_guardian: Some("Father".to_string()),
        current_address: Some("123 Main St, City, State 12345".to_string()),
        permanent_address: Some("123 Main St, City, State 12345".to_string()),
        admission_date: Some("2020-09-01".to_string()),
        reporter_name: Some("Ms. Sarah Johnson".to_string()),
    }
}
