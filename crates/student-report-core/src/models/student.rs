use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::api::{ApiError, Result};

/// Student record as served by the upstream `/students/{id}` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub system_access: bool,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub roll: Option<i64>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub admission_date: Option<String>,
    pub reporter_name: Option<String>,
}

/// Numeric student identifier accepted by the record endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StudentId(i64);

impl StudentId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for StudentId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<i64>()
            .map(StudentId)
            .map_err(|_| ApiError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generic upstream response wrapper. `data` stays untyped until `decode_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: String,
}

impl ApiEnvelope {
    /// Wrap a payload the way the upstream does for successful responses.
    pub fn wrap<T: Serialize>(data: &T) -> Result<Self> {
        Ok(Self {
            success: true,
            data: serde_json::to_value(data)?,
            message: String::new(),
        })
    }

    /// Check the success flag and decode the payload into `T`.
    pub fn decode_data<T: DeserializeOwned>(self) -> Result<T> {
        if !self.success {
            return Err(ApiError::UpstreamRejected(self.message));
        }
        Ok(serde_json::from_value(self.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mock_student;

    #[test]
    fn test_parse_student_id() {
        assert_eq!("1".parse::<StudentId>().unwrap(), StudentId::new(1));
        assert_eq!("123".parse::<StudentId>().unwrap().get(), 123);

        for bad in ["abc", "", " 1", "1.5", "12a", "99999999999999999999"] {
            match bad.parse::<StudentId>() {
                Err(ApiError::InvalidId(raw)) => assert_eq!(raw, bad),
                other => panic!("{bad:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_sparse_student() {
        let json = r#"{"id": 1, "name": "John Doe", "phone": null, "roll": 15}"#;
        let student: Student = serde_json::from_str(json).expect("Failed to parse student");
        assert_eq!(student.id, 1);
        assert_eq!(student.name, "John Doe");
        assert_eq!(student.email, "");
        assert!(!student.system_access);
        assert_eq!(student.phone, None);
        assert_eq!(student.roll, Some(15));
        assert_eq!(student.father_name, None);
    }

    #[test]
    fn test_camel_case_keys() {
        let value = serde_json::to_value(mock_student()).unwrap();
        assert_eq!(value["systemAccess"], true);
        assert_eq!(value["relationOfGuardian"], "Father");
        assert_eq!(value["admissionDate"], "2020-09-01");
    }

    #[test]
    fn test_envelope_round_trip() {
        let student = mock_student();
        let json = serde_json::to_string(&ApiEnvelope::wrap(&student).unwrap()).unwrap();

        let envelope: ApiEnvelope = serde_json::from_str(&json).unwrap();
        let decoded: Student = envelope.decode_data().unwrap();
        assert_eq!(decoded, student);
    }

    #[test]
    fn test_unsuccessful_envelope() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"success": false, "message": "Student not found"}"#).unwrap();
        match envelope.decode_data::<Student>() {
            Err(ApiError::UpstreamRejected(msg)) => assert_eq!(msg, "Student not found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_payload_shape_mismatch() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"success": true, "data": {"id": "one"}}"#).unwrap();
        assert!(matches!(
            envelope.decode_data::<Student>(),
            Err(ApiError::Decode(_))
        ));
    }
}
