use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub slot_id: i64,
    pub booking_date: NaiveDate,
    pub day: String,
    pub time: String,
    pub lesson_type: LessonType,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub session_number: u32,
    pub total_sessions: u32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Beginner,
    Intermediate,
    Advanced,
    Parking,
    Night,
}

impl LessonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonType::Beginner => "beginner",
            LessonType::Intermediate => "intermediate",
            LessonType::Advanced => "advanced",
            LessonType::Parking => "parking",
            LessonType::Night => "night",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LessonType::Beginner => "Beginner - first lesson",
            LessonType::Intermediate => "Intermediate - skill building",
            LessonType::Advanced => "Advanced - highway driving",
            LessonType::Parking => "Parking practice",
            LessonType::Night => "Night driving",
        }
    }
}

/// Display-only; the store never branches on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_type_wire_names() {
        let parsed: LessonType = serde_json::from_str(r#""parking""#).unwrap();
        assert_eq!(parsed, LessonType::Parking);
        assert_eq!(serde_json::to_string(&LessonType::Night).unwrap(), r#""night""#);
        assert!(serde_json::from_str::<LessonType>(r#""racing""#).is_err());
    }

    #[test]
    fn test_appointment_serializes_camel_case() {
        let appointment = Appointment {
            id: "a-1".to_string(),
            user_id: "u-1".to_string(),
            user_name: "Sara".to_string(),
            user_email: "sara@example.com".to_string(),
            user_phone: "0501234567".to_string(),
            slot_id: 3,
            booking_date: NaiveDate::from_ymd_opt(2025, 6, 17).unwrap(),
            day: "Tuesday".to_string(),
            time: "9:00 AM - 11:00 AM".to_string(),
            lesson_type: LessonType::Beginner,
            notes: None,
            status: AppointmentStatus::Pending,
            session_number: 1,
            total_sessions: 2,
            created_at: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        };

        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["slotId"], 3);
        assert_eq!(json["bookingDate"], "2025-06-17");
        assert_eq!(json["lessonType"], "beginner");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["totalSessions"], 2);
    }
}
