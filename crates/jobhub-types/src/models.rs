use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when a stored or submitted string is not a member of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed, string-backed enum. The same text is used on the wire
/// and in the database.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Account role. Fixed set; there is no finer-grained capability model.
    Role {
        Candidate => "CANDIDATE",
        Hr => "HR",
        University => "UNIVERSITY",
        Admin => "ADMIN",
        Moderator => "MODERATOR",
    }
}

impl Role {
    /// Staff roles are provisioned by an admin, never through sign-up.
    pub fn can_self_register(&self) -> bool {
        matches!(self, Role::Candidate | Role::Hr | Role::University)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

string_enum! {
    JobStatus {
        Draft => "DRAFT",
        Active => "ACTIVE",
        Paused => "PAUSED",
        Closed => "CLOSED",
    }
}

string_enum! {
    ModerationStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Returned => "RETURNED",
    }
}

string_enum! {
    JobType {
        FullTime => "FULL_TIME",
        PartTime => "PART_TIME",
        Contract => "CONTRACT",
        Remote => "REMOTE",
    }
}

string_enum! {
    ExperienceLevel {
        Junior => "JUNIOR",
        Mid => "MID",
        Senior => "SENIOR",
        Lead => "LEAD",
    }
}

string_enum! {
    InternshipStatus {
        Draft => "DRAFT",
        Active => "ACTIVE",
        Paused => "PAUSED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

string_enum! {
    ApplicationStatus {
        Pending => "PENDING",
        Reviewed => "REVIEWED",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
        InterviewScheduled => "INTERVIEW_SCHEDULED",
        Hired => "HIRED",
        Withdrawn => "WITHDRAWN",
    }
}

string_enum! {
    InternshipRequestStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

string_enum! {
    CompanyResponseStatus {
        Pending => "PENDING",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
    }
}

string_enum! {
    NotificationKind {
        ApplicationReceived => "APPLICATION_RECEIVED",
        ApplicationStatusChanged => "APPLICATION_STATUS_CHANGED",
        JobModerated => "JOB_MODERATED",
        CompanyResponseReceived => "COMPANY_RESPONSE_RECEIVED",
        CompanyResponseStatusChanged => "COMPANY_RESPONSE_STATUS_CHANGED",
        System => "SYSTEM",
    }
}

// -- Users & profiles --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: Uuid,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HrProfile {
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub company_website: Option<String>,
    pub company_description: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniversityProfile {
    pub user_id: Uuid,
    pub university_name: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub contact_phone: Option<String>,
}

/// Role-specific profile attached to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profile {
    Candidate(CandidateProfile),
    Hr(HrProfile),
    University(UniversityProfile),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
}

// -- Postings --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub hr_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub company_name: String,
    pub location: Option<String>,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub remote: bool,
    pub status: JobStatus,
    pub moderation_status: ModerationStatus,
    pub moderation_note: Option<String>,
    pub moderated_by: Option<Uuid>,
    pub views_count: i64,
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Only active, moderator-approved jobs are listed to the public.
    pub fn is_public(&self) -> bool {
        self.status == JobStatus::Active && self.moderation_status == ModerationStatus::Approved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Internship {
    pub id: Uuid,
    pub hr_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub company_name: String,
    pub location: Option<String>,
    pub duration_months: Option<u32>,
    pub stipend: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub positions: u32,
    pub status: InternshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Internship {
    pub fn is_public(&self) -> bool {
        self.status == InternshipStatus::Active
    }
}

// -- Applications --

/// A candidate's application. Exactly one of `job_id` / `internship_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub job_id: Option<Uuid>,
    pub internship_id: Option<Uuid>,
    pub posting_title: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- University side --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternshipRequest {
    pub id: Uuid,
    pub university_id: Uuid,
    pub university_name: Option<String>,
    pub title: String,
    pub description: String,
    pub field_of_study: String,
    pub student_count: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub requirements: Option<String>,
    pub status: InternshipRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub hr_id: Uuid,
    pub company_name: Option<String>,
    pub message: String,
    pub offered_positions: u32,
    pub status: CompanyResponseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_text_matches_wire_format() {
        assert_eq!(ApplicationStatus::InterviewScheduled.as_str(), "INTERVIEW_SCHEDULED");
        assert_eq!(
            serde_json::to_string(&InternshipRequestStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let parsed: ModerationStatus = serde_json::from_str("\"RETURNED\"").unwrap();
        assert_eq!(parsed, ModerationStatus::Returned);
    }

    #[test]
    fn every_variant_parses_back() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), *status);
        }
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), *role);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = "ARCHIVED".parse::<JobStatus>().unwrap_err();
        assert_eq!(err.kind, "JobStatus");
        assert_eq!(err.value, "ARCHIVED");
        assert!(serde_json::from_str::<Role>("\"ROOT\"").is_err());
    }

    #[test]
    fn staff_roles_cannot_self_register() {
        assert!(Role::Candidate.can_self_register());
        assert!(Role::Hr.can_self_register());
        assert!(Role::University.can_self_register());
        assert!(!Role::Admin.can_self_register());
        assert!(!Role::Moderator.can_self_register());
        assert!(Role::Moderator.is_staff());
    }

    #[test]
    fn profile_is_tagged_by_kind() {
        let profile = Profile::Hr(HrProfile {
            company_name: Some("Acme".into()),
            ..Default::default()
        });
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["kind"], "HR");
        assert_eq!(value["company_name"], "Acme");
    }
}
