use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Application, ApplicationStatus, CompanyResponseStatus, ExperienceLevel, Internship,
    InternshipRequestStatus, InternshipStatus, Job, JobStatus, JobType, ModerationStatus, Role,
    User,
};

// -- JWT Claims --

/// JWT claims issued at login/registration and checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

// -- Common --

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Resolved page window. Built from the optional `page`/`limit` query params.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip. Widened so the largest `page` cannot overflow.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Bare `page`/`limit` query for listings without other filters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl UserQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRoleRequest {
    pub role: Role,
}

// -- Profiles --

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateProfileInput {
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub experience_years: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HrProfileInput {
    pub company_name: Option<String>,
    pub company_website: Option<String>,
    pub company_description: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniversityProfileInput {
    pub university_name: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetSkillsRequest {
    pub skill_ids: Vec<Uuid>,
}

// -- Skills --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillQuery {
    pub category: Option<String>,
}

// -- Jobs --

/// Body of job create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobInput {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub company_name: String,
    pub location: Option<String>,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub remote: bool,
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Initial status on create; ignored on update.
    pub status: Option<JobStatus>,
}

/// Filters for job listings. Public listings force status/moderation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub remote: Option<bool>,
    pub salary_min: Option<i64>,
    pub skill: Option<String>,
    pub hr_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl JobQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// Filters for an HR user's own postings, which may be in any state.
#[derive(Debug, Default, Deserialize)]
pub struct MyJobsQuery {
    pub status: Option<JobStatus>,
    pub moderation_status: Option<ModerationStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl MyJobsQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModerationQuery {
    pub moderation_status: Option<ModerationStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ModerationQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModerateJobRequest {
    pub moderation_status: ModerationStatus,
    pub note: Option<String>,
}

// -- Internships --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternshipInput {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub company_name: String,
    pub location: Option<String>,
    pub duration_months: Option<u32>,
    pub stipend: Option<i64>,
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_positions")]
    pub positions: u32,
    /// Initial status on create; ignored on update.
    pub status: Option<InternshipStatus>,
}

fn default_positions() -> u32 {
    1
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct InternshipQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl InternshipQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInternshipStatusRequest {
    pub status: InternshipStatus,
}

// -- Applications --

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ApplicationQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

/// Payload forwarded to the external analysis service.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub application: Application,
    pub job: Option<Job>,
    pub internship: Option<Internship>,
}

// -- Internship requests --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternshipRequestInput {
    pub title: String,
    pub description: String,
    pub field_of_study: String,
    pub student_count: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub requirements: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InternshipRequestQuery {
    pub status: Option<InternshipRequestStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl InternshipRequestQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInternshipRequestStatusRequest {
    pub status: InternshipRequestStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyResponseInput {
    pub message: String,
    #[serde(default = "default_positions")]
    pub offered_positions: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCompanyResponseStatusRequest {
    pub status: CompanyResponseStatus,
}

// -- Notifications --

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl NotificationQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastRequest {
    pub title: String,
    pub message: String,
    /// Restrict delivery to one role; all active users otherwise.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub delivered: usize,
}

// -- Analytics --

pub type CountsByKey = BTreeMap<String, i64>;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub total_users: i64,
    pub active_users: i64,
    pub users_by_role: CountsByKey,
    pub jobs_by_status: CountsByKey,
    pub jobs_by_moderation_status: CountsByKey,
    pub internships_by_status: CountsByKey,
    pub applications_by_status: CountsByKey,
    pub internship_requests_by_status: CountsByKey,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HrAnalytics {
    pub jobs_total: i64,
    pub jobs_by_status: CountsByKey,
    pub internships_total: i64,
    pub applications_total: i64,
    pub applications_by_status: CountsByKey,
    pub total_job_views: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let p = Pagination::new(None, None);
        assert_eq!((p.page, p.limit, p.offset()), (1, DEFAULT_PAGE_SIZE, 0));

        let p = Pagination::new(Some(0), Some(10_000));
        assert_eq!((p.page, p.limit), (1, MAX_PAGE_SIZE));

        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn last_page_offset_does_not_overflow() {
        let p = Pagination::new(Some(u32::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(p.offset(), u64::from(u32::MAX - 1) * 100);
    }

    #[test]
    fn job_input_defaults() {
        let input: JobInput = serde_json::from_value(serde_json::json!({
            "title": "Backend Engineer",
            "description": "Build APIs",
            "company_name": "Acme",
            "job_type": "FULL_TIME",
            "experience_level": "MID"
        }))
        .unwrap();
        assert!(!input.remote);
        assert!(input.skills.is_empty());
        assert!(input.status.is_none());
    }

    #[test]
    fn unknown_fields_are_refused() {
        let result: Result<LoginRequest, _> = serde_json::from_value(serde_json::json!({
            "email": "a@b.c",
            "password": "password1",
            "role": "ADMIN"
        }));
        assert!(result.is_err());
    }
}
