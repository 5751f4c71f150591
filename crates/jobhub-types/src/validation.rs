use thiserror::Error;

use crate::api::{
    ApplyRequest, BroadcastRequest, CompanyResponseInput, CreateSkillRequest, InternshipInput,
    InternshipRequestInput, JobInput, LoginRequest, RegisterRequest,
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_TEXT_LEN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Form-level checks run before a request touches the database.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if value.len() > MAX_TEXT_LEN {
        return Err(ValidationError::new(field, "is too long"));
    }
    Ok(())
}

fn email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    required(field, value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid || value.contains(char::is_whitespace) {
        return Err(ValidationError::new(field, "is not a valid email address"));
    }
    Ok(())
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        email("email", &self.email)?;
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(ValidationError::new(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email)?;
        required("password", &self.password)
    }
}

impl Validate for JobInput {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        required("company_name", &self.company_name)?;
        if self.salary_min.is_some_and(|v| v < 0) {
            return Err(ValidationError::new("salary_min", "must not be negative"));
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(ValidationError::new("salary_max", "must be at least salary_min"));
            }
        }
        if self.skills.iter().any(|s| s.trim().is_empty()) {
            return Err(ValidationError::new("skills", "must not contain blank names"));
        }
        Ok(())
    }
}

impl Validate for InternshipInput {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        required("company_name", &self.company_name)?;
        if self.positions == 0 {
            return Err(ValidationError::new("positions", "must be at least 1"));
        }
        if self.stipend.is_some_and(|v| v < 0) {
            return Err(ValidationError::new("stipend", "must not be negative"));
        }
        Ok(())
    }
}

impl Validate for ApplyRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(letter) = &self.cover_letter {
            if letter.len() > MAX_TEXT_LEN {
                return Err(ValidationError::new("cover_letter", "is too long"));
            }
        }
        Ok(())
    }
}

impl Validate for InternshipRequestInput {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        required("field_of_study", &self.field_of_study)?;
        if self.student_count == 0 {
            return Err(ValidationError::new("student_count", "must be at least 1"));
        }
        if self.start_date > self.end_date {
            return Err(ValidationError::new("end_date", "must not be before start_date"));
        }
        Ok(())
    }
}

impl Validate for CompanyResponseInput {
    fn validate(&self) -> Result<(), ValidationError> {
        required("message", &self.message)?;
        if self.offered_positions == 0 {
            return Err(ValidationError::new("offered_positions", "must be at least 1"));
        }
        Ok(())
    }
}

impl Validate for CreateSkillRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }
}

impl Validate for BroadcastRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("message", &self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExperienceLevel, JobType, Role};
    use chrono::NaiveDate;

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: Role::Candidate,
        }
    }

    fn job() -> JobInput {
        JobInput {
            title: "Engineer".into(),
            description: "Ship things".into(),
            requirements: None,
            company_name: "Acme".into(),
            location: None,
            job_type: JobType::FullTime,
            experience_level: ExperienceLevel::Junior,
            salary_min: Some(1000),
            salary_max: Some(2000),
            remote: false,
            application_deadline: None,
            skills: vec!["rust".into()],
            status: None,
        }
    }

    #[test]
    fn register_checks_email_and_password() {
        assert!(register("ada@example.com", "longenough").validate().is_ok());
        assert_eq!(register("not-an-email", "longenough").validate().unwrap_err().field, "email");
        assert_eq!(register("a@b", "longenough").validate().unwrap_err().field, "email");
        assert_eq!(register("ada@example.com", "short").validate().unwrap_err().field, "password");

        let mut req = register("ada@example.com", "longenough");
        req.last_name = "   ".into();
        assert_eq!(req.validate().unwrap_err().field, "last_name");
    }

    #[test]
    fn job_salary_range_must_be_ordered() {
        assert!(job().validate().is_ok());

        let mut inverted = job();
        inverted.salary_min = Some(5000);
        assert_eq!(inverted.validate().unwrap_err().field, "salary_max");

        let mut blank_title = job();
        blank_title.title = String::new();
        assert_eq!(blank_title.validate().unwrap_err().field, "title");
    }

    #[test]
    fn internship_request_dates_must_be_ordered() {
        let req = InternshipRequestInput {
            title: "Summer placements".into(),
            description: "Ten CS students".into(),
            field_of_study: "Computer Science".into(),
            student_count: 10,
            start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            requirements: None,
        };
        assert_eq!(req.validate().unwrap_err().field, "end_date");
    }
}
