use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use jobhub_types::api::{CompanyResponseInput, InternshipRequestInput, Pagination};
use jobhub_types::models::{
    CompanyResponse, CompanyResponseStatus, InternshipRequest, InternshipRequestStatus,
};

use crate::Database;
use crate::models::{date_col, enum_col, now, timestamp_col, u32_col, uuid_col};
use crate::queries::{Filter, fetch_page};

const REQUEST_COLUMNS: &str = "r.id, r.university_id, p.university_name, r.title, r.description, \
     r.field_of_study, r.student_count, r.start_date, r.end_date, r.requirements, r.status, \
     r.created_at, r.updated_at";

const REQUEST_FROM: &str = "internship_requests r
     LEFT JOIN university_profiles p ON p.user_id = r.university_id";

const RESPONSE_COLUMNS: &str = "c.id, c.request_id, c.hr_id, p.company_name, c.message, \
     c.offered_positions, c.status, c.created_at, c.updated_at";

const RESPONSE_FROM: &str = "company_responses c
     LEFT JOIN hr_profiles p ON p.user_id = c.hr_id";

impl Database {
    // -- Internship requests --

    pub fn create_internship_request(
        &self,
        university_id: Uuid,
        input: &InternshipRequestInput,
    ) -> Result<InternshipRequest> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO internship_requests (id, university_id, title, description, field_of_study,
                                                  student_count, start_date, end_date, requirements, status,
                                                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                rusqlite::params![
                    id.to_string(),
                    university_id.to_string(),
                    input.title.trim(),
                    input.description,
                    input.field_of_study.trim(),
                    input.student_count,
                    input.start_date.to_string(),
                    input.end_date.to_string(),
                    input.requirements,
                    InternshipRequestStatus::Pending.as_str(),
                    now(),
                ],
            )?;
            query_request(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Internship request vanished after insert: {}", id))
        })
    }

    pub fn get_internship_request(&self, id: Uuid) -> Result<Option<InternshipRequest>> {
        self.with_conn(|conn| query_request(conn, id))
    }

    /// `university_id = None` lists every university's requests.
    pub fn list_internship_requests(
        &self,
        university_id: Option<Uuid>,
        status: Option<InternshipRequestStatus>,
        page: Pagination,
    ) -> Result<(Vec<InternshipRequest>, i64)> {
        let mut filter = Filter::default();
        filter
            .eq_opt("r.university_id", university_id.map(|id| id.to_string()))
            .eq_opt("r.status", status.map(|s| s.as_str()));
        self.with_conn(|conn| {
            fetch_page(
                conn,
                REQUEST_COLUMNS,
                REQUEST_FROM,
                &filter,
                "r.created_at DESC, r.rowid DESC",
                page,
                map_request,
            )
        })
    }

    pub fn update_internship_request(
        &self,
        id: Uuid,
        input: &InternshipRequestInput,
    ) -> Result<Option<InternshipRequest>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE internship_requests
                 SET title = ?1, description = ?2, field_of_study = ?3, student_count = ?4,
                     start_date = ?5, end_date = ?6, requirements = ?7, updated_at = ?8
                 WHERE id = ?9",
                rusqlite::params![
                    input.title.trim(),
                    input.description,
                    input.field_of_study.trim(),
                    input.student_count,
                    input.start_date.to_string(),
                    input.end_date.to_string(),
                    input.requirements,
                    now(),
                    id.to_string(),
                ],
            )?;
            query_request(conn, id)
        })
    }

    pub fn set_internship_request_status(
        &self,
        id: Uuid,
        status: InternshipRequestStatus,
    ) -> Result<Option<InternshipRequest>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE internship_requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![status.as_str(), now(), id.to_string()],
            )?;
            query_request(conn, id)
        })
    }

    pub fn delete_internship_request(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted =
                conn.execute("DELETE FROM internship_requests WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }

    // -- Company responses --

    pub fn create_company_response(
        &self,
        request_id: Uuid,
        hr_id: Uuid,
        input: &CompanyResponseInput,
    ) -> Result<CompanyResponse> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO company_responses (id, request_id, hr_id, message, offered_positions, status,
                                                created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                rusqlite::params![
                    id.to_string(),
                    request_id.to_string(),
                    hr_id.to_string(),
                    input.message.trim(),
                    input.offered_positions,
                    CompanyResponseStatus::Pending.as_str(),
                    now(),
                ],
            )?;
            query_response(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Company response vanished after insert: {}", id))
        })
    }

    pub fn get_company_response(&self, id: Uuid) -> Result<Option<CompanyResponse>> {
        self.with_conn(|conn| query_response(conn, id))
    }

    /// Responses to one request; `hr_id` restricts to a single company.
    pub fn list_company_responses(
        &self,
        request_id: Uuid,
        hr_id: Option<Uuid>,
    ) -> Result<Vec<CompanyResponse>> {
        let mut filter = Filter::default();
        filter
            .eq("c.request_id", request_id.to_string())
            .eq_opt("c.hr_id", hr_id.map(|id| id.to_string()));
        self.with_conn(|conn| {
            let (rows, _) = fetch_page(
                conn,
                RESPONSE_COLUMNS,
                RESPONSE_FROM,
                &filter,
                "c.created_at ASC, c.rowid ASC",
                Pagination::new(Some(1), Some(jobhub_types::api::MAX_PAGE_SIZE)),
                map_response,
            )?;
            Ok(rows)
        })
    }

    pub fn set_company_response_status(
        &self,
        id: Uuid,
        status: CompanyResponseStatus,
    ) -> Result<Option<CompanyResponse>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE company_responses SET status = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![status.as_str(), now(), id.to_string()],
            )?;
            query_response(conn, id)
        })
    }
}

fn query_request(conn: &Connection, id: Uuid) -> Result<Option<InternshipRequest>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM {} WHERE r.id = ?1", REQUEST_COLUMNS, REQUEST_FROM),
            [id.to_string()],
            map_request,
        )
        .optional()?;
    Ok(row)
}

fn query_response(conn: &Connection, id: Uuid) -> Result<Option<CompanyResponse>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM {} WHERE c.id = ?1", RESPONSE_COLUMNS, RESPONSE_FROM),
            [id.to_string()],
            map_response,
        )
        .optional()?;
    Ok(row)
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<InternshipRequest> {
    Ok(InternshipRequest {
        id: uuid_col(row, 0)?,
        university_id: uuid_col(row, 1)?,
        university_name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        field_of_study: row.get(5)?,
        student_count: u32_col(row, 6)?,
        start_date: date_col(row, 7)?,
        end_date: date_col(row, 8)?,
        requirements: row.get(9)?,
        status: enum_col(row, 10)?,
        created_at: timestamp_col(row, 11)?,
        updated_at: timestamp_col(row, 12)?,
    })
}

fn map_response(row: &Row<'_>) -> rusqlite::Result<CompanyResponse> {
    Ok(CompanyResponse {
        id: uuid_col(row, 0)?,
        request_id: uuid_col(row, 1)?,
        hr_id: uuid_col(row, 2)?,
        company_name: row.get(3)?,
        message: row.get(4)?,
        offered_positions: u32_col(row, 5)?,
        status: enum_col(row, 6)?,
        created_at: timestamp_col(row, 7)?,
        updated_at: timestamp_col(row, 8)?,
    })
}
