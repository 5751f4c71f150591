mod analytics;
mod applications;
mod internship_requests;
mod internships;
mod jobs;
mod notifications;
mod profiles;
mod skills;
mod users;

pub use applications::ApplicationFilter;

use anyhow::Result;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};

use jobhub_types::api::Pagination;

/// Accumulates `AND`-joined WHERE clauses with their positional parameters.
#[derive(Default)]
pub(crate) struct Filter {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl Filter {
    pub fn eq<T: ToSql + 'static>(&mut self, column: &str, value: T) -> &mut Self {
        self.clauses.push(format!("{} = ?", column));
        self.params.push(Box::new(value));
        self
    }

    pub fn eq_opt<T: ToSql + 'static>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.eq(column, v);
        }
        self
    }

    /// Raw clause with one `?` per supplied value.
    pub fn clause(&mut self, sql: &str, values: Vec<Box<dyn ToSql>>) -> &mut Self {
        self.clauses.push(sql.to_string());
        self.params.extend(values);
        self
    }

    /// Case-insensitive substring match over any of `columns`.
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };
        let pattern = format!("%{}%", escape_like(term));
        let sql = columns
            .iter()
            .map(|c| format!("{} LIKE ? ESCAPE '\\'", c))
            .collect::<Vec<_>>()
            .join(" OR ");
        let values = columns
            .iter()
            .map(|_| Box::new(pattern.clone()) as Box<dyn ToSql>)
            .collect();
        self.clause(&format!("({})", sql), values)
    }

    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Runs `SELECT COUNT(*) {from}{where}` and the paged `SELECT {columns} {from}{where} ORDER BY ..`.
pub(crate) fn fetch_page<T, F>(
    conn: &Connection,
    columns: &str,
    from: &str,
    filter: &Filter,
    order_by: &str,
    page: Pagination,
    map: F,
) -> Result<(Vec<T>, i64)>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let where_sql = filter.where_sql();
    let params = filter.params();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}{}", from, where_sql),
        params.as_slice(),
        |r| r.get(0),
    )?;

    let limit = i64::from(page.limit);
    let offset = i64::try_from(page.offset())?;
    let mut paged = params;
    paged.push(&limit);
    paged.push(&offset);

    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
        columns, from, where_sql, order_by
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(paged.as_slice(), map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((rows, total))
}

/// `(key, count)` pairs from a `GROUP BY` query.
pub(crate) fn grouped_counts(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
