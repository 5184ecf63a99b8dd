//! Dump sections
//!
//! Each section checks the tables it needs were detected and renders to a
//! string; nothing here writes to the database.

use std::collections::{BTreeSet, HashMap};

use phdtrack_common::db::models::*;
use phdtrack_common::db::KNOWN_TABLES;
use phdtrack_common::report;
use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, EntityTrait, QueryOrder, QuerySelect, Statement,
};

use crate::render::{heading, name_list, opt, Layout, TextTable};

/// Known tracker tables present in the connected database
pub async fn detect_tables<C: ConnectionTrait>(db: &C) -> Result<BTreeSet<&'static str>, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DbBackend::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'table'",
        DbBackend::Postgres => {
            "SELECT table_name::text AS name FROM information_schema.tables \
             WHERE table_schema = current_schema()"
        }
        _ => "SELECT table_name AS name FROM information_schema.tables WHERE table_schema = DATABASE()",
    };

    let present: BTreeSet<String> = db
        .query_all(Statement::from_string(backend, sql))
        .await?
        .iter()
        .filter_map(|row| row.try_get::<String>("", "name").ok())
        .collect();

    Ok(KNOWN_TABLES
        .iter()
        .copied()
        .filter(|table| present.contains(*table))
        .collect())
}

fn has_all(tables: &BTreeSet<&'static str>, needed: &[&str]) -> bool {
    needed.iter().all(|t| tables.contains(t))
}

fn query_limit(limit: usize) -> Option<u64> {
    (limit > 0).then_some(limit as u64)
}

/// Row count per detected table, in schema order
pub async fn counts<C: ConnectionTrait>(db: &C, tables: &BTreeSet<&'static str>) -> Result<String, DbErr> {
    let backend = db.get_database_backend();
    let mut out = heading("Table counts");

    for table in KNOWN_TABLES.iter().filter(|t| tables.contains(*t)) {
        // Table names come from the fixed list above
        let row = db
            .query_one(Statement::from_string(
                backend,
                format!("SELECT COUNT(*) AS n FROM {table}"),
            ))
            .await?;
        let count = match row {
            Some(row) => row.try_get::<i64>("", "n")?,
            None => 0,
        };
        out.push_str(&format!("{:<26} {}\n", table, count));
    }

    Ok(out)
}

pub async fn universities<C: ConnectionTrait>(
    db: &C,
    tables: &BTreeSet<&'static str>,
    limit: usize,
) -> Result<Option<String>, DbErr> {
    if !tables.contains("university") {
        return Ok(None);
    }

    let rows = UniversityEntity::find()
        .order_by_asc(UniversityColumn::Id)
        .limit(query_limit(limit))
        .all(db)
        .await?;

    let mut table = TextTable::new(
        &["id", "name", "city", "state", "country", "ranking_usnews"],
        Layout::Auto,
    );
    for u in rows {
        table.push(vec![
            u.id.to_string(),
            u.name,
            u.city,
            opt(&u.state),
            u.country,
            opt(&u.ranking_usnews),
        ]);
    }

    Ok(Some(heading("Universities (sample)") + &table.render(limit)))
}

pub async fn departments<C: ConnectionTrait>(
    db: &C,
    tables: &BTreeSet<&'static str>,
    limit: usize,
) -> Result<Option<String>, DbErr> {
    if !tables.contains("department") {
        return Ok(None);
    }

    let rows = DepartmentEntity::find()
        .order_by_asc(DepartmentColumn::Id)
        .limit(query_limit(limit))
        .all(db)
        .await?;

    let mut table = TextTable::new(&["id", "name", "university_id"], Layout::Auto);
    for d in rows {
        table.push(vec![d.id.to_string(), d.name, d.university_id.to_string()]);
    }

    Ok(Some(heading("Departments (sample)") + &table.render(limit)))
}

/// Programs with parents and distinct professor counts, via the reporter.
/// Counts are zero when the link table is absent.
pub async fn programs<C: ConnectionTrait>(
    db: &C,
    tables: &BTreeSet<&'static str>,
    limit: usize,
) -> Result<Option<String>, phdtrack_common::AppError> {
    if !has_all(tables, &["program", "department", "university"]) {
        return Ok(None);
    }

    let rows = if tables.contains("professor_programs") {
        report::programs_with_counts(db).await?
    } else {
        report::programs_without_links(db).await?
    };

    let mut table = TextTable::new(
        &[
            "program",
            "department",
            "university",
            "city",
            "state",
            "country",
            "ranking_usnews",
            "prof_count",
        ],
        Layout::Auto,
    );
    for row in rows {
        table.push(vec![
            row.program.name,
            row.department.name,
            row.university.name,
            row.university.city,
            opt(&row.university.state),
            row.university.country,
            opt(&row.university.ranking_usnews),
            row.professor_count.to_string(),
        ]);
    }

    Ok(Some(
        heading("Programs → Department → University (+ distinct professor count)")
            + &table.render(limit),
    ))
}

pub async fn professors<C: ConnectionTrait>(
    db: &C,
    tables: &BTreeSet<&'static str>,
    limit: usize,
) -> Result<Option<String>, DbErr> {
    if !has_all(tables, &["professor", "department", "university"]) {
        return Ok(None);
    }

    let departments: HashMap<i32, Department> = DepartmentEntity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    let universities: HashMap<i32, University> = UniversityEntity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let rows = ProfessorEntity::find()
        .order_by_asc(ProfessorColumn::Name)
        .limit(query_limit(limit))
        .all(db)
        .await?;

    let mut table = TextTable::new(
        &[
            "id",
            "name",
            "title",
            "email",
            "hiring_status",
            "contact_through",
            "department",
            "university",
            "city",
            "country",
        ],
        Layout::Auto,
    );
    for p in rows {
        let department = departments.get(&p.department_id);
        let university = universities.get(&p.university_id);
        table.push(vec![
            p.id.to_string(),
            p.name,
            p.title,
            p.email,
            p.hiring_status.code().to_string(),
            p.contact_through.code().to_string(),
            department.map(|d| d.name.clone()).unwrap_or_default(),
            university.map(|u| u.name.clone()).unwrap_or_default(),
            university.map(|u| u.city.clone()).unwrap_or_default(),
            university.map(|u| u.country.clone()).unwrap_or_default(),
        ]);
    }

    Ok(Some(heading("Professors (basic info)") + &table.render(limit)))
}

/// Professors with their aggregated program and research area names
pub async fn professor_associations<C: ConnectionTrait>(
    db: &C,
    tables: &BTreeSet<&'static str>,
    limit: usize,
) -> Result<Option<String>, phdtrack_common::AppError> {
    if !has_all(tables, &KNOWN_TABLES[..7]) {
        return Ok(None);
    }

    let overviews = report::professor_overviews(db).await?;

    let mut table = TextTable::new(
        &["id", "name", "title", "department", "university", "programs", "research_areas"],
        Layout::Fixed(16),
    );
    for overview in overviews {
        table.push(vec![
            overview.professor.id.to_string(),
            overview.professor.name,
            overview.professor.title,
            overview.department.map(|d| d.name).unwrap_or_default(),
            overview.university.map(|u| u.name).unwrap_or_default(),
            name_list(&overview.summary.programs),
            name_list(&overview.summary.research_areas),
        ]);
    }

    Ok(Some(
        heading("Professors → Programs / Research Areas (aggregated)") + &table.render(limit),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use phdtrack_common::db::DbPool;
    use phdtrack_common::reconcile::{
        upsert_professor, DepartmentRef, DesiredAssociations, ProfessorInput, UniversityDetails,
        UniversityInput, UniversityRef,
    };

    async fn seeded() -> DbPool {
        let pool = DbPool::in_memory().await.unwrap();
        let input = ProfessorInput {
            professor_id: None,
            name: "Ada".into(),
            title: "Professor".into(),
            email: "ada@mit.edu".into(),
            university: UniversityRef::Named(UniversityInput {
                name: "MIT".into(),
                details: UniversityDetails {
                    country: "USA".into(),
                    state: None,
                    city: "Cambridge".into(),
                    ranking_usnews: Some(2),
                },
            }),
            department: DepartmentRef::Named("EECS".into()),
            personal_website: None,
            lab_group_name: None,
            lab_website: None,
            hiring_status: HiringStatus::Hiring,
            contact_through: ContactMethod::Email,
            form_link: None,
            notes: None,
            associations: DesiredAssociations::from_lists("PhD", ""),
        };
        upsert_professor(pool.conn(), input).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_detects_all_known_tables() {
        let pool = DbPool::in_memory().await.unwrap();
        let tables = tokio_test::assert_ok!(detect_tables(pool.conn()).await);
        assert_eq!(tables.len(), KNOWN_TABLES.len());
    }

    #[tokio::test]
    async fn test_counts_section() {
        let pool = seeded().await;
        let tables = detect_tables(pool.conn()).await.unwrap();

        let out = counts(pool.conn(), &tables).await.unwrap();
        assert!(out.contains("Table counts"));
        assert!(out.contains(&format!("{:<26} 1", "professor")));
        assert!(out.contains(&format!("{:<26} 0", "applicant")));
    }

    #[tokio::test]
    async fn test_program_section_uses_reporter() {
        let pool = seeded().await;
        let tables = detect_tables(pool.conn()).await.unwrap();

        let out = programs(pool.conn(), &tables, 20).await.unwrap().unwrap();
        let row = out.lines().find(|l| l.starts_with("PhD")).unwrap();
        assert!(row.contains("EECS"));
        assert!(row.trim_end().ends_with('1'));
    }

    #[tokio::test]
    async fn test_association_section_marks_empty_lists() {
        let pool = seeded().await;
        let tables = detect_tables(pool.conn()).await.unwrap();

        let out = professor_associations(pool.conn(), &tables, 20)
            .await
            .unwrap()
            .unwrap();
        let row = out.lines().find(|l| l.starts_with('1')).unwrap();
        assert!(row.contains("PhD"));
        assert!(row.trim_end().ends_with('-'));
        assert!(out.ends_with("... (1 shown)\n"));
    }

    #[tokio::test]
    async fn test_program_section_without_link_table() {
        let pool = seeded().await;
        pool.conn()
            .execute_unprepared("DROP TABLE professor_programs")
            .await
            .unwrap();
        let tables = detect_tables(pool.conn()).await.unwrap();
        assert!(!tables.contains("professor_programs"));

        let out = programs(pool.conn(), &tables, 20).await.unwrap().unwrap();
        let row = out.lines().find(|l| l.starts_with("PhD")).unwrap();
        assert!(row.contains("EECS"));
        assert!(row.trim_end().ends_with('0'));
    }

    #[tokio::test]
    async fn test_missing_tables_skip_sections() {
        let pool = seeded().await;
        let tables: BTreeSet<&'static str> = ["university"].into_iter().collect();

        assert!(departments(pool.conn(), &tables, 20).await.unwrap().is_none());
        assert!(programs(pool.conn(), &tables, 20).await.unwrap().is_none());
        assert!(universities(pool.conn(), &tables, 20).await.unwrap().is_some());
    }
}
