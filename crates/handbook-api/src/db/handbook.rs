//! Handbook persistence: sections, policies and their parts.
//!
//! The in-memory [`Handbook`] is rebuilt from these tables at startup.
//! Stored policy numbers are kept as-is; [`Handbook::restore_policy`]
//! rejects rows whose number does not match their section.

use std::collections::HashMap;

use handbook_core::{
    Definition, Handbook, HandbookError, Policy, PolicyId, ProcedureStep, Section,
    ValidationError,
};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("stored handbook is inconsistent: {0}")]
    Handbook(#[from] HandbookError),

    #[error("stored value is invalid: {0}")]
    Invalid(#[from] ValidationError),
}

/// Whether any section has been stored yet.
pub async fn is_empty(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM policy_sections")
        .fetch_one(pool)
        .await?;
    Ok(count == 0)
}

/// Write a whole handbook in one transaction. Used to import a seed file
/// into an empty database.
pub async fn import(pool: &PgPool, handbook: &Handbook) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for section in handbook.sections() {
        sqlx::query("INSERT INTO policy_sections (number, title) VALUES ($1, $2)")
            .bind(section.number.to_string())
            .bind(&section.title)
            .execute(&mut *tx)
            .await?;
    }

    let policies: Vec<&Policy> = handbook
        .sections()
        .flat_map(|s| handbook.policies_in(s.number))
        .collect();

    for policy in &policies {
        sqlx::query(
            "INSERT INTO policies (id, section_number, number, title, purpose, scope,
                 policy_statements, responsibilities, owner, version, review_period, published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(db_id(policy.id)?)
        .bind(policy.section.to_string())
        .bind(policy.number.to_string())
        .bind(&policy.title)
        .bind(&policy.purpose)
        .bind(&policy.scope)
        .bind(&policy.policy_statements)
        .bind(&policy.responsibilities)
        .bind(&policy.owner)
        .bind(&policy.version)
        .bind(policy.review_period.map(|r| r.as_str()))
        .bind(policy.published)
        .execute(&mut *tx)
        .await?;

        for step in &policy.procedure_steps {
            sqlx::query(
                "INSERT INTO procedure_steps (policy_id, step_number, description) VALUES ($1, $2, $3)",
            )
            .bind(db_id(policy.id)?)
            .bind(i32::try_from(step.step_number).map_err(|e| {
                sqlx::Error::Protocol(format!("step number out of range: {e}"))
            })?)
            .bind(&step.description)
            .execute(&mut *tx)
            .await?;
        }

        for (position, definition) in policy.definitions.iter().enumerate() {
            sqlx::query(
                "INSERT INTO policy_definitions (policy_id, position, term, definition)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(db_id(policy.id)?)
            .bind(db_position(position)?)
            .bind(&definition.term)
            .bind(&definition.definition)
            .execute(&mut *tx)
            .await?;
        }
    }

    // Related links last so every target row exists.
    for policy in &policies {
        for (position, related) in policy.related.iter().enumerate() {
            sqlx::query(
                "INSERT INTO policy_related (policy_id, related_id, position) VALUES ($1, $2, $3)",
            )
            .bind(db_id(policy.id)?)
            .bind(db_id(*related)?)
            .bind(db_position(position)?)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Rebuild the handbook from the database.
pub async fn load(pool: &PgPool) -> Result<Handbook, StoreError> {
    let sections = sqlx::query_as::<_, SectionRow>(
        "SELECT number, title FROM policy_sections ORDER BY number",
    )
    .fetch_all(pool)
    .await?;

    let policies = sqlx::query_as::<_, PolicyRow>(
        "SELECT id, section_number, number, title, purpose, scope, policy_statements,
                responsibilities, owner, version, review_period, published
         FROM policies ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut steps: HashMap<i64, Vec<ProcedureStep>> = HashMap::new();
    for row in sqlx::query_as::<_, StepRow>(
        "SELECT policy_id, step_number, description FROM procedure_steps
         ORDER BY policy_id, step_number",
    )
    .fetch_all(pool)
    .await?
    {
        let step_number = u32::try_from(row.step_number)
            .map_err(|_| sqlx::Error::Protocol(format!("negative step number {}", row.step_number)))?;
        steps.entry(row.policy_id).or_default().push(ProcedureStep {
            step_number,
            description: row.description,
        });
    }

    let mut definitions = group_definitions(
        sqlx::query_as::<_, DefinitionRow>(
            "SELECT policy_id, position, term, definition FROM policy_definitions
             ORDER BY policy_id, position",
        )
        .fetch_all(pool)
        .await?,
    )?;

    let mut related: HashMap<i64, Vec<PolicyId>> = HashMap::new();
    for row in sqlx::query_as::<_, RelatedRow>(
        "SELECT policy_id, related_id FROM policy_related ORDER BY policy_id, position",
    )
    .fetch_all(pool)
    .await?
    {
        related
            .entry(row.policy_id)
            .or_default()
            .push(core_id(row.related_id)?);
    }

    let mut handbook = Handbook::new();
    for row in sections {
        handbook.add_section(Section::new(row.number.parse()?, row.title)?)?;
    }
    for row in policies {
        let key = row.id;
        let policy = row.into_policy(
            steps.remove(&key).unwrap_or_default(),
            definitions.remove(&key).unwrap_or_default(),
            related.remove(&key).unwrap_or_default(),
        )?;
        handbook.restore_policy(policy)?;
    }
    handbook.check_references()?;

    tracing::info!(
        sections = handbook.section_count(),
        policies = handbook.policy_count(),
        "loaded handbook from database"
    );
    Ok(handbook)
}

fn db_id(id: PolicyId) -> Result<i64, sqlx::Error> {
    i64::try_from(id.get())
        .map_err(|_| sqlx::Error::Protocol(format!("policy id {id} exceeds BIGINT range")))
}

fn db_position(position: usize) -> Result<i32, sqlx::Error> {
    i32::try_from(position)
        .map_err(|_| sqlx::Error::Protocol(format!("position {position} exceeds INTEGER range")))
}

/// Definitions per policy, each list in authored order.
fn group_definitions(
    mut rows: Vec<DefinitionRow>,
) -> Result<HashMap<i64, Vec<Definition>>, ValidationError> {
    rows.sort_by_key(|row| (row.policy_id, row.position));
    let mut grouped: HashMap<i64, Vec<Definition>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.policy_id)
            .or_default()
            .push(Definition::new(row.term, row.definition)?);
    }
    Ok(grouped)
}

fn core_id(raw: i64) -> Result<PolicyId, ValidationError> {
    u64::try_from(raw)
        .map_err(|_| ValidationError::InvalidPolicyId(raw.to_string()))
        .and_then(PolicyId::new)
}

#[derive(sqlx::FromRow)]
struct SectionRow {
    number: String,
    title: String,
}

#[derive(sqlx::FromRow)]
struct PolicyRow {
    id: i64,
    section_number: String,
    number: String,
    title: String,
    purpose: Option<String>,
    scope: Option<String>,
    policy_statements: Option<String>,
    responsibilities: Option<String>,
    owner: Option<String>,
    version: String,
    review_period: Option<String>,
    published: bool,
}

impl PolicyRow {
    fn into_policy(
        self,
        procedure_steps: Vec<ProcedureStep>,
        definitions: Vec<Definition>,
        related: Vec<PolicyId>,
    ) -> Result<Policy, ValidationError> {
        Ok(Policy {
            id: core_id(self.id)?,
            section: self.section_number.parse()?,
            number: self.number.parse()?,
            title: self.title,
            purpose: self.purpose,
            scope: self.scope,
            policy_statements: self.policy_statements,
            responsibilities: self.responsibilities,
            related,
            definitions,
            procedure_steps,
            owner: self.owner,
            version: self.version,
            review_period: self.review_period.as_deref().map(str::parse).transpose()?,
            published: self.published,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StepRow {
    policy_id: i64,
    step_number: i32,
    description: String,
}

#[derive(sqlx::FromRow)]
struct DefinitionRow {
    policy_id: i64,
    position: i32,
    term: String,
    definition: String,
}

#[derive(sqlx::FromRow)]
struct RelatedRow {
    policy_id: i64,
    related_id: i64,
}
