use anyhow::{bail, Context};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::users::repo_types::UniqueField;

pub fn connect_options(cfg: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .database(&cfg.database)
        .username(&cfg.user)
        .password(&cfg.password)
        .ssl_mode(cfg.ssl_mode)
}

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_with(connect_options(cfg))
        .await
        .context("connect to database")?;
    info!(
        host = %cfg.host,
        database = %cfg.database,
        max_connections = cfg.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Columns the handlers read and write, with the type each must have.
const EXPECTED_COLUMNS: &[(&str, &str)] = &[
    ("id", "uuid"),
    ("tipousuario", "text"),
    ("nome", "text"),
    ("cpf", "text"),
    ("telefone", "text"),
    ("email", "text"),
    ("senha", "text"),
    ("datanascimento", "text"),
    ("endereco", "text"),
    ("cep", "text"),
    ("certificadoregistro", "text"),
    ("nomeinstituicao", "text"),
    ("horariosatendimento", "text"),
    ("nomefantasia", "text"),
    ("horariosfuncionamento", "text"),
    ("numeroemergencia", "text"),
    ("created_at", "timestamp with time zone"),
];

/// Creates the `amparousers` table (and its unique constraints) when missing,
/// then refuses to start if an existing table has a different shape.
pub async fn bootstrap_schema(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("apply amparousers schema")?;
    verify_schema(db).await
}

async fn verify_schema(db: &PgPool) -> anyhow::Result<()> {
    let columns = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT column_name::text, data_type::text
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = 'amparousers'
        "#,
    )
    .fetch_all(db)
    .await
    .context("read amparousers columns")?;

    let unique_constraints = sqlx::query_scalar::<_, String>(
        r#"
        SELECT c.conname::text
        FROM pg_constraint c
        JOIN pg_class t ON t.oid = c.conrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        WHERE t.relname = 'amparousers'
          AND n.nspname = current_schema()
          AND c.contype = 'u'
        "#,
    )
    .fetch_all(db)
    .await
    .context("read amparousers constraints")?;

    let problems = schema_problems(&columns, &unique_constraints);
    if !problems.is_empty() {
        for problem in &problems {
            error!(%problem, "amparousers does not match migrations/0001_create_amparousers.sql");
        }
        bail!(
            "table amparousers has an incompatible shape ({}); migrate it to migrations/0001_create_amparousers.sql",
            problems.join("; ")
        );
    }
    Ok(())
}

pub(crate) fn schema_problems(columns: &[(String, String)], unique_constraints: &[String]) -> Vec<String> {
    let mut problems = Vec::new();
    for &(name, expected) in EXPECTED_COLUMNS {
        match columns.iter().find(|(column, _)| column == name) {
            None => problems.push(format!("missing column {name}")),
            Some((_, actual)) if actual != expected => {
                problems.push(format!("column {name} is {actual}, expected {expected}"))
            }
            Some(_) => {}
        }
    }
    for field in UniqueField::REGISTRATION_ORDER {
        let constraint = format!("amparousers_{}_key", field.column());
        if !unique_constraints.iter().any(|name| *name == constraint) {
            problems.push(format!("missing unique constraint {constraint}"));
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_columns() -> Vec<(String, String)> {
        EXPECTED_COLUMNS
            .iter()
            .map(|(name, ty)| (name.to_string(), ty.to_string()))
            .collect()
    }

    fn canonical_constraints() -> Vec<String> {
        ["amparousers_email_key", "amparousers_telefone_key", "amparousers_cpf_key"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn canonical_table_has_no_problems() {
        assert!(schema_problems(&canonical_columns(), &canonical_constraints()).is_empty());
    }

    #[test]
    fn legacy_table_is_reported() {
        let mut columns: Vec<(String, String)> = canonical_columns()
            .into_iter()
            .filter(|(name, _)| name != "numeroemergencia" && name != "created_at")
            .collect();
        columns[0].1 = "integer".into();

        let problems = schema_problems(&columns, &[]);
        assert!(problems.contains(&"column id is integer, expected uuid".to_string()));
        assert!(problems.contains(&"missing column numeroemergencia".to_string()));
        assert!(problems.contains(&"missing column created_at".to_string()));
        assert!(problems.contains(&"missing unique constraint amparousers_cpf_key".to_string()));
        assert_eq!(problems.len(), 6);
    }

    #[test]
    fn empty_table_listing_reports_every_column() {
        let problems = schema_problems(&[], &canonical_constraints());
        assert_eq!(problems.len(), EXPECTED_COLUMNS.len());
    }
}
