use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::{EmergencyContact, NewUserAccount, UniqueField, UserAccount};

const USER_COLUMNS: &str = r#"
    id, tipousuario, nome, cpf, telefone, email, senha, datanascimento,
    endereco, cep, certificadoregistro, nomeinstituicao, horariosatendimento,
    nomefantasia, horariosfuncionamento, numeroemergencia, created_at
"#;

#[derive(Debug, Error)]
pub enum InsertError {
    /// The store rejected the row because another account holds this value.
    #[error("duplicate {}", .0.column())]
    Duplicate(UniqueField),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Access to the `amparousers` table. Handlers only see this trait, so the
/// pool-backed implementation can be swapped for an in-memory one.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_by(&self, field: UniqueField, value: &str) -> anyhow::Result<bool>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserAccount>>;
    async fn insert(&self, account: &NewUserAccount) -> Result<UserAccount, InsertError>;
    async fn find_emergency_contact(&self, id: Uuid) -> anyhow::Result<Option<EmergencyContact>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists_by(&self, field: UniqueField, value: &str) -> anyhow::Result<bool> {
        // `column()` only yields fixed identifiers, never caller input.
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM amparousers WHERE {} = $1)",
            field.column()
        );
        let found = sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .fetch_one(&self.db)
            .await
            .with_context(|| format!("look up account by {}", field.column()))?;
        Ok(found)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM amparousers WHERE email = $1");
        let user = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("find account by email")?;
        Ok(user)
    }

    async fn insert(&self, account: &NewUserAccount) -> Result<UserAccount, InsertError> {
        let sql = format!(
            r#"
            INSERT INTO amparousers (
                tipousuario, nome, cpf, telefone, email, senha, datanascimento,
                endereco, cep, certificadoregistro, nomeinstituicao,
                horariosatendimento, nomefantasia, horariosfuncionamento, numeroemergencia
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {USER_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(&account.tipo_usuario)
            .bind(&account.nome)
            .bind(&account.cpf)
            .bind(&account.telefone)
            .bind(&account.email)
            .bind(&account.senha_hash)
            .bind(&account.data_nascimento)
            .bind(&account.endereco)
            .bind(&account.cep)
            .bind(&account.certificado_registro)
            .bind(&account.nome_instituicao)
            .bind(&account.horarios_atendimento)
            .bind(&account.nome_fantasia)
            .bind(&account.horarios_funcionamento)
            .bind(&account.numero_emergencia)
            .fetch_one(&self.db)
            .await;

        match result {
            Ok(user) => Ok(user),
            Err(err) => match duplicate_field(&err) {
                Some(field) => Err(InsertError::Duplicate(field)),
                None => Err(InsertError::Other(
                    anyhow::Error::new(err).context("insert account"),
                )),
            },
        }
    }

    async fn find_emergency_contact(&self, id: Uuid) -> anyhow::Result<Option<EmergencyContact>> {
        let row = sqlx::query_as::<_, EmergencyContact>(
            r#"
            SELECT numeroemergencia
            FROM amparousers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find emergency number")?;
        Ok(row)
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Which unique column an insert collided on, if the error is such a collision.
pub(crate) fn duplicate_field(err: &sqlx::Error) -> Option<UniqueField> {
    if !is_unique_violation(err) {
        return None;
    }
    err.as_database_error()
        .and_then(|db_err| db_err.constraint())
        .and_then(UniqueField::from_constraint)
}
