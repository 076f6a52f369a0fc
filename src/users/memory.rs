use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::{InsertError, UserStore};
use crate::users::repo_types::{EmergencyContact, NewUserAccount, UniqueField, UserAccount};

/// In-process `UserStore` used by the test suites. It enforces the same
/// unique columns as the Postgres schema.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<UserAccount>>,
    unavailable: bool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, standing in for an unreachable database.
    pub fn unavailable() -> Self {
        Self {
            rows: Mutex::default(),
            unavailable: true,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<UserAccount> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn with_rows<T>(&self, f: impl FnOnce(&mut Vec<UserAccount>) -> T) -> anyhow::Result<T> {
        if self.unavailable {
            return Err(anyhow!("connection refused"));
        }
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| anyhow!("user store lock poisoned"))?;
        Ok(f(&mut rows))
    }
}

fn field_value(row: &UserAccount, field: UniqueField) -> &str {
    match field {
        UniqueField::Email => &row.email,
        UniqueField::Telefone => &row.telefone,
        UniqueField::Cpf => &row.cpf,
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists_by(&self, field: UniqueField, value: &str) -> anyhow::Result<bool> {
        self.with_rows(|rows| rows.iter().any(|row| field_value(row, field) == value))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserAccount>> {
        self.with_rows(|rows| rows.iter().find(|row| row.email == email).cloned())
    }

    async fn insert(&self, account: &NewUserAccount) -> Result<UserAccount, InsertError> {
        self.with_rows(|rows| {
            let candidate = UserAccount {
                id: Uuid::new_v4(),
                tipo_usuario: account.tipo_usuario.clone(),
                nome: account.nome.clone(),
                cpf: account.cpf.clone(),
                telefone: account.telefone.clone(),
                email: account.email.clone(),
                senha: account.senha_hash.clone(),
                data_nascimento: account.data_nascimento.clone(),
                endereco: account.endereco.clone(),
                cep: account.cep.clone(),
                certificado_registro: account.certificado_registro.clone(),
                nome_instituicao: account.nome_instituicao.clone(),
                horarios_atendimento: account.horarios_atendimento.clone(),
                nome_fantasia: account.nome_fantasia.clone(),
                horarios_funcionamento: account.horarios_funcionamento.clone(),
                numero_emergencia: account.numero_emergencia.clone(),
                created_at: OffsetDateTime::now_utc(),
            };
            let taken = UniqueField::REGISTRATION_ORDER.into_iter().find(|&field| {
                rows.iter()
                    .any(|row| field_value(row, field) == field_value(&candidate, field))
            });
            match taken {
                Some(field) => Err(InsertError::Duplicate(field)),
                None => {
                    rows.push(candidate.clone());
                    Ok(candidate)
                }
            }
        })?
    }

    async fn find_emergency_contact(&self, id: Uuid) -> anyhow::Result<Option<EmergencyContact>> {
        self.with_rows(|rows| {
            rows.iter().find(|row| row.id == id).map(|row| EmergencyContact {
                numero_emergencia: row.numero_emergencia.clone(),
            })
        })
    }
}
