use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of `amparousers`. Column names are the lower-cased historical ones.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: Uuid,
    #[sqlx(rename = "tipousuario")]
    pub tipo_usuario: String,
    pub nome: String,
    pub cpf: String,
    pub telefone: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub senha: String, // Argon2 PHC string, never exposed in JSON
    #[sqlx(rename = "datanascimento")]
    pub data_nascimento: Option<String>,
    pub endereco: Option<String>,
    pub cep: Option<String>,
    #[sqlx(rename = "certificadoregistro")]
    pub certificado_registro: Option<String>,
    #[sqlx(rename = "nomeinstituicao")]
    pub nome_instituicao: Option<String>,
    #[sqlx(rename = "horariosatendimento")]
    pub horarios_atendimento: Option<String>,
    #[sqlx(rename = "nomefantasia")]
    pub nome_fantasia: Option<String>,
    #[sqlx(rename = "horariosfuncionamento")]
    pub horarios_funcionamento: Option<String>,
    #[sqlx(rename = "numeroemergencia")]
    pub numero_emergencia: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Values for a new row; `senha_hash` is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    pub tipo_usuario: String,
    pub nome: String,
    pub cpf: String,
    pub telefone: String,
    pub email: String,
    pub senha_hash: String,
    pub data_nascimento: Option<String>,
    pub endereco: Option<String>,
    pub cep: Option<String>,
    pub certificado_registro: Option<String>,
    pub nome_instituicao: Option<String>,
    pub horarios_atendimento: Option<String>,
    pub nome_fantasia: Option<String>,
    pub horarios_funcionamento: Option<String>,
    pub numero_emergencia: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct EmergencyContact {
    #[sqlx(rename = "numeroemergencia")]
    pub numero_emergencia: Option<String>,
}

/// Columns that must be unique across `amparousers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Telefone,
    Cpf,
}

impl UniqueField {
    /// Order in which registration checks for duplicates.
    pub const REGISTRATION_ORDER: [UniqueField; 3] =
        [UniqueField::Email, UniqueField::Telefone, UniqueField::Cpf];

    pub fn column(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Telefone => "telefone",
            Self::Cpf => "cpf",
        }
    }

    pub fn conflict_message(self) -> &'static str {
        match self {
            Self::Email => "E-mail já cadastrado.",
            Self::Telefone => "Número de telefone já cadastrado.",
            Self::Cpf => "CPF já cadastrado.",
        }
    }

    /// Maps a unique-constraint name from the schema back to its column.
    pub fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "amparousers_email_key" => Some(Self::Email),
            "amparousers_telefone_key" => Some(Self::Telefone),
            "amparousers_cpf_key" => Some(Self::Cpf),
            _ => None,
        }
    }
}
