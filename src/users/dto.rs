use serde::{Deserialize, Serialize};

use crate::users::repo_types::{NewUserAccount, UniqueField, UserAccount};

/// Request body for `POST /cadastro`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub tipo_usuario: String,
    pub nome: String,
    pub cpf: String,
    pub telefone: String,
    pub email: String,
    pub senha: String,
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

impl RegisterRequest {
    pub fn unique_value(&self, field: UniqueField) -> &str {
        match field {
            UniqueField::Email => &self.email,
            UniqueField::Telefone => &self.telefone,
            UniqueField::Cpf => &self.cpf,
        }
    }

    /// Builds the row to insert. The plaintext password is dropped in favour
    /// of `senha_hash`; empty optional attributes become NULL.
    pub fn into_new_account(self, senha_hash: String) -> NewUserAccount {
        NewUserAccount {
            tipo_usuario: self.tipo_usuario,
            nome: self.nome,
            cpf: self.cpf,
            telefone: self.telefone,
            email: self.email,
            senha_hash,
            data_nascimento: self.data_nascimento,
            endereco: self.endereco,
            cep: self.cep,
            certificado_registro: non_empty(self.certificado_registro),
            nome_instituicao: non_empty(self.nome_instituicao),
            horarios_atendimento: non_empty(self.horarios_atendimento),
            nome_fantasia: non_empty(self.nome_fantasia),
            horarios_funcionamento: non_empty(self.horarios_funcionamento),
            numero_emergencia: non_empty(self.numero_emergencia),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: UserAccount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyNumber {
    pub numero_emergencia: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(extra: serde_json::Value) -> RegisterRequest {
        let mut body = json!({
            "tipoUsuario": "idoso",
            "nome": "Ana",
            "cpf": "222",
            "telefone": "111",
            "email": "a@x.com",
            "senha": "pw",
        });
        if let (Some(base), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(body).expect("valid register body")
    }

    #[test]
    fn empty_optional_fields_become_null() {
        let req = request(json!({
            "nomeInstituicao": "",
            "nomeFantasia": "Casa Amparo",
            "numeroEmergencia": "",
        }));
        let row = req.into_new_account("hash".into());
        assert_eq!(row.nome_instituicao, None);
        assert_eq!(row.nome_fantasia.as_deref(), Some("Casa Amparo"));
        assert_eq!(row.numero_emergencia, None);
        assert_eq!(row.certificado_registro, None);
        assert_eq!(row.senha_hash, "hash");
    }

    #[test]
    fn core_fields_pass_through() {
        let req = request(json!({
            "dataNascimento": "1950-03-10",
            "endereco": "Rua A, 1",
            "cep": "01000-000",
        }));
        let row = req.into_new_account("hash".into());
        assert_eq!(row.data_nascimento.as_deref(), Some("1950-03-10"));
        assert_eq!(row.endereco.as_deref(), Some("Rua A, 1"));
        assert_eq!(row.cep.as_deref(), Some("01000-000"));
        assert_eq!(row.email, "a@x.com");
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let body = json!({"nome": "Ana", "email": "a@x.com", "senha": "pw"});
        assert!(serde_json::from_value::<RegisterRequest>(body).is_err());
    }

    #[test]
    fn emergency_number_serializes_null() {
        let json = serde_json::to_value(EmergencyNumber { numero_emergencia: None }).unwrap();
        assert_eq!(json, json!({"numeroEmergencia": null}));
    }
}
