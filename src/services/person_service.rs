// src/services/person_service.rs
//
// O resolver de referência de pessoa: toda entrada que aponta para uma pessoa
// aceita exatamente UMA de duas formas — `personId` OU campos inline de
// criação (regra XOR). A regra vive aqui para locatários e ocupantes
// compartilharem a mesma política.

use crate::{
    common::error::AppError,
    db::PersonRepository,
    models::person::{CreatePersonPayload, Person, PersonRef},
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

/// Exigência de contato na criação inline. Locatários sempre exigem e-mail e
/// telefone; ocupantes adultos também; crianças nunca.
#[derive(Debug, Clone, Copy)]
pub enum ContactPolicy {
    NotRequired,
    Required { message: &'static str },
}

/// Resultado da classificação XOR de um `PersonRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRef {
    Existing(Uuid),
    Inline {
        first_name: String,
        middle_name: Option<String>,
        last_name: String,
        email: Option<String>,
        phone: Option<String>,
        notes: Option<String>,
    },
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).is_some_and(|v| !v.is_empty())
}

/// Classifica a entrada (parte pura do resolver, sem banco).
pub fn classify(input: &PersonRef, contact: ContactPolicy) -> Result<ResolvedRef, AppError> {
    let has_inline = has_text(&input.first_name)
        || has_text(&input.middle_name)
        || has_text(&input.last_name)
        || has_text(&input.email)
        || has_text(&input.phone);

    match (input.person_id, has_inline) {
        // As duas formas ao mesmo tempo, ou nenhuma: viola o XOR.
        (Some(_), true) | (None, false) => Err(AppError::business_rule(
            "personId",
            "Either provide personId OR fields for inline creation.",
        )),

        (Some(person_id), false) => Ok(ResolvedRef::Existing(person_id)),

        (None, true) => {
            let first_name = input
                .first_name
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    AppError::business_rule(
                        "firstName",
                        "First name and last name are required for inline creation.",
                    )
                })?;
            let last_name = input
                .last_name
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    AppError::business_rule(
                        "lastName",
                        "First name and last name are required for inline creation.",
                    )
                })?;

            // A política de contato só se aplica ao caminho de criação inline.
            if let ContactPolicy::Required { message } = contact {
                if !has_text(&input.email) {
                    return Err(AppError::business_rule("email", message));
                }
                if !has_text(&input.phone) {
                    return Err(AppError::business_rule("phone", message));
                }
            }

            Ok(ResolvedRef::Inline {
                first_name: first_name.to_string(),
                middle_name: input.middle_name.clone(),
                last_name: last_name.to_string(),
                email: input.email.clone(),
                phone: input.phone.clone(),
                notes: input.notes.clone(),
            })
        }
    }
}

#[derive(Clone)]
pub struct PersonService {
    person_repo: PersonRepository,
}

impl PersonService {
    pub fn new(person_repo: PersonRepository) -> Self {
        Self { person_repo }
    }

    /// Resolve um `PersonRef` para um ID de pessoa. Cria a pessoa quando a
    /// forma inline foi usada; quando veio `personId`, confirma que a pessoa
    /// existe e pertence ao usuário. Roda no executor recebido para poder
    /// participar da transação do motor de versionamento.
    pub async fn resolve_person<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &PersonRef,
        contact: ContactPolicy,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match classify(input, contact)? {
            ResolvedRef::Existing(person_id) => {
                self.person_repo
                    .find_by_id(executor, user_id, person_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Person not found.".to_string()))?;
                Ok(person_id)
            }
            ResolvedRef::Inline {
                first_name,
                middle_name,
                last_name,
                email,
                phone,
                notes,
            } => {
                let person = self
                    .person_repo
                    .create_person(
                        executor,
                        user_id,
                        &first_name,
                        middle_name.as_deref(),
                        &last_name,
                        email.as_deref(),
                        phone.as_deref(),
                        notes.as_deref(),
                    )
                    .await?;
                Ok(person.id)
            }
        }
    }

    /// Criação direta (POST /api/persons).
    pub async fn create_person(
        &self,
        user_id: Uuid,
        payload: &CreatePersonPayload,
    ) -> Result<Person, AppError> {
        self.person_repo
            .create_person(
                self.person_repo.pool(),
                user_id,
                payload.first_name.trim(),
                payload.middle_name.as_deref(),
                payload.last_name.trim(),
                payload.email.as_deref(),
                payload.phone.as_deref(),
                payload.notes.as_deref(),
            )
            .await
    }

    pub async fn list_persons(&self, user_id: Uuid) -> Result<Vec<Person>, AppError> {
        self.person_repo.list_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(first: Option<&str>, last: Option<&str>, email: Option<&str>, phone: Option<&str>) -> PersonRef {
        PersonRef {
            person_id: None,
            first_name: first.map(String::from),
            middle_name: None,
            last_name: last.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
            notes: None,
        }
    }

    fn field_of(err: AppError) -> String {
        match err {
            AppError::BusinessRule { field, .. } => field,
            other => panic!("esperava BusinessRule, veio {other:?}"),
        }
    }

    #[test]
    fn person_id_alone_resolves_as_existing() {
        let id = Uuid::new_v4();
        let mut input = inline(None, None, None, None);
        input.person_id = Some(id);

        let resolved = classify(&input, ContactPolicy::NotRequired).unwrap();
        assert_eq!(resolved, ResolvedRef::Existing(id));
    }

    #[test]
    fn both_forms_at_once_violate_the_xor() {
        let mut input = inline(Some("Ann"), Some("Lee"), None, None);
        input.person_id = Some(Uuid::new_v4());

        assert_eq!(
            field_of(classify(&input, ContactPolicy::NotRequired).unwrap_err()),
            "personId"
        );
    }

    #[test]
    fn neither_form_violates_the_xor() {
        let input = inline(None, None, None, None);
        assert_eq!(
            field_of(classify(&input, ContactPolicy::NotRequired).unwrap_err()),
            "personId"
        );
    }

    #[test]
    fn inline_requires_both_names() {
        let input = inline(Some("Tommy"), None, None, None);
        assert_eq!(
            field_of(classify(&input, ContactPolicy::NotRequired).unwrap_err()),
            "lastName"
        );
    }

    #[test]
    fn contact_policy_rejects_missing_email_and_phone() {
        let msg = "Adult occupants require email and phone for inline creation";
        let policy = ContactPolicy::Required { message: msg };

        let no_contact = inline(Some("Sam"), Some("Lee"), None, None);
        let err = classify(&no_contact, policy).unwrap_err();
        match err {
            AppError::BusinessRule { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, msg);
            }
            other => panic!("esperava BusinessRule, veio {other:?}"),
        }

        let email_only = inline(Some("Sam"), Some("Lee"), Some("s@x.com"), None);
        assert_eq!(field_of(classify(&email_only, policy).unwrap_err()), "phone");
    }

    #[test]
    fn contact_policy_does_not_apply_to_references() {
        let id = Uuid::new_v4();
        let mut input = inline(None, None, None, None);
        input.person_id = Some(id);

        let policy = ContactPolicy::Required {
            message: "Email and phone are required for lessees.",
        };
        assert_eq!(classify(&input, policy).unwrap(), ResolvedRef::Existing(id));
    }

    #[test]
    fn child_occupant_never_requires_contact() {
        let input = inline(Some("Tommy"), Some("Lee"), None, None);
        assert!(classify(&input, ContactPolicy::NotRequired).is_ok());
    }
}
