// src/services/lease_service.rs
//
// O serviço de leases concentra as três famílias de mutação:
//   1. Troca de status direta (máquina de estados, sem versionamento);
//   2. Ocupantes e pets (mutação in-place no lease vivo);
//   3. Locatários (motor de versionamento: anula o registro atual e cria um
//      sucessor — o conjunto de signatários de um lease nunca é editado).

use crate::{
    common::error::AppError,
    db::{LeaseRepository, PersonRepository, PropertyRepository},
    models::{
        lease::{
            Lease, LeaseStatus, LeaseWithDetails, LesseeInput, NewLeaseResponse, NewLeaseTerms,
            PetSpecies, StatusChangeFields,
        },
        person::PersonRef,
    },
    services::{
        lease_status::{apply_status_change, validate_lease_terms, validate_voided_reason},
        person_service::{ContactPolicy, PersonService},
    },
};
use crate::models::lease::LeaseLessee;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

// Políticas de contato por papel. Locatários nunca são isentos; ocupantes
// adultos também exigem; crianças nunca.
const LESSEE_CONTACT: ContactPolicy = ContactPolicy::Required {
    message: "Email and phone are required for lessees.",
};
const ADULT_OCCUPANT_CONTACT: ContactPolicy = ContactPolicy::Required {
    message: "Adult occupants require email and phone for inline creation",
};

/// Rejeita adicionar um signatário que já assina o antecessor.
fn ensure_new_lessee(prior: &[LeaseLessee], person_id: Uuid) -> Result<(), AppError> {
    if prior.iter().any(|l| l.person_id == person_id) {
        return Err(AppError::business_rule(
            "personId",
            "Person is already a lessee on this lease.",
        ));
    }
    Ok(())
}

/// Locatários que o sucessor carrega ao remover `person_id`: todos os do
/// antecessor menos o removido. Remover quem não assina é NotFound; remover
/// o último signatário é proibido (um lease sempre tem pelo menos um).
fn successor_lessees(
    prior: &[LeaseLessee],
    person_id: Uuid,
) -> Result<Vec<&LeaseLessee>, AppError> {
    let remaining: Vec<_> = prior.iter().filter(|l| l.person_id != person_id).collect();

    if remaining.len() == prior.len() {
        return Err(AppError::NotFound(
            "Person is not a lessee on this lease.".to_string(),
        ));
    }
    if remaining.is_empty() {
        return Err(AppError::business_rule(
            "personId",
            "A lease must have at least one lessee.",
        ));
    }

    Ok(remaining)
}

#[derive(Clone)]
pub struct LeaseService {
    lease_repo: LeaseRepository,
    property_repo: PropertyRepository,
    person_service: PersonService,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl LeaseService {
    pub fn new(
        lease_repo: LeaseRepository,
        property_repo: PropertyRepository,
        person_service: PersonService,
        pool: PgPool,
    ) -> Self {
        Self {
            lease_repo,
            property_repo,
            person_service,
            pool,
        }
    }

    // --- Leitura ---

    /// Monta o agregado completo: lease + locatários/ocupantes (com os dados
    /// da pessoa referenciada) + pets.
    pub async fn get_lease(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
    ) -> Result<LeaseWithDetails, AppError> {
        let lease = self
            .lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        let lessees = self.lease_repo.list_lessee_details(lease_id).await?;
        let occupants = self.lease_repo.list_occupant_details(lease_id).await?;
        let pets = self.lease_repo.list_pets(&self.pool, lease_id).await?;

        Ok(LeaseWithDetails {
            lease,
            lessees,
            occupants,
            pets,
        })
    }

    pub async fn list_leases(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        include_voided: bool,
    ) -> Result<Vec<Lease>, AppError> {
        self.property_repo
            .find_by_id(user_id, property_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found.".to_string()))?;

        self.lease_repo
            .list_for_property(user_id, property_id, include_voided)
            .await
    }

    // --- Criação inicial ---

    /// Cria o primeiro registro de um lease. Nasce direto em ACTIVE ou
    /// MONTH_TO_MONTH, com pelo menos um locatário.
    pub async fn create_lease(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        status: Option<LeaseStatus>,
        mut terms: NewLeaseTerms,
        lessees: &[LesseeInput],
    ) -> Result<LeaseWithDetails, AppError> {
        // 1. O imóvel precisa existir e ser do usuário
        self.property_repo
            .find_by_id(user_id, property_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found.".to_string()))?;

        // 2. Status de nascimento: só os dois estados "vivos"
        let status = status.unwrap_or(LeaseStatus::Active);
        if !matches!(status, LeaseStatus::Active | LeaseStatus::MonthToMonth) {
            return Err(AppError::business_rule(
                "status",
                "A lease must be created as ACTIVE or MONTH_TO_MONTH.",
            ));
        }

        // 3. Termos e regra mínima de signatários
        validate_lease_terms(&terms)?;
        if lessees.is_empty() {
            return Err(AppError::business_rule(
                "lessees",
                "A lease must have at least one lessee.",
            ));
        }

        // MONTH_TO_MONTH nunca carrega data de término
        if status == LeaseStatus::MonthToMonth {
            terms.end_date = None;
        }

        // 4. Tudo ou nada: lease + pessoas inline + locatários
        let mut tx = self.pool.begin().await?;

        let lease = self
            .lease_repo
            .create_lease(&mut *tx, user_id, property_id, &terms, status)
            .await?;

        let mut seen: Vec<Uuid> = Vec::with_capacity(lessees.len());
        for input in lessees {
            let person_id = self
                .person_service
                .resolve_person(&mut *tx, user_id, &input.person, LESSEE_CONTACT)
                .await?;

            if seen.contains(&person_id) {
                return Err(AppError::business_rule(
                    "personId",
                    "Person is already a lessee on this lease.",
                ));
            }
            seen.push(person_id);

            self.lease_repo
                .insert_lessee(&mut *tx, lease.id, person_id, input.signed_date)
                .await?;
        }

        tx.commit().await?;

        self.get_lease(user_id, lease.id).await
    }

    // --- Máquina de estados (troca de status direta, sem sucessor) ---

    pub async fn change_status(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
        new_status: LeaseStatus,
        fields: &StatusChangeFields,
    ) -> Result<Lease, AppError> {
        let mut lease = self
            .lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        // Valida e faz o merge em memória; só então persiste
        apply_status_change(&mut lease, new_status, fields)?;

        self.lease_repo.update_status_fields(&self.pool, &lease).await
    }

    // --- Ocupantes (mutação in-place, sem versionamento) ---

    pub async fn add_occupant(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
        person: &PersonRef,
        is_adult: bool,
        move_in_date: Option<NaiveDate>,
    ) -> Result<LeaseWithDetails, AppError> {
        self.lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        // Adulto exige contato na criação inline; criança nunca
        let policy = if is_adult {
            ADULT_OCCUPANT_CONTACT
        } else {
            ContactPolicy::NotRequired
        };

        let mut tx = self.pool.begin().await?;

        let person_id = self
            .person_service
            .resolve_person(&mut *tx, user_id, person, policy)
            .await?;

        self.lease_repo
            .insert_occupant(&mut *tx, lease_id, person_id, is_adult, move_in_date, None)
            .await?;

        tx.commit().await?;

        self.get_lease(user_id, lease_id).await
    }

    pub async fn remove_occupant(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
        occupant_id: Uuid,
    ) -> Result<LeaseWithDetails, AppError> {
        self.lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        let occupant = self
            .lease_repo
            .find_occupant(lease_id, occupant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Occupant not found on this lease.".to_string()))?;

        self.lease_repo
            .soft_delete_occupant(&self.pool, occupant.id)
            .await?;

        self.get_lease(user_id, lease_id).await
    }

    // --- Pets (mutação in-place, sem versionamento) ---

    pub async fn add_pet(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
        name: &str,
        species: PetSpecies,
        notes: Option<&str>,
    ) -> Result<LeaseWithDetails, AppError> {
        self.lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        self.lease_repo
            .insert_pet(&self.pool, lease_id, name, species, notes)
            .await?;

        self.get_lease(user_id, lease_id).await
    }

    pub async fn remove_pet(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
        pet_id: Uuid,
    ) -> Result<LeaseWithDetails, AppError> {
        self.lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        let pet = self
            .lease_repo
            .find_pet(lease_id, pet_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pet not found on this lease.".to_string()))?;

        self.lease_repo.delete_pet(&self.pool, pet.id).await?;

        self.get_lease(user_id, lease_id).await
    }

    // --- Motor de versionamento (mudança de locatários) ---

    /// LÓGICA DE NEGÓCIO: adiciona um signatário. O registro atual é anulado e
    /// um sucessor nasce com os locatários antigos + o novo, carregando os
    /// ocupantes atuais e os pets como linhas novas. Tudo ou nada.
    pub async fn add_lessee(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
        voided_reason: Option<&str>,
        new_lessee: &LesseeInput,
        new_lease_data: &NewLeaseTerms,
    ) -> Result<NewLeaseResponse, AppError> {
        // 1. Carrega o antecessor
        let predecessor = self
            .lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        if predecessor.status == LeaseStatus::Voided {
            return Err(AppError::Conflict(
                "Lease has already been voided.".to_string(),
            ));
        }

        // 2. Validações antes de qualquer escrita
        let reason = validate_voided_reason(voided_reason)?;
        validate_lease_terms(new_lease_data)?;

        // 3. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 4. Resolve o novo locatário (pode criar a pessoa, dentro da transação)
        let new_person_id = self
            .person_service
            .resolve_person(&mut *tx, user_id, &new_lessee.person, LESSEE_CONTACT)
            .await?;

        let prior_lessees = self.lease_repo.list_lessees(&mut *tx, lease_id).await?;
        ensure_new_lessee(&prior_lessees, new_person_id)?;

        // 5. Anula o antecessor com guarda condicional: se outra requisição
        //    anulou primeiro, nenhuma linha é afetada e devolvemos conflito
        //    (dois sucessores nunca podem nascer do mesmo antecessor).
        self.lease_repo
            .void_guarded(&mut *tx, lease_id, predecessor.status, &reason)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Lease was changed by another request.".to_string())
            })?;

        // 6. Cria o sucessor e copia as partes não afetadas
        let successor = self
            .lease_repo
            .create_lease(
                &mut *tx,
                user_id,
                predecessor.property_id,
                new_lease_data,
                LeaseStatus::Active,
            )
            .await?;

        for lessee in &prior_lessees {
            self.lease_repo
                .insert_lessee(&mut *tx, successor.id, lessee.person_id, lessee.signed_date)
                .await?;
        }
        self.lease_repo
            .insert_lessee(&mut *tx, successor.id, new_person_id, new_lessee.signed_date)
            .await?;

        self.copy_occupants_and_pets(&mut tx, lease_id, successor.id)
            .await?;

        // 7. Liga antecessor -> sucessor e confirma
        self.lease_repo
            .set_superseded_by(&mut *tx, lease_id, successor.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Lease {} anulado e substituído por {} (novo locatário {})",
            lease_id,
            successor.id,
            new_person_id
        );

        Ok(NewLeaseResponse {
            new_lease_id: successor.id,
        })
    }

    /// Simétrico ao add_lessee: o sucessor carrega todos os locatários MENOS
    /// o removido. Remover o último signatário é proibido.
    pub async fn remove_lessee(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
        person_id: Uuid,
        voided_reason: Option<&str>,
        new_lease_data: &NewLeaseTerms,
    ) -> Result<NewLeaseResponse, AppError> {
        // 1. Carrega o antecessor
        let predecessor = self
            .lease_repo
            .find_by_id(user_id, lease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lease not found.".to_string()))?;

        if predecessor.status == LeaseStatus::Voided {
            return Err(AppError::Conflict(
                "Lease has already been voided.".to_string(),
            ));
        }

        // 2. Validações antes de qualquer escrita
        let reason = validate_voided_reason(voided_reason)?;
        validate_lease_terms(new_lease_data)?;

        let mut tx = self.pool.begin().await?;

        // 3. Locatários remanescentes
        let prior_lessees = self.lease_repo.list_lessees(&mut *tx, lease_id).await?;
        let remaining = successor_lessees(&prior_lessees, person_id)?;

        // 4. Anula com guarda + cria o sucessor
        self.lease_repo
            .void_guarded(&mut *tx, lease_id, predecessor.status, &reason)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Lease was changed by another request.".to_string())
            })?;

        let successor = self
            .lease_repo
            .create_lease(
                &mut *tx,
                user_id,
                predecessor.property_id,
                new_lease_data,
                LeaseStatus::Active,
            )
            .await?;

        for lessee in remaining {
            self.lease_repo
                .insert_lessee(&mut *tx, successor.id, lessee.person_id, lessee.signed_date)
                .await?;
        }

        self.copy_occupants_and_pets(&mut tx, lease_id, successor.id)
            .await?;

        self.lease_repo
            .set_superseded_by(&mut *tx, lease_id, successor.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Lease {} anulado e substituído por {} (locatário {} removido)",
            lease_id,
            successor.id,
            person_id
        );

        Ok(NewLeaseResponse {
            new_lease_id: successor.id,
        })
    }

    /// Copia ocupantes atuais (sem data de saída) e pets do antecessor para o
    /// sucessor, como linhas NOVAS — as do antecessor ficam intactas para o
    /// histórico.
    async fn copy_occupants_and_pets(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        predecessor_id: Uuid,
        successor_id: Uuid,
    ) -> Result<(), AppError> {
        let occupants = self
            .lease_repo
            .list_current_occupants(&mut **tx, predecessor_id)
            .await?;
        for occupant in occupants {
            self.lease_repo
                .insert_occupant(
                    &mut **tx,
                    successor_id,
                    occupant.person_id,
                    occupant.is_adult,
                    occupant.move_in_date,
                    occupant.move_out_date,
                )
                .await?;
        }

        let pets = self.lease_repo.list_pets(&mut **tx, predecessor_id).await?;
        for pet in pets {
            self.lease_repo
                .insert_pet(&mut **tx, successor_id, &pet.name, pet.species, pet.notes.as_deref())
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lessee(person_id: Uuid) -> LeaseLessee {
        let now = Utc::now();
        LeaseLessee {
            id: Uuid::new_v4(),
            lease_id: Uuid::new_v4(),
            person_id,
            signed_date: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn adding_an_existing_lessee_is_rejected() {
        let bob = Uuid::new_v4();
        let prior = vec![lessee(bob)];

        let err = ensure_new_lessee(&prior, bob).unwrap_err();
        match err {
            AppError::BusinessRule { field, message } => {
                assert_eq!(field, "personId");
                assert_eq!(message, "Person is already a lessee on this lease.");
            }
            other => panic!("esperava BusinessRule, veio {other:?}"),
        }
    }

    #[test]
    fn adding_a_new_person_as_lessee_passes() {
        let prior = vec![lessee(Uuid::new_v4())];
        assert!(ensure_new_lessee(&prior, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn removing_the_sole_lessee_is_rejected() {
        let bob = Uuid::new_v4();
        let prior = vec![lessee(bob)];

        let err = successor_lessees(&prior, bob).unwrap_err();
        match err {
            AppError::BusinessRule { field, message } => {
                assert_eq!(field, "personId");
                assert_eq!(message, "A lease must have at least one lessee.");
            }
            other => panic!("esperava BusinessRule, veio {other:?}"),
        }
    }

    #[test]
    fn removing_a_non_lessee_is_not_found() {
        let prior = vec![lessee(Uuid::new_v4())];

        let err = successor_lessees(&prior, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn removing_one_of_two_keeps_the_other() {
        let bob = Uuid::new_v4();
        let ann = Uuid::new_v4();
        let prior = vec![lessee(bob), lessee(ann)];

        let remaining = successor_lessees(&prior, bob).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].person_id, ann);
    }
}
