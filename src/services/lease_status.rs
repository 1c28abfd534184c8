// src/services/lease_status.rs
//
// A máquina de estados de status do lease. Transições são livres em direção
// (qualquer status alcança qualquer outro), mas cada uma carrega efeitos
// obrigatórios:
//   - entrar em VOIDED exige um motivo não-vazio;
//   - entrar em MONTH_TO_MONTH limpa o endDate, mesmo se o caller mandou um.
// Tudo aqui é puro: opera sobre um Lease já carregado, sem tocar no banco.

use crate::{
    common::error::AppError,
    models::lease::{Lease, LeaseStatus, NewLeaseTerms, StatusChangeFields},
};
use rust_decimal::Decimal;

/// Valida e normaliza o motivo de anulação.
pub fn validate_voided_reason(reason: Option<&str>) -> Result<String, AppError> {
    match reason.map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r.to_string()),
        _ => Err(AppError::business_rule(
            "voidedReason",
            "A non-empty voidedReason is required.",
        )),
    }
}

/// Aplica uma troca de status sobre o lease em memória, fazendo o merge dos
/// campos fornecidos. Campo ausente = intocado (inclusive um voidedReason
/// antigo ao sair de VOIDED); um voidedReason null explícito limpa o motivo.
pub fn apply_status_change(
    lease: &mut Lease,
    new_status: LeaseStatus,
    fields: &StatusChangeFields,
) -> Result<(), AppError> {
    if new_status == LeaseStatus::Voided {
        let supplied = fields.voided_reason.as_ref().and_then(|r| r.as_deref());
        let reason = validate_voided_reason(supplied)?;
        lease.voided_reason = Some(reason);
    } else if let Some(reason) = &fields.voided_reason {
        lease.voided_reason = reason.clone();
    }

    if let Some(end_date) = fields.end_date {
        lease.end_date = Some(end_date);
    }
    if let Some(rent) = fields.monthly_rent {
        lease.monthly_rent = Some(rent);
    }
    if let Some(deposit) = fields.security_deposit {
        lease.security_deposit = Some(deposit);
    }
    if let Some(paid) = fields.deposit_paid_date {
        lease.deposit_paid_date = Some(paid);
    }
    if let Some(pet_deposit) = fields.pet_deposit {
        lease.pet_deposit = Some(pet_deposit);
    }

    lease.status = new_status;

    // MONTH_TO_MONTH nunca tem data de término, ganhe ela de onde ganhar.
    if new_status == LeaseStatus::MonthToMonth {
        lease.end_date = None;
    }

    Ok(())
}

/// Valida os termos de um novo registro de lease (criação inicial ou
/// `newLeaseData` do motor de versionamento). Regras cross-field que o
/// `validator` estrutural não cobre.
pub fn validate_lease_terms(terms: &NewLeaseTerms) -> Result<(), AppError> {
    if let Some(end_date) = terms.end_date {
        if terms.start_date >= end_date {
            return Err(AppError::business_rule(
                "endDate",
                "endDate must be after startDate.",
            ));
        }
    }
    if let Some(rent) = terms.monthly_rent {
        if rent <= Decimal::ZERO {
            return Err(AppError::business_rule(
                "monthlyRent",
                "monthlyRent must be greater than zero.",
            ));
        }
    }
    if let Some(deposit) = terms.security_deposit {
        if deposit < Decimal::ZERO {
            return Err(AppError::business_rule(
                "securityDeposit",
                "securityDeposit cannot be negative.",
            ));
        }
    }
    if let Some(pet_deposit) = terms.pet_deposit {
        if pet_deposit < Decimal::ZERO {
            return Err(AppError::business_rule(
                "petDeposit",
                "petDeposit cannot be negative.",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn sample_lease(status: LeaseStatus) -> Lease {
        let now = Utc::now();
        Lease {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()),
            monthly_rent: Some(Decimal::new(150000, 2)),
            security_deposit: None,
            deposit_paid_date: None,
            pet_deposit: None,
            status,
            voided_reason: None,
            superseded_by_lease_id: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn voiding_without_reason_is_rejected() {
        let mut lease = sample_lease(LeaseStatus::Active);
        let err = apply_status_change(&mut lease, LeaseStatus::Voided, &StatusChangeFields::default())
            .unwrap_err();
        match err {
            AppError::BusinessRule { field, .. } => assert_eq!(field, "voidedReason"),
            other => panic!("esperava BusinessRule, veio {other:?}"),
        }
        // O lease não pode ter sido tocado
        assert_eq!(lease.status, LeaseStatus::Active);
        assert!(lease.voided_reason.is_none());
    }

    #[test]
    fn voiding_with_blank_reason_is_rejected() {
        let mut lease = sample_lease(LeaseStatus::Active);
        let fields = StatusChangeFields {
            voided_reason: Some(Some("   ".to_string())),
            ..Default::default()
        };
        assert!(apply_status_change(&mut lease, LeaseStatus::Voided, &fields).is_err());
    }

    #[test]
    fn voiding_with_explicit_null_reason_is_rejected() {
        let mut lease = sample_lease(LeaseStatus::Active);
        let fields = StatusChangeFields {
            voided_reason: Some(None),
            ..Default::default()
        };
        assert!(apply_status_change(&mut lease, LeaseStatus::Voided, &fields).is_err());
    }

    #[test]
    fn voiding_sets_status_and_trimmed_reason() {
        let mut lease = sample_lease(LeaseStatus::Active);
        let fields = StatusChangeFields {
            voided_reason: Some(Some("  lease renewal  ".to_string())),
            ..Default::default()
        };
        apply_status_change(&mut lease, LeaseStatus::Voided, &fields).unwrap();
        assert_eq!(lease.status, LeaseStatus::Voided);
        assert_eq!(lease.voided_reason.as_deref(), Some("lease renewal"));
    }

    #[test]
    fn month_to_month_clears_end_date_even_if_supplied() {
        let mut lease = sample_lease(LeaseStatus::Active);
        let fields = StatusChangeFields {
            end_date: Some(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()),
            ..Default::default()
        };
        apply_status_change(&mut lease, LeaseStatus::MonthToMonth, &fields).unwrap();
        assert_eq!(lease.status, LeaseStatus::MonthToMonth);
        assert!(lease.end_date.is_none());
    }

    #[test]
    fn leaving_voided_keeps_old_reason_untouched() {
        let mut lease = sample_lease(LeaseStatus::Voided);
        lease.voided_reason = Some("tenant change".to_string());

        apply_status_change(&mut lease, LeaseStatus::Active, &StatusChangeFields::default())
            .unwrap();
        assert_eq!(lease.status, LeaseStatus::Active);
        assert_eq!(lease.voided_reason.as_deref(), Some("tenant change"));
    }

    #[test]
    fn leaving_voided_with_explicit_null_clears_old_reason() {
        let mut lease = sample_lease(LeaseStatus::Voided);
        lease.voided_reason = Some("tenant change".to_string());

        let fields = StatusChangeFields {
            voided_reason: Some(None),
            ..Default::default()
        };
        apply_status_change(&mut lease, LeaseStatus::Active, &fields).unwrap();
        assert_eq!(lease.status, LeaseStatus::Active);
        assert!(lease.voided_reason.is_none());
    }

    #[test]
    fn merge_only_overwrites_supplied_fields() {
        let mut lease = sample_lease(LeaseStatus::Active);
        let fields = StatusChangeFields {
            monthly_rent: Some(Decimal::new(180000, 2)),
            ..Default::default()
        };
        apply_status_change(&mut lease, LeaseStatus::Ended, &fields).unwrap();
        assert_eq!(lease.status, LeaseStatus::Ended);
        assert_eq!(lease.monthly_rent, Some(Decimal::new(180000, 2)));
        // endDate não veio no payload: permanece o que estava
        assert_eq!(
            lease.end_date,
            Some(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap())
        );
    }

    fn terms(start: (i32, u32, u32), end: Option<(i32, u32, u32)>) -> NewLeaseTerms {
        NewLeaseTerms {
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: end.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            monthly_rent: None,
            security_deposit: None,
            deposit_paid_date: None,
            pet_deposit: None,
        }
    }

    #[test]
    fn end_date_must_come_after_start_date() {
        let t = terms((2025, 2, 1), Some((2025, 1, 1)));
        let err = validate_lease_terms(&t).unwrap_err();
        match err {
            AppError::BusinessRule { field, .. } => assert_eq!(field, "endDate"),
            other => panic!("esperava BusinessRule, veio {other:?}"),
        }
    }

    #[test]
    fn open_ended_terms_are_valid() {
        assert!(validate_lease_terms(&terms((2025, 2, 1), None)).is_ok());
    }

    #[test]
    fn rent_must_be_positive_and_deposit_non_negative() {
        let mut t = terms((2025, 1, 1), None);
        t.monthly_rent = Some(Decimal::ZERO);
        assert!(validate_lease_terms(&t).is_err());

        t.monthly_rent = Some(Decimal::new(100, 0));
        t.security_deposit = Some(Decimal::new(-1, 0));
        assert!(validate_lease_terms(&t).is_err());

        t.security_deposit = Some(Decimal::ZERO);
        assert!(validate_lease_terms(&t).is_ok());
    }
}
