//! Entity matching by ordered dedup key strategies.
//!
//! Each entity type carries a declarative strategy list. Strategies run in
//! order and the FIRST one that returns a match wins; later strategies are
//! never consulted, so the most specific identifier present on a row is
//! authoritative. A strategy whose key fields are absent from the row is
//! skipped. All lookups are scoped to one organization.

use domain::models::field::names;
use domain::models::{EntityType, ValidatedRow};
use persistence::repositories::{AdvisorRepository, LeadRepository, MemberRepository};
use sqlx::PgPool;
use uuid::Uuid;

/// One dedup key strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    MemberNumber,
    MemberEmailDob,
    AdvisorEmail,
    AdvisorCode,
    AdvisorProducerNumber,
    LeadEmailPhone,
    LeadEmail,
}

/// Member strategies: member number is the most specific identifier.
pub const MEMBER_STRATEGIES: &[MatchStrategy] =
    &[MatchStrategy::MemberNumber, MatchStrategy::MemberEmailDob];

/// Advisor strategies: email, then advisor code, then producer number.
pub const ADVISOR_STRATEGIES: &[MatchStrategy] = &[
    MatchStrategy::AdvisorEmail,
    MatchStrategy::AdvisorCode,
    MatchStrategy::AdvisorProducerNumber,
];

/// Lead strategies: email plus phone, then email alone.
///
/// Known gap inherited from the original behavior: two rows in one file
/// can match different leads for the same subject when one row carries a
/// phone and the other does not. Deliberately unchanged pending a product
/// decision; see DESIGN.md.
pub const LEAD_STRATEGIES: &[MatchStrategy] =
    &[MatchStrategy::LeadEmailPhone, MatchStrategy::LeadEmail];

/// Ordered strategy list for an entity type.
pub fn strategies_for(entity: EntityType) -> &'static [MatchStrategy] {
    match entity {
        EntityType::Member => MEMBER_STRATEGIES,
        EntityType::Advisor => ADVISOR_STRATEGIES,
        EntityType::Lead => LEAD_STRATEGIES,
    }
}

/// Resolves a validated row to an existing entity, if any.
#[derive(Clone)]
pub struct DedupResolver {
    members: MemberRepository,
    advisors: AdvisorRepository,
    leads: LeadRepository,
}

impl DedupResolver {
    pub fn new(pool: PgPool) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            advisors: AdvisorRepository::new(pool.clone()),
            leads: LeadRepository::new(pool),
        }
    }

    /// Find the existing entity a row refers to, or `None` for a new one.
    pub async fn resolve(
        &self,
        organization_id: Uuid,
        entity: EntityType,
        row: &ValidatedRow,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        for strategy in strategies_for(entity) {
            if let Some(id) = self.try_strategy(*strategy, organization_id, row).await? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    async fn try_strategy(
        &self,
        strategy: MatchStrategy,
        organization_id: Uuid,
        row: &ValidatedRow,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let found = match strategy {
            MatchStrategy::MemberNumber => match row.text(names::MEMBER_NUMBER) {
                Some(number) => self
                    .members
                    .find_by_member_number(organization_id, number)
                    .await?
                    .map(|m| m.id),
                None => None,
            },
            MatchStrategy::MemberEmailDob => {
                match (row.text(names::EMAIL), row.date(names::DATE_OF_BIRTH)) {
                    (Some(email), Some(dob)) => self
                        .members
                        .find_by_email_and_dob(organization_id, email, dob)
                        .await?
                        .map(|m| m.id),
                    _ => None,
                }
            }
            MatchStrategy::AdvisorEmail => match row.text(names::EMAIL) {
                Some(email) => self
                    .advisors
                    .find_by_email(organization_id, email)
                    .await?
                    .map(|a| a.id),
                None => None,
            },
            MatchStrategy::AdvisorCode => match row.text(names::ADVISOR_CODE) {
                Some(code) => self
                    .advisors
                    .find_by_code(organization_id, code)
                    .await?
                    .map(|a| a.id),
                None => None,
            },
            MatchStrategy::AdvisorProducerNumber => {
                match row.text(names::NATIONAL_PRODUCER_NUMBER) {
                    Some(npn) => self
                        .advisors
                        .find_by_producer_number(organization_id, npn)
                        .await?
                        .map(|a| a.id),
                    None => None,
                }
            }
            MatchStrategy::LeadEmailPhone => {
                match (row.text(names::EMAIL), row.text(names::PHONE)) {
                    (Some(email), Some(phone)) => self
                        .leads
                        .find_by_email_and_phone(organization_id, email, phone)
                        .await?
                        .map(|l| l.id),
                    _ => None,
                }
            }
            MatchStrategy::LeadEmail => match row.text(names::EMAIL) {
                Some(email) => self
                    .leads
                    .find_by_email(organization_id, email)
                    .await?
                    .map(|l| l.id),
                None => None,
            },
        };

        Ok(found)
    }
}
