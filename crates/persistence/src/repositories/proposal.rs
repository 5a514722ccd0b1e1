//! Proposal repository for database operations.
//!
//! All lifecycle transitions are single conditional UPDATE statements:
//! the status guard lives in the WHERE clause, so concurrent writers
//! race at the database and the loser becomes a no-op.

use domain::models::proposal::{
    CreateProposalRequest, ListProposalsQuery, Proposal, ProposalItem, ProposalSection,
    ProposalStatus,
};
use shared::pagination::{PageParams, PageWindow};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ProposalEntity, ProposalItemEntity, ProposalSectionEntity};

const PROPOSAL_COLUMNS: &str = "id, user_id, client_id, client_name, title, description, status, \
     amount, currency, valid_until, sent_at, viewed_at, responded_at, created_at, updated_at";

fn to_domain(entity: ProposalEntity) -> Result<Proposal, sqlx::Error> {
    Proposal::try_from(entity).map_err(|e| sqlx::Error::Decode(e.into()))
}

/// Helper struct for building dynamic WHERE clauses from list filters.
/// Tracks conditions and parameter positions to keep the count query and
/// the page query in sync.
struct ProposalFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl ProposalFilterBuilder {
    fn build(query: &ListProposalsQuery, statuses: &Option<Vec<ProposalStatus>>) -> Self {
        let mut conditions = vec!["user_id = $1".to_string()];
        let mut param_count = 1;

        if statuses.is_some() {
            param_count += 1;
            conditions.push(format!("status = ANY(${})", param_count));
        }

        if query.client_id.is_some() {
            param_count += 1;
            conditions.push(format!("client_id = ${}", param_count));
        }

        if query.search.is_some() {
            param_count += 1;
            conditions.push(format!(
                "(title ILIKE ${p} OR COALESCE(description, '') ILIKE ${p} OR client_name ILIKE ${p})",
                p = param_count
            ));
        }

        if query.created_from.is_some() {
            param_count += 1;
            conditions.push(format!("created_at >= ${}", param_count));
        }

        if query.created_to.is_some() {
            param_count += 1;
            conditions.push(format!("created_at <= ${}", param_count));
        }

        if query.amount_min.is_some() {
            param_count += 1;
            conditions.push(format!("amount >= ${}", param_count));
        }

        if query.amount_max.is_some() {
            param_count += 1;
            conditions.push(format!("amount <= ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind list filter parameters to a SQLx builder, in the same
/// order the filter builder assigned parameter positions.
macro_rules! bind_list_filters {
    ($builder:expr, $query:expr, $statuses:expr) => {{
        let mut b = $builder;
        if let Some(ref statuses) = $statuses {
            let raw: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
            b = b.bind(raw);
        }
        if let Some(ref client_id) = $query.client_id {
            b = b.bind(client_id);
        }
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(ref created_from) = $query.created_from {
            b = b.bind(created_from);
        }
        if let Some(ref created_to) = $query.created_to {
            b = b.bind(created_to);
        }
        if let Some(ref amount_min) = $query.amount_min {
            b = b.bind(amount_min);
        }
        if let Some(ref amount_max) = $query.amount_max {
            b = b.bind(amount_max);
        }
        b
    }};
}

/// Repository for proposal database operations.
#[derive(Clone)]
pub struct ProposalRepository {
    pool: PgPool,
}

impl ProposalRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a proposal with its sections and items in one transaction.
    /// New proposals always start in `draft`.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateProposalRequest,
    ) -> Result<Proposal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, ProposalEntity>(&format!(
            r#"
            INSERT INTO proposals (user_id, client_id, client_name, title, description, status, amount, currency, valid_until)
            VALUES ($1, $2, $3, $4, $5, 'draft', $6, $7, $8)
            RETURNING {}
            "#,
            PROPOSAL_COLUMNS
        ))
        .bind(user_id)
        .bind(request.client_id)
        .bind(&request.client_name)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.amount)
        .bind(&request.currency)
        .bind(request.valid_until)
        .fetch_one(&mut *tx)
        .await?;

        for section in &request.sections {
            sqlx::query(
                r#"
                INSERT INTO proposal_sections (proposal_id, title, body, order_position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(entity.id)
            .bind(&section.title)
            .bind(&section.body)
            .bind(section.order_position)
            .execute(&mut *tx)
            .await?;
        }

        for item in &request.items {
            sqlx::query(
                r#"
                INSERT INTO proposal_items (proposal_id, description, quantity, unit_price, amount)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(entity.id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        to_domain(entity)
    }

    /// Find proposal by ID, scoped to its owner.
    pub async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ProposalEntity>(&format!(
            "SELECT {} FROM proposals WHERE id = $1 AND user_id = $2",
            PROPOSAL_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        entity.map(to_domain).transpose()
    }

    /// Sections for a proposal in display order.
    pub async fn sections(&self, proposal_id: Uuid) -> Result<Vec<ProposalSection>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ProposalSectionEntity>(
            r#"
            SELECT id, proposal_id, title, body, order_position
            FROM proposal_sections
            WHERE proposal_id = $1
            ORDER BY order_position
            "#,
        )
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Line items for a proposal.
    pub async fn items(&self, proposal_id: Uuid) -> Result<Vec<ProposalItem>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ProposalItemEntity>(
            r#"
            SELECT id, proposal_id, description, quantity, unit_price, amount
            FROM proposal_items
            WHERE proposal_id = $1
            ORDER BY id
            "#,
        )
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// List proposals for a user with filtering, sorting and pagination.
    /// `statuses` is the parsed status filter; sort column comes from the
    /// whitelisted enum, never raw caller input.
    pub async fn list(
        &self,
        user_id: Uuid,
        statuses: Option<Vec<ProposalStatus>>,
        query: &ListProposalsQuery,
    ) -> Result<(Vec<Proposal>, i64), sqlx::Error> {
        let window = PageWindow::from_params(PageParams {
            page: query.page,
            per_page: query.per_page,
        });
        let sort_column = query
            .sort_by
            .unwrap_or(domain::models::proposal::ProposalSortField::CreatedAt)
            .column();
        let sort_order = query
            .sort_order
            .unwrap_or(domain::models::proposal::SortOrder::Desc)
            .as_sql();

        let filter = ProposalFilterBuilder::build(query, &statuses);
        let where_clause = filter.where_clause();

        let count_query = format!("SELECT COUNT(*) FROM proposals WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);
        let total: i64 = bind_list_filters!(count_builder, query, statuses)
            .fetch_one(&self.pool)
            .await?;

        let select_query = format!(
            r#"
            SELECT {columns}
            FROM proposals
            WHERE {where_clause}
            ORDER BY {sort_column} {sort_order}, id
            LIMIT ${limit_param} OFFSET ${offset_param}
            "#,
            columns = PROPOSAL_COLUMNS,
            where_clause = where_clause,
            sort_column = sort_column,
            sort_order = sort_order,
            limit_param = filter.param_count() + 1,
            offset_param = filter.param_count() + 2,
        );

        let select_builder = sqlx::query_as::<_, ProposalEntity>(&select_query).bind(user_id);
        let entities = bind_list_filters!(select_builder, query, statuses)
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(&self.pool)
            .await?;

        let proposals = entities
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((proposals, total))
    }

    /// Transition draft -> sent, stamping sent_at. Returns `None` when the
    /// proposal is missing, not owned, or not in `draft`. The validity
    /// deadline is set at creation and never touched here.
    pub async fn mark_sent(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ProposalEntity>(&format!(
            r#"
            UPDATE proposals
            SET status = 'sent', sent_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status = 'draft'
            RETURNING {}
            "#,
            PROPOSAL_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        entity.map(to_domain).transpose()
    }

    /// Transition sent -> viewed, stamping viewed_at on first view only.
    /// Returns `None` when the proposal is not in `sent`.
    pub async fn mark_viewed(&self, id: Uuid) -> Result<Option<Proposal>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ProposalEntity>(&format!(
            r#"
            UPDATE proposals
            SET status = 'viewed', viewed_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'sent'
            RETURNING {}
            "#,
            PROPOSAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        entity.map(to_domain).transpose()
    }

    /// Record the client's response, accepting or rejecting a pending
    /// proposal. Returns `None` when no pending row matched.
    pub async fn mark_responded(
        &self,
        id: Uuid,
        user_id: Uuid,
        accepted: bool,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let status = if accepted { "accepted" } else { "rejected" };
        let entity = sqlx::query_as::<_, ProposalEntity>(&format!(
            r#"
            UPDATE proposals
            SET status = $3, responded_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status IN ('sent', 'viewed')
            RETURNING {}
            "#,
            PROPOSAL_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        entity.map(to_domain).transpose()
    }

    /// Expire all pending proposals whose validity window has passed.
    /// Returns the (id, user_id) of each expired row so callers can fan
    /// out change events. Idempotent: rows already expired never match.
    pub async fn expire_pending(&self) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            UPDATE proposals
            SET status = 'expired', updated_at = NOW()
            WHERE status IN ('sent', 'viewed')
              AND valid_until IS NOT NULL
              AND valid_until < NOW()
            RETURNING id, user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete a proposal. Sections and items cascade; referencing emails
    /// or share links make the FK reject the delete (surfaces as 23503).
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::proposal::{ProposalSortField, SortOrder};

    #[test]
    fn test_filter_builder_no_filters() {
        let query = ListProposalsQuery::default();
        let filter = ProposalFilterBuilder::build(&query, &None);
        assert_eq!(filter.where_clause(), "user_id = $1");
        assert_eq!(filter.param_count(), 1);
    }

    #[test]
    fn test_filter_builder_all_filters() {
        let query = ListProposalsQuery {
            status: Some("sent,viewed".to_string()),
            client_id: Some(Uuid::new_v4()),
            search: Some("redesign".to_string()),
            created_from: Some(Utc::now()),
            created_to: Some(Utc::now()),
            amount_min: Some(100.0),
            amount_max: Some(5000.0),
            sort_by: Some(ProposalSortField::Amount),
            sort_order: Some(SortOrder::Asc),
            page: None,
            per_page: None,
        };
        let statuses = query.statuses().unwrap();
        let filter = ProposalFilterBuilder::build(&query, &statuses);
        assert_eq!(filter.param_count(), 8);
        let clause = filter.where_clause();
        assert!(clause.contains("status = ANY($2)"));
        assert!(clause.contains("client_id = $3"));
        assert!(clause.contains("ILIKE $4"));
        assert!(clause.contains("amount <= $8"));
    }

    #[test]
    fn test_filter_builder_positions_skip_missing() {
        let query = ListProposalsQuery {
            search: Some("acme".to_string()),
            amount_min: Some(50.0),
            ..Default::default()
        };
        let filter = ProposalFilterBuilder::build(&query, &None);
        let clause = filter.where_clause();
        assert!(clause.contains("ILIKE $2"));
        assert!(clause.contains("amount >= $3"));
        assert_eq!(filter.param_count(), 3);
    }
}
