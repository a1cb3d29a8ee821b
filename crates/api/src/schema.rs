use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, Enum, Error, ErrorExtensions, InputObject, Object, Schema,
    SimpleObject, ID,
};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use entity::{client, opportunity, opportunity_stage_history, strategy};
use pipeline::board::group_by_stage;
use pipeline::conversion::ClientDraft;
use pipeline::period::{self, Period};
use pipeline::review::{self, ReviewAction};
use pipeline::stage::{self, Transition};
use pipeline::PipelineError;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::info_span;
use uuid::Uuid;

use crate::convert::ConversionLedger;

pub struct AppSchema(pub Schema<QueryRoot, MutationRoot, EmptySubscription>);

pub fn build_schema(db: Arc<DatabaseConnection>) -> AppSchema {
    let schema = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .data(Arc::new(ConversionLedger::default()))
        .finish();
    AppSchema(schema)
}

pub struct QueryRoot;
pub struct MutationRoot;

const MAX_PAGE: i32 = 100;

#[Object]
impl QueryRoot {
    async fn agency(&self) -> AgencyQuery {
        AgencyQuery
    }
}

#[Object]
impl MutationRoot {
    async fn agency(&self) -> AgencyMutation {
        AgencyMutation
    }
}

#[derive(Default)]
pub struct AgencyQuery;

#[derive(Default)]
pub struct AgencyMutation;

#[Object]
impl AgencyQuery {
    async fn opportunities(
        &self,
        ctx: &Context<'_>,
        period: Option<PeriodFilter>,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<OpportunityNode>> {
        let db = database(ctx)?;
        let selected = period.unwrap_or(PeriodFilter::All);
        let limit = enforce_page_limit(first.unwrap_or(50))?;
        let skip = offset.unwrap_or(0).max(0) as usize;
        let span = info_span!(
            "agency.opportunities",
            period = selected.as_period().as_str(),
            first = limit
        );
        let _guard = span.enter();

        let rows = opportunity::Entity::find()
            .order_by_desc(opportunity::Column::UpdatedAt)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let today = Local::now().date_naive();
        Ok(rows
            .into_iter()
            .filter(|row| period::matches(selected.as_period(), row.expected_close_date, today))
            .skip(skip)
            .take(limit as usize)
            .map(OpportunityNode::from)
            .collect())
    }

    async fn opportunity(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<OpportunityNode>> {
        let db = database(ctx)?;
        let opportunity_id = parse_uuid(&id)?;
        let record = opportunity::Entity::find_by_id(opportunity_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(OpportunityNode::from))
    }

    async fn pipeline_board(
        &self,
        ctx: &Context<'_>,
        period: Option<PeriodFilter>,
    ) -> async_graphql::Result<PipelineBoard> {
        let db = database(ctx)?;
        let selected = period.unwrap_or(PeriodFilter::All);
        let span = info_span!(
            "agency.pipelineBoard",
            period = selected.as_period().as_str()
        );
        let _guard = span.enter();

        let rows = opportunity::Entity::find()
            .order_by_desc(opportunity::Column::UpdatedAt)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let today = Local::now().date_naive();
        let filtered: Vec<opportunity::Model> = rows
            .into_iter()
            .filter(|row| period::matches(selected.as_period(), row.expected_close_date, today))
            .collect();

        let columns: Vec<PipelineColumn> = group_by_stage(filtered)
            .into_iter()
            .map(|bucket| PipelineColumn {
                stage: bucket.stage.into(),
                total_count: bucket.opportunities.len() as i32,
                total_cents: bucket.total_cents,
                opportunities: bucket
                    .opportunities
                    .into_iter()
                    .map(OpportunityNode::from)
                    .collect(),
            })
            .collect();
        let total_count = columns.iter().map(|column| column.total_count).sum();
        let total_cents = columns.iter().map(|column| column.total_cents).sum();
        Ok(PipelineBoard {
            columns,
            total_count,
            total_cents,
        })
    }

    #[graphql(name = "stageHistory")]
    async fn stage_history(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "opportunityId")] opportunity_id: ID,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<StageHistoryNode>> {
        let db = database(ctx)?;
        let opportunity_uuid = parse_uuid(&opportunity_id)?;
        let limit = enforce_page_limit(first.unwrap_or(50))?;
        let skip = offset.unwrap_or(0).max(0) as u64;

        let rows = opportunity_stage_history::Entity::find()
            .filter(opportunity_stage_history::Column::OpportunityId.eq(opportunity_uuid))
            .order_by_desc(opportunity_stage_history::Column::ChangedAt)
            .limit(limit as u64)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(StageHistoryNode::from).collect())
    }

    #[graphql(name = "pendingConversion")]
    async fn pending_conversion(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "opportunityId")] opportunity_id: ID,
    ) -> async_graphql::Result<Option<ClientDraftNode>> {
        let ledger = ledger(ctx)?;
        let opportunity_uuid = parse_uuid(&opportunity_id)?;
        Ok(ledger.pending(opportunity_uuid).map(ClientDraftNode::from))
    }

    async fn clients(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        offset: Option<i32>,
        q: Option<String>,
    ) -> async_graphql::Result<Vec<ClientNode>> {
        let db = database(ctx)?;
        let limit = enforce_page_limit(first.unwrap_or(50))?;
        let skip = offset.unwrap_or(0).max(0) as u64;
        let mut query = client::Entity::find();
        if let Some(filter) = sanitize_optional_filter(q) {
            let pattern = format!("%{}%", filter.to_lowercase());
            let name_expr = Expr::expr(Func::lower(Expr::col(client::Column::Name)));
            let company_expr = Expr::expr(Func::lower(Expr::col(client::Column::Company)));
            query = query.filter(
                Condition::any()
                    .add(name_expr.like(pattern.clone()))
                    .add(company_expr.like(pattern)),
            );
        }
        let rows = query
            .order_by_asc(client::Column::Name)
            .limit(limit as u64)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(ClientNode::from).collect())
    }

    async fn client(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<ClientNode>> {
        let db = database(ctx)?;
        let client_id = parse_uuid(&id)?;
        let record = client::Entity::find_by_id(client_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(ClientNode::from))
    }

    async fn strategies(
        &self,
        ctx: &Context<'_>,
        status: Option<StrategyStatus>,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<StrategyNode>> {
        let db = database(ctx)?;
        let limit = enforce_page_limit(first.unwrap_or(50))?;
        let skip = offset.unwrap_or(0).max(0) as u64;
        let mut query = strategy::Entity::find();
        if let Some(status) = status {
            query = query.filter(strategy::Column::Status.eq(strategy::Status::from(status)));
        }
        let rows = query
            .order_by_desc(strategy::Column::UpdatedAt)
            .limit(limit as u64)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(StrategyNode::from).collect())
    }
}

#[Object]
impl AgencyMutation {
    #[graphql(name = "createOpportunity")]
    async fn create_opportunity(
        &self,
        ctx: &Context<'_>,
        input: NewOpportunityInput,
    ) -> async_graphql::Result<OpportunityNode> {
        let db = database(ctx)?;
        let title = validate_required_text("title", &input.title)?;
        let client_name = validate_required_text("clientName", &input.client_name)?;
        let probability = validate_probability(input.probability)?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let record = opportunity::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            client_name: Set(client_name),
            email: Set(sanitize_optional_filter(input.email)),
            phone: Set(sanitize_optional_filter(input.phone)),
            amount_cents: Set(input.amount_cents),
            probability: Set(probability),
            stage: Set(opportunity::Stage::Prospecting),
            expected_close_date: Set(input.expected_close_date),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db.as_ref())
        .await
        .map_err(db_error)?;
        Ok(record.into())
    }

    #[graphql(name = "updateOpportunity")]
    async fn update_opportunity(
        &self,
        ctx: &Context<'_>,
        input: UpdateOpportunityInput,
    ) -> async_graphql::Result<OpportunityNode> {
        let db = database(ctx)?;
        let opportunity_id = parse_uuid(&input.id)?;
        let existing = opportunity::Entity::find_by_id(opportunity_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Opportunity not found"))?;
        let mut active: opportunity::ActiveModel = existing.into();
        if let Some(title) = &input.title {
            active.title = Set(validate_required_text("title", title)?);
        }
        if let Some(client_name) = &input.client_name {
            active.client_name = Set(validate_required_text("clientName", client_name)?);
        }
        if input.email.is_some() {
            active.email = Set(sanitize_optional_filter(input.email));
        }
        if input.phone.is_some() {
            active.phone = Set(sanitize_optional_filter(input.phone));
        }
        if let Some(amount_cents) = input.amount_cents {
            active.amount_cents = Set(Some(amount_cents));
        }
        if input.probability.is_some() {
            active.probability = Set(validate_probability(input.probability)?);
        }
        if let Some(expected_close_date) = input.expected_close_date {
            active.expected_close_date = Set(Some(expected_close_date));
        }
        if input.notes.is_some() {
            active.notes = Set(input.notes);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(updated.into())
    }

    #[graphql(name = "deleteOpportunity")]
    async fn delete_opportunity(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let db = database(ctx)?;
        let opportunity_id = parse_uuid(&id)?;
        let res = opportunity::Entity::delete_by_id(opportunity_id)
            .exec(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }

    /// Verb-based stage movement: the target stage is recomputed from the
    /// opportunity's current stage, never taken from the client. A `WON`
    /// transition additionally opens a conversion draft.
    #[graphql(name = "moveOpportunityStage")]
    async fn move_opportunity_stage(
        &self,
        ctx: &Context<'_>,
        id: ID,
        transition: StageTransition,
        note: Option<String>,
    ) -> async_graphql::Result<MoveStagePayload> {
        let db = database(ctx)?;
        let ledger = ledger(ctx)?;
        let opportunity_id = parse_uuid(&id)?;
        let verb: Transition = transition.into();
        let span = info_span!("agency.moveStage", transition = verb.as_str());
        let _guard = span.enter();

        let updated = move_opportunity_stage_internal(db.as_ref(), opportunity_id, verb, note)
            .await
            .map_err(stage_move_error)?;

        let conversion_draft = if verb == Transition::Won {
            let today = Local::now().date_naive();
            Some(ClientDraftNode::from(ledger.begin(&updated, today)))
        } else {
            None
        };
        Ok(MoveStagePayload {
            opportunity: updated.into(),
            conversion_draft,
        })
    }

    /// Persists the (possibly edited) draft as a new client. The source
    /// opportunity must already be closed-won; it is not touched by this
    /// call, so a failed write here can simply be retried.
    #[graphql(name = "confirmConversion")]
    async fn confirm_conversion(
        &self,
        ctx: &Context<'_>,
        input: ConversionInput,
    ) -> async_graphql::Result<ClientNode> {
        let db = database(ctx)?;
        let ledger = ledger(ctx)?;
        let opportunity_id = parse_uuid(&input.opportunity_id)?;
        let source = opportunity::Entity::find_by_id(opportunity_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Opportunity not found"))?;
        if source.stage != opportunity::Stage::ClosedWon {
            return Err(validation_error(
                "Only a closed-won opportunity can be converted",
            ));
        }
        let today = Local::now().date_naive();
        let mut draft = ledger
            .pending(opportunity_id)
            .unwrap_or_else(|| ClientDraft::from_opportunity(&source, today));
        apply_draft_edits(&mut draft, &input);
        draft.validate().map_err(pipeline_error)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let record = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name.clone()),
            company: Set(draft.company.clone()),
            email: Set(draft.email.clone()),
            phone: Set(draft.phone.clone()),
            industry: Set(draft.industry.clone()),
            contact_person: Set(draft.contact_person.clone()),
            monthly_value_cents: Set(draft.monthly_value_cents),
            status: Set(draft.status),
            start_date: Set(draft.start_date),
            notes: Set(Some(draft.notes.clone())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db.as_ref())
        .await
        .map_err(client_write_error)?;
        ledger.settle_persisted(opportunity_id);
        Ok(record.into())
    }

    /// Discards the pending draft. The opportunity stays closed-won:
    /// cancelling client creation never reverts the stage transition.
    #[graphql(name = "cancelConversion")]
    async fn cancel_conversion(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "opportunityId")] opportunity_id: ID,
    ) -> async_graphql::Result<bool> {
        let ledger = ledger(ctx)?;
        let opportunity_uuid = parse_uuid(&opportunity_id)?;
        Ok(ledger.cancel(opportunity_uuid))
    }

    #[graphql(name = "createClient")]
    async fn create_client(
        &self,
        ctx: &Context<'_>,
        input: NewClientInput,
    ) -> async_graphql::Result<ClientNode> {
        let db = database(ctx)?;
        let name = validate_required_text("name", &input.name)?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let today = Local::now().date_naive();
        let record = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            company: Set(sanitize_optional_filter(input.company)),
            email: Set(sanitize_optional_filter(input.email)),
            phone: Set(sanitize_optional_filter(input.phone)),
            industry: Set(sanitize_optional_filter(input.industry)),
            contact_person: Set(sanitize_optional_filter(input.contact_person)),
            monthly_value_cents: Set(input.monthly_value_cents),
            status: Set(input
                .status
                .map(client::Status::from)
                .unwrap_or(client::Status::Prospect)),
            start_date: Set(input.start_date.unwrap_or(today)),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db.as_ref())
        .await
        .map_err(client_write_error)?;
        Ok(record.into())
    }

    #[graphql(name = "updateClient")]
    async fn update_client(
        &self,
        ctx: &Context<'_>,
        input: UpdateClientInput,
    ) -> async_graphql::Result<ClientNode> {
        let db = database(ctx)?;
        let client_id = parse_uuid(&input.id)?;
        let existing = client::Entity::find_by_id(client_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Client not found"))?;
        let mut active: client::ActiveModel = existing.into();
        if let Some(name) = &input.name {
            active.name = Set(validate_required_text("name", name)?);
        }
        if input.company.is_some() {
            active.company = Set(sanitize_optional_filter(input.company));
        }
        if input.email.is_some() {
            active.email = Set(sanitize_optional_filter(input.email));
        }
        if input.phone.is_some() {
            active.phone = Set(sanitize_optional_filter(input.phone));
        }
        if input.industry.is_some() {
            active.industry = Set(sanitize_optional_filter(input.industry));
        }
        if input.contact_person.is_some() {
            active.contact_person = Set(sanitize_optional_filter(input.contact_person));
        }
        if let Some(monthly_value_cents) = input.monthly_value_cents {
            active.monthly_value_cents = Set(Some(monthly_value_cents));
        }
        if let Some(status) = input.status {
            active.status = Set(client::Status::from(status));
        }
        if let Some(start_date) = input.start_date {
            active.start_date = Set(start_date);
        }
        if input.notes.is_some() {
            active.notes = Set(input.notes);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(updated.into())
    }

    #[graphql(name = "deleteClient")]
    async fn delete_client(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let db = database(ctx)?;
        let client_id = parse_uuid(&id)?;
        let res = client::Entity::delete_by_id(client_id)
            .exec(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }

    #[graphql(name = "createStrategy")]
    async fn create_strategy(
        &self,
        ctx: &Context<'_>,
        input: NewStrategyInput,
    ) -> async_graphql::Result<StrategyNode> {
        let db = database(ctx)?;
        let title = validate_required_text("title", &input.title)?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let record = strategy::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            description: Set(input.description),
            status: Set(strategy::Status::Created),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db.as_ref())
        .await
        .map_err(db_error)?;
        Ok(record.into())
    }

    /// Review actions share the funnel's machine shape; the new status is
    /// resolved from the strategy's current one.
    #[graphql(name = "reviewStrategy")]
    async fn review_strategy(
        &self,
        ctx: &Context<'_>,
        id: ID,
        action: StrategyAction,
    ) -> async_graphql::Result<StrategyNode> {
        let db = database(ctx)?;
        let strategy_id = parse_uuid(&id)?;
        let existing = strategy::Entity::find_by_id(strategy_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Strategy not found"))?;
        let next = review::resolve(existing.status, action.into())
            .map_err(|err| error_with_code("INVALID_TRANSITION", err.to_string()))?;
        let mut active: strategy::ActiveModel = existing.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(updated.into())
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum OpportunityStage {
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl From<opportunity::Stage> for OpportunityStage {
    fn from(value: opportunity::Stage) -> Self {
        match value {
            opportunity::Stage::Prospecting => OpportunityStage::Prospecting,
            opportunity::Stage::Qualification => OpportunityStage::Qualification,
            opportunity::Stage::Proposal => OpportunityStage::Proposal,
            opportunity::Stage::Negotiation => OpportunityStage::Negotiation,
            opportunity::Stage::ClosedWon => OpportunityStage::ClosedWon,
            opportunity::Stage::ClosedLost => OpportunityStage::ClosedLost,
        }
    }
}

impl From<OpportunityStage> for opportunity::Stage {
    fn from(value: OpportunityStage) -> Self {
        match value {
            OpportunityStage::Prospecting => opportunity::Stage::Prospecting,
            OpportunityStage::Qualification => opportunity::Stage::Qualification,
            OpportunityStage::Proposal => opportunity::Stage::Proposal,
            OpportunityStage::Negotiation => opportunity::Stage::Negotiation,
            OpportunityStage::ClosedWon => opportunity::Stage::ClosedWon,
            OpportunityStage::ClosedLost => opportunity::Stage::ClosedLost,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum StageTransition {
    Forward,
    Backward,
    Won,
    Lost,
    Reopen,
}

impl From<StageTransition> for Transition {
    fn from(value: StageTransition) -> Self {
        match value {
            StageTransition::Forward => Transition::Forward,
            StageTransition::Backward => Transition::Backward,
            StageTransition::Won => Transition::Won,
            StageTransition::Lost => Transition::Lost,
            StageTransition::Reopen => Transition::Reopen,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum PeriodFilter {
    All,
    Today,
    ThisWeek,
    ThisMonth,
    Overdue,
    NoDueDate,
}

impl PeriodFilter {
    fn as_period(self) -> Period {
        match self {
            PeriodFilter::All => Period::All,
            PeriodFilter::Today => Period::Today,
            PeriodFilter::ThisWeek => Period::ThisWeek,
            PeriodFilter::ThisMonth => Period::ThisMonth,
            PeriodFilter::Overdue => Period::Overdue,
            PeriodFilter::NoDueDate => Period::NoDueDate,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClientStatus {
    Prospect,
    Active,
    Inactive,
}

impl From<client::Status> for ClientStatus {
    fn from(value: client::Status) -> Self {
        match value {
            client::Status::Prospect => ClientStatus::Prospect,
            client::Status::Active => ClientStatus::Active,
            client::Status::Inactive => ClientStatus::Inactive,
        }
    }
}

impl From<ClientStatus> for client::Status {
    fn from(value: ClientStatus) -> Self {
        match value {
            ClientStatus::Prospect => client::Status::Prospect,
            ClientStatus::Active => client::Status::Active,
            ClientStatus::Inactive => client::Status::Inactive,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum StrategyStatus {
    Created,
    UnderReview,
    Approved,
    Rejected,
    Executing,
}

impl From<strategy::Status> for StrategyStatus {
    fn from(value: strategy::Status) -> Self {
        match value {
            strategy::Status::Created => StrategyStatus::Created,
            strategy::Status::UnderReview => StrategyStatus::UnderReview,
            strategy::Status::Approved => StrategyStatus::Approved,
            strategy::Status::Rejected => StrategyStatus::Rejected,
            strategy::Status::Executing => StrategyStatus::Executing,
        }
    }
}

impl From<StrategyStatus> for strategy::Status {
    fn from(value: StrategyStatus) -> Self {
        match value {
            StrategyStatus::Created => strategy::Status::Created,
            StrategyStatus::UnderReview => strategy::Status::UnderReview,
            StrategyStatus::Approved => strategy::Status::Approved,
            StrategyStatus::Rejected => strategy::Status::Rejected,
            StrategyStatus::Executing => strategy::Status::Executing,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum StrategyAction {
    Submit,
    Approve,
    Reject,
    Execute,
    Reopen,
}

impl From<StrategyAction> for ReviewAction {
    fn from(value: StrategyAction) -> Self {
        match value {
            StrategyAction::Submit => ReviewAction::Submit,
            StrategyAction::Approve => ReviewAction::Approve,
            StrategyAction::Reject => ReviewAction::Reject,
            StrategyAction::Execute => ReviewAction::Execute,
            StrategyAction::Reopen => ReviewAction::Reopen,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Opportunity")]
pub struct OpportunityNode {
    pub id: ID,
    pub title: String,
    #[graphql(name = "clientName")]
    pub client_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[graphql(name = "amountCents")]
    pub amount_cents: Option<i64>,
    pub probability: Option<i32>,
    pub stage: OpportunityStage,
    #[graphql(name = "expectedCloseDate")]
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<opportunity::Model> for OpportunityNode {
    fn from(model: opportunity::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            title: model.title,
            client_name: model.client_name,
            email: model.email,
            phone: model.phone,
            amount_cents: model.amount_cents,
            probability: model.probability.map(i32::from),
            stage: model.stage.into(),
            expected_close_date: model.expected_close_date,
            notes: model.notes,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Client")]
pub struct ClientNode {
    pub id: ID,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    #[graphql(name = "contactPerson")]
    pub contact_person: Option<String>,
    #[graphql(name = "monthlyValueCents")]
    pub monthly_value_cents: Option<i64>,
    pub status: ClientStatus,
    #[graphql(name = "startDate")]
    pub start_date: NaiveDate,
    pub notes: Option<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<client::Model> for ClientNode {
    fn from(model: client::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            name: model.name,
            company: model.company,
            email: model.email,
            phone: model.phone,
            industry: model.industry,
            contact_person: model.contact_person,
            monthly_value_cents: model.monthly_value_cents,
            status: model.status.into(),
            start_date: model.start_date,
            notes: model.notes,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "StageHistoryEntry")]
pub struct StageHistoryNode {
    pub id: ID,
    #[graphql(name = "opportunityId")]
    pub opportunity_id: ID,
    #[graphql(name = "fromStage")]
    pub from_stage: OpportunityStage,
    #[graphql(name = "toStage")]
    pub to_stage: OpportunityStage,
    pub note: Option<String>,
    #[graphql(name = "changedAt")]
    pub changed_at: DateTime<Utc>,
}

impl From<opportunity_stage_history::Model> for StageHistoryNode {
    fn from(model: opportunity_stage_history::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            opportunity_id: ID::from(model.opportunity_id.to_string()),
            from_stage: model.from_stage.into(),
            to_stage: model.to_stage.into(),
            note: model.note,
            changed_at: model.changed_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Strategy")]
pub struct StrategyNode {
    pub id: ID,
    pub title: String,
    pub description: Option<String>,
    pub status: StrategyStatus,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<strategy::Model> for StrategyNode {
    fn from(model: strategy::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            title: model.title,
            description: model.description,
            status: model.status.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "ClientDraft")]
pub struct ClientDraftNode {
    pub name: String,
    pub company: Option<String>,
    #[graphql(name = "contactPerson")]
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    #[graphql(name = "monthlyValueCents")]
    pub monthly_value_cents: Option<i64>,
    pub status: ClientStatus,
    #[graphql(name = "startDate")]
    pub start_date: NaiveDate,
    pub notes: String,
}

impl From<ClientDraft> for ClientDraftNode {
    fn from(draft: ClientDraft) -> Self {
        Self {
            name: draft.name,
            company: draft.company,
            contact_person: draft.contact_person,
            email: draft.email,
            phone: draft.phone,
            industry: draft.industry,
            monthly_value_cents: draft.monthly_value_cents,
            status: draft.status.into(),
            start_date: draft.start_date,
            notes: draft.notes,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PipelineColumn {
    pub stage: OpportunityStage,
    #[graphql(name = "totalCount")]
    pub total_count: i32,
    #[graphql(name = "totalCents")]
    pub total_cents: i64,
    pub opportunities: Vec<OpportunityNode>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PipelineBoard {
    pub columns: Vec<PipelineColumn>,
    #[graphql(name = "totalCount")]
    pub total_count: i32,
    #[graphql(name = "totalCents")]
    pub total_cents: i64,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct MoveStagePayload {
    pub opportunity: OpportunityNode,
    #[graphql(name = "conversionDraft")]
    pub conversion_draft: Option<ClientDraftNode>,
}

#[derive(InputObject, Clone)]
pub struct NewOpportunityInput {
    pub title: String,
    #[graphql(name = "clientName")]
    pub client_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[graphql(name = "amountCents")]
    pub amount_cents: Option<i64>,
    pub probability: Option<i32>,
    #[graphql(name = "expectedCloseDate")]
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct UpdateOpportunityInput {
    pub id: ID,
    pub title: Option<String>,
    #[graphql(name = "clientName")]
    pub client_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[graphql(name = "amountCents")]
    pub amount_cents: Option<i64>,
    pub probability: Option<i32>,
    #[graphql(name = "expectedCloseDate")]
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct ConversionInput {
    #[graphql(name = "opportunityId")]
    pub opportunity_id: ID,
    pub name: Option<String>,
    pub company: Option<String>,
    #[graphql(name = "contactPerson")]
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    #[graphql(name = "monthlyValueCents")]
    pub monthly_value_cents: Option<i64>,
    pub status: Option<ClientStatus>,
    #[graphql(name = "startDate")]
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct NewClientInput {
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    #[graphql(name = "contactPerson")]
    pub contact_person: Option<String>,
    #[graphql(name = "monthlyValueCents")]
    pub monthly_value_cents: Option<i64>,
    pub status: Option<ClientStatus>,
    #[graphql(name = "startDate")]
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct UpdateClientInput {
    pub id: ID,
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    #[graphql(name = "contactPerson")]
    pub contact_person: Option<String>,
    #[graphql(name = "monthlyValueCents")]
    pub monthly_value_cents: Option<i64>,
    pub status: Option<ClientStatus>,
    #[graphql(name = "startDate")]
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct NewStrategyInput {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug)]
pub enum StageMoveError {
    NotFound,
    Illegal(PipelineError),
    Db(DbErr),
}

impl From<DbErr> for StageMoveError {
    fn from(value: DbErr) -> Self {
        StageMoveError::Db(value)
    }
}

fn stage_move_error(err: StageMoveError) -> Error {
    match err {
        StageMoveError::NotFound => error_with_code("NOT_FOUND", "Opportunity not found"),
        StageMoveError::Illegal(e) => pipeline_error(e),
        StageMoveError::Db(e) => error_with_code(
            "STAGE_WRITE_FAILED",
            format!("Stage update failed: {}", e),
        ),
    }
}

async fn move_opportunity_stage_internal(
    db: &DatabaseConnection,
    opportunity_id: Uuid,
    transition: Transition,
    note: Option<String>,
) -> Result<opportunity::Model, StageMoveError> {
    let txn = db.begin().await?;
    let existing = opportunity::Entity::find_by_id(opportunity_id)
        .one(&txn)
        .await?
        .ok_or(StageMoveError::NotFound)?;

    let from_stage = existing.stage;
    let to_stage = stage::resolve(from_stage, transition).map_err(StageMoveError::Illegal)?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: opportunity::ActiveModel = existing.into();
    active.stage = Set(to_stage);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    let history = opportunity_stage_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        opportunity_id: Set(opportunity_id),
        from_stage: Set(from_stage),
        to_stage: Set(to_stage),
        note: Set(note),
        changed_at: Set(now),
    };
    opportunity_stage_history::Entity::insert(history)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Exposed for seeders/tests to drive the same transactional logic.
pub async fn move_opportunity_stage_service(
    db: &DatabaseConnection,
    opportunity_id: Uuid,
    transition: Transition,
    note: Option<String>,
) -> Result<opportunity::Model, StageMoveError> {
    move_opportunity_stage_internal(db, opportunity_id, transition, note).await
}

fn apply_draft_edits(draft: &mut ClientDraft, input: &ConversionInput) {
    if let Some(name) = &input.name {
        draft.name = name.trim().to_string();
    }
    if let Some(company) = &input.company {
        draft.company = Some(company.clone());
    }
    if let Some(contact_person) = &input.contact_person {
        draft.contact_person = Some(contact_person.clone());
    }
    if let Some(email) = &input.email {
        draft.email = Some(email.clone());
    }
    if let Some(phone) = &input.phone {
        draft.phone = Some(phone.clone());
    }
    if let Some(industry) = &input.industry {
        draft.industry = Some(industry.clone());
    }
    if let Some(monthly_value_cents) = input.monthly_value_cents {
        draft.monthly_value_cents = Some(monthly_value_cents);
    }
    if let Some(status) = input.status {
        draft.status = status.into();
    }
    if let Some(start_date) = input.start_date {
        draft.start_date = start_date;
    }
    if let Some(notes) = &input.notes {
        draft.notes = notes.clone();
    }
}

fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing database connection"))
}

fn ledger(ctx: &Context<'_>) -> async_graphql::Result<Arc<ConversionLedger>> {
    ctx.data::<Arc<ConversionLedger>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing conversion ledger"))
}

fn parse_uuid(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| error_with_code("BAD_REQUEST", "Invalid ID"))
}

fn db_error(err: DbErr) -> Error {
    error_with_code("INTERNAL", format!("Database error: {}", err))
}

fn client_write_error(err: DbErr) -> Error {
    error_with_code(
        "CLIENT_WRITE_FAILED",
        format!("Client creation failed: {}", err),
    )
}

fn pipeline_error(err: PipelineError) -> Error {
    match &err {
        PipelineError::InvalidTransition { .. } => {
            error_with_code("INVALID_TRANSITION", err.to_string())
        }
        PipelineError::Validation { .. } => error_with_code("VALIDATION", err.to_string()),
        PipelineError::NoPendingDraft => error_with_code("NOT_FOUND", err.to_string()),
    }
}

fn error_with_code(code: &'static str, message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", code))
}

fn validation_error(message: impl Into<String>) -> Error {
    error_with_code("VALIDATION", message)
}

fn validate_required_text(field: &'static str, value: &str) -> async_graphql::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(validation_error(format!("{} is required", field)));
    }
    if trimmed.chars().count() > 256 {
        return Err(validation_error(format!(
            "{} must be at most 256 characters",
            field
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_probability(value: Option<i32>) -> async_graphql::Result<Option<i16>> {
    match value {
        None => Ok(None),
        Some(p) if (0..=100).contains(&p) => Ok(Some(p as i16)),
        Some(_) => Err(validation_error("probability must be between 0 and 100")),
    }
}

fn sanitize_optional_filter(value: Option<String>) -> Option<String> {
    value.and_then(|input| {
        let trimmed = input.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

fn enforce_page_limit(requested: i32) -> async_graphql::Result<i32> {
    if requested <= 0 {
        return Err(validation_error("first must be positive"));
    }
    if requested > MAX_PAGE {
        return Err(error_with_code(
            "LIMIT_EXCEEDED",
            format!("Cannot request more than {} records at once", MAX_PAGE),
        ));
    }
    Ok(requested)
}

#[derive(Debug, Clone)]
pub struct SeededAgencyRecords {
    pub opportunities: Vec<opportunity::Model>,
    pub clients: Vec<client::Model>,
    pub strategies: Vec<strategy::Model>,
}

impl SeededAgencyRecords {
    pub fn opportunity_titled(&self, title: &str) -> Option<&opportunity::Model> {
        self.opportunities.iter().find(|o| o.title == title)
    }

    pub fn client_named(&self, name: &str) -> Option<&client::Model> {
        self.clients.iter().find(|c| c.name == name)
    }
}

pub async fn seed_agency_demo(db: &DatabaseConnection) -> Result<SeededAgencyRecords, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let today = Local::now().date_naive();

    let website_revamp = insert_seed_opportunity(
        db,
        "Website Revamp",
        "Acme Corp",
        Some("contact@acme.test"),
        Some(500_000),
        Some(70),
        opportunity::Stage::Negotiation,
        Some(today + Duration::days(4)),
        now,
    )
    .await?;
    let brand_identity = insert_seed_opportunity(
        db,
        "Brand Identity",
        "Horizonte Digital",
        Some("hello@horizonte.test"),
        Some(180_000),
        Some(30),
        opportunity::Stage::Prospecting,
        None,
        now,
    )
    .await?;
    let seo_retainer = insert_seed_opportunity(
        db,
        "SEO Retainer",
        "Loja Mar",
        None,
        Some(90_000),
        Some(40),
        opportunity::Stage::Qualification,
        Some(today - Duration::days(10)),
        now,
    )
    .await?;
    let social_campaign = insert_seed_opportunity(
        db,
        "Social Campaign",
        "Cafe Central",
        Some("social@cafecentral.test"),
        Some(120_000),
        Some(55),
        opportunity::Stage::Proposal,
        Some(today),
        now,
    )
    .await?;
    let ecommerce_launch = insert_seed_opportunity(
        db,
        "E-commerce Launch",
        "Verde Vivo",
        Some("loja@verdevivo.test"),
        Some(350_000),
        Some(100),
        opportunity::Stage::ClosedWon,
        Some(today - Duration::days(20)),
        now,
    )
    .await?;
    let stalled_rebrand = insert_seed_opportunity(
        db,
        "Stalled Rebrand",
        "Ponto Frio Norte",
        None,
        Some(75_000),
        Some(0),
        opportunity::Stage::ClosedLost,
        Some(today - Duration::days(35)),
        now,
    )
    .await?;

    let verde_vivo = client::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Verde Vivo".into()),
        company: Set(Some("Verde Vivo".into())),
        email: Set(Some("loja@verdevivo.test".into())),
        phone: Set(None),
        industry: Set(Some("Retail".into())),
        contact_person: Set(Some("Verde Vivo".into())),
        monthly_value_cents: Set(Some(350_000)),
        status: Set(client::Status::Active),
        start_date: Set(today - Duration::days(18)),
        notes: Set(Some(
            "Cliente convertido da oportunidade: E-commerce Launch".into(),
        )),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let studio_pilar = client::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Studio Pilar".into()),
        company: Set(Some("Studio Pilar Arquitetura".into())),
        email: Set(Some("oi@studiopilar.test".into())),
        phone: Set(Some("+55 11 5555-0101".into())),
        industry: Set(Some("Architecture".into())),
        contact_person: Set(Some("Marina Pilar".into())),
        monthly_value_cents: Set(Some(80_000)),
        status: Set(client::Status::Active),
        start_date: Set(today - Duration::days(120)),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let launch_plan = strategy::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Q3 Launch Plan".into()),
        description: Set(Some("Paid social push for the e-commerce launch.".into())),
        status: Set(strategy::Status::UnderReview),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let content_calendar = strategy::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Content Calendar".into()),
        description: Set(None),
        status: Set(strategy::Status::Created),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(SeededAgencyRecords {
        opportunities: vec![
            website_revamp,
            brand_identity,
            seo_retainer,
            social_campaign,
            ecommerce_launch,
            stalled_rebrand,
        ],
        clients: vec![verde_vivo, studio_pilar],
        strategies: vec![launch_plan, content_calendar],
    })
}

#[allow(clippy::too_many_arguments)]
async fn insert_seed_opportunity(
    db: &DatabaseConnection,
    title: &str,
    client_name: &str,
    email: Option<&str>,
    amount_cents: Option<i64>,
    probability: Option<i16>,
    stage: opportunity::Stage,
    expected_close_date: Option<NaiveDate>,
    now: DateTimeWithTimeZone,
) -> Result<opportunity::Model, DbErr> {
    opportunity::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        client_name: Set(client_name.to_string()),
        email: Set(email.map(str::to_string)),
        phone: Set(None),
        amount_cents: Set(amount_cents),
        probability: Set(probability),
        stage: Set(stage),
        expected_close_date: Set(expected_close_date),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}
