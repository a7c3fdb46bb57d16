use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use bizplan_ai::{
    ChatMessage, Generation, TextGenerator, narrate_investment, narrate_tax_strategies,
};
use bizplan_core::calculations::{
    BusinessProfile, InvestmentComparator, InvestmentProfile, SalaryDividendComparator,
};
use bizplan_core::{
    CalculationKind, ConstantTable, IncomeBracket, NewCalculationRecord, PlannerError,
    PlannerRepository, RepositoryError, User,
};

use crate::dto::{
    ChatRequest, InvestmentData, InvestmentRequest, RankingView, StrategyView, TaxStrategyData,
    TaxStrategyRequest, VehicleView,
};

/// Request orchestration: validate, compute, narrate, then record.
///
/// Computation errors fail the request. Narration and persistence are best
/// effort and only ever degrade the response.
#[derive(Clone)]
pub struct PlannerService {
    table: Arc<ConstantTable>,
    repository: Arc<dyn PlannerRepository>,
    generator: Arc<dyn TextGenerator>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl PlannerService {
    pub fn new(
        table: Arc<ConstantTable>,
        repository: Arc<dyn PlannerRepository>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            table,
            repository,
            generator,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.generator.provider_name()
    }

    pub async fn plan_tax_strategies(
        &self,
        request: TaxStrategyRequest,
    ) -> Result<TaxStrategyData, PlannerError> {
        let profile = BusinessProfile {
            revenue: request.revenue,
            expenses_percentage: request.expenses_percentage,
            withdrawal_amount: request.withdrawal_amount,
        };
        let strategies = SalaryDividendComparator::new(&self.table)?.compare(&profile)?;

        let province = non_blank(request.province.as_deref());
        let narrative =
            narrate_tax_strategies(self.generator.as_ref(), &profile, &strategies, province)
                .await;

        let mut data = TaxStrategyData {
            sequence: 1,
            strategies: strategies
                .iter()
                .zip(narrative.insights)
                .map(|(strategy, insight)| StrategyView::new(strategy, insight))
                .collect(),
            recommendation: narrative.recommendation,
        };

        let kind = CalculationKind::TaxStrategy;
        let user = self.resolve_user(request.email.as_deref()).await;
        data.sequence = self.next_sequence(user.as_ref(), kind).await;
        self.record(kind, user.as_ref(), data.sequence, &request, &data)
            .await;

        info!(
            kind = kind.as_str(),
            sequence = data.sequence,
            generated = narrative.generated,
            "tax strategies computed"
        );
        Ok(data)
    }

    pub async fn plan_investment(
        &self,
        request: InvestmentRequest,
    ) -> Result<InvestmentData, PlannerError> {
        let profile = InvestmentProfile {
            amount: request.amount,
            rrsp_room: request.rrsp_room,
            current_income: IncomeBracket::from_label("currentIncome", &request.current_income)?,
            retirement_income: IncomeBracket::from_label(
                "retirementIncome",
                &request.retirement_income,
            )?,
            years: request.years,
        };
        let comparison = InvestmentComparator::new(&self.table)?.compare(&profile)?;

        let province = non_blank(request.province.as_deref());
        let narrative =
            narrate_investment(self.generator.as_ref(), &profile, &comparison, province).await;

        let mut data = InvestmentData {
            sequence: 1,
            strategies: comparison.results.iter().map(VehicleView::from).collect(),
            ranking: comparison.ranking.iter().map(RankingView::from).collect(),
            summary: narrative.summary,
            considerations: narrative.considerations,
        };

        let kind = CalculationKind::Investment;
        let user = self.resolve_user(request.email.as_deref()).await;
        data.sequence = self.next_sequence(user.as_ref(), kind).await;
        self.record(kind, user.as_ref(), data.sequence, &request, &data)
            .await;

        info!(
            kind = kind.as_str(),
            sequence = data.sequence,
            generated = narrative.generated,
            "investment strategies computed"
        );
        Ok(data)
    }

    /// Forwards a conversation to the provider. Provider failures come back
    /// inside the [`Generation`], never as an error.
    pub async fn chat(
        &self,
        request: ChatRequest,
    ) -> Result<Generation, PlannerError> {
        let messages: Vec<ChatMessage> = request
            .messages
            .into_iter()
            .filter(|m| !m.content.trim().is_empty())
            .collect();
        if messages.is_empty() {
            return Err(PlannerError::validation(
                "messages must contain at least one non-empty message",
            ));
        }

        let category = request.category.unwrap_or_default();
        let result = self.generator.complete(&messages, category).await;
        if let Err(e) = &result {
            warn!(provider = self.provider_name(), category = category.as_str(), error = %e, "chat generation failed");
        }
        Ok(result.into())
    }

    async fn resolve_user(&self, email: Option<&str>) -> Option<User> {
        let email = non_blank(email)?;
        match self.repository.find_user_by_email(email).await {
            Ok(user) => Some(user),
            Err(RepositoryError::NotFound) => {
                debug!("no user registered for email; recording anonymously");
                None
            }
            Err(e) => {
                warn!(error = %e, "user lookup failed; recording anonymously");
                None
            }
        }
    }

    /// Prior calculations of `kind` for this user, plus one.
    ///
    /// Best effort: the count and the later insert are separate statements,
    /// so concurrent requests from one user can share a sequence number.
    /// Anonymous callers and counting failures get 1.
    async fn next_sequence(
        &self,
        user: Option<&User>,
        kind: CalculationKind,
    ) -> i64 {
        let Some(user) = user else {
            return 1;
        };
        match self
            .repository
            .count_calculations_for_user(user.id, kind)
            .await
        {
            Ok(count) => count + 1,
            Err(e) => {
                warn!(user_id = user.id, kind = kind.as_str(), error = %e, "counting prior calculations failed");
                1
            }
        }
    }

    async fn record(
        &self,
        kind: CalculationKind,
        user: Option<&User>,
        sequence: i64,
        input: &impl Serialize,
        result: &impl Serialize,
    ) {
        let (input, result) = match (serde_json::to_value(input), serde_json::to_value(result)) {
            (Ok(input), Ok(result)) => (input, result),
            (Err(e), _) | (_, Err(e)) => {
                warn!(kind = kind.as_str(), error = %e, "calculation could not be serialized for the audit trail");
                return;
            }
        };

        let record = NewCalculationRecord {
            kind,
            user_id: user.map(|u| u.id),
            sequence,
            input,
            result,
        };
        if let Err(e) = self.repository.record_calculation(record).await {
            warn!(kind = kind.as_str(), sequence, error = %e, "failed to record calculation");
        }
    }
}
