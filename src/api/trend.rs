use async_graphql::{Context, Object, Result};
use tracing::debug;

use crate::{
    analytics::{Analysis, ResponseFilter, TrendMode, TrendPoint},
    api::load_form,
};

#[derive(Default)]
pub(super) struct TrendQuery {}

#[Object]
impl TrendQuery {
    /// Filtered responses counted per day or per week, oldest first.
    #[allow(clippy::unused_async)]
    async fn response_trend(
        &self,
        ctx: &Context<'_>,
        form_id: i64,
        #[graphql(default)] filters: Vec<ResponseFilter>,
        #[graphql(default)] mode: TrendMode,
    ) -> Result<Vec<TrendPoint>> {
        let (form, responses) = load_form(ctx, form_id)?;
        let trend = Analysis::new(&form, responses, &filters).trend(mode);
        debug!(form_id, ?mode, buckets = trend.len(), "Built response trend");
        Ok(trend)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::tests::seeded;

    #[tokio::test]
    async fn daily_is_the_default() {
        let schema = seeded();
        let query = r"
        {
            responseTrend(formId: 1) { key label count }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["responseTrend"],
            json!([
                {"key": "2025-01-05", "label": "1/5/2025", "count": 1},
                {"key": "2025-01-06", "label": "1/6/2025", "count": 2},
                {"key": "2025-01-13", "label": "1/13/2025", "count": 1},
            ])
        );
    }

    #[tokio::test]
    async fn weekly_with_filter() {
        let schema = seeded();
        let query = r"
        {
            responseTrend(formId: 1, mode: WEEKLY, filters: [{questionId: 1, choiceId: 10}]) {
                label
                count
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["responseTrend"],
            json!([{"label": "Week of 1/5/2025", "count": 2}])
        );
    }
}
