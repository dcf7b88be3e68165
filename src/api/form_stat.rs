use async_graphql::{Context, Object, Result, SimpleObject};
use tracing::debug;

use crate::{
    analytics::{Analysis, FormOverview, QuestionSummary, ResponseFilter},
    api::load_form,
};

#[derive(Default)]
pub(super) struct FormStatQuery {}

#[derive(SimpleObject)]
struct FormStat {
    overview: FormOverview,

    /// One summary per question, in display order.
    questions: Vec<QuestionSummary>,
}

#[Object]
impl FormStatQuery {
    /// Statistics over the responses of a form that pass every active filter.
    #[allow(clippy::unused_async)]
    async fn form_stat(
        &self,
        ctx: &Context<'_>,
        form_id: i64,
        #[graphql(default)] filters: Vec<ResponseFilter>,
    ) -> Result<FormStat> {
        let (form, responses) = load_form(ctx, form_id)?;
        let analysis = Analysis::new(&form, responses, &filters);
        debug!(
            form_id,
            total = analysis.overview.total_responses,
            filtered = analysis.overview.filtered_responses,
            "Summarizing form"
        );

        Ok(FormStat {
            questions: analysis.summaries(&form),
            overview: analysis.overview,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::tests::seeded;

    #[tokio::test]
    async fn choice_distribution() {
        let schema = seeded();
        let query = r"
        {
            formStat(formId: 1) {
                overview { totalResponses filteredResponses questionCount sectionCount activeFilterCount }
                questions {
                    questionId
                    questionType
                    answers {
                        ... on ChoiceSummary {
                            denominator
                            choices { text count percent }
                        }
                    }
                }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        let stat = &data["formStat"];

        assert_eq!(
            stat["overview"],
            json!({
                "totalResponses": 4,
                "filteredResponses": 4,
                "questionCount": 2,
                "sectionCount": 1,
                "activeFilterCount": 0,
            })
        );
        assert_eq!(stat["questions"][0]["questionType"], "MULTIPLE_SELECT");
        assert_eq!(stat["questions"][0]["answers"]["denominator"], 4);
        assert_eq!(
            stat["questions"][0]["answers"]["choices"],
            json!([
                {"text": "A", "count": 2, "percent": 50},
                {"text": "B", "count": 2, "percent": 50},
                {"text": "C", "count": 1, "percent": 25},
            ])
        );
    }

    #[tokio::test]
    async fn filters_narrow_the_summary() {
        let schema = seeded();
        let query = r#"
        {
            formStat(formId: 1, filters: [
                {questionId: 1, choiceId: 11},
                {questionId: 2, textQuery: "  BLUE "}
            ]) {
                overview { filteredResponses activeFilterCount }
                questions {
                    answers {
                        ... on TextSummary {
                            answerCount
                            topAnswers { text count }
                            keywords { keyword count }
                        }
                    }
                }
            }
        }"#;
        let data = schema.execute(query).await.data.into_json().unwrap();
        let stat = &data["formStat"];

        assert_eq!(stat["overview"]["filteredResponses"], 1);
        assert_eq!(stat["overview"]["activeFilterCount"], 2);
        assert_eq!(stat["questions"][1]["answers"]["answerCount"], 1);
        assert_eq!(
            stat["questions"][1]["answers"]["topAnswers"],
            json!([{"text": "blue ocean", "count": 1}])
        );
        assert_eq!(
            stat["questions"][1]["answers"]["keywords"],
            json!([{"keyword": "blue", "count": 1}, {"keyword": "ocean", "count": 1}])
        );
    }
}
