//! Derived views over one form and its responses.
//!
//! Everything here is a pure function of its inputs. Callers filter first
//! and hand the filtered responses to the summaries and the trend builder.

pub mod filter;
pub mod summary;
pub mod trend;
pub mod view;

use async_graphql::SimpleObject;

pub use self::filter::{active_filters, filter_responses, MediaMode, ResponseFilter};
pub use self::summary::{summarize, AnswerSummary, QuestionSummary};
pub use self::trend::{build_trend, TrendMode, TrendPoint};
pub use self::view::ResponseView;
use crate::model::{Form, Response};

/// Headline numbers for a form.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct FormOverview {
    pub total_responses: usize,
    /// Responses left after the active filters.
    pub filtered_responses: usize,
    pub question_count: usize,
    pub section_count: usize,
    pub active_filter_count: usize,
}

/// A filtered analysis of one form.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub overview: FormOverview,
    pub responses: Vec<Response>,
}

impl Analysis {
    pub fn new(form: &Form, responses: Vec<Response>, filters: &[ResponseFilter]) -> Self {
        let questions = form.question_index();
        let total_responses = responses.len();
        let active_filter_count = active_filters(filters, &questions).len();
        let responses = filter_responses(responses, filters, &questions);

        Self {
            overview: FormOverview {
                total_responses,
                filtered_responses: responses.len(),
                question_count: form.questions().count(),
                section_count: form.sections.len(),
                active_filter_count,
            },
            responses,
        }
    }

    /// One summary per question, in display order.
    pub fn summaries(&self, form: &Form) -> Vec<QuestionSummary> {
        form.questions()
            .map(|question| summarize(question, &self.responses))
            .collect()
    }

    pub fn trend(&self, mode: TrendMode) -> Vec<TrendPoint> {
        build_trend(&self.responses, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;
    use crate::template;

    #[test]
    fn overview_counts_filtered_and_total() {
        let form = template::normalize(&serde_json::json!({
            "sections": [
                {"questions": [{"id": 1, "text": "Mood", "question_type": "short_text"}]},
                {"questions": [{"id": 2, "text": "Age", "question_type": "number"}]}
            ]
        }));
        let responses: Vec<Response> = ["happy", "sad", "happy again"]
            .into_iter()
            .zip(1..)
            .map(|(text, id)| Response {
                id,
                created_at: "2025-02-02T12:00:00Z".to_string(),
                answers: vec![Answer {
                    question: 1,
                    text_answer: Some(text.to_string()),
                    ..Default::default()
                }],
            })
            .collect();
        let filters = [
            ResponseFilter {
                question_id: Some(1),
                text_query: Some("happy".to_string()),
                ..Default::default()
            },
            ResponseFilter::default(),
        ];
        let analysis = Analysis::new(&form, responses, &filters);

        assert_eq!(
            analysis.overview,
            FormOverview {
                total_responses: 3,
                filtered_responses: 2,
                question_count: 2,
                section_count: 2,
                active_filter_count: 1,
            }
        );
        assert_eq!(analysis.summaries(&form).len(), 2);
        assert_eq!(analysis.trend(TrendMode::Weekly)[0].count, 2);
    }
}
