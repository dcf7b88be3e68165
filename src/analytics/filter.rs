use std::collections::HashMap;

use async_graphql::{Enum, InputObject};
use serde::{Deserialize, Serialize};

use crate::model::{Question, Response};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaMode {
    WithFile,
    WithoutFile,
}

impl MediaMode {
    fn matches(self, has_file: bool) -> bool {
        match self {
            Self::WithFile => has_file,
            Self::WithoutFile => !has_file,
        }
    }
}

/// A per-question predicate chosen in the analytics view.
///
/// Only the field matching the question's type is consulted: `choice_id` for
/// choice questions, `media_mode` for uploads, `text_query` otherwise.
#[derive(InputObject, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ResponseFilter {
    /// Client-side identifier of the filter row.
    #[graphql(default)]
    #[serde(default)]
    pub id: i64,
    /// The question this filter applies to.
    pub question_id: Option<i64>,
    /// Required choice for `MULTIPLE_CHOICE` and `MULTIPLE_SELECT` questions.
    pub choice_id: Option<i64>,
    /// Case-insensitive substring for free-text questions.
    pub text_query: Option<String>,
    /// Upload status for `MEDIA` questions.
    pub media_mode: Option<MediaMode>,
}

impl ResponseFilter {
    /// The question this filter constrains, if the filter is active.
    ///
    /// A filter is active when it names a known question and carries a
    /// non-empty value of the kind that question's type needs.
    fn target<'a>(&self, questions: &HashMap<i64, &'a Question>) -> Option<&'a Question> {
        let question = *questions.get(&self.question_id?)?;
        let question_type = question.question_type;
        let has_value = (question_type.is_choice() && self.choice_id.is_some())
            || (question_type.is_media() && self.media_mode.is_some())
            || (question_type.is_text() && self.query().is_some());
        has_value.then_some(question)
    }

    fn query(&self) -> Option<String> {
        self.text_query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase)
    }

    /// A response without an answer to the question passes.
    fn matches(&self, question: &Question, response: &Response) -> bool {
        let Some(answer) = question.id.and_then(|id| response.answer_for(id)) else {
            return true;
        };
        if question.question_type.is_choice() {
            self.choice_id
                .is_none_or(|choice| answer.selected_choices.contains(&choice))
        } else if question.question_type.is_media() {
            self.media_mode
                .is_none_or(|mode| mode.matches(answer.has_file()))
        } else {
            self.query().is_none_or(|query| {
                answer
                    .text_answer
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&query)
            })
        }
    }
}

/// The filters that actually constrain the result, in input order.
pub fn active_filters<'f>(
    filters: &'f [ResponseFilter],
    questions: &HashMap<i64, &Question>,
) -> Vec<&'f ResponseFilter> {
    filters
        .iter()
        .filter(|filter| filter.target(questions).is_some())
        .collect()
}

/// Keeps the responses that satisfy every active filter, preserving order.
pub fn filter_responses(
    responses: Vec<Response>,
    filters: &[ResponseFilter],
    questions: &HashMap<i64, &Question>,
) -> Vec<Response> {
    let active: Vec<(&ResponseFilter, &Question)> = filters
        .iter()
        .filter_map(|filter| filter.target(questions).map(|question| (filter, question)))
        .collect();
    if active.is_empty() {
        return responses;
    }

    responses
        .into_iter()
        .filter(|response| {
            active
                .iter()
                .all(|(filter, question)| filter.matches(question, response))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Form};
    use crate::template;

    fn form() -> Form {
        template::normalize(&serde_json::json!({
            "title": "Survey",
            "sections": [{"questions": [
                {"id": 1, "text": "Color", "question_type": "multiple_choice",
                 "choices": [{"id": 10, "text": "Red"}, {"id": 11, "text": "Blue"}]},
                {"id": 2, "text": "Photo", "question_type": "media"},
                {"id": 3, "text": "Comment", "question_type": "long_text"}
            ]}]
        }))
    }

    fn response(id: i64, choice: i64, file: Option<&str>, comment: &str) -> Response {
        Response {
            id,
            created_at: "2025-01-05T00:00:00Z".to_string(),
            answers: vec![
                Answer {
                    question: 1,
                    selected_choices: vec![choice],
                    ..Default::default()
                },
                Answer {
                    question: 2,
                    file_answer: file.map(str::to_string),
                    ..Default::default()
                },
                Answer {
                    question: 3,
                    text_answer: Some(comment.to_string()),
                    ..Default::default()
                },
            ],
        }
    }

    fn responses() -> Vec<Response> {
        vec![
            response(1, 10, Some("/media/a.png"), "Loved the Venue"),
            response(2, 11, None, "venue was cold"),
            response(3, 10, None, "great food"),
        ]
    }

    fn ids(responses: &[Response]) -> Vec<i64> {
        responses.iter().map(|r| r.id).collect()
    }

    fn choice_filter(choice: i64) -> ResponseFilter {
        ResponseFilter {
            question_id: Some(1),
            choice_id: Some(choice),
            ..Default::default()
        }
    }

    #[test]
    fn filter_by_choice() {
        let form = form();
        let index = form.question_index();
        let filtered = filter_responses(responses(), &[choice_filter(10)], &index);
        assert_eq!(ids(&filtered), vec![1, 3]);
    }

    #[test]
    fn filter_by_media_mode() {
        let form = form();
        let index = form.question_index();
        let with_file = ResponseFilter {
            question_id: Some(2),
            media_mode: Some(MediaMode::WithFile),
            ..Default::default()
        };
        let without_file = ResponseFilter {
            media_mode: Some(MediaMode::WithoutFile),
            ..with_file.clone()
        };

        assert_eq!(ids(&filter_responses(responses(), &[with_file], &index)), vec![1]);
        assert_eq!(
            ids(&filter_responses(responses(), &[without_file], &index)),
            vec![2, 3]
        );
    }

    #[test]
    fn filter_by_text_is_case_insensitive_and_trimmed() {
        let form = form();
        let index = form.question_index();
        let filter = ResponseFilter {
            question_id: Some(3),
            text_query: Some("  VENUE ".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_responses(responses(), &[filter], &index)), vec![1, 2]);
    }

    #[test]
    fn active_filters_combine_with_and() {
        let form = form();
        let index = form.question_index();
        let text = ResponseFilter {
            question_id: Some(3),
            text_query: Some("venue".to_string()),
            ..Default::default()
        };
        let filtered = filter_responses(responses(), &[choice_filter(10), text], &index);
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn inactive_filters_are_ignored() {
        let form = form();
        let index = form.question_index();
        let inactive = vec![
            ResponseFilter::default(),
            ResponseFilter {
                question_id: Some(99),
                choice_id: Some(10),
                ..Default::default()
            },
            ResponseFilter {
                question_id: Some(1),
                text_query: Some("red".to_string()),
                ..Default::default()
            },
            ResponseFilter {
                question_id: Some(3),
                text_query: Some("   ".to_string()),
                ..Default::default()
            },
            ResponseFilter {
                question_id: Some(2),
                choice_id: Some(10),
                ..Default::default()
            },
        ];

        assert!(active_filters(&inactive, &index).is_empty());
        assert_eq!(
            ids(&filter_responses(responses(), &inactive, &index)),
            vec![1, 2, 3]
        );

        let mut with_active = inactive.clone();
        with_active.push(choice_filter(11));
        assert_eq!(active_filters(&with_active, &index).len(), 1);
        assert_eq!(
            ids(&filter_responses(responses(), &with_active, &index)),
            vec![2]
        );
    }

    #[test]
    fn missing_answer_passes() {
        let form = form();
        let index = form.question_index();
        let mut all = responses();
        all.push(Response {
            id: 4,
            created_at: String::new(),
            answers: vec![],
        });

        let filtered = filter_responses(all, &[choice_filter(11)], &index);
        assert_eq!(ids(&filtered), vec![2, 4]);
    }
}
