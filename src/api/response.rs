use std::fmt;

use async_graphql::{
    connection::{query, Connection, EmptyFields},
    Context, Object, Result,
};

use crate::{
    analytics::{filter_responses, ResponseFilter, ResponseView},
    api::{self, load_form},
    model::Response,
};

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Default)]
pub(super) struct ResponseQuery {}

#[Object]
impl ResponseQuery {
    /// The responses of a form that pass every active filter.
    async fn responses(
        &self,
        ctx: &Context<'_>,
        form_id: i64,
        #[graphql(default)] filters: Vec<ResponseFilter>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<String, Response, EmptyFields, EmptyFields>> {
        let (form, responses) = load_form(ctx, form_id)?;
        let responses = filter_responses(responses, &filters, &form.question_index());
        query(
            after,
            before,
            first,
            last,
            |after, before, first, last| async move {
                api::load_connection(responses, after, before, first, last)
            },
        )
        .await
    }

    /// One response with its answers rendered for reading.
    #[allow(clippy::unused_async)]
    async fn response_view(
        &self,
        ctx: &Context<'_>,
        form_id: i64,
        response_id: i64,
    ) -> Result<ResponseView> {
        let (form, responses) = load_form(ctx, form_id)?;
        let response = responses
            .iter()
            .find(|response| response.id == response_id)
            .ok_or("response not found")?;
        Ok(ResponseView::new(&form, response))
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose, Engine as _};
    use serde_json::json;

    use crate::api::tests::seeded;

    fn ids(data: &serde_json::Value) -> Vec<i64> {
        data["responses"]["edges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|edge| edge["node"]["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn first_page_and_cursor() {
        let schema = seeded();
        let query = r"
        {
            responses(formId: 1, first: 2) {
                edges { cursor node { id } }
                pageInfo { hasNextPage hasPreviousPage }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();

        assert_eq!(ids(&data), vec![1, 2]);
        assert_eq!(
            data["responses"]["edges"][1]["cursor"],
            general_purpose::STANDARD.encode("2")
        );
        assert_eq!(
            data["responses"]["pageInfo"],
            json!({"hasNextPage": true, "hasPreviousPage": false})
        );
    }

    #[tokio::test]
    async fn after_and_before_cursors() {
        let schema = seeded();
        let after = general_purpose::STANDARD.encode("2");
        let query = format!(
            r#"
        {{
            responses(formId: 1, after: "{after}") {{
                edges {{ node {{ id }} }}
                pageInfo {{ hasNextPage }}
            }}
        }}"#
        );
        let data = schema.execute(&query).await.data.into_json().unwrap();
        assert_eq!(ids(&data), vec![3, 4]);
        assert_eq!(data["responses"]["pageInfo"]["hasNextPage"], false);

        let before = general_purpose::STANDARD.encode("4");
        let query = format!(
            r#"
        {{
            responses(formId: 1, before: "{before}", last: 2) {{
                edges {{ node {{ id }} }}
                pageInfo {{ hasPreviousPage }}
            }}
        }}"#
        );
        let data = schema.execute(&query).await.data.into_json().unwrap();
        assert_eq!(ids(&data), vec![2, 3]);
        assert_eq!(data["responses"]["pageInfo"]["hasPreviousPage"], true);
    }

    #[tokio::test]
    async fn filtered_connection() {
        let schema = seeded();
        let query = r"
        {
            responses(formId: 1, filters: [{questionId: 1, choiceId: 12}]) {
                edges { node { id createdAt } }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(ids(&data), vec![4]);
    }

    #[tokio::test]
    async fn unknown_cursor_is_an_error() {
        let schema = seeded();
        let after = general_purpose::STANDARD.encode("99");
        let query = format!(r#"{{ responses(formId: 1, after: "{after}") {{ edges {{ cursor }} }} }}"#);
        let res = schema.execute(&query).await;
        assert_eq!(res.errors[0].message, "invalid cursor");
    }

    #[tokio::test]
    async fn view_of_one_response() {
        let schema = seeded();
        let query = r"
        {
            responseView(formId: 1, responseId: 2) {
                responseId
                answers { questionText display }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["responseView"],
            json!({
                "responseId": 2,
                "answers": [
                    {"questionText": "Toppings", "display": "A, B"},
                    {"questionText": "Comment", "display": "blue ocean"},
                ]
            })
        );

        let query = "{ responseView(formId: 1, responseId: 3) { answers { display } } }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["responseView"]["answers"],
            json!([{"display": null}, {"display": null}])
        );
    }
}
