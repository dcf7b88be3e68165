use std::{convert::Infallible, net::SocketAddr};

use async_graphql::http::GraphiQLSource;
use async_graphql_warp::{GraphQLBadRequest, GraphQLResponse};
use tracing::info;
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::api::Schema;

const ENDPOINT: &str = "/graphql";

/// Serves the GraphQL API on `addr` until the process stops.
pub async fn serve(schema: Schema, addr: SocketAddr) {
    info!("Listening on http://{addr}{ENDPOINT}");
    warp::serve(routes(schema)).run(addr).await;
}

/// `POST /graphql` executes queries; `GET /graphql` serves GraphiQL.
fn routes(schema: Schema) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let graphiql = warp::path!("graphql")
        .and(warp::get())
        .map(|| warp::reply::html(GraphiQLSource::build().endpoint(ENDPOINT).finish()));

    let graphql = warp::path!("graphql")
        .and(warp::post())
        .and(async_graphql_warp::graphql(schema))
        .and_then(
            |(schema, request): (Schema, async_graphql::Request)| async move {
                Ok::<_, Infallible>(GraphQLResponse::from(schema.execute(request).await))
            },
        );

    graphiql.or(graphql).recover(|err: Rejection| async move {
        if let Some(GraphQLBadRequest(err)) = err.find() {
            return Ok::<_, Infallible>(warp::reply::with_status(
                err.to_string(),
                StatusCode::BAD_REQUEST,
            ));
        }
        if err.is_not_found() {
            return Ok(warp::reply::with_status(
                "NOT_FOUND".to_string(),
                StatusCode::NOT_FOUND,
            ));
        }
        Ok(warp::reply::with_status(
            "INTERNAL_SERVER_ERROR".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    })
}
