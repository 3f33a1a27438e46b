use std::{convert::Infallible, net::SocketAddr};

use async_graphql::http::GraphiQLSource;
use async_graphql_warp::{GraphQLBadRequest, GraphQLResponse};
use tracing::info;
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::api::Schema;

const GRAPHQL_PATH: &str = "graphql";

/// Serves the GraphQL API at `/graphql`. A browser `GET` gets GraphiQL.
pub async fn serve(schema: Schema, addr: SocketAddr) {
    let graphql_post = async_graphql_warp::graphql(schema).and_then(
        |(schema, request): (Schema, async_graphql::Request)| async move {
            Ok::<_, Infallible>(GraphQLResponse::from(schema.execute(request).await))
        },
    );
    let graphiql = warp::get().map(|| {
        warp::reply::html(
            GraphiQLSource::build()
                .endpoint(&format!("/{GRAPHQL_PATH}"))
                .finish(),
        )
    });

    let routes = warp::path(GRAPHQL_PATH)
        .and(warp::path::end())
        .and(graphql_post.or(graphiql))
        .recover(recover);

    info!("Listening on http://{addr}/{GRAPHQL_PATH}");
    warp::serve(routes).run(addr).await;
}

async fn recover(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(GraphQLBadRequest(err)) = err.find() {
        return Ok(warp::reply::with_status(
            err.to_string(),
            StatusCode::BAD_REQUEST,
        ));
    }
    Ok(warp::reply::with_status(
        "not found".to_string(),
        StatusCode::NOT_FOUND,
    ))
}
