mod form_stat;
mod response;
mod template;
mod trend;

use std::fmt::Display;

use async_graphql::{
    types::connection::{Connection, Edge, EmptyFields},
    Context, EmptyMutation, EmptySubscription, MergedObject, OutputType, Result,
};
use base64::{engine::general_purpose, Engine as _};

use crate::{
    database::Database,
    model::{Form, Response},
};

/// The default page size for connections when neither `first` nor `last` is provided.
const DEFAULT_PAGE_SIZE: usize = 100;

/// A set of queries defined in the schema.
///
/// This is exposed only for [`Schema`], and not used directly.
#[derive(Default, MergedObject)]
pub struct Query(
    form_stat::FormStatQuery,
    response::ResponseQuery,
    template::TemplateQuery,
    trend::TrendQuery,
);

pub type Schema = async_graphql::Schema<Query, EmptyMutation, EmptySubscription>;

pub fn schema(database: Database) -> Schema {
    Schema::build(Query::default(), EmptyMutation, EmptySubscription)
        .data(database)
        .finish()
}

/// The current snapshot of a form and its responses.
fn load_form(ctx: &Context<'_>, form_id: i64) -> Result<(Form, Vec<Response>)> {
    let db = ctx.data::<Database>()?;
    let form = db
        .form(form_id)
        .map_err(|e| format!("failed to read database: {e}"))?
        .ok_or("form not found")?;
    let responses = db
        .responses(form_id)
        .map_err(|e| format!("failed to read database: {e}"))?;
    Ok((form, responses))
}

fn connect_cursor<T>(
    select_vec: Vec<T>,
    prev: bool,
    next: bool,
) -> Connection<String, T, EmptyFields, EmptyFields>
where
    T: OutputType + Display,
{
    let mut connection: Connection<String, T, EmptyFields, EmptyFields> =
        Connection::new(prev, next);
    for output in select_vec {
        connection.edges.push(Edge::new(
            general_purpose::STANDARD.encode(format!("{output}")),
            output,
        ));
    }
    connection
}

/// Pages through `nodes`, whose cursors are their base64-encoded `Display`
/// output. A cursor that matches no node is an error.
fn load_connection<N>(
    nodes: Vec<N>,
    after: Option<String>,
    before: Option<String>,
    first: Option<usize>,
    last: Option<usize>,
) -> Result<Connection<String, N, EmptyFields, EmptyFields>>
where
    N: Display + OutputType,
{
    let (nodes, has_previous, has_next) = if let Some(before) = before {
        if after.is_some() {
            return Err("cannot use both `after` and `before`".into());
        }
        if first.is_some() {
            return Err("'before' and 'first' cannot be specified simultaneously".into());
        }
        let last = last.unwrap_or(DEFAULT_PAGE_SIZE);
        let end = cursor_position(&nodes, &before)?;
        let iter = nodes.into_iter().take(end).rev();
        let (mut nodes, has_previous) = collect_nodes(iter, last);
        nodes.reverse();
        (nodes, has_previous, false)
    } else if let Some(after) = after {
        if last.is_some() {
            return Err("'after' and 'last' cannot be specified simultaneously".into());
        }
        let first = first.unwrap_or(DEFAULT_PAGE_SIZE);
        let start = cursor_position(&nodes, &after)? + 1;
        let iter = nodes.into_iter().skip(start);
        let (nodes, has_next) = collect_nodes(iter, first);
        (nodes, false, has_next)
    } else if let Some(last) = last {
        if first.is_some() {
            return Err("first and last cannot be used together".into());
        }
        let iter = nodes.into_iter().rev();
        let (mut nodes, has_previous) = collect_nodes(iter, last);
        nodes.reverse();
        (nodes, has_previous, false)
    } else {
        let first = first.unwrap_or(DEFAULT_PAGE_SIZE);
        let (nodes, has_next) = collect_nodes(nodes.into_iter(), first);
        (nodes, false, has_next)
    };
    Ok(connect_cursor(nodes, has_previous, has_next))
}

fn cursor_position<N: Display>(nodes: &[N], cursor: &str) -> Result<usize> {
    let key = String::from_utf8(general_purpose::STANDARD.decode(cursor)?)?;
    nodes
        .iter()
        .position(|node| node.to_string() == key)
        .ok_or_else(|| "invalid cursor".into())
}

fn collect_nodes<I, T>(iter: I, size: usize) -> (Vec<T>, bool)
where
    I: Iterator<Item = T>,
{
    let mut iter = iter.peekable();
    let nodes: Vec<T> = iter.by_ref().take(size).collect();
    let has_more = iter.peek().is_some();
    (nodes, has_more)
}

#[cfg(test)]
struct TestSchema {
    db: Database,
    schema: Schema,
}

#[cfg(test)]
impl TestSchema {
    fn new() -> Self {
        let db = Database::default();
        let schema = schema(db.clone());
        Self { db, schema }
    }

    async fn execute(&self, query: &str) -> async_graphql::Response {
        let request: async_graphql::Request = query.into();
        self.schema.execute(request).await
    }
}
