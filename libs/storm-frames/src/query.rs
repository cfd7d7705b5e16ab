//! Preparing outbound requests and turning response bodies into tables.

use std::io::Read;

use serde_json::Value;
use tracing::{debug, info};

use crate::Error;
use crate::request::{Endpoint, QueryRequest};
use crate::table::Table;
use crate::time_vars::TimeRange;
use crate::{call, stream};

/// What the transport layer needs to send: the endpoint and the JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedQuery {
    pub endpoint: Endpoint,
    pub body: Value,
}

impl PreparedQuery {
    pub fn path(&self) -> &'static str {
        self.endpoint.path()
    }
}

/// Validates the request, injects the time variables and builds the body.
///
/// The request is taken by value since injection rewrites `opts.vars`.
pub fn prepare(mut request: QueryRequest, range: &TimeRange) -> Result<PreparedQuery, Error> {
    request.validate()?;
    request.inject_time_range(range);
    let endpoint = request.endpoint();
    info!(path = endpoint.path(), query = %request.storm_query, "prepared storm query");
    Ok(PreparedQuery {
        endpoint,
        body: request.body(),
    })
}

/// Decodes a response body with the decoder matching the request's endpoint.
pub fn decode_response(
    request: &QueryRequest,
    mut body: impl Read,
    ref_id: &str,
) -> Result<Table, Error> {
    let table = match request.endpoint() {
        Endpoint::Storm => stream::decode_reader(body, ref_id)?,
        Endpoint::Call => {
            let mut buf = Vec::new();
            body.read_to_end(&mut buf)?;
            call::decode_body(&buf, ref_id, request.opts.flatten())?
        }
    };
    debug!(
        name = %table.name,
        rows = table.num_rows(),
        columns = table.columns.len(),
        "decoded storm response"
    );
    Ok(table)
}
