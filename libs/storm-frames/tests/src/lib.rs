#[cfg(test)]
mod tests {
    use arrow::{
        array::{Array, AsArray},
        datatypes::{DataType, Int64Type, TimeUnit, TimestampMillisecondType},
    };
    use futures_lite::future::block_on;
    use jiff::{SignedDuration, Timestamp};
    use serde_json::{Value, json};
    use storm_frames::{
        ColumnValues, Error, Options, QueryRequest, Table, TimeRange,
        classify::{ColumnType, classify},
        decode_response, prepare,
        stream::decode_stream,
        time_vars::{self, format_iso},
        timestamp::normalize,
    };

    fn storm(body: &str) -> Result<Table, Error> {
        decode_response(&QueryRequest::new("q"), body.as_bytes(), "A")
    }

    fn call(body: &str) -> Result<Table, Error> {
        decode_response(&QueryRequest::new("q").with_call(true), body.as_bytes(), "A")
    }

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_stream_single_node() {
        let table = storm(
            r#"["node", [["inet:fqdn","example.com"], {"iden":"abc","props":{"asn":123}}]]
["fini"]"#,
        )
        .unwrap();
        assert_eq!(table.name, "storm");
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.column("form").unwrap().cell_text(0).unwrap(), "inet:fqdn");
        assert_eq!(table.column("value").unwrap().cell_text(0).unwrap(), "example.com");
        assert_eq!(table.column("iden").unwrap().cell_text(0).unwrap(), "abc");
        assert_eq!(
            table.column("asn").unwrap().values,
            ColumnValues::Int(vec![Some(123)])
        );
    }

    #[test]
    fn test_stream_err_yields_no_table() {
        let err = storm(
            r#"["init", {}]
["node", [["inet:fqdn","example.com"], {}]]
["err", ["BadSyntax", "unexpected token"]]
["fini", {}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::RemoteQuery { .. }));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_stream_full_session() {
        let body = r#"["init",{"tick":1700000000000,"text":"inet:fqdn","task":"x"}]
["node",[["inet:fqdn","a.com"],{"iden":"1","tags":{"rep":[null,null],"cno.mal":[null,null]},"props":{".created":1700000000000,"zone":"a.com","issuffix":0},"reprs":{".created":"2023/11/14 22:13:20.000"}}]]
["print",{"mesg":"hello"}]
["node",[["inet:fqdn","b.com"],{"iden":"2","props":{".created":1700000060000,"domain":"com"},"reprs":{".created":"2023/11/14 22:14:20.000"}}]]
["node:edits",{"edits":[]}]
["fini",{"tock":1700000000100,"took":100,"count":2}]
"#;
        let table = storm(body).unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            ["form", "value", "iden", "tags", ".created", "domain", "issuffix", "zone"]
        );
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("tags").unwrap().cell_text(0).unwrap(), "cno.mal, rep");
        assert_eq!(table.column("tags").unwrap().cell_text(1).unwrap(), "");
        assert_eq!(
            table.column(".created").unwrap().values,
            ColumnValues::Time(vec![
                Some(Timestamp::from_millisecond(1700000000000).unwrap()),
                Some(Timestamp::from_millisecond(1700000060000).unwrap()),
            ])
        );
        assert_eq!(
            table.column("zone").unwrap().values,
            ColumnValues::String(vec![Some("a.com".to_string()), None])
        );
        assert_eq!(
            table.column("issuffix").unwrap().values,
            ColumnValues::Int(vec![Some(0), None])
        );
    }

    #[test]
    fn test_stream_async() {
        let messages = futures_lite::stream::iter(vec![
            json!(["node", [["inet:ipv4", 16909060], {"iden": "x"}]]),
            json!(["fini", {}]),
            json!(["node", [["inet:ipv4", 1], {}]]),
        ]);
        let table = block_on(decode_stream(messages, "B")).unwrap();
        assert_eq!(table.ref_id, "B");
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.column("value").unwrap().cell_text(0).unwrap(), "16909060");
    }

    #[test]
    fn test_call_object_list() {
        let table = call(r#"{"status":"ok","result":[{"x":1},{"x":2,"y":"z"}]}"#).unwrap();
        assert_eq!(table.name, "storm_call");
        assert_eq!(
            table.column("x").unwrap().values,
            ColumnValues::Int(vec![Some(1), Some(2)])
        );
        assert_eq!(
            table.column("y").unwrap().values,
            ColumnValues::String(vec![None, Some("z".to_string())])
        );
    }

    #[test]
    fn test_call_scalar() {
        let table = call(r#"{"status":"ok","result":42}"#).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["result"]);
        assert_eq!(
            table.column("result").unwrap().values,
            ColumnValues::String(vec![Some("42".to_string())])
        );
    }

    #[test]
    fn test_call_err_status() {
        let err = call(r#"{"status":"err","code":"NoSuchVar","mesg":"Missing variable: x"}"#)
            .unwrap_err();
        assert_eq!(err.remote_message(), Some("Missing variable: x"));
    }

    #[test]
    fn test_call_invalid_json() {
        assert!(matches!(call("{\"status\": "), Err(Error::Json(_))));
    }

    #[test]
    fn test_seen_column_all_or_nothing() {
        let table = call(r#"[{"seen":1700000000000},{"seen":1700000005000}]"#).unwrap();
        assert_eq!(table.column("seen").unwrap().column_type(), ColumnType::Time);

        let table = call(r#"[{"seen":1700000000000},{"seen":"yesterday"}]"#).unwrap();
        assert_eq!(table.column("seen").unwrap().column_type(), ColumnType::String);
    }

    #[test]
    fn test_classify_examples() {
        let cases = [
            (json!([1, 2, 3]), ColumnType::Int),
            (json!([1, 2.5]), ColumnType::Float),
            (json!(["a", 1]), ColumnType::String),
            (json!([true, false]), ColumnType::Bool),
            (json!([]), ColumnType::String),
        ];
        for (values, expected) in cases {
            let values = values.as_array().unwrap().clone();
            assert_eq!(classify(values.iter()), expected, "{values:?}");
        }
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            json!(1700000000123i64),
            json!("1700000000123"),
            json!("1700000000"),
            json!("2024-05-06T07:08:09.5Z"),
            json!("2024-05-06T07:08:09+02:00"),
            json!("2024-05-06 07:08:09"),
        ];
        for input in inputs {
            let first = normalize(&input).unwrap();
            let again = normalize(&Value::String(format_iso(first))).unwrap();
            assert_eq!(first, again, "{input}");
        }
    }

    #[test]
    fn test_injector_monotonicity() {
        let base = ts("2024-01-01T00:00:00Z");
        let offsets = [-90_000i64, -1, 0, 1, 3_600_000];
        for offset in offsets {
            let other = base
                .checked_add(SignedDuration::from_millis(offset))
                .unwrap();
            let mut vars = serde_json::Map::new();
            time_vars::inject(&mut vars, &TimeRange::new(base, other));
            let from = vars["timeFromMs"].as_i64().unwrap();
            let to = vars["timeToMs"].as_i64().unwrap();
            assert_eq!(from <= to, base <= other, "offset {offset}");
        }
    }

    #[test]
    fn test_prepare_round_trip() {
        let mut opts = Options::new();
        opts.insert("limit", json!(10));
        opts.insert("vars", json!({"timeFrom": "stale", "fqdn": "a.com"}));
        let request = QueryRequest::new("inet:fqdn=$fqdn").with_opts(opts);
        let range = TimeRange::new(ts("2024-01-01T00:00:00Z"), ts("2024-01-01T01:00:00.250Z"));
        let prepared = prepare(request, &range).unwrap();

        assert_eq!(prepared.path(), "/api/v1/storm");
        let vars = &prepared.body["opts"]["vars"];
        assert_eq!(vars["fqdn"], json!("a.com"));
        assert_eq!(vars["timeFrom"], json!("2024-01-01T00:00:00.000Z"));
        assert_eq!(vars["timeTo"], json!("2024-01-01T01:00:00.250Z"));
        assert_eq!(vars["timeToMs"], json!(1704070800250i64));
        assert_eq!(vars["timeToSec"], json!(1704070800));
        assert_eq!(prepared.body["opts"]["limit"], json!(10));

        assert!(matches!(
            prepare(QueryRequest::new(""), &range),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_record_batch_from_stream() {
        let table = storm(
            r#"["node",[["inet:fqdn","a.com"],{"props":{"asn":1,".seen":[1,2],"updated":1700000000000}}]]
["node",[["inet:fqdn","b.com"],{"props":{"updated":"bogus"}}]]
["fini",{}]"#,
        )
        .unwrap();
        let batch = table.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().metadata()["name"], "storm");

        let schema = batch.schema();
        let (idx, field) = schema.column_with_name("updated").unwrap();
        assert_eq!(
            field.data_type(),
            &DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
        );
        let updated = batch.column(idx).as_primitive::<TimestampMillisecondType>();
        assert_eq!(updated.value(0), 1700000000000);
        assert!(updated.is_null(1));

        let (idx, _) = schema.column_with_name("asn").unwrap();
        let asn = batch.column(idx).as_primitive::<Int64Type>();
        assert_eq!(asn.value(0), 1);
        assert!(asn.is_null(1));
    }
}
