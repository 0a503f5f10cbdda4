//! Fibery schema and entity client
//!
//! Each operation builds one command list, sends it in a single POST and
//! interprets the response. Nothing is kept between calls.

use crate::command::{Command, EntityArgs, Query, QueryArgs, QueryLimit};
use crate::config::ClientConfig;
use crate::error::{FiberyError, FiberyResult};
use crate::identity::{IdentityKeys, RecordIdentity};
use crate::log::LogSink;
use crate::schema::{qualified_type, SchemaDescriptor};
use crate::transport::{HttpTransport, RemoteResponse, Transport};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// One record: attribute name to value
pub type Record = Map<String, Value>;

/// Remote wording for a database that is already there
const ALREADY_EXISTS: &str = "already exists";

/// Client for one Fibery workspace
pub struct FiberyClient<T: Transport> {
    transport: T,
    log: Arc<dyn LogSink>,
    identity_keys: IdentityKeys,
}

impl FiberyClient<HttpTransport> {
    /// Connect over HTTP using `config`
    pub fn connect(config: &ClientConfig, log: Arc<dyn LogSink>) -> FiberyResult<Self> {
        let transport = HttpTransport::new(config)?;
        log.debug(format_args!("API_FIBERY_URL: {}", transport.url()));
        Ok(Self::new(transport, log).with_identity_keys(config.identity_keys.clone()))
    }
}

impl<T: Transport> FiberyClient<T> {
    /// Create client over any transport
    pub fn new(transport: T, log: Arc<dyn LogSink>) -> Self {
        Self {
            transport,
            log,
            identity_keys: IdentityKeys::default(),
        }
    }

    /// With identity attributes
    #[must_use]
    pub fn with_identity_keys(mut self, keys: IdentityKeys) -> Self {
        self.identity_keys = keys;
        self
    }

    /// Identity attributes in use
    #[inline]
    #[must_use]
    pub fn identity_keys(&self) -> &IdentityKeys {
        &self.identity_keys
    }

    async fn send(&self, commands: &[Command]) -> FiberyResult<RemoteResponse> {
        let payload = serde_json::to_value(commands)?;
        self.log.debug(format_args!(
            "sending {} command(s): {}",
            commands.len(),
            commands.first().map_or("-", Command::name)
        ));

        let response = match self.transport.post(&payload).await {
            Ok(response) => response,
            Err(err) => {
                self.log.error(format_args!("{err}"));
                return Err(err.into());
            }
        };

        if !response.is_success() {
            self.log
                .error(format_args!("Error {}: {}", response.status, response.body));
        }
        response.require_success()
    }

    /// Confirm the endpoint and token work
    pub async fn verify(&self) -> FiberyResult<()> {
        self.send(&[Command::schema_query()]).await.map_err(|err| {
            self.log.error(format_args!("Failed to get schema: {err}"));
            err
        })?;
        Ok(())
    }

    /// Create database `schema` in `app`
    ///
    /// `Ok(true)` when created or already present, `Ok(false)` when the
    /// response could not be interpreted.
    pub async fn create_schema(
        &self,
        app: &str,
        schema: &str,
        fields: &IndexMap<String, String>,
    ) -> FiberyResult<bool> {
        let descriptor = SchemaDescriptor::build(app, schema, fields)?;
        let response = self.send(&[Command::create_type(descriptor)]).await?;

        let Some(first) = response
            .json()
            .ok()
            .and_then(|body| body.as_array().and_then(|list| list.first().cloned()))
        else {
            self.log
                .error(format_args!("Unexpected response format or empty response."));
            return Ok(false);
        };

        if first.get("success").and_then(Value::as_bool) == Some(true) {
            self.log.success(format_args!(
                "Database \"{schema}\" was created in app \"{app}\"."
            ));
            return Ok(true);
        }

        let message = first
            .pointer("/result/message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if message.contains(ALREADY_EXISTS) {
            self.log
                .warning(format_args!("Database {schema} was exist: {message}"));
            return Ok(true);
        }

        let err = FiberyError::SchemaRejected {
            schema: schema.to_string(),
            app: app.to_string(),
            message: message.to_string(),
        };
        self.log.error(format_args!("{err}"));
        Err(err)
    }

    /// Bare field name to bare field type of `schema`
    ///
    /// Advisory: an unreadable body yields an empty map.
    pub async fn list_fields(
        &self,
        app: &str,
        schema: &str,
    ) -> FiberyResult<IndexMap<String, String>> {
        let response = self
            .send(&[Command::schema_query_for(app, schema)])
            .await?;

        match response.json() {
            Ok(body) => Ok(extract_fields(&body, app, schema)),
            Err(err) => {
                self.log.error(format_args!("Failed to get fields: {err}"));
                Ok(IndexMap::new())
            }
        }
    }

    /// Delete `schema` with its entities and dependent fields
    ///
    /// Never fails; the outcome is logged and returned.
    pub async fn delete_schema(&self, app: &str, schema: &str) -> bool {
        let entity_type = qualified_type(app, schema);
        match self.send(&[Command::delete_type(app, schema)]).await {
            Ok(_) => {
                self.log.success(format_args!(
                    "Database {schema} in app {app} \"{entity_type}\" was successfully deleted."
                ));
                true
            }
            Err(err) => {
                self.log
                    .error(format_args!("Error deleting entity type '{entity_type}': {err}"));
                false
            }
        }
    }

    /// Create one entity per record in a single batch
    pub async fn add_records(
        &self,
        app: &str,
        schema: &str,
        records: &[Record],
    ) -> FiberyResult<Value> {
        self.add_records_keyed(app, schema, records, &self.identity_keys)
            .await
    }

    /// Create one entity per record, identities taken from `keys`
    pub async fn add_records_keyed(
        &self,
        app: &str,
        schema: &str,
        records: &[Record],
        keys: &IdentityKeys,
    ) -> FiberyResult<Value> {
        let type_name = qualified_type(app, schema);
        let commands: Vec<Command> = self
            .identified(records, keys)?
            .into_iter()
            .map(|(id, record)| {
                let mut entity = Map::with_capacity(record.len() + 1);
                entity.insert("fibery/id".to_string(), Value::String(id.to_string()));
                for (key, value) in record {
                    entity.insert(format!("{schema}/{key}"), value.clone());
                }
                Command::EntityCreate {
                    args: EntityArgs {
                        type_name: type_name.clone(),
                        entity,
                    },
                }
            })
            .collect();

        let body = self.send(&commands).await?.json()?;
        self.log.success(format_args!(
            "Data added to the database {schema} in app {app}."
        ));
        Ok(body)
    }

    /// Delete one entity per record in a single batch
    ///
    /// Result `i` of the response is attributed to surviving record `i`.
    pub async fn delete_records(
        &self,
        app: &str,
        schema: &str,
        records: &[Record],
    ) -> FiberyResult<Value> {
        self.delete_records_keyed(app, schema, records, &self.identity_keys)
            .await
    }

    /// Delete one entity per record, identities taken from `keys`
    pub async fn delete_records_keyed(
        &self,
        app: &str,
        schema: &str,
        records: &[Record],
        keys: &IdentityKeys,
    ) -> FiberyResult<Value> {
        let type_name = qualified_type(app, schema);
        let identified = self.identified(records, keys)?;
        let commands: Vec<Command> = identified
            .iter()
            .map(|(id, _)| {
                let mut entity = Map::with_capacity(1);
                entity.insert("fibery/id".to_string(), Value::String(id.to_string()));
                Command::EntityDelete {
                    args: EntityArgs {
                        type_name: type_name.clone(),
                        entity,
                    },
                }
            })
            .collect();

        let body = self.send(&commands).await?.json()?;
        self.log.success(format_args!("Data deleted successfully:"));

        let Some(results) = body.as_array() else {
            self.log.warning(format_args!(
                "Unexpected delete response shape, per-record results unavailable"
            ));
            return Ok(body);
        };

        for (index, (_, record)) in identified.iter().enumerate() {
            let shown = Value::Object((*record).clone());
            match results.get(index) {
                Some(result) if result.get("success").and_then(Value::as_bool) == Some(true) => {
                    self.log
                        .success(format_args!("Delete data {shown} with result: true"));
                }
                Some(result) => {
                    let reason = result
                        .pointer("/result/name")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown");
                    self.log.error(format_args!(
                        "Delete data {shown} with result: false. Error: {reason}"
                    ));
                }
                None => {
                    self.log
                        .error(format_args!("Delete data {shown}: no result returned"));
                }
            }
        }

        Ok(body)
    }

    /// Read every row of `schema`, projecting `fields`
    pub async fn query_records<S: AsRef<str>>(
        &self,
        app: &str,
        schema: &str,
        fields: &[S],
    ) -> FiberyResult<Value> {
        self.query_records_limited(app, schema, fields, QueryLimit::Unbounded)
            .await
    }

    /// Read rows of `schema` up to `limit`
    pub async fn query_records_limited<S: AsRef<str>>(
        &self,
        app: &str,
        schema: &str,
        fields: &[S],
        limit: QueryLimit,
    ) -> FiberyResult<Value> {
        if fields.is_empty() {
            return Err(FiberyError::NoFieldsRequested);
        }

        let query = Query {
            from: qualified_type(app, schema),
            select: fields
                .iter()
                .map(|field| format!("{schema}/{}", field.as_ref()))
                .collect(),
            limit,
        };
        let response = self
            .send(&[Command::EntityQuery {
                args: QueryArgs { query },
            }])
            .await
            .map_err(|err| {
                self.log.error(format_args!("Failed to get data: {err}"));
                err
            })?;

        let body = response.json()?;
        if !body.is_array() {
            return Err(FiberyError::malformed("entity query result is not a list"));
        }
        Ok(body)
    }

    fn identified<'r>(
        &self,
        records: &'r [Record],
        keys: &IdentityKeys,
    ) -> FiberyResult<Vec<(RecordIdentity, &'r Record)>> {
        if records.is_empty() {
            return Err(FiberyError::NoDataProvided);
        }

        let identified: Vec<_> = records
            .iter()
            .filter_map(|record| {
                let id = RecordIdentity::from_record(record, keys);
                if id.is_none() {
                    self.log.warning(format_args!(
                        "Skipping record without '{}' or '{}': {}",
                        keys.name,
                        keys.age,
                        Value::Object(record.clone())
                    ));
                }
                id.map(|id| (id, record))
            })
            .collect();

        if identified.is_empty() {
            return Err(FiberyError::NoValidEntities);
        }
        Ok(identified)
    }
}

/// Rows of an entity query response (element 0's `result`)
#[must_use]
pub fn result_rows(response: &Value) -> &[Value] {
    response
        .pointer("/0/result")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn extract_fields(body: &Value, app: &str, schema: &str) -> IndexMap<String, String> {
    let type_name = qualified_type(app, schema);
    let app_prefix = format!("{app}/");
    let schema_prefix = format!("{schema}/");

    body.pointer("/0/result/fibery~1types")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|ty| ty.get("fibery/name").and_then(Value::as_str) == Some(type_name.as_str()))
        .filter_map(|ty| ty.get("fibery/fields").and_then(Value::as_array))
        .flatten()
        .filter_map(|field| {
            let name = field.get("fibery/name")?.as_str()?;
            let ty = field.get("fibery/type")?.as_str()?;
            (name.starts_with(&app_prefix) || name.starts_with(&schema_prefix))
                .then(|| (last_segment(name), last_segment(ty)))
        })
        .collect()
}

/// Trailing `/` segment, trimmed
#[must_use]
pub fn last_segment(qualified: &str) -> String {
    qualified
        .rsplit('/')
        .next()
        .unwrap_or(qualified)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::log::TracingLog;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn client(transport: MockTransport) -> FiberyClient<MockTransport> {
        FiberyClient::new(transport, TracingLog::shared("test"))
            .with_identity_keys(IdentityKeys::new("Name", "Age"))
    }

    fn never_called() -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_post().never();
        transport
    }

    fn fields(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn unsupported_type_sends_nothing() {
        let client = client(never_called());
        let err = client
            .create_schema("App", "Db", &fields(&[("Name", "text"), ("Pic", "image")]))
            .await
            .unwrap_err();
        assert!(matches!(err, FiberyError::UnsupportedFieldType { .. }));
    }

    #[tokio::test]
    async fn empty_inputs_send_nothing() {
        let client = client(never_called());
        assert!(matches!(
            client.add_records("App", "Db", &[]).await,
            Err(FiberyError::NoDataProvided)
        ));
        assert!(matches!(
            client.delete_records("App", "Db", &[]).await,
            Err(FiberyError::NoDataProvided)
        ));
        assert!(matches!(
            client.query_records::<&str>("App", "Db", &[]).await,
            Err(FiberyError::NoFieldsRequested)
        ));
    }

    #[tokio::test]
    async fn all_records_without_identity_send_nothing() {
        let client = client(never_called());
        let records = vec![record(json!({"Name": "A"})), record(json!({"Age": 3}))];
        assert!(matches!(
            client.delete_records("App", "Db", &records).await,
            Err(FiberyError::NoValidEntities)
        ));
    }

    #[tokio::test]
    async fn already_exists_is_success() {
        let mut transport = MockTransport::new();
        transport.expect_post().times(1).returning(|_| {
            Ok(RemoteResponse::new(
                200,
                r#"[{"success": false, "result": {"message": "database already exists"}}]"#,
            ))
        });
        let created = client(transport)
            .create_schema("App", "Db", &fields(&[("Name", "text")]))
            .await
            .unwrap();
        assert!(created);
    }

    #[tokio::test]
    async fn other_rejection_is_error() {
        let mut transport = MockTransport::new();
        transport.expect_post().times(1).returning(|_| {
            Ok(RemoteResponse::new(
                200,
                r#"[{"success": false, "result": {"message": "app not found"}}]"#,
            ))
        });
        let err = client(transport)
            .create_schema("App", "Db", &fields(&[("Name", "text")]))
            .await
            .unwrap_err();
        assert!(matches!(err, FiberyError::SchemaRejected { ref message, .. } if message == "app not found"));
    }

    #[tokio::test]
    async fn unexpected_create_body_is_false() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .returning(|_| Ok(RemoteResponse::new(200, "{}")));
        let created = client(transport)
            .create_schema("App", "Db", &fields(&[("Name", "text")]))
            .await
            .unwrap();
        assert!(!created);
    }

    #[tokio::test]
    async fn verify_sends_bare_schema_query() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|payload| payload == &json!([{"command": "fibery.schema/query"}]))
            .times(1)
            .returning(|_| Ok(RemoteResponse::new(200, r#"[{"success": true}]"#)));
        client(transport).verify().await.unwrap();
    }

    #[tokio::test]
    async fn verify_fails_on_bad_status_and_transport_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Ok(RemoteResponse::new(400, r#"{"error": "Bad Request"}"#)));
        let err = client(transport).verify().await.unwrap_err();
        assert!(err.to_string().contains("Bad Request"));

        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Err(TransportError::Send("Mocked request exception".to_string())));
        let err = client(transport).verify().await.unwrap_err();
        assert!(matches!(err, FiberyError::Api(_)));
        assert!(err.to_string().contains("failed to send data to Fibery"));
    }

    #[tokio::test]
    async fn delete_schema_swallows_failures() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Err(TransportError::Send("connection refused".to_string())));
        assert!(!client(transport).delete_schema("App", "Db").await);

        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Ok(RemoteResponse::new(500, "oops")));
        assert!(!client(transport).delete_schema("App", "Db").await);
    }

    #[tokio::test]
    async fn add_records_qualifies_attributes() {
        let expected_id = RecordIdentity::derive("A", "1").to_string();
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(move |payload| {
                payload
                    == &json!([{
                        "command": "fibery.entity/create",
                        "args": {
                            "type": "App/Db",
                            "entity": {"fibery/id": expected_id, "Db/Name": "A", "Db/Age": 1}
                        }
                    }])
            })
            .times(1)
            .returning(|_| Ok(RemoteResponse::new(200, r#"[{"success": true}]"#)));
        let body = client(transport)
            .add_records("App", "Db", &[record(json!({"Name": "A", "Age": 1}))])
            .await
            .unwrap();
        assert_eq!(body, json!([{"success": true}]));
    }

    #[tokio::test]
    async fn query_selects_qualified_fields_without_limit() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|payload| {
                payload
                    == &json!([{
                        "command": "fibery.entity/query",
                        "args": {"query": {
                            "q/from": "App/Db",
                            "q/select": ["Db/Name", "Db/Age"],
                            "q/limit": "q/no-limit"
                        }}
                    }])
            })
            .returning(|_| {
                Ok(RemoteResponse::new(
                    200,
                    r#"[{"success": true, "result": [{"Db/Name": "Test"}]}]"#,
                ))
            });
        let body = client(transport)
            .query_records("App", "Db", &["Name", "Age"])
            .await
            .unwrap();
        assert_eq!(result_rows(&body), &[json!({"Db/Name": "Test"})]);
    }

    #[tokio::test]
    async fn query_limit_is_sent_as_count() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|payload| payload[0]["args"]["query"]["q/limit"] == json!(1))
            .times(1)
            .returning(|_| Ok(RemoteResponse::new(200, r#"[{"success": true, "result": []}]"#)));
        let body = client(transport)
            .query_records_limited("App", "Db", &["Name"], QueryLimit::Count(1))
            .await
            .unwrap();
        assert!(result_rows(&body).is_empty());
    }

    #[tokio::test]
    async fn keyed_add_overrides_client_keys() {
        let expected_id = RecordIdentity::derive("A", "1").to_string();
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(move |payload| payload[0]["args"]["entity"]["fibery/id"] == json!(expected_id))
            .times(1)
            .returning(|_| Ok(RemoteResponse::new(200, r#"[{"success": true}]"#)));
        let keys = IdentityKeys::new("Host", "Cores");
        client(transport)
            .add_records_keyed("App", "Db", &[record(json!({"Host": "A", "Cores": 1}))], &keys)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn query_rejects_non_list_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .returning(|_| Ok(RemoteResponse::new(200, r#"{"result": []}"#)));
        let err = client(transport)
            .query_records("App", "Db", &["Name"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[test]
    fn extract_fields_filters_and_strips() {
        let body = json!([{
            "success": true,
            "result": {"fibery/types": [
                {"fibery/name": "Other/Thing", "fibery/fields": [
                    {"fibery/name": "Thing/X", "fibery/type": "fibery/text"}
                ]},
                {"fibery/name": "App/Db", "fibery/fields": [
                    {"fibery/name": "Db/Name", "fibery/type": "fibery/text"},
                    {"fibery/name": "fibery/id", "fibery/type": "fibery/uuid"},
                    {"fibery/name": "App/Owner", "fibery/type": "App/Person"},
                    {"fibery/name": "Db/Age", "fibery/type": "fibery/int"}
                ]}
            ]}
        }]);
        let fields = extract_fields(&body, "App", "Db");
        assert_eq!(
            fields.into_iter().collect::<Vec<_>>(),
            vec![
                ("Name".to_string(), "text".to_string()),
                ("Owner".to_string(), "Person".to_string()),
                ("Age".to_string(), "int".to_string()),
            ]
        );
        assert!(extract_fields(&json!({"nope": 1}), "App", "Db").is_empty());
    }

    #[test]
    fn result_rows_tolerates_missing_result() {
        assert!(result_rows(&json!([])).is_empty());
        assert!(result_rows(&json!([{"success": false}])).is_empty());
    }
}
