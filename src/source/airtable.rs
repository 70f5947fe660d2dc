use chrono::FixedOffset;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::mapping::ColumnMapping;
use super::row::{Cell, normalize_row};
use super::{DataSource, LoadReport};
use crate::error::DashboardError;
use crate::fetch::{BasicClient, BearerAuth, HttpClient, fetch_json};
use crate::nutrients::Nutrient;

const API_BASE: &str = "https://api.airtable.com/v0";

/// Airtable's maximum page size.
const PAGE_SIZE: &str = "100";

/// The three values needed to read one Airtable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableCredentials {
    pub token: String,
    pub base_id: String,
    pub table_id: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    records: Vec<AirtableRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Reads every record of an Airtable table, following pagination.
pub struct AirtableSource<C> {
    client: C,
    base_id: String,
    table_id: String,
    mapping: ColumnMapping,
    zone: FixedOffset,
}

impl AirtableSource<BearerAuth<BasicClient>> {
    /// Builds a source that talks to the public Airtable API.
    pub fn connect(
        credentials: &AirtableCredentials,
        mapping: ColumnMapping,
        zone: FixedOffset,
    ) -> anyhow::Result<Self> {
        let client = BearerAuth::new(BasicClient::new()?, &credentials.token)?;
        Ok(Self::with_client(
            client,
            &credentials.base_id,
            &credentials.table_id,
            mapping,
            zone,
        ))
    }
}

impl<C: HttpClient> AirtableSource<C> {
    pub fn with_client(
        client: C,
        base_id: &str,
        table_id: &str,
        mapping: ColumnMapping,
        zone: FixedOffset,
    ) -> Self {
        Self {
            client,
            base_id: base_id.to_string(),
            table_id: table_id.to_string(),
            mapping,
            zone,
        }
    }

    fn page_url(&self, offset: Option<&str>) -> Result<Url, DashboardError> {
        let mut url = Url::parse(API_BASE).map_err(|e| DashboardError::unavailable(self.name(), e))?;

        url.path_segments_mut()
            .map_err(|_| DashboardError::unavailable(self.name(), "API base cannot hold a path"))?
            .push(&self.base_id)
            .push(&self.table_id);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", PAGE_SIZE);
            if let Some(offset) = offset {
                query.append_pair("offset", offset);
            }
        }

        Ok(url)
    }

    fn field<'a>(&self, record: &'a AirtableRecord, column: &str) -> Cell<'a> {
        Cell::from_json(record.fields.get(column))
    }
}

#[async_trait::async_trait]
impl<C: HttpClient> DataSource for AirtableSource<C> {
    fn name(&self) -> String {
        format!("airtable:{}/{}", self.base_id, self.table_id)
    }

    #[tracing::instrument(skip(self), fields(base_id = %self.base_id, table_id = %self.table_id))]
    async fn load(&self) -> Result<LoadReport, DashboardError> {
        let mut report = LoadReport::default();
        let mut offset: Option<String> = None;
        let mut seen_columns = [false; Nutrient::COUNT];
        let mut row = 0;
        let mut pages = 0;

        loop {
            let url = self.page_url(offset.as_deref())?;
            let page: Page = fetch_json(&self.client, url)
                .await
                .map_err(|e| DashboardError::unavailable(self.name(), format!("{e:#}")))?;
            pages += 1;
            debug!(page = pages, records = page.records.len(), "Airtable page received");

            for record in &page.records {
                row += 1;
                for (i, n) in Nutrient::ALL.into_iter().enumerate() {
                    seen_columns[i] |= record.fields.contains_key(self.mapping.nutrient(n));
                }

                let parsed = normalize_row(
                    row,
                    self.field(record, self.mapping.date()),
                    self.field(record, self.mapping.item_name()),
                    Nutrient::ALL
                        .into_iter()
                        .map(|n| (n, self.field(record, self.mapping.nutrient(n)))),
                    &self.zone,
                );
                if let Err(e) = &parsed {
                    debug!(record_id = %record.id, error = %e, "Airtable record rejected");
                }
                report.push(parsed);
            }

            match page.offset {
                Some(next) if offset.as_deref() == Some(next.as_str()) => {
                    return Err(DashboardError::unavailable(
                        self.name(),
                        format!("pagination offset '{next}' returned twice"),
                    ));
                }
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        if !report.records.is_empty() {
            for (i, n) in Nutrient::ALL.into_iter().enumerate() {
                if !seen_columns[i] {
                    warn!(nutrient = %n, column = self.mapping.nutrient(n), "Nutrient column absent, treating as zero");
                }
            }
        }

        info!(
            source = %self.name(),
            pages,
            records = report.records.len(),
            rejected = report.rejected.len(),
            "Loaded nutrition table"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned responses and records what was requested.
    #[derive(Clone, Default)]
    struct ScriptedClient {
        responses: Arc<Mutex<VecDeque<(u16, String)>>>,
        requests: Arc<Mutex<Vec<(String, Option<String>)>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<(u16, Value)>) -> Self {
            let responses = responses
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect();
            Self {
                responses: Arc::new(Mutex::new(responses)),
                requests: Arc::default(),
            }
        }

        fn requests(&self) -> Vec<(String, Option<String>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for ScriptedClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let auth = req
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .map(|v| v.to_str().unwrap().to_string());
            self.requests
                .lock()
                .unwrap()
                .push((req.url().to_string(), auth));

            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra request");
            let resp = http::Response::builder().status(status).body(body).unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    fn sgt() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn source(client: &ScriptedClient) -> AirtableSource<BearerAuth<ScriptedClient>> {
        AirtableSource::with_client(
            BearerAuth::new(client.clone(), "pat123").unwrap(),
            "appBase",
            "tblFood",
            ColumnMapping::airtable(),
            sgt(),
        )
    }

    #[tokio::test]
    async fn test_follows_pagination_and_sends_token() {
        let client = ScriptedClient::new(vec![
            (
                200,
                json!({
                    "records": [
                        {"id": "rec1", "fields": {"Input Date": "2024-01-01", "Food Name": "Rice", "Calories (kcal)": 200}},
                        {"id": "rec2", "fields": {"Input Date": "2024-01-01", "Food Name": "Egg", "Calories (kcal)": 70, "Protein (g)": 6.3}}
                    ],
                    "offset": "itrNext/rec2"
                }),
            ),
            (
                200,
                json!({
                    "records": [
                        {"id": "rec3", "fields": {"Input Date": "2024-01-02", "Food Name": "Rice", "Calories (kcal)": "200"}}
                    ]
                }),
            ),
        ]);

        let report = source(&client).load().await.unwrap();

        assert_eq!(report.records.len(), 3);
        assert!(report.rejected.is_empty());
        assert_eq!(report.records[1].item_name, "Egg");
        assert_eq!(report.records[1].nutrients[Nutrient::Protein], 6.3);
        assert_eq!(report.records[2].nutrients[Nutrient::Calories], 200.0);

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].0,
            "https://api.airtable.com/v0/appBase/tblFood?pageSize=100"
        );
        assert!(requests[1].0.contains("offset=itrNext%2Frec2"));
        assert_eq!(requests[0].1.as_deref(), Some("Bearer pat123"));
    }

    #[tokio::test]
    async fn test_bad_records_are_rejected_with_position() {
        let client = ScriptedClient::new(vec![(
            200,
            json!({
                "records": [
                    {"id": "rec1", "fields": {"Input Date": "2024-01-01", "Food Name": "Rice"}},
                    {"id": "rec2", "fields": {"Food Name": "Egg"}},
                    {"id": "rec3", "fields": {"Input Date": "2024-01-01", "Food Name": "Tea", "Sugar (g)": -2}}
                ]
            }),
        )]);

        let report = source(&client).load().await.unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(matches!(report.rejected[0], DashboardError::DataFormat { row: 2, .. }));
        assert!(matches!(report.rejected[1], DashboardError::DataFormat { row: 3, .. }));
    }

    #[tokio::test]
    async fn test_repeated_offset_stops_loading() {
        let page = json!({
            "records": [
                {"id": "rec1", "fields": {"Input Date": "2024-01-01", "Food Name": "Rice"}}
            ],
            "offset": "itrSame"
        });
        let client = ScriptedClient::new(vec![(200, page.clone()), (200, page)]);

        let err = source(&client).load().await.unwrap_err();

        assert!(matches!(err, DashboardError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("itrSame"));
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_absent_nutrient_field_loads_as_zero() {
        let client = ScriptedClient::new(vec![(
            200,
            json!({
                "records": [
                    {"id": "rec1", "fields": {"Input Date": "2024-01-01", "Food Name": "Rice", "Calories (kcal)": 200}},
                    {"id": "rec2", "fields": {"Input Date": "2024-01-02", "Food Name": "Salmon", "Calories (kcal)": 280, "Fat (g)": 17}}
                ]
            }),
        )]);

        let report = source(&client).load().await.unwrap();

        assert_eq!(report.records.len(), 2);
        assert!(report.rejected.is_empty());
        for record in &report.records {
            assert_eq!(record.nutrients[Nutrient::Omega3], 0.0);
            assert_eq!(record.nutrients[Nutrient::Fiber], 0.0);
        }
        assert_eq!(report.records[1].nutrients[Nutrient::Fat], 17.0);
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let client = ScriptedClient::new(vec![(
            401,
            json!({"error": {"type": "AUTHENTICATION_REQUIRED"}}),
        )]);

        let err = source(&client).load().await.unwrap_err();

        assert!(matches!(err, DashboardError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_unexpected_body_is_unavailable() {
        let client = ScriptedClient::new(vec![(200, json!({"rows": []}))]);

        let err = source(&client).load().await.unwrap_err();

        assert!(matches!(err, DashboardError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_page_url_escapes_table_names() {
        let client = ScriptedClient::default();
        let source = AirtableSource::with_client(
            client,
            "appBase",
            "Food Log",
            ColumnMapping::airtable(),
            sgt(),
        );

        let url = source.page_url(None).unwrap();

        assert_eq!(url.path(), "/v0/appBase/Food%20Log");
    }
}
