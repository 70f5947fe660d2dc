//! JSON API consumed by the dashboard front end.

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::aggregate::{
    AverageProfile, ContributorRanking, DailyTotal, average_profile, daily_totals, filter_range,
    top_contributors,
};
use crate::clock::ReferenceClock;
use crate::dashboard::{DashboardQuery, DashboardView, TodayCard};
use crate::nutrients::Nutrient;
use crate::record::NutritionRecord;
use crate::snapshot::{Session, SnapshotInfo};

/// Shared, read-only state. The snapshot is loaded once before serving.
pub struct AppState {
    pub session: Session,
    pub clock: ReferenceClock,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/nutrients", get(nutrients))
        .route("/api/dashboard", get(dashboard))
        .route("/api/daily", get(daily))
        .route("/api/average", get(average))
        .route("/api/today", get(today))
        .route("/api/top", get(top))
        .route("/api/records", get(records))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Dashboard listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    notice: Option<String>,
    snapshot: SnapshotInfo,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        notice: state.session.notice.clone(),
        snapshot: SnapshotInfo::from(&state.session.snapshot),
    })
}

#[derive(Serialize)]
struct NutrientInfo {
    key: &'static str,
    name: &'static str,
    unit: &'static str,
    column: String,
}

async fn nutrients() -> Json<Vec<NutrientInfo>> {
    Json(
        Nutrient::ALL
            .into_iter()
            .map(|n| NutrientInfo {
                key: n.key(),
                name: n.display_name(),
                unit: n.unit(),
                column: n.column_label(),
            })
            .collect(),
    )
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<DashboardView> {
    Json(DashboardView::build(&state.session, &query, state.clock.now()))
}

fn daily_for(state: &AppState, query: &DashboardQuery) -> Vec<DailyTotal> {
    query
        .range(&state.session)
        .map(|r| daily_totals(state.session.snapshot.records(), &r))
        .unwrap_or_default()
}

async fn daily(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<Vec<DailyTotal>> {
    Json(daily_for(&state, &query))
}

async fn average(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<AverageProfile> {
    Json(average_profile(&daily_for(&state, &query)))
}

async fn today(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<TodayCard> {
    let range = query.range(&state.session);
    let average = average_profile(&daily_for(&state, &query));
    Json(TodayCard::within(
        state.session.snapshot.records(),
        range.as_ref(),
        &average,
        state.clock.now(),
    ))
}

async fn top(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<Option<ContributorRanking>> {
    Json(query.range(&state.session).map(|r| {
        top_contributors(
            state.session.snapshot.records(),
            query.nutrient(),
            &r,
            query.limit(),
        )
    }))
}

async fn records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<Vec<NutritionRecord>> {
    let rows = match query.range(&state.session) {
        Some(r) => filter_range(state.session.snapshot.records(), &r)
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    Json(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, utc_offset};
    use crate::nutrients::NutrientValues;
    use crate::snapshot::Snapshot;
    use crate::source::LoadReport;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    fn rec(date: &str, item: &str, calories: f64) -> NutritionRecord {
        NutritionRecord::new(
            date.parse().unwrap(),
            item,
            NutrientValues::zero().with(Nutrient::Calories, calories),
        )
    }

    fn state(session: Session) -> Arc<AppState> {
        // 2024-01-02 08:00 in Singapore.
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Arc::new(AppState {
            session,
            clock: ReferenceClock::new(Arc::new(FixedClock(instant)), utc_offset(8).unwrap()),
        })
    }

    fn loaded() -> Arc<AppState> {
        let report = LoadReport {
            records: vec![
                rec("2024-01-01", "Rice", 200.0),
                rec("2024-01-01", "Egg", 70.0),
                rec("2024-01-02", "Rice", 200.0),
            ],
            rejected: vec![],
        };
        state(Session {
            snapshot: Snapshot::new("fixture", report, Utc::now()),
            notice: None,
        })
    }

    async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
        let resp = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_daily_endpoint() {
        let (status, body) = get_json(loaded(), "/api/daily").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["date"], "2024-01-01");
        assert_eq!(body[0]["nutrients"]["calories"], 270.0);
        assert_eq!(body[1]["nutrients"]["calories"], 200.0);
    }

    #[tokio::test]
    async fn test_average_with_range() {
        let (_, body) = get_json(loaded(), "/api/average?start=2024-01-01&end=2024-01-01").await;

        assert_eq!(body["days"], 1);
        assert_eq!(body["nutrients"]["calories"], 270.0);
    }

    #[tokio::test]
    async fn test_top_endpoint() {
        let (_, body) = get_json(loaded(), "/api/top?nutrient=calories&limit=1").await;

        assert_eq!(body["nutrient"], "calories");
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
        assert_eq!(body["entries"][0]["item_name"], "Rice");
        assert_eq!(body["entries"][0]["amount"], 400.0);
    }

    #[tokio::test]
    async fn test_today_uses_reference_clock() {
        let (_, body) = get_json(loaded(), "/api/today").await;

        assert_eq!(body["total"]["date"], "2024-01-02");
        assert_eq!(body["total"]["nutrients"]["calories"], 200.0);
        assert_eq!(body["delta"]["calories"], -35.0);
    }

    #[tokio::test]
    async fn test_today_outside_range() {
        let (_, body) = get_json(loaded(), "/api/today?start=2024-01-01&end=2024-01-01").await;

        assert_eq!(body["total"]["date"], "2024-01-02");
        assert_eq!(body["total"]["nutrients"]["calories"], 0.0);
        assert_eq!(body["delta"]["calories"], -270.0);
    }

    #[tokio::test]
    async fn test_top_accepts_column_label() {
        let (status, body) = get_json(loaded(), "/api/top?nutrient=Omega-3%20(mg)").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nutrient"], "omega_3");

        let (status, body) = get_json(loaded(), "/api/top?nutrient=Calories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"][0]["amount"], 400.0);
    }

    #[tokio::test]
    async fn test_records_filtered() {
        let (_, body) = get_json(loaded(), "/api/records?start=2024-01-02").await;

        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["item_name"], "Rice");
    }

    #[tokio::test]
    async fn test_unknown_nutrient_is_bad_request() {
        let (status, _) = get_json(loaded(), "/api/top?nutrient=vitamin_c").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unavailable_source_serves_empty_state() {
        let offline = state(Session {
            snapshot: Snapshot::empty("offline.csv", Utc::now()),
            notice: Some("data source 'offline.csv' unavailable: not found".to_string()),
        });

        let (status, body) = get_json(offline.clone(), "/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"], "data source 'offline.csv' unavailable: not found");
        assert_eq!(body["daily"].as_array().unwrap().len(), 0);
        assert_eq!(body["today"]["total"]["nutrients"]["calories"], 0.0);

        let (_, health) = get_json(offline, "/health").await;
        assert_eq!(health["snapshot"]["records"], 0);
    }

    #[tokio::test]
    async fn test_nutrients_listing() {
        let (_, body) = get_json(loaded(), "/api/nutrients").await;

        let list = body.as_array().unwrap();
        assert_eq!(list.len(), Nutrient::COUNT);
        assert_eq!(list[8]["key"], "omega_3");
        assert_eq!(list[8]["column"], "Omega-3 (mg)");
    }
}
