use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use artillery::SolverConfig;

struct TestApp {
    base_url: String,
    client: Client,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{port}");

    let app = artillery::server::build_app(SolverConfig::default());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });

    TestApp {
        base_url,
        client: Client::new(),
    }
}

impl TestApp {
    async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn health_ok() {
    let app = spawn_app().await;

    let res = app
        .client
        .get(format!("{}/api/health", app.base_url))
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(!body["version"].as_str().unwrap_or("").is_empty());
}

#[tokio::test]
async fn munitions_are_listed() {
    let app = spawn_app().await;

    let body: Value = app
        .client
        .get(format!("{}/api/munitions", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = body["munitions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    assert_eq!(names, vec!["m252", "m119", "t2s1"]);
    assert_eq!(body["munitions"][0]["high_angle"], true);
}

#[tokio::test]
async fn resolve_observer_report() {
    let app = spawn_app().await;

    let res = app
        .post(
            "/api/calculate",
            &json!({
                "mortar_easting": 0.0,
                "mortar_northing": 0.0,
                "observer_easting": 300.0,
                "observer_northing": 0.0,
                "obs_to_enemy_azimuth": 0.0,
                "obs_to_enemy_distance": 400.0,
            }),
        )
        .await;
    assert!(res.status().is_success());

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["distance"].as_f64(), Some(500.0));
    assert_eq!(body["azimuth"].as_f64(), Some(36.87));
}

#[tokio::test]
async fn polar_mission_returns_firing_solution() {
    let app = spawn_app().await;

    let res = app
        .post(
            "/api/calculate_elevation",
            &json!({
                "mortar_easting": 1000.0,
                "mortar_northing": 1000.0,
                "mortar_height": 120.0,
                "observer_easting": 1500.0,
                "observer_northing": 1800.0,
                "observer_height": 140.0,
                "observer_to_enemy_azimuth": 90.0,
                "observer_to_enemy_horizontal": 300.0,
                "observer_to_enemy_vertical": -30.0,
                "artillery": "m252",
            }),
        )
        .await;
    assert!(res.status().is_success());

    let body: Value = res.json().await.unwrap();
    // target plotted at (1800, 1800): 800 m east and 800 m north of the mortar
    assert_eq!(body["azimuth"].as_f64(), Some(45.0));
    assert_eq!(body["distance"].as_f64(), Some(1131.37));

    let elevation = body["elevation"].as_f64().unwrap();
    assert!(elevation > 45.0 && elevation < 90.0, "elevation {elevation}");
    assert!(body["time_to_impact"].as_f64().unwrap() > 0.0);
    assert!(body["max_ord"].as_f64().unwrap() > 0.0);
    assert!(body["elevation_mil"].is_number());
}

#[tokio::test]
async fn grid_mission_returns_firing_solution() {
    let app = spawn_app().await;

    let res = app
        .post(
            "/api/calculate_elevation_grid",
            &json!({
                "mortar_easting": 0.0,
                "mortar_northing": 0.0,
                "enemy_easting": 2000.0,
                "enemy_northing": 0.0,
                "enemy_height": 15.0,
                "artillery": "M119",
            }),
        )
        .await;
    assert!(res.status().is_success());

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["artillery"], "m119");
    assert_eq!(body["azimuth"].as_f64(), Some(90.0));
    assert_eq!(body["distance"].as_f64(), Some(2000.0));
    let elevation = body["elevation"].as_f64().unwrap();
    assert!(elevation > 0.0 && elevation < 45.0, "elevation {elevation}");
}

#[tokio::test]
async fn unknown_munition_is_a_client_error() {
    let app = spawn_app().await;

    let res = app
        .post(
            "/api/calculate_elevation_grid",
            &json!({
                "mortar_easting": 0.0,
                "mortar_northing": 0.0,
                "enemy_easting": 500.0,
                "enemy_northing": 500.0,
                "artillery": "catapult",
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "unknown_munition");
    assert!(body.get("target").is_none());
}

#[tokio::test]
async fn negative_observer_distance_is_rejected() {
    let app = spawn_app().await;

    let res = app
        .post(
            "/api/calculate",
            &json!({
                "mortar_easting": 0.0,
                "mortar_northing": 0.0,
                "observer_easting": 0.0,
                "observer_northing": 0.0,
                "obs_to_enemy_azimuth": 10.0,
                "obs_to_enemy_distance": -50.0,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn out_of_range_target_is_reported_as_unreachable() {
    let app = spawn_app().await;

    let res = app
        .post(
            "/api/calculate_elevation_grid",
            &json!({
                "mortar_easting": 0.0,
                "mortar_northing": 0.0,
                "enemy_easting": 0.0,
                "enemy_northing": -12000.0,
                "artillery": "m252",
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "unreachable");
    assert_eq!(body["target"]["reason"], "out_of_range");
    assert_eq!(body["target"]["azimuth"].as_f64(), Some(180.0));
    assert!(body["target"]["max_range_m"].as_f64().unwrap() < 12000.0);
}

#[tokio::test]
async fn target_above_every_apex_is_unreachable() {
    let app = spawn_app().await;

    let res = app
        .post(
            "/api/calculate_elevation_grid",
            &json!({
                "mortar_easting": 0.0,
                "mortar_northing": 0.0,
                "enemy_easting": 500.0,
                "enemy_northing": 0.0,
                "enemy_height": 5000.0,
                "artillery": "m119",
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["target"]["reason"], "above_apex");
    assert!(body["target"]["max_ordinate_m"].as_f64().unwrap() < 5000.0);
}
