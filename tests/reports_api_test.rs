mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{decimal, TestApp};

struct Menu {
    ensaymada: String,
    ube_roll: String,
    pandesal: String,
}

async fn seed(app: &TestApp) -> Menu {
    let ensaymada = app
        .create_product(json!({
            "name": "Ensaymada",
            "category": "Pastry",
            "price": "270.00",
            "unit_type": "pack",
            "pieces_per_pack": 6,
            "baker": "Nicole"
        }))
        .await;
    let ube_roll = app
        .create_product(json!({
            "name": "Ube Roll",
            "category": "Cake",
            "price": "250.00",
            "baker": "Mommy"
        }))
        .await;
    let pandesal = app
        .create_product(json!({
            "name": "Pandesal",
            "category": "Bread",
            "price": "60.00",
            "unit_type": "pack",
            "pieces_per_pack": 10,
            "baker": "Anna"
        }))
        .await;
    Menu {
        ensaymada,
        ube_roll,
        pandesal,
    }
}

fn pieces_for(report: &Value, category: &str, product: &str) -> Option<i64> {
    report["by_product"]
        .as_array()?
        .iter()
        .find(|group| group["category"] == category)?["products"]
        .as_array()?
        .iter()
        .find(|p| p["product_name"] == product)?["total_pieces"]
        .as_i64()
}

#[tokio::test]
async fn production_report_counts_pieces_and_moves_toggled_orders() {
    let app = TestApp::new().await;
    let menu = seed(&app).await;

    let tita = app
        .create_order(json!({
            "customer_name": "Tita Baby",
            "order_date": "2025-06-01",
            "items": [
                { "product_id": menu.ensaymada, "quantity": 2 },
                { "product_id": menu.ube_roll, "quantity": 1 }
            ]
        }))
        .await;
    app.create_order(json!({
        "customer_name": "Mang Tomas",
        "order_date": "2025-06-01",
        "items": [{ "product_id": menu.ensaymada, "quantity": 1 }]
    }))
    .await;

    let production = app.get("/api/v1/production?date=2025-06-01").await;
    assert_eq!(production.status, StatusCode::OK, "{}", production.body);
    let report = &production.body["data"];
    assert_eq!(report["summary"]["incomplete"], 2);
    assert_eq!(pieces_for(report, "Pastry", "Ensaymada"), Some(18));
    assert_eq!(pieces_for(report, "Cake", "Ube Roll"), Some(1));
    assert_eq!(report["by_product"][0]["category"], "Cake");

    let toggled = app
        .post_empty(&format!(
            "/api/v1/production/orders/{}/toggle?date=2025-06-01",
            tita
        ))
        .await;
    assert_eq!(toggled.status, StatusCode::OK, "{}", toggled.body);
    let report = &toggled.body["data"];
    assert_eq!(report["summary"]["incomplete"], 1);
    assert_eq!(report["summary"]["completed"], 1);
    assert_eq!(report["completed_orders"][0]["customer_name"], "Tita Baby");
    assert_eq!(
        report["completed_orders"][0]["items"][0]["quantity_label"],
        "2 packs (12 pcs)"
    );
    assert_eq!(pieces_for(report, "Pastry", "Ensaymada"), Some(6));
    assert_eq!(pieces_for(report, "Cake", "Ube Roll"), None);
}

#[tokio::test]
async fn production_defaults_to_earliest_day_still_baking() {
    let app = TestApp::new().await;
    let menu = seed(&app).await;

    let early = app
        .create_order(json!({
            "customer_name": "Bong",
            "order_date": "2025-06-01",
            "items": [{ "product_id": menu.pandesal, "quantity": 1 }]
        }))
        .await;
    app.create_order(json!({
        "customer_name": "Marites",
        "order_date": "2025-06-03",
        "items": [{ "product_id": menu.pandesal, "quantity": 1 }]
    }))
    .await;

    let before = app.get("/api/v1/production").await;
    assert_eq!(before.body["data"]["selected_date"], "2025-06-01");

    app.post_empty(&format!("/api/v1/production/orders/{}/toggle", early))
        .await;

    let after = app.get("/api/v1/production").await;
    assert_eq!(after.body["data"]["selected_date"], "2025-06-03");
    assert_eq!(
        after.body["data"]["available_dates"],
        json!(["2025-06-01", "2025-06-03"])
    );
}

#[tokio::test]
async fn sales_report_groups_by_baker_and_tracks_unpaid() {
    let app = TestApp::new().await;
    let menu = seed(&app).await;

    let tita = app
        .create_order(json!({
            "customer_name": "Tita Baby",
            "order_date": "2025-06-01",
            "items": [
                { "product_id": menu.ube_roll, "quantity": 1 },
                { "product_id": menu.ensaymada, "quantity": 2 }
            ]
        }))
        .await;
    app.create_order(json!({
        "customer_name": "Mang Tomas",
        "order_date": "2025-06-01",
        "items": [{ "product_id": menu.pandesal, "quantity": 3 }]
    }))
    .await;
    app.create_order(json!({
        "customer_name": "Bong",
        "order_date": "2025-05-31",
        "items": [{ "product_id": menu.pandesal, "quantity": 1 }]
    }))
    .await;

    let sales = app.get("/api/v1/sales").await;
    assert_eq!(sales.status, StatusCode::OK, "{}", sales.body);
    let report = &sales.body["data"];
    assert_eq!(report["selected_date"], "2025-06-01");
    assert_eq!(report["order_count"], 2);
    assert_eq!(decimal(&report["date_revenue"]), dec!(970));
    assert_eq!(decimal(&report["overall_revenue"]), dec!(1030));

    let bakers: Vec<&str> = report["bakers"]
        .as_array()
        .map(|b| b.iter().filter_map(|x| x["baker_name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(bakers, vec!["Anna", "Nicole", "Mommy"]);
    assert_eq!(report["bakers"][0]["products"][0]["quantity_label"], "3 packs");
    assert_eq!(decimal(&report["bakers"][1]["total_revenue"]), dec!(540));
    assert_eq!(report["unpaid_orders"].as_array().map(Vec::len), Some(2));

    let uri = format!("/api/v1/sales/orders/{}/mark-paid?date=2025-06-01", tita);
    let paid = app.post_empty(&uri).await;
    assert_eq!(paid.status, StatusCode::OK, "{}", paid.body);
    let unpaid = paid.body["data"]["unpaid_orders"].as_array().cloned().unwrap_or_default();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0]["customer_name"], "Mang Tomas");

    let again = app.post_empty(&uri).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(
        again.body["data"]["unpaid_orders"].as_array().map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn unknown_order_on_report_actions_is_not_found() {
    let app = TestApp::new().await;
    let missing = "00000000-0000-0000-0000-000000000001";

    let toggle = app
        .post_empty(&format!("/api/v1/production/orders/{}/toggle", missing))
        .await;
    assert_eq!(toggle.status, StatusCode::NOT_FOUND);

    let paid = app
        .post_empty(&format!("/api/v1/sales/orders/{}/mark-paid", missing))
        .await;
    assert_eq!(paid.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_reports_have_no_selected_date() {
    let app = TestApp::new().await;

    let production = app.get("/api/v1/production").await;
    assert_eq!(production.status, StatusCode::OK);
    assert_eq!(production.body["data"]["selected_date"], Value::Null);

    let sales = app.get("/api/v1/sales").await;
    assert_eq!(sales.status, StatusCode::OK);
    assert_eq!(decimal(&sales.body["data"]["overall_revenue"]), dec!(0));
}
