//! End-to-end flow against the in-memory backend: people, cars and the
//! three ways ownership can change.

use car_registry::{transport, EntityRepository, MemoryGateway};
use serde_json::{json, Value};
use std::sync::Arc;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn spawn_app() -> Result<String, Box<dyn std::error::Error>> {
    let repository = EntityRepository::new(Arc::new(MemoryGateway::new()));
    let app = transport::http::create_app(transport::http::AppState::new(repository));

    // Bind to an ephemeral port so tests can run in parallel.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

async fn create_carlos(client: &reqwest::Client, base_url: &str) -> Result<Value, reqwest::Error> {
    client
        .post(format!("{}/people/", base_url))
        .json(&json!({
            "name": "Carlos",
            "cpf": "12345678901",
            "birth_date": "1990-05-20"
        }))
        .send()
        .await?
        .json::<Value>()
        .await
}

async fn create_corolla(
    client: &reqwest::Client,
    base_url: &str,
    owner_id: Value,
) -> Result<reqwest::Response, reqwest::Error> {
    client
        .post(format!("{}/cars/", base_url))
        .json(&json!({
            "make": "Toyota",
            "model": "Corolla",
            "year": 2022,
            "color": "Prata",
            "price": 90000.0,
            "owner_id": owner_id
        }))
        .send()
        .await
}

#[tokio::test]
async fn test_person_and_owned_car_scenario() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();

    let person = create_carlos(&client, &base_url).await?;
    assert_eq!(person["id"], 1);
    assert_eq!(person["birth_date"], "1990-05-20");

    let resp = create_corolla(&client, &base_url, json!(1)).await?;
    assert_eq!(resp.status(), 200);
    let car = resp.json::<Value>().await?;
    assert_eq!(car["id"], 1);
    assert_eq!(car["owner_id"], 1);

    let fetched = client
        .get(format!("{}/cars/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(fetched["owner"]["id"], 1);
    assert_eq!(fetched["owner"]["cpf"], "12345678901");

    let with_cars = client
        .get(format!("{}/people/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(with_cars["name"], "Carlos");
    assert_eq!(with_cars["cars"].as_array().map(Vec::len), Some(1));

    // Clearing the owner through the dedicated endpoint.
    let cleared = client
        .patch(format!("{}/cars/1/owner", base_url))
        .json(&json!({ "owner_id": null }))
        .send()
        .await?;
    assert_eq!(cleared.status(), 200);
    let cleared = cleared.json::<Value>().await?;
    assert!(cleared["owner"].is_null());
    assert!(cleared["owner_id"].is_null());

    let refetched = client
        .get(format!("{}/cars/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert!(refetched["owner"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_cpf_is_rejected() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();

    create_carlos(&client, &base_url).await?;
    let resp = client
        .post(format!("{}/people/", base_url))
        .json(&json!({
            "name": "Another Carlos",
            "cpf": "12345678901",
            "birth_date": "2000-01-01"
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.json::<Value>().await?["detail"], "CPF already registered");

    let original = client
        .get(format!("{}/people/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(original["name"], "Carlos");

    let people = client
        .get(format!("{}/people/", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(people.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_car_with_unknown_owner_is_not_persisted() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();

    let resp = create_corolla(&client, &base_url, json!(99)).await?;
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.json::<Value>().await?["detail"], "Owner not found");

    let cars = client
        .get(format!("{}/cars/", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(cars, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_partial_updates() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();
    create_carlos(&client, &base_url).await?;
    create_corolla(&client, &base_url, json!(1)).await?;

    let renamed = client
        .put(format!("{}/people/1", base_url))
        .json(&json!({ "name": "Carlos M. Silva" }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(renamed["name"], "Carlos M. Silva");
    assert_eq!(renamed["cpf"], "12345678901");

    let repriced = client
        .put(format!("{}/cars/1", base_url))
        .json(&json!({ "price": 87000.0 }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(repriced["price"], 87000.0);
    assert_eq!(repriced["owner_id"], 1);

    let bad_owner = client
        .put(format!("{}/cars/1", base_url))
        .json(&json!({ "owner_id": 42 }))
        .send()
        .await?;
    assert_eq!(bad_owner.status(), 400);
    assert_eq!(bad_owner.json::<Value>().await?["detail"], "Owner not found");

    let missing = client
        .put(format!("{}/cars/7", base_url))
        .json(&json!({ "price": 1.0 }))
        .send()
        .await?;
    assert_eq!(missing.status(), 404);
    assert_eq!(missing.json::<Value>().await?["detail"], "Car not found");

    let missing_person = client
        .put(format!("{}/people/7", base_url))
        .json(&json!({ "name": "Nobody" }))
        .send()
        .await?;
    assert_eq!(missing_person.status(), 404);
    Ok(())
}

#[tokio::test]
async fn test_patch_owner_discriminates_failures() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();
    create_carlos(&client, &base_url).await?;
    create_corolla(&client, &base_url, Value::Null).await?;

    let assigned = client
        .patch(format!("{}/cars/1/owner", base_url))
        .json(&json!({ "owner_id": 1 }))
        .send()
        .await?;
    assert_eq!(assigned.status(), 200);
    assert_eq!(assigned.json::<Value>().await?["owner"]["cpf"], "12345678901");

    let no_car = client
        .patch(format!("{}/cars/5/owner", base_url))
        .json(&json!({ "owner_id": 1 }))
        .send()
        .await?;
    assert_eq!(no_car.status(), 404);
    assert_eq!(no_car.json::<Value>().await?["detail"], "Car not found");

    let no_owner = client
        .patch(format!("{}/cars/1/owner", base_url))
        .json(&json!({ "owner_id": 99 }))
        .send()
        .await?;
    assert_eq!(no_owner.status(), 404);
    assert_eq!(no_owner.json::<Value>().await?["detail"], "Owner not found");
    Ok(())
}

#[tokio::test]
async fn test_person_centric_add_and_remove() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();
    create_carlos(&client, &base_url).await?;
    create_corolla(&client, &base_url, Value::Null).await?;

    let added = client
        .post(format!("{}/people/1/cars", base_url))
        .json(&json!({ "car_id": 1, "action": "add" }))
        .send()
        .await?;
    assert_eq!(added.status(), 200);
    let added = added.json::<Value>().await?;
    assert_eq!(added["cars"][0]["id"], 1);

    let owned = client
        .get(format!("{}/cars/owner/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(owned.as_array().map(Vec::len), Some(1));

    let removed = client
        .post(format!("{}/people/1/cars", base_url))
        .json(&json!({ "car_id": 1, "action": "remove" }))
        .send()
        .await?;
    assert_eq!(removed.status(), 200);
    assert_eq!(removed.json::<Value>().await?["cars"], json!([]));

    let owned = client
        .get(format!("{}/cars/owner/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(owned, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_person_centric_rejections() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();
    create_carlos(&client, &base_url).await?;
    client
        .post(format!("{}/people/", base_url))
        .json(&json!({ "name": "Beatriz", "cpf": "98765432100", "birth_date": "1988-11-02" }))
        .send()
        .await?;
    // Car 1 belongs to person 2.
    create_corolla(&client, &base_url, json!(2)).await?;

    let mismatch = client
        .post(format!("{}/people/1/cars", base_url))
        .json(&json!({ "car_id": 1, "action": "remove" }))
        .send()
        .await?;
    assert_eq!(mismatch.status(), 400);
    assert_eq!(mismatch.json::<Value>().await?["detail"], "Car not owned by this person");

    let bogus = client
        .post(format!("{}/people/1/cars", base_url))
        .json(&json!({ "car_id": 1, "action": "bogus" }))
        .send()
        .await?;
    assert_eq!(bogus.status(), 400);
    assert_eq!(bogus.json::<Value>().await?["detail"], "Invalid action");

    let no_person = client
        .post(format!("{}/people/9/cars", base_url))
        .json(&json!({ "car_id": 1, "action": "add" }))
        .send()
        .await?;
    assert_eq!(no_person.status(), 404);
    assert_eq!(no_person.json::<Value>().await?["detail"], "Person not found");

    let no_car = client
        .post(format!("{}/people/1/cars", base_url))
        .json(&json!({ "car_id": 999, "action": "add" }))
        .send()
        .await?;
    assert_eq!(no_car.status(), 404);
    assert_eq!(no_car.json::<Value>().await?["detail"], "Car not found");

    // None of the rejected requests touched the car.
    let car = client
        .get(format!("{}/cars/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(car["owner_id"], 2);
    Ok(())
}

#[tokio::test]
async fn test_deletes() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();
    create_carlos(&client, &base_url).await?;
    create_corolla(&client, &base_url, json!(1)).await?;
    create_corolla(&client, &base_url, json!(1)).await?;

    let deleted_car = client.delete(format!("{}/cars/2", base_url)).send().await?;
    assert_eq!(deleted_car.status(), 200);
    assert_eq!(deleted_car.json::<Value>().await?["message"], "Car deleted successfully");
    assert_eq!(client.get(format!("{}/cars/2", base_url)).send().await?.status(), 404);
    assert_eq!(client.delete(format!("{}/cars/2", base_url)).send().await?.status(), 404);

    let owned = client
        .get(format!("{}/cars/owner/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(owned.as_array().map(Vec::len), Some(1));

    let deleted_person = client.delete(format!("{}/people/1", base_url)).send().await?;
    assert_eq!(deleted_person.status(), 200);
    assert_eq!(
        deleted_person.json::<Value>().await?["message"],
        "Person deleted successfully"
    );

    // The remaining car is released rather than left pointing at a missing person.
    let orphan = client
        .get(format!("{}/cars/1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert!(orphan["owner_id"].is_null());
    assert!(orphan["owner"].is_null());

    let not_found = client.delete(format!("{}/people/2", base_url)).send().await?;
    assert_eq!(not_found.status(), 404);
    assert_eq!(not_found.json::<Value>().await?["detail"], "Person not found");

    let owner_gone = client.get(format!("{}/cars/owner/1", base_url)).send().await?;
    assert_eq!(owner_gone.status(), 404);
    assert_eq!(owner_gone.json::<Value>().await?["detail"], "Owner not found");
    Ok(())
}

#[tokio::test]
async fn test_listing_pages_and_malformed_bodies() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();
    for _ in 0..3 {
        create_corolla(&client, &base_url, Value::Null).await?;
    }

    let page = client
        .get(format!("{}/cars/?skip=1&limit=1", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(page.as_array().map(Vec::len), Some(1));
    assert_eq!(page[0]["id"], 2);

    let malformed = client
        .post(format!("{}/cars/", base_url))
        .json(&json!({ "make": "Fiat" }))
        .send()
        .await?;
    assert_eq!(malformed.status(), 422);
    assert!(malformed.json::<Value>().await?["detail"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_unparseable_ids_and_paging_get_detail_bodies() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();

    let cases = [
        format!("{}/cars/abc", base_url),
        format!("{}/cars/owner", base_url),
        format!("{}/people/abc", base_url),
        format!("{}/cars/?skip=abc", base_url),
        format!("{}/people/?limit=ten", base_url),
    ];
    for url in cases {
        let response = client.get(&url).send().await?;
        assert_eq!(response.status(), 422, "{}", url);
        let body = response.json::<Value>().await?;
        assert!(body["detail"].is_string(), "{}: {}", url, body);
    }

    let bad_id = client
        .get(format!("{}/cars/abc", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert!(bad_id["detail"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Invalid path parameter"));

    let bad_skip = client
        .get(format!("{}/cars/?skip=abc", base_url))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert!(bad_skip["detail"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Invalid query parameter"));
    Ok(())
}

#[tokio::test]
async fn test_docs_and_health() -> TestResult {
    let base_url = spawn_app().await?;
    let client = reqwest::Client::new();

    let schema = client
        .get(format!("{}/openapi.json", base_url))
        .send()
        .await?;
    assert_eq!(schema.status(), 200);
    let schema = schema.json::<Value>().await?;
    assert_eq!(schema["info"]["title"], "Car API");
    assert_eq!(schema["info"]["version"], "0.1.0");
    assert!(schema["paths"]["/cars/{car_id}/owner"].is_object());

    let docs = client.get(format!("{}/docs/", base_url)).send().await?;
    assert_eq!(docs.status(), 200);
    let content_type = docs
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.contains("text/html"));

    let health = client
        .get(format!("{}/health", base_url))
        .send()
        .await?;
    assert_eq!(health.status(), 200);
    assert_eq!(health.json::<Value>().await?["status"], "ok");
    Ok(())
}
