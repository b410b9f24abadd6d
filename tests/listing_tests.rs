//! HTTP-level tests for the public artist and event listings.

mod test_utils;

use axum::http::StatusCode;
use serde_json::{Value, json};
use test_utils::{EventFixture, insert_artist, insert_event, read_json, request, send, test_app};

fn names(body: &Value, field: &str) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item[field].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn artists_filtered_by_genre() {
    let (db, app) = test_app().await;
    insert_artist(&db, "Zeta", "zeta", &["rock"]).await;
    insert_artist(&db, "Alfa", "alfa", &["tango"]).await;

    let body = read_json(send(&app, request("GET", "/api/artists?genre=tango", None)).await).await;

    assert_eq!(names(&body, "name"), vec!["Alfa"]);
    assert_eq!(body["data"][0]["genres"], json!(["tango"]));
}

#[tokio::test]
async fn artists_sorted_by_name_and_filtered_by_substring() {
    let (db, app) = test_app().await;
    insert_artist(&db, "Orquesta Típica Zamba", "otz", &["tango"]).await;
    insert_artist(&db, "Ángeles del Sur", "angeles", &["folklore", "tango"]).await;
    insert_artist(&db, "Bandoneón Berlin", "bandoneon", &["tango"]).await;

    let body = read_json(send(&app, request("GET", "/api/artists", None)).await).await;
    assert_eq!(
        names(&body, "name"),
        vec!["Ángeles del Sur", "Bandoneón Berlin", "Orquesta Típica Zamba"]
    );

    let body = read_json(send(&app, request("GET", "/api/artists?name=SUR", None)).await).await;
    assert_eq!(names(&body, "name"), vec!["Ángeles del Sur"]);

    let body = read_json(
        send(&app, request("GET", "/api/artists?name=xyz&genre=tango", None)).await,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn artist_by_slug_and_unknown_slug() {
    let (db, app) = test_app().await;
    insert_artist(&db, "Alfa", "alfa", &["tango"]).await;

    let response = send(&app, request("GET", "/api/artists/alfa", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["slug"], "alfa");
    assert!(body["meta"]["request_id"].is_string());

    let response = send(&app, request("GET", "/api/artists/nobody", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "ARTIST_NOT_FOUND");
}

#[tokio::test]
async fn artist_events_ordered_by_first_date() {
    let (db, app) = test_app().await;
    let alfa = insert_artist(&db, "Alfa", "alfa", &["tango"]).await;
    let other = insert_artist(&db, "Beta", "beta", &["tango"]).await;

    insert_event(
        &db,
        &alfa,
        EventFixture {
            dates: &["2025-05-01"],
            ..EventFixture::new("Mayo", "mayo")
        },
    )
    .await;
    insert_event(
        &db,
        &alfa,
        EventFixture {
            dates: &[],
            ..EventFixture::new("Pronto", "pronto")
        },
    )
    .await;
    insert_event(
        &db,
        &alfa,
        EventFixture {
            dates: &["2025-04-20", "2025-03-07"],
            ..EventFixture::new("Marzo y Abril", "marzo-abril")
        },
    )
    .await;
    insert_event(&db, &other, EventFixture::new("Ajeno", "ajeno")).await;

    let response = send(&app, request("GET", "/api/artists/alfa/events?lang=en", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    assert_eq!(body["data"]["artist"]["name"], "Alfa");
    let titles: Vec<_> = body["data"]["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Marzo y Abril", "Mayo", "Pronto"]);
    assert_eq!(body["data"]["events"][0]["locale"], "en");

    let response = send(&app, request("GET", "/api/artists/nobody/events", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn events_filtered_by_genre_and_title() {
    let (db, app) = test_app().await;
    let artist = insert_artist(&db, "Alfa", "alfa", &["tango", "folklore"]).await;
    insert_event(
        &db,
        &artist,
        EventFixture {
            genre: "folklore",
            ..EventFixture::new("Peña Folklórica", "pena")
        },
    )
    .await;
    insert_event(&db, &artist, EventFixture::new("Zeta Milonga", "zeta-milonga")).await;
    insert_event(&db, &artist, EventFixture::new("Abrazo Tango", "abrazo")).await;

    let body = read_json(send(&app, request("GET", "/api/events?genre=Tango", None)).await).await;
    assert_eq!(names(&body, "title"), vec!["Abrazo Tango", "Zeta Milonga"]);

    let body = read_json(send(&app, request("GET", "/api/events?name=pe%C3%B1a", None)).await).await;
    assert_eq!(names(&body, "title"), vec!["Peña Folklórica"]);
}

#[tokio::test]
async fn event_dates_follow_requested_locale() {
    let (db, app) = test_app().await;
    let artist = insert_artist(&db, "Alfa", "alfa", &["tango"]).await;
    let event = insert_event(&db, &artist, EventFixture::new("Noche", "noche")).await;

    let body = read_json(send(&app, request("GET", "/api/events/noche", None)).await).await;
    assert_eq!(body["data"]["locale"], "es");
    assert_eq!(
        body["data"]["formatted_dates"],
        json!(["viernes, 7 de marzo de 2025"])
    );

    let mut req = request("GET", &format!("/api/events/{}", event.id), None);
    req.headers_mut()
        .insert("accept-language", "de-DE,de;q=0.9,en;q=0.5".parse().unwrap());
    let body = read_json(send(&app, req).await).await;
    assert_eq!(body["data"]["formatted_dates"], json!(["Freitag, 7. März 2025"]));

    let body = read_json(send(&app, request("GET", "/api/events/noche?lang=en", None)).await).await;
    assert_eq!(body["data"]["formatted_dates"], json!(["Friday, March 7, 2025"]));
    assert_eq!(body["data"]["dates"], json!(["2025-03-07"]));
}

#[tokio::test]
async fn unknown_event_key_is_not_found() {
    let (_db, app) = test_app().await;

    let response = send(&app, request("GET", "/api/events/no-such-event", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "EVENT_NOT_FOUND");
}

#[tokio::test]
async fn operational_endpoints_respond() {
    let (_db, app) = test_app().await;

    let response = send(&app, request("GET", "/healthz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request("GET", "/readyz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request("GET", "/openapi.json", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let openapi = read_json(response).await;
    assert!(openapi["paths"]["/api/events/{id}/permanently-delete"].is_object());
}
