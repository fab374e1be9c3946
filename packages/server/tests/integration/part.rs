use serde_json::json;

use crate::common::{TestApp, hosted, routes};

fn part_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "compatibility": "JCB 3DX, JCB 3DX Super",
        "condition": "Refurbished",
    })
}

#[tokio::test]
async fn created_parts_are_listed_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let first = app
        .post_with_token(routes::PARTS, &part_body("Hydraulic pump"), &token)
        .await;
    let second = app
        .post_with_token(routes::PARTS, &part_body("Bucket teeth"), &token)
        .await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(second.status, 201, "{}", second.text);

    let list = app.get_without_token(routes::PARTS).await;

    let names: Vec<_> = list
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Bucket teeth", "Hydraulic pump"]);
}

#[tokio::test]
async fn create_requires_a_name() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .post_with_token(routes::PARTS, &json!({"name": ""}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_reconciles_images() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let mut body = part_body("Hydraulic pump");
    body["images"] = json!([hosted("p1"), hosted("p2"), hosted("p3")]);
    let id = app.post_with_token(routes::PARTS, &body, &token).await.id();

    let res = app
        .patch_with_token(
            &routes::part(id),
            &json!({"images": [hosted("p3"), hosted("p4"), hosted("p1")]}),
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(app.recorder().destroyed(), vec!["p2".to_string()]);
}

#[tokio::test]
async fn delete_removes_images_and_record() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let mut body = part_body("Hydraulic pump");
    body["images"] = json!([hosted("p1")]);
    let id = app.post_with_token(routes::PARTS, &body, &token).await.id();

    let res = app.delete_with_token(&routes::part(id), &token).await;
    let again = app.delete_with_token(&routes::part(id), &token).await;

    assert_eq!(res.status, 204);
    assert_eq!(again.status, 404);
    assert_eq!(app.recorder().destroyed(), vec!["p1".to_string()]);
}
