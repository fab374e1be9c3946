use serde_json::json;

use crate::common::{TestApp, machine_body, routes};

#[tokio::test]
async fn counts_every_collection_and_unread_enquiries() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.create_machine(&token, machine_body("JCB 3DX", "Backhoe Loader"))
        .await;
    app.create_machine(&token, machine_body("EX200", "Excavator"))
        .await;
    app.post_with_token(routes::PARTS, &json!({"name": "Pump"}), &token)
        .await;
    let enquiry = json!({"type": "contact", "message": "Hi", "mobile": "9876543210"});
    app.post_without_token(routes::ENQUIRIES, &enquiry).await;
    app.post_with_token(routes::ENQUIRIES_MARK_READ, &json!({}), &token)
        .await;
    app.post_without_token(routes::ENQUIRIES, &enquiry).await;

    let res = app.get_with_token(routes::DASHBOARD_COUNTS, &token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(
        res.body,
        json!({
            "machines": 2,
            "parts": 1,
            "blogs": 0,
            "enquiries": 2,
            "unread_enquiries": 1,
        })
    );
}

#[tokio::test]
async fn counts_require_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::DASHBOARD_COUNTS).await;

    assert_eq!(res.status, 401);
}
