use serde_json::json;

use crate::common::{TestApp, hosted, insert_raw_machine, machine_body, routes};

mod codes {
    use super::*;

    #[tokio::test]
    async fn codes_are_allocated_per_prefix_in_sequence() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let first = app
            .create_machine(&token, machine_body("Tata Hitachi EX200", "Excavator"))
            .await;
        let second = app
            .create_machine(&token, machine_body("Komatsu PC210", "Excavator"))
            .await;
        let loader = app
            .create_machine(&token, machine_body("JCB 3DX", "Backhoe Loader"))
            .await;
        let breaker = app
            .create_machine(&token, machine_body("JCB 3DX + breaker", "Backhoe Loader with Breaker"))
            .await;

        assert_eq!(first.body["machineCode"], "EXE-0001");
        assert_eq!(second.body["machineCode"], "EXE-0002");
        assert_eq!(loader.body["machineCode"], "BL-0001");
        assert_eq!(breaker.body["machineCode"], "BLB-0001");
    }

    #[tokio::test]
    async fn allocation_continues_from_the_greatest_existing_code() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        insert_raw_machine(&app.db, "old", "Excavator", Some("EXE-0041")).await;
        insert_raw_machine(&app.db, "older", "Excavator", Some("EXE-0007")).await;

        let res = app
            .create_machine(&token, machine_body("new", "Excavator"))
            .await;

        assert_eq!(res.body["machineCode"], "EXE-0042");
    }

    #[tokio::test]
    async fn allocation_widens_past_four_digits() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        insert_raw_machine(&app.db, "last four-digit", "Excavator", Some("EXE-9999")).await;

        let first = app
            .create_machine(&token, machine_body("first five-digit", "Excavator"))
            .await;
        let second = app
            .create_machine(&token, machine_body("second five-digit", "Excavator"))
            .await;

        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(first.body["machineCode"], "EXE-10000");
        assert_eq!(second.status, 201, "{}", second.text);
        assert_eq!(second.body["machineCode"], "EXE-10001");
    }

    #[tokio::test]
    async fn malformed_codes_do_not_reset_the_sequence() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        insert_raw_machine(&app.db, "good", "Excavator", Some("EXE-0001")).await;
        insert_raw_machine(&app.db, "short junk", "Excavator", Some("EXE-X")).await;
        insert_raw_machine(&app.db, "same-width junk", "Excavator", Some("EXE-ABCD")).await;

        let res = app
            .create_machine(&token, machine_body("new", "Excavator"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["machineCode"], "EXE-0002");
    }

    #[tokio::test]
    async fn sibling_prefix_does_not_affect_allocation() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        insert_raw_machine(&app.db, "breaker", "Backhoe Loader with Breaker", Some("BLB-0009")).await;

        let res = app
            .create_machine(&token, machine_body("loader", "Backhoe Loader"))
            .await;

        assert_eq!(res.body["machineCode"], "BL-0001");
    }

    #[tokio::test]
    async fn supplied_code_is_ignored_for_mapped_category() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("Tata Hitachi EX200", "Excavator");
        body["machineCode"] = json!("EXE-0099");

        let res = app.create_machine(&token, body).await;

        assert_eq!(res.body["machineCode"], "EXE-0001");
    }

    #[tokio::test]
    async fn unmapped_category_keeps_supplied_code() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("Escorts crane", "Crane");
        body["machineCode"] = json!("CR-7");

        let with_code = app.create_machine(&token, body).await;
        let without_code = app
            .create_machine(&token, machine_body("ACE crane", "Crane"))
            .await;

        assert_eq!(with_code.body["machineCode"], "CR-7");
        assert!(without_code.body["machineCode"].is_null());
    }

    #[tokio::test]
    async fn duplicate_code_for_unmapped_category_conflicts() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("Escorts crane", "Crane");
        body["machineCode"] = json!("CR-7");
        app.create_machine(&token, body.clone()).await;

        let res = app.post_with_token(routes::MACHINES, &body, &token).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn concurrent_creations_never_share_a_code() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let results = futures::future::join_all((0..3).map(|i| {
            let body = machine_body(&format!("excavator {i}"), "Excavator");
            let app = &app;
            let token = &token;
            async move { app.post_with_token(routes::MACHINES, &body, token).await }
        }))
        .await;

        let mut codes = Vec::new();
        for res in &results {
            assert!(
                res.status == 201 || res.status == 409,
                "unexpected status {}: {}",
                res.status,
                res.text
            );
            if res.status == 201 {
                codes.push(res.body["machineCode"].as_str().unwrap().to_string());
            }
        }
        assert!(!codes.is_empty());
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total, "duplicate codes allocated: {codes:?}");
    }

    #[tokio::test]
    async fn update_cannot_change_the_code() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app
            .create_machine(&token, machine_body("JCB 3DX", "Backhoe Loader"))
            .await
            .id();

        let res = app
            .patch_with_token(
                &routes::machine(id),
                &json!({"machineCode": "BL-9999", "_id": "abc", "id": 999, "status": "Sold"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["machineCode"], "BL-0001");
        assert_eq!(res.body["status"], "Sold");
    }
}

mod crud {
    use super::*;

    #[tokio::test]
    async fn create_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::MACHINES, &machine_body("JCB 3DX", "Backhoe Loader"))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        let list = app.get_without_token(routes::MACHINES).await;
        assert_eq!(list.body, json!([]));
    }

    #[tokio::test]
    async fn create_validates_required_fields() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(routes::MACHINES, &machine_body("  ", "Excavator"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn list_filters_by_type_and_category() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        app.create_machine(&token, machine_body("rental excavator", "Excavator"))
            .await;
        let mut sale = machine_body("sale excavator", "Excavator");
        sale["type"] = json!("Sales");
        app.create_machine(&token, sale).await;
        app.create_machine(&token, machine_body("rental loader", "Backhoe Loader"))
            .await;

        let all = app.get_without_token(routes::MACHINES).await;
        let rentals = app
            .get_without_token(&format!("{}?type=Rental", routes::MACHINES))
            .await;
        let rental_excavators = app
            .get_without_token(&format!(
                "{}?type=Rental&category=Excavator",
                routes::MACHINES
            ))
            .await;

        assert_eq!(all.body.as_array().unwrap().len(), 3);
        assert_eq!(rentals.body.as_array().unwrap().len(), 2);
        let only = rental_excavators.body.as_array().unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0]["title"], "rental excavator");
    }

    #[tokio::test]
    async fn get_returns_404_for_unknown_id() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::machine(4242)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn images_round_trip_in_both_shapes() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([
            "https://images.example.com/legacy.jpg",
            {"secure_url": "https://assets.test/heavy_horizon/a.jpg", "public_id": "heavy_horizon/a"},
        ]);

        let id = app.create_machine(&token, body).await.id();
        let res = app.get_without_token(&routes::machine(id)).await;

        assert_eq!(
            res.body["images"],
            json!([
                "https://images.example.com/legacy.jpg",
                {"url": "https://assets.test/heavy_horizon/a.jpg", "public_id": "heavy_horizon/a"},
            ])
        );
    }
}

mod image_cleanup {
    use super::*;

    #[tokio::test]
    async fn update_deletes_only_removed_images() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([hosted("id_a"), hosted("id_b")]);
        let id = app.create_machine(&token, body).await.id();

        let res = app
            .patch_with_token(
                &routes::machine(id),
                &json!({"images": [hosted("id_a")]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["images"], json!([hosted("id_a")]));
        assert_eq!(app.recorder().destroyed(), vec!["id_b".to_string()]);
    }

    #[tokio::test]
    async fn update_without_images_deletes_nothing() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([hosted("id_a")]);
        let id = app.create_machine(&token, body).await.id();

        let res = app
            .patch_with_token(&routes::machine(id), &json!({"hours": 1200}), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["hours"], 1200);
        assert!(app.recorder().destroyed().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_every_owned_image() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([
            hosted("heavy_horizon/x1"),
            "https://res.example.com/demo/image/upload/v1712/heavy_horizon/abc123.jpg",
            "https://images.unsplash.com/photo-1581094288338?w=400",
        ]);
        let id = app.create_machine(&token, body).await.id();

        let res = app.delete_with_token(&routes::machine(id), &token).await;

        assert_eq!(res.status, 204);
        let mut destroyed = app.recorder().destroyed();
        destroyed.sort();
        assert_eq!(destroyed, ["heavy_horizon/abc123", "heavy_horizon/x1"]);
        let gone = app.get_without_token(&routes::machine(id)).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn structured_image_without_identifier_is_kept_and_cleaned_up() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let image = json!({"url": "https://res.example.com/demo/heavy_horizon/nid42.jpg"});
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([image.clone()]);
        let id = app.create_machine(&token, body).await.id();

        let fetched = app.get_without_token(&routes::machine(id)).await;
        assert_eq!(fetched.body["images"], json!([image]));

        let res = app.delete_with_token(&routes::machine(id), &token).await;

        assert_eq!(res.status, 204);
        assert_eq!(app.recorder().destroyed(), ["heavy_horizon/nid42"]);
    }

    #[tokio::test]
    async fn resending_hosted_image_as_bare_url_keeps_it() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let url = "https://res.example.com/demo/heavy_horizon/keep1.jpg";
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([{"url": url, "public_id": "heavy_horizon/keep1"}]);
        let id = app.create_machine(&token, body).await.id();

        let res = app
            .patch_with_token(&routes::machine(id), &json!({"images": [url]}), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["images"], json!([url]));
        assert!(app.recorder().destroyed().is_empty());
    }

    #[tokio::test]
    async fn failed_image_deletion_does_not_fail_the_request() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        app.recorder().fail_on("id_a");
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([hosted("id_a"), hosted("id_b")]);
        let id = app.create_machine(&token, body).await.id();

        let res = app.delete_with_token(&routes::machine(id), &token).await;

        assert_eq!(res.status, 204);
        let mut destroyed = app.recorder().destroyed();
        destroyed.sort();
        assert_eq!(destroyed, ["id_a", "id_b"]);
        let gone = app.get_without_token(&routes::machine(id)).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn unauthenticated_delete_touches_nothing() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let mut body = machine_body("JCB 3DX", "Backhoe Loader");
        body["images"] = json!([hosted("id_a")]);
        let id = app.create_machine(&token, body).await.id();

        let res = app.delete_without_token(&routes::machine(id)).await;

        assert_eq!(res.status, 401);
        assert!(app.recorder().destroyed().is_empty());
        let still_there = app.get_without_token(&routes::machine(id)).await;
        assert_eq!(still_there.status, 200);
    }
}
