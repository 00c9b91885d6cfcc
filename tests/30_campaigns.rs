mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use civic_api::types::Role;
use common::TestApp;

#[tokio::test]
async fn create_forces_caller_organization() -> Result<()> {
    let app = TestApp::new();
    let org_a = app.create_organization("North Civic").await?;
    let org_b = app.create_organization("South Civic").await?;
    let (_, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org_a)).await?;

    let (status, body) = app
        .post(
            "/api/campaigns",
            &manager,
            json!({
                "name": "Register to Vote",
                "campaign_type": "civic_education",
                "organization_id": org_b,
                "start_date": "2026-09-01",
                "end_date": "2026-11-03"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["campaign"]["organization_id"], org_a);
    assert_eq!(body["data"]["campaign"]["status"], "draft");

    let actions = app.audit_actions().await?;
    assert_eq!(actions.first().map(String::as_str), Some("campaign_created"));
    Ok(())
}

#[tokio::test]
async fn create_validates_input() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (_, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let (_, root) = app.user_with_token("root@example.org", Role::SuperAdmin, None).await?;

    let (status, body) = app.post("/api/campaigns", &manager, json!({ "name": "No type" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["campaign_type"].is_string());

    let (status, _) = app
        .post("/api/campaigns", &manager, json!({ "name": "Bad type", "campaign_type": "marketing" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/campaigns",
            &manager,
            json!({ "name": "Bad date", "campaign_type": "advocacy", "start_date": "next week" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["start_date"], "Invalid start_date format");

    // A super_admin has no organization of their own
    let (status, body) = app
        .post("/api/campaigns", &root, json!({ "name": "Orphan", "campaign_type": "advocacy" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["organization_id"], "Organization ID is required");

    let (status, _) = app
        .post(
            "/api/campaigns",
            &root,
            json!({ "name": "Ghost", "campaign_type": "advocacy", "organization_id": 9999 }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn campaigns_do_not_leak_across_tenants() -> Result<()> {
    let app = TestApp::new();
    let org_a = app.create_organization("North Civic").await?;
    let org_b = app.create_organization("South Civic").await?;
    let (viewer_id, viewer_a) = app.user_with_token("viewer-a@example.org", Role::Viewer, Some(org_a)).await?;

    app.create_campaign("North drive", org_a, viewer_id).await?;
    let foreign = app.create_campaign("South drive", org_b, viewer_id).await?;

    let (status, body) = app.get("/api/campaigns", &viewer_a).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["campaigns"][0]["name"], "North drive");

    // Having created it does not grant access across tenants
    let (status, _) = app.get(&format!("/api/campaigns/{}", foreign.id), &viewer_a).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/campaigns/9999", &viewer_a).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn campaign_manager_edits_only_own_campaigns() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let (other_id, _) = app.user_with_token("other@example.org", Role::CampaignManager, Some(org)).await?;
    let (_, admin) = app.user_with_token("admin@example.org", Role::OrgAdmin, Some(org)).await?;

    let mine = app.create_campaign("Mine", org, manager_id).await?;
    let theirs = app.create_campaign("Theirs", org, other_id).await?;

    let (status, body) = app
        .put(&format!("/api/campaigns/{}", mine.id), &manager, json!({ "status": "paused" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["campaign"]["status"], "paused");

    let (status, _) = app
        .put(&format!("/api/campaigns/{}", theirs.id), &manager, json!({ "status": "paused" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(&format!("/api/campaigns/{}", mine.id), &manager, json!({ "status": "archived" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&format!("/api/campaigns/{}", theirs.id), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/campaigns/{}", theirs.id), &admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn analytics_record_and_aggregate() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (analyst_id, analyst) = app.user_with_token("analyst@example.org", Role::Analyst, Some(org)).await?;
    let (_, viewer) = app.user_with_token("viewer@example.org", Role::Viewer, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, analyst_id).await?;
    let uri = format!("/api/campaigns/{}/analytics", campaign.id);

    for (metric_type, value, platform) in [
        ("engagement", 120.0, "twitter"),
        ("engagement", 30.0, "facebook"),
        ("reach", 1000.0, "twitter"),
        ("sentiment", 0.8, "twitter"),
        ("sentiment", 0.4, "facebook"),
    ] {
        let (status, body) = app
            .post(
                &uri,
                &analyst,
                json!({ "metric_type": metric_type, "metric_value": value, "platform": platform }),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (status, _) = app
        .post(&uri, &viewer, json!({ "metric_type": "reach", "metric_value": 5.0 }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get(&uri, &viewer).await?;
    assert_eq!(status, StatusCode::OK);
    let metrics = &body["data"]["metrics"];
    assert_eq!(metrics["total_engagement"], 150.0);
    assert_eq!(metrics["total_reach"], 1000.0);
    let sentiment = metrics["average_sentiment"].as_f64().unwrap_or_default();
    assert!((sentiment - 0.6).abs() < 1e-9);
    assert_eq!(metrics["timeline"].as_array().map(Vec::len), Some(5));
    assert!(metrics["by_platform"]["twitter"].is_object());
    Ok(())
}
