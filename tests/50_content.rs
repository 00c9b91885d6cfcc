mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use civic_api::types::Role;
use common::TestApp;

#[tokio::test]
async fn content_lifecycle() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (writer_id, writer) = app.user_with_token("writer@example.org", Role::ContentCreator, Some(org)).await?;
    let (_, reviewer) = app.user_with_token("reviewer@example.org", Role::Reviewer, Some(org)).await?;
    let (_, admin) = app.user_with_token("admin@example.org", Role::OrgAdmin, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, writer_id).await?;

    let (status, body) = app
        .post(
            &format!("/api/campaigns/{}/content", campaign.id),
            &writer,
            json!({ "content_type": "post", "title": "Vote early", "body": "Polls open at 7am." }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["content"]["status"], "draft");
    assert_eq!(body["data"]["content"]["ai_generated"], false);
    let id = body["data"]["content"]["id"].as_i64().unwrap_or_default();

    // Publishing skips approval: refused
    let (status, _) = app
        .send(Method::PUT, &format!("/api/content/{}/publish", id), Some(&admin), None)
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::PUT, &format!("/api/content/{}/approve", id), Some(&writer), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PUT, &format!("/api/content/{}/approve", id), Some(&reviewer), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"]["status"], "approved");

    let (status, _) = app
        .send(Method::PUT, &format!("/api/content/{}/approve", id), Some(&reviewer), None)
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::PUT, &format!("/api/content/{}/publish", id), Some(&reviewer), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PUT, &format!("/api/content/{}/publish", id), Some(&admin), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"]["status"], "published");
    assert!(body["data"]["content"]["published_at"].is_string());

    let (_, body) = app.get(&format!("/api/campaigns/{}/content", campaign.id), &writer).await?;
    assert_eq!(body["data"]["total"], 1);

    let actions = app.audit_actions().await?;
    assert_eq!(&actions[..3], ["content_published", "content_approved", "content_created"]);
    Ok(())
}

#[tokio::test]
async fn content_from_recommendation_carries_provenance() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, manager_id).await?;
    let other = app.create_campaign("Other", org, manager_id).await?;

    let (_, body) = app
        .post(
            "/api/ai/content-synthesizer",
            &manager,
            json!({ "campaign_id": campaign.id, "content_type": "post", "topic": "Polling places" }),
        )
        .await?;
    let recommendation_id = body["data"]["recommendation_id"].as_i64().unwrap_or_default();
    let create = |campaign_id: i64| {
        (
            format!("/api/campaigns/{}/content", campaign_id),
            json!({ "content_type": "post", "body": "Find your polling place.", "recommendation_id": recommendation_id }),
        )
    };

    // Still pending
    let (uri, payload) = create(campaign.id);
    let (status, body) = app.post(&uri, &manager, payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["recommendation_id"].is_string());

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/ai/recommendations/{}/approve", recommendation_id),
            Some(&manager),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (uri, payload) = create(other.id);
    let (status, _) = app.post(&uri, &manager, payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (uri, payload) = create(campaign.id);
    let (status, body) = app.post(&uri, &manager, payload).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let content = &body["data"]["content"];
    assert_eq!(content["ai_generated"], true);
    assert_eq!(content["provenance_metadata"]["recommendation_id"], recommendation_id);
    assert_eq!(content["provenance_metadata"]["agent_type"], "content_synthesizer");
    assert_eq!(content["provenance_metadata"]["model_used"], "demo-mode");
    Ok(())
}

#[tokio::test]
async fn viewers_and_outsiders_cannot_create_content() -> Result<()> {
    let app = TestApp::new();
    let org_a = app.create_organization("North Civic").await?;
    let org_b = app.create_organization("South Civic").await?;
    let (viewer_id, viewer) = app.user_with_token("viewer@example.org", Role::Viewer, Some(org_a)).await?;
    let (_, outsider) = app.user_with_token("outsider@example.org", Role::ContentCreator, Some(org_b)).await?;
    let campaign = app.create_campaign("Turnout", org_a, viewer_id).await?;
    let uri = format!("/api/campaigns/{}/content", campaign.id);
    let payload = json!({ "content_type": "article", "body": "Text" });

    let (status, _) = app.post(&uri, &viewer, payload.clone()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post(&uri, &outsider, payload).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&uri, &outsider).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
