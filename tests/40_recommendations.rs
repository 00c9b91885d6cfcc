mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use civic_api::types::Role;
use common::{error_code, TestApp};

#[tokio::test]
async fn narrative_architect_stores_and_audits() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, manager_id).await?;

    let (status, body) = app
        .post("/api/ai/narrative-architect", &manager, json!({ "campaign_id": campaign.id }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let recommendation = &body["data"]["recommendation"];
    assert_eq!(body["data"]["recommendation_id"], recommendation["id"]);
    assert_eq!(recommendation["agent_type"], "narrative_architect");
    assert_eq!(recommendation["status"], "pending");
    assert_eq!(recommendation["requested_by"], manager_id);
    assert_eq!(recommendation["recommendation_data"]["demo_mode"], true);

    let actions = app.audit_actions().await?;
    assert_eq!(actions.first().map(String::as_str), Some("recommendation_requested"));
    Ok(())
}

#[tokio::test]
async fn agents_validate_their_inputs() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, manager_id).await?;

    let (status, body) = app.post("/api/ai/narrative-architect", &manager, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["campaign_id"].is_string());

    let (status, body) = app
        .post("/api/ai/content-synthesizer", &manager, json!({ "campaign_id": campaign.id, "topic": "ballots" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["content_type"].is_string());

    let (status, _) = app
        .post(
            "/api/ai/content-synthesizer",
            &manager,
            json!({ "campaign_id": campaign.id, "content_type": "article", "topic": "Early voting" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/api/ai/distribution-optimizer", &manager, json!({ "campaign_id": campaign.id }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["content_summary"].is_string());

    let (status, body) = app
        .post("/api/ai/recommendations", &manager, json!({ "campaign_id": campaign.id, "agent_type": "oracle", "prompt": "hi" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, _) = app
        .post("/api/ai/narrative-architect", &manager, json!({ "campaign_id": 9999 }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn feedback_intelligence_is_stored_completed() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, manager_id).await?;

    let (status, body) = app
        .post(
            "/api/ai/feedback-intelligence",
            &manager,
            json!({ "campaign_id": campaign.id, "sample_comments": ["Great event!"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["recommendation"]["status"], "completed");

    // Completed analyses are not open for review
    let id = body["data"]["recommendation_id"].as_i64().unwrap_or_default();
    let (status, _) = app
        .send(Method::PUT, &format!("/api/ai/recommendations/{}/approve", id), Some(&manager), None)
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn generation_failure_stores_nothing() -> Result<()> {
    let app = TestApp::with_failing_generator();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, manager_id).await?;

    let (status, body) = app
        .post("/api/ai/narrative-architect", &manager, json!({ "campaign_id": campaign.id }))
        .await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "BAD_GATEWAY");

    let (_, body) = app.get("/api/ai/recommendations", &manager).await?;
    assert_eq!(body["data"]["total"], 0);

    let actions = app.audit_actions().await?;
    assert_eq!(actions, vec!["login_success"]);
    Ok(())
}

#[tokio::test]
async fn cross_tenant_requests_are_denied() -> Result<()> {
    let app = TestApp::new();
    let org_a = app.create_organization("North Civic").await?;
    let org_b = app.create_organization("South Civic").await?;
    let (owner_id, owner) = app.user_with_token("owner@example.org", Role::CampaignManager, Some(org_a)).await?;
    let (_, outsider) = app.user_with_token("outsider@example.org", Role::OrgAdmin, Some(org_b)).await?;
    let campaign = app.create_campaign("Turnout", org_a, owner_id).await?;

    let (status, _) = app
        .post("/api/ai/narrative-architect", &outsider, json!({ "campaign_id": campaign.id }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .post("/api/ai/narrative-architect", &owner, json!({ "campaign_id": campaign.id }))
        .await?;
    let id = body["data"]["recommendation_id"].as_i64().unwrap_or_default();

    let (status, _) = app.get(&format!("/api/ai/recommendations/{}", id), &outsider).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/ai/recommendations", &outsider).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let (status, _) = app
        .send(Method::PUT, &format!("/api/ai/recommendations/{}/approve", id), Some(&outsider), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn review_rules() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let (_, writer) = app.user_with_token("writer@example.org", Role::ContentCreator, Some(org)).await?;
    let (reviewer_id, reviewer) = app.user_with_token("reviewer@example.org", Role::Reviewer, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, manager_id).await?;

    let (_, body) = app
        .post("/api/ai/narrative-architect", &manager, json!({ "campaign_id": campaign.id }))
        .await?;
    let id = body["data"]["recommendation_id"].as_i64().unwrap_or_default();
    let base = format!("/api/ai/recommendations/{}", id);

    // Notes are checked before anything else, for every caller
    let (status, body) = app.put(&format!("{}/reject", base), &writer, json!({ "review_notes": "  " })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "review_notes is required for rejection");

    let (status, _) = app.send(Method::PUT, &format!("{}/approve", base), Some(&writer), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.put(&format!("{}/review", base), &reviewer, json!({ "status": "pending" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&format!("{}/review", base), &reviewer, json!({ "status": "approved", "review_notes": "Strong framing" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let recommendation = &body["data"]["recommendation"];
    assert_eq!(recommendation["status"], "approved");
    assert_eq!(recommendation["reviewed_by"], reviewer_id);
    assert_eq!(recommendation["review_notes"], "Strong framing");
    let reviewed_at = recommendation["reviewed_at"].clone();
    assert!(reviewed_at.is_string());

    // One-way: a second decision is a conflict and changes nothing
    let (status, body) = app.put(&format!("{}/reject", base), &manager, json!({ "review_notes": "Changed my mind" })).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");

    let (_, body) = app.get(&base, &manager).await?;
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["reviewed_by"], reviewer_id);
    assert_eq!(body["data"]["reviewed_at"], reviewed_at);

    let (_, body) = app.get("/api/ai/recommendations?status=approved", &manager).await?;
    assert_eq!(body["data"]["total"], 1);

    // The refused second decision left no trace in the audit log
    let actions = app.audit_actions().await?;
    assert_eq!(actions.first().map(String::as_str), Some("recommendation_reviewed"));
    assert_eq!(actions.iter().filter(|a| a.as_str() == "recommendation_reviewed").count(), 1);
    Ok(())
}

#[tokio::test]
async fn rejection_with_notes_is_recorded_once() -> Result<()> {
    let app = TestApp::new();
    let org = app.create_organization("North Civic").await?;
    let (manager_id, manager) = app.user_with_token("manager@example.org", Role::CampaignManager, Some(org)).await?;
    let (reviewer_id, reviewer) = app.user_with_token("reviewer@example.org", Role::Reviewer, Some(org)).await?;
    let campaign = app.create_campaign("Turnout", org, manager_id).await?;

    let (_, body) = app
        .post("/api/ai/narrative-architect", &manager, json!({ "campaign_id": campaign.id }))
        .await?;
    let id = body["data"]["recommendation_id"].as_i64().unwrap_or_default();
    let reject = format!("/api/ai/recommendations/{}/reject", id);

    let (status, body) = app.put(&reject, &reviewer, json!({ "review_notes": "" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["review_notes"].is_string());

    let (status, body) = app.put(&reject, &reviewer, json!({ "review_notes": "not aligned" })).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["message"], "Recommendation rejected successfully");
    let recommendation = &body["data"]["recommendation"];
    assert_eq!(recommendation["status"], "rejected");
    assert_eq!(recommendation["reviewed_by"], reviewer_id);
    assert_eq!(recommendation["review_notes"], "not aligned");
    let reviewed_at = recommendation["reviewed_at"].clone();
    assert!(reviewed_at.is_string());

    let (status, _) = app
        .send(Method::PUT, &format!("/api/ai/recommendations/{}/approve", id), Some(&manager), None)
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get(&format!("/api/ai/recommendations/{}", id), &manager).await?;
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["reviewed_by"], reviewer_id);
    assert_eq!(body["data"]["reviewed_at"], reviewed_at);

    let actions = app.audit_actions().await?;
    assert_eq!(actions.iter().filter(|a| a.as_str() == "recommendation_reviewed").count(), 1);
    Ok(())
}
