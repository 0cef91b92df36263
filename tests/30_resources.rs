mod common;

use anyhow::Result;
use axum::http::StatusCode;
use cookbook::error::AppError;
use serde_json::json;

/// Ids across every listing page of `key`, stopping at the first empty page.
async fn listed_ids(app: &common::TestApp, token: &str, key: &str) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for page in 1.. {
        let (status, body) = app.call("GET", &format!("/api/v1/{key}/{page}"), Some(token), None).await?;
        if status == StatusCode::NOT_FOUND {
            break;
        }
        anyhow::ensure!(status == StatusCode::OK, "list {key}: {status}");
        ids.extend(body[key].as_array().into_iter().flatten().filter_map(|r| r["id"].as_i64()));
    }
    Ok(ids)
}

#[tokio::test]
async fn recipe_crud_with_soft_delete() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let token = app.token().await?;
    let id = app.recipe(&token).await?;
    let uri = format!("/api/v1/recipes/id/{id}");

    let (status, body) = app.call("GET", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let recipe = &body["recipes"][0];
    assert_eq!(recipe["servings"], 2);
    assert_eq!(recipe["cook_time"], 30);
    assert_eq!(recipe["ingredients"], json!([]));
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["per_page"], 10);

    let (status, body) = app
        .call("PUT", &uri, Some(&token), Some(json!({"cook_time": "15", "colour": "red"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipes"][0]["cook_time"], 15);

    let (status, _) = app.call("PUT", &uri, Some(&token), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call("DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // still addressable by id after removal
    let (status, body) = app.call("GET", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipes"][0]["is_publish"], false);
    Ok(())
}

#[tokio::test]
async fn ingredients_are_unique_per_recipe_and_hard_deleted() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let token = app.token().await?;
    let recipe_id = app.recipe(&token).await?;
    let payload = json!({"name": "flour", "unit": "g", "count": "200", "recipe_id": recipe_id});

    let (status, body) = app.call("POST", "/api/v1/ingredient", Some(&token), Some(payload.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["ingredient"][0]["id"].as_i64().unwrap();
    assert_eq!(body["ingredient"][0]["count"], 200);

    let (status, _) = app.call("POST", "/api/v1/ingredient", Some(&token), Some(payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.call("GET", &format!("/api/v1/recipes/id/{recipe_id}"), Some(&token), None).await?;
    assert_eq!(body["recipes"][0]["ingredients"][0]["name"], "flour");

    let uri = format!("/api/v1/ingredient/id/{id}");
    let (status, _) = app.call("DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::GONE);
    let (status, _) = app.call("GET", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_create_payloads_fail_whole() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let token = app.token().await?;

    let (status, body) = app
        .call("POST", "/api/v1/recipes-classification", Some(&token), Some(json!({"name": "x", "bogus": 1})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _) = app
        .call("POST", "/api/v1/recipes", Some(&token), Some(json!({"name": "orphan", "classification_id": i64::MAX})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn page_past_the_end_is_not_found() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let token = app.token().await?;

    let (status, body) = app.call("GET", "/api/v1/recipes/100000", Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No matching Recipe records found");

    let (status, _) = app.call("GET", "/api/v1/recipes/0", Some(&token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn soft_deleted_rows_leave_the_listing() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let token = app.token().await?;
    let (status, body) = app
        .call(
            "POST",
            "/api/v1/recipes-classification",
            Some(&token),
            Some(json!({"name": common::unique("vis"), "is_publish": true})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["recipes-classification"][0]["id"].as_i64().unwrap();

    assert!(listed_ids(&app, &token, "recipes-classification").await?.contains(&id));

    let (status, _) = app
        .call("DELETE", &format!("/api/v1/recipes-classification/id/{id}"), Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!listed_ids(&app, &token, "recipes-classification").await?.contains(&id));
    Ok(())
}

#[tokio::test]
async fn updates_enforce_create_text_bounds() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let token = app.token().await?;
    let (_, body) = app
        .call(
            "POST",
            "/api/v1/recipes-classification",
            Some(&token),
            Some(json!({"name": common::unique("len")})),
        )
        .await?;
    let id = body["recipes-classification"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/recipes-classification/id/{id}");

    for name in ["x".repeat(40), String::new()] {
        let (status, body) = app.call("PUT", &uri, Some(&token), Some(json!({"name": name}))).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["status"], 400);
    }

    let (status, _) = app
        .call("POST", "/api/v1/recipes-classification", Some(&token), Some(json!({"name": "x".repeat(40)})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn oversized_values_from_the_database_are_validation_errors() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let err = sqlx::query("INSERT INTO recipe_classifications (name) VALUES ($1)")
        .bind("x".repeat(40))
        .execute(&app.db)
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(err), AppError::Validation(_)));

    let err = sqlx::query("SELECT $1::int4 * 1000000")
        .bind(i32::MAX)
        .execute(&app.db)
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(err), AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn recipe_without_name_is_rejected() -> Result<()> {
    let Some(app) = common::app().await? else { return Ok(()) };
    let token = app.token().await?;
    let (status, _) = app
        .call("POST", "/api/v1/recipes", Some(&token), Some(json!({"classification_id": 1})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
