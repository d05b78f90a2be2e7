//! Chat history tests

use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::TestApp;

async fn create_chat(app: &TestApp, token: &str, body: Value) -> Value {
    let response = app.post_json_as("/api/v1/chats", token, body).await;
    response.assert_ok();
    response.json::<Value>()["chat"].clone()
}

fn chat_id(chat: &Value) -> Uuid {
    chat["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_requires_session() {
    let app = TestApp::new().await;

    app.get("/api/v1/chats").await.assert_unauthorized();
    app.post_json("/api/v1/chats", json!({ "model": "gpt-4o" }))
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_create_uses_default_title() {
    let app = TestApp::new().await;
    let user = app.seed_user("chatter@example.com").await;
    let token = app.seed_session(user).await;

    let chat = create_chat(&app, &token, json!({ "model": "gpt-4o" })).await;
    assert_eq!(chat["title"], "New Chat");
    assert_eq!(chat["model"], "gpt-4o");
    assert_eq!(chat["status"], "active");
    assert_eq!(chat["messageCount"], 0);
    assert!(chat.get("userId").is_none());

    let chat = create_chat(&app, &token, json!({ "title": "   ", "model": "gpt-4o" })).await;
    assert_eq!(chat["title"], "New Chat");

    let chat = create_chat(&app, &token, json!({ "title": "Trip", "model": "gpt-4o" })).await;
    assert_eq!(chat["title"], "Trip");
}

#[tokio::test]
async fn test_create_rejects_missing_model() {
    let app = TestApp::new().await;
    let user = app.seed_user("nomodel@example.com").await;
    let token = app.seed_session(user).await;

    let response = app
        .post_json_as("/api/v1/chats", &token, json!({ "title": "x" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_messages_are_sequenced_in_order() {
    let app = TestApp::new().await;
    let user = app.seed_user("seq@example.com").await;
    let token = app.seed_session(user).await;
    let chat = create_chat(&app, &token, json!({ "model": "gpt-4o" })).await;
    let uri = format!("/api/v1/chats/{}/messages", chat_id(&chat));

    let turns = [("system", "be brief"), ("user", "hi"), ("assistant", "hello")];
    for (i, (role, content)) in turns.iter().enumerate() {
        let response = app
            .post_json_as(&uri, &token, json!({ "role": role, "content": content }))
            .await;
        response.assert_ok();
        let message: Value = response.json();
        assert_eq!(message["sequence"], i as i64 + 1);
        assert_eq!(message["role"], *role);
        assert!(message.get("chatId").is_none());
    }

    let response = app
        .get_as(&format!("/api/v1/chats/{}", chat_id(&chat)), &token)
        .await;
    response.assert_ok();
    let detail: Value = response.json();
    assert_eq!(detail["chat"]["messageCount"], 3);

    let messages = detail["messages"].as_array().unwrap();
    let sequences: Vec<i64> = messages
        .iter()
        .map(|m| m["sequence"].as_i64().unwrap())
        .collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(messages[1]["content"], "hi");
}

#[tokio::test]
async fn test_unknown_role_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("role@example.com").await;
    let token = app.seed_session(user).await;
    let chat = create_chat(&app, &token, json!({ "model": "gpt-4o" })).await;

    let response = app
        .post_json_as(
            &format!("/api/v1/chats/{}/messages", chat_id(&chat)),
            &token,
            json!({ "role": "tool", "content": "x" }),
        )
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_orders_by_last_activity() {
    let app = TestApp::new().await;
    let user = app.seed_user("order@example.com").await;
    let token = app.seed_session(user).await;

    let older = create_chat(&app, &token, json!({ "title": "older", "model": "m" })).await;
    create_chat(&app, &token, json!({ "title": "newer", "model": "m" })).await;

    let titles = |list: &Value| -> Vec<String> {
        list["chats"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["title"].as_str().unwrap().to_string())
            .collect()
    };

    let list: Value = app.get_as("/api/v1/chats", &token).await.json();
    assert_eq!(titles(&list), vec!["newer", "older"]);

    // A new message moves the chat to the top
    app.post_json_as(
        &format!("/api/v1/chats/{}/messages", chat_id(&older)),
        &token,
        json!({ "role": "user", "content": "ping" }),
    )
    .await
    .assert_ok();

    let list: Value = app.get_as("/api/v1/chats", &token).await.json();
    assert_eq!(titles(&list), vec!["older", "newer"]);
    assert_eq!(list["chats"][0]["messageCount"], 1);
}

#[tokio::test]
async fn test_other_users_chat_is_not_found() {
    let app = TestApp::new().await;
    let owner = app.seed_user("owner@example.com").await;
    let owner_token = app.seed_session(owner).await;
    let intruder = app.seed_user("intruder@example.com").await;
    let intruder_token = app.seed_session(intruder).await;

    let chat = create_chat(&app, &owner_token, json!({ "model": "gpt-4o" })).await;
    let uri = format!("/api/v1/chats/{}", chat_id(&chat));

    let response = app.get_as(&uri, &intruder_token).await;
    response.assert_not_found();
    assert_eq!(response.message(), "Chat not found");

    app.patch_json_as(&uri, &intruder_token, json!({ "title": "mine" }))
        .await
        .assert_not_found();
    app.post_json_as(
        &format!("{}/messages", uri),
        &intruder_token,
        json!({ "role": "user", "content": "hi" }),
    )
    .await
    .assert_not_found();
    app.delete_as(&uri, &intruder_token).await.assert_not_found();

    let list: Value = app.get_as("/api/v1/chats", &intruder_token).await.json();
    assert!(list["chats"].as_array().unwrap().is_empty());

    // Untouched for the owner
    let detail: Value = app.get_as(&uri, &owner_token).await.json();
    assert_eq!(detail["chat"]["title"], "New Chat");
    assert_eq!(detail["chat"]["status"], "active");
    assert_eq!(detail["chat"]["messageCount"], 0);
}

#[tokio::test]
async fn test_unknown_chat_is_not_found() {
    let app = TestApp::new().await;
    let user = app.seed_user("ghost@example.com").await;
    let token = app.seed_session(user).await;

    app.get_as(&format!("/api/v1/chats/{}", Uuid::new_v4()), &token)
        .await
        .assert_not_found();
    app.get_as("/api/v1/chats/not-a-uuid", &token)
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_update_title_and_archive() {
    let app = TestApp::new().await;
    let user = app.seed_user("editor@example.com").await;
    let token = app.seed_session(user).await;
    let chat = create_chat(&app, &token, json!({ "model": "gpt-4o" })).await;
    let uri = format!("/api/v1/chats/{}", chat_id(&chat));

    let response = app
        .patch_json_as(&uri, &token, json!({ "title": "Renamed" }))
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["status"], "active");

    // Blank title leaves the current one in place
    let updated: Value = app
        .patch_json_as(&uri, &token, json!({ "title": " ", "status": "archived" }))
        .await
        .json();
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["status"], "archived");

    // Archived chats are still listed
    let list: Value = app.get_as("/api/v1/chats", &token).await.json();
    assert_eq!(list["chats"][0]["status"], "archived");
}

#[tokio::test]
async fn test_deleted_chat_is_hidden() {
    let app = TestApp::new().await;
    let user = app.seed_user("cleaner@example.com").await;
    let token = app.seed_session(user).await;
    let chat = create_chat(&app, &token, json!({ "model": "gpt-4o" })).await;
    let id = chat_id(&chat);
    let uri = format!("/api/v1/chats/{}", id);

    let response = app.delete_as(&uri, &token).await;
    response.assert_ok();
    assert_eq!(response.json::<Value>()["success"], true);

    app.get_as(&uri, &token).await.assert_not_found();
    app.patch_json_as(&uri, &token, json!({ "status": "active" }))
        .await
        .assert_not_found();
    app.post_json_as(
        &format!("{}/messages", uri),
        &token,
        json!({ "role": "user", "content": "hello?" }),
    )
    .await
    .assert_not_found();
    app.delete_as(&uri, &token).await.assert_not_found();

    let list: Value = app.get_as("/api/v1/chats", &token).await.json();
    assert!(list["chats"].as_array().unwrap().is_empty());

    // Row survives with deleted status
    let status: String = sqlx::query_scalar("SELECT status FROM chats WHERE id = ?")
        .bind(id.to_string())
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(status, "deleted");
}

#[tokio::test]
async fn test_delete_through_status_update() {
    let app = TestApp::new().await;
    let user = app.seed_user("patcher@example.com").await;
    let token = app.seed_session(user).await;
    let chat = create_chat(&app, &token, json!({ "model": "gpt-4o" })).await;
    let uri = format!("/api/v1/chats/{}", chat_id(&chat));

    let updated: Value = app
        .patch_json_as(&uri, &token, json!({ "status": "deleted" }))
        .await
        .json();
    assert_eq!(updated["status"], "deleted");

    app.get_as(&uri, &token).await.assert_not_found();
}
