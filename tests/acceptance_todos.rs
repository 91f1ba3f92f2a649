use axum::body::to_bytes;
use axum::Router;
use serde_json::{json, Value};
use todo_backend::application::todo_service::TodoServiceImpl;
use todo_backend::domain::repository::TodoRepository;
use todo_backend::http::{routes::todos, routing};
use todo_backend::infrastructure::{json_repo::JsonTodoRepository, sqlite_repo::SqliteTodoRepository};

fn app<R: TodoRepository + Clone>(repo: R) -> Router {
    routing::app(todos::router(todos::AppState { service: TodoServiceImpl::new(repo) }))
}

#[tokio::test]
async fn acceptance_create_list_get_update_delete_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    let repo = JsonTodoRepository::open_path(&path).unwrap();
    crud_flow(&app(repo)).await;

    let on_disk: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!([]));
}

#[tokio::test]
async fn acceptance_create_list_get_update_delete_sqlite() {
    let repo = SqliteTodoRepository::connect("sqlite::memory:").await.unwrap();
    repo.init().await.unwrap();
    crud_flow(&app(repo)).await;
}

async fn crud_flow(app: &Router) {
    // create
    let payload = json!({ "title": "Test", "description": "First", "dueDate": "2024-06-01" });
    let res = request(app, "POST", "/api/v1/todos", Some(payload)).await;
    assert_eq!(res.status(), 200);
    let created = body_json(res).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["dueDate"], "2024-06-01");

    // list
    let res = request(app, "GET", "/api/v1/todos", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await, json!([created]));

    // get
    let res = request(app, "GET", &format!("/api/v1/todos/{id}"), None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await["title"], "Test");

    // update
    let edited = json!({ "id": id, "title": "Test", "description": "Edited", "dueDate": "2024-07-01" });
    let res = request(app, "PUT", "/api/v1/todos", Some(edited.clone())).await;
    assert_eq!(res.status(), 200);
    let res = request(app, "GET", &format!("/api/v1/todos/{id}"), None).await;
    assert_eq!(body_json(res).await, edited);

    // delete
    let res = request(app, "DELETE", &format!("/api/v1/todos/{id}"), None).await;
    assert_eq!(res.status(), 204);

    // get 404
    let res = request(app, "GET", &format!("/api/v1/todos/{id}"), None).await;
    assert_eq!(res.status(), 404);
    assert!(body_json(res).await["message"].as_str().unwrap().contains("not found"));

    // update and delete of the missing id
    let res = request(app, "PUT", "/api/v1/todos", Some(edited)).await;
    assert_eq!(res.status(), 404);
    let res = request(app, "DELETE", &format!("/api/v1/todos/{id}"), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_list_query_parameters() {
    let repo = JsonTodoRepository::open(std::io::Cursor::new(Vec::new())).unwrap();
    let app = app(repo);
    for (title, description) in [("Buy Eggs", ""), ("buy milk", ""), ("Omelette", "two eggs"), ("Scramble", "EGGS")] {
        let res = request(&app, "POST", "/api/v1/todos", Some(json!({ "title": title, "description": description }))).await;
        assert_eq!(res.status(), 200);
    }

    let res = request(&app, "GET", "/api/v1/todos?filter=eggs&sortBy=title&sortType=desc", None).await;
    let titles: Vec<String> = body_json(res)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Scramble", "Omelette", "Buy Eggs"]);

    let res = request(&app, "GET", "/api/v1/todos?filter=eggs&sortBy=title&page=2&limit=2", None).await;
    let page = body_json(res).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["title"], "Scramble");

    let res = request(&app, "GET", "/api/v1/todos?page=9", None).await;
    assert_eq!(body_json(res).await, json!([]));

    let res = request(&app, "GET", "/api/v1/todos?limit=ten", None).await;
    assert_eq!(res.status(), 400);
    let res = request(&app, "GET", "/api/v1/todos?page=two", None).await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn acceptance_empty_query_values_take_defaults() {
    let app = app(JsonTodoRepository::open(std::io::Cursor::new(Vec::new())).unwrap());
    for i in 0..12 {
        let res = request(&app, "POST", "/api/v1/todos", Some(json!({ "title": format!("todo {i}") }))).await;
        assert_eq!(res.status(), 200);
    }

    for uri in [
        "/api/v1/todos?filter=&sortBy=&sortType=&page=&limit=",
        "/api/v1/todos?limit=&page=",
        "/api/v1/todos?filter=&sortBy=&sortType=&page=1&limit=",
    ] {
        let res = request(&app, "GET", uri, None).await;
        assert_eq!(res.status(), 200, "{uri}");
        assert_eq!(body_json(res).await.as_array().unwrap().len(), 10, "{uri}");
    }

    let res = request(&app, "GET", "/api/v1/todos?page=2&limit=", None).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn acceptance_partial_bodies_blank_missing_fields() {
    let app = app(JsonTodoRepository::open(std::io::Cursor::new(Vec::new())).unwrap());
    let payload = json!({ "title": "full", "description": "kept?", "dueDate": "2025-01-01" });
    let created = body_json(request(&app, "POST", "/api/v1/todos", Some(payload)).await).await;
    let id = created["id"].as_i64().unwrap();

    let res = request(&app, "PUT", "/api/v1/todos", Some(json!({ "id": id, "title": "x" }))).await;
    assert_eq!(res.status(), 200);
    let res = request(&app, "GET", &format!("/api/v1/todos/{id}"), None).await;
    assert_eq!(body_json(res).await, json!({ "id": id, "title": "x", "description": "", "dueDate": "" }));

    let res = request(&app, "PUT", "/api/v1/todos", Some(json!({ "title": "no id" }))).await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn acceptance_bad_input_and_cors() {
    let app = app(JsonTodoRepository::open(std::io::Cursor::new(Vec::new())).unwrap());

    let res = request(&app, "GET", "/api/v1/todos/not-a-number", None).await;
    assert_eq!(res.status(), 400);

    let res = request(&app, "OPTIONS", "/api/v1/todos", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let res = request(&app, "GET", "/health", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}

async fn body_json(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn request(app: &Router, method: &str, path: &str, body: Option<Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}
