//! Verify the `build_*` methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector names an operation, its inputs and the `ApiCall` it must
//! produce. Bodies are compared as parsed JSON, so field order is irrelevant.

use serde_json::Value;
use ticktick_core::{
    ApiCall, ClientConfig, HttpMethod, NewTask, ProjectUpdate, TaskQuery, TaskUpdate,
    TickTickClient,
};

fn client() -> TickTickClient {
    TickTickClient::new(ClientConfig::new("id", "secret").with_base_url("http://localhost:3000"))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn str_field<'a>(case: &'a Value, key: &str) -> &'a str {
    case[key]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field {key}"))
}

fn assert_call(name: &str, call: &ApiCall, expected: &Value) {
    assert_eq!(call.method, parse_method(str_field(expected, "method")), "{name}: method");
    assert_eq!(call.endpoint, str_field(expected, "endpoint"), "{name}: endpoint");
    let body = call.body.clone().unwrap_or(Value::Null);
    assert_eq!(body, expected["body"], "{name}: body");
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[test]
fn task_test_vectors() {
    let raw = include_str!("../../test-vectors/tasks.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = str_field(case, "name");
        let call = match str_field(case, "operation") {
            "add_task" => {
                let input: NewTask = serde_json::from_value(case["input"].clone()).unwrap();
                c.build_add_task(&input).unwrap()
            }
            "update_task" => {
                let input: TaskUpdate = serde_json::from_value(case["input"].clone()).unwrap();
                c.build_update_task(str_field(case, "id"), &input).unwrap()
            }
            "get_task" => c.build_get_task(str_field(case, "id")),
            "delete_task" => c.build_delete_task(str_field(case, "id")),
            "search_tasks" => c.build_search_tasks(str_field(case, "keyword")),
            other => panic!("{name}: unknown operation {other}"),
        };
        assert_call(name, &call, &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// List tasks
// ---------------------------------------------------------------------------

fn query_from(value: &Value) -> TaskQuery {
    let mut query = TaskQuery::default();
    if let Some(filter) = value["filter"].as_str() {
        query = query.filter(filter);
    }
    if let Some(date) = value["startDate"].as_str() {
        query = query.start_date(date);
    }
    if let Some(date) = value["endDate"].as_str() {
        query = query.end_date(date);
    }
    if let Some(list_id) = value["listId"].as_str() {
        query = query.list(list_id);
    }
    query
}

#[test]
fn list_tasks_test_vectors() {
    let raw = include_str!("../../test-vectors/list_tasks.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = str_field(case, "name");
        let call = c.build_list_tasks(&query_from(&case["query"]));
        assert_eq!(call.method, HttpMethod::Get, "{name}: method");
        assert_eq!(call.endpoint, str_field(case, "expected_endpoint"), "{name}: endpoint");
        assert!(call.body.is_none(), "{name}: body should be None");
    }
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/lists.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = str_field(case, "name");
        let call = match str_field(case, "operation") {
            "create_list" => c.build_create_list(str_field(case, "title")).unwrap(),
            "update_list" => {
                let input: ProjectUpdate = serde_json::from_value(case["input"].clone()).unwrap();
                c.build_update_list(str_field(case, "id"), &input).unwrap()
            }
            "delete_list" => c.build_delete_list(str_field(case, "id")),
            "get_lists" => c.build_get_lists(),
            other => panic!("{name}: unknown operation {other}"),
        };
        assert_call(name, &call, &case["expected_request"]);
    }
}
