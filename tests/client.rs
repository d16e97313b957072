use mockito::{Matcher, Server};
use node_red_flow::{
    client::{AdminClient, DeployRequest, FlowRuntime},
    config::{DeploymentType, ToolConfig},
    error::{ErrorCategory, FlowError},
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn config_for(server: &Server) -> ToolConfig {
    ToolConfig::new(server.url())
}

#[tokio::test]
async fn get_flows_sends_api_headers_and_decodes_rev() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/flows")
        .match_header("Node-RED-API-Version", "v2")
        .match_header("content-type", "application/json")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"rev":"abc123","flows":[{"id":"t1","type":"tab","label":"Main"}]}"#)
        .create_async()
        .await;

    let mut config = config_for(&server);
    config.token = Some("secret".into());
    let client = AdminClient::new(&config).unwrap();
    let flows = client.get_flows().await.unwrap();

    mock.assert_async().await;
    assert_eq!(flows.rev.as_deref(), Some("abc123"));
    assert_eq!(flows.flows.len(), 1);
}

#[tokio::test]
async fn admin_root_prefixes_every_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/admin/flows/state")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"state":"start"}"#)
        .create_async()
        .await;

    let mut config = config_for(&server);
    config.admin_api_root = "/admin".into();
    let client = AdminClient::new(&config).unwrap();
    let state = client.get_flows_state().await.unwrap();

    mock.assert_async().await;
    assert_eq!(state, json!({"state": "start"}));
}

#[tokio::test]
async fn deploy_sends_rev_and_deployment_type() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/flows")
        .match_header("Node-RED-Deployment-Type", "nodes")
        .match_body(Matcher::Json(json!({
            "flows": [{"id": "t1", "type": "tab", "label": "Main"}],
            "rev": "r1"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"rev":"r2"}"#)
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let result = client
        .deploy_flows(DeployRequest {
            flows: vec![json!({"id": "t1", "type": "tab", "label": "Main"})],
            rev: Some("r1".into()),
            deployment_type: Some(DeploymentType::Nodes),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.rev, "r2");
}

#[tokio::test]
async fn deploy_omits_empty_rev() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/flows")
        .match_header("Node-RED-Deployment-Type", Matcher::Missing)
        .match_body(Matcher::Json(json!({"flows": []})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"rev":"r9"}"#)
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    client
        .deploy_flows(DeployRequest {
            flows: Vec::new(),
            rev: Some(String::new()),
            deployment_type: None,
        })
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn stale_revision_maps_to_conflict() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/flows")
        .with_status(409)
        .with_body("version mismatch")
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let err = client
        .deploy_flows(DeployRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Conflict { .. }));
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert!(err.to_string().contains("version mismatch"));
}

#[tokio::test]
async fn rejected_token_maps_to_unauthorized() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/nodes")
        .with_status(401)
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let err = client.get_nodes().await.unwrap_err();
    assert!(matches!(err, FlowError::Unauthorized { status: 401, .. }));
    assert_eq!(err.category(), ErrorCategory::Authentication);
}

#[tokio::test]
async fn other_failures_keep_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/flows")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let err = client.get_flows().await.unwrap_err();
    assert!(matches!(err, FlowError::Api { status: 500, .. }));
    assert_eq!(err.category(), ErrorCategory::Remote);
}

#[tokio::test]
async fn read_only_refuses_writes_without_a_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;
    let put = server.mock("PUT", Matcher::Any).expect(0).create_async().await;

    let mut config = config_for(&server);
    config.read_only = true;
    let client = AdminClient::new(&config).unwrap();
    assert!(client.is_read_only());

    let err = client.deploy_flows(DeployRequest::default()).await.unwrap_err();
    assert!(matches!(err, FlowError::ReadOnly));
    assert!(matches!(
        client.add_flow(&json!({"label": "x"})).await,
        Err(FlowError::ReadOnly)
    ));
    assert!(matches!(
        client.update_flow("t1", &json!({})).await,
        Err(FlowError::ReadOnly)
    ));
    assert!(matches!(
        client.install_node("node-red-contrib-x").await,
        Err(FlowError::ReadOnly)
    ));

    mock.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn update_flow_encodes_the_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/flow/a%20b")
        .match_body(Matcher::Json(json!({"label": "Renamed"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"a b"}"#)
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let result = client
        .update_flow("a b", &json!({"label": "Renamed"}))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result, json!({"id": "a b"}));
}

#[tokio::test]
async fn add_flow_returns_new_id() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/flow")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"91ad451.f6e52b8"}"#)
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let result = client
        .add_flow(&json!({"label": "New", "nodes": []}))
        .await
        .unwrap();
    assert_eq!(result.id, "91ad451.f6e52b8");
}

#[tokio::test]
async fn non_json_bodies_come_back_as_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/nodes")
        .match_body(Matcher::Json(json!({"module": "node-red-contrib-foo"})))
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("installed")
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let result = client.install_node("node-red-contrib-foo").await.unwrap();
    mock.assert_async().await;
    assert_eq!(result, json!("installed"));
}

#[tokio::test]
async fn node_list_decodes_module_info() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/nodes")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id":"node-red/inject","name":"inject","types":["inject"],"enabled":true,
                "local":false,"module":"node-red","version":"4.0.0"}]"#,
        )
        .create_async()
        .await;

    let client = AdminClient::new(&config_for(&server)).unwrap();
    let nodes = client.get_nodes().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].types, vec!["inject".to_string()]);
    assert_eq!(nodes[0].version.as_deref(), Some("4.0.0"));
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let err = AdminClient::new(&ToolConfig::new("not a url")).unwrap_err();
    assert!(matches!(err, FlowError::Config(_)));
}
