//! Client operations against a local partner API double.
//!
//! Drives the real `CachedSession` over HTTP so headers, bodies and caching are exercised
//! end to end.

use igb_client::{
    IgbClient, IgbConfig, IgbError,
    model::{AtsCredential, ContractCredential, CredentialMap, JobBoard, OfccpCredential},
    transport::CachedSession,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const API_KEY: &str = "partner-key";
const STORAGE: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
const TRANSPORT: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";

fn client(server: &ServerGuard) -> IgbClient {
    let mut config = IgbConfig::new(API_KEY, "acc", STORAGE, TRANSPORT);
    config.base_url = server.url();
    let session = CachedSession::new(&config).expect("session should build");
    IgbClient::with_session(config, session).expect("client should build")
}

fn creds() -> CredentialMap {
    [("username".to_owned(), "recruiter".to_owned())].into_iter().collect()
}

#[test]
fn test_list_job_boards_sends_api_key() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/acc/")
        .match_header("x-igb-api-key", API_KEY)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"HAPI": {"jobboards": [
                {"jobboard": {"name": "Indeed", "class": "indeed", "logo": "https://cdn/indeed.png"}},
                {"jobboard": {"name": "Monster", "class": "monster"}}
            ]}})
            .to_string(),
        )
        .create();

    let boards = client(&server).list_job_boards().expect("listing should succeed");

    mock.assert();
    let classes: Vec<&str> = boards.iter().map(JobBoard::pk).collect();
    assert_eq!(classes, ["indeed", "monster"]);
    assert_eq!(boards[0].logo.as_deref(), Some("https://cdn/indeed.png"));
}

#[test]
fn test_successful_get_is_cached() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/acc/")
        .with_status(200)
        .with_body(r#"{"HAPI": {"jobboards": []}}"#)
        .expect(1)
        .create();

    let client = client(&server);
    assert!(client.list_job_boards().unwrap().is_empty());
    assert!(client.list_job_boards().unwrap().is_empty());

    mock.assert();
    assert_eq!(client.session().cached_len(), 1);
}

#[test]
fn test_failed_get_is_not_cached() {
    let mut server = Server::new();
    let mock = server.mock("GET", "/acc/missing").with_status(404).expect(2).create();

    let client = client(&server);
    for _ in 0..2 {
        let err = client.job_board_detail("missing").unwrap_err();
        assert!(matches!(err, IgbError::Transport { status: 404 }));
    }

    mock.assert();
    assert_eq!(client.session().cached_len(), 0);
}

#[test]
fn test_job_board_detail_is_normalized() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/acc/indeed")
        .with_status(200)
        .with_body(
            json!({"HAPI": {"jobboard": {
                "name": "Indeed",
                "class": "indeed",
                "instructions": "Post daily",
                "MOC": {"rules": [{"rule": {"min": 1}}]},
                "OFCCP": {"credentials": [
                    {"credential": {"name": "username"}},
                    {"credential": {"name": "password"}}
                ]},
                "facets": [{"facet": {"key": "region", "params": [
                    {"param": "term"},
                    {"term": {"field": "title"}}
                ]}}]
            }}})
            .to_string(),
        )
        .create();

    let board = client(&server).job_board_detail("indeed").unwrap().expect("board exists");

    assert_eq!(board.instructions.as_deref(), Some("Post daily"));
    assert_eq!(board.moc, json!({"rules": [{"min": 1}]}));
    assert_eq!(board.ofccp, json!({"credentials": [{"name": "username"}, {"name": "password"}]}));
    assert_eq!(board.facets[0]["params"], json!(["term"]));
    assert_eq!(board.facets[0]["params_source"], json!({"term": {"field": "title"}}));
}

#[test]
fn test_job_board_detail_absent() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/acc/gone")
        .with_status(200)
        .with_body(r#"{"HAPI": {"jobboard": null}}"#)
        .create();

    assert_eq!(client(&server).job_board_detail("gone").unwrap(), None);
}

#[test]
fn test_board_facets() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/acc/indeed/facet/region/custom")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({"params": {"term": "ne"}})))
        .with_status(200)
        .with_body(
            json!({"options": [
                {"option": {"key": "nl", "label": "Netherlands"}},
                {"bogus": {}}
            ]})
            .to_string(),
        )
        .create();

    let facets = client(&server).board_facets("indeed", "region", &creds(), Some("ne")).unwrap();

    mock.assert();
    assert_eq!(facets.len(), 1);
    assert_eq!(facets[0].key, "nl");
    assert_eq!(facets[0].label, "Netherlands");
}

#[test]
fn test_board_facets_never_sends_plaintext() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/acc/indeed/facet/region/custom")
        .match_body(Matcher::Regex("recruiter".to_owned()))
        .with_status(200)
        .with_body("{}")
        .expect(0)
        .create();
    let _fallback = server
        .mock("POST", "/acc/indeed/facet/region/custom")
        .with_status(200)
        .with_body("{}")
        .create();

    let facets = client(&server).board_facets("indeed", "region", &creds(), None).unwrap();

    mock.assert();
    assert!(facets.is_empty());
}

#[test]
fn test_validate_facet() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/acc/indeed/facet/region/custom/validate")
        .match_body(Matcher::PartialJson(json!({"params": {"keys": [{"key": "nl"}]}})))
        .with_status(200)
        .with_body(r#"{"valid": true}"#)
        .create();

    let valid = client(&server).validate_facet("indeed", "region", &creds(), &["nl"]).unwrap();

    mock.assert();
    assert!(valid);
}

#[test]
fn test_submit_contract_posts_xml() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/acc/")
        .match_header("content-type", "application/xml; charset=utf-8")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<MyContract><jobboards><jobboard><class>indeed</class>".to_owned()),
            Matcher::Regex("<credential><name>username</name><value>".to_owned()),
        ]))
        .with_status(201)
        .expect(2)
        .create();

    let client = client(&server);
    let contract = ContractCredential::new(JobBoard::new("Indeed", "indeed"), creds());
    client.submit_contract(&contract).unwrap();
    client.submit_contract(&contract).unwrap();

    mock.assert();
    assert_eq!(contract.credentials["username"], "recruiter");
}

#[test]
fn test_submit_ofccp_posts_one_document() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/acc/")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("^<\\?xml[^>]*\\?><OFCCP><ATS>".to_owned()),
            Matcher::Regex("<company><name>ACME</name>".to_owned()),
            Matcher::Regex("<jobboards><jobboard><class>indeed</class>".to_owned()),
        ]))
        .with_status(200)
        .create();

    let ofccp = OfccpCredential::new(
        AtsCredential {
            ats_id: "7".to_owned(),
            ats_name: "Recruitee".to_owned(),
            company_name: "ACME".to_owned(),
            company_id: "42".to_owned(),
            credentials: CredentialMap::new(),
        },
        vec![ContractCredential::new(JobBoard::new("Indeed", "indeed"), creds())],
    );
    client(&server).submit_ofccp(&ofccp).unwrap();

    mock.assert();
}

#[test]
fn test_rejected_submission_is_transport_error() {
    let mut server = Server::new();
    let _mock = server.mock("POST", "/acc/").with_status(500).with_body("boom").create();

    let contract = ContractCredential::new(JobBoard::new("Indeed", "indeed"), creds());
    let err = client(&server).submit_contract(&contract).unwrap_err();

    assert_eq!(err.status(), Some(500));
}

#[test]
fn test_new_rejects_plain_http_base_url() {
    let mut config = IgbConfig::new(API_KEY, "acc", STORAGE, TRANSPORT);
    config.base_url = "http://partner.example.com/".to_owned();
    assert!(matches!(IgbClient::new(config), Err(IgbError::Config(_))));
}

#[test]
fn test_independent_clients() {
    let first = IgbClient::new(IgbConfig::new(API_KEY, "acc", STORAGE, TRANSPORT)).unwrap();
    let second = IgbClient::new(IgbConfig::new(API_KEY, "prod", TRANSPORT, STORAGE)).unwrap();

    assert!(first.config().environment_url().ends_with("/acc/"));
    assert!(second.config().environment_url().ends_with("/prod/"));
}
