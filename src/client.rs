//! IGB partner API client.
//!
//! [`IgbClient`] is an ordinary value: build one per environment, keep it as long as you
//! like, and create as many as you need. It owns its configuration, its
//! [`HttpSession`] and the [`CredentialCipher`] derived from the configured keys.
//!
//! Every operation is a single blocking request. Non-success responses surface as
//! [`IgbError::Transport`] and are never retried.
//!
//! # Examples
//!
//! ```no_run
//! use igb_client::{
//!     IgbClient, IgbConfig,
//!     model::{ContractCredential, CredentialMap, JobBoard},
//! };
//!
//! # fn main() -> igb_client::Result<()> {
//! let config = IgbConfig::from_toml(&std::fs::read_to_string("igb.toml").unwrap())?;
//! let client = IgbClient::new(config)?;
//!
//! for board in client.list_job_boards()? {
//!     println!("{board}");
//! }
//!
//! let mut credentials = CredentialMap::new();
//! credentials.insert("username".to_owned(), "recruiter".to_owned());
//! let contract = ContractCredential::new(JobBoard::new("Indeed", "indeed"), credentials);
//! client.submit_contract(&contract)?;
//! # Ok(())
//! # }
//! ```

use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::IgbConfig,
    crypto::CredentialCipher,
    error::{IgbError, Result},
    model::{
        BoardFacet, ContractCredential, CredentialDocument, CredentialMap, CredentialValues,
        JobBoard, OfccpCredential, Submission,
    },
    payload::normalize,
    transport::{CachedSession, HttpResponse, HttpSession, RequestBody},
};

/// Client for one partner environment.
#[derive(Debug)]
pub struct IgbClient<S = CachedSession> {
    config: IgbConfig,
    session: S,
    cipher: CredentialCipher,
}

impl IgbClient<CachedSession> {
    /// Validates `config` and builds a client over a [`CachedSession`].
    ///
    /// # Errors
    ///
    /// - [`IgbError::Config`] if the configuration is invalid
    /// - [`IgbError::Http`] if the HTTP client cannot be built
    pub fn new(config: IgbConfig) -> Result<Self> {
        config.validate()?;
        let session = CachedSession::new(&config)?;
        Self::with_session(config, session)
    }
}

impl<S: HttpSession> IgbClient<S> {
    /// Builds a client over a caller-supplied session.
    ///
    /// The base URL is taken as is, so a session pointed at a local test server works.
    /// Identity, keys and HTTP settings are still validated.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Config`] if the identity, keys or HTTP settings are invalid.
    pub fn with_session(config: IgbConfig, session: S) -> Result<Self> {
        config.validate_identity()?;
        config.validate_keys()?;
        config.http.validate()?;
        let cipher = CredentialCipher::from_config(&config)?;
        Ok(Self { config, session, cipher })
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &IgbConfig {
        &self.config
    }

    /// Underlying HTTP session.
    #[must_use]
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Storage and transport ciphers for the configured keys.
    #[must_use]
    pub fn cipher(&self) -> &CredentialCipher {
        &self.cipher
    }

    /// Lists the job boards of the environment.
    ///
    /// Listing entries carry only name, class and logo.
    ///
    /// # Errors
    ///
    /// - [`IgbError::Transport`] on a non-success response
    /// - [`IgbError::SchemaMismatch`] if the response has no `HAPI.jobboards` list
    #[instrument(skip(self), fields(environment = %self.config.environment_id))]
    pub fn list_job_boards(&self) -> Result<Vec<JobBoard>> {
        let body = self.get_json(&self.config.environment_url())?;

        let entries = body
            .pointer("/HAPI/jobboards")
            .and_then(Value::as_array)
            .ok_or_else(|| IgbError::SchemaMismatch("response lacks HAPI.jobboards".to_owned()))?;

        let boards: Vec<JobBoard> = entries
            .iter()
            .filter_map(|entry| match entry.get("jobboard").and_then(Value::as_object) {
                Some(board) => Some(JobBoard::from_listing(board)),
                None => {
                    debug!(%entry, "skipping listing entry without jobboard");
                    None
                }
            })
            .collect();

        info!(count = boards.len(), "listed job boards");
        Ok(boards)
    }

    /// Fetches the full description of one board.
    ///
    /// The payload is normalized before the board is built, so `facets`, `options` and
    /// credential requirements come back as plain lists. Returns `Ok(None)` when the
    /// partner answers with no board.
    ///
    /// # Errors
    ///
    /// - [`IgbError::SchemaMismatch`] if `klass` is not a path segment or the response has
    ///   an unexpected shape
    /// - [`IgbError::Transport`] on a non-success response
    #[instrument(skip(self))]
    pub fn job_board_detail(&self, klass: &str) -> Result<Option<JobBoard>> {
        let url = format!("{}{}", self.config.environment_url(), path_segment("class", klass)?);
        let body = self.get_json(&url)?;

        let hapi = body
            .get("HAPI")
            .ok_or_else(|| IgbError::SchemaMismatch("response lacks HAPI".to_owned()))?;

        let board = match hapi.get("jobboard") {
            None | Some(Value::Null) => return Ok(None),
            Some(board) => normalize(board.clone()),
        };

        let detail = board.as_object().ok_or_else(|| {
            IgbError::SchemaMismatch(format!("jobboard is not a mapping: {board}"))
        })?;

        Ok(Some(JobBoard::from_detail(detail)))
    }

    /// Queries the selectable options of a custom board facet.
    ///
    /// `credentials` are plaintext; they are sealed under the transport key before they
    /// leave the process. `term` narrows the options when given.
    ///
    /// Earlier partner integrations sealed these credentials under the storage key. A
    /// partner endpoint that still expects storage-key ciphertext will not accept them.
    ///
    /// # Errors
    ///
    /// - [`IgbError::SchemaMismatch`] if `klass` or `facet` is not a path segment, or an
    ///   option lacks `key` or `label`
    /// - [`IgbError::Transport`] on a non-success response
    #[instrument(skip(self, credentials))]
    pub fn board_facets(
        &self,
        klass: &str,
        facet: &str,
        credentials: &CredentialMap,
        term: Option<&str>,
    ) -> Result<Vec<BoardFacet>> {
        let url = self.facet_url(klass, facet)?;

        let mut params = self.cipher.transport_params(credentials)?;
        if let Some(term) = term {
            params.insert("term".to_owned(), Value::String(term.to_owned()));
        }

        let body = self.post_json(&url, params)?;

        match normalize(body).get("options") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(options)) => options.iter().map(BoardFacet::from_option).collect(),
            Some(other) => {
                Err(IgbError::SchemaMismatch(format!("facet options are not a list: {other}")))
            }
        }
    }

    /// Asks the partner whether `keys` are acceptable values for a custom board facet.
    ///
    /// `credentials` are plaintext and sealed under the transport key, like in
    /// [`board_facets`](Self::board_facets) (earlier integrations used the storage key).
    /// A response without a boolean `valid` flag counts as not valid.
    ///
    /// # Errors
    ///
    /// - [`IgbError::SchemaMismatch`] if `klass` or `facet` is not a path segment
    /// - [`IgbError::Transport`] on a non-success response
    #[instrument(skip(self, credentials))]
    pub fn validate_facet(
        &self,
        klass: &str,
        facet: &str,
        credentials: &CredentialMap,
        keys: &[&str],
    ) -> Result<bool> {
        let url = format!("{}/validate", self.facet_url(klass, facet)?);

        let mut params = self.cipher.transport_params(credentials)?;
        let keys: Vec<Value> = keys.iter().map(|key| json!({"key": key})).collect();
        params.insert("keys".to_owned(), Value::Array(keys));

        let body = self.post_json(&url, params)?;
        Ok(body.get("valid").and_then(Value::as_bool).unwrap_or(false))
    }

    /// Submits credentials for one job board as a `<MyContract>` document.
    ///
    /// `contract` holds plaintext values and is not modified.
    ///
    /// # Errors
    ///
    /// - [`IgbError::SchemaMismatch`] if the board class is empty
    /// - [`IgbError::Transport`] on a non-success response
    #[instrument(skip(self, contract), fields(class = %contract.job_board.klass))]
    pub fn submit_contract(&self, contract: &ContractCredential) -> Result<()> {
        self.post_document(&self.cipher.transport_credentials(contract)?)
    }

    /// Submits an ATS identity with its contracts as one `<OFCCP>` document.
    ///
    /// The ATS credentials and each contract's credentials are sealed individually.
    /// `ofccp` holds plaintext values and is not modified.
    ///
    /// # Errors
    ///
    /// - [`IgbError::SchemaMismatch`] if a contract's board class is empty
    /// - [`IgbError::Transport`] on a non-success response
    #[instrument(skip(self, ofccp), fields(contracts = ofccp.contracts.len()))]
    pub fn submit_ofccp(&self, ofccp: &OfccpCredential) -> Result<()> {
        self.post_document(&self.cipher.transport_credentials(ofccp)?)
    }

    /// Submits any of the three credential shapes.
    ///
    /// # Errors
    ///
    /// Same as [`submit_contract`](Self::submit_contract) and
    /// [`submit_ofccp`](Self::submit_ofccp).
    #[instrument(skip(self, submission), fields(destination = ?submission.destination()))]
    pub fn submit(&self, submission: &Submission) -> Result<()> {
        self.post_document(&submission.map_values(|value| self.cipher.transport().encrypt(value))?)
    }

    fn facet_url(&self, klass: &str, facet: &str) -> Result<String> {
        Ok(format!(
            "{}{}/facet/{}/custom",
            self.config.environment_url(),
            path_segment("class", klass)?,
            path_segment("facet", facet)?
        ))
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        checked(self.session.get(url)?)?.json()
    }

    fn post_json(&self, url: &str, params: Map<String, Value>) -> Result<Value> {
        let body = RequestBody::Json(json!({"params": params}));
        checked(self.session.post(url, &body)?)?.json()
    }

    fn post_document<D: CredentialDocument>(&self, document: &D) -> Result<()> {
        let body = RequestBody::Xml(document.to_xml()?);
        checked(self.session.post(&self.config.environment_url(), &body)?)?;
        info!("credentials submitted");
        Ok(())
    }
}

fn checked(response: HttpResponse) -> Result<HttpResponse> {
    if !response.is_ok() {
        warn!(status = response.status, body = %response.text(), "partner API rejected request");
    }
    response.error_for_status()
}

/// Rejects values that would change the request path.
fn path_segment<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '?', '#']) {
        return Err(IgbError::SchemaMismatch(format!(
            "{what} must be a single path segment: {value:?}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::AtsCredential;

    const STORAGE: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
    const TRANSPORT: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";
    const ENV: &str = "https://api.ingoedebanen.nl/apipartner/hapi/v1/acc/";

    /// Session answering every request with a fixed response and recording what was sent.
    #[derive(Debug)]
    struct Recorder {
        response: HttpResponse,
        requests: Mutex<Vec<(String, Option<RequestBody>)>>,
    }

    impl Recorder {
        fn answering(status: u16, body: &str) -> Self {
            Self { response: HttpResponse::new(status, body), requests: Mutex::new(Vec::new()) }
        }

        fn last(&self) -> (String, Option<RequestBody>) {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl HttpSession for Recorder {
        fn get(&self, url: &str) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push((url.to_owned(), None));
            Ok(self.response.clone())
        }

        fn post(&self, url: &str, body: &RequestBody) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push((url.to_owned(), Some(body.clone())));
            Ok(self.response.clone())
        }
    }

    fn client(status: u16, body: &str) -> IgbClient<Recorder> {
        let config = IgbConfig::new("key", "acc", STORAGE, TRANSPORT);
        IgbClient::with_session(config, Recorder::answering(status, body)).unwrap()
    }

    fn creds() -> CredentialMap {
        [("username".to_owned(), "bob".to_owned())].into_iter().collect()
    }

    #[test]
    fn test_list_job_boards() {
        let client = client(
            200,
            r#"{"HAPI": {"jobboards": [
                {"jobboard": {"name": "Indeed", "class": "indeed", "logo": "https://logo"}},
                {"unexpected": true},
                {"jobboard": {"name": "Monster", "class": "monster"}}
            ]}}"#,
        );

        let boards = client.list_job_boards().unwrap();
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0].klass, "indeed");
        assert_eq!(boards[0].logo.as_deref(), Some("https://logo"));
        assert_eq!(boards[1].name, "Monster");
        assert_eq!(client.session().last().0, ENV);
    }

    #[test]
    fn test_list_without_hapi_is_schema_mismatch() {
        let client = client(200, "{}");
        assert!(matches!(client.list_job_boards(), Err(IgbError::SchemaMismatch(_))));
    }

    #[test]
    fn test_detail_is_normalized() {
        let client = client(
            200,
            r#"{"HAPI": {"jobboard": {
                "name": "Indeed",
                "class": "indeed",
                "OFCCP": {"credentials": [{"credential": {"name": "username"}}]},
                "facets": [{"facet": {"key": "region"}}]
            }}}"#,
        );

        let board = client.job_board_detail("indeed").unwrap().unwrap();
        assert_eq!(board.klass, "indeed");
        assert_eq!(board.ofccp, json!({"credentials": [{"name": "username"}]}));
        assert_eq!(board.facets, json!([{"key": "region"}]));
        assert_eq!(client.session().last().0, format!("{ENV}indeed"));
    }

    #[test]
    fn test_detail_missing_board_is_none() {
        let client = client(200, r#"{"HAPI": {"jobboard": null}}"#);
        assert_eq!(client.job_board_detail("gone").unwrap(), None);
    }

    #[test]
    fn test_class_must_be_path_segment() {
        let client = client(200, "{}");
        assert!(matches!(client.job_board_detail("../x"), Err(IgbError::SchemaMismatch(_))));
        assert!(matches!(
            client.board_facets("indeed", "a/b", &creds(), None),
            Err(IgbError::SchemaMismatch(_))
        ));
        assert!(client.session().requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_board_facets_request_and_response() {
        let client = client(
            200,
            r#"{"options": [
                {"option": {"key": "nl", "label": "Netherlands"}},
                {"option": {"key": "be", "label": "Belgium"}}
            ]}"#,
        );

        let facets = client.board_facets("indeed", "region", &creds(), Some("ne")).unwrap();
        assert_eq!(facets, vec![
            BoardFacet { key: "nl".to_owned(), label: "Netherlands".to_owned() },
            BoardFacet { key: "be".to_owned(), label: "Belgium".to_owned() },
        ]);

        let (url, body) = client.session().last();
        assert_eq!(url, format!("{ENV}indeed/facet/region/custom"));
        let Some(RequestBody::Json(body)) = body else { panic!("expected JSON body") };
        assert_eq!(body["params"]["term"], "ne");

        let sealed = body["params"]["username"].as_str().unwrap();
        assert_eq!(client.cipher().transport().decrypt(sealed).unwrap(), "bob");
    }

    #[test]
    fn test_board_facets_without_options() {
        let client = client(200, "{}");
        assert!(client.board_facets("indeed", "region", &creds(), None).unwrap().is_empty());
    }

    #[test]
    fn test_validate_facet() {
        let client = client(200, r#"{"valid": true}"#);
        assert!(client.validate_facet("indeed", "region", &creds(), &["nl", "be"]).unwrap());

        let (url, body) = client.session().last();
        assert_eq!(url, format!("{ENV}indeed/facet/region/custom/validate"));
        let Some(RequestBody::Json(body)) = body else { panic!("expected JSON body") };
        assert_eq!(body["params"]["keys"], json!([{"key": "nl"}, {"key": "be"}]));

        let sealed = body["params"]["username"].as_str().unwrap();
        assert_eq!(client.cipher().transport().decrypt(sealed).unwrap(), "bob");
        assert!(matches!(
            client.cipher().storage().decrypt(sealed),
            Err(IgbError::Authentication(_))
        ));
    }

    #[test]
    fn test_validate_facet_defaults_to_false() {
        let client = client(200, "{}");
        assert!(!client.validate_facet("indeed", "region", &creds(), &["nl"]).unwrap());
    }

    #[test]
    fn test_submit_contract_sends_transport_sealed_xml() {
        let client = client(201, "");
        let contract = ContractCredential::new(JobBoard::new("Indeed", "indeed"), creds());

        client.submit_contract(&contract).unwrap();
        assert_eq!(contract.credentials["username"], "bob");

        let (url, body) = client.session().last();
        assert_eq!(url, ENV);
        let Some(RequestBody::Xml(xml)) = body else { panic!("expected XML body") };
        assert!(xml.contains("<MyContract>"));
        assert!(xml.contains("<class>indeed</class>"));
        assert!(!xml.contains("<value>bob</value>"));
    }

    #[test]
    fn test_submit_ofccp_renders_one_document() {
        let client = client(200, "");
        let ofccp = OfccpCredential::new(
            AtsCredential {
                ats_id: "7".to_owned(),
                ats_name: "Recruitee".to_owned(),
                company_name: "ACME".to_owned(),
                company_id: "42".to_owned(),
                credentials: creds(),
            },
            vec![ContractCredential::new(JobBoard::new("Indeed", "indeed"), creds())],
        );

        client.submit(&Submission::from(ofccp)).unwrap();

        let (_, body) = client.session().last();
        let Some(RequestBody::Xml(xml)) = body else { panic!("expected XML body") };
        assert!(xml.contains("<OFCCP>"));
        assert!(xml.contains("<jobboards>"));
        assert!(xml.contains("<company>"));
    }

    #[test]
    fn test_non_ok_is_transport_error() {
        let client = client(503, "down");
        let contract = ContractCredential::new(JobBoard::new("Indeed", "indeed"), creds());

        let err = client.submit_contract(&contract).unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(matches!(client.list_job_boards(), Err(IgbError::Transport { status: 503 })));
    }

    #[test]
    fn test_with_session_validates_keys() {
        let config = IgbConfig::new("key", "acc", STORAGE, STORAGE);
        let result = IgbClient::with_session(config, Recorder::answering(200, "{}"));
        assert!(matches!(result, Err(IgbError::Config(_))));
    }
}
