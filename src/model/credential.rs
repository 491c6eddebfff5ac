//! Credential submission shapes.
//!
//! Three shapes exist:
//!
//! - [`ContractCredential`]: credentials for one job board, sent as `<MyContract>`
//! - [`AtsCredential`]: identity of the applicant tracking system and its company, sent as
//!   `<OFCCP>`
//! - [`OfccpCredential`]: one ATS identity bundled with any number of contract credentials,
//!   sent as a single `<OFCCP>` document
//!
//! All of them implement [`CredentialDocument`] (canonical dictionary + XML) and
//! [`CredentialValues`] (value-wise transforms used by the encryption pipeline).
//! [`Submission`] is the closed set of the three for callers that pick the shape at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    error::{IgbError, Result},
    model::{JobBoard, merge::deep_merge},
    xml,
};

/// Credential field name to value. Values are plaintext or ciphertext depending on which
/// transforms have been applied.
pub type CredentialMap = BTreeMap<String, String>;

/// Root element a document is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// `<OFCCP>`: ATS identity, optionally with job board contracts.
    #[serde(rename = "OFCCP")]
    Ofccp,
    /// `<MyContract>`: a single job board contract.
    #[serde(rename = "MyContract")]
    MyContract,
}

impl Destination {
    /// XML root element name.
    #[must_use]
    pub fn root_element(self) -> &'static str {
        match self {
            Self::Ofccp => "OFCCP",
            Self::MyContract => "MyContract",
        }
    }
}

/// Something that can be submitted to the partner as one XML document.
pub trait CredentialDocument {
    /// Root element this document is rendered under.
    fn destination(&self) -> Destination;

    /// Canonical dictionary, the shape the XML is rendered from.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::SchemaMismatch`] if a field the document needs is missing.
    fn as_dict(&self) -> Result<Value>;

    /// Renders the canonical dictionary as partner XML.
    ///
    /// # Errors
    ///
    /// Returns error if [`as_dict`](Self::as_dict) or rendering fails.
    fn to_xml(&self) -> Result<String> {
        xml::render(self.destination().root_element(), &self.as_dict()?)
    }
}

/// Value-wise transform over every credential value.
pub trait CredentialValues: Sized {
    /// Returns a copy with every credential value replaced by `f(value)`.
    ///
    /// Keys are preserved and `self` is left untouched. Stops at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    fn map_values<F>(&self, f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>;
}

fn map_credential_values<F>(credentials: &CredentialMap, mut f: F) -> Result<CredentialMap>
where
    F: FnMut(&str) -> Result<String>,
{
    credentials.iter().map(|(name, value)| Ok((name.clone(), f(value)?))).collect()
}

fn credential_pairs(credentials: &CredentialMap) -> Vec<Value> {
    credentials.iter().map(|(name, value)| json!({"name": name, "value": value})).collect()
}

/// Credentials for a single job board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCredential {
    /// Target board.
    pub job_board: JobBoard,
    /// Credential field name to value.
    #[serde(default)]
    pub credentials: CredentialMap,
}

impl ContractCredential {
    /// Creates a contract credential for `job_board`.
    #[must_use]
    pub fn new(job_board: JobBoard, credentials: CredentialMap) -> Self {
        Self { job_board, credentials }
    }
}

impl CredentialDocument for ContractCredential {
    fn destination(&self) -> Destination {
        Destination::MyContract
    }

    fn as_dict(&self) -> Result<Value> {
        if self.job_board.klass.is_empty() {
            return Err(IgbError::SchemaMismatch(format!(
                "contract credential for job board '{}' has an empty class",
                self.job_board.name
            )));
        }

        Ok(json!({
            "jobboards": [{
                "class": self.job_board.klass,
                "credentials": credential_pairs(&self.credentials),
            }]
        }))
    }
}

impl CredentialValues for ContractCredential {
    fn map_values<F>(&self, f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(Self {
            job_board: self.job_board.clone(),
            credentials: map_credential_values(&self.credentials, f)?,
        })
    }
}

/// Identity of the applicant tracking system submitting on behalf of a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsCredential {
    /// ATS identifier.
    pub ats_id: String,
    /// ATS display name.
    pub ats_name: String,
    /// Company display name.
    pub company_name: String,
    /// Company identifier.
    pub company_id: String,
    /// Company-level credential field name to value.
    #[serde(default)]
    pub credentials: CredentialMap,
}

impl CredentialDocument for AtsCredential {
    fn destination(&self) -> Destination {
        Destination::Ofccp
    }

    fn as_dict(&self) -> Result<Value> {
        // The schema rejects an empty <credentials/>, so send one blank pair instead.
        let credentials = if self.credentials.is_empty() {
            vec![json!({"name": "", "value": ""})]
        } else {
            credential_pairs(&self.credentials)
        };

        Ok(json!({
            "ATS": {
                "name": self.ats_name,
                "id": self.ats_id,
            },
            "company": {
                "name": self.company_name,
                "id": self.company_id,
                "credentials": credentials,
            }
        }))
    }
}

impl CredentialValues for AtsCredential {
    fn map_values<F>(&self, f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(Self {
            ats_id: self.ats_id.clone(),
            ats_name: self.ats_name.clone(),
            company_name: self.company_name.clone(),
            company_id: self.company_id.clone(),
            credentials: map_credential_values(&self.credentials, f)?,
        })
    }
}

/// One ATS identity plus the job board contracts it submits in the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfccpCredential {
    /// ATS identity.
    pub ats: AtsCredential,
    /// Job board contracts, in submission order.
    #[serde(default)]
    pub contracts: Vec<ContractCredential>,
}

impl OfccpCredential {
    /// Bundles an ATS identity with its contracts.
    #[must_use]
    pub fn new(ats: AtsCredential, contracts: Vec<ContractCredential>) -> Self {
        Self { ats, contracts }
    }
}

impl CredentialDocument for OfccpCredential {
    fn destination(&self) -> Destination {
        Destination::Ofccp
    }

    /// Merges the ATS dictionary with each contract dictionary, in order.
    fn as_dict(&self) -> Result<Value> {
        let mut doc = self.ats.as_dict()?;
        for contract in &self.contracts {
            deep_merge(&mut doc, contract.as_dict()?);
        }
        Ok(doc)
    }
}

impl CredentialValues for OfccpCredential {
    /// Applies `f` to the ATS child and to every contract child individually.
    fn map_values<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(Self {
            ats: self.ats.map_values(&mut f)?,
            contracts: self
                .contracts
                .iter()
                .map(|contract| contract.map_values(&mut f))
                .collect::<Result<_>>()?,
        })
    }
}

/// Any of the three submission shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Single job board contract.
    Contract(ContractCredential),
    /// ATS identity alone.
    Ats(AtsCredential),
    /// ATS identity with contracts.
    Ofccp(OfccpCredential),
}

impl CredentialDocument for Submission {
    fn destination(&self) -> Destination {
        match self {
            Self::Contract(c) => c.destination(),
            Self::Ats(c) => c.destination(),
            Self::Ofccp(c) => c.destination(),
        }
    }

    fn as_dict(&self) -> Result<Value> {
        match self {
            Self::Contract(c) => c.as_dict(),
            Self::Ats(c) => c.as_dict(),
            Self::Ofccp(c) => c.as_dict(),
        }
    }
}

impl CredentialValues for Submission {
    fn map_values<F>(&self, f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(match self {
            Self::Contract(c) => Self::Contract(c.map_values(f)?),
            Self::Ats(c) => Self::Ats(c.map_values(f)?),
            Self::Ofccp(c) => Self::Ofccp(c.map_values(f)?),
        })
    }
}

impl From<ContractCredential> for Submission {
    fn from(value: ContractCredential) -> Self {
        Self::Contract(value)
    }
}

impl From<AtsCredential> for Submission {
    fn from(value: AtsCredential) -> Self {
        Self::Ats(value)
    }
}

impl From<OfccpCredential> for Submission {
    fn from(value: OfccpCredential) -> Self {
        Self::Ofccp(value)
    }
}
