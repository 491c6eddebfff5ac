//! Typed partner data: job boards and credential submissions.

pub mod credential;
pub mod job_board;
pub mod merge;

pub use credential::{
    AtsCredential, ContractCredential, CredentialDocument, CredentialMap, CredentialValues,
    Destination, OfccpCredential, Submission,
};
pub use job_board::{BoardFacet, JobBoard};
pub use merge::deep_merge;
