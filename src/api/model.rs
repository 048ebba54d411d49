use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq)]
pub(super) struct TransferRequest {
    pub master: String,
    pub zone: String,
}
