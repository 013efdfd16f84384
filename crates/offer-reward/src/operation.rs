//! Contract operations and schema versions.
//!
//! The client speaks in [`Operation`]s; the [`ContractVersion`] bound at
//! connect time maps each one to the method name of the deployed contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every method the client can invoke on the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Configuration reads
    WaitTime,
    MinFinishTime,
    FeeRate,
    FeeAddress,
    MinOfferValue,
    AnswerFee,
    BlockSkip,

    // Data reads
    OfferLength,
    OfferData,
    PublisherData,
    OfferDataList,
    PublisherDataList,
    AnswerBlockListByOffer,
    OfferIdListByPublisher,
    RewardOfferIdListByPublisher,

    // Mutations
    PublishOffer,
    PublishAnswer,
    FinishOffer,
    ChangeOfferData,
    ChangeOfferValue,
}

impl Operation {
    /// Whether the operation changes contract state.
    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::PublishOffer
                | Self::PublishAnswer
                | Self::FinishOffer
                | Self::ChangeOfferData
                | Self::ChangeOfferValue
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ContractVersion::LATEST.method(*self))
    }
}

/// Schema version of a deployed contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractVersion {
    #[default]
    #[serde(rename = "v1")]
    V1,
}

impl ContractVersion {
    /// Assumed when connecting to an explicit address.
    pub const LATEST: Self = Self::V1;

    /// Method name of `operation` in this version's interface.
    pub const fn method(self, operation: Operation) -> &'static str {
        match self {
            Self::V1 => match operation {
                Operation::WaitTime => "waitTime",
                Operation::MinFinishTime => "minFinishTime",
                Operation::FeeRate => "feeRate",
                Operation::FeeAddress => "feeAddress",
                Operation::MinOfferValue => "minOfferValue",
                Operation::AnswerFee => "answerFee",
                Operation::BlockSkip => "blockSkip",
                Operation::OfferLength => "offerLength",
                Operation::OfferData => "getOfferData",
                Operation::PublisherData => "getPublisherData",
                Operation::OfferDataList => "getOfferDataList",
                Operation::PublisherDataList => "getPublisherDataList",
                Operation::AnswerBlockListByOffer => "getAnswerBlockListByOffer",
                Operation::OfferIdListByPublisher => "getOfferIdListByPublisher",
                Operation::RewardOfferIdListByPublisher => "getRewardOfferIdListByPublisher",
                Operation::PublishOffer => "publishOffer",
                Operation::PublishAnswer => "publishAnswer",
                Operation::FinishOffer => "finishOffer",
                Operation::ChangeOfferData => "changeOfferData",
                Operation::ChangeOfferValue => "changeOfferValue",
            },
        }
    }
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
        }
    }
}
