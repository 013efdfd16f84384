//! Call requests, fee overrides and signed transactions.
//!
//! A transaction is signed over its canonical CBOR encoding prefixed with a
//! domain tag. The transaction hash commits to the encoding and the
//! signature, so two submissions of the same request at the same nonce by
//! the same signer share a hash.

use bytes::Bytes;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::CoreError;
use crate::token::Token;
use crate::types::{Address, TxHash};

/// Domain tag prepended to the signed message.
pub const SIGN_DOMAIN: &[u8] = b"offer-reward/tx/v1";

/// Domain tag prepended when deriving the transaction hash.
pub const HASH_DOMAIN: &[u8] = b"offer-reward/txhash/v1";

/// A contract method invocation: name plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub method: String,
    pub args: Vec<Token>,
}

impl CallRequest {
    pub fn new(method: impl Into<String>, args: Vec<Token>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Optional fee/value parameters a caller may pin for a mutation.
///
/// Any field left `None` is filled in by the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overrides {
    pub gas_limit: Option<u64>,
    pub gas_price: Option<U256>,
    pub value: Option<U256>,
    pub nonce: Option<u64>,
}

impl Overrides {
    pub fn value(value: impl Into<U256>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_gas_price(mut self, gas_price: impl Into<U256>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Layer `caller` over `self`: every field the caller set wins.
    pub fn merge(self, caller: &Overrides) -> Overrides {
        Overrides {
            gas_limit: caller.gas_limit.or(self.gas_limit),
            gas_price: caller.gas_price.or(self.gas_price),
            value: caller.value.or(self.value),
            nonce: caller.nonce.or(self.nonce),
        }
    }
}

/// Options for read-only calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOverrides {
    /// Evaluate against the state at this block instead of the tip.
    pub block: Option<u64>,
    /// Caller address seen by the contract.
    pub from: Option<Address>,
}

impl CallOverrides {
    pub fn at_block(block: u64) -> Self {
        Self {
            block: Some(block),
            from: None,
        }
    }
}

/// A fully specified, unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub chain_id: u64,
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub value: U256,
    pub call: CallRequest,
}

impl TransactionRequest {
    /// Canonical CBOR encoding of the request.
    pub fn canonical_bytes(&self) -> Result<Bytes, CoreError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(Bytes::from(buf))
    }

    /// The message a signer signs: `SIGN_DOMAIN || canonical_bytes`.
    pub fn signing_message(&self) -> Result<Vec<u8>, CoreError> {
        let canonical = self.canonical_bytes()?;
        let mut msg = Vec::with_capacity(SIGN_DOMAIN.len() + canonical.len());
        msg.extend_from_slice(SIGN_DOMAIN);
        msg.extend_from_slice(&canonical);
        Ok(msg)
    }

    /// Sign with `keypair`, which must control `self.from`.
    pub fn sign(self, keypair: &Keypair) -> Result<SignedTransaction, CoreError> {
        if keypair.address() != self.from {
            return Err(CoreError::SenderMismatch {
                signer: keypair.address().to_hex(),
                from: self.from.to_hex(),
            });
        }
        let signature = keypair.sign(&self.signing_message()?);
        let hash = transaction_hash(&self.canonical_bytes()?, &signature);
        Ok(SignedTransaction {
            request: self,
            public_key: keypair.public_key(),
            signature,
            hash,
        })
    }
}

fn transaction_hash(canonical: &[u8], signature: &Signature) -> TxHash {
    let mut input = Vec::with_capacity(HASH_DOMAIN.len() + canonical.len() + 64);
    input.extend_from_slice(HASH_DOMAIN);
    input.extend_from_slice(canonical);
    input.extend_from_slice(signature.as_bytes());
    TxHash::digest(&input)
}

/// A transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub request: TransactionRequest,
    pub public_key: PublicKey,
    pub signature: Signature,
    pub hash: TxHash,
}

impl SignedTransaction {
    /// Check signature, sender binding and hash.
    pub fn verify(&self) -> Result<(), CoreError> {
        if self.public_key.address() != self.request.from {
            return Err(CoreError::SenderMismatch {
                signer: self.public_key.address().to_hex(),
                from: self.request.from.to_hex(),
            });
        }
        self.public_key
            .verify(&self.request.signing_message()?, &self.signature)?;

        let expected = transaction_hash(&self.request.canonical_bytes()?, &self.signature);
        if expected != self.hash {
            return Err(CoreError::HashMismatch {
                expected: expected.to_hex(),
                actual: self.hash.to_hex(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(from: Address) -> TransactionRequest {
        TransactionRequest {
            chain_id: 1337,
            from,
            to: Address::from_bytes([0xaa; 20]),
            nonce: 0,
            gas_limit: 130_000,
            gas_price: U256::one(),
            value: U256::from(10u64),
            call: CallRequest::new(
                "publishOffer",
                vec![Token::string("t"), Token::string("c"), Token::uint(100u64)],
            ),
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let signed = request(keypair.address()).sign(&keypair).unwrap();
        signed.verify().expect("fresh signature should verify");
    }

    #[test]
    fn test_tampered_request_fails_verification() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let mut signed = request(keypair.address()).sign(&keypair).unwrap();
        signed.request.value = U256::from(11u64);
        assert!(signed.verify().is_err());
    }

    #[test]
    fn test_sign_rejects_foreign_sender() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let other = Keypair::from_seed(&[0x02; 32]);
        let err = request(other.address()).sign(&keypair).unwrap_err();
        assert!(matches!(err, CoreError::SenderMismatch { .. }));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let keypair = Keypair::from_seed(&[0x03; 32]);
        let a = request(keypair.address()).sign(&keypair).unwrap();
        let b = request(keypair.address()).sign(&keypair).unwrap();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_merge_caller_wins() {
        let computed = Overrides::default().with_gas_limit(130).with_nonce(4);
        let caller = Overrides::value(5u64).with_gas_limit(999);
        let merged = computed.merge(&caller);

        assert_eq!(merged.gas_limit, Some(999));
        assert_eq!(merged.nonce, Some(4));
        assert_eq!(merged.value, Some(U256::from(5u64)));
        assert_eq!(merged.gas_price, None);
    }

    proptest::proptest! {
        #[test]
        fn prop_any_field_change_breaks_signature(
            seed in proptest::prelude::any::<[u8; 32]>(),
            nonce in 0u64..1_000,
            gas_limit in 21_000u64..10_000_000,
        ) {
            let keypair = Keypair::from_seed(&seed);
            let mut req = request(keypair.address());
            req.nonce = nonce;
            req.gas_limit = gas_limit;

            let mut signed = req.sign(&keypair).unwrap();
            proptest::prop_assert!(signed.verify().is_ok());

            signed.request.gas_limit += 1;
            proptest::prop_assert!(signed.verify().is_err());
        }
    }
}
