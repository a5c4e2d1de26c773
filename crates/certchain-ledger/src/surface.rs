//! String-typed invocation surface for ledger platforms that dispatch by
//! method name and positional string arguments.
//!
//! Every response is the JSON rendering of the corresponding typed result.

use crate::context::TxContext;
use crate::contract::{CertificateContract, CreateRequest};
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::store::LedgerStore;

/// Dispatch one invocation against the contract.
///
/// Method names are exact matches; unknown names and wrong arities reject
/// with [`Error::InvalidArgument`] before any contract logic runs.
pub fn invoke<S: LedgerStore, E: EventSink>(
    contract: &CertificateContract<S, E>,
    ctx: &TxContext<'_>,
    method: &str,
    args: &[String],
) -> Result<String> {
    match method {
        "Create" => {
            let [cert_id, cert_hash, doc_ref, issuer_org, recipient_id, cert_type, metadata_json] =
                expect_args::<7>(method, args)?;
            let request = CreateRequest {
                cert_id: cert_id.clone(),
                cert_hash: cert_hash.clone(),
                doc_ref: doc_ref.clone(),
                issuer_org: issuer_org.clone(),
                recipient_id: recipient_id.clone(),
                cert_type: cert_type.clone(),
                metadata_json: metadata_json.clone(),
            };
            to_json(&contract.create(ctx, &request)?)
        }
        "Revoke" => {
            if args.is_empty() || args.len() > 2 {
                return Err(Error::InvalidArgument(format!(
                    "Revoke expects 1 or 2 arguments, got {}",
                    args.len()
                )));
            }
            let reason = args.get(1).map(String::as_str);
            to_json(&contract.revoke(ctx, &args[0], reason)?)
        }
        "Read" => {
            let [cert_id] = expect_args::<1>(method, args)?;
            to_json(&contract.read(cert_id)?)
        }
        "History" => {
            let [cert_id] = expect_args::<1>(method, args)?;
            to_json(&contract.history(cert_id)?)
        }
        "VerifyByHash" => {
            let [cert_id, hash] = expect_args::<2>(method, args)?;
            to_json(&contract.verify_by_hash(cert_id, hash)?)
        }
        "VerifyByFingerprintRoot" => {
            let [cert_id, root] = expect_args::<2>(method, args)?;
            to_json(&contract.verify_by_fingerprint_root(cert_id, root)?)
        }
        "byRecipient" => {
            let [recipient_id] = expect_args::<1>(method, args)?;
            to_json(&contract.query_by_recipient(recipient_id)?)
        }
        "byIssuer" => {
            let [issuer_org] = expect_args::<1>(method, args)?;
            to_json(&contract.query_by_issuer(issuer_org)?)
        }
        "byType" => {
            let [cert_type] = expect_args::<1>(method, args)?;
            to_json(&contract.query_by_type(cert_type)?)
        }
        other => Err(Error::InvalidArgument(format!("unknown method: {other}"))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn expect_args<'a, const N: usize>(method: &str, args: &'a [String]) -> Result<&'a [String; N]> {
    args.try_into().map_err(|_| {
        Error::InvalidArgument(format!(
            "{method} expects {N} argument(s), got {}",
            args.len()
        ))
    })
}
