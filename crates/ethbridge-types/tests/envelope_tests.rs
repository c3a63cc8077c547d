//! Response envelope tests for ethbridge-types
//!
//! Packs execution results the way the execution pipeline does and reads
//! them back through the response codec.

use bytes::Bytes;
use ethbridge_primitives::{Address, H256};
use ethbridge_types::{
    decode_tx_response, decode_tx_responses, CodecError, ExecutionResult, Log, ResponseEnvelope,
    TypedEntry,
};
use proptest::prelude::*;

fn sample_result() -> ExecutionResult {
    ExecutionResult {
        hash: H256::from_low_bytes(b"hash").to_hex(),
        logs: vec![Log {
            data: Bytes::from_static(&[1, 2, 3, 4]),
            block_number: 17,
            ..Default::default()
        }],
        ret: Bytes::from_static(&[5, 8]),
        vm_error: None,
        gas_used: 0,
    }
}

fn envelope_of(results: &[ExecutionResult]) -> Vec<u8> {
    let mut envelope = ResponseEnvelope::new();
    for res in results {
        envelope.push(res);
    }
    envelope.encode()
}

// ==================== Round trip ====================

/// A packed result decodes to an equal value
#[test]
fn test_decode_packed_result() {
    let res = sample_result();
    let decoded = decode_tx_response(&envelope_of(&[res.clone()])).unwrap();

    assert_eq!(decoded, res);
    assert_eq!(decoded.hash, res.hash);
    assert_eq!(&decoded.ret[..], &[5, 8]);
    assert_eq!(decoded.logs.len(), 1);
    assert_eq!(&decoded.logs[0].data[..], &[1, 2, 3, 4]);
    assert_eq!(decoded.logs[0].block_number, 17);
}

/// Log order survives the envelope
#[test]
fn test_log_order_preserved() {
    let logs: Vec<Log> = (0u8..5)
        .map(|i| Log {
            address: Address::from_bytes([i; 20]),
            topics: vec![H256::from_bytes([i; 32])],
            index: u64::from(i),
            ..Default::default()
        })
        .collect();
    let res = ExecutionResult {
        logs: logs.clone(),
        ..sample_result()
    };

    let decoded = decode_tx_response(&envelope_of(&[res])).unwrap();
    assert_eq!(decoded.logs, logs);
}

/// Results mixed with foreign responses
#[test]
fn test_mixed_envelope() {
    let mut envelope = ResponseEnvelope::new();
    envelope.push_entry(TypedEntry::new("/test.bank.v1.MsgSendResponse", vec![0xc0]));
    envelope.push(&sample_result());
    envelope.push_entry(TypedEntry::new("/test.gov.v1.MsgVoteResponse", vec![0xc0]));
    let bytes = envelope.encode();

    assert_eq!(decode_tx_response(&bytes).unwrap(), sample_result());
    assert_eq!(decode_tx_responses(&bytes).unwrap(), vec![sample_result()]);
}

/// An empty VM error is still a VM error after decoding
#[test]
fn test_empty_vm_error_preserved() {
    let res = ExecutionResult {
        vm_error: Some(String::new()),
        ..sample_result()
    };
    let decoded = decode_tx_response(&envelope_of(&[res.clone()])).unwrap();

    assert_eq!(decoded, res);
    assert!(decoded.failed());
}

// ==================== Failures ====================

/// No execution result entry is reported as not found
#[test]
fn test_absent_match_is_not_found() {
    let mut envelope = ResponseEnvelope::new();
    envelope.push_entry(TypedEntry::new("/test.bank.v1.MsgSendResponse", vec![0xc0]));

    match decode_tx_response(&envelope.encode()) {
        Err(CodecError::NoMatchingResponse { type_url }) => {
            assert_eq!(type_url, "/ethbridge.evm.v1.MsgEthereumTxResponse");
        }
        other => panic!("Expected NoMatchingResponse, got {:?}", other),
    }
}

/// Empty input is malformed, not an empty envelope
#[test]
fn test_empty_bytes_are_malformed() {
    let err = decode_tx_response(&[]).unwrap_err();
    assert!(matches!(err, CodecError::Decode(_)));
}

/// Trailing garbage after the envelope is rejected
#[test]
fn test_trailing_bytes_rejected() {
    let mut bytes = envelope_of(&[sample_result()]);
    bytes.push(0x00);
    assert!(matches!(decode_tx_response(&bytes), Err(CodecError::Decode(_))));
}

/// Truncated envelopes never decode
#[test]
fn test_truncated_envelope() {
    let bytes = envelope_of(&[sample_result()]);
    for len in 1..bytes.len() {
        assert!(
            decode_tx_response(&bytes[..len]).is_err(),
            "prefix of {} bytes decoded",
            len
        );
    }
}

// ==================== Properties ====================

fn arb_h256() -> impl Strategy<Value = H256> {
    any::<[u8; 32]>().prop_map(H256::from_bytes)
}

fn arb_log() -> impl Strategy<Value = Log> {
    (
        any::<[u8; 20]>(),
        prop::collection::vec(arb_h256(), 0..4),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<u64>(),
        arb_h256(),
        any::<u64>(),
        any::<u64>(),
        any::<bool>(),
    )
        .prop_map(
            |(address, topics, data, block_number, tx_hash, tx_index, index, removed)| Log {
                address: Address::from_bytes(address),
                topics,
                data: data.into(),
                block_number,
                tx_hash,
                tx_index,
                block_hash: tx_hash,
                index,
                removed,
            },
        )
}

fn arb_result() -> impl Strategy<Value = ExecutionResult> {
    (
        "0x[0-9a-f]{0,64}",
        prop::collection::vec(arb_log(), 0..4),
        prop::collection::vec(any::<u8>(), 0..128),
        prop::option::of(".{0,32}"),
        any::<u64>(),
    )
        .prop_map(|(hash, logs, ret, vm_error, gas_used)| ExecutionResult {
            hash,
            logs,
            ret: ret.into(),
            vm_error,
            gas_used,
        })
}

proptest! {
    #[test]
    fn prop_envelope_round_trip(res in arb_result()) {
        let decoded = decode_tx_response(&envelope_of(&[res.clone()])).unwrap();
        prop_assert_eq!(decoded, res);
    }

    #[test]
    fn prop_all_results_in_order(results in prop::collection::vec(arb_result(), 0..4)) {
        let decoded = decode_tx_responses(&envelope_of(&results)).unwrap();
        prop_assert_eq!(decoded, results);
    }
}
