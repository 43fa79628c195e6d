use super::{init_test, test_credentials, test_descriptor, test_scope, test_time};
use anyhow::Result;
use pretty_assertions::assert_eq;
use s3sign_core::hash::{hex_sha256, hex_sha256_reader};
use s3sign_core::time::parse_iso8601;
use s3sign_put::{derive_signing_key, RequestDescriptor, RequestSigner, SigningKeyCache, SigningScope};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use test_case::test_case;

fn signature_of(desc: &RequestDescriptor) -> Result<String> {
    let result = RequestSigner::new().sign(desc, &test_scope(), &test_credentials(), test_time())?;
    Ok(result.signature().to_string())
}

#[test]
fn test_signing_is_deterministic() -> Result<()> {
    init_test();

    let signer = RequestSigner::new();
    let first = signer.sign(&test_descriptor(), &test_scope(), &test_credentials(), test_time())?;
    let second = signer.sign(&test_descriptor(), &test_scope(), &test_credentials(), test_time())?;

    assert_eq!(first, second);
    assert_eq!(first.signature().len(), 64);
    assert!(first
        .signature()
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    Ok(())
}

#[test_case(b"Hello, World?" ; "payload byte changed")]
#[test_case(b"" ; "empty payload")]
#[test_case(b"Hello, World!\n" ; "trailing newline")]
fn test_payload_change_changes_signature(payload: &[u8]) -> Result<()> {
    let hash = hex_sha256(payload);
    let changed = RequestDescriptor::put_object(
        "examplebucket",
        "us-east-2",
        "hello.txt",
        &hash,
        test_time(),
    )?;

    assert_ne!(signature_of(&changed)?, signature_of(&test_descriptor())?);
    Ok(())
}

#[test_case("x-amz-acl", "public-read" ; "acl")]
#[test_case("x-amz-meta-owner", "alice" ; "extra header")]
#[test_case("x-amz-storage-class", "STANDARD_IA" ; "storage class")]
fn test_header_change_changes_signature(name: &str, value: &str) -> Result<()> {
    let desc = test_descriptor().with_header(name, value)?;
    assert_ne!(signature_of(&desc)?, signature_of(&test_descriptor())?);
    Ok(())
}

#[test]
fn test_timestamp_change_changes_signature() -> Result<()> {
    let later = parse_iso8601("20240101T000001Z")?;
    let payload_hash = hex_sha256(b"Hello, World!");
    let desc = RequestDescriptor::put_object(
        "examplebucket",
        "us-east-2",
        "hello.txt",
        &payload_hash,
        later,
    )?;
    let scope = SigningScope::from_time(later, "us-east-2");

    let result = RequestSigner::new().sign(&desc, &scope, &test_credentials(), later)?;
    assert_eq!(result.amz_date(), "20240101T000001Z");
    assert_ne!(result.signature(), signature_of(&test_descriptor())?);
    Ok(())
}

#[test]
fn test_region_change_changes_signature() -> Result<()> {
    let payload_hash = hex_sha256(b"Hello, World!");
    let desc = RequestDescriptor::put_object(
        "examplebucket",
        "eu-west-1",
        "hello.txt",
        &payload_hash,
        test_time(),
    )?;
    let scope = SigningScope::from_time(test_time(), "eu-west-1");

    let result = RequestSigner::new().sign(&desc, &scope, &test_credentials(), test_time())?;
    assert!(result
        .authorization()
        .contains("/20240101/eu-west-1/s3/aws4_request,"));
    assert_ne!(result.signature(), signature_of(&test_descriptor())?);
    Ok(())
}

#[test]
fn test_header_insertion_order_does_not_matter() -> Result<()> {
    let payload_hash = hex_sha256(b"Hello, World!");
    let host = "examplebucket.s3.us-east-2.amazonaws.com";

    let forward = RequestDescriptor::new(host, "/hello.txt", payload_hash.as_str())
        .with_header("host", host)?
        .with_header("x-amz-content-sha256", &payload_hash)?
        .with_header("x-amz-date", "20240101T000000Z")?
        .with_header("x-amz-meta-a", "1")?;
    let backward = RequestDescriptor::new(host, "/hello.txt", payload_hash.as_str())
        .with_header("x-amz-meta-a", "1")?
        .with_header("x-amz-date", "20240101T000000Z")?
        .with_header("x-amz-content-sha256", &payload_hash)?
        .with_header("host", host)?;

    let signer = RequestSigner::new();
    let a = signer.sign(&forward, &test_scope(), &test_credentials(), test_time())?;
    let b = signer.sign(&backward, &test_scope(), &test_credentials(), test_time())?;

    assert_eq!(a.canonical_request(), b.canonical_request());
    assert_eq!(a.signature(), b.signature());
    assert!(a
        .authorization()
        .contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-meta-a,"));
    Ok(())
}

#[test_case(0 ; "required headers only")]
#[test_case(1 ; "one extra header")]
#[test_case(4 ; "four extra headers")]
fn test_canonical_request_line_count(extra: usize) -> Result<()> {
    let mut desc = test_descriptor();
    for i in 0..extra {
        desc = desc.with_header(&format!("x-amz-meta-k{i}"), "v")?;
    }

    let result = RequestSigner::new().sign(&desc, &test_scope(), &test_credentials(), test_time())?;
    let signed = 3 + extra;

    // method, uri, query, one line per header, blank, signed headers, hash
    assert_eq!(result.canonical_request().split('\n').count(), 6 + signed);
    assert_eq!(result.string_to_sign().split('\n').count(), 4);
    Ok(())
}

#[test]
fn test_signing_key_is_32_bytes_for_any_scope() -> Result<()> {
    for region in ["us-east-1", "eu-central-1", "ap-southeast-2"] {
        let key = derive_signing_key(
            b"secret",
            &SigningScope::from_time(test_time(), region),
        )?;
        assert_eq!(key.as_bytes().len(), 32);
    }
    Ok(())
}

#[test]
fn test_concurrent_signing_matches_sequential() -> Result<()> {
    let expected = signature_of(&test_descriptor())?;
    let signer = RequestSigner::new().with_key_cache(Arc::new(SigningKeyCache::new()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let signer = signer.clone();
            thread::spawn(move || {
                signer
                    .sign(&test_descriptor(), &test_scope(), &test_credentials(), test_time())
                    .map(|r| r.signature().to_string())
            })
        })
        .collect();

    for handle in handles {
        let signature = handle.join().expect("signing thread must not panic")?;
        assert_eq!(signature, expected);
    }
    Ok(())
}

#[test]
fn test_streamed_payload_hash_matches_in_memory() -> Result<()> {
    let payload = "Hello, World!".repeat(2048);
    let streamed = hex_sha256_reader(Cursor::new(payload.as_bytes()))?;
    assert_eq!(streamed, hex_sha256(payload.as_bytes()));

    let desc = RequestDescriptor::put_object(
        "examplebucket",
        "us-east-2",
        "large.txt",
        &streamed,
        test_time(),
    )?;
    let result = RequestSigner::new().sign(&desc, &test_scope(), &test_credentials(), test_time())?;
    assert_eq!(result.payload_hash(), streamed);
    assert!(result.canonical_request().ends_with(&streamed));
    Ok(())
}

#[test]
fn test_object_key_with_percent_is_signed_literally() -> Result<()> {
    let payload_hash = hex_sha256(b"Hello, World!");
    let desc = RequestDescriptor::put_object(
        "examplebucket",
        "us-east-2",
        "100%.txt",
        &payload_hash,
        test_time(),
    )?;
    let result = RequestSigner::new().sign(&desc, &test_scope(), &test_credentials(), test_time())?;

    assert_eq!(result.canonical_request().split('\n').nth(1), Some("/100%25.txt"));
    assert_eq!(
        desc.endpoint()?,
        "https://examplebucket.s3.us-east-2.amazonaws.com/100%25.txt"
    );
    Ok(())
}

#[test]
fn test_uppercase_payload_hash_is_signed_unchanged() -> Result<()> {
    let payload_hash = hex_sha256(b"Hello, World!").to_uppercase();
    let desc = RequestDescriptor::put_object(
        "examplebucket",
        "us-east-2",
        "hello.txt",
        &payload_hash,
        test_time(),
    )?;
    let result = RequestSigner::new().sign(&desc, &test_scope(), &test_credentials(), test_time())?;

    assert_eq!(result.payload_hash(), payload_hash);
    assert!(result
        .canonical_request()
        .contains(&format!("x-amz-content-sha256:{payload_hash}\n")));
    assert!(result.canonical_request().ends_with(&payload_hash));
    assert_ne!(result.signature(), signature_of(&test_descriptor())?);
    Ok(())
}
