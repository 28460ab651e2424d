//! Signing benchmarks.
//!
//! Measures canonicalization and HMAC signing for the request shapes the service API sees:
//! bare GETs, paged GETs and write bodies with arrays of objects.

use std::collections::BTreeMap;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use link_developers_sdk::{Credentials, SigningRequest, sign};
use secrecy::SecretString;
use serde_json::{Value, json};

const API_KEY: &str = "136db0ec-0390-45a4-8b4c-f5b8b1b0a6a2";
const SECRET: &str = "9256bf8a-2b86-42fe-b3e0-d3079d0141fe";

fn request(path: &str, query: &[(&str, &str)], body: Option<Value>) -> SigningRequest {
    SigningRequest::builder()
        .method(if body.is_some() { "POST" } else { "GET" })
        .path(path)
        .timestamp(1_581_850_266_351)
        .nonce("Bp0IqgXE".parse().expect("valid nonce"))
        .query(
            query
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<BTreeMap<_, _>>(),
        )
        .maybe_body(body)
        .build()
        .expect("valid request")
}

fn mint_list(items: usize) -> Value {
    let list: Vec<Value> = (0..items)
        .map(|i| json!({ "tokenType": format!("{:08x}", 10_000_001 + i), "name": format!("nft-{i}") }))
        .collect();

    json!({
        "ownerAddress": "tlink1fr9mpexk5yq3hu6jc0npajfsa0x7tl427fuveq",
        "ownerSecret": "uhbdnNvIqQFnnIFDDG8EuVxtqkwsLtDR/owKInQIYmo=",
        "toAddress": "tlink18zxqds28mmg8mwduk32csx5xt6urw93ycf8jwp",
        "mintList": list
    })
}

fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("signing/canonicalize");

    let bare = request("/v1/wallets", &[], None);
    group.bench_function("bare_get", |b| {
        b.iter(|| black_box(&bare).canonicalize());
    });

    let paged = request(
        "/v1/service-tokens/a48f097b/holders",
        &[("limit", "10"), ("orderBy", "desc"), ("page", "1")],
        None,
    );
    group.bench_function("paged_get", |b| {
        b.iter(|| black_box(&paged).canonicalize());
    });

    for items in [1_usize, 10, 100] {
        let write = request(
            "/v1/item-tokens/61e14383/non-fungibles/multi-mint",
            &[],
            Some(mint_list(items)),
        );
        group.bench_with_input(BenchmarkId::new("mint_list", items), &write, |b, write| {
            b.iter(|| black_box(write).canonicalize());
        });
    }

    group.finish();
}

fn bench_sign(c: &mut Criterion) {
    let mut group = c.benchmark_group("signing/sign");
    let credentials =
        Credentials::new(API_KEY, SecretString::from(SECRET)).expect("valid credentials");

    let bare = request("/v1/wallets", &[], None);
    group.bench_function("bare_get", |b| {
        b.iter(|| sign(black_box(&credentials), black_box(&bare)));
    });

    let write = request(
        "/v1/item-tokens/61e14383/non-fungibles/multi-mint",
        &[],
        Some(mint_list(10)),
    );
    group.bench_function("mint_list_10", |b| {
        b.iter(|| sign(black_box(&credentials), black_box(&write)));
    });

    group.finish();
}

criterion_group!(benches, bench_canonicalize, bench_sign);
criterion_main!(benches);
