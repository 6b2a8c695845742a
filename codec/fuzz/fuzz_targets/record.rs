#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use recwire_codec::{
    decode, decode_with, encode,
    records::{ErrorInfo, Node, Response},
    Limits, Protocol,
};
use std::collections::BTreeMap;

#[derive(Arbitrary, Debug)]
struct NodeInput {
    id: String,
    name: Option<String>,
}

#[derive(Arbitrary, Debug)]
struct ResponseInput {
    thread_id: Option<String>,
    error: Option<(i32, Option<String>)>,
    extra_list: Option<Vec<NodeInput>>,
    extra_map: Option<BTreeMap<String, String>>,
}

impl From<ResponseInput> for Response {
    fn from(input: ResponseInput) -> Self {
        Response {
            thread_id: input.thread_id,
            error: input.error.map(|(code, info)| ErrorInfo {
                code: Some(code),
                info,
            }),
            extra_list: input.extra_list.map(|nodes| {
                nodes
                    .into_iter()
                    .map(|node| Node {
                        id: Some(node.id),
                        name: node.name,
                    })
                    .collect()
            }),
            extra_map: input.extra_map,
        }
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzInput {
    Roundtrip(ResponseInput),
    Decode(Vec<u8>),
}

fn roundtrip(response: Response) {
    for protocol in Protocol::ALL {
        let encoded = encode(&response, protocol).expect("valid response failed to encode");
        let decoded: Response =
            decode(encoded, protocol).expect("failed to decode an encoded response");
        assert_eq!(decoded, response);
    }
}

fn decode_untrusted(data: Vec<u8>) {
    let data = Bytes::from(data);
    let limits = Limits::default().with_max_depth(16);
    for protocol in Protocol::ALL {
        // Malformed input must fail cleanly; anything that decodes must re-encode.
        if let Ok(response) = decode_with::<Response>(data.clone(), protocol, limits) {
            encode(&response, protocol).expect("decoded response failed to encode");
        }
    }
}

fn fuzz(input: FuzzInput) {
    match input {
        FuzzInput::Roundtrip(input) => roundtrip(input.into()),
        FuzzInput::Decode(data) => decode_untrusted(data),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
