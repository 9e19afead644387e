#![allow(missing_docs)]
#![allow(dead_code)]

pub const ORIGINAL: &str = r#"
{
    "analysis": {
        "verdict": "safe",
        "score": 0.92,
        "flags": []
    },
    "answer": {
        "title": "Streaming JSON",
        "sections": [
            "intro",
            "escape \"quotes\""
        ]
    },
    "citations": [
        {
            "id": 1,
            "url": "https://example.com/a"
        },
        {
            "id": 2,
            "url": "https://example.com/b"
        }
    ],
    "grid": [
        [
            true,
            false
        ],
        [
            null
        ]
    ],
    "done": true
}"#;

// This stream simulates a structured model response arriving token by token.
// The chunks are deliberately cut on awkward seams: mid-string, mid-number,
// mid-escape, and mid-literal.
#[rustfmt::skip]
pub const STREAM: [&str; 11] = [
    r#"{"analysis":{"verdict":"sa"#,                                  // cut inside "safe"
    r#"fe","score":0.9"#,                                             // cut inside 0.92
    r#"2,"flags":[]}"#,                                               // empty array, object end
    r#","answer":{"title":"Streaming JSON","sections":["intro","escape \"#, // cut inside an escape
    r#""quotes\""]}"#,                                                // escape completes, closes out
    r#","citations":[{"id":1,"url":"https://example.com/a"},"#,       // cut after element comma
    r#"{"id":2,"url":"https://example.com/b"}]"#,
    r#","grid":[[true,fal"#,                                          // cut inside "false"
    r#"se],[null]]"#,
    r#","done":tru"#,                                                 // cut inside "true"
    r#"e}"#,
];

/// Split `payload` into approximately equal-sized chunks without breaking
/// UTF-8 code points.
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = core::cmp::min(start + chunk_size, len);
        while end < len && !payload.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks
}

/// Converts a `serde_json` value into the crate's value type, for comparing
/// listener output against a reference parse.
pub fn to_value(reference: &serde_json::Value) -> jsonflume::Value {
    match reference {
        serde_json::Value::Null => jsonflume::Value::Null,
        serde_json::Value::Bool(b) => jsonflume::Value::Boolean(*b),
        serde_json::Value::Number(n) => jsonflume::Value::Number(n.as_f64().unwrap()),
        serde_json::Value::String(s) => jsonflume::Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            jsonflume::Value::Array(items.iter().map(to_value).collect())
        }
        serde_json::Value::Object(map) => jsonflume::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_value(v)))
                .collect(),
        ),
    }
}

#[test]
fn assert_stream_example() {
    let streamed = STREAM.join("");

    let value: serde_json::Value = serde_json::from_str(ORIGINAL).unwrap();
    let original = serde_json::to_string(&value).unwrap();

    assert_eq!(streamed, original);
}
