/// Edge case integration tests
///
/// These tests cover encoding quirks, unusual document shapes and filesystem layouts
mod common;

use std::fs;

use common::{RequestBuilder, UserDirBuilder, session_json};
use copilot_history_explorer::{
    ChatMessage, JsonHistoryParser, MessageKind, discover_history_files, list_histories,
    search_histories,
};

fn messages_of(bytes: &[u8]) -> Vec<ChatMessage> {
    JsonHistoryParser::from_reader(bytes).read_all().map(Result::unwrap).collect()
}

#[test]
fn test_edge_case_utf8_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(br#"{"requests":[{"message":{"text":"bom"}}]}"#);
    let messages = messages_of(&bytes);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "bom");
}

#[test]
fn test_edge_case_crlf_and_tabs_between_tokens() {
    let json = "{\r\n\t\"requests\" :\r\n [ {\r\n\"message\"\t: { \"text\" : \"spaced\" } } ]\r\n}\r\n";
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages[0].content, "spaced");
}

#[test]
fn test_edge_case_escapes_in_text() {
    let json = r#"{"requests":[{"message":{"text":"tab\there \"quoted\" é 😀 nul\u0000"}}]}"#;
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages[0].content, "tab\there \"quoted\" é 😀 nul\0");
}

#[test]
fn test_edge_case_lone_surrogate_is_an_error() {
    let json = r#"{"requests":[{"message":{"text":"fine"}},{"message":{"text":"a\ud800b"}}]}"#;
    let parser = JsonHistoryParser::from_reader(json.as_bytes());
    assert_eq!(parser.read_next().unwrap().unwrap().content, "fine");
    assert!(parser.read_next().is_err());
    assert!(parser.read_next().unwrap().is_none());
}

#[test]
fn test_edge_case_deeply_nested_metadata_is_skipped() {
    let depth = 2_000;
    let nested = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    let json = format!(
        r#"{{"meta":{},"requests":[{{"result":{},"message":{{"text":"deep"}}}}]}}"#,
        nested, nested
    );
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "deep");
}

#[test]
fn test_edge_case_requests_field_appears_after_large_fields() {
    let json = format!(
        r#"{{"version":3,"initialLocation":"panel","blob":"{}","requests":[{{"message":{{"text":"late"}}}}]}}"#,
        "y".repeat(100_000)
    );
    assert_eq!(messages_of(json.as_bytes())[0].content, "late");
}

#[test]
fn test_edge_case_non_object_request_elements_are_skipped() {
    let json = r#"{"requests":[1,"two",null,[{"message":{"text":"hidden"}}],{"message":{"text":"real"}},true]}"#;
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "real");
}

#[test]
fn test_edge_case_non_object_root() {
    assert!(messages_of(br#"[{"requests":[{"message":{"text":"x"}}]}]"#).is_empty());
    assert!(messages_of(b"").is_empty());
    assert!(messages_of(b"   \n").is_empty());
}

#[test]
fn test_edge_case_only_first_requests_field_is_used() {
    let json = r#"{"requests":[{"message":{"text":"first"}}],"requests":[{"message":{"text":"second"}}]}"#;
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "first");
}

#[test]
fn test_edge_case_empty_and_blank_prompts() {
    let json = r#"{"requests":[
        {"message":{"text":""},"response":[{"value":"reply to nothing"}]},
        {"message":{"text":"   "}}
    ]}"#;
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].kind, MessageKind::Assistant);
    assert_eq!(messages[1].kind, MessageKind::User);
    assert_eq!(messages[1].content, "   ");
}

#[test]
fn test_edge_case_zero_timestamp() {
    let json = session_json(&[RequestBuilder::new("epoch").timestamp(0)]);
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages[0].timestamp.unwrap().timestamp_millis(), 0);
}

#[test]
fn test_edge_case_out_of_range_timestamp() {
    let json = session_json(&[RequestBuilder::new("far future").timestamp(i64::MAX)]);
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages[0].content, "far future");
    assert!(messages[0].timestamp.is_none());
}

#[test]
fn test_edge_case_huge_integer_timestamp_is_ignored() {
    let json = r#"{"requests":[{"message":{"text":"big"},"timestamp":123456789012345678901234567890}]}"#;
    let messages = messages_of(json.as_bytes());
    assert_eq!(messages[0].content, "big");
    assert!(messages[0].timestamp.is_none());
}

#[test]
fn test_edge_case_many_small_sessions() {
    let mut builder = UserDirBuilder::new();
    for i in 0..50 {
        builder = builder.with_workspace_session(
            &format!("ws{}", i % 5),
            &format!("session{}.json", i),
            &session_json(&[RequestBuilder::new(&format!("prompt {}", i)).timestamp(i)]),
        );
    }
    let user_dir = builder.build();

    let files = discover_history_files(user_dir.path()).unwrap();
    assert_eq!(files.len(), 50);

    let summaries = list_histories(&files);
    assert_eq!(summaries.len(), 50);
    assert_eq!(summaries[0].first_message, "prompt 49");
    assert_eq!(summaries[49].first_message, "prompt 0");
}

#[test]
fn test_edge_case_unreadable_sessions_are_skipped() {
    let user_dir = UserDirBuilder::new()
        .with_empty_window_session("good.json", &session_json(&[RequestBuilder::new("good").reply("needle")]))
        .with_empty_window_session("empty.json", "")
        .with_empty_window_session("garbage.json", "not json at all")
        .build();

    let files = discover_history_files(user_dir.path()).unwrap();
    assert_eq!(files.len(), 3);

    let results = search_histories(&files, "needle");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].first_message, "good");
}

#[test]
fn test_edge_case_directory_named_like_session() {
    let user_dir = UserDirBuilder::new().build();
    let sessions = user_dir.path().join("globalStorage/emptyWindowChatSessions");
    fs::create_dir_all(sessions.join("folder.json")).unwrap();

    assert!(discover_history_files(user_dir.path()).unwrap().is_empty());
    assert!(JsonHistoryParser::open(sessions.join("folder.json")).is_err());
}
