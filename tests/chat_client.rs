#![allow(clippy::unwrap_used)]
//! Chat client tests against a local fake OpenAI-compatible server.
//!
//! Each accepted connection is answered with the next scripted reply, so a
//! test can describe exactly what the endpoint streams and when it stalls.

use futures_util::StreamExt;
use oxygen_notes::llm::{
    CancellationToken, ChatClient, ChatConfig, ChatError, ChatMessage, ChatOptions,
    LanguageAssistant, RequestRegistry, StreamEvent, WORD_LOOKUP_KEY, collect_stream,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const TIMEOUT: Duration = Duration::from_secs(5);

struct Reply {
    status: u16,
    content_type: &'static str,
    parts: Vec<String>,
    /// Keep the connection open after the last part instead of closing it.
    stall: bool,
}

impl Reply {
    fn sse(lines: &[&str]) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream",
            parts: lines.iter().map(|line| format!("{line}\n\n")).collect(),
            stall: false,
        }
    }

    fn stalled_sse(lines: &[&str]) -> Self {
        Self {
            stall: true,
            ..Self::sse(lines)
        }
    }

    fn json(body: &Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            parts: vec![body.to_string()],
            stall: false,
        }
    }

    fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            parts: vec![body.to_string()],
            stall: false,
        }
    }

    fn never() -> Self {
        Self {
            status: 0,
            content_type: "",
            parts: Vec::new(),
            stall: true,
        }
    }
}

struct CapturedRequest {
    head: String,
    body: Value,
}

struct FakeServer {
    url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeServer {
    async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(Mutex::new(VecDeque::from(replies)));

        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                let Some(reply) = replies.lock().unwrap().pop_front() else {
                    return;
                };
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    serve(socket, reply, captured).await;
                });
            }
        });

        Self { url, requests }
    }

    fn config(&self) -> ChatConfig {
        ChatConfig {
            api_key: "sk-test".to_string(),
            api_url: self.url.clone(),
            api_url_path: "/v1/chat/completions".to_string(),
            api_model: "gpt-4o-mini".to_string(),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn serve(mut socket: TcpStream, reply: Reply, captured: Arc<Mutex<Vec<CapturedRequest>>>) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    captured.lock().unwrap().push(request);

    if reply.status != 0 {
        let head = format!(
            "HTTP/1.1 {} Fake\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
            reply.status, reply.content_type
        );
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        for part in &reply.parts {
            if socket.write_all(part.as_bytes()).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    if reply.stall {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = serde_json::from_slice(&buf[header_end..header_end + length]).unwrap_or(Value::Null);
    Some(CapturedRequest { head, body })
}

fn client(registry: &Arc<RequestRegistry>) -> ChatClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    ChatClient::with_http_client(http, Arc::clone(registry))
}

fn delta_line(content: &str) -> String {
    format!(
        "data: {}",
        json!({"choices": [{"index": 0, "delta": {"content": content}}]})
    )
}

fn messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a dictionary."),
        ChatMessage::user("ice"),
    ]
}

async fn next_event(stream: &mut oxygen_notes::llm::ChatStream) -> Option<StreamEvent> {
    tokio::time::timeout(TIMEOUT, stream.next()).await.unwrap()
}

#[tokio::test]
async fn test_stream_accumulates_fragments() {
    let hel = delta_line("Hel");
    let lo = delta_line("lo");
    let server = FakeServer::start(vec![Reply::sse(&[&hel, &lo, "data: [DONE]"])]).await;
    let registry = Arc::new(RequestRegistry::new());

    let mut stream = client(&registry).stream_chat(messages(), &server.config(), ChatOptions::default());

    let mut events = Vec::new();
    while let Some(event) = next_event(&mut stream).await {
        events.push(event);
    }

    assert!(matches!(events[0], StreamEvent::Status(200)));
    let chunks: Vec<(String, bool)> = events[1..]
        .iter()
        .map(|event| match event {
            StreamEvent::Chunk { text, done } => (text.clone(), *done),
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    assert_eq!(
        chunks,
        vec![
            ("Hel".to_string(), false),
            ("Hello".to_string(), false),
            ("Hello".to_string(), true),
        ]
    );
}

#[tokio::test]
async fn test_stream_sends_openai_request() {
    let server = FakeServer::start(vec![Reply::sse(&["data: [DONE]"])]).await;
    let registry = Arc::new(RequestRegistry::new());

    let stream = client(&registry).stream_chat(
        messages(),
        &server.config(),
        ChatOptions::default().with_temperature(0.0),
    );
    let text = tokio::time::timeout(TIMEOUT, collect_stream(stream))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(text.as_deref(), Some(""));
    let requests = server.requests.lock().unwrap();
    let request = &requests[0];
    assert!(request.head.starts_with("POST /v1/chat/completions HTTP/1.1"));
    assert!(request
        .head
        .to_lowercase()
        .contains("authorization: bearer sk-test"));
    assert_eq!(request.body["model"], "gpt-4o-mini");
    assert_eq!(request.body["stream"], true);
    assert_eq!(request.body["temperature"], 0.0);
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][1]["content"], "ice");
}

#[tokio::test]
async fn test_stream_error_status_reports_once() {
    let server = FakeServer::start(vec![Reply::error(401, "unauthorized")]).await;
    let registry = Arc::new(RequestRegistry::new());

    let mut stream = client(&registry).stream_chat(
        messages(),
        &server.config(),
        ChatOptions::default().with_request_key(WORD_LOOKUP_KEY),
    );

    let mut events = Vec::new();
    while let Some(event) = next_event(&mut stream).await {
        events.push(event);
    }

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], StreamEvent::Status(401)));
    match &events[1] {
        StreamEvent::Error(ChatError::Status { status, body }) => {
            assert_eq!(*status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_signal_stops_stream_mid_flight() {
    let first = delta_line("Hel");
    let server = FakeServer::start(vec![Reply::stalled_sse(&[&first])]).await;
    let registry = Arc::new(RequestRegistry::new());
    let signal = CancellationToken::new();

    let mut stream = client(&registry).stream_chat(
        messages(),
        &server.config(),
        ChatOptions::default()
            .with_request_key(WORD_LOOKUP_KEY)
            .with_signal(signal.clone()),
    );

    assert!(matches!(next_event(&mut stream).await, Some(StreamEvent::Status(200))));
    assert!(matches!(
        next_event(&mut stream).await,
        Some(StreamEvent::Chunk { done: false, .. })
    ));
    assert!(registry.contains(WORD_LOOKUP_KEY));

    signal.cancel();

    assert!(next_event(&mut stream).await.is_none());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_new_request_under_same_key_aborts_old_one() {
    let first = delta_line("old");
    let fresh = delta_line("new");
    let server = FakeServer::start(vec![
        Reply::stalled_sse(&[&first]),
        Reply::sse(&[&fresh, "data: [DONE]"]),
    ])
    .await;
    let registry = Arc::new(RequestRegistry::new());
    let client = client(&registry);
    let options = ChatOptions::default().with_request_key(WORD_LOOKUP_KEY);

    let mut old = client.stream_chat(messages(), &server.config(), options.clone());
    assert!(matches!(next_event(&mut old).await, Some(StreamEvent::Status(200))));
    assert!(matches!(next_event(&mut old).await, Some(StreamEvent::Chunk { .. })));
    let old_handle = registry.get(WORD_LOOKUP_KEY).unwrap();

    let new = client.stream_chat(messages(), &server.config(), options);

    assert!(old_handle.is_cancelled());
    assert!(next_event(&mut old).await.is_none());
    drop(old);
    assert!(registry.contains(WORD_LOOKUP_KEY));

    let text = tokio::time::timeout(TIMEOUT, collect_stream(new))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(text.as_deref(), Some("new"));
    assert!(registry.is_empty());
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_complete_chat_returns_first_choice() {
    let server = FakeServer::start(vec![Reply::json(&json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "冰"}, "finish_reason": "stop"}
        ]
    }))])
    .await;
    let registry = Arc::new(RequestRegistry::new());

    let response = client(&registry)
        .complete_chat(&messages(), &server.config(), 0.3, Some("define"))
        .await
        .unwrap();

    assert_eq!(response.first_content(), Some("冰"));
    assert!(registry.is_empty());
    let requests = server.requests.lock().unwrap();
    assert_eq!(requests[0].body["stream"], false);
}

#[tokio::test]
async fn test_complete_chat_error_status() {
    let server = FakeServer::start(vec![Reply::error(500, "boom")]).await;
    let registry = Arc::new(RequestRegistry::new());

    let err = client(&registry)
        .complete_chat(&messages(), &server.config(), 0.3, None)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_complete_chat_cancelled_through_registry() {
    let server = FakeServer::start(vec![Reply::never()]).await;
    let registry = Arc::new(RequestRegistry::new());
    let client = client(&registry);
    let config = server.config();

    let task = tokio::spawn(async move {
        client
            .complete_chat(&messages(), &config, 0.3, Some("translation"))
            .await
    });

    tokio::time::timeout(TIMEOUT, async {
        while server.request_count() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    registry.cancel("translation");

    let result = tokio::time::timeout(TIMEOUT, task).await.unwrap().unwrap();
    assert!(matches!(result, Err(ChatError::Cancelled)));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_assistant_define_word_round_trip() {
    let server = FakeServer::start(vec![Reply::json(&json!({
        "choices": [{"message": {"role": "assistant", "content": "ice: 冰"}}]
    }))])
    .await;
    let registry = Arc::new(RequestRegistry::new());
    let assistant = LanguageAssistant::new(client(&registry), server.config(), "中文");

    let definition = assistant
        .define_word("ice", Some("The ice is thin."), None, Some(WORD_LOOKUP_KEY))
        .await
        .unwrap();

    assert_eq!(definition, "ice: 冰");
    let requests = server.requests.lock().unwrap();
    let prompt = requests[0].body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("中文"));
    let user = requests[0].body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("ice"));
    assert!(user.contains("The ice is thin."));
}
