use hemolink_context::{ExternalEmbedder, OllamaEmbedder};
use hemolink_core::traits::Embedder;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves a single canned HTTP response and hands back the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let lower = line.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn test_ollama_embed_parses_vector() {
    let (url, server) = serve_once("200 OK", r#"{"embedding":[0.25,-0.5,1.0]}"#).await;
    let embedder = OllamaEmbedder::new("nomic-embed-text", url, Duration::from_secs(5)).unwrap();

    let vector = embedder.embed("cardiac arrest").await.unwrap();
    assert_eq!(vector, vec![0.25, -0.5, 1.0]);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/embeddings"));
    assert!(request.contains(r#""prompt":"cardiac arrest""#));
    assert!(request.contains(r#""model":"nomic-embed-text""#));
}

#[tokio::test]
async fn test_ollama_non_success_status_is_error() {
    let (url, _server) = serve_once("500 Internal Server Error", r#"{"error":"model not loaded"}"#).await;
    let embedder = OllamaEmbedder::new("nomic-embed-text", url, Duration::from_secs(5)).unwrap();

    let err = embedder.embed("stroke").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("model not loaded"), "{message}");
}

#[tokio::test]
async fn test_ollama_missing_field_is_error() {
    let (url, _server) = serve_once("200 OK", r#"{"embeddings":[]}"#).await;
    let embedder = OllamaEmbedder::new("nomic-embed-text", url, Duration::from_secs(5)).unwrap();
    assert!(embedder.embed("stroke").await.is_err());
}

#[tokio::test]
async fn test_slow_server_hits_client_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(socket);
    });

    let embedder = OllamaEmbedder::new(
        "nomic-embed-text",
        format!("http://{}", addr),
        Duration::from_millis(200),
    )
    .unwrap();
    let started = std::time::Instant::now();
    assert!(embedder.embed("burn injury").await.is_err());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_openai_batch_uses_bearer_auth() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"data":[{"embedding":[1.0,2.0]},{"embedding":[3.0,4.0]}]}"#,
    )
    .await;
    let embedder =
        ExternalEmbedder::new("text-embedding-3-small", "sk-test", url, Duration::from_secs(5))
            .unwrap();

    let vectors = embedder
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(vectors, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/embeddings"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
}

#[tokio::test]
async fn test_openai_count_mismatch_is_error() {
    let (url, _server) = serve_once("200 OK", r#"{"data":[{"embedding":[1.0]}]}"#).await;
    let embedder =
        ExternalEmbedder::new("text-embedding-3-small", "sk-test", url, Duration::from_secs(5))
            .unwrap();
    let err = embedder
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Mismatch embedding count"));
}
