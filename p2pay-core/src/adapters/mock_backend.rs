//! Mock payment API server for testing
//!
//! A small HTTP server on a random local port that behaves like the payment
//! backend: users with balances, signup/login issuing bearer tokens,
//! deposits, transfers and the activity feed. Every request is recorded so
//! tests can assert on what actually went over the wire.
//!
//! Error bodies follow the backend's `{"detail": ...}` convention.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

use crate::domain::FeedEntry;

/// Configuration for the mock server
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Reject deposit/transfer without a valid bearer token
    pub require_auth: bool,
    /// Answer every request with this status and raw body
    pub fail_with: Option<(u16, String)>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

/// A request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: JsonValue,
}

#[derive(Debug, Default)]
struct MockState {
    balances: HashMap<String, Decimal>,
    passwords: HashMap<String, String>,
    feed: Vec<FeedEntry>,
    requests: Vec<RecordedRequest>,
}

/// Mock payment server for testing
pub struct MockPaymentServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<MockState>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockPaymentServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new(Mutex::new(MockState::default()));

        // Non-blocking so the accept loop notices shutdown
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let state_clone = Arc::clone(&state);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let state = Arc::clone(&state_clone);
                        thread::spawn(move || handle_connection(stream, &cfg, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Seed a user with a starting balance
    pub fn add_user(&self, username: &str, balance: Decimal) {
        let mut state = self.state.lock().unwrap();
        state.balances.insert(username.to_string(), balance);
    }

    /// Current balance of a user
    pub fn balance(&self, username: &str) -> Option<Decimal> {
        self.state.lock().unwrap().balances.get(username).copied()
    }

    /// All requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests received for one path
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockPaymentServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one HTTP request: head up to the blank line, then Content-Length bytes
fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let head_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < head_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    Some((head, data[head_end..].to_vec()))
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, state: &Mutex<MockState>) {
    // Accepted sockets inherit non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);

    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, r#"{"detail": "Invalid request"}"#);
        return;
    }

    let method = parts[0].to_string();
    let path = parts[1].split('?').next().unwrap_or(parts[1]).to_string();
    let authorization = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.trim().to_string());
    let body: JsonValue = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);

    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if let Some((status, raw)) = &config.fail_with {
        send_response(&mut stream, *status, raw);
        return;
    }

    let authorized = authorization
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.starts_with("tok-"))
        .unwrap_or(false);

    let (status, response) = match (method.as_str(), path.as_str()) {
        ("GET", "/feed") => {
            let mut feed = state.feed.clone();
            feed.reverse();
            (200, serde_json::to_value(feed).unwrap())
        }
        ("POST", "/users") => create_user(&mut state, &body),
        ("POST", "/signup") => signup(&mut state, &body),
        ("POST", "/login") => login(&state, &body),
        ("POST", "/deposit" | "/transfer") if config.require_auth && !authorized => {
            (401, json!({"detail": "Not authenticated"}))
        }
        ("POST", "/deposit") => deposit(&mut state, &body),
        ("POST", "/transfer") => transfer(&mut state, &body),
        _ => (404, json!({"detail": "Not Found"})),
    };

    send_response(&mut stream, status, &response.to_string());
}

fn field<'a>(body: &'a JsonValue, name: &str) -> Option<&'a str> {
    body.get(name).and_then(|v| v.as_str())
}

fn amount(body: &JsonValue) -> Option<Decimal> {
    body.get("amount")
        .and_then(|v| v.as_f64())
        .and_then(|f| Decimal::try_from(f).ok())
}

fn unprocessable(name: &str) -> (u16, JsonValue) {
    (
        422,
        json!({"detail": [{"loc": ["body", name], "msg": "field required", "type": "value_error.missing"}]}),
    )
}

fn create_user(state: &mut MockState, body: &JsonValue) -> (u16, JsonValue) {
    let Some(username) = field(body, "username") else {
        return unprocessable("username");
    };
    if state.balances.contains_key(username) {
        return (400, json!({"detail": "Utilisateur déjà existant"}));
    }
    state.balances.insert(username.to_string(), Decimal::ZERO);
    (201, json!({"id": state.balances.len(), "username": username}))
}

fn signup(state: &mut MockState, body: &JsonValue) -> (u16, JsonValue) {
    let (Some(username), Some(password)) = (field(body, "username"), field(body, "password"))
    else {
        return unprocessable("password");
    };
    if state.passwords.contains_key(username) {
        return (400, json!({"detail": "Nom d'utilisateur déjà pris"}));
    }
    state.passwords.insert(username.to_string(), password.to_string());
    state
        .balances
        .entry(username.to_string())
        .or_insert(Decimal::ZERO);
    (201, json!({"message": format!("Compte {} créé", username)}))
}

fn login(state: &MockState, body: &JsonValue) -> (u16, JsonValue) {
    let (Some(username), Some(password)) = (field(body, "username"), field(body, "password"))
    else {
        return unprocessable("password");
    };
    match state.passwords.get(username) {
        Some(stored) if stored == password => {
            (200, json!({"token": format!("tok-{}", username)}))
        }
        _ => (401, json!({"detail": "Identifiants invalides"})),
    }
}

fn deposit(state: &mut MockState, body: &JsonValue) -> (u16, JsonValue) {
    let Some(username) = field(body, "username") else {
        return unprocessable("username");
    };
    let Some(amount) = amount(body) else {
        return unprocessable("amount");
    };
    match state.balances.get_mut(username) {
        Some(balance) => {
            *balance += amount;
            (
                200,
                json!({"message": format!("Dépôt de {} effectué pour {}", amount.normalize(), username)}),
            )
        }
        None => (404, json!({"detail": "Utilisateur introuvable"})),
    }
}

fn transfer(state: &mut MockState, body: &JsonValue) -> (u16, JsonValue) {
    let (Some(sender), Some(recipient)) = (field(body, "sender"), field(body, "recipient")) else {
        return unprocessable("recipient");
    };
    let Some(amount) = amount(body) else {
        return unprocessable("amount");
    };
    if !state.balances.contains_key(recipient) {
        return (404, json!({"detail": "Destinataire introuvable"}));
    }
    let Some(sender_balance) = state.balances.get_mut(sender) else {
        return (404, json!({"detail": "Expéditeur introuvable"}));
    };
    if *sender_balance < amount {
        return (400, json!({"detail": "Solde insuffisant"}));
    }
    *sender_balance -= amount;
    if let Some(recipient_balance) = state.balances.get_mut(recipient) {
        *recipient_balance += amount;
    }

    state.feed.push(FeedEntry {
        sender: sender.to_string(),
        recipient: recipient.to_string(),
        amount,
        message: field(body, "message").unwrap_or_default().to_string(),
        timestamp: Some(Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
    });
    (200, json!({"message": "Transfert effectué"}))
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapters::http::HttpBackend;
    use crate::domain::result::Error;
    use crate::domain::{
        Credentials, DepositRequest, NewUser, Token, TransferRequest,
    };
    use crate::ports::PaymentBackend;

    fn backend_for(server: &MockPaymentServer) -> HttpBackend {
        HttpBackend::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    fn transfer_request(sender: &str, recipient: &str, amount: i64) -> TransferRequest {
        TransferRequest {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount: Decimal::new(amount, 0),
            message: "Merci".to_string(),
        }
    }

    #[test]
    fn test_create_user_and_duplicate() {
        let server = MockPaymentServer::start(MockConfig::default()).unwrap();
        let backend = backend_for(&server);

        let created = backend.create_user(&NewUser::new("alice")).unwrap();
        assert!(created.message.is_none());

        let err = backend.create_user(&NewUser::new("alice")).unwrap_err();
        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Utilisateur déjà existant");
            }
            other => panic!("unexpected error: {other}"),
        }

        let requests = server.requests_to("/users");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body, json!({"username": "alice"}));
    }

    #[test]
    fn test_signup_then_login_returns_token() {
        let server = MockPaymentServer::start(MockConfig::default()).unwrap();
        let backend = backend_for(&server);
        let creds = Credentials::new("alice", "pw");

        let signed_up = backend.signup(&creds).unwrap();
        assert_eq!(signed_up.message.as_deref(), Some("Compte alice créé"));

        let token = backend.login(&creds).unwrap();
        assert_eq!(token.secret(), "tok-alice");

        let err = backend.login(&Credentials::new("alice", "wrong")).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Identifiants invalides");
    }

    #[test]
    fn test_deposit_sends_amount_as_number_and_bearer() {
        let server = MockPaymentServer::start(MockConfig::default()).unwrap();
        server.add_user("alice", Decimal::ZERO);
        let backend = backend_for(&server);

        let request = DepositRequest {
            username: "alice".to_string(),
            amount: Decimal::new(2550, 2),
        };
        let token = Token::new("tok-alice");
        let reply = backend.deposit(&request, Some(&token)).unwrap();

        assert_eq!(
            reply.message.as_deref(),
            Some("Dépôt de 25.5 effectué pour alice")
        );
        assert_eq!(server.balance("alice"), Some(Decimal::new(255, 1)));

        let recorded = &server.requests_to("/deposit")[0];
        assert_eq!(recorded.body["amount"], json!(25.5));
        assert_eq!(recorded.authorization.as_deref(), Some("Bearer tok-alice"));
    }

    #[test]
    fn test_unauthenticated_calls_send_no_header() {
        let server = MockPaymentServer::start(MockConfig::default()).unwrap();
        server.add_user("alice", Decimal::new(100, 0));
        server.add_user("bob", Decimal::ZERO);
        let backend = backend_for(&server);

        backend
            .transfer(&transfer_request("alice", "bob", 10), None)
            .unwrap();

        let recorded = &server.requests_to("/transfer")[0];
        assert!(recorded.authorization.is_none());
    }

    #[test]
    fn test_require_auth_rejects_missing_token() {
        let server = MockPaymentServer::start(MockConfig {
            require_auth: true,
            ..Default::default()
        })
        .unwrap();
        server.add_user("alice", Decimal::new(100, 0));
        server.add_user("bob", Decimal::ZERO);
        let backend = backend_for(&server);

        let err = backend
            .transfer(&transfer_request("alice", "bob", 10), None)
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Not authenticated");

        let token = Token::new("tok-alice");
        backend
            .transfer(&transfer_request("alice", "bob", 10), Some(&token))
            .unwrap();
        assert_eq!(server.balance("bob"), Some(Decimal::new(10, 0)));
    }

    #[test]
    fn test_transfer_then_feed_newest_first() {
        let server = MockPaymentServer::start(MockConfig::default()).unwrap();
        server.add_user("alice", Decimal::new(100, 0));
        server.add_user("bob", Decimal::ZERO);
        let backend = backend_for(&server);

        backend
            .transfer(&transfer_request("alice", "bob", 30), None)
            .unwrap();
        backend
            .transfer(&transfer_request("bob", "alice", 5), None)
            .unwrap();

        let feed = backend.feed().unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].sender, "bob");
        assert_eq!(feed[0].amount, Decimal::new(5, 0));
        assert_eq!(feed[1].sender, "alice");
        assert_eq!(feed[1].message, "Merci");
        assert!(feed[1].timestamp.is_some());
    }

    #[test]
    fn test_insufficient_funds_detail() {
        let server = MockPaymentServer::start(MockConfig::default()).unwrap();
        server.add_user("alice", Decimal::new(5, 0));
        server.add_user("bob", Decimal::ZERO);
        let backend = backend_for(&server);

        let err = backend
            .transfer(&transfer_request("alice", "bob", 50), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Solde insuffisant");
        assert_eq!(server.balance("alice"), Some(Decimal::new(5, 0)));
    }

    #[test]
    fn test_server_error_without_json_body() {
        let server = MockPaymentServer::start(MockConfig {
            fail_with: Some((500, "Internal Server Error".to_string())),
            ..Default::default()
        })
        .unwrap();
        let backend = backend_for(&server);

        let err = backend.feed().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Error");
    }

    #[test]
    fn test_malformed_success_body_is_decode_error() {
        let server = MockPaymentServer::start(MockConfig {
            fail_with: Some((200, "not json".to_string())),
            ..Default::default()
        })
        .unwrap();
        let backend = backend_for(&server);

        assert!(matches!(backend.feed(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_timeout_maps_to_network_error() {
        let server = MockPaymentServer::start(MockConfig {
            delay_ms: 1500,
            ..Default::default()
        })
        .unwrap();
        let backend = HttpBackend::new(&server.base_url(), Duration::from_secs(1)).unwrap();

        let err = backend.feed().unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.to_string().contains("timed out after 1 seconds"));
    }

    #[test]
    fn test_unreachable_server_maps_to_network_error() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let backend =
            HttpBackend::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2))
                .unwrap();

        let err = backend.feed().unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.to_string().contains("Unable to reach payment server"));
    }
}
