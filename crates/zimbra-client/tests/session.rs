//! Integration tests for the session API.
//!
//! These tests drive a `Session` through a scripted transport that returns
//! canned responses and records every request, so no server is needed.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use zimbra_client::{
    AddressRole, AuthError, ClientConfig, DownloadError, Error, HttpRequest, HttpResponse, Method,
    OutgoingMessage, Recipients, SearchOptions, SearchSpec, SendError, Session, Transport,
    TransportError, UploadError, UploadItem, UploadedAttachment,
};

/// Transport returning predefined responses in order.
#[derive(Clone, Default)]
struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    fn new() -> Self {
        Self::default()
    }

    fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    fn respond_json(self, body: &Value) -> Self {
        self.respond(200, serde_json::to_vec(body).unwrap())
    }

    fn fail(self, error: TransportError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn last_json(&self) -> Value {
        let requests = self.requests();
        serde_json::from_slice(&requests.last().unwrap().body).unwrap()
    }
}

impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted response".into())))
    }
}

fn config() -> ClientConfig {
    ClientConfig::new("https://zimbra.example.net").unwrap()
}

fn body(element: &str, value: Value) -> Value {
    json!({ "Header": { "context": { "_jsns": "urn:zimbra" } }, "Body": { element: value } })
}

fn auth_ok() -> Value {
    body(
        "AuthResponse",
        json!({
            "authToken": [{ "_content": "tok-1" }],
            "csrfToken": { "_content": "csrf-1" },
            "lifetime": 172_800_000,
        }),
    )
}

fn fault(code: &str, reason: &str) -> Value {
    json!({
        "Body": {
            "Fault": {
                "Code": { "Value": "soap:Sender" },
                "Reason": { "Text": reason },
                "Detail": { "Error": { "Code": code, "_jsns": "urn:zimbra" } },
            }
        }
    })
}

async fn logged_in(transport: MockTransport) -> Session<MockTransport> {
    Session::authenticate(transport, config(), "user@example.net", "secret")
        .await
        .unwrap()
}

fn wire_message(id: &str, date: i64) -> Value {
    json!({
        "id": id,
        "l": "2",
        "cid": "-".to_string() + id,
        "d": date,
        "su": format!("Subject {id}"),
        "fr": "preview",
        "f": "ua",
        "s": 2048,
        "e": [
            { "t": "f", "a": "alice@example.com", "p": "Alice" },
            { "t": "t", "a": "user@example.net" },
        ],
        "mp": [{
            "part": "TEXT",
            "ct": "multipart/mixed",
            "mp": [
                { "part": "1", "ct": "text/plain", "s": 12, "body": true, "content": "Hello there." },
                { "part": "2", "ct": "application/pdf", "s": 1024, "cd": "attachment", "filename": "report%202024.pdf" },
            ],
        }],
    })
}

#[tokio::test]
async fn test_authenticate_sends_credentials_without_header() {
    let transport = MockTransport::new().respond_json(&auth_ok());
    let session = logged_in(transport).await;

    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("tok-1"));
    assert_eq!(session.csrf_token(), Some("csrf-1"));

    let requests = session.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(
        requests[0].url.as_str(),
        "https://zimbra.example.net/service/soap/"
    );
    assert_eq!(requests[0].header("Content-Type"), Some("application/json"));

    let sent = session.transport().last_json();
    assert!(sent.get("Header").is_none());
    let auth = &sent["Body"]["AuthRequest"];
    assert_eq!(auth["_jsns"], "urn:zimbraAccount");
    assert_eq!(auth["account"], json!({ "by": "name", "_content": "user@example.net" }));
    assert_eq!(auth["password"], json!({ "_content": "secret" }));
}

#[tokio::test]
async fn test_authenticate_fault_is_rejected() {
    let transport = MockTransport::new().respond(
        500,
        serde_json::to_vec(&fault("account.AUTH_FAILED", "authentication failed")).unwrap(),
    );

    let err = Session::authenticate(transport, config(), "user@example.net", "wrong")
        .await
        .unwrap_err();
    match err {
        AuthError::Rejected(fault) => {
            assert_eq!(fault.code.as_deref(), Some("account.AUTH_FAILED"));
            assert_eq!(fault.reason, "authentication failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_authenticate_without_token_fails() {
    let transport =
        MockTransport::new().respond_json(&body("AuthResponse", json!({ "lifetime": 1000 })));

    let err = Session::authenticate(transport, config(), "user@example.net", "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
}

#[tokio::test]
async fn test_authenticate_transport_failure() {
    let transport = MockTransport::new().fail(TransportError::Connection("refused".into()));

    let err = Session::authenticate(transport, config(), "user@example.net", "secret")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Transport(TransportError::Connection(_))
    ));
}

#[tokio::test]
async fn test_authenticate_garbage_with_error_status() {
    let transport = MockTransport::new().respond(502, "<html>Bad Gateway</html>");

    let err = Session::authenticate(transport, config(), "user@example.net", "secret")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Transport(TransportError::Status { status: 502 })
    ));
}

#[tokio::test]
async fn test_calls_without_token_fail_before_network() {
    let transport = MockTransport::new();
    let mut session = Session::new(transport, config(), "user@example.net");

    let err = session
        .search(&SearchSpec::new().term("x"), &SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));

    let mut item = UploadItem::from_bytes("a.txt", "abc");
    assert!(matches!(
        session.upload_one(&mut item).await.unwrap_err(),
        UploadError::NotAuthenticated
    ));

    let message = OutgoingMessage::new(Recipients::new().to("a@example.com"), "s", "b");
    assert!(matches!(
        session.send(message).await.unwrap_err(),
        SendError::NotAuthenticated
    ));

    assert!(session.transport().requests().is_empty());
}

#[tokio::test]
async fn test_search_builds_request_and_normalizes() {
    let transport = MockTransport::new().respond_json(&auth_ok()).respond_json(&body(
        "SearchResponse",
        json!({
            "more": false,
            "offset": 0,
            "m": [wire_message("302", 1_700_000_100_000), wire_message("301", 1_700_000_000_000)],
        }),
    ));
    let mut session = Session::new(
        transport,
        config().with_locale("fr_FR"),
        "user@example.net",
    );
    session.reauthenticate("secret").await.unwrap();

    let spec = SearchSpec::new()
        .field("in", "/Inbox/Sub")
        .term("hello \"world\"");
    let messages = session
        .search(&spec, &SearchOptions::default())
        .await
        .unwrap();

    let requests = session.transport().requests();
    assert_eq!(requests[1].header("X-Zimbra-Csrf-Token"), Some("csrf-1"));

    let sent = session.transport().last_json();
    assert_eq!(sent["Header"]["context"]["_jsns"], "urn:zimbra");
    assert_eq!(sent["Header"]["context"]["authToken"]["_content"], "tok-1");

    let search = &sent["Body"]["SearchRequest"];
    assert_eq!(search["_jsns"], "urn:zimbraMail");
    assert_eq!(search["types"], "message");
    assert_eq!(search["sortBy"], "dateDesc");
    assert_eq!(search["fetch"], "all");
    assert_eq!(search["limit"], 1000);
    assert_eq!(search["offset"], 0);
    assert_eq!(search["locale"]["_content"], "fr_FR");
    assert_eq!(
        search["query"]["_content"],
        r#"in:"/Inbox/Sub" "hello ""world""""#
    );

    // Oldest first.
    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["301", "302"]);

    let first = &messages[0];
    assert_eq!(first.subject, "Subject 301");
    assert_eq!(first.from(), ["alice@example.com"]);
    assert_eq!(first.to(), ["user@example.net"]);
    assert!(first.addresses.get(AddressRole::Bcc).is_empty());
    assert_eq!(
        first.body.as_ref().unwrap().content.as_deref(),
        Some("Hello there.")
    );
    assert_eq!(first.attachments.len(), 1);
    assert_eq!(first.attachments[0].basename, "report 2024.pdf");
    assert_eq!(first.attachments[0].extension.as_deref(), Some("pdf"));
}

#[tokio::test]
async fn test_search_server_order_and_paging() {
    let transport = MockTransport::new().respond_json(&auth_ok()).respond_json(&body(
        "SearchResponse",
        json!({ "m": [wire_message("9", 2), wire_message("8", 1)] }),
    ));
    let mut session = logged_in(transport).await;

    let options = SearchOptions::new()
        .with_limit(25)
        .with_offset(50)
        .server_order();
    let messages = session
        .folder_messages("/Sent", &options)
        .await
        .unwrap();

    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["9", "8"]);

    let search = &session.transport().last_json()["Body"]["SearchRequest"];
    assert_eq!(search["limit"], 25);
    assert_eq!(search["offset"], 50);
    assert_eq!(search["query"]["_content"], r#"in:"/Sent""#);
    assert!(search.get("locale").is_none());
}

#[tokio::test]
async fn test_search_empty_and_missing_response() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond_json(&body("SearchResponse", json!({ "more": false })))
        .respond_json(&json!({ "Body": {} }));
    let mut session = logged_in(transport).await;
    let spec = SearchSpec::new().field("in", "/Empty");

    let messages = session
        .search(&spec, &SearchOptions::default())
        .await
        .unwrap();
    assert!(messages.is_empty());

    let err = session
        .search(&spec, &SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingResponse(ref name) if name == "SearchResponse"));
}

#[tokio::test]
async fn test_error_status_with_valid_body_is_transport_error() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(503, serde_json::to_vec(&body("SearchResponse", json!({}))).unwrap());
    let mut session = logged_in(transport).await;

    let err = session
        .search(&SearchSpec::new().field("in", "/Inbox"), &SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Status { status: 503 })
    ));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_auth_fault_clears_token() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(500, serde_json::to_vec(&fault("service.AUTH_EXPIRED", "auth credentials have expired")).unwrap());
    let mut session = logged_in(transport).await;

    let err = session.get_message("301").await.unwrap_err();
    assert!(matches!(err, Error::Fault(ref fault) if fault.is_auth_failure()));
    assert!(!session.is_authenticated());
    assert_eq!(session.csrf_token(), None);
}

#[tokio::test]
async fn test_other_fault_keeps_token() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(500, serde_json::to_vec(&fault("mail.NO_SUCH_MSG", "no such message")).unwrap());
    let mut session = logged_in(transport).await;

    let err = session.get_message("404").await.unwrap_err();
    assert!(matches!(err, Error::Fault(ref fault) if fault.code.as_deref() == Some("mail.NO_SUCH_MSG")));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_get_message() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond_json(&body("GetMsgResponse", json!({ "m": [wire_message("301", 1_700_000_000_000)] })));
    let mut session = logged_in(transport).await;

    let message = session.get_message("301").await.unwrap();
    assert_eq!(message.id, "301");
    assert_eq!(message.size_bytes, Some(2048));

    let sent = session.transport().last_json();
    assert_eq!(sent["Body"]["GetMsgRequest"]["m"], json!({ "id": "301" }));
}

#[tokio::test]
async fn test_explore_folder_tree() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond_json(&body(
            "GetFolderResponse",
            json!({
                "folder": [{
                    "id": "2",
                    "name": "Inbox",
                    "absFolderPath": "/Inbox",
                    "l": "1",
                    "n": 42,
                    "u": 3,
                    "view": "message",
                    "folder": [{ "id": "257", "name": "Invoices", "absFolderPath": "/Inbox/Invoices", "l": "2", "n": 7 }],
                }]
            }),
        ))
        .respond_json(&json!({ "Body": {} }));
    let mut session = logged_in(transport).await;

    let inbox = session.explore("/Inbox", Some(1)).await.unwrap();
    assert_eq!(inbox.name, "Inbox");
    assert_eq!(inbox.unread_count, Some(3));
    assert_eq!(inbox.children.len(), 1);
    assert_eq!(
        inbox.find("/inbox/invoices").map(|f| f.id.as_str()),
        Some("257")
    );

    let request = &session.transport().last_json()["Body"]["GetFolderRequest"];
    assert_eq!(request["depth"], 1);
    assert_eq!(request["folder"]["path"], "/Inbox");

    let err = session.explore("/Missing", None).await.unwrap_err();
    assert!(matches!(err, Error::MissingResponse(ref name) if name == "GetFolderResponse"));
    let request = &session.transport().last_json()["Body"]["GetFolderRequest"];
    assert!(request.get("depth").is_none());
}

#[tokio::test]
async fn test_upload_sends_headers_and_parses_id() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(200, "200,'null','abc-123'\r\n");
    let session = logged_in(transport).await;

    let mut item = UploadItem::from_bytes("rapport final.pdf", b"%PDF-1.7".to_vec());
    let uploaded = session.upload_one(&mut item).await.unwrap();
    assert_eq!(
        uploaded,
        UploadedAttachment {
            basename: "rapport final.pdf".to_string(),
            attachment_id: "abc-123".to_string(),
        }
    );

    let requests = session.transport().requests();
    let upload = &requests[1];
    assert_eq!(
        upload.url.as_str(),
        "https://zimbra.example.net/service/upload?fmt=raw"
    );
    assert_eq!(
        upload.header("Content-Disposition"),
        Some("attachment; filename=\"rapport%20final.pdf\"")
    );
    assert_eq!(upload.header("Content-Transfer-Encoding"), Some("binary"));
    assert_eq!(upload.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(upload.header("Cookie"), Some("ZM_AUTH_TOKEN=tok-1"));
    assert_eq!(upload.body, b"%PDF-1.7");
}

#[tokio::test]
async fn test_upload_rejected_code() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(200, "500,'null'");
    let session = logged_in(transport).await;

    let mut item = UploadItem::from_bytes("big.iso", vec![0_u8; 16]);
    let err = session.upload_one(&mut item).await.unwrap_err();
    assert!(matches!(
        err,
        UploadError::Rejected { status_code: 500, ref basename } if basename == "big.iso"
    ));
}

#[tokio::test]
async fn test_upload_invalid_source_before_network() {
    let transport = MockTransport::new().respond_json(&auth_ok());
    let session = logged_in(transport).await;

    let mut unnamed = UploadItem::from_bytes("", "data");
    assert!(matches!(
        session.upload_one(&mut unnamed).await.unwrap_err(),
        UploadError::InvalidSource { source: None, .. }
    ));

    let mut missing = UploadItem::from_path("/nonexistent/dir/file.bin");
    assert!(matches!(
        session.upload_one(&mut missing).await.unwrap_err(),
        UploadError::InvalidSource { source: Some(_), .. }
    ));

    assert_eq!(session.transport().requests().len(), 1);
}

#[tokio::test]
async fn test_upload_stream_twice_and_fail_fast() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(200, "200,'null','id-1'")
        .respond(200, "200,'null','id-2'")
        .respond(200, "413,'null'");
    let session = logged_in(transport).await;

    let mut items = vec![
        UploadItem::from_stream("notes.txt", Cursor::new(b"notes".to_vec())),
        UploadItem::from_bytes("b.txt", "b"),
    ];
    let uploaded = session.upload(&mut items).await.unwrap();
    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded[1].attachment_id, "id-2");

    // Same stream uploads its full content again, then the batch stops.
    let err = session.upload(&mut items).await.unwrap_err();
    assert!(matches!(err, UploadError::Rejected { status_code: 413, .. }));

    let requests = session.transport().requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[1].body, b"notes");
    assert_eq!(requests[3].body, b"notes");
}

#[tokio::test]
async fn test_download_filters_and_maps_not_found() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond_json(&body("GetMsgResponse", json!({ "m": [wire_message("34299", 0)] })))
        .respond(200, b"%PDF".to_vec())
        .respond(404, "not found");
    let mut session = logged_in(transport).await;
    let message = session.get_message("34299").await.unwrap();

    let none = session
        .download(&message, |a| a.extension.as_deref() == Some("docx"))
        .await
        .unwrap();
    assert!(none.is_empty());

    let files = session.download_all(&message).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].payload, b"%PDF");
    assert_eq!(files[0].attachment.part, "2");

    let requests = session.transport().requests();
    let fetch = requests.last().unwrap();
    assert_eq!(fetch.method, Method::Get);
    assert_eq!(
        fetch.url.as_str(),
        "https://zimbra.example.net/service/content/get?id=34299&part=2"
    );
    assert_eq!(fetch.header("Cookie"), Some("ZM_AUTH_TOKEN=tok-1"));

    let err = session.download_all(&message).await.unwrap_err();
    assert!(matches!(
        err,
        DownloadError::NotFound { ref message_id, ref part } if message_id == "34299" && part == "2"
    ));
}

#[tokio::test]
async fn test_send_without_attachments_omits_attach() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond_json(&body("SendMsgResponse", json!({ "m": [{ "id": "9001" }] })));
    let mut session = logged_in(transport).await;

    let message = OutgoingMessage::new(
        Recipients::new().to("alice@example.com").bcc("audit@example.com"),
        "Hello",
        "Body text",
    );
    let result = session.send(message).await.unwrap();
    assert_eq!(result.message_id.as_deref(), Some("9001"));
    assert_eq!(result.response["m"][0]["id"], "9001");

    let m = &session.transport().last_json()["Body"]["SendMsgRequest"]["m"];
    assert!(m.get("attach").is_none());
    assert_eq!(
        m["e"],
        json!([
            { "t": "t", "a": "alice@example.com" },
            { "t": "b", "a": "audit@example.com" },
        ])
    );
}

#[tokio::test]
async fn test_send_keeps_recipient_order() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond_json(&body("SendMsgResponse", json!({ "m": [{ "id": "9004" }] })));
    let mut session = logged_in(transport).await;

    let recipients = Recipients::new()
        .bcc("audit@example.com")
        .add(AddressRole::From, "user@example.net")
        .to("alice@example.com");
    session
        .send(OutgoingMessage::new(recipients, "Order", "x"))
        .await
        .unwrap();

    let m = &session.transport().last_json()["Body"]["SendMsgRequest"]["m"];
    assert_eq!(
        m["e"],
        json!([
            { "t": "b", "a": "audit@example.com" },
            { "t": "f", "a": "user@example.net" },
            { "t": "t", "a": "alice@example.com" },
        ])
    );
}

#[tokio::test]
async fn test_send_with_uploaded_attachment_skips_upload() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond_json(&body("SendMsgResponse", json!({ "m": [{ "id": "9002" }] })));
    let mut session = logged_in(transport).await;

    let message = OutgoingMessage::new(Recipients::new().to("alice@example.com"), "Files", "")
        .with_attachment(UploadedAttachment {
            basename: "a.pdf".to_string(),
            attachment_id: "aid-7".to_string(),
        });
    session.send(message).await.unwrap();

    let requests = session.transport().requests();
    assert_eq!(requests.len(), 2);
    let m = &session.transport().last_json()["Body"]["SendMsgRequest"]["m"];
    assert_eq!(m["attach"]["aid"], "aid-7");
}

#[tokio::test]
async fn test_send_uploads_pending_attachments_first() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(200, "200,'null','up-1'")
        .respond_json(&body("SendMsgResponse", json!({ "m": [{ "id": "9003" }] })));
    let mut session = logged_in(transport).await;

    let message = OutgoingMessage::new(Recipients::new().to("alice@example.com"), "Files", "See")
        .with_attachment(UploadedAttachment {
            basename: "a.pdf".to_string(),
            attachment_id: "aid-7".to_string(),
        })
        .with_attachment(UploadItem::from_bytes("b.txt", "b"));
    session.send(message).await.unwrap();

    let m = &session.transport().last_json()["Body"]["SendMsgRequest"]["m"];
    assert_eq!(m["attach"]["aid"], "aid-7,up-1");
}

#[tokio::test]
async fn test_send_upload_failure_sends_nothing() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(200, "500,'null'");
    let mut session = logged_in(transport).await;

    let message = OutgoingMessage::new(Recipients::new().to("alice@example.com"), "Files", "")
        .with_attachment(UploadItem::from_bytes("b.txt", "b"));
    let err = session.send(message).await.unwrap_err();
    assert!(matches!(err, SendError::Upload(UploadError::Rejected { .. })));
    assert_eq!(session.transport().requests().len(), 2);
}

#[tokio::test]
async fn test_send_fault() {
    let transport = MockTransport::new()
        .respond_json(&auth_ok())
        .respond(500, serde_json::to_vec(&fault("mail.SEND_FAILURE", "message send failure")).unwrap());
    let mut session = logged_in(transport).await;

    let message = OutgoingMessage::new(Recipients::new().to("bad@"), "x", "y");
    let err = session.send(message).await.unwrap_err();
    assert!(matches!(err, SendError::Fault(ref fault) if fault.code.as_deref() == Some("mail.SEND_FAILURE")));
}
