use super::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::json;
use shared::protocol::CertidaoEnvelope;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::{
    net::TcpListener,
    sync::{mpsc, Notify},
};

#[derive(Clone)]
struct RelayStub {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    received: mpsc::UnboundedSender<CertidaoEnvelope>,
    release: Option<Arc<Notify>>,
}

async fn handle_certidao(
    State(stub): State<RelayStub>,
    Json(envelope): Json<CertidaoEnvelope>,
) -> (StatusCode, String) {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let _ = stub.received.send(envelope);
    if let Some(release) = &stub.release {
        release.notified().await;
    }
    (stub.status, stub.body.clone())
}

struct SpawnedRelay {
    server_url: String,
    hits: Arc<AtomicUsize>,
    received: mpsc::UnboundedReceiver<CertidaoEnvelope>,
}

async fn spawn_relay(
    status: StatusCode,
    body: impl Into<String>,
    release: Option<Arc<Notify>>,
) -> SpawnedRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let (tx, received) = mpsc::unbounded_channel();
    let stub = RelayStub {
        status,
        body: body.into(),
        hits: hits.clone(),
        received: tx,
        release,
    };
    let app = Router::new()
        .route(CERTIDAO_ROUTE, post(handle_certidao))
        .with_state(stub);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    SpawnedRelay {
        server_url: format!("http://{addr}"),
        hits,
        received,
    }
}

async fn unreachable_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

fn filled_controller(server_url: &str) -> FormController {
    let controller = FormController::new(server_url);
    controller.set_field(FormField::Company, "BURN");
    controller.add_email("fiscal@burn.com.br").expect("email");
    controller.add_email("juridico@burn.com.br").expect("email");
    controller.set_field(FormField::DocumentTypeSelection, "Certidão Federal");
    controller.set_field(FormField::IssuingBody, "Receita Federal");
    controller.set_field(FormField::IssuedOn, "2026-03-01");
    controller.set_field(FormField::ValidUntil, "2026-09-01");
    controller.set_field(FormField::StatusNote, "Em dia");
    controller
}

#[test]
fn relay_url_appends_route() {
    let controller = FormController::new("http://localhost:3000/");
    assert_eq!(controller.relay_url(), "http://localhost:3000/api/certidao");
}

#[test]
fn set_field_by_name_uses_input_names() {
    let controller = FormController::new("http://localhost:3000");
    controller.set_field_by_name("empresa", "LIMPPANO").expect("field");
    controller.set_field_by_name("orgao", "Prefeitura").expect("field");
    let draft = controller.draft();
    assert_eq!(draft.tax_id, "33.033.556/0001-33");
    assert_eq!(draft.issuing_body, "Prefeitura");

    let err = controller
        .set_field_by_name("telefone", "x")
        .expect_err("unknown");
    assert_eq!(err, UnknownField("telefone".into()));
}

#[test]
fn interpret_reply_classifies_bodies() {
    assert!(interpret_reply(200, r#"{"ok":true}"#).is_ok());

    let err = interpret_reply(502, "oops").expect_err("not json");
    assert!(matches!(err, SubmitError::InvalidResponse { status: 502, ref raw } if raw == "oops"));

    let err = interpret_reply(200, r#"{"ok":false,"message":"Aba não encontrada"}"#)
        .expect_err("rejected");
    assert_eq!(err.banner_message(), "Aba não encontrada");

    let err = interpret_reply(500, r#"{"ok":false,"error":"TypeError"}"#).expect_err("rejected");
    assert_eq!(err.banner_message(), "TypeError");

    let err = interpret_reply(200, r#"{"saved":1}"#).expect_err("no ok flag");
    assert_eq!(err.banner_message(), "Erro desconhecido ao salvar.");

    let err = interpret_reply(200, "null").expect_err("null body");
    assert_eq!(err.banner_message(), "Erro desconhecido ao salvar.");
}

#[test]
fn wrapped_raw_text_is_kept_as_detail() {
    let err = interpret_reply(502, r#"{"ok":false,"raw":"oops"}"#).expect_err("wrapped");
    assert_eq!(err.banner_message(), "Erro desconhecido ao salvar.");
    assert_eq!(err.detail().as_deref(), Some("oops"));

    let err = interpret_reply(400, r#"{"ok":false,"error":"Payload sem certidao","body":{"x":1}}"#)
        .expect_err("echoed");
    assert_eq!(err.banner_message(), "Payload sem certidao");
    assert_eq!(err.detail().as_deref(), Some(r#"{"x":1}"#));

    let err = interpret_reply(200, r#"{"ok":false,"message":"Planilha protegida"}"#)
        .expect_err("plain rejection");
    assert_eq!(err.detail(), None);
}

#[test]
fn success_banner_lingers_five_seconds_by_default() {
    assert_eq!(SUCCESS_BANNER_TTL, Duration::from_secs(5));
}

#[tokio::test]
async fn successful_submit_posts_envelope_and_clears_draft() {
    let mut relay = spawn_relay(StatusCode::OK, r#"{"ok":true,"row":12}"#, None).await;
    let controller = filled_controller(&relay.server_url);

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Saved), "{outcome:?}");

    let sent = relay.received.recv().await.expect("envelope");
    assert_eq!(sent.certidao.company, "BURN");
    assert_eq!(sent.certidao.tax_id, "11.636.336/0001-61");
    assert_eq!(sent.certidao.email, "fiscal@burn.com.br, juridico@burn.com.br");
    assert_eq!(sent.certidao.document_type, "Certidão Federal");
    assert_eq!(sent.certidao.status_note, "Em dia");

    assert!(controller.draft().is_empty());
    assert!(!controller.is_submitting());
    assert_eq!(controller.status(), SubmitStatus::success());
}

#[tokio::test]
async fn rejected_submit_surfaces_downstream_message_and_keeps_draft() {
    let relay = spawn_relay(
        StatusCode::OK,
        r#"{"ok":false,"message":"Planilha protegida"}"#,
        None,
    )
    .await;
    let controller = filled_controller(&relay.server_url);
    let before = controller.draft();

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Failed(SubmitError::Rejected { .. })));
    assert_eq!(
        controller.status(),
        SubmitStatus::Error {
            message: "Planilha protegida".into(),
            detail: None,
        }
    );
    assert_eq!(controller.draft(), before);
}

#[tokio::test]
async fn non_json_reply_surfaces_raw_body() {
    let relay = spawn_relay(StatusCode::BAD_GATEWAY, "oops", None).await;
    let controller = filled_controller(&relay.server_url);
    let before = controller.draft();

    controller.submit().await;
    let status = controller.status();
    assert!(status.is_error());
    assert!(matches!(status, SubmitStatus::Error { detail: Some(ref raw), .. } if raw == "oops"));
    assert_eq!(controller.draft(), before);
}

#[tokio::test]
async fn unreachable_relay_reports_generic_failure() {
    let server_url = unreachable_server_url().await;
    let controller = filled_controller(&server_url);
    let before = controller.draft();

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Failed(SubmitError::Transport(_))));
    assert_eq!(
        controller.status().message(),
        Some("Falha ao conectar com o servidor. Tente novamente.")
    );
    assert_eq!(controller.draft(), before);
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn submit_while_in_flight_is_a_no_op() {
    let release = Arc::new(Notify::new());
    let mut relay = spawn_relay(StatusCode::OK, r#"{"ok":true}"#, Some(release.clone())).await;
    let controller = filled_controller(&relay.server_url);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    relay.received.recv().await.expect("first request reached relay");
    assert!(controller.is_submitting());
    assert_eq!(controller.status(), SubmitStatus::Submitting);

    let second = controller.submit().await;
    assert!(matches!(second, SubmitOutcome::AlreadySubmitting));

    release.notify_one();
    let first = first.await.expect("join");
    assert!(matches!(first, SubmitOutcome::Saved));
    assert_eq!(relay.hits.load(Ordering::SeqCst), 1);
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn cancelled_submit_releases_in_flight_flag() {
    let release = Arc::new(Notify::new());
    let mut relay = spawn_relay(StatusCode::OK, r#"{"ok":true}"#, Some(release.clone())).await;
    let controller = filled_controller(&relay.server_url);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    relay.received.recv().await.expect("request reached relay");
    pending.abort();
    let _ = pending.await;

    assert!(!controller.is_submitting());
    assert_eq!(controller.status(), SubmitStatus::Idle);
    assert!(!controller.draft().is_empty());
    release.notify_one();
}

#[tokio::test]
async fn success_banner_expires_after_ttl() {
    let relay = spawn_relay(StatusCode::OK, json!({ "ok": true }).to_string(), None).await;
    let controller =
        filled_controller(&relay.server_url).with_success_ttl(Duration::from_millis(50));

    controller.submit().await;
    assert!(matches!(controller.status(), SubmitStatus::Success { .. }));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(controller.status(), SubmitStatus::Idle);
}

#[tokio::test]
async fn error_banner_persists_until_dismissed() {
    let relay = spawn_relay(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "ok": false, "error": "boom" }).to_string(),
        None,
    )
    .await;
    let controller = filled_controller(&relay.server_url).with_success_ttl(Duration::from_millis(10));

    controller.submit().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(controller.status().message(), Some("boom"));

    controller.dismiss_status();
    assert_eq!(controller.status(), SubmitStatus::Idle);
}
