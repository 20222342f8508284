//! Software authenticator and router helpers shared by the integration tests.
//!
//! `SoftAuthenticator` holds one P-256 key pair and produces real WebAuthn
//! responses: "none" attestations for registration and ES256-signed
//! assertions for authentication.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use base64::prelude::*;
use ciborium::value::Value as Cbor;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use passkey_rp_server::{build_router, config::Config, state::AppState};
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tower::ServiceExt;

pub const ORIGIN: &str = "http://localhost:8080";

const FLAG_UP: u8 = 0x01;
const FLAG_UV: u8 = 0x04;
const FLAG_AT: u8 = 0x40;

pub struct SoftAuthenticator {
    signing_key: SigningKey,
    pub credential_id: Vec<u8>,
    pub counter: u32,
}

impl SoftAuthenticator {
    pub fn new() -> Self {
        let mut credential_id = vec![0u8; 32];
        OsRng.fill_bytes(&mut credential_id);
        Self {
            signing_key: SigningKey::random(&mut OsRng),
            credential_id,
            counter: 0,
        }
    }

    pub fn credential_id_b64(&self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(&self.credential_id)
    }

    /// Answer `navigator.credentials.create()` for the given creation options
    pub fn register(&self, options: &Value, origin: &str) -> Value {
        let public_key = &options["publicKey"];
        let challenge = public_key["challenge"].as_str().expect("challenge");
        let rp_id = public_key["rp"]["id"].as_str().expect("rp.id");
        self.register_with_challenge(rp_id, challenge, origin)
    }

    pub fn register_with_challenge(&self, rp_id: &str, challenge: &str, origin: &str) -> Value {
        let client_data = json!({
            "type": "webauthn.create",
            "challenge": challenge,
            "origin": origin,
            "crossOrigin": false
        })
        .to_string();

        let mut auth_data = Vec::new();
        auth_data.extend_from_slice(&Sha256::digest(rp_id.as_bytes()));
        auth_data.push(FLAG_UP | FLAG_UV | FLAG_AT);
        auth_data.extend_from_slice(&0u32.to_be_bytes());
        auth_data.extend_from_slice(&[0u8; 16]); // AAGUID
        auth_data.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
        auth_data.extend_from_slice(&self.credential_id);
        auth_data.extend_from_slice(&self.cose_key());

        let attestation = Cbor::Map(vec![
            (Cbor::Text("fmt".into()), Cbor::Text("none".into())),
            (Cbor::Text("attStmt".into()), Cbor::Map(vec![])),
            (Cbor::Text("authData".into()), Cbor::Bytes(auth_data)),
        ]);
        let mut attestation_object = Vec::new();
        ciborium::into_writer(&attestation, &mut attestation_object).expect("CBOR encoding");

        json!({
            "id": self.credential_id_b64(),
            "rawId": self.credential_id_b64(),
            "response": {
                "attestationObject": BASE64_URL_SAFE_NO_PAD.encode(&attestation_object),
                "clientDataJSON": BASE64_URL_SAFE_NO_PAD.encode(client_data.as_bytes()),
                "transports": ["internal"]
            },
            "extensions": {},
            "type": "public-key"
        })
    }

    /// Answer `navigator.credentials.get()`, advancing the counter by one
    pub fn assert(&mut self, options: &Value, origin: &str) -> Value {
        let challenge = options["publicKey"]["challenge"]
            .as_str()
            .expect("challenge")
            .to_string();
        self.assert_with_challenge(options, &challenge, origin)
    }

    /// Like `assert`, but signs over an arbitrary challenge
    pub fn assert_with_challenge(&mut self, options: &Value, challenge: &str, origin: &str) -> Value {
        self.counter += 1;
        let counter = self.counter;
        self.assert_with_counter(options, challenge, origin, counter)
    }

    pub fn assert_with_counter(
        &self,
        options: &Value,
        challenge: &str,
        origin: &str,
        counter: u32,
    ) -> Value {
        self.assert_with_user_handle(options, challenge, origin, counter, None)
    }

    /// Answer a discoverable request, naming `user_handle` as the key's owner
    pub fn assert_as(&mut self, options: &Value, origin: &str, user_handle: &[u8]) -> Value {
        let challenge = options["publicKey"]["challenge"]
            .as_str()
            .expect("challenge")
            .to_string();
        self.counter += 1;
        self.assert_with_user_handle(options, &challenge, origin, self.counter, Some(user_handle))
    }

    pub fn assert_with_user_handle(
        &self,
        options: &Value,
        challenge: &str,
        origin: &str,
        counter: u32,
        user_handle: Option<&[u8]>,
    ) -> Value {
        let rp_id = options["publicKey"]["rpId"].as_str().expect("rpId");
        let client_data = json!({
            "type": "webauthn.get",
            "challenge": challenge,
            "origin": origin,
            "crossOrigin": false
        })
        .to_string();

        let mut auth_data = Vec::new();
        auth_data.extend_from_slice(&Sha256::digest(rp_id.as_bytes()));
        auth_data.push(FLAG_UP | FLAG_UV);
        auth_data.extend_from_slice(&counter.to_be_bytes());

        let mut signed = auth_data.clone();
        signed.extend_from_slice(&Sha256::digest(client_data.as_bytes()));
        let signature: Signature = self.signing_key.sign(&signed);

        json!({
            "id": self.credential_id_b64(),
            "rawId": self.credential_id_b64(),
            "response": {
                "authenticatorData": BASE64_URL_SAFE_NO_PAD.encode(&auth_data),
                "clientDataJSON": BASE64_URL_SAFE_NO_PAD.encode(client_data.as_bytes()),
                "signature": BASE64_URL_SAFE_NO_PAD.encode(signature.to_der().as_bytes()),
                "userHandle": user_handle.map(|handle| BASE64_URL_SAFE_NO_PAD.encode(handle))
            },
            "extensions": {},
            "type": "public-key"
        })
    }

    /// COSE_Key map for the public key (kty=EC2, alg=ES256, crv=P-256)
    fn cose_key(&self) -> Vec<u8> {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let map = Cbor::Map(vec![
            (Cbor::Integer(1i64.into()), Cbor::Integer(2i64.into())),
            (Cbor::Integer(3i64.into()), Cbor::Integer((-7i64).into())),
            (Cbor::Integer((-1i64).into()), Cbor::Integer(1i64.into())),
            (Cbor::Integer((-2i64).into()), Cbor::Bytes(point.x().expect("x").to_vec())),
            (Cbor::Integer((-3i64).into()), Cbor::Bytes(point.y().expect("y").to_vec())),
        ]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).expect("COSE key encoding");
        buf
    }
}

/// A router over fresh stores, plus the state so tests can inspect it
pub fn test_app() -> (Router, AppState) {
    let config = Config::default();
    let state = AppState::new(&config).expect("default config is valid");
    (build_router(state.clone(), &config), state)
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8(body.to_vec()).expect("utf-8"))
}

pub async fn begin_registration(app: &Router, username: &str) -> Value {
    let (status, body) = post_json(
        app,
        "/api/passkey/registerStart",
        &json!({ "username": username }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registerStart failed: {}", body);
    serde_json::from_str(&body).expect("creation options JSON")
}

pub async fn begin_login(app: &Router, username: &str) -> Value {
    let (status, body) = post_json(
        app,
        "/api/passkey/loginStart",
        &json!({ "username": username }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "loginStart failed: {}", body);
    serde_json::from_str(&body).expect("request options JSON")
}

pub async fn finish_registration(app: &Router, username: &str, response: &Value) -> (StatusCode, String) {
    post_json(
        app,
        &format!("/api/passkey/registerFinish?username={}", username),
        response,
    )
    .await
}

pub async fn finish_login(app: &Router, username: &str, response: &Value) -> (StatusCode, String) {
    post_json(
        app,
        &format!("/api/passkey/loginFinish?username={}", username),
        response,
    )
    .await
}

/// Register a fresh soft authenticator for `username`
pub async fn register(app: &Router, username: &str) -> SoftAuthenticator {
    let authenticator = SoftAuthenticator::new();
    let options = begin_registration(app, username).await;
    let (status, body) = finish_registration(app, username, &authenticator.register(&options, ORIGIN)).await;
    assert_eq!(status, StatusCode::OK, "registerFinish failed: {}", body);
    authenticator
}
