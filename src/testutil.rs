//! Shared fixtures for unit tests.

use crate::auth::AppIdentity;
use crate::dispatch::{JobDispatcher, RunHandle, RunTaskRequest};
use crate::error::DispatchError;
use crate::security::SecureString;
use async_trait::async_trait;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::{Mutex, OnceLock};

pub struct TestKeys {
    pub private_pem: String,
    pub public_pem: String,
}

/// One RSA key pair per test binary
pub fn test_keys() -> &'static TestKeys {
    static KEYS: OnceLock<TestKeys> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("generate rsa key");
        let public = RsaPublicKey::from(&private);

        TestKeys {
            private_pem: private
                .to_pkcs1_pem(LineEnding::LF)
                .expect("encode private key")
                .to_string(),
            public_pem: public
                .to_public_key_pem(LineEnding::LF)
                .expect("encode public key"),
        }
    })
}

pub fn test_identity(app_id: &str) -> AppIdentity {
    AppIdentity::new(app_id, SecureString::from(test_keys().private_pem.as_str()))
}

/// Records every request and hands out sequential run ids
#[derive(Default)]
pub struct RecordingDispatcher {
    requests: Mutex<Vec<RunTaskRequest>>,
}

impl RecordingDispatcher {
    pub fn requests(&self) -> Vec<RunTaskRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobDispatcher for RecordingDispatcher {
    async fn run_task(&self, request: RunTaskRequest) -> Result<RunHandle, DispatchError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        Ok(RunHandle {
            run_id: format!("recorded-{}", requests.len()),
        })
    }
}

/// Always rejects, counting attempts
#[derive(Default)]
pub struct FailingDispatcher {
    attempts: Mutex<usize>,
}

impl FailingDispatcher {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl JobDispatcher for FailingDispatcher {
    async fn run_task(&self, _request: RunTaskRequest) -> Result<RunHandle, DispatchError> {
        *self.attempts.lock().unwrap() += 1;
        Err(DispatchError::Rejected {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })
    }
}
