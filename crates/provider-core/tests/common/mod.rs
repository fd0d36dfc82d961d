//! In-memory transport and Ethereum app used by the integration tests.

#![allow(dead_code, unreachable_pub)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::keccak256;
use async_trait::async_trait;
use hw_evm_provider_core::{
    Address, AddressResponse, DeviceSignature, Error, EthereumApp, HardwareProvider,
    ProviderOptions, Result, Transport,
};

pub const R_HEX: &str = "1111111111111111111111111111111111111111111111111111111111111111";
pub const S_HEX: &str = "2222222222222222222222222222222222222222222222222222222222222222";

/// Deterministic, checksummed address for a derivation path.
pub fn address_for(path: &str) -> String {
    let hash = keccak256(path.as_bytes());
    let bytes: [u8; 20] = hash[12..].try_into().unwrap();
    Address::new(bytes).to_checksum_hex()
}

#[derive(Debug, Default)]
pub struct TransportState {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub fail_open: AtomicBool,
    pub fail_close: AtomicBool,
}

impl TransportState {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct MockSession {
    pub id: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    pub state: Arc<TransportState>,
}

#[async_trait]
impl Transport for MockTransport {
    type Session = MockSession;

    async fn open(&self) -> Result<MockSession> {
        if self.state.fail_open.load(Ordering::SeqCst) {
            return Err(Error::DeviceNotFound);
        }
        let id = self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession { id })
    }

    async fn close(&self, _session: MockSession) -> Result<()> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(Error::DeviceDisconnected);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct AppState {
    /// `(path, confirm, chain_code)` of every address request.
    pub address_requests: Mutex<Vec<(String, bool, bool)>>,
    /// `(path, message_hex)` of every personal-sign request.
    pub message_requests: Mutex<Vec<(String, String)>>,
    /// `(path, raw_tx_hex)` of every transaction request.
    pub tx_requests: Mutex<Vec<(String, String)>>,
    /// Address overrides by path.
    pub overrides: Mutex<HashMap<String, String>>,
    /// Path whose address request fails.
    pub fail_path: Mutex<Option<String>>,
    pub message_v: AtomicU64,
    pub tx_v: AtomicU64,
    pub reject_signing: AtomicBool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            address_requests: Mutex::default(),
            message_requests: Mutex::default(),
            tx_requests: Mutex::default(),
            overrides: Mutex::default(),
            fail_path: Mutex::default(),
            message_v: AtomicU64::new(27),
            tx_v: AtomicU64::new(37),
            reject_signing: AtomicBool::new(false),
        }
    }
}

impl AppState {
    pub fn requested_paths(&self) -> Vec<String> {
        self.address_requests
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _, _)| path.clone())
            .collect()
    }

    pub fn signing_calls(&self) -> usize {
        self.message_requests.lock().unwrap().len() + self.tx_requests.lock().unwrap().len()
    }

    pub fn set_override(&self, path: &str, address: &str) {
        self.overrides
            .lock()
            .unwrap()
            .insert(path.to_string(), address.to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockApp {
    pub state: Arc<AppState>,
}

#[async_trait]
impl EthereumApp<MockSession> for MockApp {
    async fn get_address(
        &self,
        _session: &mut MockSession,
        path: &str,
        confirm: bool,
        chain_code: bool,
    ) -> Result<AddressResponse> {
        self.state
            .address_requests
            .lock()
            .unwrap()
            .push((path.to_string(), confirm, chain_code));

        if self.state.fail_path.lock().unwrap().as_deref() == Some(path) {
            return Err(Error::Device("user rejected".to_string()));
        }

        let address = self
            .state
            .overrides
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| address_for(path));
        Ok(AddressResponse::new(address))
    }

    async fn sign_personal_message(
        &self,
        _session: &mut MockSession,
        path: &str,
        message_hex: &str,
    ) -> Result<DeviceSignature> {
        self.state
            .message_requests
            .lock()
            .unwrap()
            .push((path.to_string(), message_hex.to_string()));

        if self.state.reject_signing.load(Ordering::SeqCst) {
            return Err(Error::Device("user rejected".to_string()));
        }
        let v = self.state.message_v.load(Ordering::SeqCst);
        Ok(DeviceSignature::new(v, R_HEX, S_HEX))
    }

    async fn sign_transaction(
        &self,
        _session: &mut MockSession,
        path: &str,
        raw_tx_hex: &str,
    ) -> Result<DeviceSignature> {
        self.state
            .tx_requests
            .lock()
            .unwrap()
            .push((path.to_string(), raw_tx_hex.to_string()));

        if self.state.reject_signing.load(Ordering::SeqCst) {
            return Err(Error::Device("user rejected".to_string()));
        }
        let v = self.state.tx_v.load(Ordering::SeqCst);
        Ok(DeviceSignature::new(v, R_HEX, S_HEX))
    }
}

pub struct Harness {
    pub provider: HardwareProvider<MockTransport, MockApp>,
    pub transport: Arc<TransportState>,
    pub app: Arc<AppState>,
}

pub fn harness(options: ProviderOptions) -> Harness {
    let transport = MockTransport::default();
    let app = MockApp::default();
    let transport_state = Arc::clone(&transport.state);
    let app_state = Arc::clone(&app.state);
    let provider = HardwareProvider::new(transport, app, options).unwrap();
    Harness {
        provider,
        transport: transport_state,
        app: app_state,
    }
}
