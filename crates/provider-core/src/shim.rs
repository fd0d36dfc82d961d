//! Callback-style boundary for JSON-RPC middleware.
//!
//! Wallet middleware (the "hooked wallet" pattern) does not await futures; it
//! hands every request a completion callback and expects it to be called
//! exactly once with either an error or a result. [`WalletHooks`] is that
//! contract, and [`CallbackProvider`] implements it by spawning the async
//! [`HardwareProvider`] operation on a tokio runtime and forwarding its
//! [`Result`] to the callback.
//!
//! No retries and no queuing happen here: each call is an independent device
//! session, and concurrent calls are not serialized.
//!
//! # Example
//!
//! ```ignore
//! use hw_evm_provider_core::{CallbackProvider, WalletHooks};
//!
//! let hooks = CallbackProvider::new(provider, tokio::runtime::Handle::current());
//!
//! hooks.get_accounts(Box::new(|result| match result {
//!     Ok(addresses) => println!("accounts: {addresses:?}"),
//!     Err(err) => eprintln!("enumeration failed: {err}"),
//! }));
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::device::{EthereumApp, Transport};
use crate::error::Result;
use crate::params::{MessageParams, TransactionParams};
use crate::provider::HardwareProvider;

/// A completion callback, invoked exactly once.
pub type Callback<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// The wallet hooks consumed by the RPC middleware.
pub trait WalletHooks: Send + Sync {
    /// Lists the device accounts, in enumeration order.
    fn get_accounts(&self, callback: Callback<Vec<String>>);

    /// Signs a personal message; the result is the 65-byte signature as hex.
    fn sign_personal_message(&self, params: MessageParams, callback: Callback<String>);

    /// Signs a transaction; the result is the signed transaction as hex.
    fn sign_transaction(&self, params: TransactionParams, callback: Callback<String>);
}

/// [`WalletHooks`] backed by a [`HardwareProvider`].
pub struct CallbackProvider<T, A> {
    provider: Arc<HardwareProvider<T, A>>,
    runtime: Handle,
}

impl<T, A> fmt::Debug for CallbackProvider<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackProvider")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl<T, A> CallbackProvider<T, A>
where
    T: Transport + 'static,
    T::Session: 'static,
    A: EthereumApp<T::Session> + 'static,
{
    /// Wraps `provider`, running its operations on `runtime`.
    #[must_use]
    pub fn new(provider: HardwareProvider<T, A>, runtime: Handle) -> Self {
        Self::from_shared(Arc::new(provider), runtime)
    }

    /// Wraps a provider that is also used directly elsewhere.
    #[must_use]
    pub const fn from_shared(provider: Arc<HardwareProvider<T, A>>, runtime: Handle) -> Self {
        Self { provider, runtime }
    }

    /// Returns the wrapped provider.
    #[must_use]
    pub const fn provider(&self) -> &Arc<HardwareProvider<T, A>> {
        &self.provider
    }
}

impl<T, A> WalletHooks for CallbackProvider<T, A>
where
    T: Transport + 'static,
    T::Session: 'static,
    A: EthereumApp<T::Session> + 'static,
{
    fn get_accounts(&self, callback: Callback<Vec<String>>) {
        let provider = Arc::clone(&self.provider);
        self.runtime.spawn(async move {
            callback(provider.get_accounts().await);
        });
    }

    fn sign_personal_message(&self, params: MessageParams, callback: Callback<String>) {
        let provider = Arc::clone(&self.provider);
        self.runtime.spawn(async move {
            callback(
                provider
                    .sign_personal_message(&params.from, &params.data)
                    .await,
            );
        });
    }

    fn sign_transaction(&self, params: TransactionParams, callback: Callback<String>) {
        let provider = Arc::clone(&self.provider);
        self.runtime.spawn(async move {
            callback(provider.sign_transaction(&params).await);
        });
    }
}
