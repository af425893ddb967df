//! Callback-script retrieval.
//!
//! The endpoint is asked for `?callback=<token>` and answers with a script
//! body `token(<json>);`. Running that script hands the payload to whichever
//! completion handle is registered under the token. Registrations live in a
//! [`CallbackRegistry`] owned by the strategy, and are dropped together with
//! the in-flight load on every way out of [`CallbackScript::attempt`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use url::Url;

use crate::error::RetrievalError;
use crate::models::{DataSource, Game};
use crate::retriever::RetrievalStrategy;

/// Fetches the body of a callback script.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    async fn load(&self, url: Url) -> Result<String, RetrievalError>;
}

pub struct HttpScriptLoader {
    client: Client,
}

impl HttpScriptLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScriptLoader for HttpScriptLoader {
    async fn load(&self, url: Url) -> Result<String, RetrievalError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Transport(format!(
                "callback script load returned {status}"
            )));
        }
        Ok(response.text().await?)
    }
}

#[derive(Default)]
pub struct CallbackRegistry {
    pending: Mutex<HashMap<String, oneshot::Sender<Value>>>,
}

impl CallbackRegistry {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<Value>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, token: &str) -> oneshot::Receiver<Value> {
        let (tx, rx) = oneshot::channel();
        self.entries().insert(token.to_string(), tx);
        rx
    }

    /// Fires the callback named `token`. Unknown names are ignored.
    pub fn invoke(&self, token: &str, payload: Value) -> bool {
        match self.entries().remove(token) {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    pub fn remove(&self, token: &str) {
        self.entries().remove(token);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits `name(payload);` into the callback name and its JSON argument.
pub fn parse_callback_body(body: &str) -> Result<(String, Value), RetrievalError> {
    let re = Regex::new(r"(?s)^\s*(?:/\*\*/\s*)?([A-Za-z_$][\w$]*)\s*\((.*)\)\s*;?\s*$")
        .map_err(|e| RetrievalError::Decode(e.to_string()))?;
    let caps = re
        .captures(body)
        .ok_or_else(|| RetrievalError::Decode("response is not a callback script".to_string()))?;

    let name = caps
        .get(1)
        .ok_or_else(|| RetrievalError::Decode("callback name missing".to_string()))?
        .as_str()
        .to_string();
    let raw = caps
        .get(2)
        .ok_or_else(|| RetrievalError::Decode("callback payload missing".to_string()))?
        .as_str();

    Ok((name, serde_json::from_str(raw)?))
}

/// Removes the registration and aborts the script load when dropped.
struct Pending<'a> {
    registry: &'a CallbackRegistry,
    token: String,
    script: AbortHandle,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.registry.remove(&self.token);
        self.script.abort();
    }
}

pub struct CallbackScript {
    loader: Arc<dyn ScriptLoader>,
    registry: Arc<CallbackRegistry>,
    endpoint: Url,
    timeout: Duration,
}

impl CallbackScript {
    pub fn new(loader: Arc<dyn ScriptLoader>, endpoint: Url, timeout: Duration) -> Self {
        Self {
            loader,
            registry: Arc::new(CallbackRegistry::default()),
            endpoint,
            timeout,
        }
    }

    pub fn over_http(client: Client, endpoint: Url, timeout: Duration) -> Self {
        Self::new(Arc::new(HttpScriptLoader::new(client)), endpoint, timeout)
    }

    #[cfg(test)]
    fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    fn script_url(&self, token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("callback", token);
        url
    }
}

async fn run_script(
    loader: Arc<dyn ScriptLoader>,
    registry: Arc<CallbackRegistry>,
    url: Url,
) -> Result<(), RetrievalError> {
    let body = loader.load(url).await?;
    let (name, payload) = parse_callback_body(&body)?;
    if !registry.invoke(&name, payload) {
        tracing::debug!(callback = %name, "script called an unregistered callback");
    }
    Ok(())
}

async fn wait_for_callback(
    callback: &mut oneshot::Receiver<Value>,
    script: &mut JoinHandle<Result<(), RetrievalError>>,
    script_done: &mut bool,
) -> Result<Value, RetrievalError> {
    loop {
        tokio::select! {
            payload = &mut *callback => {
                return payload.map_err(|_| {
                    RetrievalError::Transport("callback dropped before firing".to_string())
                });
            }
            joined = &mut *script, if !*script_done => {
                *script_done = true;
                match joined {
                    // Ran to completion; the callback either fired or never will.
                    Ok(Ok(())) => continue,
                    Ok(Err(err)) => return Err(err),
                    Err(err) => return Err(join_failure(err)),
                }
            }
        }
    }
}

fn join_failure(err: JoinError) -> RetrievalError {
    RetrievalError::Transport(format!("callback script task failed: {err}"))
}

#[async_trait]
impl RetrievalStrategy for CallbackScript {
    fn kind(&self) -> DataSource {
        DataSource::CallbackScript
    }

    async fn attempt(&self) -> Result<Vec<Game>, RetrievalError> {
        let token = format!("jsonpCallback_{}", uuid::Uuid::new_v4().simple());
        let mut callback = self.registry.register(&token);

        let mut script = tokio::spawn(run_script(
            Arc::clone(&self.loader),
            Arc::clone(&self.registry),
            self.script_url(&token),
        ));
        let pending = Pending {
            registry: self.registry.as_ref(),
            token,
            script: script.abort_handle(),
        };

        let mut script_done = false;
        let outcome = tokio::time::timeout(
            self.timeout,
            wait_for_callback(&mut callback, &mut script, &mut script_done),
        )
        .await;

        drop(pending);
        if !script_done {
            // Reap the aborted load so nothing outlives the attempt.
            let _ = script.await;
        }

        let payload = outcome.map_err(|_| RetrievalError::Timeout(self.timeout))??;
        Ok(serde_json::from_value::<Vec<Game>>(payload)?)
    }
}
