// Shared test doubles: a scripted `RemoteApi` backend and a scripted
// `Prompt`. Both are single-threaded (the crate runs on a current-thread
// runtime) so plain interior mutability is enough.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use chili_previews::api::{ItemDefinition, KeyOutcome, RemoteApi, TreeItem};
use chili_previews::ui::Prompt;

pub fn folder(id: &str, name: &str) -> TreeItem {
    TreeItem {
        id: id.to_string(),
        name: name.to_string(),
        is_folder: "true".to_string(),
    }
}

pub fn document(id: &str, name: &str) -> TreeItem {
    TreeItem {
        id: id.to_string(),
        name: name.to_string(),
        is_folder: "false".to_string(),
    }
}

/// One canned answer for an API-key issuance attempt.
pub enum KeyAttempt {
    Issued(String),
    Rejected(String),
    Transport,
}

/// Scripted backend. Call names and settlement order are recorded in `calls`
/// so tests can assert sequencing across operations.
#[derive(Default)]
pub struct MockApi {
    pub items: Vec<TreeItem>,
    pub definitions: HashMap<String, ItemDefinition>,
    pub copy_ids: RefCell<VecDeque<String>>,
    pub key_attempts: RefCell<VecDeque<KeyAttempt>>,
    /// Per-page artificial download latency in milliseconds.
    pub latencies: HashMap<usize, u64>,
    /// Pages whose download should fail.
    pub fail_pages: HashSet<usize>,
    pub calls: RefCell<Vec<String>>,
    pub completion_order: RefCell<Vec<usize>>,
    in_flight: Cell<usize>,
    pub max_in_flight: Cell<usize>,
}

impl MockApi {
    pub fn with_items(items: Vec<TreeItem>) -> MockApi {
        MockApi {
            items,
            ..MockApi::default()
        }
    }

    pub fn define(&mut self, id: &str, name: &str, page_count: &str) {
        self.definitions.insert(
            id.to_string(),
            ItemDefinition {
                name: name.to_string(),
                page_count: page_count.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

/// Pull the `page=<n>` query value out of a download URL.
pub fn page_of(url: &str) -> usize {
    url.split("page=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .and_then(|n| n.parse().ok())
        .expect("download URL carries a page index")
}

fn id_of(url: &str) -> String {
    url.split("id=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .expect("download URL carries a document id")
        .to_string()
}

#[async_trait(?Send)]
impl RemoteApi for MockApi {
    async fn server_date(&self) -> Result<String> {
        self.log("server_date".into());
        Ok("2026-08-29".into())
    }

    async fn generate_api_key(
        &self,
        environment: &str,
        username: &str,
        _password: &str,
    ) -> Result<KeyOutcome> {
        self.log(format!("generate_api_key:{}:{}", environment, username));
        match self.key_attempts.borrow_mut().pop_front() {
            Some(KeyAttempt::Issued(key)) => Ok(KeyOutcome::Issued(key)),
            Some(KeyAttempt::Rejected(message)) => Ok(KeyOutcome::Rejected(message)),
            Some(KeyAttempt::Transport) => Err(anyhow::anyhow!("connection reset")),
            None => panic!("unexpected generate_api_key call"),
        }
    }

    async fn set_auto_preview_generation(&self, _api_key: &str, enabled: bool) -> Result<()> {
        self.log(format!("auto_preview:{}", enabled));
        Ok(())
    }

    async fn tree_level(&self, _api_key: &str, parent_folder: &str) -> Result<Vec<TreeItem>> {
        self.log(format!("tree_level:{}", parent_folder));
        Ok(self.items.clone())
    }

    async fn copy_item(
        &self,
        _api_key: &str,
        source_id: &str,
        _new_name: &str,
        folder_path: &str,
    ) -> Result<String> {
        self.log(format!("copy:{}:{}", source_id, folder_path));
        Ok(self
            .copy_ids
            .borrow_mut()
            .pop_front()
            .expect("no canned copy id left"))
    }

    async fn item_definition(&self, _api_key: &str, id: &str) -> Result<ItemDefinition> {
        self.log(format!("definition:{}", id));
        self.definitions
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no definition for {}", id))
    }

    async fn download_to_file(&self, url: &str, dest: &Path) -> Result<()> {
        let page = page_of(url);
        self.log(format!("download:{}:{}", id_of(url), page));

        self.in_flight.set(self.in_flight.get() + 1);
        if self.in_flight.get() > self.max_in_flight.get() {
            self.max_in_flight.set(self.in_flight.get());
        }

        let delay = self.latencies.get(&page).copied().unwrap_or(1);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.in_flight.set(self.in_flight.get() - 1);
        self.completion_order.borrow_mut().push(page);
        self.log(format!("settled:{}:{}", id_of(url), page));

        if self.fail_pages.contains(&page) {
            anyhow::bail!("simulated failure for page {}", page);
        }
        std::fs::write(dest, b"png")?;
        Ok(())
    }
}

/// Prompt fed from canned answer queues. Popping an empty queue panics,
/// which is exactly what a test wants when a flow prompts more than scripted.
#[derive(Default)]
pub struct ScriptedPrompt {
    pub inputs: RefCell<VecDeque<String>>,
    pub passwords: RefCell<VecDeque<String>>,
    pub confirms: RefCell<VecDeque<bool>>,
    pub choices: RefCell<VecDeque<usize>>,
}

impl ScriptedPrompt {
    pub fn with_inputs(inputs: &[&str]) -> ScriptedPrompt {
        let prompt = ScriptedPrompt::default();
        for input in inputs {
            prompt.inputs.borrow_mut().push_back(input.to_string());
        }
        prompt
    }

    pub fn push_password(&self, password: &str) {
        self.passwords.borrow_mut().push_back(password.to_string());
    }
}

impl Prompt for ScriptedPrompt {
    fn input(&self, message: &str) -> Result<String> {
        self.inputs
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted input for {:?}", message))
    }

    fn password(&self, message: &str) -> Result<String> {
        self.passwords
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted password for {:?}", message))
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        self.confirms
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted confirm for {:?}", message))
    }

    fn choose(&self, message: &str, _items: &[String]) -> Result<usize> {
        self.choices
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted choice for {:?}", message))
    }
}
