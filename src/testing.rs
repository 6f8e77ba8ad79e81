//! In-memory stand-ins for the browser seams, shared by the unit tests

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::background::IconSetter;
use crate::content::{LocalTask, TaskSpawner};
use crate::error::{Result, TranslatorError};
use crate::messages::{Ack, IconStatus, Message, RuntimeChannel, TabMessenger};
use crate::page::{PageDom, Scheduler, StatusOverlay, StatusTone};
use crate::provider::{HttpClient, TranslationProvider};
use crate::settings::{Settings, SettingsStore};

pub struct MemoryStore {
    record: RefCell<Option<Settings>>,
    fail: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            record: RefCell::new(None),
            fail: Cell::new(false),
            saves: Cell::new(0),
        }
    }

    pub fn with(settings: Settings) -> Self {
        let store = Self::new();
        *store.record.borrow_mut() = Some(settings);
        store
    }

    pub fn fail_access(&self) {
        self.fail.set(true);
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    pub fn record(&self) -> Option<Settings> {
        self.record.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> Result<Option<Settings>> {
        if self.fail.get() {
            return Err(TranslatorError::Storage("storage unavailable".to_string()));
        }
        Ok(self.record.borrow().clone())
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if self.fail.get() {
            return Err(TranslatorError::Storage("storage unavailable".to_string()));
        }
        self.saves.set(self.saves.get() + 1);
        *self.record.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

/// Records messages sent to tabs; delivery can be made to fail
pub struct RecordingTabs {
    sent: RefCell<Vec<(i32, Message)>>,
    active: Cell<Option<i32>>,
    fail: Cell<bool>,
}

impl RecordingTabs {
    pub fn new() -> Self {
        RecordingTabs {
            sent: RefCell::new(Vec::new()),
            active: Cell::new(Some(1)),
            fail: Cell::new(false),
        }
    }

    pub fn fail_delivery(&self) {
        self.fail.set(true);
    }

    pub fn set_active(&self, tab_id: Option<i32>) {
        self.active.set(tab_id);
    }

    pub fn sent(&self) -> Vec<(i32, Message)> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl TabMessenger for RecordingTabs {
    async fn send_to_tab(&self, tab_id: i32, message: &Message) -> Result<Ack> {
        if self.fail.get() {
            return Err(TranslatorError::Delivery(
                "Could not establish connection. Receiving end does not exist.".to_string(),
            ));
        }
        self.sent.borrow_mut().push((tab_id, message.clone()));
        Ok(Ack::ok())
    }

    async fn active_tab_id(&self) -> Result<Option<i32>> {
        Ok(self.active.get())
    }
}

pub struct RecordingIcons {
    set: RefCell<Vec<(i32, IconStatus)>>,
    fail: Cell<bool>,
}

impl RecordingIcons {
    pub fn new() -> Self {
        RecordingIcons {
            set: RefCell::new(Vec::new()),
            fail: Cell::new(false),
        }
    }

    pub fn fail_updates(&self) {
        self.fail.set(true);
    }

    pub fn set(&self) -> Vec<(i32, IconStatus)> {
        self.set.borrow().clone()
    }
}

#[async_trait(?Send)]
impl IconSetter for RecordingIcons {
    async fn set_icon(&self, tab_id: i32, status: IconStatus) -> Result<()> {
        if self.fail.get() {
            return Err(TranslatorError::Delivery("No tab with id".to_string()));
        }
        self.set.borrow_mut().push((tab_id, status));
        Ok(())
    }
}

pub struct RecordingRuntime {
    sent: RefCell<Vec<Message>>,
    fail: Cell<bool>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        RecordingRuntime {
            sent: RefCell::new(Vec::new()),
            fail: Cell::new(false),
        }
    }

    pub fn fail_delivery(&self) {
        self.fail.set(true);
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl RuntimeChannel for RecordingRuntime {
    async fn send(&self, message: &Message) -> Result<Ack> {
        self.sent.borrow_mut().push(message.clone());
        if self.fail.get() {
            return Err(TranslatorError::Delivery("Extension context invalidated.".to_string()));
        }
        Ok(Ack::ok())
    }
}

struct FakeNode {
    parent: Option<String>,
    value: String,
}

struct FakeDocument {
    nodes: Vec<FakeNode>,
    language: Option<String>,
    has_body: bool,
    fail_writes: bool,
    reloads: usize,
}

/// A flat document of text nodes addressed by index
#[derive(Clone)]
pub struct FakePage {
    doc: Rc<RefCell<FakeDocument>>,
}

impl FakePage {
    pub fn new(nodes: Vec<(Option<&str>, &str)>) -> Self {
        let nodes = nodes
            .into_iter()
            .map(|(parent, value)| FakeNode {
                parent: parent.map(str::to_string),
                value: value.to_string(),
            })
            .collect();
        FakePage {
            doc: Rc::new(RefCell::new(FakeDocument {
                nodes,
                language: None,
                has_body: true,
                fail_writes: false,
                reloads: 0,
            })),
        }
    }

    /// Every text sits in a paragraph
    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|text| (Some("P"), *text)).collect())
    }

    pub fn with_language(self, lang: &str) -> Self {
        self.doc.borrow_mut().language = Some(lang.to_string());
        self
    }

    pub fn fail_writes(&self) {
        self.doc.borrow_mut().fail_writes = true;
    }

    pub fn remove_body(&self) {
        self.doc.borrow_mut().has_body = false;
    }

    pub fn values(&self) -> Vec<String> {
        self.doc.borrow().nodes.iter().map(|n| n.value.clone()).collect()
    }

    pub fn reloads(&self) -> usize {
        self.doc.borrow().reloads
    }
}

impl PageDom for FakePage {
    type Node = usize;

    fn text_nodes(&self) -> Result<Vec<usize>> {
        let doc = self.doc.borrow();
        if !doc.has_body {
            return Err(TranslatorError::Page("document has no body".to_string()));
        }
        Ok((0..doc.nodes.len()).collect())
    }

    fn parent_tag(&self, node: &usize) -> Option<String> {
        self.doc.borrow().nodes.get(*node).and_then(|n| n.parent.clone())
    }

    fn node_value(&self, node: &usize) -> Option<String> {
        self.doc.borrow().nodes.get(*node).map(|n| n.value.clone())
    }

    fn set_node_value(&self, node: &usize, value: &str) -> Result<()> {
        let mut doc = self.doc.borrow_mut();
        if doc.fail_writes {
            return Err(TranslatorError::Page("node detached".to_string()));
        }
        match doc.nodes.get_mut(*node) {
            Some(n) => {
                n.value = value.to_string();
                Ok(())
            }
            None => Err(TranslatorError::Page(format!("no node {}", node))),
        }
    }

    fn declared_language(&self) -> Option<String> {
        self.doc.borrow().language.clone()
    }

    fn reload(&self) -> Result<()> {
        self.doc.borrow_mut().reloads += 1;
        Ok(())
    }
}

pub struct RecordingOverlay {
    messages: RefCell<Vec<(String, StatusTone)>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        RecordingOverlay {
            messages: RefCell::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<(String, StatusTone)> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<(String, StatusTone)> {
        self.messages.borrow().last().cloned()
    }
}

impl StatusOverlay for RecordingOverlay {
    fn show(&self, message: &str, tone: StatusTone) {
        self.messages.borrow_mut().push((message.to_string(), tone));
    }
}

/// Future that is pending exactly once, so other futures get polled
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Scheduler that yields to the executor instead of sleeping
pub struct YieldingScheduler;

#[async_trait(?Send)]
impl Scheduler for YieldingScheduler {
    async fn pause(&self, _millis: u32) {
        YieldOnce(false).await;
    }
}

type Script = Box<dyn Fn(&str) -> Result<String>>;

/// Provider whose answers come from a closure; records every call
pub struct ScriptedProvider {
    name: &'static str,
    script: Script,
    calls: Rc<RefCell<Vec<(String, String, String)>>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, script: impl Fn(&str) -> Result<String> + 'static) -> Self {
        ScriptedProvider {
            name,
            script: Box::new(script),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Rc<RefCell<Vec<(String, String, String)>>> {
        self.calls.clone()
    }
}

#[async_trait(?Send)]
impl TranslationProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> Result<String> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), from_lang.to_string(), to_lang.to_string()));
        (self.script)(text)
    }
}

/// HTTP client answering from a closure keyed on the request URL
pub struct ScriptedHttp {
    script: Box<dyn Fn(&Url) -> Result<Value>>,
    requests: RefCell<Vec<Url>>,
}

impl ScriptedHttp {
    pub fn new(script: impl Fn(&Url) -> Result<Value> + 'static) -> Self {
        ScriptedHttp {
            script: Box::new(script),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl HttpClient for ScriptedHttp {
    async fn get_json(&self, url: &Url) -> Result<Value> {
        self.requests.borrow_mut().push(url.clone());
        (self.script)(url)
    }
}

/// Collects spawned tasks so a test decides when they run
pub struct QueuedSpawner {
    tasks: RefCell<Vec<LocalTask>>,
}

impl QueuedSpawner {
    pub fn new() -> Self {
        QueuedSpawner {
            tasks: RefCell::new(Vec::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn run_all(&self) {
        let tasks: Vec<LocalTask> = self.tasks.borrow_mut().drain(..).collect();
        for task in tasks {
            futures::executor::block_on(task);
        }
    }
}

impl TaskSpawner for QueuedSpawner {
    fn spawn(&self, task: LocalTask) {
        self.tasks.borrow_mut().push(task);
    }
}
