/// Content-script side of the message bus

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use async_trait::async_trait;

use crate::logging::log_swallowed;
use crate::messages::{Ack, Message, MessageHandler, RuntimeChannel};
use crate::page::{PageDom, PageTranslator};

pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs a future without the caller awaiting it
pub trait TaskSpawner {
    fn spawn(&self, task: LocalTask);
}

pub struct ContentAgent<P: PageDom + 'static> {
    translator: Rc<PageTranslator<P>>,
    runtime: Rc<dyn RuntimeChannel>,
    spawner: Rc<dyn TaskSpawner>,
}

impl<P: PageDom + 'static> ContentAgent<P> {
    pub fn new(
        translator: Rc<PageTranslator<P>>,
        runtime: Rc<dyn RuntimeChannel>,
        spawner: Rc<dyn TaskSpawner>,
    ) -> Self {
        ContentAgent {
            translator,
            runtime,
            spawner,
        }
    }

    /// Start a session without waiting for it, so the sender gets its ack now
    fn start_translation(&self, from_lang: String, to_lang: String) {
        let translator = self.translator.clone();
        self.spawner.spawn(Box::pin(async move {
            translator.translate(&from_lang, &to_lang).await;
        }));
    }

    /// Page `load` handler: refresh the icon and ask the background about auto-translate
    pub async fn on_page_loaded(&self, url: &str) {
        self.translator.detect_page_language().await;

        let message = Message::CheckAutoTranslate {
            url: url.to_string(),
        };
        if let Err(e) = self.runtime.send(&message).await {
            log_swallowed("content.check_auto_translate", &e);
        }
    }
}

#[async_trait(?Send)]
impl<P: PageDom + 'static> MessageHandler for ContentAgent<P> {
    fn accepts(&self, message: &Message) -> bool {
        matches!(
            message,
            Message::Translate { .. } | Message::AutoTranslate { .. } | Message::ResetTranslation
        )
    }

    async fn handle(&self, message: Message, _sender_tab: Option<i32>) -> Option<Ack> {
        log::debug!("content received {}", message.kind());
        match message {
            Message::Translate { from_lang, to_lang }
            | Message::AutoTranslate { from_lang, to_lang } => {
                self.start_translation(from_lang, to_lang);
                Some(Ack::ok())
            }
            Message::ResetTranslation => {
                self.translator.reset_translation();
                Some(Ack::ok())
            }
            _ => None,
        }
    }
}
