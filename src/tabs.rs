/// Shapes of the tab objects handed to us by the extension runtime
use serde::Deserialize;

/// The subset of a chrome `Tab` we read
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TabInfo {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
}

/// `changeInfo` argument of `tabs.onUpdated`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TabChangeInfo {
    #[serde(default)]
    pub status: Option<String>,
}

impl TabChangeInfo {
    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete")
    }
}

/// `sender` argument of `runtime.onMessage`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageSender {
    #[serde(default)]
    pub tab: Option<TabInfo>,
}

impl MessageSender {
    pub fn tab_id(&self) -> Option<i32> {
        self.tab.as_ref().and_then(|tab| tab.id)
    }
}
