//! Identity of the routed views.
//!
//! Each view reports its own [`ViewKind`]; the shell derives the active tab
//! and the page title from that tag.

use serde::{Deserialize, Serialize};

use crate::cores::CoreKind;

/// The tabs of the viewer, in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    Info,
    Esp8266,
    Esp32,
    Esp32Partitions,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Info,
        ViewKind::Esp8266,
        ViewKind::Esp32,
        ViewKind::Esp32Partitions,
    ];

    /// Tab label.
    pub fn link(&self) -> &'static str {
        match self {
            ViewKind::Info => "Info",
            ViewKind::Esp8266 => "ESP8266",
            ViewKind::Esp32 => "ESP32",
            ViewKind::Esp32Partitions => "ESP32-Partitions",
        }
    }

    /// Page title shown while the view is active.
    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Info => "ESP Board Overview",
            ViewKind::Esp8266 => "ESP8266 Boards Arduino IDE",
            ViewKind::Esp32 => "ESP32 Boards Arduino IDE",
            ViewKind::Esp32Partitions => "ESP32 Partition Schemes",
        }
    }

    /// The view for a tab label.
    pub fn from_link(link: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.link() == link)
    }

    /// The board table view of a core.
    pub fn for_core(core: CoreKind) -> Self {
        match core {
            CoreKind::Esp8266 => ViewKind::Esp8266,
            CoreKind::Esp32 => ViewKind::Esp32,
        }
    }
}

/// Tab descriptor sent to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewDescriptor {
    pub kind: ViewKind,
    pub link: &'static str,
    pub title: &'static str,
}

impl From<ViewKind> for ViewDescriptor {
    fn from(kind: ViewKind) -> Self {
        Self {
            kind,
            link: kind.link(),
            title: kind.title(),
        }
    }
}

/// All tabs in display order.
pub fn view_descriptors() -> Vec<ViewDescriptor> {
    ViewKind::ALL.into_iter().map(ViewDescriptor::from).collect()
}
