// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Static transformation style catalog.
//!
//! Each style carries the prompt sent to the generation backend. Premium
//! styles additionally require an active premium entitlement.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A selectable transformation style.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Style {
    pub id: &'static str,
    pub label: &'static str,
    /// Transformation prompt forwarded to the generation backend
    #[serde(skip)]
    pub prompt: &'static str,
    pub premium: bool,
}

/// Style catalog. Order is the display order in the client.
pub const STYLES: &[Style] = &[
    Style {
        id: "vintage-film",
        label: "Vintage Film",
        prompt: "restyle the photo as faded 1970s film stock with warm grain",
        premium: false,
    },
    Style {
        id: "watercolor",
        label: "Watercolor",
        prompt: "repaint the photo as a loose watercolor with soft washes",
        premium: false,
    },
    Style {
        id: "comic-ink",
        label: "Comic Ink",
        prompt: "redraw the photo as bold inked comic art with halftone shading",
        premium: false,
    },
    Style {
        id: "renaissance",
        label: "Renaissance Portrait",
        prompt: "repaint the photo as a chiaroscuro renaissance oil portrait",
        premium: true,
    },
    Style {
        id: "neon-noir",
        label: "Neon Noir",
        prompt: "relight the photo as rain-slicked neon noir cinematography",
        premium: true,
    },
];

/// Look up a style by id.
pub fn find_style(id: &str) -> Option<&'static Style> {
    STYLES.iter().find(|s| s.id == id)
}
