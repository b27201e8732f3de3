//! Page registry and the navigation shell.
//!
//! Pages are addressed by path; the shell lists them in navigation order
//! under the application title.

pub mod layout;

pub use layout::{page_layout, ControlDescriptor, ControlKind, OutputSlot, PageLayout};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Title shown above the navigation bar.
pub const APP_TITLE: &str = "Spotify TOP-50 Songs Visualization";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageId {
    Home,
    Artists,
    Features,
    Genres,
    Ranking,
}

impl PageId {
    /// Navigation order.
    pub const ALL: [PageId; 5] = [
        PageId::Home,
        PageId::Artists,
        PageId::Features,
        PageId::Genres,
        PageId::Ranking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageId::Home => "home",
            PageId::Artists => "artists",
            PageId::Features => "features",
            PageId::Genres => "genres",
            PageId::Ranking => "ranking",
        }
    }

    /// URL path of the page; the landing page is the root.
    pub fn path(&self) -> &'static str {
        match self {
            PageId::Home => "/",
            PageId::Artists => "/artists",
            PageId::Features => "/features",
            PageId::Genres => "/genres",
            PageId::Ranking => "/ranking",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PageId::Home => "Home",
            PageId::Artists => "Artists",
            PageId::Features => "Features",
            PageId::Genres => "Genres",
            PageId::Ranking => "Ranking",
        }
    }

    /// Look a page up by its path.
    pub fn from_path(path: &str) -> Option<PageId> {
        Self::ALL.into_iter().find(|p| p.path() == path)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown page '{}'", s))
    }
}

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub page: PageId,
    pub title: &'static str,
    pub path: &'static str,
}

/// Application title plus the page links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shell {
    pub title: &'static str,
    pub pages: Vec<NavLink>,
}

pub fn shell() -> Shell {
    Shell {
        title: APP_TITLE,
        pages: PageId::ALL
            .into_iter()
            .map(|page| NavLink {
                page,
                title: page.title(),
                path: page.path(),
            })
            .collect(),
    }
}
