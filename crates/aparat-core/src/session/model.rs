//! Session domain models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AparatError;
use crate::generation::GenerationResult;

/// The screen currently shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Landing,
    Hub,
    Result,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Landing => "landing",
            Screen::Hub => "hub",
            Screen::Result => "result",
        };
        f.write_str(name)
    }
}

/// Informational modules that can be opened as an overlay on any screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailModule {
    Perception,
    Scenography,
    SocialLab,
    BrandLab,
    #[serde(rename = "MISSION")]
    Menu,
}

impl DetailModule {
    pub const ALL: [DetailModule; 5] = [
        DetailModule::Perception,
        DetailModule::Scenography,
        DetailModule::SocialLab,
        DetailModule::BrandLab,
        DetailModule::Menu,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DetailModule::Perception => "PERCEPTION",
            DetailModule::Scenography => "SCENOGRAPHY",
            DetailModule::SocialLab => "SOCIAL_LAB",
            DetailModule::BrandLab => "BRAND_LAB",
            DetailModule::Menu => "MISSION",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DetailModule::Perception => "Neural Perception",
            DetailModule::Scenography => "Scenography Synthesis",
            DetailModule::SocialLab => "Social Media Lab",
            DetailModule::BrandLab => "Brand Identity Lab",
            DetailModule::Menu => "Workshop Menu",
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            DetailModule::Perception => "SENSORS: ACTIVE",
            DetailModule::Scenography => "STUDIO: READY",
            DetailModule::SocialLab => "FORMATS: OK",
            DetailModule::BrandLab => "DNA: LINKED",
            DetailModule::Menu => "CORE: READY",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DetailModule::Perception => {
                "Isolates the product from hands, shadows and background before synthesis."
            }
            DetailModule::Scenography => {
                "Places the product on an anthracite, satin or minimal set with physically correct reflections."
            }
            DetailModule::SocialLab => "Frames renders for 9:16 reels, 1:1 feed posts and 16:9 ads.",
            DetailModule::BrandLab => "Aligns the palette of every render with the brand identity.",
            DetailModule::Menu => "Step-by-step walkthrough of the studio workflow.",
        }
    }
}

impl fmt::Display for DetailModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DetailModule {
    type Err = AparatError;

    /// Accepts the module id in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "PERCEPTION" => Ok(DetailModule::Perception),
            "SCENOGRAPHY" => Ok(DetailModule::Scenography),
            "SOCIAL_LAB" | "SOCIAL" => Ok(DetailModule::SocialLab),
            "BRAND_LAB" | "BRANDING" => Ok(DetailModule::BrandLab),
            "MISSION" | "MENU" => Ok(DetailModule::Menu),
            _ => Err(AparatError::InvalidTransition(format!(
                "unknown detail module '{s}'"
            ))),
        }
    }
}

/// In-memory state of one user's pass through the flow.
///
/// Only [`crate::session::transition`] produces new sessions, which keeps
/// `result.is_some() == (screen == Screen::Result)` and the single-flight
/// guard in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub screen: Screen,
    pub active_detail: Option<DetailModule>,
    pub is_generating: bool,
    pub result: Option<GenerationResult>,
    /// Remaining allowance, 0 or 1
    pub credits: u8,
}

impl Session {
    /// A fresh session on the landing screen with the given allowance.
    pub fn new(credits: u8) -> Self {
        Self {
            screen: Screen::Landing,
            active_detail: None,
            is_generating: false,
            result: None,
            credits: credits.min(1),
        }
    }

    pub fn has_allowance(&self) -> bool {
        self.credits > 0
    }

    /// Whether a submit would currently be dispatched.
    pub fn accepts_generation(&self) -> bool {
        self.screen == Screen::Hub && self.has_allowance() && !self.is_generating
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = Session::default();
        assert_eq!(session.screen, Screen::Landing);
        assert!(session.active_detail.is_none());
        assert!(!session.is_generating);
        assert!(session.result.is_none());
        assert_eq!(session.credits, 1);
        assert!(!session.accepts_generation());
    }

    #[test]
    fn test_credits_are_clamped() {
        assert_eq!(Session::new(5).credits, 1);
        assert_eq!(Session::new(0).credits, 0);
    }

    #[test]
    fn test_detail_module_parse() {
        assert_eq!("social-lab".parse::<DetailModule>().unwrap(), DetailModule::SocialLab);
        assert_eq!("MISSION".parse::<DetailModule>().unwrap(), DetailModule::Menu);
        assert_eq!("perception".parse::<DetailModule>().unwrap(), DetailModule::Perception);
        assert!("gallery".parse::<DetailModule>().is_err());

        for module in DetailModule::ALL {
            assert_eq!(module.id().parse::<DetailModule>().unwrap(), module);
        }
    }
}
