//! The closed set of supported marketplaces and their routing table.
//!
//! The analysis stage names a winner from this enumeration and the review
//! stage resolves it to a site URL. Both sides share this single type, so
//! a vendor cannot exist in one place and not the other.

use serde::{Deserialize, Serialize};

/// A supported marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Daraz,
    PriceOye,
    Telemart,
    Shophive,
    IShopping,
}

impl Vendor {
    /// Every supported vendor, in display order. Scrape bindings are built
    /// from this slice, so the tool set and the routing table stay in sync.
    pub const ALL: [Vendor; 5] = [
        Vendor::Daraz,
        Vendor::PriceOye,
        Vendor::Telemart,
        Vendor::Shophive,
        Vendor::IShopping,
    ];

    /// Canonical display name, as the analysis prompt asks for it.
    pub fn name(&self) -> &'static str {
        match self {
            Vendor::Daraz => "Daraz",
            Vendor::PriceOye => "PriceOye",
            Vendor::Telemart => "Telemart",
            Vendor::Shophive => "Shophive",
            Vendor::IShopping => "iShopping",
        }
    }

    /// Base site URL used for review retrieval. Total over the enum.
    pub fn base_url(&self) -> &'static str {
        match self {
            Vendor::Daraz => "https://www.daraz.pk",
            Vendor::PriceOye => "https://priceoye.pk",
            Vendor::Telemart => "https://www.telemart.pk",
            Vendor::Shophive => "https://www.shophive.com",
            Vendor::IShopping => "https://www.ishopping.pk",
        }
    }

    /// Scan free text for the first supported vendor name.
    ///
    /// The analysis stage is asked to name the winning vendor explicitly;
    /// this is the tolerant read of that answer. Matching is
    /// case-insensitive and returns `None` for anything outside the
    /// enumerated set, which downstream treats as "no review data".
    pub fn detect(text: &str) -> Option<Vendor> {
        let lower = text.to_lowercase();
        let mut best: Option<(usize, Vendor)> = None;
        for vendor in Vendor::ALL {
            if let Some(pos) = lower.find(&vendor.name().to_lowercase()) {
                if best.map_or(true, |(p, _)| pos < p) {
                    best = Some((pos, vendor));
                }
            }
        }
        best.map(|(_, v)| v)
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Vendor {
    type Err = crate::error::ShopScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Vendor::ALL
            .into_iter()
            .find(|v| v.name().to_lowercase() == normalized)
            .ok_or_else(|| {
                crate::error::ShopScoutError::Config(format!("Unknown vendor: {s}"))
            })
    }
}
